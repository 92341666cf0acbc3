/// Localization — locale negotiation, key lookup with default fallback, and
/// the walk that turns a resolved tree into display text.

use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::core::pattern::{Pattern, PatternError};
use crate::core::registry::FrozenRegistry;
use crate::schema::locale::{normalize_tag, primary_subtag, LocaleBundle};
use crate::schema::table::Payload;
use crate::schema::value::{ResolvedTree, ResolvedValue, Tree, Value};

#[derive(Debug, Error)]
pub enum LocaleError {
    #[error("localization key '{key}' is missing from the default locale '{locale}'")]
    MissingLocalizationKey { key: String, locale: String },
    #[error("default locale '{0}' has no bundle")]
    MissingDefaultBundle(String),
    #[error("duplicate locale bundle: {0}")]
    DuplicateBundle(String),
    #[error("localization key '{key}' appears twice in locale '{locale}'")]
    DuplicateKey { key: String, locale: String },
    #[error("invalid pattern '{key}' in locale '{locale}': {source}")]
    InvalidPattern {
        key: String,
        locale: String,
        #[source]
        source: PatternError,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Every locale bundle known to a generator, plus the designated default.
///
/// Construction guarantees the default bundle exists, so lookups only fail
/// for keys the default bundle lacks.
#[derive(Debug, Clone)]
pub struct Locales {
    bundles: Vec<LocaleBundle>,
    default_index: usize,
}

impl Locales {
    pub fn new(default: &str, bundles: Vec<LocaleBundle>) -> Result<Self, LocaleError> {
        for (i, bundle) in bundles.iter().enumerate() {
            if bundles[..i].iter().any(|b| b.tag() == bundle.tag()) {
                return Err(LocaleError::DuplicateBundle(bundle.tag().to_string()));
            }
        }
        let default_index = bundles
            .iter()
            .position(|b| b.tag() == default)
            .ok_or_else(|| LocaleError::MissingDefaultBundle(default.to_string()))?;
        Ok(Self {
            bundles,
            default_index,
        })
    }

    /// Load every `<tag>.ron` bundle from a directory, in file name order.
    pub fn load_dir(default: &str, dir: &Path) -> Result<Self, LocaleError> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) == Some("ron") {
                paths.push(path);
            }
        }
        paths.sort();
        let bundles = paths
            .iter()
            .map(|p| LocaleBundle::load_from_ron(p))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(default, bundles)
    }

    pub fn default_bundle(&self) -> &LocaleBundle {
        &self.bundles[self.default_index]
    }

    pub fn bundles(&self) -> &[LocaleBundle] {
        &self.bundles
    }

    /// Tags of every bundle, default first.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags = vec![self.default_bundle().tag()];
        tags.extend(
            self.bundles
                .iter()
                .filter(|b| b.tag() != self.default_bundle().tag())
                .map(LocaleBundle::tag),
        );
        tags
    }

    /// Find the bundle serving a requested tag, if any: exact match, then
    /// case-insensitive, then by primary language subtag.
    pub fn find(&self, requested: &str) -> Option<&LocaleBundle> {
        let wanted = normalize_tag(requested);
        if let Some(bundle) = self.bundles.iter().find(|b| b.tag() == wanted) {
            return Some(bundle);
        }
        if let Some(bundle) = self
            .bundles
            .iter()
            .find(|b| b.tag().eq_ignore_ascii_case(&wanted))
        {
            return Some(bundle);
        }
        let language = primary_subtag(&wanted);
        if language.is_empty() {
            return None;
        }
        self.bundles
            .iter()
            .find(|b| b.tag().eq_ignore_ascii_case(language))
            .or_else(|| {
                self.bundles
                    .iter()
                    .find(|b| b.language().eq_ignore_ascii_case(language))
            })
    }

    /// True if `requested` resolves to some bundle without falling back
    /// wholesale to the default.
    pub fn supports(&self, requested: &str) -> bool {
        self.find(requested).is_some()
    }

    /// The bundle used for `requested`; unknown tags get the default.
    pub fn negotiate(&self, requested: &str) -> &LocaleBundle {
        self.find(requested).unwrap_or_else(|| self.default_bundle())
    }

    /// Look up `key` for `locale`, falling back to the default bundle.
    pub fn lookup(&self, locale: &str, key: &str) -> Result<&str, LocaleError> {
        self.lookup_in(self.negotiate(locale), key)
    }

    fn lookup_in<'a>(&'a self, bundle: &'a LocaleBundle, key: &str) -> Result<&'a str, LocaleError> {
        if let Some(text) = bundle.get(key) {
            return Ok(text);
        }
        let default = self.default_bundle();
        if bundle.tag() != default.tag() {
            debug!(locale = bundle.tag(), key, "key missing, using default locale");
        }
        default
            .get(key)
            .ok_or_else(|| LocaleError::MissingLocalizationKey {
                key: key.to_string(),
                locale: default.tag().to_string(),
            })
    }

    /// Localize a resolved tree for `locale`. The input is left untouched.
    pub fn localize(&self, tree: &ResolvedTree, locale: &str) -> Result<Tree, LocaleError> {
        self.localize_tree_in(tree, self.negotiate(locale))
    }

    /// Localize a single resolved value for `locale`.
    pub fn localize_value(&self, value: &ResolvedValue, locale: &str) -> Result<Value, LocaleError> {
        self.localize_in(value, self.negotiate(locale))
    }

    fn localize_tree_in(&self, tree: &ResolvedTree, bundle: &LocaleBundle) -> Result<Tree, LocaleError> {
        let mut out = Tree::with_capacity(tree.len());
        for (field, value) in tree {
            out.insert(field.clone(), self.localize_in(value, bundle)?);
        }
        Ok(out)
    }

    fn localize_in(&self, value: &ResolvedValue, bundle: &LocaleBundle) -> Result<Value, LocaleError> {
        match value {
            ResolvedValue::Literal(text) => Ok(Value::Text(text.clone())),
            ResolvedValue::Pending(key) => Ok(Value::Text(self.lookup_in(bundle, key)?.to_string())),
            ResolvedValue::Join {
                parts,
                separator,
                pattern,
            } => {
                let texts = parts
                    .iter()
                    .map(|p| self.localize_in(p, bundle).map(|v| v.flatten(separator)))
                    .collect::<Result<Vec<_>, _>>()?;
                match pattern {
                    None => Ok(Value::Text(texts.join(separator.as_str()))),
                    Some(key) => {
                        let template = self.lookup_in(bundle, key)?;
                        let rendered = Pattern::parse(template)
                            .and_then(|p| p.render(&texts))
                            .map_err(|source| LocaleError::InvalidPattern {
                                key: key.clone(),
                                locale: bundle.tag().to_string(),
                                source,
                            })?;
                        Ok(Value::Text(rendered))
                    }
                }
            }
            ResolvedValue::Tree(tree) => Ok(Value::Tree(self.localize_tree_in(tree, bundle)?)),
        }
    }

    /// Check that every key the registry can emit exists in the default
    /// bundle, and that every pattern parses in every bundle that defines it.
    /// A pattern may leave parts unused, but each of its slots needs a part.
    pub fn check_registry(&self, registry: &FrozenRegistry) -> Result<(), LocaleError> {
        let default = self.default_bundle();
        for table in registry.tables() {
            for key in table.localization_keys() {
                if !default.contains(key) {
                    return Err(LocaleError::MissingLocalizationKey {
                        key: key.to_string(),
                        locale: default.tag().to_string(),
                    });
                }
            }
            for entry in &table.entries {
                let mut result = Ok(());
                entry.value.walk(&mut |payload| {
                    if let Payload::Composite {
                        parts,
                        pattern: Some(key),
                        ..
                    } = payload
                    {
                        if result.is_ok() {
                            result = self.check_pattern(key, parts.len());
                        }
                    }
                });
                result?;
            }
        }
        Ok(())
    }

    fn check_pattern(&self, key: &str, parts: usize) -> Result<(), LocaleError> {
        for bundle in &self.bundles {
            let Some(text) = bundle.get(key) else {
                continue;
            };
            Pattern::parse(text)
                .and_then(|pattern| pattern.check_parts(parts))
                .map_err(|source| LocaleError::InvalidPattern {
                    key: key.to_string(),
                    locale: bundle.tag().to_string(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Keys the registry can emit that a bundle lacks and would take from
    /// the default bundle instead. Sorted, without duplicates.
    pub fn fallback_keys(&self, tag: &str, registry: &FrozenRegistry) -> Vec<String> {
        let Some(bundle) = self.bundles.iter().find(|b| b.tag() == tag) else {
            return Vec::new();
        };
        let mut missing: Vec<String> = registry
            .tables()
            .flat_map(|t| t.localization_keys())
            .filter(|key| !bundle.contains(key))
            .map(str::to_string)
            .collect();
        missing.sort();
        missing.dedup();
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::TableRegistry;
    use crate::schema::table::Table;

    fn locales() -> Locales {
        let en = LocaleBundle::new("en")
            .with("appearance.gaunt", "Gaunt")
            .with("form.bolt", "Bolt")
            .with("effect.freezing", "Freezing")
            .with("pattern.effect_noun", "{0} {1}")
            .with("feature.path", "Path: {0}");
        let pt = LocaleBundle::new("pt-BR")
            .with("appearance.gaunt", "Esquálido")
            .with("form.bolt", "Raio")
            .with("effect.freezing", "Congelante")
            .with("pattern.effect_noun", "{1} {0}");
        Locales::new("en", vec![en, pt]).unwrap()
    }

    fn spell_name() -> ResolvedValue {
        ResolvedValue::Join {
            parts: vec![
                ResolvedValue::Pending("effect.freezing".to_string()),
                ResolvedValue::Pending("form.bolt".to_string()),
            ],
            separator: " ".to_string(),
            pattern: Some("pattern.effect_noun".to_string()),
        }
    }

    #[test]
    fn default_bundle_must_exist() {
        let err = Locales::new("en", vec![LocaleBundle::new("pt-BR")]).unwrap_err();
        assert!(matches!(err, LocaleError::MissingDefaultBundle(tag) if tag == "en"));
    }

    #[test]
    fn duplicate_bundles_rejected() {
        let err = Locales::new("en", vec![LocaleBundle::new("en"), LocaleBundle::new("en")])
            .unwrap_err();
        assert!(matches!(err, LocaleError::DuplicateBundle(tag) if tag == "en"));
    }

    #[test]
    fn negotiation() {
        let l = locales();
        assert_eq!(l.negotiate("pt-BR").tag(), "pt-BR");
        assert_eq!(l.negotiate("pt_br").tag(), "pt-BR");
        assert_eq!(l.negotiate("pt").tag(), "pt-BR");
        assert_eq!(l.negotiate("pt-PT").tag(), "pt-BR");
        assert_eq!(l.negotiate("en-GB").tag(), "en");
        assert_eq!(l.negotiate("xx").tag(), "en");
        assert_eq!(l.negotiate("").tag(), "en");
        assert!(l.supports("pt"));
        assert!(!l.supports("xx"));
        assert_eq!(l.tags(), vec!["en", "pt-BR"]);
    }

    #[test]
    fn lookup_falls_back_per_key() {
        let l = locales();
        assert_eq!(l.lookup("pt-BR", "appearance.gaunt").unwrap(), "Esquálido");
        assert_eq!(l.lookup("pt-BR", "feature.path").unwrap(), "Path: {0}");
        assert_eq!(l.lookup("xx", "appearance.gaunt").unwrap(), "Gaunt");
        assert!(matches!(
            l.lookup("pt-BR", "nope"),
            Err(LocaleError::MissingLocalizationKey { key, locale }) if key == "nope" && locale == "en"
        ));
    }

    #[test]
    fn patterns_reorder_per_locale() {
        let l = locales();
        let value = spell_name();
        assert_eq!(l.localize_value(&value, "en").unwrap(), Value::from("Freezing Bolt"));
        assert_eq!(l.localize_value(&value, "pt-BR").unwrap(), Value::from("Raio Congelante"));
    }

    #[test]
    fn localize_is_total_and_pure() {
        let l = locales();
        let mut inner = ResolvedTree::new();
        inner.insert("look".to_string(), ResolvedValue::Pending("appearance.gaunt".to_string()));
        inner.insert("hp".to_string(), ResolvedValue::Literal("4".to_string()));
        let mut tree = ResolvedTree::new();
        tree.insert("spell".to_string(), spell_name());
        tree.insert("details".to_string(), ResolvedValue::Tree(inner));
        let before = tree.clone();

        let out = l.localize(&tree, "pt-BR").unwrap();
        assert_eq!(tree, before);
        assert_eq!(out["spell"], Value::from("Raio Congelante"));
        let details = out["details"].as_tree().unwrap();
        assert_eq!(details["look"], Value::from("Esquálido"));
        assert_eq!(details["hp"], Value::from("4"));
    }

    #[test]
    fn join_flattens_nested_trees() {
        let l = locales();
        let mut inner = ResolvedTree::new();
        inner.insert("a".to_string(), ResolvedValue::Literal("x".to_string()));
        inner.insert("b".to_string(), ResolvedValue::Literal("y".to_string()));
        let value = ResolvedValue::Join {
            parts: vec![ResolvedValue::Literal("w".to_string()), ResolvedValue::Tree(inner)],
            separator: ", ".to_string(),
            pattern: None,
        };
        assert_eq!(l.localize_value(&value, "en").unwrap(), Value::from("w, x, y"));
    }

    #[test]
    fn unsupported_locale_matches_default_for_every_key() {
        let l = locales();
        for key in l.default_bundle().keys() {
            let value = ResolvedValue::Pending(key.to_string());
            assert_eq!(
                l.localize_value(&value, "zz-ZZ").unwrap(),
                l.localize_value(&value, "en").unwrap()
            );
        }
    }

    fn registry_with(payload: Payload) -> FrozenRegistry {
        let mut registry = TableRegistry::new();
        registry.register(Table::uniform("t", [payload])).unwrap();
        registry.freeze().unwrap()
    }

    #[test]
    fn check_registry_accepts_covered_keys() {
        let registry = registry_with(Payload::patterned(
            "pattern.effect_noun",
            vec![Payload::key("effect.freezing"), Payload::key("form.bolt")],
        ));
        assert!(locales().check_registry(&registry).is_ok());
        assert_eq!(locales().fallback_keys("pt-BR", &registry), Vec::<String>::new());
    }

    #[test]
    fn check_registry_reports_missing_default_key() {
        let registry = registry_with(Payload::key("background.urchin"));
        assert!(matches!(
            locales().check_registry(&registry),
            Err(LocaleError::MissingLocalizationKey { key, .. }) if key == "background.urchin"
        ));
    }

    #[test]
    fn check_registry_reports_pattern_arity() {
        let registry = registry_with(Payload::patterned(
            "pattern.effect_noun",
            vec![Payload::key("form.bolt")],
        ));
        assert!(matches!(
            locales().check_registry(&registry),
            Err(LocaleError::InvalidPattern {
                key,
                locale,
                source: PatternError::TooFewParts { arity: 2, parts: 1 },
            }) if key == "pattern.effect_noun" && locale == "en"
        ));
    }

    #[test]
    fn check_registry_allows_unused_parts() {
        // "Path: {0}" only places the first part.
        let registry = registry_with(Payload::patterned(
            "feature.path",
            vec![Payload::key("appearance.gaunt"), Payload::key("form.bolt")],
        ));
        assert!(locales().check_registry(&registry).is_ok());
        let value = ResolvedValue::Join {
            parts: vec![
                ResolvedValue::Pending("appearance.gaunt".to_string()),
                ResolvedValue::Pending("form.bolt".to_string()),
            ],
            separator: " ".to_string(),
            pattern: Some("feature.path".to_string()),
        };
        assert_eq!(l_en(&value), Value::from("Path: Gaunt"));
    }

    #[test]
    fn check_registry_reports_malformed_translation() {
        let en = LocaleBundle::new("en")
            .with("form.bolt", "Bolt")
            .with("pattern.single", "{0}");
        let pt = LocaleBundle::new("pt-BR").with("pattern.single", "{0");
        let l = Locales::new("en", vec![en, pt]).unwrap();
        let registry = registry_with(Payload::patterned("pattern.single", vec![Payload::key("form.bolt")]));
        let err = l.check_registry(&registry).unwrap_err();
        assert!(matches!(
            &err,
            LocaleError::InvalidPattern { locale, source: PatternError::UnclosedBrace, .. }
                if locale == "pt-BR"
        ));
        assert_eq!(
            err.to_string(),
            "invalid pattern 'pattern.single' in locale 'pt-BR': unclosed brace"
        );
    }

    fn l_en(value: &ResolvedValue) -> Value {
        locales().localize_value(value, "en").unwrap()
    }

    #[test]
    fn fallback_keys_lists_untranslated() {
        let registry = registry_with(Payload::patterned("feature.path", vec![Payload::key("appearance.gaunt")]));
        assert_eq!(locales().fallback_keys("pt-BR", &registry), vec!["feature.path".to_string()]);
        assert!(locales().fallback_keys("xx", &registry).is_empty());
    }

    #[test]
    fn load_shipped_locale_dir() {
        let l = Locales::load_dir("en", Path::new("data/locales")).unwrap();
        assert_eq!(l.tags(), vec!["en", "pt-BR"]);
        assert_eq!(l.lookup("pt", "side_effect.none").unwrap(), "Nenhum");
        assert!(matches!(
            Locales::load_dir("de", Path::new("data/locales")),
            Err(LocaleError::MissingDefaultBundle(tag)) if tag == "de"
        ));
    }
}
