/// Domain composition: the generator callers talk to.
///
/// Wires together the frozen table registry, the domain schemas and the
/// locale bundles, and runs select → localize for each schema field.

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::core::localizer::{LocaleError, Locales};
use crate::core::random::{EntropySource, RandomSource, SeededSource};
use crate::core::registry::{FrozenRegistry, RegistryError, TableRegistry};
use crate::core::selector::{SelectError, Selector};
use crate::data::DataSet;
use crate::schema::domain::{Domain, DomainSchema};
use crate::schema::locale::LocaleBundle;
use crate::schema::value::Tree;

/// Locale used when a builder is not told otherwise.
pub const DEFAULT_LOCALE: &str = "en";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("unknown domain: {0}")]
    UnknownDomain(String),
    #[error(transparent)]
    Select(#[from] SelectError),
    #[error(transparent)]
    Locale(#[from] LocaleError),
}

/// Structural problems found while assembling a generator. A generator is
/// never handed out while any of these stand.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("locale error: {0}")]
    Locale(#[from] LocaleError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

type SchemaMap = IndexMap<String, DomainSchema, FxBuildHasher>;

/// A validated, immutable generator. Cheap to clone and safe to share
/// across threads; each call brings its own random source.
#[derive(Debug, Clone)]
pub struct Generator {
    registry: Arc<FrozenRegistry>,
    schemas: Arc<SchemaMap>,
    locales: Arc<Locales>,
}

/// Builder for constructing a `Generator`.
pub struct GeneratorBuilder {
    default_locale: String,
    bundled: bool,
    data_dir: Option<PathBuf>,
    /// Directly provided tables (for testing without files).
    tables: Option<TableRegistry>,
    /// Directly provided schemas (for testing without files).
    domains: Vec<DomainSchema>,
    /// Directly provided locale bundles (for testing without files).
    bundles: Vec<LocaleBundle>,
}

impl Generator {
    pub fn builder() -> GeneratorBuilder {
        GeneratorBuilder {
            default_locale: DEFAULT_LOCALE.to_string(),
            bundled: false,
            data_dir: None,
            tables: None,
            domains: Vec::new(),
            bundles: Vec::new(),
        }
    }

    /// A generator over the embedded Maze Rats tables.
    pub fn bundled() -> Result<Generator, BuildError> {
        Self::builder().with_bundled_data().build()
    }

    /// Generate one result for `domain`, localized for `locale`.
    ///
    /// Fields come back in the order the domain's schema declares them.
    pub fn generate(
        &self,
        domain: &str,
        locale: &str,
        source: &mut dyn RandomSource,
    ) -> Result<Tree, GenerationError> {
        let schema = self
            .schemas
            .get(domain)
            .ok_or_else(|| GenerationError::UnknownDomain(domain.to_string()))?;

        if !self.locales.supports(locale) {
            warn!(
                locale,
                default = self.locales.default_bundle().tag(),
                "unsupported locale, using default bundle"
            );
        }

        let selector = Selector::new(&self.registry);
        let mut out = Tree::with_capacity(schema.fields.len());
        for spec in &schema.fields {
            let resolved = selector.select(&spec.table, source)?;
            let value = self.locales.localize_value(&resolved, locale)?;
            out.insert(spec.field.clone(), value);
        }
        Ok(out)
    }

    /// Generate with a fresh source seeded from `seed`. The same
    /// `(domain, locale, seed)` always gives the same result.
    pub fn generate_seeded(
        &self,
        domain: &str,
        locale: &str,
        seed: u64,
    ) -> Result<Tree, GenerationError> {
        self.generate(domain, locale, &mut SeededSource::new(seed))
    }

    /// Generate with a fresh entropy-seeded source.
    pub fn generate_random(&self, domain: &str, locale: &str) -> Result<Tree, GenerationError> {
        self.generate(domain, locale, &mut EntropySource::new())
    }

    pub fn character(
        &self,
        locale: &str,
        source: &mut dyn RandomSource,
    ) -> Result<Tree, GenerationError> {
        self.generate(Domain::Character.name(), locale, source)
    }

    pub fn spell(&self, locale: &str, source: &mut dyn RandomSource) -> Result<Tree, GenerationError> {
        self.generate(Domain::Spell.name(), locale, source)
    }

    /// Registered domains, in registration order.
    pub fn domains(&self) -> impl Iterator<Item = &DomainSchema> {
        self.schemas.values()
    }

    pub fn registry(&self) -> &FrozenRegistry {
        &self.registry
    }

    pub fn locales(&self) -> &Locales {
        &self.locales
    }
}

impl GeneratorBuilder {
    /// Tag of the bundle every other locale falls back to.
    pub fn default_locale(mut self, tag: &str) -> Self {
        self.default_locale = tag.to_string();
        self
    }

    /// Include the embedded Maze Rats tables, schemas and locales.
    pub fn with_bundled_data(mut self) -> Self {
        self.bundled = true;
        self
    }

    /// Load `tables/*.ron`, `domains.ron` and `locales/*.ron` from a
    /// data directory.
    pub fn data_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Provide tables directly (for testing without files).
    pub fn with_tables(mut self, tables: TableRegistry) -> Self {
        self.tables = Some(tables);
        self
    }

    /// Provide domain schemas directly (for testing without files).
    pub fn with_domains(mut self, domains: impl IntoIterator<Item = DomainSchema>) -> Self {
        self.domains.extend(domains);
        self
    }

    /// Provide locale bundles directly (for testing without files).
    pub fn with_locales(mut self, bundles: impl IntoIterator<Item = LocaleBundle>) -> Self {
        self.bundles.extend(bundles);
        self
    }

    /// Load, validate and freeze. Every structural check runs here, so a
    /// returned generator can only fail per call on random or lookup errors.
    pub fn build(self) -> Result<Generator, BuildError> {
        let mut data = DataSet::default();

        if self.bundled {
            data.merge(DataSet::bundled()?)?;
        }

        // Later sources may add tables and domains but never redefine them;
        // their locale texts override earlier ones.
        if let Some(ref dir) = self.data_dir {
            data.merge(DataSet::load_dir(dir)?)?;
        }

        data.merge(DataSet {
            tables: self.tables.unwrap_or_default(),
            domains: self.domains,
            bundles: self.bundles,
        })?;

        let registry = data.tables.freeze()?;

        let mut schemas = SchemaMap::default();
        for schema in data.domains {
            registry.check_schema(&schema)?;
            if schemas.contains_key(&schema.name) {
                return Err(RegistryError::DuplicateDomain(schema.name).into());
            }
            schemas.insert(schema.name.clone(), schema);
        }

        let locales = Locales::new(&self.default_locale, data.bundles)?;
        locales.check_registry(&registry)?;

        info!(
            tables = registry.len(),
            domains = schemas.len(),
            locales = locales.bundles().len(),
            default_locale = %self.default_locale,
            "generator built"
        );

        Ok(Generator {
            registry: Arc::new(registry),
            schemas: Arc::new(schemas),
            locales: Arc::new(locales),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::random::ScriptedSource;
    use crate::schema::table::{Payload, Table};
    use crate::schema::value::Value;

    fn build_test_generator() -> Generator {
        let mut tables = TableRegistry::new();
        tables
            .register(Table::uniform("T1", [Payload::literal("Alice")]))
            .unwrap();
        tables
            .register(Table::uniform(
                "mood",
                [Payload::key("mood.grumpy"), Payload::key("mood.jolly")],
            ))
            .unwrap();

        Generator::builder()
            .with_tables(tables)
            .with_domains([DomainSchema::new("testDomain")
                .field("name", "T1")
                .field("mood", "mood")])
            .with_locales([
                LocaleBundle::new("en")
                    .with("Alice", "Alice")
                    .with("mood.grumpy", "Grumpy")
                    .with("mood.jolly", "Jolly"),
                LocaleBundle::new("pt-BR").with("mood.grumpy", "Rabugento"),
            ])
            .build()
            .unwrap()
    }

    #[test]
    fn generate_follows_schema_order() {
        let generator = build_test_generator();
        let out = generator
            .generate("testDomain", "en", &mut ScriptedSource::new(vec![0, 1]))
            .unwrap();
        let fields: Vec<&str> = out.keys().map(String::as_str).collect();
        assert_eq!(fields, vec!["name", "mood"]);
        assert_eq!(out["name"], Value::from("Alice"));
        assert_eq!(out["mood"], Value::from("Jolly"));
    }

    #[test]
    fn unsupported_locale_falls_back_entirely() {
        let generator = build_test_generator();
        let out = generator
            .generate("testDomain", "xx", &mut ScriptedSource::new(vec![0]))
            .unwrap();
        assert_eq!(out["name"], Value::from("Alice"));
        assert_eq!(out["mood"], Value::from("Grumpy"));
    }

    #[test]
    fn partial_locale_falls_back_per_key() {
        let generator = build_test_generator();
        let grumpy = generator
            .generate("testDomain", "pt-BR", &mut ScriptedSource::new(vec![0, 0]))
            .unwrap();
        assert_eq!(grumpy["mood"], Value::from("Rabugento"));
        let jolly = generator
            .generate("testDomain", "pt-BR", &mut ScriptedSource::new(vec![0, 1]))
            .unwrap();
        assert_eq!(jolly["mood"], Value::from("Jolly"));
    }

    #[test]
    fn unknown_domain() {
        let generator = build_test_generator();
        let err = generator.generate_seeded("dragon", "en", 1).unwrap_err();
        assert!(matches!(err, GenerationError::UnknownDomain(name) if name == "dragon"));
    }

    #[test]
    fn seeded_generation_is_deterministic() {
        let generator = build_test_generator();
        for seed in 0..20 {
            assert_eq!(
                generator.generate_seeded("testDomain", "en", seed).unwrap(),
                generator.generate_seeded("testDomain", "en", seed).unwrap()
            );
        }
    }

    #[test]
    fn random_generation_has_every_field() {
        let generator = build_test_generator();
        let out = generator.generate_random("testDomain", "pt-BR").unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn build_rejects_dangling_schema_table() {
        let err = Generator::builder()
            .with_tables({
                let mut t = TableRegistry::new();
                t.register(Table::uniform("T1", [Payload::literal("Alice")])).unwrap();
                t
            })
            .with_domains([DomainSchema::new("d").field("name", "T2")])
            .with_locales([LocaleBundle::new("en")])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::Registry(RegistryError::DanglingReference { missing, .. }) if missing == "T2"
        ));
    }

    #[test]
    fn build_rejects_cycles_before_generation() {
        let mut tables = TableRegistry::new();
        tables.register(Table::uniform("a", [Payload::reference("b")])).unwrap();
        tables.register(Table::uniform("b", [Payload::reference("a")])).unwrap();
        let err = Generator::builder()
            .with_tables(tables)
            .with_locales([LocaleBundle::new("en")])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::Registry(RegistryError::CyclicReference { .. })
        ));
    }

    #[test]
    fn build_rejects_duplicate_domain() {
        let mut tables = TableRegistry::new();
        tables.register(Table::uniform("T1", [Payload::literal("Alice")])).unwrap();
        let err = Generator::builder()
            .with_tables(tables)
            .with_domains([
                DomainSchema::new("d").field("name", "T1"),
                DomainSchema::new("d").field("other", "T1"),
            ])
            .with_locales([LocaleBundle::new("en")])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::Registry(RegistryError::DuplicateDomain(name)) if name == "d"
        ));
    }

    #[test]
    fn build_rejects_missing_default_bundle() {
        let err = Generator::builder()
            .default_locale("de")
            .with_locales([LocaleBundle::new("en")])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::Locale(LocaleError::MissingDefaultBundle(tag)) if tag == "de"
        ));
    }

    #[test]
    fn build_rejects_untranslatable_key() {
        let mut tables = TableRegistry::new();
        tables.register(Table::uniform("t", [Payload::key("mood.sly")])).unwrap();
        let err = Generator::builder()
            .with_tables(tables)
            .with_locales([LocaleBundle::new("en")])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::Locale(LocaleError::MissingLocalizationKey { key, .. }) if key == "mood.sly"
        ));
    }

    #[test]
    fn generator_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Generator>();

        let generator = build_test_generator();
        let handles: Vec<_> = (0..4)
            .map(|seed| {
                let generator = generator.clone();
                std::thread::spawn(move || generator.generate_seeded("testDomain", "en", seed))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap().len(), 2);
        }
    }
}
