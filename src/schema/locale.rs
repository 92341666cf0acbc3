use rustc_hash::FxHashMap;
use std::path::Path;

use crate::core::localizer::LocaleError;
use crate::schema::pairs::MapPairs;

/// Localized strings for one locale, keyed by localization key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleBundle {
    tag: String,
    entries: FxHashMap<String, String>,
}

impl LocaleBundle {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            entries: FxHashMap::default(),
        }
    }

    /// Builder-style insert, handy for tests and small inline bundles.
    pub fn with(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(key, text);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(key.into(), text.into());
    }

    /// Add every entry of `other`, replacing texts for keys already present.
    pub fn extend(&mut self, other: LocaleBundle) {
        self.entries.extend(other.entries);
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// The primary language subtag: `"pt"` for `"pt-BR"`.
    pub fn language(&self) -> &str {
        primary_subtag(&self.tag)
    }

    /// Parse a bundle from a RON map of key to text. A key may appear
    /// only once.
    pub fn parse_ron(tag: impl Into<String>, input: &str) -> Result<Self, LocaleError> {
        let MapPairs(pairs) = ron::from_str::<MapPairs<String>>(input)?;
        let mut bundle = Self::new(tag);
        for (key, text) in pairs {
            if bundle.contains(&key) {
                return Err(LocaleError::DuplicateKey {
                    key,
                    locale: bundle.tag,
                });
            }
            bundle.insert(key, text);
        }
        Ok(bundle)
    }

    /// Load a bundle from a RON file. The file stem is the locale tag, so
    /// `locales/pt-BR.ron` becomes the `pt-BR` bundle.
    pub fn load_from_ron(path: &Path) -> Result<Self, LocaleError> {
        let contents = std::fs::read_to_string(path)?;
        let tag = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        Self::parse_ron(tag, &contents)
    }
}

/// Normalize a requested tag: `pt_BR` and `pt-BR` name the same locale.
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().replace('_', "-")
}

pub fn primary_subtag(tag: &str) -> &str {
    tag.split(['-', '_']).next().unwrap_or(tag)
}
