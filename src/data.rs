//! Table, schema and locale data sets — embedded or loaded from disk.
//!
//! A data directory has this layout:
//!
//! ```text
//! data/
//!   domains.ron
//!   tables/*.ron
//!   locales/<tag>.ron
//! ```

use std::path::Path;
use tracing::debug;

use crate::core::composer::BuildError;
use crate::core::registry::{RegistryError, TableRegistry};
use crate::schema::domain::DomainSchema;
use crate::schema::locale::LocaleBundle;

// ---------------------------------------------------------------------------
// Embedded Maze Rats data — compiled into the library
// ---------------------------------------------------------------------------
pub const CHARACTER_TABLES: &str = include_str!("../data/tables/character.ron");
pub const SPELL_TABLES: &str = include_str!("../data/tables/spell.ron");
pub const DOMAINS: &str = include_str!("../data/domains.ron");
pub const LOCALE_EN: &str = include_str!("../data/locales/en.ron");
pub const LOCALE_PT_BR: &str = include_str!("../data/locales/pt-BR.ron");

/// Everything a generator is built from, before validation.
#[derive(Debug, Clone, Default)]
pub struct DataSet {
    pub tables: TableRegistry,
    pub domains: Vec<DomainSchema>,
    pub bundles: Vec<LocaleBundle>,
}

impl DataSet {
    /// The embedded Maze Rats character and spell data.
    pub fn bundled() -> Result<DataSet, BuildError> {
        let mut tables = TableRegistry::parse_ron(CHARACTER_TABLES)?;
        tables.merge(TableRegistry::parse_ron(SPELL_TABLES)?)?;
        let domains = DomainSchema::parse_ron(DOMAINS).map_err(RegistryError::from)?;
        let bundles = vec![
            LocaleBundle::parse_ron("en", LOCALE_EN)?,
            LocaleBundle::parse_ron("pt-BR", LOCALE_PT_BR)?,
        ];
        Ok(DataSet {
            tables,
            domains,
            bundles,
        })
    }

    /// Load a data directory. The directory itself must exist; missing
    /// pieces inside it are skipped, so a directory can carry only extra
    /// tables or only an extra locale.
    pub fn load_dir(dir: &Path) -> Result<DataSet, BuildError> {
        if !dir.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("data directory '{}' does not exist", dir.display()),
            )
            .into());
        }

        let mut data = DataSet::default();

        let tables_dir = dir.join("tables");
        if tables_dir.is_dir() {
            load_ron_files_from_dir(&tables_dir, |path| {
                data.tables.merge(TableRegistry::load_from_ron(path)?)?;
                Ok(())
            })?;
        }

        let domains_path = dir.join("domains.ron");
        if domains_path.is_file() {
            let contents = std::fs::read_to_string(&domains_path)?;
            data.domains = DomainSchema::parse_ron(&contents).map_err(RegistryError::from)?;
        }

        let locales_dir = dir.join("locales");
        if locales_dir.is_dir() {
            load_ron_files_from_dir(&locales_dir, |path| {
                data.bundles.push(LocaleBundle::load_from_ron(path)?);
                Ok(())
            })?;
        }

        debug!(
            dir = %dir.display(),
            tables = data.tables.len(),
            domains = data.domains.len(),
            bundles = data.bundles.len(),
            "data directory loaded"
        );
        Ok(data)
    }

    /// Fold `other` into this set. Tables and domains may not repeat; a
    /// bundle for a locale already present is merged key by key, with
    /// `other` winning.
    pub fn merge(&mut self, other: DataSet) -> Result<(), BuildError> {
        self.tables.merge(other.tables)?;
        for domain in other.domains {
            if self.domains.iter().any(|d| d.name == domain.name) {
                return Err(RegistryError::DuplicateDomain(domain.name).into());
            }
            self.domains.push(domain);
        }
        for bundle in other.bundles {
            match self.bundles.iter_mut().find(|b| b.tag() == bundle.tag()) {
                Some(existing) => existing.extend(bundle),
                None => self.bundles.push(bundle),
            }
        }
        Ok(())
    }
}

/// Load all .ron files from a directory in file name order, calling
/// `loader` for each.
fn load_ron_files_from_dir<F>(dir: &Path, mut loader: F) -> Result<(), BuildError>
where
    F: FnMut(&Path) -> Result<(), BuildError>,
{
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) == Some("ron") {
            paths.push(path);
        }
    }
    paths.sort();
    for path in &paths {
        loader(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_data_parses() {
        let data = DataSet::bundled().unwrap();
        assert!(data.tables.contains("character_name"));
        assert!(data.tables.contains("spell_name"));
        let names: Vec<&str> = data.domains.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["character", "spell"]);
        assert_eq!(data.bundles.len(), 2);
    }

    #[test]
    fn merge_extends_existing_bundles() {
        let mut base = DataSet {
            bundles: vec![LocaleBundle::new("en").with("a", "A").with("b", "B")],
            ..DataSet::default()
        };
        let overlay = DataSet {
            bundles: vec![
                LocaleBundle::new("en").with("b", "Bee"),
                LocaleBundle::new("de").with("a", "Ah"),
            ],
            ..DataSet::default()
        };
        base.merge(overlay).unwrap();
        assert_eq!(base.bundles.len(), 2);
        assert_eq!(base.bundles[0].get("a"), Some("A"));
        assert_eq!(base.bundles[0].get("b"), Some("Bee"));
        assert_eq!(base.bundles[1].tag(), "de");
    }

    #[test]
    fn merge_rejects_duplicate_domains() {
        let mut base = DataSet {
            domains: vec![DomainSchema::new("spell")],
            ..DataSet::default()
        };
        let err = base
            .merge(DataSet {
                domains: vec![DomainSchema::new("spell")],
                ..DataSet::default()
            })
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::Registry(RegistryError::DuplicateDomain(name)) if name == "spell"
        ));
    }

    #[test]
    fn missing_data_dir_is_an_error() {
        let err = DataSet::load_dir(Path::new("data/no-such-dir")).unwrap_err();
        assert!(matches!(
            &err,
            BuildError::Io(e) if e.kind() == std::io::ErrorKind::NotFound
        ));
        assert!(err.to_string().contains("data/no-such-dir"));

        // A file is not a data directory either.
        assert!(matches!(
            DataSet::load_dir(Path::new("data/domains.ron")),
            Err(BuildError::Io(_))
        ));
    }

    #[test]
    fn builder_reports_missing_data_dir() {
        let result = crate::core::composer::Generator::builder()
            .with_bundled_data()
            .data_dir("data/no-such-dir")
            .build();
        assert!(matches!(result, Err(BuildError::Io(_))));
    }

    #[test]
    fn load_repository_data_dir() {
        let data = DataSet::load_dir(Path::new("data")).unwrap();
        assert!(data.tables.contains("abilities"));
        assert!(data.tables.contains("ethereal_form"));
        assert_eq!(data.domains.len(), 2);
        let tags: Vec<&str> = data.bundles.iter().map(|b| b.tag()).collect();
        assert_eq!(tags, vec!["en", "pt-BR"]);
    }
}
