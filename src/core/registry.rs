/// Table registry — loading, validation, and the frozen read-only form.

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use crate::schema::domain::DomainSchema;
use crate::schema::pairs::MapPairs;
use crate::schema::table::{Entry, Table};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate table: {0}")]
    DuplicateTable(String),
    #[error("unknown table: {0}")]
    UnknownTable(String),
    #[error("table '{0}' has no entries")]
    EmptyTable(String),
    #[error("entry {index} of table '{table}' has zero weight")]
    ZeroWeight { table: String, index: usize },
    #[error("table '{referrer}' references missing table '{missing}'")]
    DanglingReference { missing: String, referrer: String },
    #[error("cyclic table reference: {}", .cycle.join(" -> "))]
    CyclicReference { cycle: Vec<String> },
    #[error("duplicate domain: {0}")]
    DuplicateDomain(String),
    #[error("domain '{domain}' declares field '{field}' twice")]
    DuplicateField { domain: String, field: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

type TableMap = IndexMap<String, Table, FxBuildHasher>;

/// A registry still being loaded. Tables can be added until `freeze`
/// validates the whole set and hands back a `FrozenRegistry`.
#[derive(Debug, Clone, Default)]
pub struct TableRegistry {
    tables: TableMap,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table. Names are unique; a table needs at least one entry and
    /// every entry a positive weight.
    pub fn register(&mut self, table: Table) -> Result<(), RegistryError> {
        if self.tables.contains_key(&table.name) {
            return Err(RegistryError::DuplicateTable(table.name));
        }
        if table.entries.is_empty() {
            return Err(RegistryError::EmptyTable(table.name));
        }
        if let Some(index) = table.entries.iter().position(|e| e.weight == 0) {
            return Err(RegistryError::ZeroWeight {
                table: table.name,
                index,
            });
        }
        self.tables.insert(table.name.clone(), table);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Table, RegistryError> {
        self.tables
            .get(name)
            .ok_or_else(|| RegistryError::UnknownTable(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Move every table of `other` into this registry. Tables never shadow
    /// each other: a repeated name is an error.
    pub fn merge(&mut self, other: TableRegistry) -> Result<(), RegistryError> {
        for (_, table) in other.tables {
            self.register(table)?;
        }
        Ok(())
    }

    /// Parse a set of tables from a RON string:
    /// `{ "table_name": [ (weight: 2, value: Key("...")), ... ] }`.
    /// Tables are registered in file order; a name declared twice in one
    /// file is a `DuplicateTable` error like any other repeat.
    pub fn parse_ron(input: &str) -> Result<TableRegistry, RegistryError> {
        let MapPairs(raw) = ron::from_str::<MapPairs<Vec<Entry>>>(input)?;
        let mut registry = TableRegistry::new();
        for (name, entries) in raw {
            registry.register(Table::new(name, entries))?;
        }
        Ok(registry)
    }

    /// Load a set of tables from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<TableRegistry, RegistryError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Check that every referenced table exists and that references form a
    /// DAG. Tables are checked in registration order, so the reported error
    /// is stable for a given data set.
    pub fn validate(&self) -> Result<(), RegistryError> {
        for table in self.tables.values() {
            for reference in table.references() {
                if !self.tables.contains_key(reference) {
                    return Err(RegistryError::DanglingReference {
                        missing: reference.to_string(),
                        referrer: table.name.clone(),
                    });
                }
            }
        }

        let mut marks: FxHashMap<&str, Mark> = FxHashMap::default();
        let mut path: Vec<&str> = Vec::new();
        for name in self.tables.keys() {
            self.visit(name, &mut marks, &mut path)?;
        }
        Ok(())
    }

    fn visit<'a>(
        &'a self,
        name: &'a str,
        marks: &mut FxHashMap<&'a str, Mark>,
        path: &mut Vec<&'a str>,
    ) -> Result<(), RegistryError> {
        match marks.get(name) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                let start = path.iter().position(|n| *n == name).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..].iter().map(|n| n.to_string()).collect();
                cycle.push(name.to_string());
                return Err(RegistryError::CyclicReference { cycle });
            }
            None => {}
        }

        // Dangling references were rejected before the traversal started.
        let Some(table) = self.tables.get(name) else {
            return Ok(());
        };

        marks.insert(name, Mark::Visiting);
        path.push(name);
        for reference in table.references() {
            self.visit(reference, marks, path)?;
        }
        path.pop();
        marks.insert(name, Mark::Done);
        Ok(())
    }

    /// Validate and seal the registry. Only the frozen form can be
    /// selected from.
    pub fn freeze(self) -> Result<FrozenRegistry, RegistryError> {
        self.validate()?;
        info!(tables = self.tables.len(), "table registry frozen");
        Ok(FrozenRegistry {
            tables: self.tables,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// A validated, immutable set of tables: no dangling references, no
/// cycles, no empty tables. Safe to share across threads.
#[derive(Debug, Clone)]
pub struct FrozenRegistry {
    tables: TableMap,
}

impl FrozenRegistry {
    pub fn get(&self, name: &str) -> Result<&Table, RegistryError> {
        self.tables
            .get(name)
            .ok_or_else(|| RegistryError::UnknownTable(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Tables in registration order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    /// Check a domain schema against this registry: unique field names and
    /// no references to missing tables.
    pub fn check_schema(&self, schema: &DomainSchema) -> Result<(), RegistryError> {
        let mut seen = rustc_hash::FxHashSet::default();
        for spec in &schema.fields {
            if !seen.insert(spec.field.as_str()) {
                return Err(RegistryError::DuplicateField {
                    domain: schema.name.clone(),
                    field: spec.field.clone(),
                });
            }
            if !self.contains(&spec.table) {
                return Err(RegistryError::DanglingReference {
                    missing: spec.table.clone(),
                    referrer: format!("domain:{}", schema.name),
                });
            }
        }
        debug!(domain = %schema.name, fields = schema.fields.len(), "domain schema checked");
        Ok(())
    }
}
