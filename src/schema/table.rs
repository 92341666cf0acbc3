/// Generation tables — weighted entries and the payloads they carry.

use serde::{Deserialize, Serialize};

/// Relative selection weight of an entry.
pub type Weight = u32;

/// Weight given to entries that do not declare one.
pub const DEFAULT_WEIGHT: Weight = 1;

fn default_weight() -> Weight {
    DEFAULT_WEIGHT
}

fn default_separator() -> String {
    " ".to_string()
}

/// What an entry produces once it is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    /// Text emitted as-is in every locale.
    Literal(String),
    /// A localization key, resolved against a locale bundle after selection.
    Key(String),
    /// Reference to another table: `Ref("male_forename")`.
    Ref(String),
    /// Ordered parts merged into one value.
    ///
    /// Parts are joined with `separator`, unless `pattern` names a
    /// localization key whose text places them with `{0}`, `{1}`, ...
    Composite {
        parts: Vec<Payload>,
        #[serde(default = "default_separator")]
        separator: String,
        #[serde(default)]
        pattern: Option<String>,
    },
    /// Named sub-fields, producing a nested tree.
    Record(Vec<(String, Payload)>),
}

impl Payload {
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    pub fn key(key: impl Into<String>) -> Self {
        Self::Key(key.into())
    }

    pub fn reference(table: impl Into<String>) -> Self {
        Self::Ref(table.into())
    }

    /// Parts joined by a single space.
    pub fn composite(parts: Vec<Payload>) -> Self {
        Self::Composite {
            parts,
            separator: default_separator(),
            pattern: None,
        }
    }

    /// Parts placed by the localized pattern stored under `pattern_key`.
    pub fn patterned(pattern_key: impl Into<String>, parts: Vec<Payload>) -> Self {
        Self::Composite {
            parts,
            separator: default_separator(),
            pattern: Some(pattern_key.into()),
        }
    }

    pub fn record<K: Into<String>>(fields: impl IntoIterator<Item = (K, Payload)>) -> Self {
        Self::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Visit this payload and every payload nested inside it, depth first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Payload)) {
        visit(self);
        match self {
            Self::Literal(_) | Self::Key(_) | Self::Ref(_) => {}
            Self::Composite { parts, .. } => {
                for part in parts {
                    part.walk(visit);
                }
            }
            Self::Record(fields) => {
                for (_, payload) in fields {
                    payload.walk(visit);
                }
            }
        }
    }
}

/// One weighted option within a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default = "default_weight")]
    pub weight: Weight,
    pub value: Payload,
}

impl Entry {
    pub fn new(value: Payload) -> Self {
        Self {
            weight: DEFAULT_WEIGHT,
            value,
        }
    }

    pub fn with_weight(mut self, weight: Weight) -> Self {
        self.weight = weight;
        self
    }
}

/// A named, ordered collection of weighted entries.
///
/// Entry order matters: selection scans entries in declared order, so the
/// same draw always lands on the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub entries: Vec<Entry>,
}

impl Table {
    pub fn new(name: impl Into<String>, entries: Vec<Entry>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }

    /// A table where every payload has the default weight.
    pub fn uniform(name: impl Into<String>, payloads: impl IntoIterator<Item = Payload>) -> Self {
        Self::new(name, payloads.into_iter().map(Entry::new).collect())
    }

    pub fn total_weight(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.weight)).sum()
    }

    /// Names of every table referenced by this table's entries, in
    /// declaration order. Duplicates are kept.
    pub fn references(&self) -> Vec<&str> {
        let mut refs = Vec::new();
        for entry in &self.entries {
            entry.value.walk(&mut |payload| {
                if let Payload::Ref(name) = payload {
                    refs.push(name.as_str());
                }
            });
        }
        refs
    }

    /// Every localization key this table can emit, including pattern keys.
    pub fn localization_keys(&self) -> Vec<&str> {
        let mut keys = Vec::new();
        for entry in &self.entries {
            entry.value.walk(&mut |payload| match payload {
                Payload::Key(key) => keys.push(key.as_str()),
                Payload::Composite {
                    pattern: Some(key), ..
                } => keys.push(key.as_str()),
                _ => {}
            });
        }
        keys
    }
}
