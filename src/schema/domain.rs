use serde::{Deserialize, Serialize};

/// The content domains shipped with the bundled Maze Rats data.
///
/// Schemas are data, so any other name registered with a generator is
/// reachable through `Domain::Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    Character,
    Spell,
    Custom(String),
}

impl Domain {
    pub fn name(&self) -> &str {
        match self {
            Self::Character => "character",
            Self::Spell => "spell",
            Self::Custom(name) => name,
        }
    }
}

impl From<&str> for Domain {
    fn from(name: &str) -> Self {
        match name {
            "character" => Self::Character,
            "spell" => Self::Spell,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One output field and the table that fills it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub field: String,
    pub table: String,
}

/// Maps a domain to the ordered fields its generation produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainSchema {
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

impl DomainSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field filled from `table`.
    pub fn field(mut self, field: impl Into<String>, table: impl Into<String>) -> Self {
        self.fields.push(FieldSpec {
            field: field.into(),
            table: table.into(),
        });
        self
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.field.as_str())
    }

    /// Parse a list of schemas from RON:
    ///
    /// ```ron
    /// [
    ///     Domain(name: "spell", fields: [("name", "spell_name")]),
    /// ]
    /// ```
    pub fn parse_ron(input: &str) -> Result<Vec<DomainSchema>, ron::error::SpannedError> {
        let raw: Vec<RonDomain> = ron::from_str(input)?;
        Ok(raw
            .into_iter()
            .map(|domain| DomainSchema {
                name: domain.name,
                fields: domain
                    .fields
                    .into_iter()
                    .map(|(field, table)| FieldSpec { field, table })
                    .collect(),
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename = "Domain")]
struct RonDomain {
    name: String,
    fields: Vec<(String, String)>,
}
