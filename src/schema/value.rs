/// Generation results, before and after localization.

use indexmap::IndexMap;
use serde::Serialize;

/// An ordered, unlocalized result tree.
pub type ResolvedTree = IndexMap<String, ResolvedValue>;

/// An ordered, localized result tree. This is what callers receive.
pub type Tree = IndexMap<String, Value>;

/// A selected value whose localization keys have not been looked up yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedValue {
    Literal(String),
    /// A localization key awaiting lookup.
    Pending(String),
    /// Parts of a composite entry, merged once each part is localized.
    Join {
        parts: Vec<ResolvedValue>,
        separator: String,
        pattern: Option<String>,
    },
    Tree(ResolvedTree),
}

/// A localized value: plain text or a nested tree of named values.
///
/// Serializes untagged, so a generation renders as a plain JSON object of
/// strings and sub-objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Tree(Tree),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Tree(_) => None,
        }
    }

    pub fn as_tree(&self) -> Option<&Tree> {
        match self {
            Self::Text(_) => None,
            Self::Tree(tree) => Some(tree),
        }
    }

    /// Collapse into a single string. Nested trees contribute their leaves
    /// in field order, joined with `separator`.
    pub fn flatten(self, separator: &str) -> String {
        match self {
            Self::Text(text) => text,
            Self::Tree(tree) => tree
                .into_values()
                .map(|v| v.flatten(separator))
                .collect::<Vec<_>>()
                .join(separator),
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Tree(tree) => {
                f.write_str("{")?;
                for (i, (field, value)) in tree.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{field}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abilities() -> Tree {
        let mut tree = Tree::new();
        tree.insert("strength".to_string(), Value::from("+2"));
        tree.insert("dexterity".to_string(), Value::from("+0"));
        tree.insert("will".to_string(), Value::from("+0"));
        tree
    }

    #[test]
    fn flatten_joins_tree_leaves_in_order() {
        assert_eq!(Value::Tree(abilities()).flatten(" / "), "+2 / +0 / +0");
        assert_eq!(Value::from("Gaunt").flatten(" / "), "Gaunt");
    }

    #[test]
    fn display_renders_nested_trees() {
        let value = Value::Tree(abilities());
        assert_eq!(
            value.to_string(),
            "{strength: +2, dexterity: +0, will: +0}"
        );
    }
}
