/// Weighted selection and recursive reference expansion.

use thiserror::Error;
use tracing::debug;

use crate::core::random::{RandomError, RandomSource};
use crate::core::registry::{FrozenRegistry, RegistryError};
use crate::schema::table::{Entry, Payload, Table};
use crate::schema::value::{ResolvedTree, ResolvedValue};

#[derive(Debug, Error)]
pub enum SelectError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Random(#[from] RandomError),
}

/// Selects entries from a frozen registry.
///
/// The registry guarantees an acyclic reference graph, so recursion depth
/// is bounded by its longest reference chain.
#[derive(Debug, Clone, Copy)]
pub struct Selector<'r> {
    registry: &'r FrozenRegistry,
}

impl<'r> Selector<'r> {
    pub fn new(registry: &'r FrozenRegistry) -> Self {
        Self { registry }
    }

    /// Pick one entry of `table` and expand it into an unlocalized value.
    pub fn select(
        &self,
        table: &str,
        source: &mut dyn RandomSource,
    ) -> Result<ResolvedValue, SelectError> {
        let table = self.registry.get(table)?;
        let entry = pick(table, source)?;
        self.resolve(&entry.value, source)
    }

    /// Expand a payload. Parts and record fields are resolved in declared
    /// order, each taking its own draws from `source`.
    pub fn resolve(
        &self,
        payload: &Payload,
        source: &mut dyn RandomSource,
    ) -> Result<ResolvedValue, SelectError> {
        match payload {
            Payload::Literal(text) => Ok(ResolvedValue::Literal(text.clone())),
            Payload::Key(key) => Ok(ResolvedValue::Pending(key.clone())),
            Payload::Ref(name) => self.select(name, source),
            Payload::Composite {
                parts,
                separator,
                pattern,
            } => {
                let parts = parts
                    .iter()
                    .map(|part| self.resolve(part, source))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ResolvedValue::Join {
                    parts,
                    separator: separator.clone(),
                    pattern: pattern.clone(),
                })
            }
            Payload::Record(fields) => {
                let mut tree = ResolvedTree::with_capacity(fields.len());
                for (field, payload) in fields {
                    tree.insert(field.clone(), self.resolve(payload, source)?);
                }
                Ok(ResolvedValue::Tree(tree))
            }
        }
    }
}

/// Draw `r` in `[0, W)` and return the entry whose cumulative weight range
/// contains it, scanning in declared order.
pub fn pick<'t>(table: &'t Table, source: &mut dyn RandomSource) -> Result<&'t Entry, SelectError> {
    let total = table.total_weight();
    let roll = source.next_int(total)?;
    let mut cumulative = 0u64;
    for (index, entry) in table.entries.iter().enumerate() {
        cumulative += u64::from(entry.weight);
        if roll < cumulative {
            debug!(table = %table.name, roll, total, index, "entry selected");
            return Ok(entry);
        }
    }
    Err(RandomError::OutOfRange {
        value: roll,
        bound: total,
    }
    .into())
}
