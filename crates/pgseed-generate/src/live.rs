use async_trait::async_trait;
use pgseed_core::{Result, TableId};

/// Outcome of sampling one column of a parent table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExistingValue {
    /// The table has no rows.
    NoRows,
    /// The sampled row holds NULL in that column.
    Null,
    Value(String),
}

/// Read access to rows already present in the target store.
#[async_trait]
pub trait LiveDataSource: Send {
    /// One existing value of `table.column`, picked uniformly at random.
    async fn sample_existing_value(&mut self, table: &TableId, column: &str)
    -> Result<ExistingValue>;
}
