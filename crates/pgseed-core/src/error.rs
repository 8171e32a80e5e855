use thiserror::Error;

use crate::schema::TableId;

/// Core error type shared across pgseed crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Database error or adapter failure.
    #[error("database error: {0}")]
    Db(String),
    /// The foreign key graph contains at least one cycle.
    #[error("cyclic dependency between tables: {}", join_ids(.tables))]
    CyclicDependency { tables: Vec<TableId> },
    /// A table identifier was looked up but never registered.
    #[error("table not found: {0}")]
    TableNotFound(TableId),
    /// A table identifier was registered twice.
    #[error("duplicate table: {0}")]
    DuplicateTable(TableId),
    /// Catalog rows violate internal invariants.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    /// A requested feature is not supported.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Convenience alias for results returned by pgseed crates.
pub type Result<T> = std::result::Result<T, Error>;

fn join_ids(ids: &[TableId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
