//! Core contracts for pgseed.
//!
//! This crate defines the schema model consumed by the generator, the foreign
//! key dependency graph that decides fill order, and helpers shared by the
//! adapters and the CLI.

pub mod error;
pub mod graph;
pub mod redaction;
pub mod schema;

pub use error::{Error, Result};
pub use graph::DependencyGraph;
pub use redaction::{RedactedConnection, redact_connection_string};
pub use schema::{
    Column, ColumnType, ForeignKeyConstraint, IDENTIFIER_COLUMN, IntegerWidth, TableId, TableNode,
};
