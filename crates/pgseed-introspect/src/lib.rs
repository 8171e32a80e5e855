//! Catalog adapters for pgseed.
//!
//! The generator only ever sees the [`CatalogAdapter`] trait; the Postgres
//! implementation and the run-scoped enum cache live here.

pub mod adapter;
pub mod builder;
pub mod cache;
pub mod options;
pub mod postgres;

pub use adapter::{CatalogAdapter, ColumnRow, ForeignKeyRow};
pub use builder::{build_dependency_graph, graph_from_rows};
pub use cache::CachedCatalog;
pub use options::IntrospectOptions;
pub use postgres::PostgresCatalog;
