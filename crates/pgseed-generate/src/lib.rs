//! Row generation and insertion for pgseed.
//!
//! This crate turns a [`pgseed_core::DependencyGraph`] into rows: the
//! [`ValueGenerator`] synthesizes type-correct values and resolves foreign
//! keys against live data, the materializer renders INSERT statements, and
//! the [`TableFiller`] drives both in fill order.

pub mod errors;
pub mod filler;
pub mod generator;
pub mod live;
pub mod materializer;
pub mod memory;
pub mod model;
pub mod output;
pub mod postgres;
pub mod value;

pub use errors::GenerationError;
pub use filler::TableFiller;
pub use generator::ValueGenerator;
pub use live::{ExistingValue, LiveDataSource};
pub use materializer::{
    InsertStatement, LiteralStyle, StoreWriter, insert_row, quote_ident, quote_literal,
    render_insert, render_literal,
};
pub use memory::InMemoryStore;
pub use model::{DEFAULT_ROWS_PER_TABLE, FillOptions, FillReport, TableReport};
pub use postgres::PostgresStore;
pub use value::{SampleEntry, SampleRow, SampleValue};
