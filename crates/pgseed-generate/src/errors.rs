use pgseed_core::TableId;
use thiserror::Error;

/// Errors emitted while generating and writing rows.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("unsupported column type '{data_type}' for {table}.{column}")]
    UnsupportedColumnType {
        table: TableId,
        column: String,
        data_type: String,
    },
    #[error("enum type '{type_name}' used by column '{column}' has no labels")]
    EmptyEnum { type_name: String, column: String },
    #[error(transparent)]
    Core(#[from] pgseed_core::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, GenerationError>;
