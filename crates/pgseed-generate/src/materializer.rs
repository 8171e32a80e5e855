use std::fmt;

use async_trait::async_trait;
use tracing::debug;

use pgseed_core::{ColumnType, IDENTIFIER_COLUMN, TableId};

use crate::errors::Result;
use crate::value::{SampleEntry, SampleRow};

/// How a value of a given column type is written in SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralStyle {
    /// Single-quoted string literal.
    Quoted,
    Bare,
}

impl LiteralStyle {
    pub fn for_type(column_type: ColumnType) -> Self {
        match column_type {
            ColumnType::Integer { .. }
            | ColumnType::Numeric
            | ColumnType::Boolean
            | ColumnType::Float => LiteralStyle::Bare,
            ColumnType::Text
            | ColumnType::Date
            | ColumnType::Timestamp { .. }
            | ColumnType::Json
            | ColumnType::UserDefined
            | ColumnType::Unsupported => LiteralStyle::Quoted,
        }
    }
}

/// Single-quote `value`, doubling embedded quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Double-quote an identifier, doubling embedded quotes.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Render one entry as a SQL literal.
///
/// Returns `None` for a NULL identifier so the column is left to its
/// default.
pub fn render_literal(entry: &SampleEntry) -> Option<String> {
    if entry.value.is_null() {
        if entry.column == IDENTIFIER_COLUMN {
            return None;
        }
        return Some("NULL".to_string());
    }
    let text = entry.value.to_string();
    match LiteralStyle::for_type(entry.column_type) {
        LiteralStyle::Bare => Some(text),
        LiteralStyle::Quoted => Some(quote_literal(&text)),
    }
}

/// Column list and literal list for one INSERT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    pub table: TableId,
    pub columns: Vec<String>,
    pub values: Vec<String>,
}

impl InsertStatement {
    pub fn to_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|column| quote_ident(column))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {}.{} ({}) VALUES ({})",
            quote_ident(&self.table.schema),
            quote_ident(&self.table.name),
            columns,
            self.values.join(", ")
        )
    }
}

impl fmt::Display for InsertStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// Build the INSERT for `row`, or `None` when nothing is left to write.
pub fn render_insert(table: &TableId, row: &SampleRow) -> Option<InsertStatement> {
    let mut columns = Vec::with_capacity(row.len());
    let mut values = Vec::with_capacity(row.len());
    for entry in row.iter() {
        if let Some(literal) = render_literal(entry) {
            columns.push(entry.column.clone());
            values.push(literal);
        }
    }
    if columns.is_empty() {
        return None;
    }
    Some(InsertStatement {
        table: table.clone(),
        columns,
        values,
    })
}

/// Write access to the target store.
#[async_trait]
pub trait StoreWriter: Send {
    /// Execute and commit one INSERT.
    async fn execute_insert(&mut self, statement: &InsertStatement) -> pgseed_core::Result<()>;
}

/// Materialize `row` into `table`. Returns `false` when the row was empty and
/// nothing was written.
pub async fn insert_row<W>(writer: &mut W, table: &TableId, row: &SampleRow) -> Result<bool>
where
    W: StoreWriter + ?Sized,
{
    let Some(statement) = render_insert(table, row) else {
        debug!(table = %table, "empty row skipped");
        return Ok(false);
    };
    writer.execute_insert(&statement).await?;
    Ok(true)
}
