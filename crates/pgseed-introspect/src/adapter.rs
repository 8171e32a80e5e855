use async_trait::async_trait;

use pgseed_core::{Result, TableId};

/// One `(schema, table, column, type)` tuple from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRow {
    pub schema: String,
    pub table: String,
    pub column: String,
    pub data_type: String,
    /// Column default expression, used to spot sequence-backed integers.
    pub default: Option<String>,
    pub is_identity: bool,
}

/// One column pair of a foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRow {
    pub schema: String,
    pub table: String,
    pub column: String,
    pub constraint_name: String,
    pub parent_schema: String,
    pub parent_table: String,
    pub parent_column: String,
}

/// Read-only view of a database catalog.
///
/// Implementations are pure queries: none of these calls may change the
/// database.
#[async_trait]
pub trait CatalogAdapter: Send + Sync {
    /// Returns the engine identifier (e.g. `postgres`).
    fn engine(&self) -> &'static str;

    /// Columns of every seedable table, grouped by table in catalog order.
    async fn list_columns(&self) -> Result<Vec<ColumnRow>>;

    async fn list_foreign_keys(&self) -> Result<Vec<ForeignKeyRow>>;

    /// Underlying type name of a `USER-DEFINED` column.
    async fn resolve_user_defined_type(&self, table: &TableId, column: &str) -> Result<String>;

    /// Labels of an enum type in declaration order. Empty for non-enum types.
    async fn list_enum_labels(&self, type_name: &str) -> Result<Vec<String>>;
}
