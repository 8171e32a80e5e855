use async_trait::async_trait;
use sqlx::PgPool;

use pgseed_core::{Error, Result, TableId};

use crate::adapter::{CatalogAdapter, ColumnRow, ForeignKeyRow};
use crate::options::IntrospectOptions;

mod mapper;
mod queries;

/// Catalog adapter for PostgreSQL databases.
#[derive(Debug, Clone)]
pub struct PostgresCatalog {
    pool: PgPool,
    options: IntrospectOptions,
}

impl PostgresCatalog {
    /// Create a new adapter using a pre-configured pool.
    pub fn new(pool: PgPool, options: IntrospectOptions) -> Self {
        Self { pool, options }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CatalogAdapter for PostgresCatalog {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    async fn list_columns(&self) -> Result<Vec<ColumnRow>> {
        let raw = queries::list_columns(&self.pool, &self.options.schema_filter()).await?;
        Ok(mapper::map_columns(raw))
    }

    async fn list_foreign_keys(&self) -> Result<Vec<ForeignKeyRow>> {
        let raw = queries::list_foreign_keys(&self.pool, &self.options.schema_filter()).await?;
        Ok(mapper::map_foreign_keys(raw))
    }

    async fn resolve_user_defined_type(&self, table: &TableId, column: &str) -> Result<String> {
        queries::user_defined_type(&self.pool, &table.schema, &table.name, column)
            .await?
            .ok_or_else(|| {
                Error::InvalidSchema(format!("user-defined type not found for {table}.{column}"))
            })
    }

    async fn list_enum_labels(&self, type_name: &str) -> Result<Vec<String>> {
        queries::enum_labels(&self.pool, type_name).await
    }
}
