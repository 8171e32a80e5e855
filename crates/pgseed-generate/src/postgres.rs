use async_trait::async_trait;
use sqlx::{Connection, PgConnection};
use tracing::debug;

use pgseed_core::{Error, Result, TableId};

use crate::live::{ExistingValue, LiveDataSource};
use crate::materializer::{InsertStatement, StoreWriter, quote_ident};

/// Live data source and store writer over a single Postgres session.
///
/// Every INSERT runs in autocommit mode, so a sample taken after it already
/// sees the new row.
pub struct PostgresStore {
    conn: PgConnection,
}

impl PostgresStore {
    pub async fn connect(url: &str) -> Result<Self> {
        let conn = PgConnection::connect(url)
            .await
            .map_err(|err| Error::Db(err.to_string()))?;
        Ok(Self { conn })
    }

    pub fn from_connection(conn: PgConnection) -> Self {
        Self { conn }
    }

    pub async fn close(self) -> Result<()> {
        self.conn
            .close()
            .await
            .map_err(|err| Error::Db(err.to_string()))
    }
}

#[async_trait]
impl LiveDataSource for PostgresStore {
    async fn sample_existing_value(
        &mut self,
        table: &TableId,
        column: &str,
    ) -> Result<ExistingValue> {
        let sql = format!(
            "SELECT {}::text FROM {}.{} ORDER BY random() LIMIT 1",
            quote_ident(column),
            quote_ident(&table.schema),
            quote_ident(&table.name)
        );
        let value = sqlx::query_scalar::<_, Option<String>>(&sql)
            .fetch_optional(&mut self.conn)
            .await
            .map_err(|err| Error::Db(format!("sampling {table}.{column}: {err}")))?;
        Ok(match value {
            None => ExistingValue::NoRows,
            Some(None) => ExistingValue::Null,
            Some(Some(value)) => ExistingValue::Value(value),
        })
    }
}

#[async_trait]
impl StoreWriter for PostgresStore {
    async fn execute_insert(&mut self, statement: &InsertStatement) -> Result<()> {
        let sql = statement.to_sql();
        debug!(table = %statement.table, sql = %sql, "insert");
        sqlx::query(&sql)
            .execute(&mut self.conn)
            .await
            .map_err(|err| Error::Db(format!("insert into {}: {err}", statement.table)))?;
        Ok(())
    }
}
