use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use pgseed_core::{Result, TableId};

use crate::adapter::{CatalogAdapter, ColumnRow, ForeignKeyRow};

/// Catalog wrapper that memoizes user-defined type and enum label lookups.
///
/// One instance is meant to live for a single seeding run; dropping it drops
/// the cache.
#[derive(Debug)]
pub struct CachedCatalog<C> {
    inner: C,
    user_types: Mutex<HashMap<(TableId, String), String>>,
    enum_labels: Mutex<HashMap<String, Vec<String>>>,
}

impl<C> CachedCatalog<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            user_types: Mutex::new(HashMap::new()),
            enum_labels: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait]
impl<C: CatalogAdapter> CatalogAdapter for CachedCatalog<C> {
    fn engine(&self) -> &'static str {
        self.inner.engine()
    }

    async fn list_columns(&self) -> Result<Vec<ColumnRow>> {
        self.inner.list_columns().await
    }

    async fn list_foreign_keys(&self) -> Result<Vec<ForeignKeyRow>> {
        self.inner.list_foreign_keys().await
    }

    async fn resolve_user_defined_type(&self, table: &TableId, column: &str) -> Result<String> {
        let key = (table.clone(), column.to_string());
        let cached = lock(&self.user_types).get(&key).cloned();
        if let Some(type_name) = cached {
            return Ok(type_name);
        }

        let type_name = self.inner.resolve_user_defined_type(table, column).await?;
        debug!(table = %table, column, type_name = %type_name, "resolved user-defined type");
        lock(&self.user_types).insert(key, type_name.clone());
        Ok(type_name)
    }

    async fn list_enum_labels(&self, type_name: &str) -> Result<Vec<String>> {
        let cached = lock(&self.enum_labels).get(type_name).cloned();
        if let Some(labels) = cached {
            return Ok(labels);
        }

        let labels = self.inner.list_enum_labels(type_name).await?;
        debug!(type_name, labels = labels.len(), "loaded enum labels");
        lock(&self.enum_labels).insert(type_name.to_string(), labels.clone());
        Ok(labels)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
