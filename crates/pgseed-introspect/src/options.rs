/// Options that control which tables the catalog exposes.
#[derive(Debug, Clone, Default)]
pub struct IntrospectOptions {
    /// Restrict introspection to these schemas. `None` means every
    /// non-system schema.
    pub schemas: Option<Vec<String>>,
}

impl IntrospectOptions {
    pub fn with_schemas(schemas: Vec<String>) -> Self {
        Self {
            schemas: if schemas.is_empty() {
                None
            } else {
                Some(schemas)
            },
        }
    }

    /// Schema filter as bound into catalog queries; empty means no filter.
    pub fn schema_filter(&self) -> Vec<String> {
        self.schemas.clone().unwrap_or_default()
    }
}
