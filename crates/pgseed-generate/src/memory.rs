use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use pgseed_core::{DependencyGraph, Result, TableId};

use crate::live::{ExistingValue, LiveDataSource};
use crate::materializer::{InsertStatement, StoreWriter};

type StoredRow = HashMap<String, Option<String>>;

/// Store that keeps inserted rows in memory.
///
/// Backs `fill --dry-run` and the tests: sampling reads back rows inserted
/// earlier in the same run. Auto-incrementing columns registered with
/// [`InMemoryStore::track_sequences`] are assigned 1, 2, 3, ... per table.
#[derive(Debug)]
pub struct InMemoryStore {
    rows: BTreeMap<TableId, Vec<StoredRow>>,
    sequences: BTreeMap<TableId, Vec<String>>,
    statements: Vec<InsertStatement>,
    rng: ChaCha8Rng,
}

impl InMemoryStore {
    pub fn new(seed: u64) -> Self {
        Self {
            rows: BTreeMap::new(),
            sequences: BTreeMap::new(),
            statements: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Record every auto-incrementing column of `graph` so inserted rows get
    /// a value for it, the way the database default would.
    pub fn track_sequences(&mut self, graph: &DependencyGraph) {
        for table in graph.tables() {
            let columns: Vec<String> = table
                .columns()
                .iter()
                .filter(|column| column.column_type.is_auto_increment())
                .map(|column| column.name.clone())
                .collect();
            if !columns.is_empty() {
                self.sequences.insert(table.id().clone(), columns);
            }
        }
    }

    /// Seed a table with existing rows.
    pub fn insert_existing<I, K, V>(&mut self, table: &TableId, row: I)
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        let row = row
            .into_iter()
            .map(|(column, value)| (column.into(), value.map(Into::into)))
            .collect();
        self.rows.entry(table.clone()).or_default().push(row);
    }

    pub fn row_count(&self, table: &TableId) -> usize {
        self.rows.get(table).map_or(0, Vec::len)
    }

    /// Stored value of `column` for every row of `table`, in insertion order.
    pub fn column_values(&self, table: &TableId, column: &str) -> Vec<Option<String>> {
        self.rows
            .get(table)
            .map(|rows| {
                rows.iter()
                    .map(|row| row.get(column).cloned().flatten())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Statements executed so far, in order.
    pub fn statements(&self) -> &[InsertStatement] {
        &self.statements
    }
}

#[async_trait]
impl LiveDataSource for InMemoryStore {
    async fn sample_existing_value(
        &mut self,
        table: &TableId,
        column: &str,
    ) -> Result<ExistingValue> {
        let Some(rows) = self.rows.get(table).filter(|rows| !rows.is_empty()) else {
            return Ok(ExistingValue::NoRows);
        };
        let idx = self.rng.random_range(0..rows.len());
        Ok(match rows[idx].get(column).cloned().flatten() {
            Some(value) => ExistingValue::Value(value),
            None => ExistingValue::Null,
        })
    }
}

#[async_trait]
impl StoreWriter for InMemoryStore {
    async fn execute_insert(&mut self, statement: &InsertStatement) -> Result<()> {
        let mut row: StoredRow = statement
            .columns
            .iter()
            .cloned()
            .zip(statement.values.iter().map(|literal| parse_literal(literal)))
            .collect();

        let next_id = self.row_count(&statement.table) + 1;
        if let Some(columns) = self.sequences.get(&statement.table) {
            for column in columns {
                row.entry(column.clone())
                    .or_insert_with(|| Some(next_id.to_string()));
            }
        }

        self.rows
            .entry(statement.table.clone())
            .or_default()
            .push(row);
        self.statements.push(statement.clone());
        Ok(())
    }
}

/// Turn a rendered literal back into its stored text form.
fn parse_literal(literal: &str) -> Option<String> {
    if literal == "NULL" {
        return None;
    }
    match literal
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
    {
        Some(inner) => Some(inner.replace("''", "'")),
        None => Some(literal.to_string()),
    }
}
