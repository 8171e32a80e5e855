use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use pgseed_core::TableId;

pub const DEFAULT_ROWS_PER_TABLE: u64 = 10;

/// Options for a fill run.
#[derive(Debug, Clone)]
pub struct FillOptions {
    /// Rows generated for tables without an explicit count.
    pub rows_per_table: u64,
    /// Per-table row count overrides.
    pub table_rows: BTreeMap<TableId, u64>,
    /// Tables left untouched.
    pub exclude: BTreeSet<TableId>,
    /// Seed for the value generator. A random one is drawn when absent.
    pub seed: Option<u64>,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            rows_per_table: DEFAULT_ROWS_PER_TABLE,
            table_rows: BTreeMap::new(),
            exclude: BTreeSet::new(),
            seed: None,
        }
    }
}

impl FillOptions {
    pub fn rows_for(&self, table: &TableId) -> u64 {
        self.table_rows
            .get(table)
            .copied()
            .unwrap_or(self.rows_per_table)
    }

    pub fn is_excluded(&self, table: &TableId) -> bool {
        self.exclude.contains(table)
    }

    /// Fix the seed for this run, drawing a random one when none is set.
    pub fn resolve_seed(&mut self) -> u64 {
        *self.seed.get_or_insert_with(rand::random)
    }
}

/// Outcome for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReport {
    pub table: TableId,
    pub rows_requested: u64,
    pub rows_inserted: u64,
    /// Rows that rendered no columns and were not written.
    pub rows_skipped: u64,
    /// Dependent values set to NULL because the parent table had no rows.
    pub null_fallbacks: u64,
    /// Dependent values copied as NULL from a parent row.
    pub null_references: u64,
}

impl TableReport {
    pub fn new(table: TableId, rows_requested: u64) -> Self {
        Self {
            table,
            rows_requested,
            rows_inserted: 0,
            rows_skipped: 0,
            null_fallbacks: 0,
            null_references: 0,
        }
    }
}

/// Report for a fill run, written as `fill_report.json`.
#[derive(Debug, Clone, Serialize)]
pub struct FillReport {
    pub seed: u64,
    pub fill_order: Vec<TableId>,
    pub excluded: Vec<TableId>,
    pub tables: Vec<TableReport>,
    pub rows_inserted_total: u64,
    pub duration_ms: u64,
}

impl FillReport {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            fill_order: Vec::new(),
            excluded: Vec::new(),
            tables: Vec::new(),
            rows_inserted_total: 0,
            duration_ms: 0,
        }
    }

    pub fn record_table(&mut self, report: TableReport) {
        self.rows_inserted_total += report.rows_inserted;
        self.tables.push(report);
    }

    pub fn table(&self, table: &TableId) -> Option<&TableReport> {
        self.tables.iter().find(|report| &report.table == table)
    }
}
