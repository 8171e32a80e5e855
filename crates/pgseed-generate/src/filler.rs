use std::time::Instant;

use tracing::{debug, info, warn};

use pgseed_core::DependencyGraph;
use pgseed_introspect::CatalogAdapter;

use crate::errors::Result;
use crate::generator::ValueGenerator;
use crate::live::LiveDataSource;
use crate::materializer::{StoreWriter, insert_row};
use crate::memory::InMemoryStore;
use crate::model::{FillOptions, FillReport, TableReport};

/// Fills every table of a dependency graph, parents first.
#[derive(Debug, Clone, Default)]
pub struct TableFiller {
    options: FillOptions,
}

impl TableFiller {
    pub fn new(options: FillOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FillOptions {
        &self.options
    }

    /// Generate and insert rows for each table in fill order.
    ///
    /// Runs strictly one row at a time: every row is written before the next
    /// dependent lookup, so children see the parents inserted earlier in the
    /// same run. The first failing insert stops the run.
    pub async fn fill_tables<C, S>(
        &self,
        catalog: &C,
        graph: &DependencyGraph,
        store: &mut S,
    ) -> Result<FillReport>
    where
        C: CatalogAdapter + ?Sized,
        S: LiveDataSource + StoreWriter + ?Sized,
    {
        let start = Instant::now();
        let order = graph.get_fill_order()?;
        let seed = self.options.seed.unwrap_or_else(rand::random);
        let mut generator = ValueGenerator::new(catalog, seed);
        let mut report = FillReport::new(seed);

        info!(tables = order.len(), seed, "fill started");

        for table in order {
            let id = table.id();
            report.fill_order.push(id.clone());
            if self.options.is_excluded(id) {
                info!(table = %id, "table excluded");
                report.excluded.push(id.clone());
                continue;
            }

            let rows = self.options.rows_for(id);
            let table_start = Instant::now();
            let mut table_report = TableReport::new(id.clone(), rows);
            info!(table = %id, rows, "filling table");

            for index in 0..rows {
                let row = generator.generate_row(table, graph, &mut *store).await?;
                let empty_parents = row.empty_parents();
                table_report.null_fallbacks += empty_parents as u64;
                table_report.null_references += (row.null_dependents() - empty_parents) as u64;
                if insert_row(&mut *store, id, &row).await? {
                    table_report.rows_inserted += 1;
                } else {
                    table_report.rows_skipped += 1;
                }
                debug!(table = %id, row = index, "row written");
            }

            if table_report.null_fallbacks > 0 {
                warn!(
                    table = %id,
                    null_fallbacks = table_report.null_fallbacks,
                    "parent tables were empty, dependent columns set to NULL"
                );
            }
            info!(
                table = %id,
                rows_inserted = table_report.rows_inserted,
                rows_skipped = table_report.rows_skipped,
                null_references = table_report.null_references,
                duration_ms = table_start.elapsed().as_millis() as u64,
                "table filled"
            );
            report.record_table(table_report);
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            tables = report.tables.len(),
            rows_inserted = report.rows_inserted_total,
            duration_ms = report.duration_ms,
            "fill completed"
        );
        Ok(report)
    }

    /// Fill `graph` into an [`InMemoryStore`] instead of a database.
    ///
    /// The seed is resolved once and drives both the value generator and the
    /// store's row sampling, so rerunning with the recorded seed replays the
    /// same statements.
    pub async fn dry_run<C>(
        &self,
        catalog: &C,
        graph: &DependencyGraph,
    ) -> Result<(FillReport, InMemoryStore)>
    where
        C: CatalogAdapter + ?Sized,
    {
        let mut options = self.options.clone();
        let seed = options.resolve_seed();
        let mut store = InMemoryStore::new(seed);
        store.track_sequences(graph);
        let report = TableFiller::new(options)
            .fill_tables(catalog, graph, &mut store)
            .await?;
        Ok((report, store))
    }
}
