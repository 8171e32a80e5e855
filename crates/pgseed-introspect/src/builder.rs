use std::collections::HashMap;

use tracing::info;

use pgseed_core::{Column, DependencyGraph, ForeignKeyConstraint, Result, TableId, TableNode};

use crate::adapter::{CatalogAdapter, ColumnRow, ForeignKeyRow};

/// Query the catalog and assemble the dependency graph for a run.
pub async fn build_dependency_graph<C>(catalog: &C) -> Result<DependencyGraph>
where
    C: CatalogAdapter + ?Sized,
{
    let columns = catalog.list_columns().await?;
    let foreign_keys = catalog.list_foreign_keys().await?;

    let graph = graph_from_rows(columns, foreign_keys)?;
    info!(
        engine = catalog.engine(),
        tables = graph.len(),
        edges = graph.edge_count(),
        "dependency graph built"
    );
    Ok(graph)
}

/// Build a graph from raw catalog rows.
///
/// Tables are registered in the order their first column appears; every
/// foreign key row becomes one constraint on its child table.
pub fn graph_from_rows(
    columns: Vec<ColumnRow>,
    foreign_keys: Vec<ForeignKeyRow>,
) -> Result<DependencyGraph> {
    let mut order: Vec<TableId> = Vec::new();
    let mut nodes: HashMap<TableId, TableNode> = HashMap::new();

    for row in columns {
        let id = TableId::new(row.schema, row.table);
        let node = nodes.entry(id.clone()).or_insert_with(|| {
            order.push(id.clone());
            TableNode::new(id)
        });
        node.add_column(Column::from_catalog(
            row.column,
            row.data_type,
            row.default.as_deref(),
            row.is_identity,
        ));
    }

    let mut graph = DependencyGraph::new();
    for id in order {
        if let Some(node) = nodes.remove(&id) {
            graph.add_table(node)?;
        }
    }

    for row in foreign_keys {
        graph.add_edge(ForeignKeyConstraint {
            name: row.constraint_name,
            parent_table: TableId::new(row.parent_schema, row.parent_table),
            parent_column: row.parent_column,
            child_table: TableId::new(row.schema, row.table),
            child_column: row.column,
        })?;
    }

    Ok(graph)
}
