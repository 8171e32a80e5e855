use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use pgseed_core::{DependencyGraph, TableNode};

use crate::errors::Result;

pub const DEPENDENCIES_FILE: &str = "dependencies.txt";
pub const FILL_ORDER_FILE: &str = "fill_order.txt";
pub const DOT_FILE: &str = "depgraph.dot";

/// Every table with its columns and parent relationships, then the edge list.
pub fn render_dependency_listing(graph: &DependencyGraph) -> String {
    let mut out = String::new();
    for table in graph.tables() {
        let _ = writeln!(out, "{table}");
    }
    let _ = writeln!(out, "Edges: ({})", graph.edge_count());
    for (parent, child) in graph.edges() {
        let _ = writeln!(out, "  {parent} -> {child}");
    }
    out
}

/// Numbered fill order, one table per line.
pub fn render_fill_order(order: &[&TableNode]) -> String {
    let mut out = String::new();
    for (idx, table) in order.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", idx + 1, table.id());
    }
    out
}

/// Graphviz source for the graph, one `parent -> child` edge per foreign key.
///
/// Tables without any edge are listed as bare nodes so they still show up
/// when the file is rendered.
pub fn render_dot(graph: &DependencyGraph) -> String {
    let edges = graph.edges();
    let linked: HashSet<_> = edges
        .iter()
        .flat_map(|(parent, child)| [*parent, *child])
        .collect();

    let mut out = String::from("digraph {\n");
    for table in graph.tables() {
        if !linked.contains(table.id()) {
            let _ = writeln!(out, "  {};", dot_id(&table.id().to_string()));
        }
    }
    for (parent, child) in edges {
        let _ = writeln!(
            out,
            "  {} -> {};",
            dot_id(&parent.to_string()),
            dot_id(&child.to_string())
        );
    }
    out.push_str("}\n");
    out
}

fn dot_id(name: &str) -> String {
    format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Write `depgraph.dot` into `dir`.
pub fn write_dot(graph: &DependencyGraph, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(DOT_FILE);
    fs::write(&path, render_dot(graph))?;
    Ok(path)
}

/// Write `dependencies.txt`, `depgraph.dot` and `fill_order.txt` into `dir`.
///
/// The listing and the dot file are written before the order is computed, so
/// a cyclic graph still leaves them behind for inspection.
pub fn write_dependency_listing(graph: &DependencyGraph, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let listing_path = dir.join(DEPENDENCIES_FILE);
    fs::write(&listing_path, render_dependency_listing(graph))?;
    let dot_path = write_dot(graph, dir)?;

    let order = graph.get_fill_order()?;
    let order_path = dir.join(FILL_ORDER_FILE);
    fs::write(&order_path, render_fill_order(&order))?;

    Ok(vec![listing_path, dot_path, order_path])
}
