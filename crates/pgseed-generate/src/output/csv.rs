use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use pgseed_core::{DependencyGraph, TableId, TableNode};

use crate::errors::Result;

/// `<schema>_<table>.csv`
pub fn template_file_name(table: &TableId) -> String {
    format!("{}_{}.csv", table.schema, table.name)
}

/// Write one header-only CSV per table, columns in catalog order.
pub fn write_csv_templates(graph: &DependencyGraph, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    graph
        .tables()
        .map(|table| -> Result<PathBuf> {
            let path = dir.join(template_file_name(table.id()));
            write_template(&path, table)?;
            Ok(path)
        })
        .collect()
}

fn write_template(path: &Path, table: &TableNode) -> Result<()> {
    let file = BufWriter::new(File::create(path)?);
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.write_record(table.column_names())?;
    writer.flush()?;
    Ok(())
}
