use crate::adapter::{ColumnRow, ForeignKeyRow};

use super::queries::{RawColumn, RawForeignKey};

pub fn map_columns(raw: Vec<RawColumn>) -> Vec<ColumnRow> {
    raw.into_iter()
        .map(|col| ColumnRow {
            schema: col.schema,
            table: col.table,
            column: col.column,
            data_type: col.data_type,
            default: col.default,
            is_identity: yes_or_no(&col.is_identity),
        })
        .collect()
}

pub fn map_foreign_keys(raw: Vec<RawForeignKey>) -> Vec<ForeignKeyRow> {
    raw.into_iter()
        .map(|fk| ForeignKeyRow {
            schema: fk.schema,
            table: fk.table,
            column: fk.column,
            constraint_name: fk.constraint_name,
            parent_schema: fk.parent_schema,
            parent_table: fk.parent_table,
            parent_column: fk.parent_column,
        })
        .collect()
}

/// `information_schema` booleans are the `yes_or_no` domain.
fn yes_or_no(value: &str) -> bool {
    value.eq_ignore_ascii_case("yes")
}
