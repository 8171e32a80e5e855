use chrono::{DateTime, NaiveDate};
use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::{Sentence, Word};
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use pgseed_core::{Column, ColumnType, DependencyGraph, IntegerWidth, TableNode};
use pgseed_introspect::CatalogAdapter;

use crate::errors::{GenerationError, Result};
use crate::live::{ExistingValue, LiveDataSource};
use crate::value::{SampleEntry, SampleRow, SampleValue};

/// Days from the common era for 1970-01-01 and 2030-12-31.
const DATE_RANGE_DAYS: (i32, i32) = (719_163, 741_442);
/// Unix seconds for 1970-01-01T00:00:00 and 2030-12-31T23:59:59.
const TIMESTAMP_RANGE_SECS: (i64, i64) = (0, 1_924_991_999);
const NARROW_INTEGER_MAX: i64 = 100;
const JSON_PLACEHOLDER: &str = r#"{"key": "value"}"#;

/// Type-driven synthetic value generator.
///
/// Enum lookups go through `catalog`; wrap it in a `CachedCatalog` to avoid
/// re-querying labels for every row.
pub struct ValueGenerator<'a, C: ?Sized> {
    catalog: &'a C,
    rng: ChaCha8Rng,
}

impl<'a, C> ValueGenerator<'a, C>
where
    C: CatalogAdapter + ?Sized,
{
    pub fn new(catalog: &'a C, seed: u64) -> Self {
        Self {
            catalog,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Generate one row for `table`, columns in declared order.
    ///
    /// Dependent columns take an existing value of their parent column from
    /// `live`, or NULL when the parent table is empty or the sampled parent
    /// value is NULL. Auto-incrementing `id`
    /// columns are left out of the row.
    pub async fn generate_row<L>(
        &mut self,
        table: &TableNode,
        graph: &DependencyGraph,
        live: &mut L,
    ) -> Result<SampleRow>
    where
        L: LiveDataSource + ?Sized,
    {
        let mut row = SampleRow::new();
        for column in table.columns() {
            if let Some(constraint) = table.dependency_for(&column.name) {
                let parent = graph.get_table(&constraint.parent_table)?;
                let existing = live
                    .sample_existing_value(parent.id(), &constraint.parent_column)
                    .await?;
                let value = match existing {
                    ExistingValue::Value(value) => SampleValue::Existing(value),
                    ExistingValue::Null => SampleValue::Null,
                    ExistingValue::NoRows => {
                        debug!(
                            table = %table.id(),
                            column = %column.name,
                            parent = %parent.id(),
                            "parent has no rows, using NULL"
                        );
                        row.note_empty_parent();
                        SampleValue::Null
                    }
                };
                row.push(SampleEntry {
                    column: column.name.clone(),
                    value,
                    column_type: column.column_type,
                    dependent: true,
                });
                continue;
            }

            if column.is_identifier() {
                if column.column_type.is_auto_increment() {
                    continue;
                }
                row.push(SampleEntry {
                    column: column.name.clone(),
                    value: SampleValue::Text(self.random_uuid()),
                    column_type: ColumnType::Text,
                    dependent: false,
                });
                continue;
            }

            let value = self.synthesize(table, column).await?;
            row.push(SampleEntry {
                column: column.name.clone(),
                value,
                column_type: column.column_type,
                dependent: false,
            });
        }
        Ok(row)
    }

    async fn synthesize(&mut self, table: &TableNode, column: &Column) -> Result<SampleValue> {
        let value = match column.column_type {
            ColumnType::Integer {
                width: IntegerWidth::Wide,
                ..
            } => SampleValue::Integer(self.rng.random_range(0..=i64::MAX)),
            ColumnType::Integer {
                width: IntegerWidth::Narrow,
                ..
            }
            | ColumnType::Numeric => {
                SampleValue::Integer(self.rng.random_range(0..=NARROW_INTEGER_MAX))
            }
            ColumnType::Text => SampleValue::Text(self.text_for(&column.name)),
            ColumnType::Date => {
                let days = self
                    .rng
                    .random_range(DATE_RANGE_DAYS.0..=DATE_RANGE_DAYS.1);
                SampleValue::Date(NaiveDate::from_num_days_from_ce_opt(days).unwrap_or_default())
            }
            ColumnType::Timestamp { with_time_zone } => {
                let secs = self
                    .rng
                    .random_range(TIMESTAMP_RANGE_SECS.0..=TIMESTAMP_RANGE_SECS.1);
                let instant = DateTime::from_timestamp(secs, 0).unwrap_or_default();
                if with_time_zone {
                    SampleValue::TimestampTz(instant)
                } else {
                    SampleValue::Timestamp(instant.naive_utc())
                }
            }
            ColumnType::Boolean => SampleValue::Boolean(self.rng.random_bool(0.5)),
            ColumnType::Float => SampleValue::Float(self.rng.random::<f64>()),
            ColumnType::Json => SampleValue::Json(JSON_PLACEHOLDER.to_string()),
            ColumnType::UserDefined => SampleValue::Text(self.enum_label(table, column).await?),
            ColumnType::Unsupported => {
                return Err(GenerationError::UnsupportedColumnType {
                    table: table.id().clone(),
                    column: column.name.clone(),
                    data_type: column.data_type.clone(),
                });
            }
        };
        Ok(value)
    }

    fn text_for(&mut self, column: &str) -> String {
        let rng = &mut self.rng;
        match column {
            "first_name" => FirstName().fake_with_rng(rng),
            "last_name" => LastName().fake_with_rng(rng),
            "name" => Word().fake_with_rng(rng),
            "email" => SafeEmail().fake_with_rng(rng),
            "phone_number" => PhoneNumber().fake_with_rng(rng),
            _ => Sentence(3..8).fake_with_rng(rng),
        }
    }

    async fn enum_label(&mut self, table: &TableNode, column: &Column) -> Result<String> {
        let type_name = self
            .catalog
            .resolve_user_defined_type(table.id(), &column.name)
            .await?;
        let labels = self.catalog.list_enum_labels(&type_name).await?;
        labels
            .choose(&mut self.rng)
            .cloned()
            .ok_or_else(|| GenerationError::EmptyEnum {
                type_name,
                column: column.name.clone(),
            })
    }

    fn random_uuid(&mut self) -> String {
        let bytes: [u8; 16] = self.rng.random();
        uuid::Builder::from_random_bytes(bytes)
            .into_uuid()
            .hyphenated()
            .to_string()
    }
}
