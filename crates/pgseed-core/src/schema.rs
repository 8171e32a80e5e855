use std::fmt;

use serde::{Serialize, Serializer};

/// Name of the column treated as a table's row identifier.
pub const IDENTIFIER_COLUMN: &str = "id";

/// Fully-qualified table identifier (`schema.table`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableId {
    pub schema: String,
    pub name: String,
}

impl TableId {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Parse a `schema.table` key. Returns `None` when either part is missing.
    pub fn parse(key: &str) -> Option<Self> {
        let (schema, name) = key.split_once('.')?;
        if schema.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(schema, name))
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

impl Serialize for TableId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Storage width of an integer-like column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerWidth {
    /// `smallint` / `integer`.
    Narrow,
    /// `bigint`.
    Wide,
}

/// Closed vocabulary of column types the generator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer {
        width: IntegerWidth,
        auto_increment: bool,
    },
    Numeric,
    Text,
    Date,
    Timestamp {
        with_time_zone: bool,
    },
    Boolean,
    Float,
    Json,
    /// `USER-DEFINED` in the catalog; resolved to an enum at generation time.
    UserDefined,
    Unsupported,
}

impl ColumnType {
    /// Classify a catalog `data_type`.
    ///
    /// `default` and `is_identity` come from the same catalog row and are only
    /// used to recognize auto-incrementing integers (`serial`, `bigserial`,
    /// `GENERATED ... AS IDENTITY`), which `information_schema` reports as
    /// plain `integer`/`bigint`.
    pub fn from_catalog(data_type: &str, default: Option<&str>, is_identity: bool) -> Self {
        let normalized = data_type.trim().to_ascii_lowercase();
        let base = normalized
            .split('(')
            .next()
            .unwrap_or(normalized.as_str())
            .trim();
        let sequence_default = default.is_some_and(|value| value.trim_start().starts_with("nextval("));
        let auto_increment = is_identity || sequence_default;

        match base {
            "bigint" | "int8" => ColumnType::Integer {
                width: IntegerWidth::Wide,
                auto_increment,
            },
            "bigserial" | "serial8" => ColumnType::Integer {
                width: IntegerWidth::Wide,
                auto_increment: true,
            },
            "integer" | "int" | "int4" | "smallint" | "int2" => ColumnType::Integer {
                width: IntegerWidth::Narrow,
                auto_increment,
            },
            "serial" | "serial4" | "smallserial" | "serial2" => ColumnType::Integer {
                width: IntegerWidth::Narrow,
                auto_increment: true,
            },
            "numeric" | "decimal" => ColumnType::Numeric,
            "text" | "character varying" | "varchar" | "character" | "char" | "bpchar" => {
                ColumnType::Text
            }
            "date" => ColumnType::Date,
            "timestamp" | "timestamp without time zone" => ColumnType::Timestamp {
                with_time_zone: false,
            },
            "timestamptz" | "timestamp with time zone" => ColumnType::Timestamp {
                with_time_zone: true,
            },
            "boolean" | "bool" => ColumnType::Boolean,
            "real" | "float4" | "double precision" | "float8" => ColumnType::Float,
            "json" | "jsonb" => ColumnType::Json,
            "user-defined" => ColumnType::UserDefined,
            _ => ColumnType::Unsupported,
        }
    }

    pub fn is_auto_increment(&self) -> bool {
        matches!(
            self,
            ColumnType::Integer {
                auto_increment: true,
                ..
            }
        )
    }
}

/// Column metadata as read from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    /// Declared type exactly as the catalog reported it.
    pub data_type: String,
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self::from_catalog(name, data_type, None, false)
    }

    pub fn from_catalog(
        name: impl Into<String>,
        data_type: impl Into<String>,
        default: Option<&str>,
        is_identity: bool,
    ) -> Self {
        let data_type = data_type.into();
        let column_type = ColumnType::from_catalog(&data_type, default, is_identity);
        Self {
            name: name.into(),
            data_type,
            column_type,
        }
    }

    pub fn is_identifier(&self) -> bool {
        self.name == IDENTIFIER_COLUMN
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.data_type)
    }
}

/// Single-column foreign key: `child_table.child_column -> parent_table.parent_column`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyConstraint {
    pub name: String,
    pub parent_table: TableId,
    pub parent_column: String,
    pub child_table: TableId,
    pub child_column: String,
}

impl fmt::Display for ForeignKeyConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: ({}.{} -> {}.{})",
            self.name, self.parent_table, self.parent_column, self.child_table, self.child_column
        )
    }
}

/// A table registered in the dependency graph.
#[derive(Debug, Clone)]
pub struct TableNode {
    id: TableId,
    columns: Vec<Column>,
    parent_relationships: Vec<ForeignKeyConstraint>,
}

impl TableNode {
    pub fn new(id: TableId) -> Self {
        Self {
            id,
            columns: Vec::new(),
            parent_relationships: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn add_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    pub fn id(&self) -> &TableId {
        &self.id
    }

    /// Columns in catalog order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Foreign keys where this table is the child.
    pub fn parent_relationships(&self) -> &[ForeignKeyConstraint] {
        &self.parent_relationships
    }

    pub(crate) fn add_parent_relationship(&mut self, constraint: ForeignKeyConstraint) {
        self.parent_relationships.push(constraint);
    }

    /// First parent relationship whose child-side column is `column`.
    pub fn dependency_for(&self, column: &str) -> Option<&ForeignKeyConstraint> {
        self.parent_relationships
            .iter()
            .find(|constraint| constraint.child_column == column)
    }

    /// Column names in catalog order, as used for CSV headers.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }
}

impl fmt::Display for TableNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Table: {}", self.id)?;
        writeln!(f, "Columns: ({})", self.columns.len())?;
        for column in &self.columns {
            writeln!(f, "  {column}")?;
        }
        writeln!(f, "Parent relationships: ({})", self.parent_relationships.len())?;
        for relationship in &self.parent_relationships {
            writeln!(f, "  {relationship}")?;
        }
        Ok(())
    }
}
