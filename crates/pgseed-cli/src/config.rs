use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pgseed_core::TableId;
use pgseed_generate::{DEFAULT_ROWS_PER_TABLE, FillOptions};

pub const DEFAULT_RUN_DIR: &str = "runs";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid table key '{0}', expected schema.table")]
    InvalidTableKey(String),
    #[error("connection string is required (--conn, DATABASE_URL or `connection` in the config file)")]
    MissingConnection,
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Per-table section of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableConfig {
    pub rows: Option<u64>,
}

/// Contents of `pgseed.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub connection: Option<String>,
    pub schemas: Vec<String>,
    pub rows_per_table: Option<u64>,
    pub seed: Option<u64>,
    pub run_dir: Option<PathBuf>,
    pub exclude_tables: Vec<String>,
    pub tables: BTreeMap<String, TableConfig>,
}

impl FileConfig {
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Values given on the command line; they override the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub connection: Option<String>,
    pub schemas: Vec<String>,
    pub run_dir: Option<PathBuf>,
    pub rows_per_table: Option<u64>,
    pub seed: Option<u64>,
    pub exclude_tables: Vec<String>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub connection: String,
    pub schemas: Vec<String>,
    pub run_dir: PathBuf,
    pub fill: FillOptions,
}

impl Settings {
    /// Layer defaults, then `file`, then `overrides`.
    pub fn resolve(file: FileConfig, overrides: Overrides) -> ConfigResult<Self> {
        let connection = overrides
            .connection
            .or(file.connection)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingConnection)?;

        let schemas = if overrides.schemas.is_empty() {
            file.schemas
        } else {
            overrides.schemas
        };

        let mut table_rows = BTreeMap::new();
        for (key, table) in file.tables {
            let id = parse_table_key(&key)?;
            if let Some(rows) = table.rows {
                table_rows.insert(id, rows);
            }
        }

        let exclude = file
            .exclude_tables
            .iter()
            .chain(overrides.exclude_tables.iter())
            .map(|key| parse_table_key(key))
            .collect::<ConfigResult<BTreeSet<_>>>()?;

        Ok(Self {
            connection,
            schemas,
            run_dir: overrides
                .run_dir
                .or(file.run_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_RUN_DIR)),
            fill: FillOptions {
                rows_per_table: overrides
                    .rows_per_table
                    .or(file.rows_per_table)
                    .unwrap_or(DEFAULT_ROWS_PER_TABLE),
                table_rows,
                exclude,
                seed: overrides.seed.or(file.seed),
            },
        })
    }

    /// Serializable view for `config.json`, without the connection string.
    pub fn run_options(&self, dry_run: bool) -> RunOptions {
        RunOptions {
            schemas: self.schemas.clone(),
            rows_per_table: self.fill.rows_per_table,
            table_rows: self
                .fill
                .table_rows
                .iter()
                .map(|(id, rows)| (id.to_string(), *rows))
                .collect(),
            exclude_tables: self.fill.exclude.iter().map(ToString::to_string).collect(),
            seed: self.fill.seed,
            dry_run,
        }
    }
}

/// Resolved options recorded in each run directory.
#[derive(Debug, Clone, Serialize)]
pub struct RunOptions {
    pub schemas: Vec<String>,
    pub rows_per_table: u64,
    pub table_rows: BTreeMap<String, u64>,
    pub exclude_tables: Vec<String>,
    pub seed: Option<u64>,
    pub dry_run: bool,
}

fn parse_table_key(key: &str) -> ConfigResult<TableId> {
    TableId::parse(key).ok_or_else(|| ConfigError::InvalidTableKey(key.to_string()))
}
