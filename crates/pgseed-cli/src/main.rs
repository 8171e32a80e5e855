mod config;
mod registry;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use pgseed_core::{DependencyGraph, Error as CoreError, redact_connection_string};
use pgseed_generate::output::{
    render_dependency_listing, render_fill_order, write_csv_templates, write_dependency_listing,
};
use pgseed_generate::{GenerationError, PostgresStore, TableFiller};
use pgseed_introspect::{
    CachedCatalog, IntrospectOptions, PostgresCatalog, build_dependency_graph,
};
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use uuid::Uuid;

use config::{ConfigError, FileConfig, Overrides, Settings};
use registry::{RunContext, RunPaths, init_run_logging, start_run, write_report, write_statements};

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("unsupported engine: {0}")]
    UnsupportedEngine(String),
}

#[derive(Parser, Debug)]
#[command(
    name = "pgseed",
    version,
    about = "Seed a Postgres database with synthetic rows that respect foreign keys"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the table dependency listing and fill order, and write them
    /// with `depgraph.dot` into the run directory.
    Graph(TargetArgs),
    /// Write one header-only CSV template per table.
    Templates(TemplatesArgs),
    /// Generate and insert rows into every table, parents first.
    Fill(FillArgs),
}

#[derive(Args, Debug)]
struct TargetArgs {
    /// Database connection string.
    #[arg(long, value_name = "CONNECTION_STRING", env = "DATABASE_URL")]
    conn: Option<String>,
    /// TOML config file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Schema name(s) to include.
    #[arg(long, value_name = "SCHEMA")]
    schema: Vec<String>,
    /// Output directory for runs.
    #[arg(long)]
    run_dir: Option<PathBuf>,
    /// Log level used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Args, Debug)]
struct TemplatesArgs {
    #[command(flatten)]
    target: TargetArgs,
    /// Directory for the CSV files (defaults to `templates/` in the run directory).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct FillArgs {
    #[command(flatten)]
    target: TargetArgs,
    /// Rows per table.
    #[arg(long)]
    rows: Option<u64>,
    /// Seed for reproducible values.
    #[arg(long)]
    seed: Option<u64>,
    /// Table to skip, as schema.table. Repeatable.
    #[arg(long, value_name = "SCHEMA.TABLE")]
    exclude: Vec<String>,
    /// Generate rows without writing to the database.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Graph(args) => run_graph(args).await,
        Command::Templates(args) => run_templates(args).await,
        Command::Fill(args) => run_fill(args).await,
    }
}

async fn run_graph(args: TargetArgs) -> Result<(), CliError> {
    let settings = resolve_settings(&args, Overrides::default())?;
    let (paths, _) = open_run("graph", &settings, false, &args.log_level)?;
    let timer = Instant::now();

    let graph = introspect(&settings).await?;
    print!("{}", render_dependency_listing(&graph));

    let written = write_dependency_listing(&graph, &paths.root)?;
    for path in &written {
        tracing::info!(event = "artifact_written", path = %path.display());
    }
    let order = graph.get_fill_order()?;
    print!("Fill order:\n{}", render_fill_order(&order));

    finish(timer);
    Ok(())
}

async fn run_templates(args: TemplatesArgs) -> Result<(), CliError> {
    let settings = resolve_settings(&args.target, Overrides::default())?;
    let (paths, _) = open_run("templates", &settings, false, &args.target.log_level)?;
    let timer = Instant::now();

    let graph = introspect(&settings).await?;
    let out_dir = args.out.unwrap_or_else(|| paths.root.join("templates"));
    let written = write_csv_templates(&graph, &out_dir)?;
    tracing::info!(
        event = "templates_written",
        files = written.len(),
        dir = %out_dir.display()
    );

    finish(timer);
    Ok(())
}

async fn run_fill(args: FillArgs) -> Result<(), CliError> {
    let overrides = Overrides {
        rows_per_table: args.rows,
        seed: args.seed,
        exclude_tables: args.exclude.clone(),
        ..Overrides::default()
    };
    let settings = resolve_settings(&args.target, overrides)?;
    let (paths, run_id) = open_run("fill", &settings, args.dry_run, &args.target.log_level)?;
    let timer = Instant::now();

    let pool = connect_pool(&settings.connection).await?;
    let catalog = CachedCatalog::new(PostgresCatalog::new(
        pool,
        IntrospectOptions::with_schemas(settings.schemas.clone()),
    ));
    let graph = build_dependency_graph(&catalog).await?;
    for path in write_dependency_listing(&graph, &paths.root)? {
        tracing::info!(event = "artifact_written", path = %path.display());
    }

    let filler = TableFiller::new(settings.fill.clone());
    let report = if args.dry_run {
        let (report, store) = filler.dry_run(&catalog, &graph).await?;
        write_statements(&paths, store.statements())?;
        tracing::info!(
            event = "dry_run_written",
            statements = store.statements().len(),
            path = %paths.inserts_path.display()
        );
        report
    } else {
        let mut store = PostgresStore::connect(&settings.connection).await?;
        let report = filler.fill_tables(&catalog, &graph, &mut store).await?;
        store.close().await?;
        report
    };

    write_report(&paths, &report)?;
    tracing::info!(
        event = "report_written",
        run_id = %run_id,
        rows_inserted = report.rows_inserted_total,
        seed = report.seed,
        path = %paths.report_path.display()
    );

    finish(timer);
    Ok(())
}

fn resolve_settings(args: &TargetArgs, mut overrides: Overrides) -> Result<Settings, CliError> {
    let file = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    overrides.connection = args.conn.clone();
    overrides.schemas = args.schema.clone();
    overrides.run_dir = args.run_dir.clone();
    let settings = Settings::resolve(file, overrides)?;
    detect_engine(&settings.connection)?;
    Ok(settings)
}

/// Create the run directory and start logging into it.
fn open_run(
    command: &'static str,
    settings: &Settings,
    dry_run: bool,
    log_level: &str,
) -> Result<(RunPaths, String), CliError> {
    let run_id = Uuid::new_v4().to_string();
    let connection = redact_connection_string(&settings.connection);
    let ctx = RunContext {
        run_id: run_id.clone(),
        started_at: chrono::Utc::now(),
        command,
        run_dir: settings.run_dir.clone(),
        options: settings.run_options(dry_run),
        connection,
    };

    let paths = start_run(&ctx)?;
    init_run_logging(&paths.logs_path, log_level)?;

    tracing::info!(
        event = "run_started",
        run_id = %run_id,
        command,
        connection = %ctx.connection.redacted,
        dir = %paths.root.display()
    );
    Ok((paths, run_id))
}

async fn connect_pool(conn: &str) -> Result<sqlx::PgPool, CliError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect(conn)
        .await?;
    Ok(pool)
}

async fn introspect(settings: &Settings) -> Result<DependencyGraph, CliError> {
    let pool = connect_pool(&settings.connection).await?;
    let catalog = PostgresCatalog::new(
        pool,
        IntrospectOptions::with_schemas(settings.schemas.clone()),
    );
    tracing::info!(event = "introspection_started");
    let graph = build_dependency_graph(&catalog).await?;
    tracing::info!(
        event = "introspection_finished",
        tables = graph.len(),
        edges = graph.edge_count()
    );
    Ok(graph)
}

fn finish(timer: Instant) {
    let duration_ms = timer.elapsed().as_millis();
    tracing::info!(event = "run_finished", status = "success", duration_ms = duration_ms);
}

fn detect_engine(conn: &str) -> Result<&'static str, CliError> {
    if conn.starts_with("postgres://") || conn.starts_with("postgresql://") {
        Ok("postgres")
    } else {
        Err(CliError::UnsupportedEngine(
            redact_connection_string(conn).redacted,
        ))
    }
}
