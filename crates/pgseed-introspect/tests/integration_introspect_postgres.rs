use anyhow::{Context, Result, anyhow};
use pgseed_core::{ColumnType, TableId};
use pgseed_introspect::{
    CachedCatalog, CatalogAdapter, IntrospectOptions, PostgresCatalog, build_dependency_graph,
};
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::env;

const FIXTURE: &str = r#"
drop schema if exists pgseed_it cascade;
create schema pgseed_it;
create type pgseed_it.account_status as enum ('active', 'inactive');
create table pgseed_it.users (
  id bigserial primary key,
  email text not null,
  status pgseed_it.account_status not null
);
create table pgseed_it.orders (
  id text primary key,
  user_id bigint not null references pgseed_it.users(id),
  placed_at timestamp with time zone
);
create table pgseed_it.items (
  id text primary key,
  order_id text not null references pgseed_it.orders(id),
  quantity integer
);
create view pgseed_it.order_totals as select order_id, sum(quantity) as total from pgseed_it.items group by order_id
"#;

fn database_url() -> Option<String> {
    env::var("TEST_DATABASE_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .ok()
}

async fn load_fixture(pool: &PgPool) -> Result<()> {
    for statement in FIXTURE.split(';') {
        let sql = statement.trim();
        if sql.is_empty() {
            continue;
        }
        sqlx::query(sql)
            .execute(pool)
            .await
            .with_context(|| format!("executing fixture statement: {sql}"))?;
    }
    Ok(())
}

#[tokio::test]
async fn introspects_fixture_schema_into_fill_order() -> Result<()> {
    let Some(db_url) = database_url() else {
        eprintln!("skipping: set TEST_DATABASE_URL or DATABASE_URL");
        return Ok(());
    };

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(std::time::Duration::from_secs(10))
        .connect(&db_url)
        .await
        .context("connecting to Postgres")?;
    load_fixture(&pool).await?;

    let catalog = CachedCatalog::new(PostgresCatalog::new(
        pool.clone(),
        IntrospectOptions::with_schemas(vec!["pgseed_it".to_string()]),
    ));
    let graph = build_dependency_graph(&catalog).await?;

    assert!(
        !graph.contains(&TableId::new("pgseed_it", "order_totals")),
        "views are not seedable"
    );

    let order: Vec<String> = graph
        .get_fill_order()?
        .iter()
        .map(|table| table.id().to_string())
        .collect();
    assert_eq!(
        order,
        vec!["pgseed_it.users", "pgseed_it.orders", "pgseed_it.items"]
    );

    let users = graph.get_table(&TableId::new("pgseed_it", "users"))?;
    let id = users
        .columns()
        .iter()
        .find(|column| column.name == "id")
        .ok_or_else(|| anyhow!("expected users.id"))?;
    assert!(id.column_type.is_auto_increment());
    let status = users
        .columns()
        .iter()
        .find(|column| column.name == "status")
        .ok_or_else(|| anyhow!("expected users.status"))?;
    assert_eq!(status.column_type, ColumnType::UserDefined);

    let type_name = catalog
        .resolve_user_defined_type(users.id(), "status")
        .await?;
    assert_eq!(type_name, "account_status");
    assert_eq!(
        catalog.list_enum_labels(&type_name).await?,
        vec!["active", "inactive"]
    );

    Ok(())
}
