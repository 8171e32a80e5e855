use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use pgseed_core::{Error, Result, TableId};
use pgseed_generate::{
    ExistingValue, FillOptions, GenerationError, InMemoryStore, InsertStatement, LiveDataSource,
    StoreWriter, TableFiller,
};
use pgseed_introspect::{
    CachedCatalog, CatalogAdapter, ColumnRow, ForeignKeyRow, build_dependency_graph,
};

#[derive(Default)]
struct StaticCatalog {
    columns: Vec<ColumnRow>,
    foreign_keys: Vec<ForeignKeyRow>,
    enums: HashMap<String, Vec<String>>,
    label_lookups: AtomicUsize,
}

impl StaticCatalog {
    fn column(mut self, table: &str, column: &str, data_type: &str) -> Self {
        self.columns.push(ColumnRow {
            schema: "s".to_string(),
            table: table.to_string(),
            column: column.to_string(),
            data_type: data_type.to_string(),
            default: None,
            is_identity: false,
        });
        self
    }

    fn serial_id(mut self, table: &str) -> Self {
        self.columns.push(ColumnRow {
            schema: "s".to_string(),
            table: table.to_string(),
            column: "id".to_string(),
            data_type: "bigint".to_string(),
            default: Some(format!("nextval('s.{table}_id_seq'::regclass)")),
            is_identity: false,
        });
        self
    }

    fn foreign_key(mut self, table: &str, column: &str, parent: &str) -> Self {
        self.foreign_keys.push(ForeignKeyRow {
            schema: "s".to_string(),
            table: table.to_string(),
            column: column.to_string(),
            constraint_name: format!("{table}_{column}_fkey"),
            parent_schema: "s".to_string(),
            parent_table: parent.to_string(),
            parent_column: "id".to_string(),
        });
        self
    }

    fn enum_type(mut self, type_name: &str, labels: &[&str]) -> Self {
        self.enums.insert(
            type_name.to_string(),
            labels.iter().map(|label| label.to_string()).collect(),
        );
        self
    }
}

#[async_trait]
impl CatalogAdapter for StaticCatalog {
    fn engine(&self) -> &'static str {
        "static"
    }

    async fn list_columns(&self) -> Result<Vec<ColumnRow>> {
        Ok(self.columns.clone())
    }

    async fn list_foreign_keys(&self) -> Result<Vec<ForeignKeyRow>> {
        Ok(self.foreign_keys.clone())
    }

    async fn resolve_user_defined_type(&self, _table: &TableId, column: &str) -> Result<String> {
        Ok(format!("{column}_type"))
    }

    async fn list_enum_labels(&self, type_name: &str) -> Result<Vec<String>> {
        self.label_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.enums.get(type_name).cloned().unwrap_or_default())
    }
}

fn id(name: &str) -> TableId {
    TableId::new("s", name)
}

fn options(rows: u64) -> FillOptions {
    FillOptions {
        rows_per_table: rows,
        seed: Some(11),
        ..FillOptions::default()
    }
}

#[tokio::test]
async fn chain_is_filled_parents_first_with_valid_references() {
    let catalog = StaticCatalog::default()
        .column("items", "id", "text")
        .column("items", "order_id", "text")
        .column("items", "qty", "integer")
        .column("orders", "id", "text")
        .column("orders", "user_id", "bigint")
        .serial_id("users")
        .column("users", "email", "text")
        .foreign_key("orders", "user_id", "users")
        .foreign_key("items", "order_id", "orders");
    let graph = build_dependency_graph(&catalog).await.unwrap();

    let mut store = InMemoryStore::new(5);
    store.track_sequences(&graph);
    let report = TableFiller::new(options(5))
        .fill_tables(&catalog, &graph, &mut store)
        .await
        .unwrap();

    assert_eq!(report.fill_order, vec![id("users"), id("orders"), id("items")]);
    assert_eq!(report.rows_inserted_total, 15);
    assert!(report.tables.iter().all(|table| table.null_fallbacks == 0));

    let user_ids = store.column_values(&id("users"), "id");
    for user_id in store.column_values(&id("orders"), "user_id") {
        assert!(user_ids.contains(&user_id), "dangling user_id {user_id:?}");
    }
    let order_ids = store.column_values(&id("orders"), "id");
    for order_id in store.column_values(&id("items"), "order_id") {
        assert!(order_ids.contains(&order_id), "dangling order_id {order_id:?}");
    }

    let first_user = &store.statements()[0];
    assert_eq!(first_user.columns, vec!["email"]);
}

#[tokio::test]
async fn mutual_reference_is_rejected_before_any_insert() {
    let catalog = StaticCatalog::default()
        .column("a", "id", "text")
        .column("a", "b_id", "text")
        .column("b", "id", "text")
        .column("b", "a_id", "text")
        .foreign_key("a", "b_id", "b")
        .foreign_key("b", "a_id", "a");
    let graph = build_dependency_graph(&catalog).await.unwrap();

    let mut store = InMemoryStore::new(1);
    let err = TableFiller::new(options(3))
        .fill_tables(&catalog, &graph, &mut store)
        .await
        .unwrap_err();

    match err {
        GenerationError::Core(Error::CyclicDependency { tables }) => {
            assert_eq!(tables, vec![id("a"), id("b")]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(store.statements().is_empty());
}

#[tokio::test]
async fn empty_parent_yields_null_references() {
    let catalog = StaticCatalog::default()
        .column("parent", "id", "text")
        .column("child", "id", "text")
        .column("child", "parent_id", "text")
        .foreign_key("child", "parent_id", "parent");
    let graph = build_dependency_graph(&catalog).await.unwrap();

    let mut opts = options(4);
    opts.table_rows.insert(id("parent"), 0);
    let mut store = InMemoryStore::new(1);
    let report = TableFiller::new(opts)
        .fill_tables(&catalog, &graph, &mut store)
        .await
        .unwrap();

    assert_eq!(store.row_count(&id("parent")), 0);
    assert_eq!(store.column_values(&id("child"), "parent_id"), vec![None; 4]);
    assert_eq!(report.table(&id("child")).unwrap().null_fallbacks, 4);
    assert_eq!(report.table(&id("child")).unwrap().null_references, 0);
    assert!(
        store
            .statements()
            .iter()
            .all(|statement| statement.to_sql().ends_with(", NULL)"))
    );
}

#[tokio::test]
async fn null_parent_values_are_not_reported_as_empty_parents() {
    let catalog = StaticCatalog::default()
        .column("parent", "id", "text")
        .column("child", "id", "text")
        .column("child", "parent_id", "text")
        .foreign_key("child", "parent_id", "parent");
    let graph = build_dependency_graph(&catalog).await.unwrap();

    let mut opts = options(3);
    opts.exclude.insert(id("parent"));
    let mut store = InMemoryStore::new(1);
    store.insert_existing(&id("parent"), [("id", None::<String>)]);
    let report = TableFiller::new(opts)
        .fill_tables(&catalog, &graph, &mut store)
        .await
        .unwrap();

    let child = report.table(&id("child")).unwrap();
    assert_eq!(child.null_fallbacks, 0);
    assert_eq!(child.null_references, 3);
    assert_eq!(store.column_values(&id("child"), "parent_id"), vec![None; 3]);
}

#[tokio::test]
async fn enum_values_come_from_the_declared_labels() {
    let catalog = StaticCatalog::default()
        .column("accounts", "id", "text")
        .column("accounts", "status", "USER-DEFINED")
        .enum_type("status_type", &["active", "inactive"]);
    let graph = build_dependency_graph(&catalog).await.unwrap();
    let cached = CachedCatalog::new(catalog);

    let mut store = InMemoryStore::new(1);
    TableFiller::new(options(40))
        .fill_tables(&cached, &graph, &mut store)
        .await
        .unwrap();

    let statuses = store.column_values(&id("accounts"), "status");
    assert_eq!(statuses.len(), 40);
    for status in &statuses {
        let status = status.as_deref().unwrap();
        assert!(status == "active" || status == "inactive", "got {status}");
    }
    assert_eq!(cached.inner().label_lookups.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn excluded_tables_are_left_alone() {
    let catalog = StaticCatalog::default()
        .column("users", "id", "text")
        .column("audit", "id", "text");
    let graph = build_dependency_graph(&catalog).await.unwrap();

    let mut opts = options(2);
    opts.exclude.insert(id("audit"));
    let mut store = InMemoryStore::new(1);
    let report = TableFiller::new(opts)
        .fill_tables(&catalog, &graph, &mut store)
        .await
        .unwrap();

    assert_eq!(report.excluded, vec![id("audit")]);
    assert_eq!(store.row_count(&id("audit")), 0);
    assert_eq!(store.row_count(&id("users")), 2);
}

#[tokio::test]
async fn same_seed_reproduces_the_same_statements() {
    let catalog = StaticCatalog::default()
        .column("users", "id", "text")
        .column("users", "first_name", "text")
        .column("users", "born", "date");
    let graph = build_dependency_graph(&catalog).await.unwrap();

    let mut left = InMemoryStore::new(1);
    let mut right = InMemoryStore::new(1);
    let filler = TableFiller::new(options(3));
    filler.fill_tables(&catalog, &graph, &mut left).await.unwrap();
    filler.fill_tables(&catalog, &graph, &mut right).await.unwrap();

    assert_eq!(left.statements(), right.statements());
}

#[tokio::test]
async fn dry_run_replays_from_the_recorded_seed() {
    let catalog = StaticCatalog::default()
        .column("p", "id", "text")
        .column("c", "id", "text")
        .column("c", "p_id", "text")
        .foreign_key("c", "p_id", "p");
    let graph = build_dependency_graph(&catalog).await.unwrap();

    let unseeded = FillOptions {
        rows_per_table: 6,
        ..FillOptions::default()
    };
    let (first, first_store) = TableFiller::new(unseeded)
        .dry_run(&catalog, &graph)
        .await
        .unwrap();

    let replay = FillOptions {
        rows_per_table: 6,
        seed: Some(first.seed),
        ..FillOptions::default()
    };
    let (second, second_store) = TableFiller::new(replay)
        .dry_run(&catalog, &graph)
        .await
        .unwrap();

    assert_eq!(second.seed, first.seed);
    assert_eq!(first_store.statements().len(), 12);
    assert_eq!(first_store.statements(), second_store.statements());
}

struct FailingStore {
    inner: InMemoryStore,
    fail_after: usize,
}

#[async_trait]
impl LiveDataSource for FailingStore {
    async fn sample_existing_value(
        &mut self,
        table: &TableId,
        column: &str,
    ) -> Result<ExistingValue> {
        self.inner.sample_existing_value(table, column).await
    }
}

#[async_trait]
impl StoreWriter for FailingStore {
    async fn execute_insert(&mut self, statement: &InsertStatement) -> Result<()> {
        if self.inner.statements().len() == self.fail_after {
            return Err(Error::Db("duplicate key value violates unique constraint".into()));
        }
        self.inner.execute_insert(statement).await
    }
}

#[tokio::test]
async fn failing_insert_halts_the_run() {
    let catalog = StaticCatalog::default()
        .column("users", "id", "text")
        .column("orders", "id", "text");
    let graph = build_dependency_graph(&catalog).await.unwrap();

    let mut store = FailingStore {
        inner: InMemoryStore::new(1),
        fail_after: 2,
    };
    let err = TableFiller::new(options(5))
        .fill_tables(&catalog, &graph, &mut store)
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::Core(Error::Db(_))));
    assert_eq!(store.inner.statements().len(), 2);
    assert_eq!(store.inner.row_count(&id("orders")), 0);
}
