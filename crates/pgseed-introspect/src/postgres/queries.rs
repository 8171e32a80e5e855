use sqlx::{FromRow, PgPool};

use pgseed_core::{Error, Result};

#[derive(Debug, FromRow)]
pub struct RawColumn {
    pub schema: String,
    pub table: String,
    pub column: String,
    pub data_type: String,
    pub default: Option<String>,
    pub is_identity: String,
}

pub async fn list_columns(pool: &PgPool, schemas: &[String]) -> Result<Vec<RawColumn>> {
    sqlx::query_as::<_, RawColumn>(
        r#"
        select
          c.table_schema::text as "schema",
          c.table_name::text as "table",
          c.column_name::text as "column",
          c.data_type::text as "data_type",
          c.column_default::text as "default",
          c.is_identity::text as "is_identity"
        from information_schema.columns c
        join information_schema.tables t
          on t.table_schema = c.table_schema and t.table_name = c.table_name
        where t.table_type = 'BASE TABLE'
          and c.table_schema not in ('pg_catalog', 'information_schema')
          and c.table_schema not like 'pg\_%'
          and (cardinality($1::text[]) = 0 or c.table_schema = any($1::text[]))
        order by c.table_schema, c.table_name, c.ordinal_position
        "#,
    )
    .bind(schemas)
    .fetch_all(pool)
    .await
    .map_err(|err| Error::Db(err.to_string()))
}

#[derive(Debug, FromRow)]
pub struct RawForeignKey {
    pub schema: String,
    pub table: String,
    pub column: String,
    pub constraint_name: String,
    pub parent_schema: String,
    pub parent_table: String,
    pub parent_column: String,
}

pub async fn list_foreign_keys(pool: &PgPool, schemas: &[String]) -> Result<Vec<RawForeignKey>> {
    sqlx::query_as::<_, RawForeignKey>(
        r#"
        select
          src_nsp.nspname::text as "schema",
          src_rel.relname::text as "table",
          src_att.attname::text as "column",
          con.conname::text as "constraint_name",
          ref_nsp.nspname::text as "parent_schema",
          ref_rel.relname::text as "parent_table",
          ref_att.attname::text as "parent_column"
        from pg_constraint con
        join pg_class src_rel on src_rel.oid = con.conrelid
        join pg_namespace src_nsp on src_nsp.oid = src_rel.relnamespace
        join pg_class ref_rel on ref_rel.oid = con.confrelid
        join pg_namespace ref_nsp on ref_nsp.oid = ref_rel.relnamespace
        join unnest(con.conkey, con.confkey) as cols(src_attnum, ref_attnum) on true
        join pg_attribute src_att
          on src_att.attrelid = src_rel.oid and src_att.attnum = cols.src_attnum
        join pg_attribute ref_att
          on ref_att.attrelid = ref_rel.oid and ref_att.attnum = cols.ref_attnum
        where con.contype = 'f'
          and src_nsp.nspname not in ('pg_catalog', 'information_schema')
          and (cardinality($1::text[]) = 0 or src_nsp.nspname = any($1::text[]))
        order by src_nsp.nspname, src_rel.relname, con.conname, cols.src_attnum
        "#,
    )
    .bind(schemas)
    .fetch_all(pool)
    .await
    .map_err(|err| Error::Db(err.to_string()))
}

pub async fn user_defined_type(
    pool: &PgPool,
    schema: &str,
    table: &str,
    column: &str,
) -> Result<Option<String>> {
    sqlx::query_scalar::<_, String>(
        r#"
        select udt_name::text
        from information_schema.columns
        where table_schema = $1
          and table_name = $2
          and column_name = $3
        "#,
    )
    .bind(schema)
    .bind(table)
    .bind(column)
    .fetch_optional(pool)
    .await
    .map_err(|err| Error::Db(err.to_string()))
}

pub async fn enum_labels(pool: &PgPool, type_name: &str) -> Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(
        r#"
        select e.enumlabel::text
        from pg_type t
        join pg_enum e on e.enumtypid = t.oid
        where t.typname = $1
        order by e.enumsortorder
        "#,
    )
    .bind(type_name)
    .fetch_all(pool)
    .await
    .map_err(|err| Error::Db(err.to_string()))
}
