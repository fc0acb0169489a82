use std::collections::HashMap;

use async_trait::async_trait;

use crate::db::connection::SchemaConnection;
use crate::introspect::{row_i64, row_opt_str, row_str, split_schema_table, SchemaIntrospector};
use crate::models::{ColumnDefinition, TableDefinition};
use crate::utils::error::{AppError, Result};

/// PostgreSQL 方言：information_schema + pg_catalog
///
/// 列注释与枚举类型都需要单独查 pg_catalog；二者都是尽力而为，
/// 查不到不算错误。
#[derive(Debug)]
pub struct PostgresIntrospector;

const COLUMNS_SQL: &str = "SELECT
    c.column_name AS column_name,
    c.data_type AS data_type,
    c.udt_name AS udt_name,
    c.is_nullable AS is_nullable,
    c.column_default AS column_default,
    c.character_maximum_length AS character_maximum_length,
    c.numeric_precision AS numeric_precision,
    c.numeric_scale AS numeric_scale
FROM information_schema.columns c
WHERE c.table_schema = ?
  AND c.table_name = ?
ORDER BY c.ordinal_position";

const PRIMARY_KEY_SQL: &str = "SELECT kcu.column_name AS column_name
FROM information_schema.table_constraints tc
JOIN information_schema.key_column_usage kcu
  ON tc.constraint_name = kcu.constraint_name
 AND tc.table_schema = kcu.table_schema
 AND tc.table_name = kcu.table_name
WHERE tc.constraint_type = 'PRIMARY KEY'
  AND tc.table_schema = ?
  AND tc.table_name = ?
ORDER BY kcu.ordinal_position";

const COMMENTS_SQL: &str = "SELECT
    a.attname AS column_name,
    COALESCE(col_description(a.attrelid, a.attnum), '') AS column_comment
FROM pg_attribute a
JOIN pg_class t ON t.oid = a.attrelid
JOIN pg_namespace n ON n.oid = t.relnamespace
WHERE n.nspname = ?
  AND t.relname = ?
  AND a.attnum > 0
  AND NOT a.attisdropped";

const ENUM_TYPES_SQL: &str = "SELECT
    t.typname AS type_name,
    e.enumlabel AS enum_label
FROM pg_type t
JOIN pg_enum e ON e.enumtypid = t.oid
ORDER BY t.typname, e.enumsortorder";

#[async_trait]
impl SchemaIntrospector for PostgresIntrospector {
    async fn introspect(
        &self,
        connection: &dyn SchemaConnection,
        table: &str,
    ) -> Result<TableDefinition> {
        let table = table.trim();
        if table.is_empty() {
            return Err(AppError::InvalidInput(
                "Table name cannot be empty".to_string(),
            ));
        }

        let (schema, table_name) = split_schema_table(table, "public", "Postgres")?;

        tracing::debug!("Fetching columns for {}.{}", schema, table_name);
        let bindings = vec![schema.clone(), table_name.clone()];
        let rows = connection.select(COLUMNS_SQL, &bindings).await?;
        if rows.is_empty() {
            return Err(AppError::NotFound(format!(
                "Table not found or has no columns: {}.{}",
                schema, table_name
            )));
        }

        let pk_rows = connection.select(PRIMARY_KEY_SQL, &bindings).await?;
        let primary_key_columns: Vec<String> = pk_rows
            .iter()
            .filter_map(|r| row_opt_str(r, "column_name"))
            .filter(|n| !n.is_empty())
            .collect();

        let comment_rows = connection.select(COMMENTS_SQL, &bindings).await?;
        let comments: HashMap<String, String> = comment_rows
            .iter()
            .filter_map(|r| {
                let name = row_str(r, "column_name");
                if name.is_empty() {
                    None
                } else {
                    Some((name, row_str(r, "column_comment")))
                }
            })
            .collect();

        let enum_values_by_type = load_enum_values_by_type(connection).await?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            let name = row_str(row, "column_name");
            if name.is_empty() {
                continue;
            }

            let mut data_type = row_str(row, "data_type").to_lowercase();
            let udt_name = row_str(row, "udt_name").to_lowercase();
            let default_value = row_opt_str(row, "column_default");

            // serial/identity 列的默认值是 nextval('...'::regclass)
            let auto_increment = default_value
                .as_deref()
                .is_some_and(|d| d.contains("nextval("));

            let mut enum_values = Vec::new();
            if data_type == "user-defined" {
                if let Some(labels) = enum_values_by_type.get(&udt_name) {
                    enum_values = labels.clone();
                    data_type = "enum".to_string();
                }
            }

            columns.push(ColumnDefinition {
                column_type: if udt_name.is_empty() {
                    data_type.clone()
                } else {
                    udt_name.clone()
                },
                nullable: row_str(row, "is_nullable").eq_ignore_ascii_case("yes"),
                character_maximum_length: row_i64(row, "character_maximum_length"),
                numeric_precision: row_i64(row, "numeric_precision"),
                numeric_scale: row_i64(row, "numeric_scale"),
                unsigned: false,
                comment: comments.get(&name).cloned().unwrap_or_default(),
                name,
                data_type,
                default_value,
                auto_increment,
                enum_values,
            });
        }

        Ok(TableDefinition {
            table: table_name,
            columns,
            primary_key_columns,
        })
    }
}

/// 全局加载用户自定义枚举类型：类型名（小写） -> 有序标签列表
async fn load_enum_values_by_type(
    connection: &dyn SchemaConnection,
) -> Result<HashMap<String, Vec<String>>> {
    let rows = connection.select(ENUM_TYPES_SQL, &[]).await?;
    let mut map: HashMap<String, Vec<String>> = HashMap::new();
    for row in &rows {
        let type_name = row_str(row, "type_name").to_lowercase();
        let label = row_str(row, "enum_label");
        if type_name.is_empty() || label.is_empty() {
            continue;
        }
        map.entry(type_name).or_default().push(label);
    }
    Ok(map)
}
