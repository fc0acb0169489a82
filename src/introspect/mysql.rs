use async_trait::async_trait;

use crate::db::connection::SchemaConnection;
use crate::introspect::{row_i64, row_opt_str, row_str, SchemaIntrospector};
use crate::models::{ColumnDefinition, TableDefinition};
use crate::utils::error::{AppError, Result};

/// MySQL/MariaDB 方言：基于 information_schema
#[derive(Debug)]
pub struct MySqlIntrospector;

const COLUMNS_SQL: &str = "SELECT
    COLUMN_NAME AS column_name,
    DATA_TYPE AS data_type,
    CAST(COLUMN_TYPE AS CHAR) AS column_type,
    IS_NULLABLE AS is_nullable,
    COLUMN_DEFAULT AS column_default,
    CHARACTER_MAXIMUM_LENGTH AS character_maximum_length,
    NUMERIC_PRECISION AS numeric_precision,
    NUMERIC_SCALE AS numeric_scale,
    EXTRA AS extra,
    COLUMN_COMMENT AS column_comment
FROM information_schema.COLUMNS
WHERE TABLE_SCHEMA = ?
  AND TABLE_NAME = ?
ORDER BY ORDINAL_POSITION";

const PRIMARY_KEY_SQL: &str = "SELECT
    COLUMN_NAME AS column_name
FROM information_schema.KEY_COLUMN_USAGE
WHERE TABLE_SCHEMA = ?
  AND TABLE_NAME = ?
  AND CONSTRAINT_NAME = 'PRIMARY'
ORDER BY ORDINAL_POSITION";

#[async_trait]
impl SchemaIntrospector for MySqlIntrospector {
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

        let database = connection
            .database_name()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| {
                AppError::Config("Database name is empty for current connection".to_string())
            })?
            .to_string();

        tracing::debug!("Fetching columns for {}.{}", database, table);
        let bindings = vec![database.clone(), table.to_string()];
        let rows = connection.select(COLUMNS_SQL, &bindings).await?;
        if rows.is_empty() {
            return Err(AppError::NotFound(format!(
                "Table not found or has no columns: {}.{}",
                database, table
            )));
        }

        let pk_rows = connection.select(PRIMARY_KEY_SQL, &bindings).await?;
        let primary_key_columns: Vec<String> = pk_rows
            .iter()
            .filter_map(|r| row_opt_str(r, "column_name"))
            .filter(|n| !n.is_empty())
            .collect();

        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            let name = row_str(row, "column_name");
            if name.is_empty() {
                continue;
            }

            let data_type = row_str(row, "data_type").to_lowercase();
            let raw_column_type = row_str(row, "column_type").to_lowercase();
            let column_type = if raw_column_type.is_empty() {
                data_type.clone()
            } else {
                raw_column_type
            };
            let extra = row_str(row, "extra").to_lowercase();

            columns.push(ColumnDefinition {
                enum_values: parse_enum_values(&data_type, &column_type),
                unsigned: column_type.contains("unsigned"),
                auto_increment: extra.contains("auto_increment"),
                nullable: row_str(row, "is_nullable").eq_ignore_ascii_case("yes"),
                default_value: row_opt_str(row, "column_default"),
                character_maximum_length: row_i64(row, "character_maximum_length"),
                numeric_precision: row_i64(row, "numeric_precision"),
                numeric_scale: row_i64(row, "numeric_scale"),
                comment: row_str(row, "column_comment"),
                name,
                data_type,
                column_type,
            });
        }

        Ok(TableDefinition {
            table: table.to_string(),
            columns,
            primary_key_columns,
        })
    }
}

/// 从 `enum('a','b','c')` 形式的类型串解析枚举值，`\'` 还原为 `'`
fn parse_enum_values(data_type: &str, column_type: &str) -> Vec<String> {
    if data_type != "enum" && !column_type.starts_with("enum(") {
        return Vec::new();
    }
    let Some(inner) = column_type
        .strip_prefix("enum(")
        .and_then(|s| s.strip_suffix(')'))
    else {
        return Vec::new();
    };

    let mut values = Vec::new();
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\'' {
            continue;
        }
        let mut value = String::new();
        while let Some(c) = chars.next() {
            if c == '\\' && chars.peek() == Some(&'\'') {
                value.push('\'');
                chars.next();
            } else if c == '\'' {
                break;
            } else {
                value.push(c);
            }
        }
        values.push(value);
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fake::{row, FakeConnection};
    use serde_json::json;

    fn users_connection() -> FakeConnection {
        FakeConnection::new("mysql", Some("app"))
            .with_response(
                "information_schema.COLUMNS",
                vec![
                    row(&[
                        ("column_name", json!("id")),
                        ("data_type", json!("int")),
                        ("column_type", json!("int(10) unsigned")),
                        ("is_nullable", json!("NO")),
                        ("column_default", json!(null)),
                        ("extra", json!("auto_increment")),
                        ("column_comment", json!("")),
                    ]),
                    row(&[
                        ("column_name", json!("name")),
                        ("data_type", json!("varchar")),
                        ("column_type", json!("varchar(100)")),
                        ("is_nullable", json!("YES")),
                        ("column_default", json!(null)),
                        ("character_maximum_length", json!(100)),
                        ("extra", json!("")),
                        ("column_comment", json!("用户名")),
                    ]),
                    row(&[
                        ("column_name", json!("status")),
                        ("data_type", json!("enum")),
                        ("column_type", json!("enum('active','blocked','it\\'s')")),
                        ("is_nullable", json!("NO")),
                        ("column_default", json!(null)),
                        ("extra", json!("")),
                        ("column_comment", json!("")),
                    ]),
                ],
            )
            .with_response(
                "information_schema.KEY_COLUMN_USAGE",
                vec![row(&[("column_name", json!("id"))])],
            )
    }

    #[tokio::test]
    async fn test_introspect_users_table() {
        let table = MySqlIntrospector
            .introspect(&users_connection(), "users")
            .await
            .unwrap();

        assert_eq!(table.table, "users");
        assert_eq!(table.primary_key_columns, vec!["id".to_string()]);
        // 列顺序保持目录 ordinal 顺序
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "status"]);

        let id = &table.columns[0];
        assert!(id.auto_increment);
        assert!(id.unsigned);
        assert!(!id.nullable);

        let name = &table.columns[1];
        assert_eq!(name.data_type, "varchar");
        assert_eq!(name.character_maximum_length, Some(100));
        assert!(name.nullable);
        assert_eq!(name.comment, "用户名");

        let status = &table.columns[2];
        assert_eq!(status.data_type, "enum");
        assert_eq!(
            status.enum_values,
            vec!["active".to_string(), "blocked".to_string(), "it's".to_string()]
        );
    }

    #[tokio::test]
    async fn test_missing_table_is_not_found() {
        let connection = FakeConnection::new("mysql", Some("app"));
        let err = MySqlIntrospector
            .introspect(&connection, "ghost")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        // 错误信息要带上 schema 与表名
        assert!(err.to_string().contains("app.ghost"));
    }

    #[tokio::test]
    async fn test_empty_table_name_rejected() {
        let connection = users_connection();
        let err = MySqlIntrospector
            .introspect(&connection, "  ")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_missing_database_name_rejected() {
        let connection = FakeConnection::new("mysql", None);
        let err = MySqlIntrospector
            .introspect(&connection, "users")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_parse_enum_values() {
        assert_eq!(
            parse_enum_values("enum", "enum('a','b','c')"),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        assert_eq!(
            parse_enum_values("enum", "enum('it\\'s')"),
            vec!["it's".to_string()]
        );
        assert!(parse_enum_values("varchar", "varchar(255)").is_empty());
    }
}
