pub mod mysql;
pub mod postgres;
pub mod sqlite;
pub mod sqlserver;

use async_trait::async_trait;
use serde_json::Value;

use crate::db::connection::{SchemaConnection, SchemaRow};
use crate::models::TableDefinition;
use crate::utils::error::{AppError, Result};

pub use mysql::MySqlIntrospector;
pub use postgres::PostgresIntrospector;
pub use sqlite::SqliteIntrospector;
pub use sqlserver::SqlServerIntrospector;

/// 方言内省器：读取目录元数据，产出归一化的表定义
#[async_trait]
pub trait SchemaIntrospector: Send + Sync + std::fmt::Debug {
    async fn introspect(
        &self,
        connection: &dyn SchemaConnection,
        table: &str,
    ) -> Result<TableDefinition>;
}

/// 按驱动名选择方言实现
pub struct IntrospectorFactory;

impl IntrospectorFactory {
    pub fn create_for_driver(driver: &str) -> Result<Box<dyn SchemaIntrospector>> {
        match driver.trim().to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Box::new(MySqlIntrospector)),
            "pgsql" | "postgres" | "postgresql" => Ok(Box::new(PostgresIntrospector)),
            "sqlite" => Ok(Box::new(SqliteIntrospector)),
            "sqlsrv" => Ok(Box::new(SqlServerIntrospector)),
            other => Err(AppError::InvalidInput(format!(
                "Unsupported database driver: {}",
                other
            ))),
        }
    }
}

/// 拆分 `schema.table`；缺省 schema 时使用 `default_schema`，多于一个点报错
pub(crate) fn split_schema_table(
    table: &str,
    default_schema: &str,
    dialect: &str,
) -> Result<(String, String)> {
    let parts: Vec<&str> = table.split('.').filter(|p| !p.is_empty()).collect();
    match parts.as_slice() {
        [name] => Ok((default_schema.to_string(), (*name).to_string())),
        [schema, name] => Ok(((*schema).to_string(), (*name).to_string())),
        _ => Err(AppError::InvalidInput(format!(
            "Invalid table name for {}: {}",
            dialect, table
        ))),
    }
}

/// 行字段取字符串；数字、布尔统一转成字符串，缺失与 Null 为空串
pub(crate) fn row_str(row: &SchemaRow, key: &str) -> String {
    match row.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// 行字段取可选字符串；缺失与 Null 为 None
pub(crate) fn row_opt_str(row: &SchemaRow, key: &str) -> Option<String> {
    match row.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    }
}

/// 行字段取整数；驱动可能以字符串返回数字列，所以兼容解析
pub(crate) fn row_i64(row: &SchemaRow, key: &str) -> Option<i64> {
    match row.get(key) {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        Some(Value::Bool(b)) => Some(i64::from(*b)),
        _ => None,
    }
}
