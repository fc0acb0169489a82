use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::mysql::MySqlRow;
use sqlx::postgres::PgRow;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, MySqlPool, PgPool, Row, SqlitePool};

use crate::utils::error::Result;

/// 归一化后的目录查询结果行：字段名 -> JSON 值
pub type SchemaRow = Map<String, Value>;

/// 数据库连接的最小能力抽象
///
/// 只暴露内省所需的三个能力：驱动名、库名、参数化查询。
/// `select` 必须把底层驱动的各种行表示统一成字段名索引的映射，
/// 不让驱动差异泄漏进内省逻辑。
#[async_trait]
pub trait SchemaConnection: Send + Sync {
    fn driver_name(&self) -> &str;

    fn database_name(&self) -> Option<&str>;

    async fn select(&self, sql: &str, bindings: &[String]) -> Result<Vec<SchemaRow>>;
}

/// MySQL/MariaDB 连接（sqlx 连接池）
pub struct MySqlSchemaConnection {
    pool: MySqlPool,
    driver: String,
    database: Option<String>,
}

impl MySqlSchemaConnection {
    pub fn new(pool: MySqlPool, driver: impl Into<String>, database: Option<String>) -> Self {
        Self {
            pool,
            driver: driver.into(),
            database,
        }
    }
}

#[async_trait]
impl SchemaConnection for MySqlSchemaConnection {
    fn driver_name(&self) -> &str {
        &self.driver
    }

    fn database_name(&self) -> Option<&str> {
        self.database.as_deref()
    }

    async fn select(&self, sql: &str, bindings: &[String]) -> Result<Vec<SchemaRow>> {
        let mut query = sqlx::query(sql);
        for binding in bindings {
            query = query.bind(binding);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(|e| {
            tracing::error!("MySQL catalog query failed: {}", e);
            e
        })?;
        Ok(rows.iter().map(mysql_row_to_map).collect())
    }
}

/// PostgreSQL 连接（sqlx 连接池）
pub struct PgSchemaConnection {
    pool: PgPool,
    driver: String,
    database: Option<String>,
}

impl PgSchemaConnection {
    pub fn new(pool: PgPool, driver: impl Into<String>, database: Option<String>) -> Self {
        Self {
            pool,
            driver: driver.into(),
            database,
        }
    }
}

#[async_trait]
impl SchemaConnection for PgSchemaConnection {
    fn driver_name(&self) -> &str {
        &self.driver
    }

    fn database_name(&self) -> Option<&str> {
        self.database.as_deref()
    }

    async fn select(&self, sql: &str, bindings: &[String]) -> Result<Vec<SchemaRow>> {
        // information_schema 的查询占位符是 `?`，Postgres 侧改写成 `$1..$n`
        let sql = rewrite_placeholders(sql);
        let mut query = sqlx::query(&sql);
        for binding in bindings {
            query = query.bind(binding);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(|e| {
            tracing::error!("PostgreSQL catalog query failed: {}", e);
            e
        })?;
        Ok(rows.iter().map(pg_row_to_map).collect())
    }
}

/// SQLite 连接（sqlx 连接池）
pub struct SqliteSchemaConnection {
    pool: SqlitePool,
    driver: String,
    database: Option<String>,
}

impl SqliteSchemaConnection {
    pub fn new(pool: SqlitePool, driver: impl Into<String>, database: Option<String>) -> Self {
        Self {
            pool,
            driver: driver.into(),
            database,
        }
    }
}

#[async_trait]
impl SchemaConnection for SqliteSchemaConnection {
    fn driver_name(&self) -> &str {
        &self.driver
    }

    fn database_name(&self) -> Option<&str> {
        self.database.as_deref()
    }

    async fn select(&self, sql: &str, bindings: &[String]) -> Result<Vec<SchemaRow>> {
        let mut query = sqlx::query(sql);
        for binding in bindings {
            query = query.bind(binding);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(|e| {
            tracing::error!("SQLite catalog query failed: {}", e);
            e
        })?;
        Ok(rows.iter().map(sqlite_row_to_map).collect())
    }
}

/// 把 `?` 占位符改写成 Postgres 的 `$1..$n`
fn rewrite_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut index = 0usize;
    for c in sql.chars() {
        if c == '?' {
            index += 1;
            out.push('$');
            out.push_str(&index.to_string());
        } else {
            out.push(c);
        }
    }
    out
}

fn mysql_row_to_map(row: &MySqlRow) -> SchemaRow {
    let mut map = Map::new();
    for (index, column) in row.columns().iter().enumerate() {
        map.insert(column.name().to_string(), mysql_cell(row, index));
    }
    map
}

/// 逐个类型尝试解码；全部失败时退化为 Null
fn mysql_cell(row: &MySqlRow, index: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<u64>, _>(index) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(index) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(index) {
        return v
            .map(|b| Value::String(String::from_utf8_lossy(&b).into_owned()))
            .unwrap_or(Value::Null);
    }
    Value::Null
}

fn pg_row_to_map(row: &PgRow) -> SchemaRow {
    let mut map = Map::new();
    for (index, column) in row.columns().iter().enumerate() {
        map.insert(column.name().to_string(), pg_cell(row, index));
    }
    map
}

fn pg_cell(row: &PgRow, index: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<i32>, _>(index) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<i16>, _>(index) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(index) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(index) {
        return v
            .map(|b| Value::String(String::from_utf8_lossy(&b).into_owned()))
            .unwrap_or(Value::Null);
    }
    Value::Null
}

fn sqlite_row_to_map(row: &SqliteRow) -> SchemaRow {
    let mut map = Map::new();
    for (index, column) in row.columns().iter().enumerate() {
        map.insert(column.name().to_string(), sqlite_cell(row, index));
    }
    map
}

fn sqlite_cell(row: &SqliteRow, index: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(index) {
        return v
            .map(|b| Value::String(String::from_utf8_lossy(&b).into_owned()))
            .unwrap_or(Value::Null);
    }
    Value::Null
}
