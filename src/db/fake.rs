//! 测试用的内存连接：按 SQL 片段匹配返回预置行

use async_trait::async_trait;
use serde_json::Value;

use crate::db::connection::{SchemaConnection, SchemaRow};
use crate::utils::error::Result;

pub(crate) struct FakeConnection {
    driver: String,
    database: Option<String>,
    responses: Vec<(String, Vec<SchemaRow>)>,
}

impl FakeConnection {
    pub(crate) fn new(driver: &str, database: Option<&str>) -> Self {
        Self {
            driver: driver.to_string(),
            database: database.map(str::to_string),
            responses: Vec::new(),
        }
    }

    /// SQL 文本包含 `fragment` 时返回 `rows`；都不匹配时返回空结果
    pub(crate) fn with_response(mut self, fragment: &str, rows: Vec<SchemaRow>) -> Self {
        self.responses.push((fragment.to_string(), rows));
        self
    }
}

#[async_trait]
impl SchemaConnection for FakeConnection {
    fn driver_name(&self) -> &str {
        &self.driver
    }

    fn database_name(&self) -> Option<&str> {
        self.database.as_deref()
    }

    async fn select(&self, sql: &str, _bindings: &[String]) -> Result<Vec<SchemaRow>> {
        for (fragment, rows) in &self.responses {
            if sql.contains(fragment) {
                return Ok(rows.clone());
            }
        }
        Ok(Vec::new())
    }
}

pub(crate) fn row(pairs: &[(&str, Value)]) -> SchemaRow {
    let mut map = SchemaRow::new();
    for (key, value) in pairs {
        map.insert((*key).to_string(), value.clone());
    }
    map
}
