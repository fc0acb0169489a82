use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::db::connection::SchemaConnection;
use crate::introspect::{row_i64, row_opt_str, row_str, SchemaIntrospector};
use crate::models::{ColumnDefinition, TableDefinition};
use crate::utils::error::{AppError, Result};

/// SQLite 方言：PRAGMA table_info
///
/// PRAGMA 不支持绑定参数，表名只能内插进语句，所以先做严格的
/// 标识符校验。
#[derive(Debug)]
pub struct SqliteIntrospector;

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

static LENGTH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((\d+)\)").expect("valid regex"));

static PRECISION_SCALE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((\d+)\s*,\s*(\d+)\)").expect("valid regex"));

/// 从声明类型解析出的归一化类型信息
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ParsedType {
    pub data_type: &'static str,
    pub character_maximum_length: Option<i64>,
    pub numeric_precision: Option<i64>,
    pub numeric_scale: Option<i64>,
}

impl ParsedType {
    fn plain(data_type: &'static str) -> Self {
        Self {
            data_type,
            character_maximum_length: None,
            numeric_precision: None,
            numeric_scale: None,
        }
    }
}

#[async_trait]
impl SchemaIntrospector for SqliteIntrospector {
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
        if !IDENTIFIER_RE.is_match(table) {
            return Err(AppError::InvalidInput(format!(
                "Invalid table name for SQLite: {}",
                table
            )));
        }

        tracing::debug!("Fetching columns for {}", table);
        let sql = format!("PRAGMA table_info('{}')", table);
        let rows = connection.select(&sql, &[]).await?;
        if rows.is_empty() {
            return Err(AppError::NotFound(format!(
                "Table not found or has no columns: {}",
                table
            )));
        }

        let mut primary_key_columns = Vec::new();
        let mut columns = Vec::with_capacity(rows.len());

        for row in &rows {
            let name = row_str(row, "name");
            if name.is_empty() {
                continue;
            }

            let declared_type = row_str(row, "type").trim().to_lowercase();
            let pk = row_i64(row, "pk").unwrap_or(0);
            if pk > 0 {
                primary_key_columns.push(name.clone());
            }

            let parsed = parse_declared_type(&declared_type);

            columns.push(ColumnDefinition {
                data_type: parsed.data_type.to_string(),
                column_type: if declared_type.is_empty() {
                    parsed.data_type.to_string()
                } else {
                    declared_type.clone()
                },
                nullable: row_i64(row, "notnull").unwrap_or(0) != 1,
                default_value: row_opt_str(row, "dflt_value"),
                character_maximum_length: parsed.character_maximum_length,
                numeric_precision: parsed.numeric_precision,
                numeric_scale: parsed.numeric_scale,
                unsigned: false,
                // INTEGER PRIMARY KEY 是 rowid 别名，行为等同自增
                auto_increment: pk > 0 && parsed.data_type == "integer",
                enum_values: Vec::new(),
                comment: String::new(),
                name,
            });
        }

        Ok(TableDefinition {
            table: table.to_string(),
            columns,
            primary_key_columns,
        })
    }
}

/// 按 SQLite 类型亲和性规则解析声明类型，子串匹配按固定优先级
pub(crate) fn parse_declared_type(declared: &str) -> ParsedType {
    let declared = declared.trim();
    if declared.is_empty() {
        return ParsedType::plain("string");
    }

    if declared.contains("int") {
        return ParsedType::plain("integer");
    }
    if declared.contains("char") || declared.contains("clob") || declared.contains("text") {
        let length = LENGTH_RE
            .captures(declared)
            .and_then(|c| c[1].parse().ok());
        return ParsedType {
            data_type: "varchar",
            character_maximum_length: length,
            numeric_precision: None,
            numeric_scale: None,
        };
    }
    if declared.contains("blob") {
        return ParsedType::plain("string");
    }
    if declared.contains("real") || declared.contains("floa") || declared.contains("doub") {
        return ParsedType::plain("double");
    }
    if declared.contains("dec") || declared.contains("num") {
        let (precision, scale) = match PRECISION_SCALE_RE.captures(declared) {
            Some(c) => (c[1].parse().ok(), c[2].parse().ok()),
            None => (
                LENGTH_RE.captures(declared).and_then(|c| c[1].parse().ok()),
                None,
            ),
        };
        return ParsedType {
            data_type: "decimal",
            character_maximum_length: None,
            numeric_precision: precision,
            numeric_scale: scale,
        };
    }
    if declared.contains("bool") {
        return ParsedType::plain("boolean");
    }
    if declared.contains("date") || declared.contains("time") {
        return ParsedType::plain("datetime");
    }

    ParsedType::plain("string")
}
