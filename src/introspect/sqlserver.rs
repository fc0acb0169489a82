use async_trait::async_trait;

use crate::db::connection::SchemaConnection;
use crate::introspect::{row_i64, row_opt_str, row_str, split_schema_table, SchemaIntrospector};
use crate::models::{ColumnDefinition, TableDefinition};
use crate::utils::error::{AppError, Result};

/// SQL Server 方言：sys.columns / sys.types / sys.indexes
#[derive(Debug)]
pub struct SqlServerIntrospector;

// nvarchar/nchar 的 max_length 以字节存储，查询里先折半成字符数
const COLUMNS_SQL: &str = "SELECT
    c.name AS column_name,
    t.name AS data_type,
    CASE
        WHEN t.name IN ('nvarchar','nchar') THEN c.max_length / 2
        ELSE c.max_length
    END AS character_maximum_length,
    c.precision AS numeric_precision,
    c.scale AS numeric_scale,
    c.is_nullable AS is_nullable,
    dc.definition AS column_default,
    c.is_identity AS is_identity,
    ep.value AS column_comment
FROM sys.columns c
JOIN sys.tables tb ON tb.object_id = c.object_id
JOIN sys.schemas s ON s.schema_id = tb.schema_id
JOIN sys.types t ON t.user_type_id = c.user_type_id
LEFT JOIN sys.default_constraints dc ON dc.parent_object_id = c.object_id AND dc.parent_column_id = c.column_id
LEFT JOIN sys.extended_properties ep ON ep.major_id = c.object_id AND ep.minor_id = c.column_id AND ep.name = 'MS_Description'
WHERE s.name = ?
  AND tb.name = ?
ORDER BY c.column_id";

const PRIMARY_KEY_SQL: &str = "SELECT c.name AS column_name
FROM sys.indexes i
JOIN sys.index_columns ic ON ic.object_id = i.object_id AND ic.index_id = i.index_id
JOIN sys.columns c ON c.object_id = ic.object_id AND c.column_id = ic.column_id
JOIN sys.tables tb ON tb.object_id = i.object_id
JOIN sys.schemas s ON s.schema_id = tb.schema_id
WHERE i.is_primary_key = 1
  AND s.name = ?
  AND tb.name = ?
ORDER BY ic.key_ordinal";

#[async_trait]
impl SchemaIntrospector for SqlServerIntrospector {
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

        let (schema, table_name) = split_schema_table(table, "dbo", "SQL Server")?;

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

        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            let name = row_str(row, "column_name");
            if name.is_empty() {
                continue;
            }

            let data_type = row_str(row, "data_type").to_lowercase();

            columns.push(ColumnDefinition {
                column_type: data_type.clone(),
                nullable: row_i64(row, "is_nullable").unwrap_or(0) == 1,
                default_value: row_opt_str(row, "column_default"),
                character_maximum_length: row_i64(row, "character_maximum_length"),
                numeric_precision: row_i64(row, "numeric_precision"),
                numeric_scale: row_i64(row, "numeric_scale"),
                unsigned: false,
                auto_increment: row_i64(row, "is_identity").unwrap_or(0) == 1,
                enum_values: Vec::new(),
                comment: row_str(row, "column_comment"),
                name,
                data_type,
            });
        }

        Ok(TableDefinition {
            table: table_name,
            columns,
            primary_key_columns,
        })
    }
}
