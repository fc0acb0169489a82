use tracing::{debug, info};

use crate::db::connection::SchemaConnection;
use crate::infer::RuleInferrer;
use crate::introspect::IntrospectorFactory;
use crate::models::{InferOptions, InferenceResult, TableDefinition};
use crate::utils::error::{AppError, Result};

/// 生成服务：串起内省与规则推断
///
/// 方言由连接的驱动名决定，调用方不需要关心内省细节。
pub struct GeneratorService;

impl GeneratorService {
    pub async fn infer_from_table(
        connection: &dyn SchemaConnection,
        table: &str,
        options: &InferOptions,
    ) -> Result<InferenceResult> {
        let definition = Self::introspect_table(connection, table).await?;
        let result = RuleInferrer::infer(&definition, options)?;

        if result.rules.is_empty() {
            return Err(AppError::Inference(format!(
                "No rules inferred from table: {}",
                table
            )));
        }

        info!(
            "Inferred {} rules and {} scenes from table {}",
            result.rules.len(),
            result.scenes.len(),
            table
        );
        Ok(result)
    }

    pub async fn introspect_table(
        connection: &dyn SchemaConnection,
        table: &str,
    ) -> Result<TableDefinition> {
        let driver = connection.driver_name();
        debug!("Introspecting table {} via driver {}", table, driver);

        let introspector = IntrospectorFactory::create_for_driver(driver)?;
        let definition = introspector.introspect(connection, table).await?;
        debug!(
            "Table {} has {} columns, primary key: {:?}",
            definition.table,
            definition.columns.len(),
            definition.primary_key_columns
        );
        Ok(definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fake::{row, FakeConnection};
    use serde_json::json;

    fn pragma_connection() -> FakeConnection {
        FakeConnection::new("sqlite", None)
            .with_response(
                "PRAGMA table_info",
                vec![
                    row(&[
                        ("cid", json!(0)),
                        ("name", json!("id")),
                        ("type", json!("INTEGER")),
                        ("notnull", json!(1)),
                        ("dflt_value", json!(null)),
                        ("pk", json!(1)),
                    ]),
                    row(&[
                        ("cid", json!(1)),
                        ("name", json!("title")),
                        ("type", json!("VARCHAR(80)")),
                        ("notnull", json!(1)),
                        ("dflt_value", json!(null)),
                        ("pk", json!(0)),
                    ]),
                ],
            )
    }

    #[tokio::test]
    async fn test_infer_from_table_end_to_end() {
        let connection = pragma_connection();
        let options = InferOptions {
            with_scenes: true,
            scenes: "crud".to_string(),
            ..Default::default()
        };

        let result = GeneratorService::infer_from_table(&connection, "posts", &options)
            .await
            .unwrap();

        assert_eq!(result.rules["id"], "required|integer");
        assert_eq!(result.rules["title"], "required|string|max:80");
        assert_eq!(result.scenes["create"], vec!["title"]);
        assert_eq!(result.scenes["delete"], vec!["id"]);
    }

    #[tokio::test]
    async fn test_infer_fails_when_no_rules_remain() {
        let connection = pragma_connection();
        let options = InferOptions {
            exclude_columns: vec!["id".to_string(), "title".to_string()],
            ..Default::default()
        };

        let err = GeneratorService::infer_from_table(&connection, "posts", &options)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Inference(_)));
        assert!(err.to_string().contains("posts"));
    }

    #[tokio::test]
    async fn test_unknown_driver_is_rejected_before_querying() {
        let connection = FakeConnection::new("oracle", None);
        let err = GeneratorService::introspect_table(&connection, "posts")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
