use std::collections::HashSet;

use indexmap::IndexMap;

use crate::models::{ColumnDefinition, InferOptions, InferenceResult, TableDefinition};
use crate::utils::error::{AppError, Result};

/// ORM 风味，决定默认排除的时间戳/软删除列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrmFlavor {
    Laravel,
    ThinkOrm,
}

impl OrmFlavor {
    pub fn default_excluded_columns(self) -> Vec<String> {
        let columns: &[&str] = match self {
            Self::Laravel => &["created_at", "updated_at", "deleted_at"],
            // ThinkORM 惯用 *_time 字段做时间戳/软删除
            Self::ThinkOrm => &["create_time", "update_time", "delete_time"],
        };
        columns.iter().map(|c| (*c).to_string()).collect()
    }
}

impl std::str::FromStr for OrmFlavor {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "laravel" => Ok(Self::Laravel),
            "thinkorm" => Ok(Self::ThinkOrm),
            other => Err(AppError::InvalidInput(format!(
                "Unsupported ORM flavor: {} (supported: laravel/thinkorm)",
                other
            ))),
        }
    }
}

/// 默认规则推断器：表定义 -> 规则/字段名/场景
///
/// 纯函数，无隐藏状态；同样输入必然产出逐字节相同的结果。
pub struct RuleInferrer;

impl RuleInferrer {
    pub fn infer(table: &TableDefinition, options: &InferOptions) -> Result<InferenceResult> {
        let excluded: HashSet<String> = options
            .exclude_columns
            .iter()
            .map(|c| c.to_lowercase())
            .collect();

        let mut rules = IndexMap::new();
        let mut attributes = IndexMap::new();

        for column in &table.columns {
            if excluded.contains(&column.name.to_lowercase()) {
                continue;
            }
            if column.auto_increment && !options.with_scenes {
                // 自增列（如 id）通常不进校验规则；生成场景时保留，
                // 因为场景成员需要主键引用
                continue;
            }

            let parts = Self::rule_parts(column);
            if parts.is_empty() {
                continue;
            }

            rules.insert(column.name.clone(), parts.join("|"));

            let comment = column.comment.trim();
            if !comment.is_empty() {
                attributes.insert(column.name.clone(), comment.to_string());
            }
        }

        let scenes = if options.with_scenes {
            let kind = options.scenes.trim().to_lowercase();
            if kind != "crud" {
                return Err(AppError::InvalidInput(format!(
                    "Unsupported scenes type: {}",
                    kind
                )));
            }
            Self::build_crud_scenes(table, &rules)?
        } else {
            IndexMap::new()
        };

        Ok(InferenceResult {
            rules,
            attributes,
            scenes,
        })
    }

    /// CRUD 场景：create 不含主键，update 主键在前（全量更新语义），
    /// delete/detail 只有主键
    fn build_crud_scenes(
        table: &TableDefinition,
        rules: &IndexMap<String, String>,
    ) -> Result<IndexMap<String, Vec<String>>> {
        let pk: Vec<String> = table
            .primary_key_columns
            .iter()
            .filter(|c| rules.contains_key(*c))
            .cloned()
            .collect();
        if pk.is_empty() {
            return Err(AppError::Inference(format!(
                "Cannot generate CRUD scenes: primary key columns not found in rules for table {}",
                table.table
            )));
        }

        let non_pk: Vec<String> = rules
            .keys()
            .filter(|k| !pk.contains(k))
            .cloned()
            .collect();

        let mut update = pk.clone();
        update.extend(non_pk.iter().cloned());

        let mut scenes = IndexMap::new();
        scenes.insert("create".to_string(), non_pk);
        scenes.insert("update".to_string(), update);
        scenes.insert("delete".to_string(), pk.clone());
        scenes.insert("detail".to_string(), pk);
        Ok(scenes)
    }

    fn rule_parts(column: &ColumnDefinition) -> Vec<String> {
        let mut parts = Vec::new();

        if Self::should_be_required(column) {
            parts.push("required".to_string());
        } else if column.nullable {
            parts.push("nullable".to_string());
        }

        parts.extend(Self::type_parts(column));
        parts
    }

    /// 非空且无默认值才算必填；有默认值的列允许缺省
    fn should_be_required(column: &ColumnDefinition) -> bool {
        !column.nullable && column.default_value.is_none()
    }

    fn type_parts(column: &ColumnDefinition) -> Vec<String> {
        if !column.enum_values.is_empty() {
            // 枚举值里出现逗号会让规则串歧义；保持原样输出以兼容既有产物
            return vec![format!("in:{}", column.enum_values.join(","))];
        }

        match column.data_type.to_lowercase().as_str() {
            "varchar" | "char" => Self::string_rules(column),
            "text" | "tinytext" | "mediumtext" | "longtext" => vec!["string".to_string()],
            "int" | "integer" | "tinyint" | "smallint" | "mediumint" | "bigint" => {
                Self::bounded_numeric_rules(column, "integer")
            }
            "decimal" | "numeric" | "float" | "double" => {
                Self::bounded_numeric_rules(column, "numeric")
            }
            "date" | "datetime" | "timestamp" | "time" => vec!["date".to_string()],
            "json" => vec!["json".to_string()],
            "bool" | "boolean" => vec!["boolean".to_string()],
            _ => Vec::new(),
        }
    }

    fn string_rules(column: &ColumnDefinition) -> Vec<String> {
        let mut rules = vec!["string".to_string()];
        if let Some(length) = column.character_maximum_length {
            if length > 0 {
                rules.push(format!("max:{}", length));
            }
        }
        rules
    }

    fn bounded_numeric_rules(column: &ColumnDefinition, kind: &str) -> Vec<String> {
        let mut rules = vec![kind.to_string()];
        if column.unsigned {
            rules.push("min:0".to_string());
        }
        rules
    }
}
