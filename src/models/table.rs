use serde::{Deserialize, Serialize};

/// 单个数据库列的方言无关定义
///
/// `data_type` 是归一化后的小写规范类型（如 `varchar`、`integer`、`enum`），
/// `column_type` 保留方言原始类型串（如 `varchar(255)`），用于诊断与枚举解析。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: String,
    pub column_type: String,
    pub nullable: bool,
    pub default_value: Option<String>,
    pub character_maximum_length: Option<i64>,
    pub numeric_precision: Option<i64>,
    pub numeric_scale: Option<i64>,
    pub unsigned: bool,
    pub auto_increment: bool,
    pub enum_values: Vec<String>,
    pub comment: String,
}

/// 表结构定义
///
/// 列顺序保持目录查询的 ordinal 顺序，主键列名保证是列名的子集
/// （否则内省阶段直接失败）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDefinition {
    pub table: String,
    pub columns: Vec<ColumnDefinition>,
    pub primary_key_columns: Vec<String>,
}
