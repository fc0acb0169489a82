use indexmap::IndexMap;

/// 规则推断选项
#[derive(Debug, Clone, Default)]
pub struct InferOptions {
    /// 排除的列名（大小写不敏感）
    pub exclude_columns: Vec<String>,
    /// 是否生成场景
    pub with_scenes: bool,
    /// 场景类型，目前只支持 crud
    pub scenes: String,
}

/// 推断结果：规则、字段显示名、场景
///
/// 三个映射均保持插入顺序，保证生成产物可复现、可 diff。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InferenceResult {
    pub rules: IndexMap<String, String>,
    pub attributes: IndexMap<String, String>,
    pub scenes: IndexMap<String, Vec<String>>,
}
