use indexmap::IndexMap;

/// PHP 数组字面量导出器
///
/// 输出风格固定（4 空格缩进、每行尾随逗号），同样输入逐字节相同，
/// 保证生成文件可复现、可 diff。
pub struct PhpArrayExporter;

impl PhpArrayExporter {
    /// 导出字符串映射为类属性初始化器
    ///
    /// 空映射输出 `[]`；非空时形如：
    /// ```text
    /// [
    ///         'k' => 'v',
    ///     ]
    /// ```
    /// 首行无缩进（紧跟在 `= ` 之后），收尾缩进对齐属性声明。
    pub fn export_string_map(map: &IndexMap<String, String>, indent_level: usize) -> String {
        if map.is_empty() {
            return "[]".to_string();
        }

        let property_indent = "    ".repeat(indent_level);
        let child_indent = "    ".repeat(indent_level + 1);

        let mut lines = vec!["[".to_string()];
        for (key, value) in map {
            lines.push(format!(
                "{}{} => {},",
                child_indent,
                Self::export_scalar(key),
                Self::export_scalar(value)
            ));
        }
        lines.push(format!("{}]", property_indent));
        lines.join("\n")
    }

    /// 导出「键 -> 字符串列表」映射（场景定义用）
    pub fn export_list_map(map: &IndexMap<String, Vec<String>>, indent_level: usize) -> String {
        if map.is_empty() {
            return "[]".to_string();
        }

        let property_indent = "    ".repeat(indent_level);
        let child_indent = "    ".repeat(indent_level + 1);
        let item_indent = "    ".repeat(indent_level + 2);

        let mut lines = vec!["[".to_string()];
        for (key, values) in map {
            if values.is_empty() {
                lines.push(format!(
                    "{}{} => [],",
                    child_indent,
                    Self::export_scalar(key)
                ));
                continue;
            }
            lines.push(format!("{}{} => [", child_indent, Self::export_scalar(key)));
            for value in values {
                lines.push(format!("{}{},", item_indent, Self::export_scalar(value)));
            }
            lines.push(format!("{}],", child_indent));
        }
        lines.push(format!("{}]", property_indent));
        lines.join("\n")
    }

    /// 单引号字符串字面量，转义 `\` 与 `'`
    fn export_scalar(value: &str) -> String {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::indexmap;

    #[test]
    fn test_empty_map_is_inline() {
        assert_eq!(PhpArrayExporter::export_string_map(&IndexMap::new(), 1), "[]");
        assert_eq!(PhpArrayExporter::export_list_map(&IndexMap::new(), 1), "[]");
    }

    #[test]
    fn test_export_string_map() {
        let map = indexmap! {
            "name".to_string() => "required|string|max:100".to_string(),
            "email".to_string() => "required|string|max:255".to_string(),
        };
        let expected = "[\n        'name' => 'required|string|max:100',\n        'email' => 'required|string|max:255',\n    ]";
        assert_eq!(PhpArrayExporter::export_string_map(&map, 1), expected);
    }

    #[test]
    fn test_export_list_map() {
        let map = indexmap! {
            "create".to_string() => vec!["name".to_string(), "email".to_string()],
            "delete".to_string() => vec!["id".to_string()],
        };
        let expected = "[\n        'create' => [\n            'name',\n            'email',\n        ],\n        'delete' => [\n            'id',\n        ],\n    ]";
        assert_eq!(PhpArrayExporter::export_list_map(&map, 1), expected);
    }

    #[test]
    fn test_scalar_escaping() {
        let map = indexmap! {
            "note".to_string() => "it's a \\ test".to_string(),
        };
        let exported = PhpArrayExporter::export_string_map(&map, 1);
        assert!(exported.contains(r"'it\'s a \\ test'"));
    }

    #[test]
    fn test_export_is_reproducible() {
        let map = indexmap! {
            "a".to_string() => "b".to_string(),
        };
        assert_eq!(
            PhpArrayExporter::export_string_map(&map, 1),
            PhpArrayExporter::export_string_map(&map, 1)
        );
    }
}
