use indexmap::IndexMap;

use crate::generators::php_array::PhpArrayExporter;
use crate::models::InferenceResult;

/// 验证器类渲染器
///
/// 把推断结果序列化成验证运行时能直接加载的 PHP 类：
/// rules/messages/attributes/scenes 四个属性的数组字面量。
pub struct ValidatorClassRenderer;

impl ValidatorClassRenderer {
    pub fn render(
        namespace: &str,
        class: &str,
        rules: &IndexMap<String, String>,
        messages: &IndexMap<String, String>,
        attributes: &IndexMap<String, String>,
        scenes: &IndexMap<String, Vec<String>>,
    ) -> String {
        let rules_code = PhpArrayExporter::export_string_map(rules, 1);
        let messages_code = PhpArrayExporter::export_string_map(messages, 1);
        let attributes_code = PhpArrayExporter::export_string_map(attributes, 1);
        let scenes_code = PhpArrayExporter::export_list_map(scenes, 1);

        format!(
            r#"<?php
declare(strict_types=1);

namespace {namespace};

use support\validation\Validator;

class {class} extends Validator
{{
    protected array $rules = {rules_code};

    protected array $messages = {messages_code};

    protected array $attributes = {attributes_code};

    protected array $scenes = {scenes_code};
}}
"#
        )
    }

    /// 渲染推断结果（messages 目前总是空映射，留给人工补充）
    pub fn render_result(namespace: &str, class: &str, result: &InferenceResult) -> String {
        Self::render(
            namespace,
            class,
            &result.rules,
            &IndexMap::new(),
            &result.attributes,
            &result.scenes,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::indexmap;

    fn sample() -> InferenceResult {
        InferenceResult {
            rules: indexmap! {
                "id".to_string() => "required|integer|min:0".to_string(),
                "name".to_string() => "required|string|max:100".to_string(),
            },
            attributes: indexmap! {
                "name".to_string() => "用户名".to_string(),
            },
            scenes: indexmap! {
                "create".to_string() => vec!["name".to_string()],
                "update".to_string() => vec!["id".to_string(), "name".to_string()],
            },
        }
    }

    #[test]
    fn test_render_skeleton() {
        let rendered = ValidatorClassRenderer::render(
            "app\\validation",
            "UserValidator",
            &IndexMap::new(),
            &IndexMap::new(),
            &IndexMap::new(),
            &IndexMap::new(),
        );
        assert!(rendered.starts_with("<?php\ndeclare(strict_types=1);\n"));
        assert!(rendered.contains("namespace app\\validation;"));
        assert!(rendered.contains("class UserValidator extends Validator"));
        assert!(rendered.contains("protected array $rules = [];"));
        assert!(rendered.contains("protected array $scenes = [];"));
        assert!(rendered.ends_with("}\n"));
    }

    #[test]
    fn test_render_is_byte_reproducible() {
        let result = sample();
        let first = ValidatorClassRenderer::render_result("app\\validation", "UserValidator", &result);
        let second = ValidatorClassRenderer::render_result("app\\validation", "UserValidator", &result);
        assert_eq!(first, second);
    }

    #[test]
    fn test_round_trip_parses_back_to_original_maps() {
        let result = sample();
        let rendered = ValidatorClassRenderer::render_result("app\\validation", "UserValidator", &result);

        assert_eq!(parse_string_map(&rendered, "rules"), result.rules);
        assert_eq!(parse_string_map(&rendered, "attributes"), result.attributes);
        assert_eq!(parse_list_map(&rendered, "scenes"), result.scenes);
        assert!(parse_string_map(&rendered, "messages").is_empty());
    }

    /// 从渲染产物中取出一个属性的数组字面量文本
    fn property_block<'a>(rendered: &'a str, property: &str) -> &'a str {
        let marker = format!("protected array ${} = ", property);
        let start = rendered.find(&marker).expect("property present") + marker.len();
        let rest = &rendered[start..];
        let end = rest.find(";\n").expect("terminated initializer");
        &rest[..end]
    }

    fn unquote(literal: &str) -> String {
        let inner = literal
            .trim()
            .trim_end_matches(',')
            .trim_start_matches('\'')
            .trim_end_matches('\'');
        inner.replace("\\'", "'").replace("\\\\", "\\")
    }

    fn parse_string_map(rendered: &str, property: &str) -> IndexMap<String, String> {
        let block = property_block(rendered, property);
        let mut map = IndexMap::new();
        if block == "[]" {
            return map;
        }
        for line in block.lines() {
            let line = line.trim();
            if let Some((key, value)) = line.split_once(" => ") {
                map.insert(unquote(key), unquote(value));
            }
        }
        map
    }

    fn parse_list_map(rendered: &str, property: &str) -> IndexMap<String, Vec<String>> {
        let block = property_block(rendered, property);
        let mut map = IndexMap::new();
        if block == "[]" {
            return map;
        }
        let mut current: Option<String> = None;
        for line in block.lines() {
            let line = line.trim();
            if let Some((key, _)) = line.split_once(" => [") {
                let key = unquote(key);
                map.insert(key.clone(), Vec::new());
                current = Some(key);
            } else if line == "]," {
                current = None;
            } else if line.starts_with('\'') {
                if let Some(key) = &current {
                    map.get_mut(key).expect("key present").push(unquote(line));
                }
            }
        }
        map
    }
}
