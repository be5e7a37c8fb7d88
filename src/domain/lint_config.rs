//! 저장소에 있는 린터 설정 파일(.editorconfig, .swiftlint.yml, ESLint JSON) 해석.
//!
//! 정적 검사가 쓰는 값(들여쓰기, 최대 줄 길이, 끈 규칙)만 읽는다.

use serde_json::Value as JsonValue;
use serde_yaml_ng::Value as YamlValue;

use crate::domain::lint::{Language, LintOverrides};

impl Language {
    /// 저장소 루트에서 찾아볼 설정 파일. 앞쪽이 우선한다.
    pub fn config_files(self) -> &'static [&'static str] {
        match self {
            Self::Kotlin => &[".editorconfig"],
            Self::Swift => &[".swiftlint.yml", "swiftlint.yml", ".swiftlint.yaml"],
            Self::JavaScript => &[".eslintrc.json", "package.json"],
        }
    }
}

/// 설정 파일 하나를 해석한다. 읽을 수 없는 형식이거나 관련 설정이 없으면 None.
pub fn parse_linter_config(language: Language, file_name: &str, content: &str) -> Option<LintOverrides> {
    match language {
        Language::Kotlin => Some(parse_editorconfig(content)),
        Language::Swift => parse_swiftlint(content),
        Language::JavaScript => {
            let value: JsonValue = serde_json::from_str(content).ok()?;
            let config = if file_name == "package.json" {
                value.get("eslintConfig")?
            } else {
                &value
            };
            Some(parse_eslint(config))
        }
    }
}

/// Kotlin 파일에 걸리는 섹션(`*`, `*.kt`, `*.{kt,kts}` 등)과 섹션 앞 전역 키만 반영한다.
/// `ktlint_standard_<rule> = disabled`는 규칙 끄기로 읽는다.
fn parse_editorconfig(content: &str) -> LintOverrides {
    let mut overrides = LintOverrides::default();
    let mut applies = true;

    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            applies = section_covers_kotlin(section);
            continue;
        }
        if !applies {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();

        match key.as_str() {
            "indent_size" => {
                if let Some(size) = positive(value) {
                    overrides.indent_size = Some(size);
                }
            }
            "max_line_length" => {
                if value.eq_ignore_ascii_case("off") {
                    toggle_rule(&mut overrides.disabled_rules, "max-line-length", false);
                } else if let Some(limit) = positive(value) {
                    overrides.max_line_length = Some(limit);
                }
            }
            _ => {
                let Some(rule) = key
                    .strip_prefix("ktlint_standard_")
                    .or_else(|| key.strip_prefix("ktlint_"))
                else {
                    continue;
                };
                let rule = rule.replace('_', "-");
                if value.eq_ignore_ascii_case("disabled") {
                    toggle_rule(&mut overrides.disabled_rules, &rule, false);
                } else if value.eq_ignore_ascii_case("enabled") {
                    toggle_rule(&mut overrides.disabled_rules, &rule, true);
                }
            }
        }
    }

    overrides
}

fn section_covers_kotlin(section: &str) -> bool {
    let glob = section.trim().trim_start_matches('*');
    if glob.is_empty() {
        return true;
    }
    let Some(extensions) = glob.strip_prefix('.') else {
        return false;
    };
    extensions
        .trim_start_matches('{')
        .trim_end_matches('}')
        .split(',')
        .any(|ext| matches!(ext.trim(), "kt" | "kts"))
}

/// `disabled_rules`와 `line_length`(숫자, `[warning, error]`, `{warning: n}`)를 읽는다.
fn parse_swiftlint(content: &str) -> Option<LintOverrides> {
    let value: YamlValue = serde_yaml_ng::from_str(content).ok()?;
    if !value.is_mapping() {
        return None;
    }

    let disabled_rules = value
        .get("disabled_rules")
        .and_then(YamlValue::as_sequence)
        .map(|rules| {
            rules
                .iter()
                .filter_map(YamlValue::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let max_line_length = value.get("line_length").and_then(|limit| {
        let warning = match limit {
            YamlValue::Sequence(levels) => levels.first(),
            YamlValue::Mapping(_) => limit.get("warning"),
            _ => Some(limit),
        };
        warning
            .and_then(YamlValue::as_u64)
            .and_then(|n| usize::try_from(n).ok())
            .filter(|n| *n > 0)
    });

    Some(LintOverrides {
        indent_size: None,
        max_line_length,
        disabled_rules,
    })
}

/// `rules`에서 `"off"`/`0`(배열이면 첫 원소)인 규칙을 끈 규칙으로 읽는다.
fn parse_eslint(config: &JsonValue) -> LintOverrides {
    let disabled_rules = config
        .get("rules")
        .and_then(JsonValue::as_object)
        .map(|rules| {
            rules
                .iter()
                .filter(|(_, level)| is_off(level))
                .map(|(name, _)| name.clone())
                .collect()
        })
        .unwrap_or_default();

    LintOverrides {
        disabled_rules,
        ..LintOverrides::default()
    }
}

fn is_off(level: &JsonValue) -> bool {
    match level {
        JsonValue::String(s) => s == "off",
        JsonValue::Number(n) => n.as_u64() == Some(0),
        JsonValue::Array(items) => items.first().is_some_and(is_off),
        _ => false,
    }
}

fn positive(value: &str) -> Option<usize> {
    value.parse().ok().filter(|n: &usize| *n > 0)
}

fn toggle_rule(disabled: &mut Vec<String>, rule: &str, enabled: bool) {
    disabled.retain(|r| r != rule);
    if !enabled {
        disabled.push(rule.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editorconfig_reads_kotlin_sections_only() {
        let content = "\
root = true

[*]
indent_size = 2
max_line_length = 100

[*.md]
max_line_length = off

[*.{kt,kts}]
indent_size = 4
ktlint_standard_no-wildcard-imports = disabled
ktlint_function_naming = disabled
ktlint_standard_function-naming = enabled
";
        let overrides = parse_linter_config(Language::Kotlin, ".editorconfig", content)
            .expect("editorconfig is always readable");
        assert_eq!(overrides.indent_size, Some(4));
        assert_eq!(overrides.max_line_length, Some(100));
        assert_eq!(overrides.disabled_rules, vec!["no-wildcard-imports"]);
    }

    #[test]
    fn editorconfig_can_turn_line_length_off() {
        let overrides = parse_editorconfig("[*.kt]\nmax_line_length = off\nindent_size = tab\n");
        assert_eq!(overrides.max_line_length, None);
        assert_eq!(overrides.indent_size, None);
        assert_eq!(overrides.disabled_rules, vec!["max-line-length"]);
    }

    #[test]
    fn swiftlint_line_length_accepts_all_shapes() {
        let number = parse_swiftlint("line_length: 140\n").expect("valid yaml");
        assert_eq!(number.max_line_length, Some(140));

        let levels = parse_swiftlint("line_length: [110, 200]\n").expect("valid yaml");
        assert_eq!(levels.max_line_length, Some(110));

        let mapping = parse_swiftlint(
            "disabled_rules:\n  - force_cast\n  - trailing_whitespace\nline_length:\n  warning: 150\n  error: 200\n",
        )
        .expect("valid yaml");
        assert_eq!(mapping.max_line_length, Some(150));
        assert_eq!(mapping.disabled_rules, vec!["force_cast", "trailing_whitespace"]);
    }

    #[test]
    fn broken_swiftlint_yaml_is_ignored() {
        assert!(parse_swiftlint("disabled_rules: [force_cast\n").is_none());
        assert!(parse_swiftlint("just a string").is_none());
    }

    #[test]
    fn eslint_off_rules_are_disabled() {
        let rc = r#"{"rules": {"no-console": "off", "eqeqeq": ["error", "always"], "semi": 0, "quotes": ["off", "double"]}}"#;
        let overrides =
            parse_linter_config(Language::JavaScript, ".eslintrc.json", rc).expect("valid json");
        let mut disabled = overrides.disabled_rules;
        disabled.sort();
        assert_eq!(disabled, vec!["no-console", "quotes", "semi"]);

        let package = r#"{"name": "web", "eslintConfig": {"rules": {"eqeqeq": "off"}}}"#;
        let overrides =
            parse_linter_config(Language::JavaScript, "package.json", package).expect("eslintConfig");
        assert_eq!(overrides.disabled_rules, vec!["eqeqeq"]);

        assert!(parse_linter_config(Language::JavaScript, "package.json", r#"{"name": "web"}"#).is_none());
    }
}
