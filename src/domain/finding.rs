//! 리뷰 finding과 이미 게시된 코멘트의 값 객체.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const UNKNOWN_CATEGORY: &str = "unknown";

static PRIORITY_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(P[23])\]").expect("priority pattern"));
static CATEGORY_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*([^*\n]+)\*\*:[ \t]*([^\n]*)").expect("category pattern")
});

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Priority {
    P2,
    #[default]
    P3,
}

impl Priority {
    /// "P2"/"p3" 형태만 인정한다.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "P2" => Some(Self::P2),
            "P3" => Some(Self::P3),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::P2 => "P2",
            Self::P3 => "P3",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 분석 1회에서 새로 만들어진 코멘트 후보.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub line: u32,
    pub priority: Priority,
    pub category: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// PR에 이미 달린 코멘트를 비교용 필드로 되읽은 결과.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedComment {
    pub priority: Priority,
    pub category: String,
    pub message: String,
}

impl Default for PostedComment {
    fn default() -> Self {
        Self {
            priority: Priority::P3,
            category: UNKNOWN_CATEGORY.to_string(),
            message: String::new(),
        }
    }
}

impl PostedComment {
    /// 코멘트 본문에서 `[P2]`/`[P3]` 토큰과 `**카테고리**: 메시지` 구간을 추출한다.
    /// 찾지 못한 필드는 기본값(P3, unknown, 빈 메시지)으로 남는다.
    pub fn parse(body: &str) -> Self {
        let mut parsed = Self::default();

        if let Some(priority) = PRIORITY_TOKEN
            .captures(body)
            .and_then(|c| Priority::parse(&c[1]))
        {
            parsed.priority = priority;
        }

        if let Some(caps) = CATEGORY_SEGMENT.captures(body) {
            let category = caps[1].trim();
            if !category.is_empty() {
                parsed.category = category.to_string();
            }
            parsed.message = caps[2].trim().to_string();
        }

        parsed
    }
}

/// 모델 응답에서 finding JSON 배열을 best-effort로 추출한다.
/// 파싱 실패 시 빈 목록을 반환한다.
pub fn parse_findings_output(text: &str) -> Vec<Finding> {
    let Some(items) = extract_json_array(text) else {
        return Vec::new();
    };

    items.iter().filter_map(finding_from_value).collect()
}

fn extract_json_array(text: &str) -> Option<Vec<Value>> {
    let stripped = strip_code_fence(text.trim());
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(stripped) {
        return Some(items);
    }

    // 설명 문장이 섞인 응답은 가장 바깥 대괄호 구간만 다시 시도한다.
    let start = stripped.find('[')?;
    let end = stripped.rfind(']')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&stripped[start..=end]) {
        Ok(Value::Array(items)) => Some(items),
        _ => None,
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // 언어 태그(```json) 줄을 건너뛴다.
    let body = rest.split_once('\n').map(|(_, b)| b).unwrap_or("");
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

fn finding_from_value(value: &Value) -> Option<Finding> {
    let line = match value.get("line")? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .and_then(|n| u32::try_from(n).ok())
    .filter(|n| *n > 0)?;

    let text_field = |key: &str| {
        value
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
    };

    Some(Finding {
        line,
        priority: text_field("priority")
            .and_then(|p| Priority::parse(&p))
            .unwrap_or_default(),
        category: text_field("category").unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
        message: text_field("message").unwrap_or_default(),
        suggestion: text_field("suggestion"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn posted_comment_reads_rendered_body() {
        let body = "🟡 **[P2]** 🤖 **AI 분석**\n\n**메모리**: Handler가 Activity를 붙잡아 메모리 누수 위험\n";
        let parsed = PostedComment::parse(body);
        assert_eq!(parsed.priority, Priority::P2);
        assert_eq!(parsed.category, "메모리");
        assert_eq!(parsed.message, "Handler가 Activity를 붙잡아 메모리 누수 위험");
    }

    #[test]
    fn unparseable_comment_falls_back_to_defaults() {
        let parsed = PostedComment::parse("looks good to me");
        assert_eq!(parsed, PostedComment::default());
        assert_eq!(parsed.category, "unknown");
    }

    #[test]
    fn findings_are_read_from_fenced_output() {
        let out = "```json\n[{\"line\": 12, \"priority\": \"P2\", \"category\": \"성능\", \"message\": \"O(n²) 루프\", \"suggestion\": \"map 사용\"}]\n```";
        let findings = parse_findings_output(out);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 12);
        assert_eq!(findings[0].priority, Priority::P2);
        assert_eq!(findings[0].suggestion.as_deref(), Some("map 사용"));
    }

    #[test]
    fn findings_tolerate_surrounding_prose_and_bad_entries() {
        let out = "결과입니다:\n[{\"line\": \"7\", \"priority\": \"P9\", \"message\": \"x\"}, {\"priority\": \"P2\"}, {\"line\": 0}]\n끝.";
        let findings = parse_findings_output(out);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 7);
        assert_eq!(findings[0].priority, Priority::P3);
        assert_eq!(findings[0].category, UNKNOWN_CATEGORY);
    }

    #[test]
    fn garbage_output_yields_no_findings() {
        assert!(parse_findings_output("").is_empty());
        assert!(parse_findings_output("no issues found").is_empty());
        assert!(parse_findings_output("{\"line\": 1}").is_empty());
    }
}
