//! 라인 코멘트/리뷰 요약용 Markdown 렌더링 모듈.
//!
//! 라인 코멘트 본문은 다음 실행에서 `PostedComment::parse`로 다시 읽힌다.
//! `[P2]` 토큰과 `**category**: message` 한 줄 형식을 유지해야 한다.

use crate::domain::finding::{Finding, Priority};
use crate::domain::lint::{Language, is_linter_category};
use crate::domain::review::{ReviewSummary, TokenUsage};

const MODEL_SOURCE: &str = "AI 분석";

/// finding 하나를 라인 코멘트 본문으로 만든다.
pub fn render_finding_markdown(path: &str, finding: &Finding) -> String {
    let (source_emoji, source) = if is_linter_category(&finding.category) {
        ("🔧", finding.category.as_str())
    } else {
        ("🤖", MODEL_SOURCE)
    };

    let mut out = format!(
        "{} **[{}]** {} **{}**\n\n",
        priority_emoji(finding.priority),
        finding.priority,
        source_emoji,
        source
    );
    out.push_str(&format!("**{}**: {}\n", finding.category, single_line(&finding.message)));

    if let Some(suggestion) = finding.suggestion.as_deref().filter(|s| !s.trim().is_empty()) {
        let fence = Language::detect(path).map(Language::name).unwrap_or("");
        out.push_str(&format!(
            "\n**💡 개선 제안:**\n```{fence}\n{}\n```\n",
            suggestion.trim_end()
        ));
    }
    out
}

/// 리뷰 본문(출처별 finding 수 요약)을 만든다.
pub fn render_summary_markdown(target_url: &str, sha: &str, summary: &ReviewSummary) -> String {
    let mut out = String::new();
    out.push_str("🤖 **코드 품질 자동 검수 결과**\n\n");
    out.push_str(&format!("- Target: {target_url}\n"));
    out.push_str(&format!("- Head SHA: `{sha}`\n"));
    out.push_str(&format!("- Files reviewed: {}\n\n", summary.files_reviewed));

    for (linter, count) in &summary.lint_counts {
        out.push_str(&format!("🔧 **{linter}**: {count}개 이슈\n"));
    }
    if summary.model_findings > 0 {
        out.push_str(&format!(
            "🤖 **{MODEL_SOURCE}**: {}개 이슈\n",
            summary.model_findings
        ));
    }
    if summary.duplicates_skipped > 0 {
        out.push_str(&format!(
            "\n이미 게시된 코멘트와 중복된 {}개 항목은 제외했습니다.\n",
            summary.duplicates_skipped
        ));
    }

    let languages: Vec<&str> = Language::ALL.iter().map(|l| l.name()).collect();
    out.push_str(&format!("\n**지원 언어:** {}\n", languages.join(", ")));
    out
}

/// 토큰 사용량을 콘솔/문서 표기용 문자열로 변환한다.
pub fn format_usage(usage: &TokenUsage) -> String {
    format!(
        "prompt={}, completion={}, total={}",
        opt_num(usage.prompt_tokens),
        opt_num(usage.completion_tokens),
        opt_num(usage.total_tokens)
    )
}

fn priority_emoji(priority: Priority) -> &'static str {
    match priority {
        Priority::P2 => "🟡",
        Priority::P3 => "🔵",
    }
}

/// 메시지 줄바꿈은 category 한 줄 형식을 깨므로 공백으로 접는다.
fn single_line(message: &str) -> String {
    message.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn opt_num(value: Option<u64>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "n/a".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::finding::PostedComment;

    fn finding(category: &str, suggestion: Option<&str>) -> Finding {
        Finding {
            line: 3,
            priority: Priority::P2,
            category: category.to_string(),
            message: "리스너가 해제되지 않아\n메모리 누수 위험".to_string(),
            suggestion: suggestion.map(ToString::to_string),
        }
    }

    #[test]
    fn rendered_comment_parses_back() {
        let body = render_finding_markdown("Main.kt", &finding("메모리", Some("dispose()")));
        assert!(body.starts_with("🟡 **[P2]** 🤖 **AI 분석**"));
        assert!(body.contains("```kotlin\ndispose()\n```"));

        let parsed = PostedComment::parse(&body);
        assert_eq!(parsed.priority, Priority::P2);
        assert_eq!(parsed.category, "메모리");
        assert_eq!(parsed.message, "리스너가 해제되지 않아 메모리 누수 위험");
    }

    #[test]
    fn linter_findings_show_linter_as_source() {
        let body = render_finding_markdown("a.js", &finding("eslint", None));
        assert!(body.contains("🔧 **eslint**"));
        assert!(!body.contains("개선 제안"));
    }

    #[test]
    fn summary_lists_counts_per_source() {
        let mut summary = ReviewSummary {
            files_reviewed: 2,
            model_findings: 1,
            ..ReviewSummary::default()
        };
        summary.lint_counts.insert("ktlint".to_string(), 3);

        let body = render_summary_markdown("https://github.com/a/b/pull/1", "abc", &summary);
        assert!(body.contains("🔧 **ktlint**: 3개 이슈"));
        assert!(body.contains("🤖 **AI 분석**: 1개 이슈"));
        assert!(!body.contains("중복"));
    }

    #[test]
    fn usage_marks_unknown_fields() {
        let usage = TokenUsage {
            prompt_tokens: Some(12),
            ..TokenUsage::default()
        };
        assert_eq!(format_usage(&usage), "prompt=12, completion=n/a, total=n/a");
    }
}
