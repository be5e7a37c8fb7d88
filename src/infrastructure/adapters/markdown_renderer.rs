//! 마크다운 렌더링 포트 구현 어댑터.

use crate::application::ports::MarkdownRenderer;
use crate::domain::finding::Finding;
use crate::domain::review::{ReviewSummary, TokenUsage};
use crate::infrastructure::render;

/// 마크다운 렌더링 어댑터.
pub struct MarkdownRendererAdapter;

impl MarkdownRenderer for MarkdownRendererAdapter {
    fn render_finding(&self, path: &str, finding: &Finding) -> String {
        render::render_finding_markdown(path, finding)
    }

    fn render_summary(&self, target_url: &str, sha: &str, summary: &ReviewSummary) -> String {
        render::render_summary_markdown(target_url, sha, summary)
    }

    fn format_usage(&self, usage: &TokenUsage) -> String {
        render::format_usage(usage)
    }
}
