//! 라인 코멘트 렌더링 및 리뷰 게시 단계.

use std::collections::HashMap;

use anyhow::Result;
use tracing::info;

use crate::application::usecases::review_lines::{ReviewLinesUseCase, context::ExecutionContext};
use crate::domain::diff::LineMapping;
use crate::domain::lint::is_linter_category;
use crate::domain::policy::place_inline_comments;
use crate::domain::review::{FileFindings, ReviewDraft, ReviewSummary, RunOptions};

/// 남은 finding을 diff position 코멘트로 묶어 출력(dry-run)하거나 리뷰 하나로 게시한다.
pub(super) async fn publish_review(
    use_case: &ReviewLinesUseCase<'_>,
    options: &RunOptions,
    ctx: &ExecutionContext,
    findings: &FileFindings,
    mappings: &HashMap<String, LineMapping>,
    mut summary: ReviewSummary,
) -> Result<ReviewSummary> {
    let mut comments = Vec::new();
    for (path, items) in findings {
        let Some(mapping) = mappings.get(path) else {
            continue;
        };
        for finding in items {
            if is_linter_category(&finding.category) {
                *summary
                    .lint_counts
                    .entry(finding.category.clone())
                    .or_default() += 1;
            } else {
                summary.model_findings += 1;
            }
        }
        comments.extend(place_inline_comments(path, items, mapping, |f| {
            use_case.renderer.render_finding(path, f)
        }));
    }

    if comments.is_empty() {
        use_case.reporter.section("Done");
        use_case
            .reporter
            .status("Review", "no new findings; nothing to post");
        return Ok(summary);
    }

    let draft = ReviewDraft {
        commit_id: ctx.head_sha.clone(),
        body: use_case
            .renderer
            .render_summary(ctx.target.url(), &ctx.head_sha, &summary),
        comments,
    };

    if options.dry_run {
        use_case.reporter.section("Dry Run: Review");
        use_case.reporter.raw(&draft.body);
        for comment in &draft.comments {
            use_case.reporter.raw(&format!(
                "--- {}:{} (position {}) ---",
                comment.path, comment.line, comment.position
            ));
            use_case.reporter.raw(&comment.body);
        }
        return Ok(summary);
    }

    use_case.reporter.section("Post Review");
    ctx.vcs.create_review(&draft).await?;
    info!(comments = draft.comments.len(), "review posted");
    use_case.reporter.section("Done");
    use_case.reporter.status(
        "VCS",
        &format!("review posted with {} line comments", draft.comments.len()),
    );
    Ok(summary)
}
