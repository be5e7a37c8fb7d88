//! 이미 게시된 라인 코멘트와 겹치는 finding 제거 단계.

use crate::application::usecases::review_lines::{ReviewLinesUseCase, context::ExecutionContext};
use crate::domain::review::FileFindings;

/// 중복 finding을 제거하고 (남은 finding, 제거된 개수)를 반환한다.
pub(super) fn drop_already_posted(
    use_case: &ReviewLinesUseCase<'_>,
    ctx: &ExecutionContext,
    findings: FileFindings,
) -> (FileFindings, usize) {
    if !ctx.config.dedupe_enabled() || ctx.posted.is_empty() {
        return (findings, 0);
    }

    use_case.reporter.section("Dedupe");
    let before = count(&findings);
    let kept = ctx
        .config
        .deduplicator()
        .filter_duplicates(findings, &ctx.posted);
    let skipped = before - count(&kept);

    use_case.reporter.kv("Skipped", &skipped.to_string());
    (kept, skipped)
}

fn count(findings: &FileFindings) -> usize {
    findings.values().map(Vec::len).sum()
}
