//! 리뷰 실행 컨텍스트(설정/대상/VCS 상태) 준비 단계.

use std::collections::HashMap;

use anyhow::Result;
use tracing::debug;

use crate::application::config::Config;
use crate::application::ports::VcsGateway;
use crate::application::usecases::review_lines::ReviewLinesUseCase;
use crate::application::usecases::session::{PrSession, open_session};
use crate::domain::dedupe::index_posted_comments;
use crate::domain::finding::PostedComment;
use crate::domain::review::{ChangedFile, RunOptions};
use crate::domain::target::ReviewTarget;

/// 리뷰 유스케이스 전 구간에서 공유되는 실행 상태.
pub(super) struct ExecutionContext {
    pub config: Config,
    pub target: ReviewTarget,
    pub vcs: Box<dyn VcsGateway>,
    pub head_sha: String,
    pub changed_files: Vec<ChangedFile>,
    /// `file:line` -> 이미 게시된 코멘트. 실행 1회 동안만 유효하다.
    pub posted: HashMap<String, PostedComment>,
}

/// 설정 로딩, 대상 파싱, HEAD SHA/변경 파일/기존 코멘트 조회까지 선행한다.
pub(super) async fn load_execution_context(
    use_case: &ReviewLinesUseCase<'_>,
    options: &RunOptions,
) -> Result<ExecutionContext> {
    let PrSession {
        config,
        target,
        vcs,
        has_token,
    } = open_session(&use_case.session_ports(), &options.url, options.dry_run)?;

    use_case.reporter.section("Fetch Target");
    use_case.reporter.kv("Host", target.host());
    use_case.reporter.status("VCS", "fetching head SHA");
    let head_sha = vcs.fetch_pull_request().await?.head_sha;
    use_case.reporter.kv("Head SHA", &head_sha);

    use_case.reporter.status("VCS", "listing changed files");
    let changed_files = vcs.list_changed_files().await?;
    use_case
        .reporter
        .kv("Files", &changed_files.len().to_string());

    let posted = if options.dry_run && !has_token {
        debug!("dry-run without token; existing review comments are not fetched");
        HashMap::new()
    } else {
        let comments = vcs.list_review_comments().await?;
        let index = index_posted_comments(
            comments
                .iter()
                .filter_map(|c| c.line.map(|line| (c.path.as_str(), line, c.body.as_str()))),
        );
        use_case
            .reporter
            .kv("Posted", &index.len().to_string());
        index
    };

    Ok(ExecutionContext {
        config,
        target,
        vcs,
        head_sha,
        changed_files,
        posted,
    })
}
