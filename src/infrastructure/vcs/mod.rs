//! VCS 추상화 계층.
//! GitHub PR 라인 리뷰, 요약 코멘트, 답글에 필요한 호출만 공통 인터페이스로 묶는다.

pub mod github;

use anyhow::Result;
use async_trait::async_trait;

use crate::application::config::HostConfig;
use crate::domain::review::{
    ChangedFile, ExistingReviewComment, IssueComment, PullRequestInfo, ReviewDraft,
};
use crate::domain::target::ReviewTarget;

#[async_trait]
pub trait VcsProvider: Send + Sync {
    /// PR 제목/본문/HEAD SHA 조회
    async fn fetch_pull_request(&self) -> Result<PullRequestInfo>;
    /// 변경 파일과 파일별 patch 조회
    async fn list_changed_files(&self) -> Result<Vec<ChangedFile>>;
    /// 특정 ref 시점의 파일 원문 조회
    async fn fetch_file_content(&self, path: &str, reference: &str) -> Result<String>;
    /// 기존 라인 리뷰 코멘트 조회
    async fn list_review_comments(&self) -> Result<Vec<ExistingReviewComment>>;
    /// 라인 코멘트를 묶은 리뷰 생성
    async fn create_review(&self, draft: &ReviewDraft) -> Result<()>;
    /// PR 대화 탭 코멘트 조회
    async fn list_issue_comments(&self) -> Result<Vec<IssueComment>>;
    async fn create_issue_comment(&self, body: &str) -> Result<()>;
    async fn update_issue_comment(&self, id: &str, body: &str) -> Result<()>;
    async fn delete_issue_comment(&self, id: &str) -> Result<()>;
    /// 라인 리뷰 스레드 답글
    async fn reply_to_review_comment(&self, id: &str, body: &str) -> Result<()>;
}

pub fn build_vcs_client(
    target: &ReviewTarget,
    host_cfg: Option<&HostConfig>,
    token: Option<String>,
) -> Box<dyn VcsProvider> {
    let api_base = host_cfg.and_then(|h| h.api_base.clone());

    Box::new(github::GitHubClient::new(
        target.host.clone(),
        target.owner.clone(),
        target.repo.clone(),
        target.number,
        token,
        api_base,
    ))
}
