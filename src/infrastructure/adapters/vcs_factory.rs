//! VCS 게이트웨이 포트 구현 어댑터.

use anyhow::Result;
use async_trait::async_trait;

use crate::application::config::HostConfig;
use crate::application::ports::{VcsFactory, VcsGateway};
use crate::domain::review::{
    ChangedFile, ExistingReviewComment, IssueComment, PullRequestInfo, ReviewDraft,
};
use crate::domain::target::ReviewTarget;
use crate::infrastructure::vcs;

/// VCS 게이트웨이 팩토리 어댑터.
pub struct VcsFactoryAdapter;

impl VcsFactory for VcsFactoryAdapter {
    fn build(
        &self,
        target: &ReviewTarget,
        host_cfg: Option<&HostConfig>,
        token: Option<String>,
    ) -> Box<dyn VcsGateway> {
        Box::new(VcsGatewayAdapter {
            inner: vcs::build_vcs_client(target, host_cfg, token),
        })
    }
}

/// 인프라 VCS Provider를 애플리케이션 포트로 감싸는 래퍼.
struct VcsGatewayAdapter {
    inner: Box<dyn vcs::VcsProvider>,
}

#[async_trait]
impl VcsGateway for VcsGatewayAdapter {
    async fn fetch_pull_request(&self) -> Result<PullRequestInfo> {
        self.inner.fetch_pull_request().await
    }

    async fn list_changed_files(&self) -> Result<Vec<ChangedFile>> {
        self.inner.list_changed_files().await
    }

    async fn fetch_file_content(&self, path: &str, reference: &str) -> Result<String> {
        self.inner.fetch_file_content(path, reference).await
    }

    async fn list_review_comments(&self) -> Result<Vec<ExistingReviewComment>> {
        self.inner.list_review_comments().await
    }

    async fn create_review(&self, draft: &ReviewDraft) -> Result<()> {
        self.inner.create_review(draft).await
    }

    async fn list_issue_comments(&self) -> Result<Vec<IssueComment>> {
        self.inner.list_issue_comments().await
    }

    async fn create_issue_comment(&self, body: &str) -> Result<()> {
        self.inner.create_issue_comment(body).await
    }

    async fn update_issue_comment(&self, id: &str, body: &str) -> Result<()> {
        self.inner.update_issue_comment(id, body).await
    }

    async fn delete_issue_comment(&self, id: &str) -> Result<()> {
        self.inner.delete_issue_comment(id).await
    }

    async fn reply_to_review_comment(&self, id: &str, body: &str) -> Result<()> {
        self.inner.reply_to_review_comment(id, body).await
    }
}
