//! 애플리케이션 계층이 의존하는 포트(추상 인터페이스) 모음.

use anyhow::Result;
use async_trait::async_trait;

use crate::application::config::{Config, HostConfig};
use crate::domain::conversation::{ModelReply, ReplyRequest, SummaryRequest};
use crate::domain::finding::Finding;
use crate::domain::review::{
    AnalysisRequest, ChangedFile, ExistingReviewComment, IssueComment, ProviderFindings,
    PullRequestInfo, ReviewDraft, ReviewSummary, TokenUsage,
};
use crate::domain::target::ReviewTarget;

/// 설정 로딩/점검을 담당하는 저장소 포트.
pub trait ConfigRepository: Send + Sync {
    fn load(&self) -> Result<Config>;
    fn inspect_pretty_json(&self) -> Result<String>;
}

/// URL 입력값을 도메인 대상 식별자로 변환하는 포트.
pub trait TargetResolver: Send + Sync {
    fn parse(&self, input: &str) -> Result<ReviewTarget>;
}

/// 호스트 토큰 해석 결과. `source`는 진단용 라벨(inline, env:NAME).
#[derive(Debug, Clone, Default)]
pub struct HostTokenResolution {
    pub token: Option<String>,
    pub source: Option<String>,
}

/// 호스트 설정에서 런타임 토큰을 해석하는 포트.
pub trait HostTokenResolver: Send + Sync {
    fn resolve(&self, host: &str, host_cfg: Option<&HostConfig>) -> Result<HostTokenResolution>;
}

/// GitHub PR 연동 추상화 포트.
#[async_trait]
pub trait VcsGateway: Send + Sync {
    async fn fetch_pull_request(&self) -> Result<PullRequestInfo>;
    async fn list_changed_files(&self) -> Result<Vec<ChangedFile>>;
    async fn fetch_file_content(&self, path: &str, reference: &str) -> Result<String>;
    async fn list_review_comments(&self) -> Result<Vec<ExistingReviewComment>>;
    async fn create_review(&self, draft: &ReviewDraft) -> Result<()>;
    async fn list_issue_comments(&self) -> Result<Vec<IssueComment>>;
    async fn create_issue_comment(&self, body: &str) -> Result<()>;
    async fn update_issue_comment(&self, id: &str, body: &str) -> Result<()>;
    async fn delete_issue_comment(&self, id: &str) -> Result<()>;
    /// 라인 리뷰 스레드에 답글을 단다. `id`는 스레드 첫 코멘트여야 한다.
    async fn reply_to_review_comment(&self, id: &str, body: &str) -> Result<()>;
}

/// 대상/호스트 설정에 맞는 VCS 게이트웨이를 생성하는 팩토리 포트.
pub trait VcsFactory: Send + Sync {
    fn build(
        &self,
        target: &ReviewTarget,
        host_cfg: Option<&HostConfig>,
        token: Option<String>,
    ) -> Box<dyn VcsGateway>;
}

/// 파일 단위로 finding을 만들어내는 분석 제공자 포트.
#[async_trait]
pub trait FindingProvider: Send + Sync {
    fn id(&self) -> &'static str;
    fn name(&self) -> &'static str;
    async fn analyze(&self, request: &AnalysisRequest) -> Result<ProviderFindings>;
}

/// PR 요약과 코멘트 답글처럼 자유 형식 문장을 쓰는 모델 포트.
#[async_trait]
pub trait ConversationModel: Send + Sync {
    fn name(&self) -> &'static str;
    async fn summarize(&self, request: &SummaryRequest) -> Result<ModelReply>;
    async fn reply(&self, request: &ReplyRequest) -> Result<ModelReply>;
}

/// 활성화된 제공자 목록을 구성하는 팩토리 포트.
pub trait ProviderFactory: Send + Sync {
    fn build(&self, config: &Config) -> Vec<Box<dyn FindingProvider>>;
    /// 실행 가능한 대화 모델이 없으면 None.
    fn build_conversation(&self, config: &Config) -> Option<Box<dyn ConversationModel>>;
}

/// 리뷰 마크다운 렌더링 포트.
pub trait MarkdownRenderer: Send + Sync {
    fn render_finding(&self, path: &str, finding: &Finding) -> String;
    fn render_summary(&self, target_url: &str, sha: &str, summary: &ReviewSummary) -> String;
    fn format_usage(&self, usage: &TokenUsage) -> String;
}

/// 콘솔/로그 출력 추상화 포트.
pub trait Reporter: Send + Sync {
    fn section(&self, name: &str);
    fn kv(&self, key: &str, value: &str);
    fn status(&self, scope: &str, message: &str);
    fn provider_status(&self, provider: &str, status: &str, extra: Option<&str>);
    fn raw(&self, line: &str);
}
