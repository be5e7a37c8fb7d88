//! 유스케이스 통합 테스트가 공유하는 인메모리 포트 구현.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;

use linepilot::application::config::{Config, HostConfig};
use linepilot::application::ports::{
    ConfigRepository, ConversationModel, FindingProvider, HostTokenResolution, HostTokenResolver,
    ProviderFactory, Reporter, VcsFactory, VcsGateway,
};
use linepilot::domain::conversation::{ModelReply, ReplyRequest, SummaryRequest};
use linepilot::domain::finding::Finding;
use linepilot::domain::review::{
    AnalysisRequest, ChangedFile, ExistingReviewComment, IssueComment, ProviderFindings,
    PullRequestInfo, ReviewDraft, TokenUsage,
};
use linepilot::domain::target::ReviewTarget;

pub const PR_URL: &str = "https://github.com/acme/checkmate/pull/7";
pub const HEAD_SHA: &str = "abc123";
pub const BOT: &str = "github-actions[bot]";

pub struct FakeConfigRepository {
    pub config: Config,
}

impl ConfigRepository for FakeConfigRepository {
    fn load(&self) -> Result<Config> {
        Ok(self.config.clone())
    }

    fn inspect_pretty_json(&self) -> Result<String> {
        Ok("{}".to_string())
    }
}

pub struct FakeTokens {
    pub token: Option<&'static str>,
}

impl HostTokenResolver for FakeTokens {
    fn resolve(&self, _host: &str, _host_cfg: Option<&HostConfig>) -> Result<HostTokenResolution> {
        Ok(HostTokenResolution {
            token: self.token.map(ToString::to_string),
            source: self.token.map(|_| "inline".to_string()),
        })
    }
}

/// 가짜 PR 상태와 쓰기 호출 기록.
#[derive(Default)]
pub struct VcsState {
    pub title: String,
    pub body: String,
    pub files: Vec<ChangedFile>,
    pub contents: HashMap<String, String>,
    pub comments: Vec<ExistingReviewComment>,
    pub issue_comments: Vec<IssueComment>,
    /// 삭제가 거부되는 코멘트 id
    pub undeletable: HashSet<String>,
    pub comment_listings: Mutex<usize>,
    pub content_requests: Mutex<Vec<String>>,
    pub reviews: Mutex<Vec<ReviewDraft>>,
    pub created: Mutex<Vec<String>>,
    pub updated: Mutex<Vec<(String, String)>>,
    pub deleted: Mutex<Vec<String>>,
    pub replies: Mutex<Vec<(String, String)>>,
}

pub struct FakeVcs {
    state: Arc<VcsState>,
}

#[async_trait]
impl VcsGateway for FakeVcs {
    async fn fetch_pull_request(&self) -> Result<PullRequestInfo> {
        Ok(PullRequestInfo {
            title: self.state.title.clone(),
            body: self.state.body.clone(),
            head_sha: HEAD_SHA.to_string(),
        })
    }

    async fn list_changed_files(&self) -> Result<Vec<ChangedFile>> {
        Ok(self.state.files.clone())
    }

    async fn fetch_file_content(&self, path: &str, reference: &str) -> Result<String> {
        assert_eq!(reference, HEAD_SHA);
        self.state
            .content_requests
            .lock()
            .unwrap()
            .push(path.to_string());
        self.state
            .contents
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("404 for {path}"))
    }

    async fn list_review_comments(&self) -> Result<Vec<ExistingReviewComment>> {
        *self.state.comment_listings.lock().unwrap() += 1;
        Ok(self.state.comments.clone())
    }

    async fn create_review(&self, draft: &ReviewDraft) -> Result<()> {
        self.state.reviews.lock().unwrap().push(draft.clone());
        Ok(())
    }

    async fn list_issue_comments(&self) -> Result<Vec<IssueComment>> {
        Ok(self.state.issue_comments.clone())
    }

    async fn create_issue_comment(&self, body: &str) -> Result<()> {
        self.state.created.lock().unwrap().push(body.to_string());
        Ok(())
    }

    async fn update_issue_comment(&self, id: &str, body: &str) -> Result<()> {
        self.state
            .updated
            .lock()
            .unwrap()
            .push((id.to_string(), body.to_string()));
        Ok(())
    }

    async fn delete_issue_comment(&self, id: &str) -> Result<()> {
        if self.state.undeletable.contains(id) {
            bail!("403 Resource not accessible by integration");
        }
        self.state.deleted.lock().unwrap().push(id.to_string());
        Ok(())
    }

    async fn reply_to_review_comment(&self, id: &str, body: &str) -> Result<()> {
        self.state
            .replies
            .lock()
            .unwrap()
            .push((id.to_string(), body.to_string()));
        Ok(())
    }
}

pub struct FakeVcsFactory {
    pub state: Arc<VcsState>,
}

impl VcsFactory for FakeVcsFactory {
    fn build(
        &self,
        _target: &ReviewTarget,
        _host_cfg: Option<&HostConfig>,
        _token: Option<String>,
    ) -> Box<dyn VcsGateway> {
        Box::new(FakeVcs {
            state: Arc::clone(&self.state),
        })
    }
}

/// 경로별로 고정된 finding을 돌려준다. 등록되지 않은 경로는 실패한다.
#[derive(Clone, Default)]
pub struct FakeProvider {
    pub findings: HashMap<String, Vec<Finding>>,
}

#[async_trait]
impl FindingProvider for FakeProvider {
    fn id(&self) -> &'static str {
        "fake"
    }

    fn name(&self) -> &'static str {
        "Fake"
    }

    async fn analyze(&self, request: &AnalysisRequest) -> Result<ProviderFindings> {
        let findings = self
            .findings
            .get(&request.path)
            .cloned()
            .ok_or_else(|| anyhow!("model unavailable"))?;
        Ok(ProviderFindings {
            findings,
            usage: TokenUsage {
                prompt_tokens: Some(100),
                completion_tokens: Some(20),
                total_tokens: Some(120),
            },
        })
    }
}

/// 고정 문장을 돌려주고 받은 요청을 기록한다. `answer`가 None이면 실패한다.
#[derive(Default)]
pub struct FakeConversation {
    pub answer: Option<String>,
    pub summaries: Mutex<Vec<SummaryRequest>>,
    pub replies: Mutex<Vec<ReplyRequest>>,
}

impl FakeConversation {
    pub fn answering(text: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Some(text.to_string()),
            ..Self::default()
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn respond(&self) -> Result<ModelReply> {
        let text = self
            .answer
            .clone()
            .ok_or_else(|| anyhow!("rate limited"))?;
        Ok(ModelReply {
            text,
            usage: TokenUsage {
                prompt_tokens: Some(300),
                completion_tokens: Some(80),
                total_tokens: Some(380),
            },
        })
    }
}

struct SharedConversation(Arc<FakeConversation>);

#[async_trait]
impl ConversationModel for SharedConversation {
    fn name(&self) -> &'static str {
        "Fake"
    }

    async fn summarize(&self, request: &SummaryRequest) -> Result<ModelReply> {
        self.0.summaries.lock().unwrap().push(request.clone());
        self.0.respond()
    }

    async fn reply(&self, request: &ReplyRequest) -> Result<ModelReply> {
        self.0.replies.lock().unwrap().push(request.clone());
        self.0.respond()
    }
}

#[derive(Default)]
pub struct FakeProviderFactory {
    pub provider: Option<FakeProvider>,
    pub conversation: Option<Arc<FakeConversation>>,
}

impl ProviderFactory for FakeProviderFactory {
    fn build(&self, _config: &Config) -> Vec<Box<dyn FindingProvider>> {
        self.provider
            .iter()
            .cloned()
            .map(|p| Box::new(p) as Box<dyn FindingProvider>)
            .collect()
    }

    fn build_conversation(&self, _config: &Config) -> Option<Box<dyn ConversationModel>> {
        self.conversation
            .as_ref()
            .map(|c| Box::new(SharedConversation(Arc::clone(c))) as Box<dyn ConversationModel>)
    }
}

/// `raw` 출력만 모은다.
#[derive(Default)]
pub struct CapturingReporter {
    pub raw: Mutex<Vec<String>>,
}

impl Reporter for CapturingReporter {
    fn section(&self, _name: &str) {}
    fn kv(&self, _key: &str, _value: &str) {}
    fn status(&self, _scope: &str, _message: &str) {}
    fn provider_status(&self, _provider: &str, _status: &str, _extra: Option<&str>) {}
    fn raw(&self, line: &str) {
        self.raw.lock().unwrap().push(line.to_string());
    }
}

pub fn issue_comment(id: &str, author: &str, body: &str) -> IssueComment {
    IssueComment {
        id: id.to_string(),
        author: author.to_string(),
        body: body.to_string(),
    }
}

pub fn review_comment(
    id: &str,
    author: &str,
    path: &str,
    line: Option<u32>,
    body: &str,
    in_reply_to: Option<&str>,
) -> ExistingReviewComment {
    ExistingReviewComment {
        id: id.to_string(),
        author: author.to_string(),
        path: path.to_string(),
        line,
        body: body.to_string(),
        in_reply_to: in_reply_to.map(ToString::to_string),
    }
}

/// 포트 구현 묶음. 유스케이스별 테스트가 필요한 참조를 꺼내 쓴다.
pub struct Harness {
    pub config_repo: FakeConfigRepository,
    pub tokens: FakeTokens,
    pub vcs_factory: FakeVcsFactory,
    pub provider_factory: FakeProviderFactory,
    pub reporter: CapturingReporter,
}

impl Harness {
    pub fn new(token: Option<&'static str>, state: VcsState, provider_factory: FakeProviderFactory) -> Self {
        Self {
            config_repo: FakeConfigRepository {
                config: Config::builtin(),
            },
            tokens: FakeTokens { token },
            vcs_factory: FakeVcsFactory {
                state: Arc::new(state),
            },
            provider_factory,
            reporter: CapturingReporter::default(),
        }
    }

    pub fn with_config(mut self, overlay: &str) -> Self {
        let overlay: Config = serde_json::from_str(overlay).unwrap();
        self.config_repo.config.merge_from(overlay);
        self
    }

    pub fn state(&self) -> &VcsState {
        &self.vcs_factory.state
    }
}
