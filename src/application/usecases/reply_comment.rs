//! `linepilot reply`: AI 코멘트에 달린 질문/의견에 답글을 다는 유스케이스.

use anyhow::{Context, Result, bail};
use tracing::{debug, info, warn};

use crate::application::config::{CONVERSATION_TEMPERATURE, Config};
use crate::application::ports::{
    ConfigRepository, HostTokenResolver, MarkdownRenderer, ProviderFactory, Reporter,
    TargetResolver, VcsFactory, VcsGateway,
};
use crate::application::usecases::session::{PrSession, SessionPorts, open_session};
use crate::domain::conversation::{
    ModelReply, ReplyOptions, ReplyOutcome, ReplyRequest, fallback_reply,
    find_parent_ai_comment, first_code_block, is_ai_generated, reply_body, should_respond,
    surrounding_lines,
};
use crate::domain::finding::PostedComment;
use crate::domain::review::{AuthoredComment, ExistingReviewComment, IssueComment, truncate_utf8};

/// 답글 프롬프트용 diff 발췌 최대 바이트.
const DIFF_EXCERPT_BYTES: usize = 1000;

pub struct ReplyToCommentUseCase<'a> {
    pub config_repo: &'a dyn ConfigRepository,
    pub host_token_resolver: &'a dyn HostTokenResolver,
    pub target_resolver: &'a dyn TargetResolver,
    pub vcs_factory: &'a dyn VcsFactory,
    pub provider_factory: &'a dyn ProviderFactory,
    pub renderer: &'a dyn MarkdownRenderer,
    pub reporter: &'a dyn Reporter,
}

/// 답할 코멘트가 있는 위치.
enum Thread {
    /// 라인 리뷰 스레드. 답글은 스레드 첫 코멘트에 단다.
    Review {
        trigger: ExistingReviewComment,
        parent: ExistingReviewComment,
    },
    /// PR 대화 탭
    Conversation {
        trigger: IssueComment,
        parent: IssueComment,
    },
}

impl Thread {
    fn trigger(&self) -> &dyn AuthoredComment {
        match self {
            Self::Review { trigger, .. } => trigger,
            Self::Conversation { trigger, .. } => trigger,
        }
    }

    fn parent(&self) -> &dyn AuthoredComment {
        match self {
            Self::Review { parent, .. } => parent,
            Self::Conversation { parent, .. } => parent,
        }
    }
}

impl ReplyToCommentUseCase<'_> {
    /// 봇 코멘트, 짧은 반응, AI 코멘트가 없는 대화에는 답하지 않는다.
    /// 모델이 실패하면 사과 답글을 남긴다.
    pub async fn execute(&self, options: ReplyOptions) -> Result<ReplyOutcome> {
        self.reporter.section("Session");
        self.reporter.kv("Target", &options.url);
        self.reporter.kv("Comment", &options.comment_id);

        let PrSession { config, vcs, .. } = open_session(
            &SessionPorts {
                config_repo: self.config_repo,
                host_token_resolver: self.host_token_resolver,
                target_resolver: self.target_resolver,
                vcs_factory: self.vcs_factory,
                reporter: self.reporter,
            },
            &options.url,
            options.dry_run,
        )?;
        let bot_login = config.bot_login();

        self.reporter.section("Conversation");
        let review_comments = vcs
            .list_review_comments()
            .await
            .context("failed to list review comments")?;

        let thread = if let Some(trigger) = review_comments
            .iter()
            .find(|c| c.id == options.comment_id)
        {
            if let Some(outcome) = self.screen(trigger, bot_login) {
                return Ok(outcome);
            }
            let parent = find_parent_ai_comment(
                &review_comments,
                &trigger.id,
                trigger.in_reply_to.as_deref(),
                bot_login,
            );
            parent.map(|parent| Thread::Review {
                trigger: trigger.clone(),
                parent: parent.clone(),
            })
        } else {
            let issue_comments = vcs
                .list_issue_comments()
                .await
                .context("failed to list PR comments")?;
            let Some(trigger) = issue_comments.iter().find(|c| c.id == options.comment_id) else {
                bail!("comment {} not found on {}", options.comment_id, options.url);
            };
            if let Some(outcome) = self.screen(trigger, bot_login) {
                return Ok(outcome);
            }
            find_parent_ai_comment(&issue_comments, &trigger.id, None, bot_login).map(|parent| {
                Thread::Conversation {
                    trigger: trigger.clone(),
                    parent: parent.clone(),
                }
            })
        };

        let Some(thread) = thread else {
            self.reporter.status("Reply", "no AI comment in this conversation");
            return Ok(ReplyOutcome::NoParent);
        };
        self.reporter.kv("Parent", thread.parent().id());

        let Some(model) = self.provider_factory.build_conversation(&config) else {
            bail!("no runnable model provider; configure providers.openai with an API key");
        };

        let request = self.build_request(&config, vcs.as_ref(), &thread).await;

        self.reporter.provider_status(model.name(), "running", None);
        let (text, fallback) = match model.reply(&request).await {
            Ok(ModelReply { text, usage }) => {
                self.reporter.provider_status(model.name(), "done", None);
                self.reporter
                    .kv("Token Usage", &self.renderer.format_usage(&usage));
                (text, false)
            }
            Err(err) => {
                warn!(error = %err, "reply generation failed; posting fallback");
                self.reporter.provider_status(model.name(), "error", None);
                (fallback_reply(&request.author, request.comment_language), true)
            }
        };

        let body = reply_body(&text);
        if options.dry_run {
            self.reporter.section("Dry Run");
            self.reporter.raw(&body);
            return Ok(ReplyOutcome::Replied { fallback });
        }

        match &thread {
            Thread::Review { trigger, .. } => {
                let root = trigger.in_reply_to.as_deref().unwrap_or(trigger.id.as_str());
                vcs.reply_to_review_comment(root, &body)
                    .await
                    .context("failed to post review reply")?;
            }
            Thread::Conversation { .. } => {
                vcs.create_issue_comment(&body)
                    .await
                    .context("failed to post reply comment")?;
            }
        }
        info!(comment = %options.comment_id, fallback, "reply posted");
        self.reporter.status("Reply", "posted");
        Ok(ReplyOutcome::Replied { fallback })
    }

    /// 답하지 않을 코멘트면 그 결과를 돌려준다.
    fn screen(&self, trigger: &dyn AuthoredComment, bot_login: &str) -> Option<ReplyOutcome> {
        if is_ai_generated(trigger.author(), trigger.body(), bot_login) {
            self.reporter.status("Reply", "comment was written by the bot");
            return Some(ReplyOutcome::Ignored("bot comment"));
        }
        if !should_respond(trigger.body()) {
            self.reporter.status("Reply", "comment needs no reply");
            return Some(ReplyOutcome::Ignored("acknowledgement"));
        }
        None
    }

    /// 라인 리뷰 스레드면 주변 코드와 diff 발췌를 붙인다. 조회 실패는 컨텍스트 없이 진행한다.
    async fn build_request(
        &self,
        config: &Config,
        vcs: &dyn VcsGateway,
        thread: &Thread,
    ) -> ReplyRequest {
        let trigger = thread.trigger();
        let parent_body = thread.parent().body().to_string();
        let parent = PostedComment::parse(&parent_body);

        let mut request = ReplyRequest {
            author: trigger.author().to_string(),
            question: trigger.body().to_string(),
            suggested_code: first_code_block(&parent_body),
            parent: (parent != PostedComment::default()).then_some(parent),
            parent_body,
            path: None,
            line: None,
            surrounding_code: None,
            diff_excerpt: None,
            comment_language: config.comment_language(),
            max_tokens: config.reply_max_tokens(),
            temperature: CONVERSATION_TEMPERATURE,
        };

        let Thread::Review { parent, .. } = thread else {
            return request;
        };
        request.path = Some(parent.path.clone());
        request.line = parent.line;

        if let Some(line) = parent.line {
            match vcs.fetch_pull_request().await {
                Ok(pr) => match vcs.fetch_file_content(&parent.path, &pr.head_sha).await {
                    Ok(content) => {
                        request.surrounding_code =
                            surrounding_lines(&content, line, config.reply_context_lines());
                    }
                    Err(err) => debug!(path = %parent.path, error = %err, "file content unavailable"),
                },
                Err(err) => debug!(error = %err, "PR metadata unavailable"),
            }
        }

        match vcs.list_changed_files().await {
            Ok(files) => {
                request.diff_excerpt = files
                    .into_iter()
                    .find(|f| f.path == parent.path)
                    .and_then(|f| f.patch)
                    .map(|patch| truncate_utf8(&patch, DIFF_EXCERPT_BYTES));
            }
            Err(err) => debug!(error = %err, "changed files unavailable"),
        }
        request
    }
}
