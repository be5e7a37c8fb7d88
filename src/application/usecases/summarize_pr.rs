//! `linepilot summarize`: PR 전체 요약 코멘트를 쓰고 이전 요약을 정리하는 유스케이스.

use anyhow::{Context, Result, bail};
use tracing::{debug, info, warn};

use crate::application::config::CONVERSATION_TEMPERATURE;
use crate::application::ports::{
    ConfigRepository, HostTokenResolver, MarkdownRenderer, ProviderFactory, Reporter,
    TargetResolver, VcsFactory, VcsGateway,
};
use crate::application::usecases::session::{PrSession, SessionPorts, open_session};
use crate::domain::conversation::{
    FALLBACK_CONVENTIONS, SummaryOutcome, SummaryRequest, extract_section, is_summary_comment,
    mark_summary, minimize_summary,
};
use crate::domain::review::{ChangedFile, RunOptions, truncate_utf8};

pub struct SummarizePrUseCase<'a> {
    pub config_repo: &'a dyn ConfigRepository,
    pub host_token_resolver: &'a dyn HostTokenResolver,
    pub target_resolver: &'a dyn TargetResolver,
    pub vcs_factory: &'a dyn VcsFactory,
    pub provider_factory: &'a dyn ProviderFactory,
    pub renderer: &'a dyn MarkdownRenderer,
    pub reporter: &'a dyn Reporter,
}

impl SummarizePrUseCase<'_> {
    /// 요약을 만들어 게시한다. 모델이 실패하면 아무것도 바꾸지 않고 에러를 돌려준다.
    /// dry-run이면 본문만 출력한다.
    pub async fn execute(&self, options: RunOptions) -> Result<SummaryOutcome> {
        self.reporter.section("Session");
        self.reporter.kv("Target", &options.url);
        self.reporter.kv(
            "Mode",
            if options.dry_run {
                "dry-run"
            } else {
                "post-summary"
            },
        );

        let PrSession {
            config, target, vcs, ..
        } = open_session(
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

        let Some(model) = self.provider_factory.build_conversation(&config) else {
            bail!("no runnable model provider; configure providers.openai with an API key");
        };

        self.reporter.section("Fetch Target");
        self.reporter.kv("Host", target.host());
        let pr = vcs.fetch_pull_request().await?;
        self.reporter.kv("Head SHA", &pr.head_sha);
        let files = vcs.list_changed_files().await?;
        self.reporter.kv("Files", &files.len().to_string());

        let mut outcome = SummaryOutcome {
            files_changed: files.len(),
            ..SummaryOutcome::default()
        };
        if files.is_empty() {
            self.reporter.status("Summary", "no changed files; nothing to summarize");
            return Ok(outcome);
        }

        let conventions = load_conventions(
            vcs.as_ref(),
            &pr.head_sha,
            config.conventions_file(),
            config.conventions_heading(),
        )
        .await;

        let request = SummaryRequest {
            title: pr.title,
            description: pr.body,
            conventions,
            files: clip_patches(files, config.summary_patch_bytes()),
            comment_language: config.comment_language(),
            max_tokens: config.summary_max_tokens(),
            temperature: CONVERSATION_TEMPERATURE,
        };

        self.reporter.section("Summarize");
        self.reporter.provider_status(model.name(), "running", None);
        let reply = match model.summarize(&request).await {
            Ok(reply) => reply,
            Err(err) => {
                self.reporter.provider_status(model.name(), "error", None);
                return Err(err).context("failed to generate PR summary");
            }
        };
        self.reporter.provider_status(model.name(), "done", None);
        outcome.usage.add_from(&reply.usage);

        let body = mark_summary(&reply.text);
        if options.dry_run {
            self.reporter.section("Dry Run");
            self.reporter.raw(&body);
        } else {
            self.replace_previous(vcs.as_ref(), config.bot_login(), &mut outcome)
                .await?;
            vcs.create_issue_comment(&body)
                .await
                .context("failed to post PR summary")?;
            outcome.posted = true;
            info!(url = %options.url, "summary posted");
            self.reporter.status("Summary", "posted");
        }

        self.reporter
            .kv("Token Usage", &self.renderer.format_usage(&outcome.usage));
        Ok(outcome)
    }

    /// 봇이 남긴 이전 요약을 지운다. 삭제가 막히면 `<details>`로 접는다.
    async fn replace_previous(
        &self,
        vcs: &dyn VcsGateway,
        bot_login: &str,
        outcome: &mut SummaryOutcome,
    ) -> Result<()> {
        let comments = vcs
            .list_issue_comments()
            .await
            .context("failed to list PR comments")?;

        for comment in comments
            .iter()
            .filter(|c| is_summary_comment(&c.author, &c.body, bot_login))
        {
            match vcs.delete_issue_comment(&comment.id).await {
                Ok(()) => {
                    outcome.previous_removed += 1;
                    continue;
                }
                Err(err) => {
                    warn!(id = %comment.id, error = %err, "previous summary not deleted; minimizing");
                }
            }
            match vcs
                .update_issue_comment(&comment.id, &minimize_summary(&comment.body))
                .await
            {
                Ok(()) => outcome.previous_minimized += 1,
                Err(err) => warn!(id = %comment.id, error = %err, "previous summary left as is"),
            }
        }

        if outcome.previous_removed + outcome.previous_minimized > 0 {
            self.reporter.kv(
                "Previous",
                &format!(
                    "{} deleted, {} minimized",
                    outcome.previous_removed, outcome.previous_minimized
                ),
            );
        }
        Ok(())
    }
}

/// 저장소 문서에서 팀 컨벤션 섹션을 읽는다. 없으면 일반 안내문을 쓴다.
async fn load_conventions(
    vcs: &dyn VcsGateway,
    head_sha: &str,
    file: &str,
    heading: &str,
) -> String {
    match vcs.fetch_file_content(file, head_sha).await {
        Ok(content) => match extract_section(&content, heading) {
            Some(section) => section,
            None => {
                debug!(file, heading, "conventions section not found");
                FALLBACK_CONVENTIONS.to_string()
            }
        },
        Err(err) => {
            debug!(file, error = %err, "conventions file unavailable");
            FALLBACK_CONVENTIONS.to_string()
        }
    }
}

fn clip_patches(files: Vec<ChangedFile>, max_bytes: usize) -> Vec<ChangedFile> {
    files
        .into_iter()
        .map(|mut file| {
            file.patch = file.patch.map(|p| truncate_utf8(&p, max_bytes));
            file
        })
        .collect()
}
