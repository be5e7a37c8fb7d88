//! PR 라인 리뷰 실행의 전체 오케스트레이션 유스케이스.

mod analyze;
mod context;
mod dedupe;
mod publish;

use anyhow::Result;

use crate::application::ports::{
    ConfigRepository, HostTokenResolver, MarkdownRenderer, ProviderFactory, Reporter,
    TargetResolver, VcsFactory,
};
use crate::application::usecases::session::SessionPorts;
use crate::domain::review::{ReviewSummary, RunOptions};

use analyze::{analyze_changed_files, build_enabled_providers};
use context::load_execution_context;
use dedupe::drop_already_posted;
use publish::publish_review;

/// URL 입력부터 파일별 분석, 중복 제거, 라인 코멘트 게시까지 전체 흐름을 조율한다.
pub struct ReviewLinesUseCase<'a> {
    pub config_repo: &'a dyn ConfigRepository,
    pub host_token_resolver: &'a dyn HostTokenResolver,
    pub target_resolver: &'a dyn TargetResolver,
    pub vcs_factory: &'a dyn VcsFactory,
    pub provider_factory: &'a dyn ProviderFactory,
    pub renderer: &'a dyn MarkdownRenderer,
    pub reporter: &'a dyn Reporter,
}

impl<'a> ReviewLinesUseCase<'a> {
    fn session_ports(&self) -> SessionPorts<'a> {
        SessionPorts {
            config_repo: self.config_repo,
            host_token_resolver: self.host_token_resolver,
            target_resolver: self.target_resolver,
            vcs_factory: self.vcs_factory,
            reporter: self.reporter,
        }
    }

    /// 리뷰 본 실행 진입점.
    /// dry-run이면 게시하지 않고 리뷰 초안만 출력한다.
    pub async fn execute(&self, options: RunOptions) -> Result<ReviewSummary> {
        self.reporter.section("Session");
        self.reporter.kv("Target", &options.url);
        self.reporter.kv(
            "Mode",
            if options.dry_run {
                "dry-run"
            } else {
                "post-review"
            },
        );

        let ctx = load_execution_context(self, &options).await?;
        let providers = build_enabled_providers(self, &ctx);

        let outcome = analyze_changed_files(self, &ctx, &providers).await;
        let (findings, duplicates_skipped) = drop_already_posted(self, &ctx, outcome.findings);

        let summary = ReviewSummary {
            files_reviewed: outcome.files_reviewed,
            duplicates_skipped,
            usage: outcome.usage,
            ..ReviewSummary::default()
        };

        let summary =
            publish_review(self, &options, &ctx, &findings, &outcome.mappings, summary).await?;
        self.reporter
            .kv("Token Usage", &self.renderer.format_usage(&summary.usage));
        Ok(summary)
    }
}
