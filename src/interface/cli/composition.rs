//! 애플리케이션 조립(composition root) 모듈.

use crate::application::usecases::inspect_config::InspectConfigUseCase;
use crate::application::usecases::map_patch::MapPatchUseCase;
use crate::application::usecases::reply_comment::ReplyToCommentUseCase;
use crate::application::usecases::review_lines::ReviewLinesUseCase;
use crate::application::usecases::summarize_pr::SummarizePrUseCase;
use crate::infrastructure::adapters::{
    ConsoleReporter, HostTokenResolverAdapter, JsonConfigRepository, MarkdownRendererAdapter,
    ProviderFactoryAdapter, UrlTargetResolver, VcsFactoryAdapter,
};

/// 실행 시점 의존성을 한 곳에서 조립하는 컨테이너.
pub struct AppComposition {
    config_repo: JsonConfigRepository,
    host_token_resolver: HostTokenResolverAdapter,
    target_resolver: UrlTargetResolver,
    vcs_factory: VcsFactoryAdapter,
    provider_factory: ProviderFactoryAdapter,
    renderer: MarkdownRendererAdapter,
    reporter: ConsoleReporter,
}

impl Default for AppComposition {
    fn default() -> Self {
        Self {
            config_repo: JsonConfigRepository,
            host_token_resolver: HostTokenResolverAdapter,
            target_resolver: UrlTargetResolver,
            vcs_factory: VcsFactoryAdapter,
            provider_factory: ProviderFactoryAdapter,
            renderer: MarkdownRendererAdapter,
            reporter: ConsoleReporter::new(),
        }
    }
}

impl AppComposition {
    /// 설정 점검 유스케이스를 생성한다.
    pub fn inspect_config_usecase(&self) -> InspectConfigUseCase<'_> {
        InspectConfigUseCase {
            config_repo: &self.config_repo,
        }
    }

    pub fn map_patch_usecase(&self) -> MapPatchUseCase {
        MapPatchUseCase
    }

    /// 리뷰 실행 유스케이스를 생성한다.
    pub fn review_usecase(&self) -> ReviewLinesUseCase<'_> {
        ReviewLinesUseCase {
            config_repo: &self.config_repo,
            host_token_resolver: &self.host_token_resolver,
            target_resolver: &self.target_resolver,
            vcs_factory: &self.vcs_factory,
            provider_factory: &self.provider_factory,
            renderer: &self.renderer,
            reporter: &self.reporter,
        }
    }

    pub fn summarize_usecase(&self) -> SummarizePrUseCase<'_> {
        SummarizePrUseCase {
            config_repo: &self.config_repo,
            host_token_resolver: &self.host_token_resolver,
            target_resolver: &self.target_resolver,
            vcs_factory: &self.vcs_factory,
            provider_factory: &self.provider_factory,
            renderer: &self.renderer,
            reporter: &self.reporter,
        }
    }

    pub fn reply_usecase(&self) -> ReplyToCommentUseCase<'_> {
        ReplyToCommentUseCase {
            config_repo: &self.config_repo,
            host_token_resolver: &self.host_token_resolver,
            target_resolver: &self.target_resolver,
            vcs_factory: &self.vcs_factory,
            provider_factory: &self.provider_factory,
            renderer: &self.renderer,
            reporter: &self.reporter,
        }
    }
}
