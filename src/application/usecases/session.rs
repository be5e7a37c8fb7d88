//! PR 대상 유스케이스들이 공유하는 준비 단계: 설정 로딩, 대상 파싱, 토큰 해석, VCS 생성.

use anyhow::{Context, Result, bail};

use crate::application::config::Config;
use crate::application::ports::{
    ConfigRepository, HostTokenResolver, Reporter, TargetResolver, VcsFactory, VcsGateway,
};
use crate::domain::target::ReviewTarget;

pub(crate) struct PrSession {
    pub config: Config,
    pub target: ReviewTarget,
    pub vcs: Box<dyn VcsGateway>,
    /// false면 dry-run에서 공개 API만 읽을 수 있다.
    pub has_token: bool,
}

/// 세션 준비에 필요한 포트 묶음.
pub(crate) struct SessionPorts<'a> {
    pub config_repo: &'a dyn ConfigRepository,
    pub host_token_resolver: &'a dyn HostTokenResolver,
    pub target_resolver: &'a dyn TargetResolver,
    pub vcs_factory: &'a dyn VcsFactory,
    pub reporter: &'a dyn Reporter,
}

/// dry-run이 아니면 토큰이 필수다.
pub(crate) fn open_session(ports: &SessionPorts<'_>, url: &str, dry_run: bool) -> Result<PrSession> {
    ports.reporter.section("Load Config");
    let config = ports
        .config_repo
        .load()
        .context("failed to load linepilot config")?;

    let target = ports
        .target_resolver
        .parse(url)
        .context("failed to parse target URL")?;

    let host_cfg = config.host_config(target.host());
    let token_resolution = ports
        .host_token_resolver
        .resolve(target.host(), host_cfg)
        .with_context(|| format!("failed to resolve token for host '{}'", target.host()))?;
    if let Some(source) = &token_resolution.source {
        ports.reporter.kv("Token", source);
    }

    let has_token = token_resolution.token.is_some();
    if !dry_run && !has_token {
        bail!(
            "missing VCS token for host '{}'. Configure hosts.{}.token or hosts.{}.token_env in config, or use --dry-run",
            target.host(),
            target.host(),
            target.host(),
        );
    }

    let vcs = ports
        .vcs_factory
        .build(&target, host_cfg, token_resolution.token);

    Ok(PrSession {
        config,
        target,
        vcs,
        has_token,
    })
}
