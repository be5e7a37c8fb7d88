//! 설정 값(token/env)을 실제 런타임 값으로 해석하는 유틸리티.
//!
//! - 환경변수 조회는 인프라 계층에서만 수행한다.

use std::env;

use crate::application::config::{HostConfig, ProviderConfig};
use crate::application::ports::HostTokenResolution;

/// Provider(API key) 해석 결과.
#[derive(Debug, Clone)]
pub struct ProviderCredentialResolution {
    pub credential: Option<String>,
    pub source: Option<String>,
}

/// Host(VCS) 토큰을 해석한다. `token` 우선, 없으면 `token_env`.
pub fn resolve_host_token(host_cfg: Option<&HostConfig>) -> HostTokenResolution {
    let Some(cfg) = host_cfg else {
        return HostTokenResolution::default();
    };

    let (token, source) = resolve_secret(cfg.token.as_deref(), cfg.token_env.as_deref());
    HostTokenResolution { token, source }
}

/// Provider API key를 해석한다.
pub fn resolve_provider_api_key(cfg: &ProviderConfig) -> ProviderCredentialResolution {
    let (credential, source) = resolve_secret(cfg.api_key.as_deref(), cfg.api_key_env.as_deref());
    ProviderCredentialResolution { credential, source }
}

/// (값, 출처 라벨). 출처 라벨은 inline, env:NAME, env:NAME (missing) 중 하나다.
fn resolve_secret(
    inline: Option<&str>,
    env_name: Option<&str>,
) -> (Option<String>, Option<String>) {
    if let Some(value) = inline.map(str::trim).filter(|v| !v.is_empty()) {
        return (Some(value.to_string()), Some("inline".to_string()));
    }

    let Some(env_name) = env_name.map(str::trim).filter(|v| !v.is_empty()) else {
        return (None, None);
    };

    match env::var(env_name).ok().map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => (Some(v), Some(format!("env:{env_name}"))),
        _ => (None, Some(format!("env:{env_name} (missing)"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_token_wins_over_env() {
        let cfg = HostConfig {
            token: Some(" abc ".to_string()),
            token_env: Some("LINEPILOT_TEST_UNUSED_TOKEN".to_string()),
            api_base: None,
        };
        let resolved = resolve_host_token(Some(&cfg));
        assert_eq!(resolved.token.as_deref(), Some("abc"));
        assert_eq!(resolved.source.as_deref(), Some("inline"));
    }

    #[test]
    fn missing_env_is_reported_in_source() {
        let cfg = ProviderConfig {
            api_key_env: Some("LINEPILOT_TEST_SURELY_UNSET_KEY".to_string()),
            ..ProviderConfig::default()
        };
        let resolved = resolve_provider_api_key(&cfg);
        assert!(resolved.credential.is_none());
        assert_eq!(
            resolved.source.as_deref(),
            Some("env:LINEPILOT_TEST_SURELY_UNSET_KEY (missing)")
        );
    }

    #[test]
    fn absent_host_config_resolves_to_nothing() {
        let resolved = resolve_host_token(None);
        assert!(resolved.token.is_none());
        assert!(resolved.source.is_none());
    }
}
