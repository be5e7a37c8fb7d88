//! 적용 설정 진단(inspection) 뷰 모델.

use std::collections::BTreeMap;

use serde::Serialize;

use super::loader::LoadedConfig;
use super::resolve::{resolve_host_token, resolve_provider_api_key};
use crate::application::config::{Config, DefaultsConfig, HostConfig, ProviderConfig};

#[derive(Debug, Clone, Serialize)]
pub struct ConfigInspection {
    pub searched_paths: Vec<String>,
    pub loaded_paths: Vec<String>,
    pub defaults: DefaultsConfig,
    pub effective_defaults: EffectiveDefaults,
    pub dedupe: EffectiveDedupe,
    pub lint: EffectiveLint,
    pub conversation: EffectiveConversation,
    pub hosts: BTreeMap<String, HostInspection>,
    pub providers: BTreeMap<String, ProviderInspection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EffectiveDefaults {
    pub max_patch_bytes: usize,
    pub max_content_bytes: usize,
    pub changed_lines_only: bool,
    pub comment_language: String,
    pub system_prompt: String,
    pub bot_login: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EffectiveDedupe {
    pub enabled: bool,
    pub similarity_threshold: f64,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EffectiveLint {
    pub enabled: bool,
    pub disabled_rules: Vec<String>,
    /// None이면 저장소 린터 설정, 그것도 없으면 기본값을 쓴다.
    pub indent_size: Option<usize>,
    pub max_line_length: Option<usize>,
    pub repo_config: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConversation {
    pub summary_patch_bytes: usize,
    pub summary_max_tokens: u32,
    pub conventions_file: String,
    pub conventions_heading: String,
    pub reply_max_tokens: u32,
    pub reply_context_lines: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HostInspection {
    pub token_source: Option<String>,
    pub token_resolved: bool,
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderInspection {
    pub enabled: bool,
    pub runnable: bool,
    pub model: String,
    pub api_base: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub api_key_source: Option<String>,
    pub api_key_resolved: bool,
}

impl ConfigInspection {
    pub(crate) fn from_loaded(loaded: LoadedConfig) -> Self {
        let config = &loaded.config;
        let hosts = config
            .hosts
            .iter()
            .map(|(host, cfg)| (host.clone(), host_inspection(cfg)))
            .collect();

        let mut providers = BTreeMap::new();
        if let Some(cfg) = &config.providers.openai {
            providers.insert("openai".to_string(), ProviderInspection::from_config(cfg));
        }

        Self {
            searched_paths: display_paths(&loaded.searched_paths),
            loaded_paths: display_paths(&loaded.loaded_paths),
            defaults: config.defaults.clone(),
            effective_defaults: effective_defaults(config),
            dedupe: {
                let dedupe = config.deduplicator();
                EffectiveDedupe {
                    enabled: config.dedupe_enabled(),
                    similarity_threshold: dedupe.similarity_threshold(),
                    keywords: dedupe.keywords().to_vec(),
                }
            },
            lint: {
                let overrides = config.lint_overrides();
                EffectiveLint {
                    enabled: config.lint_enabled(),
                    disabled_rules: overrides.disabled_rules,
                    indent_size: overrides.indent_size,
                    max_line_length: overrides.max_line_length,
                    repo_config: config.lint_repo_config(),
                }
            },
            conversation: EffectiveConversation {
                summary_patch_bytes: config.summary_patch_bytes(),
                summary_max_tokens: config.summary_max_tokens(),
                conventions_file: config.conventions_file().to_string(),
                conventions_heading: config.conventions_heading().to_string(),
                reply_max_tokens: config.reply_max_tokens(),
                reply_context_lines: config.reply_context_lines(),
            },
            hosts,
            providers,
        }
    }
}

impl ProviderInspection {
    fn from_config(cfg: &ProviderConfig) -> Self {
        let enabled = cfg.is_enabled();
        let api_resolution = resolve_provider_api_key(cfg);
        let api_ready = api_resolution.credential.is_some();

        Self {
            enabled,
            runnable: enabled && api_ready,
            model: cfg.model(),
            api_base: cfg.api_base.clone(),
            max_tokens: cfg.max_tokens(),
            temperature: cfg.temperature(),
            api_key_source: api_resolution.source,
            api_key_resolved: api_ready,
        }
    }
}

fn effective_defaults(config: &Config) -> EffectiveDefaults {
    EffectiveDefaults {
        max_patch_bytes: config.max_patch_bytes(),
        max_content_bytes: config.max_content_bytes(),
        changed_lines_only: config.changed_lines_only(),
        comment_language: config.comment_language().code().to_string(),
        system_prompt: config.system_prompt(),
        bot_login: config.bot_login().to_string(),
    }
}

fn host_inspection(cfg: &HostConfig) -> HostInspection {
    let token_resolution = resolve_host_token(Some(cfg));
    HostInspection {
        token_source: token_resolution.source,
        token_resolved: token_resolution.token.is_some(),
        api_base: cfg.api_base.clone(),
    }
}

fn display_paths(paths: &[std::path::PathBuf]) -> Vec<String> {
    paths.iter().map(|p| p.display().to_string()).collect()
}
