//! 애플리케이션이 사용하는 설정 스키마(순수 데이터).
//!
//! 주의: 파일/환경변수 접근은 `infrastructure`에서만 수행한다.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::dedupe::{
    DEFAULT_DUPLICATE_KEYWORDS, DEFAULT_SIMILARITY_THRESHOLD, FindingDeduplicator,
};
use crate::domain::conversation::DEFAULT_BOT_LOGIN;
use crate::domain::lint::LintOverrides;
use crate::domain::review::CommentLanguage;
use crate::domain::target::DEFAULT_GITHUB_HOST;

pub const DEFAULT_MAX_PATCH_BYTES: usize = 1500;
pub const DEFAULT_MAX_CONTENT_BYTES: usize = 2000;
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TOKENS: u32 = 1200;
pub const DEFAULT_TEMPERATURE: f32 = 0.1;
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a senior code reviewer. Report only concrete problems on added lines. \
Answer with a JSON array of objects with keys line, priority (P2 or P3), category, message, suggestion.";
pub const DEFAULT_SUMMARY_PATCH_BYTES: usize = 3000;
pub const DEFAULT_SUMMARY_MAX_TOKENS: u32 = 2500;
pub const DEFAULT_REPLY_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_REPLY_CONTEXT_LINES: usize = 5;
/// 요약/답글은 리뷰보다 자유로운 문장을 쓰도록 온도를 높인다.
pub const CONVERSATION_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_CONVENTIONS_FILE: &str = "README.md";
pub const DEFAULT_CONVENTIONS_HEADING: &str = "AI 리뷰 가이드라인";

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// 전역 기본값
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// 중복 코멘트 판정 설정
    #[serde(default)]
    pub dedupe: DedupeConfig,
    /// 정규식 정적 검사 설정
    #[serde(default)]
    pub lint: LintConfig,
    /// `linepilot summarize` 설정
    #[serde(default)]
    pub summary: SummaryConfig,
    /// `linepilot reply` 설정
    #[serde(default)]
    pub reply: ReplyConfig,
    /// VCS 호스트별 인증/엔드포인트 설정
    #[serde(default)]
    pub hosts: HashMap<String, HostConfig>,
    /// provider 실행 설정
    #[serde(default)]
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DefaultsConfig {
    /// 프롬프트에 넣을 patch 최대 바이트
    pub max_patch_bytes: Option<usize>,
    /// 프롬프트에 넣을 파일 본문 최대 바이트
    pub max_content_bytes: Option<usize>,
    /// 추가된 라인에만 코멘트할지 여부(기본 true)
    pub changed_lines_only: Option<bool>,
    /// 리뷰 코멘트 출력 언어(ko/en)
    pub comment_language: Option<String>,
    pub system_prompt: Option<String>,
    /// 봇이 쓴 코멘트를 알아보는 로그인(기본 "github-actions[bot]")
    pub bot_login: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DedupeConfig {
    pub enabled: Option<bool>,
    pub keywords: Option<Vec<String>>,
    pub similarity_threshold: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct LintConfig {
    pub enabled: Option<bool>,
    /// 끌 규칙 이름(예: "indent", "no-console")
    pub disabled_rules: Option<Vec<String>>,
    /// 저장소 린터 설정보다 우선한다.
    pub indent_size: Option<usize>,
    pub max_line_length: Option<usize>,
    /// 저장소의 .editorconfig/.swiftlint.yml/ESLint 설정을 읽을지 여부(기본 true)
    pub repo_config: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct SummaryConfig {
    /// 파일별 patch 최대 바이트
    pub max_patch_bytes: Option<usize>,
    pub max_tokens: Option<u32>,
    /// 팀 컨벤션을 읽을 저장소 파일
    pub conventions_file: Option<String>,
    /// 그 파일에서 읽을 `##` 섹션 제목
    pub conventions_heading: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ReplyConfig {
    pub max_tokens: Option<u32>,
    /// 코멘트 라인 앞뒤로 보여줄 줄 수
    pub context_lines: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct HostConfig {
    /// 고정 토큰(민감정보: 권장하지 않음)
    pub token: Option<String>,
    /// 토큰을 읽을 환경변수 이름
    pub token_env: Option<String>,
    /// API base URL override(선택)
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ProvidersConfig {
    pub openai: Option<ProviderConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ProviderConfig {
    /// provider 활성화 여부(기본 true)
    pub enabled: Option<bool>,
    pub model: Option<String>,
    pub api_base: Option<String>,
    /// 인증 키(직접값)
    pub api_key: Option<String>,
    /// 인증 키를 읽을 환경변수 이름
    pub api_key_env: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Config {
    /// 설정 파일이 하나도 없을 때도 적용되는 내장 기본값.
    pub fn builtin() -> Self {
        let mut hosts = HashMap::new();
        hosts.insert(
            DEFAULT_GITHUB_HOST.to_string(),
            HostConfig {
                token_env: Some("GITHUB_TOKEN".to_string()),
                ..HostConfig::default()
            },
        );

        Self {
            hosts,
            providers: ProvidersConfig {
                openai: Some(ProviderConfig {
                    api_key_env: Some("OPENAI_API_KEY".to_string()),
                    ..ProviderConfig::default()
                }),
            },
            ..Self::default()
        }
    }

    pub fn max_patch_bytes(&self) -> usize {
        self.defaults
            .max_patch_bytes
            .unwrap_or(DEFAULT_MAX_PATCH_BYTES)
    }

    pub fn max_content_bytes(&self) -> usize {
        self.defaults
            .max_content_bytes
            .unwrap_or(DEFAULT_MAX_CONTENT_BYTES)
    }

    pub fn changed_lines_only(&self) -> bool {
        self.defaults.changed_lines_only.unwrap_or(true)
    }

    pub fn system_prompt(&self) -> String {
        self.defaults
            .system_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string())
    }

    /// 리뷰 코멘트 출력 언어를 해석한다.
    pub fn comment_language(&self) -> CommentLanguage {
        CommentLanguage::from_config(self.defaults.comment_language.as_deref())
    }

    pub fn dedupe_enabled(&self) -> bool {
        self.dedupe.enabled.unwrap_or(true)
    }

    /// 설정값으로 중복 판정기를 만든다. 키워드 목록을 주면 기본 목록을 대체한다.
    pub fn deduplicator(&self) -> FindingDeduplicator {
        let threshold = self
            .dedupe
            .similarity_threshold
            .unwrap_or(DEFAULT_SIMILARITY_THRESHOLD);
        match &self.dedupe.keywords {
            Some(keywords) => FindingDeduplicator::new(keywords.iter().cloned(), threshold),
            None => FindingDeduplicator::new(
                DEFAULT_DUPLICATE_KEYWORDS.iter().map(|k| k.to_string()),
                threshold,
            ),
        }
    }

    pub fn lint_enabled(&self) -> bool {
        self.lint.enabled.unwrap_or(true)
    }

    pub fn disabled_lint_rules(&self) -> &[String] {
        self.lint.disabled_rules.as_deref().unwrap_or(&[])
    }

    /// linepilot 설정에서 직접 지정한 린트 값.
    pub fn lint_overrides(&self) -> LintOverrides {
        LintOverrides {
            indent_size: self.lint.indent_size.filter(|n| *n > 0),
            max_line_length: self.lint.max_line_length.filter(|n| *n > 0),
            disabled_rules: self.disabled_lint_rules().to_vec(),
        }
    }

    pub fn lint_repo_config(&self) -> bool {
        self.lint.repo_config.unwrap_or(true)
    }

    pub fn bot_login(&self) -> &str {
        self.defaults
            .bot_login
            .as_deref()
            .unwrap_or(DEFAULT_BOT_LOGIN)
    }

    pub fn summary_patch_bytes(&self) -> usize {
        self.summary
            .max_patch_bytes
            .unwrap_or(DEFAULT_SUMMARY_PATCH_BYTES)
    }

    pub fn summary_max_tokens(&self) -> u32 {
        self.summary.max_tokens.unwrap_or(DEFAULT_SUMMARY_MAX_TOKENS)
    }

    pub fn conventions_file(&self) -> &str {
        self.summary
            .conventions_file
            .as_deref()
            .unwrap_or(DEFAULT_CONVENTIONS_FILE)
    }

    pub fn conventions_heading(&self) -> &str {
        self.summary
            .conventions_heading
            .as_deref()
            .unwrap_or(DEFAULT_CONVENTIONS_HEADING)
    }

    pub fn reply_max_tokens(&self) -> u32 {
        self.reply.max_tokens.unwrap_or(DEFAULT_REPLY_MAX_TOKENS)
    }

    pub fn reply_context_lines(&self) -> usize {
        self.reply
            .context_lines
            .unwrap_or(DEFAULT_REPLY_CONTEXT_LINES)
    }

    pub fn host_config(&self, host: &str) -> Option<&HostConfig> {
        self.hosts.get(host)
    }

    /// 후순위(나중 파일) 값으로 덮어쓰는 병합 규칙.
    pub fn merge_from(&mut self, other: Config) {
        self.defaults.merge_from(other.defaults);
        self.dedupe.merge_from(other.dedupe);
        self.lint.merge_from(other.lint);
        self.summary.merge_from(other.summary);
        self.reply.merge_from(other.reply);

        for (host, incoming) in other.hosts {
            if let Some(existing) = self.hosts.get_mut(&host) {
                existing.merge_from(incoming);
            } else {
                self.hosts.insert(host, incoming);
            }
        }

        self.providers.merge_from(other.providers);
    }
}

impl DefaultsConfig {
    pub fn merge_from(&mut self, other: DefaultsConfig) {
        if other.max_patch_bytes.is_some() {
            self.max_patch_bytes = other.max_patch_bytes;
        }
        if other.max_content_bytes.is_some() {
            self.max_content_bytes = other.max_content_bytes;
        }
        if other.changed_lines_only.is_some() {
            self.changed_lines_only = other.changed_lines_only;
        }
        if other.comment_language.is_some() {
            self.comment_language = other.comment_language;
        }
        if other.system_prompt.is_some() {
            self.system_prompt = other.system_prompt;
        }
        if other.bot_login.is_some() {
            self.bot_login = other.bot_login;
        }
    }
}

impl DedupeConfig {
    pub fn merge_from(&mut self, other: DedupeConfig) {
        if other.enabled.is_some() {
            self.enabled = other.enabled;
        }
        if other.keywords.is_some() {
            self.keywords = other.keywords;
        }
        if other.similarity_threshold.is_some() {
            self.similarity_threshold = other.similarity_threshold;
        }
    }
}

impl LintConfig {
    pub fn merge_from(&mut self, other: LintConfig) {
        if other.enabled.is_some() {
            self.enabled = other.enabled;
        }
        if other.disabled_rules.is_some() {
            self.disabled_rules = other.disabled_rules;
        }
        if other.indent_size.is_some() {
            self.indent_size = other.indent_size;
        }
        if other.max_line_length.is_some() {
            self.max_line_length = other.max_line_length;
        }
        if other.repo_config.is_some() {
            self.repo_config = other.repo_config;
        }
    }
}

impl SummaryConfig {
    pub fn merge_from(&mut self, other: SummaryConfig) {
        if other.max_patch_bytes.is_some() {
            self.max_patch_bytes = other.max_patch_bytes;
        }
        if other.max_tokens.is_some() {
            self.max_tokens = other.max_tokens;
        }
        if other.conventions_file.is_some() {
            self.conventions_file = other.conventions_file;
        }
        if other.conventions_heading.is_some() {
            self.conventions_heading = other.conventions_heading;
        }
    }
}

impl ReplyConfig {
    pub fn merge_from(&mut self, other: ReplyConfig) {
        if other.max_tokens.is_some() {
            self.max_tokens = other.max_tokens;
        }
        if other.context_lines.is_some() {
            self.context_lines = other.context_lines;
        }
    }
}

impl HostConfig {
    pub fn merge_from(&mut self, other: HostConfig) {
        if other.token.is_some() {
            self.token = other.token;
        }
        if other.token_env.is_some() {
            self.token_env = other.token_env;
        }
        if other.api_base.is_some() {
            self.api_base = other.api_base;
        }
    }
}

impl ProviderConfig {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string())
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    pub fn temperature(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn merge_from(&mut self, other: ProviderConfig) {
        if other.enabled.is_some() {
            self.enabled = other.enabled;
        }
        if other.model.is_some() {
            self.model = other.model;
        }
        if other.api_base.is_some() {
            self.api_base = other.api_base;
        }
        if other.api_key.is_some() {
            self.api_key = other.api_key;
        }
        if other.api_key_env.is_some() {
            self.api_key_env = other.api_key_env;
        }
        if other.max_tokens.is_some() {
            self.max_tokens = other.max_tokens;
        }
        if other.temperature.is_some() {
            self.temperature = other.temperature;
        }
    }
}

impl ProvidersConfig {
    pub fn merge_from(&mut self, other: ProvidersConfig) {
        match (self.openai.as_mut(), other.openai) {
            (Some(existing), Some(next)) => existing.merge_from(next),
            (None, Some(next)) => self.openai = Some(next),
            _ => {}
        }
    }
}
