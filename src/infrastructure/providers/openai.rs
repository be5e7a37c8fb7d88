//! OpenAI 호환 chat completions provider 어댑터.

use anyhow::{Result, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::debug;

use crate::application::config::Config;
use crate::domain::conversation::{ModelReply, ReplyRequest, SummaryRequest};
use crate::domain::finding::parse_findings_output;
use crate::domain::review::{AnalysisRequest, ProviderFindings};
use crate::infrastructure::config::resolve_provider_api_key;

use super::api_runner::{build_api_client, first_choice_text, parse_usage, send_json};
use super::prompt::{REPLY_SYSTEM_PROMPT, SUMMARY_SYSTEM_PROMPT};
use super::{
    AnalysisProvider, ConversationProvider, build_reply_prompt, build_summary_prompt,
    build_user_prompt,
};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

pub struct OpenAiProvider {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiProvider {
    /// 설정에서 실행 스펙을 읽고, 활성화되어 있고 키가 해석될 때만 provider를 만든다.
    pub fn from_config(config: &Config) -> Option<Self> {
        let provider = config.providers.openai.as_ref()?;
        if !provider.is_enabled() {
            return None;
        }

        let resolution = resolve_provider_api_key(provider);
        let Some(api_key) = resolution.credential else {
            debug!(source = ?resolution.source, "openai: api key unavailable");
            return None;
        };

        Some(Self {
            client: build_api_client(),
            api_base: provider
                .api_base
                .as_deref()
                .unwrap_or(DEFAULT_API_BASE)
                .trim_end_matches('/')
                .to_string(),
            api_key,
            model: provider.model(),
            max_tokens: provider.max_tokens(),
            temperature: provider.temperature(),
        })
    }
}

impl OpenAiProvider {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<Value> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "max_tokens": max_tokens,
            "temperature": temperature,
        });

        let req = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&body);
        send_json("OpenAI", "request chat completion", req).await
    }

    /// 빈 응답은 게시할 수 없으므로 오류다.
    async fn complete_text(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<ModelReply> {
        let value = self.complete(system, user, max_tokens, temperature).await?;
        let text = first_choice_text(&value);
        if text.trim().is_empty() {
            bail!("OpenAI: empty completion");
        }
        Ok(ModelReply {
            text,
            usage: parse_usage(&value),
        })
    }
}

#[async_trait]
impl AnalysisProvider for OpenAiProvider {
    fn id(&self) -> &'static str {
        "openai"
    }

    fn name(&self) -> &'static str {
        "OpenAI"
    }

    async fn analyze(&self, request: &AnalysisRequest) -> Result<ProviderFindings> {
        let value = self
            .complete(
                &request.system_prompt,
                &build_user_prompt(request),
                self.max_tokens,
                self.temperature,
            )
            .await?;

        let findings = parse_findings_output(&first_choice_text(&value));
        debug!(path = %request.path, count = findings.len(), "openai findings parsed");

        Ok(ProviderFindings {
            findings,
            usage: parse_usage(&value),
        })
    }
}

#[async_trait]
impl ConversationProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "OpenAI"
    }

    async fn summarize(&self, request: &SummaryRequest) -> Result<ModelReply> {
        let reply = self
            .complete_text(
                SUMMARY_SYSTEM_PROMPT,
                &build_summary_prompt(request),
                request.max_tokens,
                request.temperature,
            )
            .await?;
        debug!(files = request.files.len(), chars = reply.text.len(), "openai summary written");
        Ok(reply)
    }

    async fn reply(&self, request: &ReplyRequest) -> Result<ModelReply> {
        self.complete_text(
            REPLY_SYSTEM_PROMPT,
            &build_reply_prompt(request),
            request.max_tokens,
            request.temperature,
        )
        .await
    }
}
