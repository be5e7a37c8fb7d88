//! 분석 provider 공통 모듈.
//! OpenAI 호환 chat completions API를 호출하고 결과를 finding 또는 자유 형식 문장으로 표준화한다.

mod api_runner;
pub mod openai;
mod prompt;

use anyhow::Result;
use async_trait::async_trait;

use crate::application::config::Config;
use crate::domain::conversation::{ModelReply, ReplyRequest, SummaryRequest};
use crate::domain::review::{AnalysisRequest, ProviderFindings};

pub use prompt::{build_reply_prompt, build_summary_prompt, build_user_prompt};

#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// 내부 식별자(로그/집계 키)
    fn id(&self) -> &'static str;
    /// 사용자 표시 이름
    fn name(&self) -> &'static str;
    /// 파일 하나를 분석한다.
    async fn analyze(&self, request: &AnalysisRequest) -> Result<ProviderFindings>;
}

pub fn build_providers(config: &Config) -> Vec<Box<dyn AnalysisProvider>> {
    // 인증 키가 해석되는 provider만 활성화한다.
    let mut providers: Vec<Box<dyn AnalysisProvider>> = Vec::new();

    if let Some(provider) = openai::OpenAiProvider::from_config(config) {
        providers.push(Box::new(provider));
    }

    providers
}

/// 요약/답글처럼 JSON이 아닌 문장을 돌려받는 호출.
#[async_trait]
pub trait ConversationProvider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn summarize(&self, request: &SummaryRequest) -> Result<ModelReply>;
    async fn reply(&self, request: &ReplyRequest) -> Result<ModelReply>;
}

pub fn build_conversation_provider(config: &Config) -> Option<Box<dyn ConversationProvider>> {
    openai::OpenAiProvider::from_config(config)
        .map(|provider| Box::new(provider) as Box<dyn ConversationProvider>)
}
