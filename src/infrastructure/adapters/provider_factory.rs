//! Provider 포트 구현 어댑터.

use anyhow::Result;
use async_trait::async_trait;

use crate::application::config::Config;
use crate::application::ports::{ConversationModel, FindingProvider, ProviderFactory};
use crate::domain::conversation::{ModelReply, ReplyRequest, SummaryRequest};
use crate::domain::review::{AnalysisRequest, ProviderFindings};
use crate::infrastructure::providers;

/// Provider 팩토리 어댑터.
pub struct ProviderFactoryAdapter;

impl ProviderFactory for ProviderFactoryAdapter {
    fn build(&self, config: &Config) -> Vec<Box<dyn FindingProvider>> {
        providers::build_providers(config)
            .into_iter()
            .map(|inner| Box::new(FindingProviderAdapter { inner }) as Box<dyn FindingProvider>)
            .collect()
    }

    fn build_conversation(&self, config: &Config) -> Option<Box<dyn ConversationModel>> {
        providers::build_conversation_provider(config)
            .map(|inner| Box::new(ConversationModelAdapter { inner }) as Box<dyn ConversationModel>)
    }
}

/// 인프라 Provider를 애플리케이션 포트로 감싸는 래퍼.
struct FindingProviderAdapter {
    inner: Box<dyn providers::AnalysisProvider>,
}

#[async_trait]
impl FindingProvider for FindingProviderAdapter {
    fn id(&self) -> &'static str {
        self.inner.id()
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn analyze(&self, request: &AnalysisRequest) -> Result<ProviderFindings> {
        self.inner.analyze(request).await
    }
}

struct ConversationModelAdapter {
    inner: Box<dyn providers::ConversationProvider>,
}

#[async_trait]
impl ConversationModel for ConversationModelAdapter {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn summarize(&self, request: &SummaryRequest) -> Result<ModelReply> {
        self.inner.summarize(request).await
    }

    async fn reply(&self, request: &ReplyRequest) -> Result<ModelReply> {
        self.inner.reply(request).await
    }
}
