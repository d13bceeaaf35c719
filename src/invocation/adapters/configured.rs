//! Engine selection from runtime settings.

use super::{AzureOpenAiChatModel, CannedReplyModel};
use crate::invocation::{
    domain::ChatCompletion,
    ports::{ChatModel, ChatModelResult, ChatRequest},
};
use crate::settings::AzureOpenAiSettings;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// The generation engine chosen at start-up.
#[derive(Debug, Clone)]
pub enum ConfiguredChatModel {
    /// Azure OpenAI deployment.
    Azure(AzureOpenAiChatModel),
    /// Deterministic stand-in used when Azure is not configured.
    Canned(CannedReplyModel),
}

impl ConfiguredChatModel {
    /// Uses Azure when settings are present, otherwise the canned model.
    #[must_use]
    pub fn from_settings(
        client: Client,
        settings: Option<AzureOpenAiSettings>,
        timeout: Duration,
    ) -> Self {
        settings.map_or_else(
            || Self::Canned(CannedReplyModel::default()),
            |azure| Self::Azure(AzureOpenAiChatModel::new(client, azure, timeout)),
        )
    }

    /// Returns a short label for logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Azure(_) => "azure-openai",
            Self::Canned(_) => "canned",
        }
    }
}

#[async_trait]
impl ChatModel for ConfiguredChatModel {
    async fn complete(&self, request: &ChatRequest) -> ChatModelResult<ChatCompletion> {
        match self {
            Self::Azure(model) => model.complete(request).await,
            Self::Canned(model) => model.complete(request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Url;

    #[test]
    fn falls_back_to_canned_without_azure_settings() {
        let model = ConfiguredChatModel::from_settings(Client::new(), None, Duration::from_secs(1));
        assert_eq!(model.label(), "canned");
    }

    #[test]
    fn selects_azure_when_configured() -> eyre::Result<()> {
        let settings = AzureOpenAiSettings::new(
            Url::parse("https://example.openai.azure.com")?,
            "gpt",
            "2024-06-01",
            "secret",
            0.0,
        );
        let model =
            ConfiguredChatModel::from_settings(Client::new(), Some(settings), Duration::from_secs(1));
        assert_eq!(model.label(), "azure-openai");
        Ok(())
    }
}
