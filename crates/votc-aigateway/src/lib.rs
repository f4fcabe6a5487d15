// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AI gateway completion adapter for votc.
//!
//! Implements [`CompletionProvider`] against an OpenAI-compatible
//! `chat/completions` endpoint with SSE streaming. Model identifiers use the
//! gateway's `provider/model` form (e.g. `mistral/ministral-3b`).

pub mod client;
pub mod sse;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;
use tracing::{debug, info};
use votc_config::model::CompletionConfig;
use votc_core::{
    AdapterType, CompletionProvider, CompletionRequest, PluginAdapter, TextStream, VotcError,
};

use crate::client::GatewayClient;
use crate::types::ChatCompletionRequest;

/// Streaming completion provider backed by the AI gateway.
pub struct AiGatewayProvider {
    client: GatewayClient,
}

impl AiGatewayProvider {
    /// Creates the provider from the completion section and a resolved key.
    pub fn new(config: &CompletionConfig, api_key: &SecretString) -> Result<Self, VotcError> {
        let client = GatewayClient::new(
            api_key,
            &config.base_url,
            Duration::from_secs(config.timeout_secs),
        )?;

        info!(
            model = config.model,
            endpoint = client.endpoint(),
            "AI gateway provider initialized"
        );

        Ok(Self { client })
    }

    /// Creates a provider with an existing client.
    pub fn with_client(client: GatewayClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PluginAdapter for AiGatewayProvider {
    fn name(&self) -> &str {
        "ai-gateway"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Completion
    }
}

#[async_trait]
impl CompletionProvider for AiGatewayProvider {
    async fn stream(&self, request: CompletionRequest) -> Result<TextStream, VotcError> {
        debug!(
            model = request.model,
            max_tokens = request.max_tokens,
            messages = request.messages.len(),
            "opening completion stream"
        );
        let wire = ChatCompletionRequest::from_request(&request);
        self.client.stream_chat(&wire).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use votc_core::Message;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn provider_streams_through_configured_base_url() {
        let server = MockServer::start().await;
        let body = ["Wh", "at d", "o you see?"]
            .iter()
            .map(|t| {
                format!(
                    "data: {}\n\n",
                    serde_json::json!({"choices": [{"delta": {"content": t}}]})
                )
            })
            .collect::<String>()
            + "data: [DONE]\n\n";

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(body),
            )
            .mount(&server)
            .await;

        let config = CompletionConfig {
            base_url: format!("{}/v1", server.uri()),
            ..CompletionConfig::default()
        };
        let key = SecretString::from("vck_x".to_string());
        let provider = AiGatewayProvider::new(&config, &key).unwrap();
        assert_eq!(provider.name(), "ai-gateway");

        let text: String = provider
            .stream(CompletionRequest {
                model: config.model.clone(),
                system: "probe".into(),
                messages: vec![Message::user("a"), Message::assistant("b"), Message::user("c")],
                max_tokens: 80,
                temperature: 0.7,
            })
            .await
            .unwrap()
            .map(|r| r.unwrap())
            .collect::<Vec<_>>()
            .await
            .concat();
        assert_eq!(text, "What do you see?");
    }
}
