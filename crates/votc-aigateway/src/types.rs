// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the OpenAI-compatible chat-completions protocol.

use serde::{Deserialize, Serialize};
use votc_core::{CompletionRequest, Role};

/// Request body for `POST {base}/chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub stream: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatCompletionRequest {
    /// The system instruction occupies the leading `system` slot; the
    /// conversation follows with its own roles.
    pub fn from_request(request: &CompletionRequest) -> Self {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        messages.push(WireMessage {
            role: "system",
            content: request.system.clone(),
        });
        messages.extend(request.messages.iter().map(|m| WireMessage {
            role: match m.role() {
                Role::User => "user",
                Role::Assistant => "assistant",
            },
            content: m.content().to_string(),
        }));

        Self {
            model: request.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream: true,
        }
    }
}

/// One `data:` payload of the streaming response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

/// Error object as returned in non-2xx bodies and in-stream error events.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub message: String,
    #[serde(default, rename = "type")]
    pub type_: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use votc_core::Message;

    #[test]
    fn system_prompt_leads_the_wire_messages() {
        let request = CompletionRequest {
            model: "mistral/ministral-3b".into(),
            system: "be brief".into(),
            messages: vec![Message::user("hello"), Message::assistant("hi")],
            max_tokens: 120,
            temperature: 0.7,
        };
        let wire = ChatCompletionRequest::from_request(&request);
        assert!(wire.stream);
        assert_eq!(wire.messages.len(), 3);
        assert_eq!(wire.messages[0], WireMessage {
            role: "system",
            content: "be brief".into()
        });
        assert_eq!(wire.messages[1].role, "user");
        assert_eq!(wire.messages[2].role, "assistant");
    }

    #[test]
    fn chunk_without_content_parses() {
        let chunk: ChatCompletionChunk =
            serde_json::from_str(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#).unwrap();
        assert!(chunk.choices[0].delta.content.is_none());
        assert!(chunk.error.is_none());
    }
}
