// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the relay's `/chat` and `/export` endpoints.

use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};
use votc_core::Message;

use crate::decoder::StreamDecoder;
use crate::session::{ExportPreview, TurnOutcome};

/// Shown when the relay cannot be reached.
pub const CONNECTION_ERROR_MESSAGE: &str = "Connection error. Please try again.";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Connection error. Please try again.")]
    Connection(#[source] reqwest::Error),

    /// Non-success status; the message is the server's `error` text when present.
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    #[error("invalid relay URL: {0}")]
    InvalidUrl(String),
}

/// Link to an exported document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExportLink {
    pub url: String,
    pub filename: String,
    pub path: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct RelayClient {
    http: reqwest::Client,
    base_url: String,
}

impl RelayClient {
    /// `base_url` is the relay origin, e.g. `http://127.0.0.1:3000`.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let trimmed = base_url.trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(ClientError::Connection)?;
        Ok(Self {
            http,
            base_url: trimmed.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Posts the conversation and returns the streaming reply.
    pub async fn chat(&self, messages: &[Message]) -> Result<ChatStream, ClientError> {
        let response = self
            .http
            .post(format!("{}/chat", self.base_url))
            .json(&serde_json::json!({ "messages": messages }))
            .send()
            .await
            .map_err(ClientError::Connection)?;

        let response = check_status(response, |status| format!("API error: {}", status.as_u16())).await?;
        Ok(ChatStream {
            response,
            decoder: StreamDecoder::new(),
        })
    }

    /// Submits a reviewed export document.
    pub async fn export(&self, preview: &ExportPreview) -> Result<ExportLink, ClientError> {
        let response = self
            .http
            .post(format!("{}/export", self.base_url))
            .json(&preview.request_body())
            .send()
            .await
            .map_err(ClientError::Connection)?;

        let response =
            check_status(response, |status| format!("Export failed: {}", status.as_u16())).await?;
        response.json().await.map_err(ClientError::Connection)
    }
}

async fn check_status(
    response: Response,
    fallback: impl FnOnce(StatusCode) -> String,
) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => fallback(status),
    };
    Err(ClientError::Status { status, message })
}

/// A reply being streamed from `/chat`.
pub struct ChatStream {
    response: Response,
    decoder: StreamDecoder,
}

impl ChatStream {
    /// Reads the body to its end, handing each decoded fragment to `on_fragment`.
    ///
    /// A body that ends, or breaks, before the terminator is `Interrupted`.
    pub async fn drive(mut self, mut on_fragment: impl FnMut(&str)) -> TurnOutcome {
        loop {
            match self.response.chunk().await {
                Ok(Some(bytes)) => {
                    let text = self.decoder.push(&bytes);
                    if !text.is_empty() {
                        on_fragment(&text);
                    }
                    if self.decoder.terminated() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "reply stream broke");
                    break;
                }
            }
        }

        let end = self.decoder.finish();
        if !end.trailing.is_empty() {
            on_fragment(&end.trailing);
        }
        if end.terminated {
            debug!("reply stream terminated");
            TurnOutcome::Completed
        } else {
            TurnOutcome::Interrupted
        }
    }
}
