// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SSE stream parser for chat-completions streaming responses.
//!
//! Converts a reqwest response byte stream into text fragments using the
//! `eventsource-stream` crate. The `[DONE]` sentinel ends the stream; chunks
//! without text (role announcements, finish markers) are skipped.

use eventsource_stream::Eventsource;
use futures::future;
use futures::stream::StreamExt;
use votc_core::{TextStream, VotcError};

use crate::types::ChatCompletionChunk;

const DONE_SENTINEL: &str = "[DONE]";

/// Parses a streaming response into a [`TextStream`] of content deltas.
pub fn parse_sse_stream(response: reqwest::Response) -> TextStream {
    let events = response.bytes_stream().eventsource();

    let mapped = events
        .take_while(|result| {
            future::ready(!matches!(result, Ok(event) if event.data.trim() == DONE_SENTINEL))
        })
        .filter_map(|result| async move {
            match result {
                Ok(event) => parse_chunk(&event.data).transpose(),
                Err(e) => Some(Err(VotcError::provider(format!("SSE stream error: {e}")))),
            }
        });

    Box::pin(mapped)
}

/// Extracts the text delta from one `data:` payload.
///
/// Returns `Ok(None)` for chunks that carry no text.
pub fn parse_chunk(data: &str) -> Result<Option<String>, VotcError> {
    if data.trim().is_empty() {
        return Ok(None);
    }
    let chunk: ChatCompletionChunk =
        serde_json::from_str(data).map_err(|e| VotcError::Provider {
            message: format!("failed to parse stream chunk: {e}"),
            source: Some(Box::new(e)),
        })?;

    if let Some(error) = chunk.error {
        return Err(VotcError::provider(format!(
            "upstream stream error: {}",
            error.message
        )));
    }

    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|text| !text.is_empty()))
}
