// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion provider trait ("complete chat, stream text").

use async_trait::async_trait;

use crate::error::VotcError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{CompletionRequest, TextStream};

/// Adapter for a hosted language-model completion API.
#[async_trait]
pub trait CompletionProvider: PluginAdapter {
    /// Starts a streaming completion.
    ///
    /// Returns `Err` when the request fails before the provider starts
    /// producing output. Failures after that point surface as `Err` items
    /// inside the returned stream. Dropping the stream abandons the call.
    async fn stream(&self, request: CompletionRequest) -> Result<TextStream, VotcError>;
}
