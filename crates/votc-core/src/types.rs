// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the relay, the adapters, and the terminal client.

use std::pin::Pin;

use chrono::{DateTime, Utc};
use futures_core::Stream;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::VotcError;

/// Maximum number of characters kept from a single message's content.
pub const MAX_MESSAGE_CHARS: usize = 500;

/// Maximum number of user turns a conversation may contain.
pub const MAX_USER_TURNS: usize = 12;

/// Author of a conversation message.
///
/// There is no `System` variant. System instructions travel in
/// [`CompletionRequest::system`], never as a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single conversation message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// A streaming chat-completion request handed to a [`CompletionProvider`].
///
/// [`CompletionProvider`]: crate::traits::CompletionProvider
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Provider model identifier (e.g. `mistral/ministral-3b`).
    pub model: String,
    /// System instruction, kept apart from the message list.
    pub system: String,
    /// Sanitized user/assistant history.
    pub messages: Vec<Message>,
    /// Output token budget.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

/// Incremental text fragments produced by a completion provider.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, VotcError>> + Send>>;

/// Owner / repository / branch triple identifying the export destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryCoordinates {
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

impl RepositoryCoordinates {
    /// Public URL of a file at `path` on the configured branch.
    pub fn blob_url(&self, path: &str) -> String {
        format!(
            "https://github.com/{}/{}/blob/{}/{}",
            self.owner, self.repo, self.branch, path
        )
    }
}

/// A single create-or-update file operation against the repository provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileWrite {
    /// Repository-relative destination path.
    pub path: String,
    /// Base64-encoded document body.
    pub encoded_content: String,
    /// Commit message.
    pub commit_message: String,
}

/// Result of a successful file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileWritten {
    pub path: String,
    pub sha: Option<String>,
}

/// Classification of repository provider failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RepositoryErrorKind {
    /// Credentials rejected (HTTP 401).
    Unauthorized,
    /// Permission denied or throttled (HTTP 403 / 429). Retryable.
    RateLimited,
    /// Repository or branch not found (HTTP 404).
    NotFound,
    /// Path conflict or validation failure (HTTP 409 / 422).
    InvalidPath,
    /// The call did not complete within the configured timeout.
    Timeout,
    /// Anything else.
    Other,
}

impl RepositoryErrorKind {
    /// Classifies an HTTP status returned by the repository provider.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => RepositoryErrorKind::Unauthorized,
            403 | 429 => RepositoryErrorKind::RateLimited,
            404 => RepositoryErrorKind::NotFound,
            409 | 422 => RepositoryErrorKind::InvalidPath,
            _ => RepositoryErrorKind::Other,
        }
    }
}

/// Classification of waitlist store failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum WaitlistErrorKind {
    /// The store could not be reached.
    Network,
    /// The credentials lack access to the sheet (HTTP 403).
    PermissionDenied,
    /// Spreadsheet or tab not found (HTTP 404).
    NotFound,
    /// Anything else, including token exchange failures.
    Other,
}

impl WaitlistErrorKind {
    /// Classifies an HTTP status returned by the waitlist store.
    pub fn from_status(status: u16) -> Self {
        match status {
            403 => WaitlistErrorKind::PermissionDenied,
            404 => WaitlistErrorKind::NotFound,
            _ => WaitlistErrorKind::Other,
        }
    }
}

/// One waitlist sign-up, appended as a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitlistEntry {
    pub timestamp: DateTime<Utc>,
    pub email: String,
    pub name: Option<String>,
}

impl WaitlistEntry {
    /// Row cells in column order: timestamp, email, name.
    pub fn to_row(&self) -> [String; 3] {
        [
            self.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            self.email.clone(),
            self.name.clone().unwrap_or_default(),
        ]
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of external collaborator an adapter talks to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Completion,
    Repository,
    Waitlist,
}
