// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the votc relay.

use thiserror::Error;

use crate::types::{RepositoryErrorKind, WaitlistErrorKind};

/// The primary error type used across adapter traits and relay operations.
#[derive(Debug, Error)]
pub enum VotcError {
    /// Missing or malformed configuration (credentials, repository coordinates).
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed or missing request input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Turn ceiling reached or an upstream provider throttled the request.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Completion provider errors (HTTP failure, bad status, malformed stream).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Repository provider errors, classified for client-facing mapping.
    #[error("repository error ({kind}): {message}")]
    Repository {
        kind: RepositoryErrorKind,
        message: String,
    },

    /// Waitlist store errors (token exchange, append failure), classified.
    #[error("waitlist error ({kind}): {message}")]
    Waitlist {
        kind: WaitlistErrorKind,
        message: String,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl VotcError {
    /// Shorthand for a provider error without an underlying source.
    pub fn provider(message: impl Into<String>) -> Self {
        VotcError::Provider {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a classified repository error.
    pub fn repository(kind: RepositoryErrorKind, message: impl Into<String>) -> Self {
        VotcError::Repository {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for a classified waitlist error.
    pub fn waitlist(kind: WaitlistErrorKind, message: impl Into<String>) -> Self {
        VotcError::Waitlist {
            kind,
            message: message.into(),
        }
    }
}
