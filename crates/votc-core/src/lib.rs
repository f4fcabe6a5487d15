// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the votc conversational relay.
//!
//! This crate provides the error type, the message and request types, and
//! the adapter traits for the three external collaborators: the completion
//! provider, the repository provider, and the waitlist store.

pub mod error;
pub mod traits;
pub mod types;

pub use error::VotcError;
pub use types::{
    AdapterType, CompletionRequest, FileWrite, FileWritten, HealthStatus, MAX_MESSAGE_CHARS,
    MAX_USER_TURNS, Message, RepositoryCoordinates, RepositoryErrorKind, Role, TextStream,
    WaitlistEntry, WaitlistErrorKind,
};

pub use traits::{CompletionProvider, PluginAdapter, RepositoryProvider, WaitlistStore};
