// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the external collaborators of the relay.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod completion;
pub mod repository;
pub mod waitlist;

pub use adapter::PluginAdapter;
pub use completion::CompletionProvider;
pub use repository::RepositoryProvider;
pub use waitlist::WaitlistStore;
