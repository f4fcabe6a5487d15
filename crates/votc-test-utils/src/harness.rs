// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` bundles the mock adapters with a `VotcConfig` that points at
//! nothing real. Callers wire the pieces into whatever they are testing (the
//! relay, the HTTP router, the full server).

use std::sync::Arc;

use votc_config::VotcConfig;
use votc_core::{CompletionProvider, RepositoryProvider, WaitlistStore};

use crate::mock_provider::{MockCompletionProvider, MockStream};
use crate::mock_repository::{MockRepository, MockWaitlist};

/// Builder for test environments.
pub struct TestHarnessBuilder {
    streams: Vec<MockStream>,
    production: bool,
    max_user_turns: Option<usize>,
    with_provider: bool,
    with_repository: bool,
    with_waitlist: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            streams: Vec::new(),
            production: false,
            max_user_turns: None,
            with_provider: true,
            with_repository: true,
            with_waitlist: true,
        }
    }

    /// Queue scripted completion streams, consumed in order.
    pub fn with_mock_streams(mut self, streams: Vec<MockStream>) -> Self {
        self.streams = streams;
        self
    }

    /// Run with `server.environment = "production"`.
    pub fn production(mut self) -> Self {
        self.production = true;
        self
    }

    pub fn with_max_user_turns(mut self, turns: usize) -> Self {
        self.max_user_turns = Some(turns);
        self
    }

    /// Leave the completion key unset.
    pub fn without_provider(mut self) -> Self {
        self.with_provider = false;
        self
    }

    /// Leave the GitHub token unset.
    pub fn without_repository(mut self) -> Self {
        self.with_repository = false;
        self
    }

    /// Leave the sheet unconfigured.
    pub fn without_waitlist(mut self) -> Self {
        self.with_waitlist = false;
        self
    }

    pub fn build(self) -> TestHarness {
        let provider = MockCompletionProvider::new();
        for stream in self.streams {
            provider.push(stream);
        }

        let mut config = VotcConfig::default();
        config.server.port = 0;
        config.conversation.internal_notes_file = None;
        if let Some(turns) = self.max_user_turns {
            config.conversation.max_user_turns = turns;
        }
        if self.production {
            config.server.environment = "production".into();
        }
        if self.with_provider {
            config.completion.api_key = Some("test-completion-key".into());
        }
        if self.with_repository {
            config.github.token = Some("test-github-token".into());
        }
        if self.with_waitlist {
            config.sheets.service_account = Some("{}".into());
            config.sheets.sheet_id = Some("test-sheet".into());
        }

        TestHarness {
            config,
            provider,
            repository: MockRepository::new(),
            waitlist: MockWaitlist::new(),
            with_provider: self.with_provider,
            with_repository: self.with_repository,
            with_waitlist: self.with_waitlist,
        }
    }
}

/// Mock adapters plus the configuration they stand in for.
pub struct TestHarness {
    pub config: VotcConfig,
    pub provider: MockCompletionProvider,
    pub repository: MockRepository,
    pub waitlist: MockWaitlist,
    with_provider: bool,
    with_repository: bool,
    with_waitlist: bool,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// The provider as the relay takes it; `None` when built without one.
    pub fn completion_provider(&self) -> Option<Arc<dyn CompletionProvider>> {
        self.with_provider
            .then(|| Arc::new(self.provider.clone()) as Arc<dyn CompletionProvider>)
    }

    pub fn repository_provider(&self) -> Option<Arc<dyn RepositoryProvider>> {
        self.with_repository
            .then(|| Arc::new(self.repository.clone()) as Arc<dyn RepositoryProvider>)
    }

    pub fn waitlist_store(&self) -> Option<Arc<dyn WaitlistStore>> {
        self.with_waitlist
            .then(|| Arc::new(self.waitlist.clone()) as Arc<dyn WaitlistStore>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_harness_has_every_adapter() {
        let harness = TestHarness::builder().build();
        assert!(harness.completion_provider().is_some());
        assert!(harness.repository_provider().is_some());
        assert!(harness.waitlist_store().is_some());
        assert!(!harness.config.server.is_production());
        assert!(harness.config.conversation.internal_notes_file.is_none());
    }

    #[test]
    fn without_flags_drop_adapters_and_credentials() {
        let harness = TestHarness::builder()
            .without_provider()
            .without_repository()
            .without_waitlist()
            .production()
            .build();
        assert!(harness.completion_provider().is_none());
        assert!(harness.repository_provider().is_none());
        assert!(harness.waitlist_store().is_none());
        assert!(harness.config.completion.api_key.is_none());
        assert!(harness.config.github.token.is_none());
        assert!(harness.config.server.is_production());
    }
}
