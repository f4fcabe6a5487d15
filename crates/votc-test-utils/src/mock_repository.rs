// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock repository provider and waitlist store.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use votc_core::{
    AdapterType, FileWrite, FileWritten, PluginAdapter, RepositoryCoordinates,
    RepositoryErrorKind, RepositoryProvider, VotcError, WaitlistEntry, WaitlistErrorKind,
    WaitlistStore,
};

/// Records file writes; optionally fails or stalls. Clones share state.
#[derive(Clone)]
pub struct MockRepository {
    coordinates: RepositoryCoordinates,
    writes: Arc<Mutex<Vec<FileWrite>>>,
    failure: Arc<Mutex<Option<RepositoryErrorKind>>>,
    delay: Arc<Mutex<Option<Duration>>>,
}

impl MockRepository {
    /// A repository at `understories/votc` on `main`.
    pub fn new() -> Self {
        Self::with_coordinates(RepositoryCoordinates {
            owner: "understories".into(),
            repo: "votc".into(),
            branch: "main".into(),
        })
    }

    pub fn with_coordinates(coordinates: RepositoryCoordinates) -> Self {
        Self {
            coordinates,
            writes: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
            delay: Arc::new(Mutex::new(None)),
        }
    }

    /// Fail every subsequent write with `kind`.
    pub fn fail_with(&self, kind: RepositoryErrorKind) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = Some(kind);
        }
    }

    /// Sleep for `delay` before answering each write.
    pub fn delay(&self, delay: Duration) {
        if let Ok(mut d) = self.delay.lock() {
            *d = Some(delay);
        }
    }

    pub fn writes(&self) -> Vec<FileWrite> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockRepository {
    fn name(&self) -> &str {
        "mock-repository"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Repository
    }
}

#[async_trait]
impl RepositoryProvider for MockRepository {
    fn coordinates(&self) -> &RepositoryCoordinates {
        &self.coordinates
    }

    async fn create_or_update_file(&self, write: FileWrite) -> Result<FileWritten, VotcError> {
        let delay = self.delay.lock().ok().and_then(|d| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self.failure.lock().ok().and_then(|f| *f);
        if let Some(kind) = failure {
            return Err(VotcError::repository(kind, "mock failure"));
        }

        let path = write.path.clone();
        if let Ok(mut writes) = self.writes.lock() {
            writes.push(write);
        }
        Ok(FileWritten {
            path,
            sha: Some("0000000000000000000000000000000000000000".into()),
        })
    }
}

/// Records appended waitlist rows; optionally fails. Clones share state.
#[derive(Clone, Default)]
pub struct MockWaitlist {
    entries: Arc<Mutex<Vec<WaitlistEntry>>>,
    failure: Arc<Mutex<Option<WaitlistErrorKind>>>,
}

impl MockWaitlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(&self, kind: WaitlistErrorKind) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = Some(kind);
        }
    }

    pub fn entries(&self) -> Vec<WaitlistEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PluginAdapter for MockWaitlist {
    fn name(&self) -> &str {
        "mock-waitlist"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Waitlist
    }
}

#[async_trait]
impl WaitlistStore for MockWaitlist {
    async fn append(&self, entry: WaitlistEntry) -> Result<(), VotcError> {
        let failure = self.failure.lock().ok().and_then(|f| *f);
        if let Some(kind) = failure {
            return Err(VotcError::waitlist(kind, "mock failure"));
        }
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
        Ok(())
    }
}
