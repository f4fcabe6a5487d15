// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Repository provider trait ("create or update a file").

use async_trait::async_trait;

use crate::error::VotcError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{FileWrite, FileWritten, RepositoryCoordinates};

/// Adapter for a remote version-controlled file store.
#[async_trait]
pub trait RepositoryProvider: PluginAdapter {
    /// Repository coordinates files are written to.
    fn coordinates(&self) -> &RepositoryCoordinates;

    /// Creates (or overwrites) a file in a single commit.
    ///
    /// Errors are reported as [`VotcError::Repository`] with a classified
    /// kind, or [`VotcError::Timeout`].
    async fn create_or_update_file(&self, write: FileWrite) -> Result<FileWritten, VotcError>;
}
