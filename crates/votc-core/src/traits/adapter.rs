// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait that all external-service adapters implement.

use async_trait::async_trait;

use crate::error::VotcError;
use crate::types::{AdapterType, HealthStatus};

/// The base trait for all votc adapters.
///
/// Provides identity and a health check used by `votc doctor` and `/health`.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the kind of collaborator this adapter talks to.
    fn adapter_type(&self) -> AdapterType;

    /// Performs a cheap, local health check.
    async fn health_check(&self) -> Result<HealthStatus, VotcError> {
        Ok(HealthStatus::Healthy)
    }
}
