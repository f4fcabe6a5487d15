// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Waitlist store trait ("append a row").

use async_trait::async_trait;

use crate::error::VotcError;
use crate::traits::adapter::PluginAdapter;
use crate::types::WaitlistEntry;

/// Adapter for the tabular store that collects waitlist sign-ups.
#[async_trait]
pub trait WaitlistStore: PluginAdapter {
    /// Appends one row for `entry`.
    async fn append(&self, entry: WaitlistEntry) -> Result<(), VotcError>;
}
