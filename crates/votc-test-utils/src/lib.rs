// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for votc integration tests.
//!
//! Provides mock adapters and a test harness for fast, deterministic tests
//! that never touch the completion gateway, GitHub or Google Sheets.
//!
//! # Components
//!
//! - [`MockCompletionProvider`] - scripted streaming completions
//! - [`MockRepository`] - records file writes, can fail or stall
//! - [`MockWaitlist`] - records waitlist rows, can fail
//! - [`TestHarness`] - the mocks plus a matching test configuration

pub mod harness;
pub mod mock_provider;
pub mod mock_repository;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_provider::{MockCompletionProvider, MockStream};
pub use mock_repository::{MockRepository, MockWaitlist};
