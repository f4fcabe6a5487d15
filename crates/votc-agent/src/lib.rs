// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Game master request handling for votc.
//!
//! - [`sanitize`]: bounds untrusted conversation input
//! - [`governor`]: turn ceiling and Welcome / Probe selection
//! - [`relay`]: streaming completion relay with an explicit state machine
//! - [`export`] and [`template`]: transcript exports to the repository
//! - [`waitlist`]: waitlist sign-ups

pub mod export;
pub mod governor;
pub mod relay;
pub mod sanitize;
pub mod template;
pub mod waitlist;

pub use export::{ExportBody, ExportKind, ExportReceipt, ExportRequest, TranscriptExporter};
pub use governor::{TURN_LIMIT_MESSAGE, TurnDecision, TurnGovernor};
pub use relay::{
    CompletionRelay, INVALID_REQUEST_MESSAGE, RejectReason, RelayState, RelayStream,
    STREAM_TERMINATOR, STREAM_TERMINATOR_HEADER, STREAM_TERMINATOR_NAME,
};
pub use sanitize::sanitize_messages;
pub use waitlist::{SignupRequest, WAITLIST_SUCCESS_MESSAGE, WaitlistService};
