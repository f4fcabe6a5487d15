// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt assembly for the votc game master.
//!
//! The static zone carries the two system prompts. They are built once at
//! process start and shared immutably across requests.

pub mod static_zone;

pub use static_zone::{PromptKind, StaticZone};
