// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the votc relay.
//!
//! Routes `POST /chat` to the completion relay, `POST /export` to the
//! transcript exporter and `POST /waitlist` to the waitlist service, plus
//! `GET /health` and `GET /metrics`.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{Adapters, AppState, HealthState, bind, router, serve};
