// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion relay: validates a chat request, governs the turn, starts the
//! upstream stream, and relays text fragments unframed.
//!
//! Each request moves through
//! `Idle -> Validating -> Rejected(..) | Streaming -> Completed | StreamError | Cancelled`.
//! The terminal state is logged and counted exactly once.
//!
//! On a clean end the relay appends [`STREAM_TERMINATOR`] after the last
//! fragment. A body that ends without it was interrupted. Upstream text never
//! carries the terminator; it is removed from every fragment.

use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use futures::{Stream, StreamExt};
use serde_json::Value;
use strum::Display;
use tracing::{debug, info, warn};
use uuid::Uuid;
use votc_config::VotcConfig;
use votc_context::{PromptKind, StaticZone};
use votc_core::{CompletionProvider, CompletionRequest, TextStream, VotcError};

use crate::governor::TurnGovernor;
use crate::sanitize::sanitize_messages;

/// Appended once after the last fragment of a cleanly completed stream.
pub const STREAM_TERMINATOR: char = '\u{4}';

/// Response header advertising the terminator.
pub const STREAM_TERMINATOR_HEADER: &str = "x-stream-terminator";

/// Value of [`STREAM_TERMINATOR_HEADER`].
pub const STREAM_TERMINATOR_NAME: &str = "eot";

/// Client-facing text for a malformed chat request.
pub const INVALID_REQUEST_MESSAGE: &str = "Invalid request format";

/// Why a request was rejected before any upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RejectReason {
    BadRequest,
    RateLimited,
    ConfigError,
}

/// Per-request relay state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Idle,
    Validating,
    Rejected(RejectReason),
    Streaming,
    Completed,
    StreamError,
    Cancelled,
}

impl RelayState {
    /// Metric / log label for terminal states.
    pub fn label(&self) -> String {
        match self {
            RelayState::Idle => "idle".into(),
            RelayState::Validating => "validating".into(),
            RelayState::Rejected(reason) => format!("rejected_{reason}"),
            RelayState::Streaming => "streaming".into(),
            RelayState::Completed => "completed".into(),
            RelayState::StreamError => "stream_error".into(),
            RelayState::Cancelled => "cancelled".into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RelayState::Rejected(_)
                | RelayState::Completed
                | RelayState::StreamError
                | RelayState::Cancelled
        )
    }

    /// Whether `self -> next` is a legal step of the request lifecycle.
    pub fn can_transition_to(&self, next: RelayState) -> bool {
        matches!(
            (self, next),
            (RelayState::Idle, RelayState::Validating)
                | (
                    RelayState::Validating,
                    RelayState::Rejected(_) | RelayState::Streaming | RelayState::StreamError
                )
                | (
                    RelayState::Streaming,
                    RelayState::Completed | RelayState::StreamError | RelayState::Cancelled
                )
        )
    }
}

fn step(request_id: &str, from: RelayState, to: RelayState) -> RelayState {
    debug_assert!(from.can_transition_to(to), "illegal relay transition {from:?} -> {to:?}");
    debug!(request_id, from = %from.label(), to = %to.label(), "relay state transition");
    to
}

/// Relays streaming completions for the game master.
pub struct CompletionRelay {
    provider: Option<Arc<dyn CompletionProvider>>,
    prompts: Arc<StaticZone>,
    governor: TurnGovernor,
    model: String,
    temperature: f32,
}

impl CompletionRelay {
    /// Creates a relay. A `None` provider means credentials are missing;
    /// every request that passes validation is then rejected as a configuration error.
    pub fn new(
        provider: Option<Arc<dyn CompletionProvider>>,
        prompts: Arc<StaticZone>,
        governor: TurnGovernor,
        model: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            provider,
            prompts,
            governor,
            model: model.into(),
            temperature,
        }
    }

    pub fn from_config(
        provider: Option<Arc<dyn CompletionProvider>>,
        prompts: Arc<StaticZone>,
        config: &VotcConfig,
    ) -> Self {
        Self::new(
            provider,
            prompts,
            TurnGovernor::new(&config.conversation),
            config.completion.model.clone(),
            config.completion.temperature,
        )
    }

    pub fn governor(&self) -> &TurnGovernor {
        &self.governor
    }

    /// Starts relaying a completion for the raw `messages` value of a chat request.
    ///
    /// Returns `Err` for rejections and for upstream failures before the
    /// first fragment. The returned stream already holds the first fragment.
    pub async fn start(&self, raw_messages: Option<&Value>) -> Result<RelayStream, VotcError> {
        let request_id = Uuid::new_v4().to_string();
        step(&request_id, RelayState::Idle, RelayState::Validating);

        let Some(entries) = raw_messages.and_then(Value::as_array) else {
            return Err(reject(
                &request_id,
                RejectReason::BadRequest,
                VotcError::Validation(INVALID_REQUEST_MESSAGE.to_string()),
            ));
        };

        let messages = sanitize_messages(entries);
        debug!(
            %request_id,
            received = entries.len(),
            kept = messages.len(),
            "sanitized chat messages"
        );

        let decision = self
            .governor
            .decide(&messages)
            .map_err(|e| reject(&request_id, RejectReason::RateLimited, e))?;

        let Some(provider) = self.provider.as_ref() else {
            return Err(reject(
                &request_id,
                RejectReason::ConfigError,
                VotcError::Config("completion credentials are not configured".into()),
            ));
        };

        let request = CompletionRequest {
            model: self.model.clone(),
            system: self.prompts.prompt(decision.kind).to_string(),
            messages,
            max_tokens: decision.max_tokens,
            temperature: self.temperature,
        };

        info!(
            %request_id,
            provider = provider.name(),
            model = %request.model,
            prompt = %decision.kind,
            max_tokens = decision.max_tokens,
            user_turns = decision.user_turns,
            "starting completion stream"
        );

        let started = Instant::now();
        let mut upstream = match provider.stream(request).await {
            Ok(stream) => stream,
            Err(e) => return Err(fail_before_first(&request_id, decision.kind, started, e)),
        };

        // Peek the first fragment so an upstream failure can still become a
        // JSON error response before any body byte is committed.
        let (pending, inner) = match upstream.next().await {
            Some(Ok(text)) => (Some(text), Some(upstream)),
            Some(Err(e)) => return Err(fail_before_first(&request_id, decision.kind, started, e)),
            None => (None, None),
        };

        Ok(RelayStream {
            request_id: request_id.clone(),
            inner,
            pending,
            state: step(&request_id, RelayState::Validating, RelayState::Streaming),
            kind: decision.kind,
            started,
            fragments: 0,
        })
    }
}

fn reject(request_id: &str, reason: RejectReason, err: VotcError) -> VotcError {
    let state = RelayState::Rejected(reason);
    warn!(request_id, state = %state.label(), error = %err, "chat request rejected");
    votc_prometheus::record_chat_outcome(&state.label());
    err
}

fn fail_before_first(
    request_id: &str,
    kind: PromptKind,
    started: Instant,
    err: VotcError,
) -> VotcError {
    let state = RelayState::StreamError;
    warn!(
        request_id,
        state = %state.label(),
        prompt = %kind,
        fragments = 0,
        error = %err,
        "completion stream failed before first fragment"
    );
    votc_prometheus::record_chat_outcome(&state.label());
    votc_prometheus::record_stream_duration(started.elapsed().as_secs_f64());
    err
}

/// The relayed body stream. Yields fragments with any terminator removed, then the terminator
/// on a clean end. Dropping it while streaming abandons the upstream call.
pub struct RelayStream {
    request_id: String,
    inner: Option<TextStream>,
    pending: Option<String>,
    state: RelayState,
    kind: PromptKind,
    started: Instant,
    fragments: u64,
}

impl RelayStream {
    /// Correlates this stream's log lines.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    pub fn prompt_kind(&self) -> PromptKind {
        self.kind
    }

    fn finish(&mut self, state: RelayState, error: Option<&VotcError>) {
        self.state = step(&self.request_id, self.state, state);
        self.inner = None;
        let elapsed = self.started.elapsed();
        match error {
            Some(e) => warn!(
                request_id = %self.request_id,
                state = %state.label(),
                fragments = self.fragments,
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "completion stream ended with error"
            ),
            None => info!(
                request_id = %self.request_id,
                state = %state.label(),
                fragments = self.fragments,
                elapsed_ms = elapsed.as_millis() as u64,
                "completion stream ended"
            ),
        }
        votc_prometheus::record_chat_outcome(&state.label());
        votc_prometheus::record_fragments(self.fragments);
        votc_prometheus::record_stream_duration(elapsed.as_secs_f64());
    }
}

impl Stream for RelayStream {
    type Item = Result<String, Infallible>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if let Some(first) = this.pending.take() {
            this.fragments += 1;
            return Poll::Ready(Some(Ok(scrub(first))));
        }

        if this.state != RelayState::Streaming {
            return Poll::Ready(None);
        }

        let Some(inner) = this.inner.as_mut() else {
            this.finish(RelayState::Completed, None);
            return Poll::Ready(Some(Ok(STREAM_TERMINATOR.to_string())));
        };

        match inner.as_mut().poll_next(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(Ok(text))) => {
                this.fragments += 1;
                Poll::Ready(Some(Ok(scrub(text))))
            }
            Poll::Ready(Some(Err(e))) => {
                this.finish(RelayState::StreamError, Some(&e));
                Poll::Ready(None)
            }
            Poll::Ready(None) => {
                this.finish(RelayState::Completed, None);
                Poll::Ready(Some(Ok(STREAM_TERMINATOR.to_string())))
            }
        }
    }
}

fn scrub(text: String) -> String {
    if text.contains(STREAM_TERMINATOR) {
        text.replace(STREAM_TERMINATOR, "")
    } else {
        text
    }
}

impl Drop for RelayStream {
    fn drop(&mut self) {
        if self.state == RelayState::Streaming {
            self.finish(RelayState::Cancelled, None);
        }
    }
}

impl std::fmt::Debug for RelayStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayStream")
            .field("request_id", &self.request_id)
            .field("state", &self.state)
            .field("kind", &self.kind)
            .field("fragments", &self.fragments)
            .finish_non_exhaustive()
    }
}
