// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! UI-independent terminal client for the votc relay.
//!
//! The session state, transcript reducer, and stream decoder contain no
//! I/O; [`client`] talks to the relay; [`submit_turn`] drives one exchange.

pub mod client;
pub mod decoder;
pub mod session;
pub mod transcript;

pub use client::{CONNECTION_ERROR_MESSAGE, ChatStream, ClientError, ExportLink, RelayClient};
pub use decoder::{StreamDecoder, StreamEnd};
pub use session::{
    ChatSession, ExportPreview, GREETING, INTERRUPTED_MESSAGE, LIMIT_REACHED_MESSAGE, NOTICE_TTL,
    Notice, Phase, Refusal, TurnOutcome,
};
pub use transcript::{Line, RenderedLine, Speaker, Transcript, TranscriptEvent, apply, render};

/// Sends one user turn and streams the reply into `session`.
///
/// `on_update` sees the session after every fragment and once after the
/// turn closes.
pub async fn submit_turn(
    session: &mut ChatSession,
    client: &RelayClient,
    input: &str,
    mut on_update: impl FnMut(&ChatSession),
) -> Result<TurnOutcome, Refusal> {
    let messages = match session.begin_turn(input) {
        Ok(messages) => messages,
        Err(refusal) => {
            on_update(session);
            return Err(refusal);
        }
    };
    on_update(session);

    let outcome = match client.chat(&messages).await {
        Ok(stream) => {
            stream
                .drive(|fragment| {
                    session.push_fragment(fragment);
                    on_update(session);
                })
                .await
        }
        Err(e) => TurnOutcome::Failed(e.to_string()),
    };

    session.finish_turn(outcome.clone());
    on_update(session);
    Ok(outcome)
}
