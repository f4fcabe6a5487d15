// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client-side dialogue session.
//!
//! Holds the conversation sent to the relay, the displayed transcript, the
//! dialogue [`Phase`], the excerpt selection, the open export preview, and
//! transient notices. Nothing here performs I/O.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use votc_agent::ExportKind;
use votc_agent::template::{extract_themes, render_conversation, render_idea};
use votc_core::{MAX_USER_TURNS, Message};

use crate::transcript::{self, Line, Speaker, Transcript, TranscriptEvent};

/// First line shown before any turn.
pub const GREETING: &str = "Welcome to the Valley. What would you like to explore?";

/// Shown when a submission is refused at the turn ceiling.
pub const LIMIT_REACHED_MESSAGE: &str =
    "Conversation limit reached. The game master has stepped away.";

/// Shown when a stream ends without its terminator.
pub const INTERRUPTED_MESSAGE: &str = "Response interrupted.";

/// How long a notice stays visible.
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

/// The remaining-turns counter appears once this many turns are left.
const REMAINING_NOTICE_THRESHOLD: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingFirstTurn,
    InDialogue,
    LimitReached,
}

/// Why a submission was not sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Refusal {
    #[error("nothing to send")]
    Empty,
    #[error("a response is still streaming")]
    InFlight,
    #[error("conversation limit reached")]
    LimitReached,
}

/// How a turn's request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The stream ended with the terminator.
    Completed,
    /// The stream ended without the terminator. Partial text is kept.
    Interrupted,
    /// No stream was received. The text is shown as an error line.
    Failed(String),
}

/// An export document open for review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPreview {
    pub kind: ExportKind,
    pub document: String,
}

impl ExportPreview {
    /// `/export` body for the reviewed document.
    pub fn request_body(&self) -> serde_json::Value {
        serde_json::json!({
            "content": self.document,
            "isFullChat": self.kind == ExportKind::Conversation,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub expires_at: Instant,
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    conversation: Vec<Message>,
    transcript: Transcript,
    phase: Phase,
    in_flight: bool,
    user_turns: usize,
    max_turns: usize,
    selection: Option<usize>,
    preview: Option<ExportPreview>,
    notice: Option<Notice>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(MAX_USER_TURNS)
    }
}

impl ChatSession {
    /// A fresh session showing the greeting.
    pub fn new(max_turns: usize) -> Self {
        Self {
            conversation: Vec::new(),
            transcript: transcript::apply(
                &Transcript::new(),
                TranscriptEvent::System(GREETING.to_string()),
            ),
            phase: Phase::AwaitingFirstTurn,
            in_flight: false,
            user_turns: 0,
            max_turns,
            selection: None,
            preview: None,
            notice: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn user_turns(&self) -> usize {
        self.user_turns
    }

    pub fn conversation(&self) -> &[Message] {
        &self.conversation
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    fn push_line(&mut self, event: TranscriptEvent) {
        self.transcript = transcript::apply(&self.transcript, event);
    }

    /// Records the user's line and returns the conversation to send.
    ///
    /// At the ceiling the limit message is shown and nothing is sent.
    pub fn begin_turn(&mut self, input: &str) -> Result<Vec<Message>, Refusal> {
        let text = input.trim();
        if text.is_empty() {
            return Err(Refusal::Empty);
        }
        if self.in_flight {
            return Err(Refusal::InFlight);
        }
        if self.phase == Phase::LimitReached || self.user_turns >= self.max_turns {
            self.phase = Phase::LimitReached;
            self.push_line(TranscriptEvent::System(LIMIT_REACHED_MESSAGE.to_string()));
            return Err(Refusal::LimitReached);
        }

        self.conversation.push(Message::user(text));
        self.push_line(TranscriptEvent::User(text.to_string()));
        self.user_turns += 1;
        self.in_flight = true;
        self.phase = Phase::InDialogue;
        Ok(self.conversation.clone())
    }

    /// Appends streamed text to the open assistant line.
    pub fn push_fragment(&mut self, text: &str) {
        if self.in_flight && !text.is_empty() {
            self.push_line(TranscriptEvent::Fragment(text.to_string()));
        }
    }

    /// Closes the in-flight turn.
    ///
    /// Assistant text received so far joins the conversation, including
    /// partial text from an interrupted stream. The user's line stays in
    /// history on failure.
    pub fn finish_turn(&mut self, outcome: TurnOutcome) {
        if !self.in_flight {
            return;
        }
        self.in_flight = false;

        let partial = self
            .transcript
            .streaming_line()
            .map(|line| line.text.clone())
            .unwrap_or_default();
        let interrupted = !matches!(outcome, TurnOutcome::Completed);
        self.push_line(TranscriptEvent::StreamEnded { interrupted });
        if !partial.is_empty() {
            self.conversation.push(Message::assistant(partial));
        }

        match outcome {
            TurnOutcome::Completed => {}
            TurnOutcome::Interrupted => {
                self.push_line(TranscriptEvent::Error(INTERRUPTED_MESSAGE.to_string()))
            }
            TurnOutcome::Failed(message) => self.push_line(TranscriptEvent::Error(message)),
        }

        let remaining = self.max_turns.saturating_sub(self.user_turns);
        if remaining <= REMAINING_NOTICE_THRESHOLD {
            if remaining == 0 {
                self.phase = Phase::LimitReached;
            }
            self.push_line(TranscriptEvent::System(format!(
                "[{remaining} exchanges remaining]"
            )));
        }
    }

    /// Picks a user or assistant line as the export excerpt.
    ///
    /// The latest selection wins and closes any open preview.
    pub fn select(&mut self, index: usize) -> Option<&Line> {
        let line = self.transcript.lines().get(index)?;
        if !matches!(line.speaker, Speaker::User | Speaker::Assistant) || line.streaming {
            return None;
        }
        self.selection = Some(index);
        self.preview = None;
        self.transcript.lines().get(index)
    }

    pub fn selection(&self) -> Option<&Line> {
        self.selection.and_then(|i| self.transcript.lines().get(i))
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Opens an idea preview from the selected line.
    pub fn preview_selection(&mut self, now: DateTime<Utc>) -> Option<&ExportPreview> {
        let excerpt = self.selection()?.text.clone();
        let themes = extract_themes(&excerpt);
        self.preview = Some(ExportPreview {
            kind: ExportKind::Idea,
            document: render_idea(&excerpt, &themes, now),
        });
        self.preview.as_ref()
    }

    /// Opens a preview of the whole conversation.
    pub fn preview_conversation(&mut self, now: DateTime<Utc>) -> Option<&ExportPreview> {
        if self.conversation.is_empty() {
            return None;
        }
        self.preview = Some(ExportPreview {
            kind: ExportKind::Conversation,
            document: render_conversation(&self.conversation, now),
        });
        self.preview.as_ref()
    }

    pub fn preview(&self) -> Option<&ExportPreview> {
        self.preview.as_ref()
    }

    /// Replaces the open preview's document with an edited one.
    pub fn edit_preview(&mut self, document: String) -> bool {
        match self.preview.as_mut() {
            Some(preview) => {
                preview.document = document;
                true
            }
            None => false,
        }
    }

    /// Closes the preview and hands it over for submission.
    pub fn take_preview(&mut self) -> Option<ExportPreview> {
        self.preview.take()
    }

    /// Reports a successful export as a transient notice.
    pub fn export_succeeded(&mut self, url: &str, now: Instant) {
        self.selection = None;
        self.notice = Some(Notice {
            text: format!("Exported: {url}"),
            expires_at: now + NOTICE_TTL,
        });
    }

    /// Reports a failed export inline.
    pub fn export_failed(&mut self, message: &str) {
        self.push_line(TranscriptEvent::Error(message.to_string()));
    }

    /// The notice still visible at `now`. Expired notices are dropped.
    pub fn notice(&mut self, now: Instant) -> Option<&Notice> {
        if self.notice.as_ref().is_some_and(|n| n.expires_at <= now) {
            self.notice = None;
        }
        self.notice.as_ref()
    }
}
