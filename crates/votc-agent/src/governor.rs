// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn governor: enforces the user-turn ceiling and selects the prompt and
//! token budget for the next response.
//!
//! The ceiling is recomputed from the submitted history on every request.
//! No per-client state is kept.

use votc_config::model::ConversationConfig;
use votc_context::PromptKind;
use votc_core::{Message, Role, VotcError};

/// Client-facing text returned when the ceiling is exceeded.
pub const TURN_LIMIT_MESSAGE: &str = "Conversation limit reached. Please start a new session.";

/// Outcome of governing one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnDecision {
    pub kind: PromptKind,
    pub max_tokens: u32,
    pub user_turns: usize,
}

#[derive(Debug, Clone)]
pub struct TurnGovernor {
    max_user_turns: usize,
    welcome_max_tokens: u32,
    probe_max_tokens: u32,
}

impl TurnGovernor {
    pub fn new(config: &ConversationConfig) -> Self {
        Self {
            max_user_turns: config.max_user_turns,
            welcome_max_tokens: config.welcome_max_tokens,
            probe_max_tokens: config.probe_max_tokens,
        }
    }

    pub fn max_user_turns(&self) -> usize {
        self.max_user_turns
    }

    /// Decides Welcome vs Probe for a sanitized conversation.
    ///
    /// Welcome applies only when the conversation is exactly one user message.
    /// More than `max_user_turns` user messages is rejected as rate limited.
    pub fn decide(&self, messages: &[Message]) -> Result<TurnDecision, VotcError> {
        let user_turns = messages.iter().filter(|m| m.role() == Role::User).count();
        if user_turns > self.max_user_turns {
            return Err(VotcError::RateLimited(TURN_LIMIT_MESSAGE.to_string()));
        }

        let kind = if user_turns == 1 && messages.len() == 1 {
            PromptKind::Welcome
        } else {
            PromptKind::Probe
        };
        let max_tokens = match kind {
            PromptKind::Welcome => self.welcome_max_tokens,
            PromptKind::Probe => self.probe_max_tokens,
        };

        Ok(TurnDecision {
            kind,
            max_tokens,
            user_turns,
        })
    }
}

impl Default for TurnGovernor {
    fn default() -> Self {
        Self::new(&ConversationConfig::default())
    }
}
