// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static zone: builds the Welcome and Probe system prompts once at startup,
//! interpolating the operator's internal notes when they are present.

use std::path::Path;

use strum::{Display, EnumString};
use tracing::{info, warn};
use votc_config::model::ConversationConfig;

/// Which system prompt governs a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum PromptKind {
    /// First response: sets the scene, then asks one opening question.
    Welcome,
    /// Every later response: one short open-ended question.
    Probe,
}

const WELCOME_HEAD: &str = r#"You are a game master moderator welcoming someone to the Valley of the Commons.

This is the FIRST response after the user agreed to help create a game that shapes reality.

TASK:
- Brief context-setting (2-3 sentences) introducing the Valley
- Use internal notes to paint what this game-village is becoming
- End with ONE open-ended question inviting exploration
- Do NOT respond to "yes" or "sure" - set context instead

CONTEXT: "Valley of the Commons" is a decade-long game becoming a real village in the Austrian Alps. Participants can propose tools, add rules, name places, create quests, document paths, bind myth to reality.
"#;

const WELCOME_NOTES_LABEL: &str = "INTERNAL NOTES (inform context and question):";

const WELCOME_TAIL: &str =
    "CRITICAL: Be BRIEF. Maximum 3-4 sentences total. One question at the end.";

const PROBE_HEAD: &str = r#"You are a Socratic game master moderator at the Valley of the Commons.

ROLE:
- Ask ONE brief, open-ended question (1-2 sentences MAX)
- NEVER provide answers, definitions, or solutions
- If asked for a definition, respond with a question about meaning or context
- Build on previous exchanges
- Keep responses SHORT and terminal-friendly

CONTEXT: "Valley of the Commons" is a decade-long game becoming a real village. Participants can propose tools, add rules, name places, create quests, document paths, bind myth to reality.

DESIGN PRINCIPLES (reference subtly, never lecture):
- Game as instrument for generating new operations
- Physical-digital bridge: map, cards, projections
- Community-driven: people mark places, add quests, surface tools
- Ritualistic elements: mix of mythology and real life
- Out of the box thinking: generate unconventional approaches
- Commonalization: game becomes shared resource
"#;

const PROBE_NOTES_LABEL: &str = "INTERNAL NOTES (inform questions, help participants discover):";

const PROBE_TAIL: &str =
    "CRITICAL: Be BRIEF. One question per response. Maximum 2 sentences. Probe, don't lecture.";

/// The static zone holds both system prompts, fixed for the life of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticZone {
    welcome: String,
    probe: String,
}

impl StaticZone {
    /// Loads internal notes from `config.internal_notes_file` and assembles both prompts.
    ///
    /// A missing or unreadable notes file is not an error; the prompts are
    /// built without the notes block.
    pub async fn new(config: &ConversationConfig) -> Self {
        let notes = match &config.internal_notes_file {
            Some(path) => load_notes(Path::new(path)).await,
            None => None,
        };
        Self::assemble(notes.as_deref())
    }

    /// Builds both prompts from optional notes. Blank notes count as absent.
    pub fn assemble(notes: Option<&str>) -> Self {
        let notes = notes.map(str::trim).filter(|n| !n.is_empty());
        Self {
            welcome: render(WELCOME_HEAD, WELCOME_NOTES_LABEL, notes, WELCOME_TAIL),
            probe: render(PROBE_HEAD, PROBE_NOTES_LABEL, notes, PROBE_TAIL),
        }
    }

    /// Returns the prompt text for `kind`.
    pub fn prompt(&self, kind: PromptKind) -> &str {
        match kind {
            PromptKind::Welcome => &self.welcome,
            PromptKind::Probe => &self.probe,
        }
    }

    pub fn welcome(&self) -> &str {
        &self.welcome
    }

    pub fn probe(&self) -> &str {
        &self.probe
    }
}

fn render(head: &str, label: &str, notes: Option<&str>, tail: &str) -> String {
    match notes {
        Some(notes) => format!("{head}\n{label}\n{notes}\n\n{tail}"),
        None => format!("{head}\n{tail}"),
    }
}

async fn load_notes(path: &Path) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) if !content.trim().is_empty() => {
            info!(path = %path.display(), bytes = content.len(), "loaded internal notes");
            Some(content)
        }
        Ok(_) => None,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read internal notes, continuing without");
            None
        }
    }
}
