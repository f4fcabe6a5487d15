// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Markdown documents written by transcript exports.
//!
//! Both the server (excerpt exports) and the terminal client (previews and
//! full-chat exports) render through these functions.

use chrono::{DateTime, Utc};
use votc_core::{Message, Role};

const SOURCE: &str = "Valley of the Commons Game Master Dialogue";
const FOOTER: &str = "*Generated from game master conversation*";

/// Game-design vocabulary used when no themes are supplied.
pub const THEME_VOCABULARY: &[&str] = &[
    "tool",
    "rule",
    "quest",
    "place",
    "path",
    "myth",
    "map",
    "card",
    "ritual",
    "commons",
    "village",
    "community",
];

/// Human-readable export date, e.g. `March 1, 2026, 09:30 AM UTC`.
pub fn display_date(now: DateTime<Utc>) -> String {
    now.format("%B %-d, %Y, %I:%M %p UTC").to_string()
}

/// Renders the idea document for a selected excerpt.
pub fn render_idea(excerpt: &str, themes: &[String], now: DateTime<Utc>) -> String {
    let mut doc = format!(
        "# Idea: [Auto-generated from conversation]\n\n\
         **Source:** {SOURCE}  \n\
         **Date:** {date}  \n\
         **Excerpt:**\n\n\
         {excerpt}\n\n",
        date = display_date(now),
    );

    if !themes.is_empty() {
        doc.push_str(&format!("**Themes:** {}\n\n", themes.join(", ")));
    }

    doc.push_str(
        "---\n\n\
         **Context:** This idea emerged from a Socratic dialogue about game design in the Valley of the Commons.\n\n\
         **Next Steps:**\n\
         - [ ] Refine this idea\n\
         - [ ] Connect to other ideas\n\
         - [ ] Propose as a tool/rule/quest\n\n\
         ---\n\n",
    );
    doc.push_str(FOOTER);
    doc
}

/// Renders the full-conversation document.
pub fn render_conversation(messages: &[Message], now: DateTime<Utc>) -> String {
    let exchanges = messages.iter().filter(|m| m.role() == Role::User).count();
    let mut doc = format!(
        "# Conversation: {SOURCE}\n\n\
         **Source:** {SOURCE}  \n\
         **Date:** {date}  \n\
         **Exchanges:** {exchanges}\n\n\
         ---\n\n",
        date = display_date(now),
    );

    for message in messages {
        let speaker = match message.role() {
            Role::User => "You",
            Role::Assistant => "Game Master",
        };
        doc.push_str(&format!("**{speaker}:** {}\n\n", message.content()));
    }

    doc.push_str("---\n\n");
    doc.push_str(FOOTER);
    doc
}

/// Themes found in `text` from [`THEME_VOCABULARY`], in vocabulary order.
///
/// A term matches a whole word, case-insensitively, in singular or plural form.
pub fn extract_themes(text: &str) -> Vec<String> {
    let words: Vec<String> = text
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();

    THEME_VOCABULARY
        .iter()
        .copied()
        .filter(|term| {
            words
                .iter()
                .any(|w| w == term || w.strip_suffix('s') == Some(*term))
        })
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 5).unwrap()
    }

    #[test]
    fn display_date_format() {
        assert_eq!(display_date(fixed_now()), "March 1, 2026, 09:30 AM UTC");
    }

    #[test]
    fn idea_contains_excerpt_and_checklist() {
        let doc = render_idea("Maps could be rituals.", &[], fixed_now());
        assert!(doc.starts_with("# Idea: [Auto-generated from conversation]"));
        assert!(doc.contains("**Source:** Valley of the Commons Game Master Dialogue"));
        assert!(doc.contains("\n\nMaps could be rituals.\n\n"));
        assert!(doc.contains("- [ ] Propose as a tool/rule/quest"));
        assert!(doc.ends_with(FOOTER));
        assert!(!doc.contains("**Themes:**"));
    }

    #[test]
    fn idea_lists_themes_when_present() {
        let themes = vec!["map".to_string(), "ritual".to_string()];
        let doc = render_idea("x", &themes, fixed_now());
        assert!(doc.contains("**Themes:** map, ritual\n"));
    }

    #[test]
    fn conversation_renders_speakers_in_order() {
        let messages = vec![
            Message::user("hello"),
            Message::assistant("What do you see?"),
            Message::user("a river"),
        ];
        let doc = render_conversation(&messages, fixed_now());
        assert!(doc.contains("**Exchanges:** 2"));
        let you = doc.find("**You:** hello").unwrap();
        let gm = doc.find("**Game Master:** What do you see?").unwrap();
        let river = doc.find("**You:** a river").unwrap();
        assert!(you < gm && gm < river);
    }

    #[test]
    fn themes_match_whole_words_and_plurals() {
        let themes = extract_themes("New Quests, a shared MAP, and mapping tools.");
        assert_eq!(themes, vec!["tool", "quest", "map"]);
    }

    #[test]
    fn no_themes_in_unrelated_text() {
        assert!(extract_themes("the weather is nice").is_empty());
    }
}
