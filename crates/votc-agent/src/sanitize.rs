// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message sanitizer: turns an untrusted JSON message list into bounded
//! user/assistant messages.
//!
//! Rules, applied per entry in order:
//! - entries that are not objects with a string `content` are dropped;
//! - role is `assistant` only when it is literally `"assistant"`, otherwise `user`;
//! - content is cut to its first [`MAX_MESSAGE_CHARS`] characters;
//! - entries whose content is then empty are dropped.

use serde_json::Value;
use votc_core::{MAX_MESSAGE_CHARS, Message, Role};

/// Sanitizes a raw message list. Never fails; order is preserved.
pub fn sanitize_messages(entries: &[Value]) -> Vec<Message> {
    entries.iter().filter_map(sanitize_entry).collect()
}

fn sanitize_entry(entry: &Value) -> Option<Message> {
    let content = entry.get("content")?.as_str()?;
    let role = match entry.get("role").and_then(Value::as_str) {
        Some("assistant") => Role::Assistant,
        _ => Role::User,
    };

    let content = truncate_chars(content, MAX_MESSAGE_CHARS);
    if content.is_empty() {
        return None;
    }
    Some(Message::new(role, content))
}

/// First `max` characters of `s`.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
