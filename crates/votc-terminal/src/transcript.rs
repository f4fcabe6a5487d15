// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only transcript model.
//!
//! [`apply`] is a pure reducer: it never mutates its input and returns the
//! next transcript. [`render`] projects a transcript to display lines.

use std::fmt;

/// Who a transcript line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
    System,
    Error,
}

impl Speaker {
    /// Prompt marker shown before the line.
    pub fn marker(&self) -> char {
        match self {
            Speaker::User => '>',
            Speaker::Assistant => '$',
            Speaker::System | Speaker::Error => '!',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub speaker: Speaker,
    pub text: String,
    /// The assistant line still receiving fragments.
    pub streaming: bool,
    /// The stream feeding this line ended without its terminator.
    pub interrupted: bool,
}

impl Line {
    fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
            streaming: false,
            interrupted: false,
        }
    }
}

/// Events the reducer understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEvent {
    User(String),
    System(String),
    Error(String),
    /// Appends to the open assistant line, opening one if needed.
    Fragment(String),
    /// Closes the open assistant line, if any.
    StreamEnded { interrupted: bool },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    lines: Vec<Line>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The assistant line currently receiving fragments.
    pub fn streaming_line(&self) -> Option<&Line> {
        self.lines.last().filter(|l| l.streaming)
    }
}

/// Returns the transcript that results from applying `event` to `transcript`.
pub fn apply(transcript: &Transcript, event: TranscriptEvent) -> Transcript {
    let mut lines = transcript.lines.clone();
    match event {
        TranscriptEvent::User(text) => lines.push(Line::new(Speaker::User, text)),
        TranscriptEvent::System(text) => lines.push(Line::new(Speaker::System, text)),
        TranscriptEvent::Error(text) => lines.push(Line::new(Speaker::Error, text)),
        TranscriptEvent::Fragment(text) => match lines.last_mut() {
            Some(line) if line.streaming => line.text.push_str(&text),
            _ => lines.push(Line {
                streaming: true,
                ..Line::new(Speaker::Assistant, text)
            }),
        },
        TranscriptEvent::StreamEnded { interrupted } => {
            if let Some(line) = lines.last_mut().filter(|l| l.streaming) {
                line.streaming = false;
                line.interrupted = interrupted;
            }
        }
    }
    Transcript { lines }
}

/// One display line of the projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    /// Index into [`Transcript::lines`].
    pub index: usize,
    pub marker: char,
    pub text: String,
    /// User and assistant lines can be picked as an export excerpt.
    pub selectable: bool,
    pub interrupted: bool,
}

impl fmt::Display for RenderedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.marker, self.text)?;
        if self.interrupted {
            write!(f, " [interrupted]")?;
        }
        Ok(())
    }
}

/// Pure projection of a transcript to display lines.
pub fn render(transcript: &Transcript) -> Vec<RenderedLine> {
    transcript
        .lines
        .iter()
        .enumerate()
        .map(|(index, line)| RenderedLine {
            index,
            marker: line.speaker.marker(),
            text: line.text.clone(),
            selectable: matches!(line.speaker, Speaker::User | Speaker::Assistant),
            interrupted: line.interrupted,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragments(t: &Transcript, parts: &[&str]) -> Transcript {
        parts.iter().fold(t.clone(), |acc, p| {
            apply(&acc, TranscriptEvent::Fragment((*p).to_string()))
        })
    }

    #[test]
    fn fragments_grow_a_single_assistant_line() {
        let t = apply(&Transcript::new(), TranscriptEvent::User("hello".into()));
        let t = fragments(&t, &["Wh", "at d", "o you see?"]);
        let t = apply(&t, TranscriptEvent::StreamEnded { interrupted: false });

        let rendered = render(&t);
        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered[0].to_string(), "> hello");
        assert_eq!(rendered[1].to_string(), "$ What do you see?");
        assert!(t.streaming_line().is_none());
    }

    #[test]
    fn apply_leaves_input_untouched() {
        let before = fragments(&Transcript::new(), &["a"]);
        let after = apply(&before, TranscriptEvent::Fragment("b".into()));
        assert_eq!(before.lines()[0].text, "a");
        assert_eq!(after.lines()[0].text, "ab");
    }

    #[test]
    fn interrupted_line_is_flagged() {
        let t = fragments(&Transcript::new(), &["partial"]);
        let t = apply(&t, TranscriptEvent::StreamEnded { interrupted: true });
        let line = &render(&t)[0];
        assert!(line.interrupted);
        assert_eq!(line.to_string(), "$ partial [interrupted]");
    }

    #[test]
    fn new_stream_opens_a_new_line() {
        let t = fragments(&Transcript::new(), &["one"]);
        let t = apply(&t, TranscriptEvent::StreamEnded { interrupted: false });
        let t = fragments(&t, &["two"]);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn system_and_error_lines_are_not_selectable() {
        let t = apply(&Transcript::new(), TranscriptEvent::System("[2 exchanges remaining]".into()));
        let t = apply(&t, TranscriptEvent::Error("Connection error. Please try again.".into()));
        let rendered = render(&t);
        assert!(rendered.iter().all(|l| l.marker == '!' && !l.selectable));
    }
}
