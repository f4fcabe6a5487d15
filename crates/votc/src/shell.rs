// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `votc shell` command implementation.
//!
//! An interactive REPL over [`votc_terminal`]: lines typed at the prompt are
//! sent to the relay and the reply is printed as it streams. Slash commands
//! select transcript lines and export them.

use std::io::Write;
use std::time::Instant;

use chrono::Utc;
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;
use votc_config::VotcConfig;
use votc_core::VotcError;
use votc_terminal::{ChatSession, RelayClient, Speaker, Transcript, render, submit_turn};

/// A parsed line of REPL input.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Say(&'a str),
    Lines,
    Select(usize),
    Export { full: bool },
    Help,
    Quit,
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    fn parse(input: &'a str) -> Self {
        let Some(rest) = input.strip_prefix('/') else {
            return Command::Say(input);
        };
        let mut parts = rest.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("quit" | "exit"), None) => Command::Quit,
            (Some("help"), None) => Command::Help,
            (Some("lines"), None) => Command::Lines,
            (Some("select"), Some(n)) => n.parse().map_or(Command::Unknown(input), Command::Select),
            (Some("export"), None) => Command::Export { full: false },
            (Some("export"), Some("all")) => Command::Export { full: true },
            _ => Command::Unknown(input),
        }
    }
}

/// Prints transcript lines as they appear, and the open line as it grows.
#[derive(Default)]
struct Printer {
    printed: usize,
    partial: usize,
}

impl Printer {
    fn sync(&mut self, transcript: &Transcript) {
        let lines = transcript.lines();
        let mut out = std::io::stdout().lock();
        while let Some(line) = lines.get(self.printed) {
            if self.partial == 0 {
                let marker = line.speaker.marker().to_string();
                let marker = match line.speaker {
                    Speaker::User => marker.cyan(),
                    Speaker::Assistant => marker.green(),
                    Speaker::System => marker.yellow(),
                    Speaker::Error => marker.red(),
                };
                let _ = write!(out, "{marker} ");
            }
            let _ = write!(out, "{}", line.text.get(self.partial..).unwrap_or_default());
            if line.streaming {
                self.partial = line.text.len();
                break;
            }
            if line.interrupted {
                let _ = write!(out, " {}", "[interrupted]".dimmed());
            }
            let _ = writeln!(out);
            self.printed += 1;
            self.partial = 0;
        }
        let _ = out.flush();
    }
}

/// Runs the `votc shell` REPL against the relay at `url`.
pub async fn run_shell(config: &VotcConfig, url: Option<String>) -> Result<(), VotcError> {
    let base =
        url.unwrap_or_else(|| format!("http://{}:{}", config.server.host, config.server.port));
    let client = RelayClient::new(&base).map_err(|e| VotcError::Config(e.to_string()))?;
    let mut session = ChatSession::new(config.conversation.max_user_turns);

    let mut rl = DefaultEditor::new()
        .map_err(|e| VotcError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "votc shell".bold().green());
    println!("Relay: {}. Type {} for commands.\n", client.base_url(), "/help".yellow());

    let mut printer = Printer::default();
    printer.sync(session.transcript());

    loop {
        let prompt = match session.notice(Instant::now()) {
            Some(notice) => format!("{} > ", notice.text.dimmed()),
            None => "> ".to_string(),
        };
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                match Command::parse(trimmed) {
                    Command::Quit => break,
                    Command::Help => print_help(),
                    Command::Lines => list_lines(&session),
                    Command::Select(index) => match session.select(index) {
                        Some(line) => println!("{} {}", "selected:".dimmed(), line.text),
                        None => eprintln!("{}: line {index} cannot be selected", "error".red()),
                    },
                    Command::Export { full } => {
                        export(&mut rl, &mut session, &client, full).await;
                        printer.sync(session.transcript());
                    }
                    Command::Unknown(input) => {
                        eprintln!("{}: unknown command {input}; try /help", "error".red())
                    }
                    Command::Say(text) => {
                        let result = submit_turn(&mut session, &client, text, |s| {
                            printer.sync(s.transcript())
                        })
                        .await;
                        if let Err(refusal) = result {
                            debug!(%refusal, "turn not sent");
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    println!("{}", "goodbye".dimmed());
    Ok(())
}

fn print_help() {
    println!("  {:<16} list selectable lines", "/lines");
    println!("  {:<16} pick a line as the export excerpt", "/select N");
    println!("  {:<16} export the selected line as an idea", "/export");
    println!("  {:<16} export the whole conversation", "/export all");
    println!("  {:<16} leave", "/quit");
}

fn list_lines(session: &ChatSession) {
    let selected = session.selection().map(|l| l.text.as_str());
    for line in render(session.transcript()).iter().filter(|l| l.selectable) {
        let mark = if selected == Some(line.text.as_str()) { "*" } else { " " };
        println!("{mark}{:>3}  {line}", line.index);
    }
}

/// Opens a preview, lets the user send, edit, or cancel it, then exports.
async fn export(
    rl: &mut DefaultEditor,
    session: &mut ChatSession,
    client: &RelayClient,
    full: bool,
) {
    let now = Utc::now();
    let opened = if full {
        session.preview_conversation(now).is_some()
    } else {
        session.preview_selection(now).is_some()
    };
    if !opened {
        let hint = if full {
            "nothing to export yet"
        } else {
            "select a line first with /select N (see /lines)"
        };
        eprintln!("{}: {hint}", "error".red());
        return;
    }

    loop {
        let document = match session.preview() {
            Some(preview) => preview.document.clone(),
            None => return,
        };
        println!("{}", "----- preview -----".dimmed());
        println!("{document}");
        println!("{}", "-------------------".dimmed());

        match rl.readline("[s]end, [e]dit, [c]ancel? ") {
            Ok(answer) => match answer.trim() {
                "s" | "send" => break,
                "e" | "edit" => match edit_in_editor(&document) {
                    Ok(edited) => {
                        session.edit_preview(edited);
                    }
                    Err(e) => eprintln!("{}: editor failed: {e}", "error".red()),
                },
                "c" | "cancel" => {
                    session.take_preview();
                    return;
                }
                _ => {}
            },
            Err(_) => {
                session.take_preview();
                return;
            }
        }
    }

    let Some(preview) = session.take_preview() else {
        return;
    };
    match client.export(&preview).await {
        Ok(link) => {
            println!("{} {}", "exported:".green(), link.url);
            session.export_succeeded(&link.url, Instant::now());
        }
        Err(e) => session.export_failed(&e.to_string()),
    }
}

/// Round-trips `document` through `$VISUAL` or `$EDITOR` (default `vi`).
fn edit_in_editor(document: &str) -> std::io::Result<String> {
    let mut file = tempfile::Builder::new()
        .prefix("votc-export-")
        .suffix(".md")
        .tempfile()?;
    file.write_all(document.as_bytes())?;
    file.flush()?;

    let editor = std::env::var("VISUAL")
        .or_else(|_| std::env::var("EDITOR"))
        .unwrap_or_else(|_| "vi".to_string());
    let mut words = editor.split_whitespace();
    let program = words.next().unwrap_or("vi");
    let status = std::process::Command::new(program)
        .args(words)
        .arg(file.path())
        .status()?;
    if !status.success() {
        return Err(std::io::Error::other(format!("{program} exited with {status}")));
    }
    std::fs::read_to_string(file.path())
}
