// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `votc doctor` command implementation.
//!
//! Runs diagnostic checks against the configuration, credentials, and the
//! collaborators they unlock.

use std::io::IsTerminal;
use std::path::Path;
use std::time::{Duration, Instant};

use colored::Colorize;
use votc_config::{ConfigError, Credentials, VotcConfig};
use votc_core::{HealthStatus, PluginAdapter, VotcError};
use votc_github::GithubRepository;
use votc_sheets::SheetsWaitlist;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: &'static str,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &'static str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name,
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Runs every check and prints a report.
pub async fn run_doctor(config: &VotcConfig, plain: bool) -> Result<(), VotcError> {
    let use_color = !plain && std::io::stdout().is_terminal();
    let credentials = Credentials::from_config(config);

    let results = vec![
        check_completion_key(&credentials),
        check_repository(config, &credentials).await,
        check_waitlist(config, &credentials),
        check_notes(config),
        check_health_endpoint(config).await,
    ];

    println!();
    println!("  votc doctor");
    println!("  {}", "-".repeat(50));

    for result in &results {
        println!("{}", format_line(result, use_color));
    }
    println!();

    let issues = results
        .iter()
        .filter(|r| r.status != CheckStatus::Pass)
        .count();
    match issues {
        0 => println!("  All checks passed."),
        1 => println!("  1 issue found."),
        n => println!("  {n} issues found."),
    }
    println!();

    Ok(())
}

fn format_line(result: &CheckResult, use_color: bool) -> String {
    let ms = result.duration.as_millis();
    if use_color {
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green(), result.message.normal()),
            CheckStatus::Warn => ("!".yellow(), result.message.yellow()),
            CheckStatus::Fail => ("✗".red(), result.message.red()),
        };
        format!("    {symbol} {:<20} {message} ({ms}ms)", result.name)
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!("    {tag} {:<20} {} ({ms}ms)", result.name, result.message)
    }
}

fn check_completion_key(credentials: &Credentials) -> CheckResult {
    let start = Instant::now();
    const NAME: &str = "Completion key";
    if credentials.completion_key.is_none() {
        return CheckResult::new(NAME, CheckStatus::Fail, "missing; /chat is unavailable", start);
    }
    let malformed = credentials
        .warnings()
        .into_iter()
        .find(|w| matches!(w, ConfigError::MalformedCredential { key, .. } if key == "completion.api_key"));
    match malformed {
        Some(warning) => CheckResult::new(NAME, CheckStatus::Warn, warning.to_string(), start),
        None => CheckResult::new(NAME, CheckStatus::Pass, "set", start),
    }
}

async fn check_repository(config: &VotcConfig, credentials: &Credentials) -> CheckResult {
    let start = Instant::now();
    const NAME: &str = "Repository";
    let Some(token) = credentials.github_token.as_ref() else {
        return CheckResult::new(NAME, CheckStatus::Warn, "no token; /export is unavailable", start);
    };
    let repo = match GithubRepository::new(&config.github, token) {
        Ok(repo) => repo,
        Err(e) => return CheckResult::new(NAME, CheckStatus::Fail, e.to_string(), start),
    };
    match repo.health_check().await {
        Ok(HealthStatus::Healthy) => CheckResult::new(
            NAME,
            CheckStatus::Pass,
            format!("{}/{} reachable", config.github.owner, config.github.repo),
            start,
        ),
        Ok(HealthStatus::Degraded(msg)) => CheckResult::new(NAME, CheckStatus::Warn, msg, start),
        Ok(HealthStatus::Unhealthy(msg)) => CheckResult::new(NAME, CheckStatus::Fail, msg, start),
        Err(e) => CheckResult::new(NAME, CheckStatus::Fail, e.to_string(), start),
    }
}

fn check_waitlist(config: &VotcConfig, credentials: &Credentials) -> CheckResult {
    let start = Instant::now();
    const NAME: &str = "Waitlist sheet";
    let Some(account) = credentials.service_account.as_ref() else {
        return CheckResult::new(
            NAME,
            CheckStatus::Warn,
            "no service account; /waitlist is unavailable",
            start,
        );
    };
    match SheetsWaitlist::new(&config.sheets, account) {
        Ok(_) => CheckResult::new(NAME, CheckStatus::Pass, "service account usable", start),
        Err(e) => CheckResult::new(NAME, CheckStatus::Fail, e.to_string(), start),
    }
}

fn check_notes(config: &VotcConfig) -> CheckResult {
    let start = Instant::now();
    const NAME: &str = "Internal notes";
    match config.conversation.internal_notes_file.as_deref() {
        None => CheckResult::new(NAME, CheckStatus::Pass, "not configured", start),
        Some(path) if Path::new(path).is_file() => {
            CheckResult::new(NAME, CheckStatus::Pass, format!("found: {path}"), start)
        }
        Some(path) => CheckResult::new(
            NAME,
            CheckStatus::Warn,
            format!("not found: {path} (prompts are built without notes)"),
            start,
        ),
    }
}

async fn check_health_endpoint(config: &VotcConfig) -> CheckResult {
    let start = Instant::now();
    const NAME: &str = "Health endpoint";
    let url = format!("http://{}:{}/health", config.server.host, config.server.port);

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(3))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            return CheckResult::new(NAME, CheckStatus::Fail, format!("HTTP client error: {e}"), start);
        }
    };

    match client.get(&url).send().await {
        Ok(resp) if resp.status().is_success() => {
            CheckResult::new(NAME, CheckStatus::Pass, "reachable", start)
        }
        Ok(resp) => CheckResult::new(NAME, CheckStatus::Warn, format!("status {}", resp.status()), start),
        Err(_) => CheckResult::new(
            NAME,
            CheckStatus::Warn,
            format!("not reachable at {url} (server may not be running)"),
            start,
        ),
    }
}
