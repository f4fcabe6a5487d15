// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Collects every violation instead of failing on the first one.

use crate::diagnostic::ConfigError;
use crate::model::VotcConfig;

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &VotcConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let host = config.server.host.trim();
    if host.is_empty() {
        fail("server.host must not be empty".to_string());
    } else if host.parse::<std::net::IpAddr>().is_err()
        && !host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        fail(format!(
            "server.host `{host}` is not a valid IP address or hostname"
        ));
    }

    if config.server.port == 0 {
        fail("server.port must be non-zero".to_string());
    }

    if config.completion.model.trim().is_empty() {
        fail("completion.model must not be empty".to_string());
    }

    if !(0.0..=2.0).contains(&config.completion.temperature) {
        fail(format!(
            "completion.temperature must be between 0.0 and 2.0, got {}",
            config.completion.temperature
        ));
    }

    if !config.completion.base_url.starts_with("http://")
        && !config.completion.base_url.starts_with("https://")
    {
        fail(format!(
            "completion.base_url `{}` must be an http(s) URL",
            config.completion.base_url
        ));
    }

    let conv = &config.conversation;
    if conv.max_user_turns == 0 {
        fail("conversation.max_user_turns must be at least 1".to_string());
    }
    if conv.welcome_max_tokens == 0 {
        fail("conversation.welcome_max_tokens must be greater than 0".to_string());
    }
    if conv.probe_max_tokens == 0 {
        fail("conversation.probe_max_tokens must be greater than 0".to_string());
    }
    if conv.welcome_max_tokens != 0 && conv.welcome_max_tokens == conv.probe_max_tokens {
        fail(format!(
            "conversation.welcome_max_tokens and conversation.probe_max_tokens must differ, both are {}",
            conv.welcome_max_tokens
        ));
    }

    for (name, value) in [
        ("github.owner", &config.github.owner),
        ("github.repo", &config.github.repo),
        ("github.branch", &config.github.branch),
        ("github.ideas_path", &config.github.ideas_path),
        ("github.conversations_path", &config.github.conversations_path),
        ("sheets.sheet_name", &config.sheets.sheet_name),
    ] {
        if value.trim().is_empty() {
            fail(format!("{name} must not be empty"));
        }
    }

    for (name, secs) in [
        ("completion.timeout_secs", config.completion.timeout_secs),
        ("github.timeout_secs", config.github.timeout_secs),
        ("sheets.timeout_secs", config.sheets.timeout_secs),
    ] {
        if secs == 0 {
            fail(format!("{name} must be greater than 0"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
