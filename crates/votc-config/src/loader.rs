// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./votc.toml` > `~/.config/votc/votc.toml` > `/etc/votc/votc.toml`
//! with environment variable overrides via the `VOTC_` prefix, followed by the
//! legacy deployment variable names (`GAME_MODEL`, `GITHUB_TOKEN`, ...).

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::VotcConfig;

/// Legacy environment variable names and the dotted config keys they set.
///
/// Values are taken verbatim (no type coercion), so a JSON credential blob in
/// `GOOGLE_SERVICE_ACCOUNT` arrives as a string. Empty values are ignored.
pub const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("AI_GATEWAY_API_KEY", "completion.api_key"),
    ("GAME_INTELLIGENCE", "completion.alias_api_key"),
    ("GAME_MODEL", "completion.model"),
    ("GITHUB_TOKEN", "github.token"),
    ("GITHUB_OWNER", "github.owner"),
    ("GITHUB_REPO", "github.repo"),
    ("GITHUB_BRANCH", "github.branch"),
    ("GITHUB_PATH", "github.ideas_path"),
    ("GITHUB_CONVERSATIONS_PATH", "github.conversations_path"),
    ("GOOGLE_SERVICE_ACCOUNT", "sheets.service_account"),
    ("GOOGLE_SHEET_ID", "sheets.sheet_id"),
    ("GOOGLE_SHEET_NAME", "sheets.sheet_name"),
    ("NODE_ENV", "server.environment"),
    ("VOTC_SHEETS_SERVICE_ACCOUNT", "sheets.service_account"),
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/votc/votc.toml` (system-wide)
/// 3. `~/.config/votc/votc.toml` (user XDG config)
/// 4. `./votc.toml` (local directory)
/// 5. `VOTC_*` environment variables
/// 6. Legacy deployment variables ([`LEGACY_ENV_KEYS`])
pub fn load_config() -> Result<VotcConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<VotcConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VotcConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<VotcConfig, figment::Error> {
    with_env(
        Figment::new()
            .merge(Serialized::defaults(VotcConfig::default()))
            .merge(Toml::file(path)),
    )
    .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    with_env(
        Figment::new()
            .merge(Serialized::defaults(VotcConfig::default()))
            .merge(Toml::file("/etc/votc/votc.toml"))
            .merge(Toml::file(
                dirs::config_dir()
                    .map(|d| d.join("votc/votc.toml"))
                    .unwrap_or_default(),
            ))
            .merge(Toml::file("votc.toml")),
    )
}

fn with_env(figment: Figment) -> Figment {
    let mut figment = figment.merge(env_provider());
    for (var, key) in LEGACY_ENV_KEYS {
        match std::env::var(var) {
            Ok(value) if !value.trim().is_empty() => {
                figment = figment.merge(Serialized::default(key, value));
            }
            _ => {}
        }
    }
    figment
}

/// Create the `VOTC_` environment provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `VOTC_GITHUB_IDEAS_PATH` must map to `github.ideas_path`.
/// The service account blob is excluded here since `Env` would parse it as a dict.
fn env_provider() -> Env {
    Env::prefixed("VOTC_")
        .filter(|key| !key.as_str().eq_ignore_ascii_case("sheets_service_account"))
        .map(|key| env_key_to_path(key.as_str()).into())
}

/// Map a prefix-stripped variable name such as `GITHUB_IDEAS_PATH` to its
/// dotted config path (`github.ideas_path`).
fn env_key_to_path(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in ENV_SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key
}

const ENV_SECTIONS: &[&str] = &[
    "server",
    "completion",
    "conversation",
    "github",
    "sheets",
    "metrics",
];
