// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the votc relay.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};
use votc_core::RepositoryCoordinates;

/// Top-level votc configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with `VOTC_*` and
/// legacy environment variable overrides. Every section has defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VotcConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Completion provider (AI gateway) settings.
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Turn ceiling, token budgets, and prompt notes.
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Repository provider settings for transcript exports.
    #[serde(default)]
    pub github: GithubConfig,

    /// Spreadsheet settings for the waitlist.
    #[serde(default)]
    pub sheets: SheetsConfig,

    /// Prometheus metrics settings.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Deployment environment. Anything other than `production` exposes
    /// upstream error details in `/chat` error bodies.
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ServerConfig {
    /// Returns true when running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Completion provider configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CompletionConfig {
    /// Primary gateway API key (`AI_GATEWAY_API_KEY`).
    #[serde(default)]
    pub api_key: Option<String>,

    /// Alias key (`GAME_INTELLIGENCE`), preferred when it has the gateway key format.
    #[serde(default)]
    pub alias_api_key: Option<String>,

    /// Base URL of the OpenAI-compatible gateway.
    #[serde(default = "default_completion_base_url")]
    pub base_url: String,

    /// Model identifier routed by the gateway.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound on a single upstream request, in seconds.
    #[serde(default = "default_completion_timeout_secs")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field(
                "alias_api_key",
                &self.alias_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            alias_api_key: None,
            base_url: default_completion_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_completion_timeout_secs(),
        }
    }
}

fn default_completion_base_url() -> String {
    "https://ai-gateway.vercel.sh/v1".to_string()
}

fn default_model() -> String {
    "mistral/ministral-3b".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_completion_timeout_secs() -> u64 {
    120
}

/// Turn accounting and prompt selection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConversationConfig {
    /// Maximum number of user turns accepted per conversation.
    #[serde(default = "default_max_user_turns")]
    pub max_user_turns: usize,

    /// Output token budget for the first (welcome) response.
    #[serde(default = "default_welcome_max_tokens")]
    pub welcome_max_tokens: u32,

    /// Output token budget for every later (probe) response.
    #[serde(default = "default_probe_max_tokens")]
    pub probe_max_tokens: u32,

    /// Path to the operator's internal notes, interpolated into both prompts.
    #[serde(default = "default_internal_notes_file")]
    pub internal_notes_file: Option<String>,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_user_turns: default_max_user_turns(),
            welcome_max_tokens: default_welcome_max_tokens(),
            probe_max_tokens: default_probe_max_tokens(),
            internal_notes_file: default_internal_notes_file(),
        }
    }
}

fn default_max_user_turns() -> usize {
    votc_core::MAX_USER_TURNS
}

fn default_welcome_max_tokens() -> u32 {
    120
}

fn default_probe_max_tokens() -> u32 {
    80
}

fn default_internal_notes_file() -> Option<String> {
    Some("internal_thought.md".to_string())
}

/// Repository provider configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GithubConfig {
    /// Personal access token with contents write permission.
    #[serde(default)]
    pub token: Option<String>,

    /// Repository owner.
    #[serde(default = "default_github_owner")]
    pub owner: String,

    /// Repository name.
    #[serde(default = "default_github_repo")]
    pub repo: String,

    /// Branch files are committed to.
    #[serde(default = "default_github_branch")]
    pub branch: String,

    /// Base directory for excerpt ("idea") exports.
    #[serde(default = "default_ideas_path")]
    pub ideas_path: String,

    /// Base directory for full conversation exports.
    #[serde(default = "default_conversations_path")]
    pub conversations_path: String,

    /// GitHub REST API base URL.
    #[serde(default = "default_github_api_base_url")]
    pub api_base_url: String,

    /// Upper bound on a single repository call, in seconds.
    #[serde(default = "default_provider_timeout_secs")]
    pub timeout_secs: u64,
}

impl GithubConfig {
    /// Owner / repo / branch triple.
    pub fn coordinates(&self) -> RepositoryCoordinates {
        RepositoryCoordinates {
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            branch: self.branch.clone(),
        }
    }
}

impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("token", &self.token.as_ref().map(|_| "[redacted]"))
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("ideas_path", &self.ideas_path)
            .field("conversations_path", &self.conversations_path)
            .field("api_base_url", &self.api_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: None,
            owner: default_github_owner(),
            repo: default_github_repo(),
            branch: default_github_branch(),
            ideas_path: default_ideas_path(),
            conversations_path: default_conversations_path(),
            api_base_url: default_github_api_base_url(),
            timeout_secs: default_provider_timeout_secs(),
        }
    }
}

fn default_github_owner() -> String {
    "understories".to_string()
}

fn default_github_repo() -> String {
    "votc".to_string()
}

fn default_github_branch() -> String {
    "main".to_string()
}

fn default_ideas_path() -> String {
    "build_game/ideas".to_string()
}

fn default_conversations_path() -> String {
    "build_game/conversations".to_string()
}

fn default_github_api_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_provider_timeout_secs() -> u64 {
    15
}

/// Spreadsheet (waitlist) configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SheetsConfig {
    /// Service account credential JSON blob.
    #[serde(default)]
    pub service_account: Option<String>,

    /// Spreadsheet identifier.
    #[serde(default)]
    pub sheet_id: Option<String>,

    /// Tab the rows are appended to.
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,

    /// Sheets REST API base URL.
    #[serde(default = "default_sheets_api_base_url")]
    pub api_base_url: String,

    /// Upper bound on a single spreadsheet call, in seconds.
    #[serde(default = "default_provider_timeout_secs")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for SheetsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsConfig")
            .field(
                "service_account",
                &self.service_account.as_ref().map(|_| "[redacted]"),
            )
            .field("sheet_id", &self.sheet_id)
            .field("sheet_name", &self.sheet_name)
            .field("api_base_url", &self.api_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            service_account: None,
            sheet_id: None,
            sheet_name: default_sheet_name(),
            api_base_url: default_sheets_api_base_url(),
            timeout_secs: default_provider_timeout_secs(),
        }
    }
}

fn default_sheet_name() -> String {
    "Waitlist".to_string()
}

fn default_sheets_api_base_url() -> String {
    "https://sheets.googleapis.com".to_string()
}

/// Prometheus metrics configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Install the Prometheus recorder and serve `/metrics`.
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
        }
    }
}

fn default_metrics_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = VotcConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.completion.model, "mistral/ministral-3b");
        assert!((config.completion.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.conversation.max_user_turns, 12);
        assert_eq!(config.conversation.welcome_max_tokens, 120);
        assert_eq!(config.conversation.probe_max_tokens, 80);
        assert_eq!(config.github.owner, "understories");
        assert_eq!(config.github.repo, "votc");
        assert_eq!(config.github.branch, "main");
        assert_eq!(config.github.ideas_path, "build_game/ideas");
        assert_eq!(config.github.conversations_path, "build_game/conversations");
        assert_eq!(config.sheets.sheet_name, "Waitlist");
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let mut config = VotcConfig::default();
        config.completion.api_key = Some("vck_supersecret".into());
        config.github.token = Some("ghp_supersecret".into());
        config.sheets.service_account = Some("{\"private_key\":\"x\"}".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("supersecret"));
        assert!(!debug.contains("private_key"));
        assert!(debug.contains("[redacted]"));
    }

    #[test]
    fn production_detection_is_case_insensitive() {
        let server = ServerConfig {
            environment: "Production".into(),
            ..ServerConfig::default()
        };
        assert!(server.is_production());
        assert!(!ServerConfig::default().is_production());
    }
}
