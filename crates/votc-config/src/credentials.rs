// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential resolution.
//!
//! Credentials are resolved once at startup into an immutable value. Secrets
//! are wrapped in [`SecretString`] so they never reach logs or `Debug` output.

use secrecy::{ExposeSecret, SecretString};

use crate::diagnostic::ConfigError;
use crate::model::VotcConfig;

/// Prefix carried by AI gateway keys.
pub const GATEWAY_KEY_PREFIX: &str = "vck_";

/// Resolved credentials for the three external collaborators.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub completion_key: Option<SecretString>,
    pub github_token: Option<SecretString>,
    pub service_account: Option<SecretString>,
}

impl Credentials {
    /// Resolves every credential from the loaded configuration.
    pub fn from_config(config: &VotcConfig) -> Self {
        Self {
            completion_key: resolve_completion_key(
                config.completion.api_key.as_deref(),
                config.completion.alias_api_key.as_deref(),
            ),
            github_token: non_blank(config.github.token.as_deref()),
            service_account: non_blank(config.sheets.service_account.as_deref()),
        }
    }

    /// Completion key, or a diagnostic naming the variables to set.
    pub fn require_completion_key(&self) -> Result<&SecretString, ConfigError> {
        self.completion_key
            .as_ref()
            .ok_or_else(|| ConfigError::MissingCredential {
                key: "completion.api_key".into(),
                env_var: "AI_GATEWAY_API_KEY or GAME_INTELLIGENCE".into(),
            })
    }

    /// Repository token, or a diagnostic naming the variable to set.
    pub fn require_github_token(&self) -> Result<&SecretString, ConfigError> {
        self.github_token
            .as_ref()
            .ok_or_else(|| ConfigError::MissingCredential {
                key: "github.token".into(),
                env_var: "GITHUB_TOKEN".into(),
            })
    }

    /// Service account blob, or a diagnostic naming the variable to set.
    pub fn require_service_account(&self) -> Result<&SecretString, ConfigError> {
        self.service_account
            .as_ref()
            .ok_or_else(|| ConfigError::MissingCredential {
                key: "sheets.service_account".into(),
                env_var: "GOOGLE_SERVICE_ACCOUNT".into(),
            })
    }

    /// Non-fatal format warnings for present credentials.
    pub fn warnings(&self) -> Vec<ConfigError> {
        let mut warnings = Vec::new();
        if self
            .completion_key
            .as_ref()
            .is_some_and(|key| !key.expose_secret().starts_with(GATEWAY_KEY_PREFIX))
        {
            warnings.push(ConfigError::MalformedCredential {
                key: "completion.api_key".into(),
                reason: format!("expected a gateway key starting with `{GATEWAY_KEY_PREFIX}`"),
            });
        }
        if self
            .service_account
            .as_ref()
            .is_some_and(|blob| !blob.expose_secret().trim_start().starts_with('{'))
        {
            warnings.push(ConfigError::MalformedCredential {
                key: "sheets.service_account".into(),
                reason: "expected a JSON object".into(),
            });
        }
        warnings
    }
}

/// Picks the completion key from the primary and alias values.
///
/// The alias wins when it has the gateway key format; otherwise the primary
/// key is used, falling back to the alias in any format.
pub fn resolve_completion_key(primary: Option<&str>, alias: Option<&str>) -> Option<SecretString> {
    let primary = primary.map(str::trim).filter(|k| !k.is_empty());
    let alias = alias.map(str::trim).filter(|k| !k.is_empty());

    let chosen = match (alias, primary) {
        (Some(a), _) if a.starts_with(GATEWAY_KEY_PREFIX) => a,
        (_, Some(p)) => p,
        (Some(a), None) => a,
        (None, None) => return None,
    };
    Some(SecretString::from(chosen.to_string()))
}

fn non_blank(value: Option<&str>) -> Option<SecretString> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| SecretString::from(v.to_string()))
}
