// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the votc configuration system.

use figment::Jail;
use secrecy::ExposeSecret;
use votc_config::diagnostic::ConfigError;
use votc_config::{Credentials, load_and_validate_str, load_config, load_config_from_str};

/// Valid TOML with all known sections deserializes successfully.
#[test]
fn valid_toml_deserializes_into_votc_config() {
    let toml = r#"
[server]
host = "0.0.0.0"
port = 8080
environment = "production"

[completion]
api_key = "vck_123"
model = "mistral/ministral-8b"
temperature = 0.5

[conversation]
max_user_turns = 6
welcome_max_tokens = 200
probe_max_tokens = 60

[github]
owner = "someone"
repo = "ideas"
branch = "drafts"
ideas_path = "game/ideas"

[sheets]
sheet_id = "abc123"
sheet_name = "Signups"

[metrics]
enabled = false
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8080);
    assert!(config.server.is_production());
    assert_eq!(config.completion.api_key.as_deref(), Some("vck_123"));
    assert_eq!(config.completion.model, "mistral/ministral-8b");
    assert_eq!(config.conversation.max_user_turns, 6);
    assert_eq!(config.conversation.welcome_max_tokens, 200);
    assert_eq!(config.github.owner, "someone");
    assert_eq!(config.github.ideas_path, "game/ideas");
    assert_eq!(config.github.conversations_path, "build_game/conversations");
    assert_eq!(config.sheets.sheet_id.as_deref(), Some("abc123"));
    assert_eq!(config.sheets.sheet_name, "Signups");
    assert!(!config.metrics.enabled);
}

/// A typo in a section key is rejected with a suggestion.
#[test]
fn unknown_key_gets_did_you_mean() {
    let toml = r#"
[github]
ownr = "someone"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "ownr");
            assert_eq!(suggestion.as_deref(), Some("owner"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

/// Wrong value types produce an InvalidType diagnostic.
#[test]
fn invalid_type_is_reported() {
    let toml = r#"
[server]
port = "not-a-number"
"#;
    let errors = load_and_validate_str(toml).expect_err("should reject bad type");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. })),
        "got {errors:?}"
    );
}

/// Semantic validation runs after deserialization.
#[test]
fn semantic_validation_errors_surface() {
    let toml = r#"
[conversation]
welcome_max_tokens = 80
probe_max_tokens = 80
"#;
    let errors = load_and_validate_str(toml).expect_err("equal budgets must fail");
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}

/// Local votc.toml is picked up and `VOTC_*` variables override it.
#[test]
fn votc_env_overrides_local_file() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "votc.toml",
            r#"
[server]
port = 4000

[github]
ideas_path = "from/file"
"#,
        )?;
        jail.set_env("VOTC_SERVER_PORT", "5000");
        jail.set_env("VOTC_GITHUB_CONVERSATIONS_PATH", "from/env");

        let config = load_config()?;
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.github.ideas_path, "from/file");
        assert_eq!(config.github.conversations_path, "from/env");
        Ok(())
    });
}

/// Legacy deployment variable names map onto config sections and win over `VOTC_*`.
#[test]
fn legacy_env_names_override_votc_env() {
    Jail::expect_with(|jail| {
        jail.set_env("VOTC_COMPLETION_MODEL", "from/votc");
        jail.set_env("GAME_MODEL", "mistral/ministral-8b");
        jail.set_env("GITHUB_PATH", "legacy/ideas");
        jail.set_env("GOOGLE_SHEET_NAME", "Beta");
        jail.set_env("NODE_ENV", "production");

        let config = load_config()?;
        assert_eq!(config.completion.model, "mistral/ministral-8b");
        assert_eq!(config.github.ideas_path, "legacy/ideas");
        assert_eq!(config.sheets.sheet_name, "Beta");
        assert!(config.server.is_production());
        Ok(())
    });
}

/// A JSON service-account blob arrives as an opaque string.
#[test]
fn service_account_json_stays_a_string() {
    Jail::expect_with(|jail| {
        let blob = r#"{"client_email":"svc@example.iam.gserviceaccount.com","private_key":"k"}"#;
        jail.set_env("GOOGLE_SERVICE_ACCOUNT", blob);

        let config = load_config()?;
        assert_eq!(config.sheets.service_account.as_deref(), Some(blob));
        Ok(())
    });
}

/// Empty legacy values are ignored, matching unset variables.
#[test]
fn empty_legacy_values_are_ignored() {
    Jail::expect_with(|jail| {
        jail.set_env("GITHUB_OWNER", "");
        let config = load_config()?;
        assert_eq!(config.github.owner, "understories");
        Ok(())
    });
}

/// The gateway-format alias key is preferred over the primary key.
#[test]
fn credentials_prefer_prefixed_alias() {
    Jail::expect_with(|jail| {
        jail.set_env("AI_GATEWAY_API_KEY", "vck_primary");
        jail.set_env("GAME_INTELLIGENCE", "vck_alias");

        let config = load_config()?;
        let creds = Credentials::from_config(&config);
        let key = creds.require_completion_key().expect("key resolved");
        assert_eq!(key.expose_secret(), "vck_alias");
        Ok(())
    });
}
