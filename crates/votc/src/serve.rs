// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `votc serve` command implementation.
//!
//! Resolves credentials, builds whichever adapters they allow, assembles the
//! prompts, and serves the gateway until SIGINT or SIGTERM.

use std::sync::Arc;

use tracing::{info, warn};
use votc_aigateway::AiGatewayProvider;
use votc_config::{Credentials, VotcConfig};
use votc_context::StaticZone;
use votc_core::{CompletionProvider, RepositoryProvider, VotcError, WaitlistStore};
use votc_gateway::{Adapters, AppState, HealthState};
use votc_github::GithubRepository;
use votc_prometheus::PrometheusAdapter;
use votc_sheets::SheetsWaitlist;

use crate::shutdown;

/// Runs the `votc serve` command.
pub async fn run_serve(config: VotcConfig) -> Result<(), VotcError> {
    info!(
        environment = %config.server.environment,
        model = %config.completion.model,
        "starting votc serve"
    );

    let credentials = Credentials::from_config(&config);
    for warning in credentials.warnings() {
        warn!(%warning, "credential format");
    }

    let adapters = build_adapters(&config, &credentials);
    let prompts = Arc::new(StaticZone::new(&config.conversation).await);
    let health = HealthState::new(install_metrics(&config));
    let state = AppState::from_config(&config, adapters, prompts, health);

    let listener = votc_gateway::bind(&config.server.host, config.server.port).await?;
    let cancel = shutdown::install_signal_handler();
    votc_gateway::serve(listener, state, cancel).await?;

    info!("votc serve shutdown complete");
    Ok(())
}

/// Builds each adapter whose credentials are present.
///
/// A missing or unusable credential leaves the adapter out; the matching
/// endpoint then answers with a configuration error.
pub fn build_adapters(config: &VotcConfig, credentials: &Credentials) -> Adapters {
    let completion = match credentials.require_completion_key() {
        Ok(key) => match AiGatewayProvider::new(&config.completion, key) {
            Ok(provider) => Some(Arc::new(provider) as Arc<dyn CompletionProvider>),
            Err(e) => {
                warn!(error = %e, "completion provider unavailable");
                None
            }
        },
        Err(e) => {
            warn!(error = %e, "/chat will report a configuration error");
            None
        }
    };

    let repository = match credentials.require_github_token() {
        Ok(token) => match GithubRepository::new(&config.github, token) {
            Ok(repo) => Some(Arc::new(repo) as Arc<dyn RepositoryProvider>),
            Err(e) => {
                warn!(error = %e, "repository provider unavailable");
                None
            }
        },
        Err(e) => {
            warn!(error = %e, "/export will report a configuration error");
            None
        }
    };

    let waitlist = match credentials.require_service_account() {
        Ok(account) => match SheetsWaitlist::new(&config.sheets, account) {
            Ok(sheet) => Some(Arc::new(sheet) as Arc<dyn WaitlistStore>),
            Err(e) => {
                warn!(error = %e, "waitlist store unavailable");
                None
            }
        },
        Err(e) => {
            warn!(error = %e, "/waitlist will report a configuration error");
            None
        }
    };

    info!(
        completion = completion.is_some(),
        repository = repository.is_some(),
        waitlist = waitlist.is_some(),
        "adapters initialized"
    );

    Adapters {
        completion,
        repository,
        waitlist,
    }
}

fn install_metrics(config: &VotcConfig) -> Option<Arc<dyn Fn() -> String + Send + Sync>> {
    if !config.metrics.enabled {
        info!("metrics disabled by configuration");
        return None;
    }
    match PrometheusAdapter::new() {
        Ok(adapter) => Some(Arc::new(move || adapter.render())),
        Err(e) => {
            warn!(error = %e, "metrics unavailable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_credentials_means_no_adapters() {
        let config = VotcConfig::default();
        let adapters = build_adapters(&config, &Credentials::default());
        assert!(adapters.completion.is_none());
        assert!(adapters.repository.is_none());
        assert!(adapters.waitlist.is_none());
    }

    #[test]
    fn present_credentials_build_adapters() {
        let mut config = VotcConfig::default();
        config.completion.api_key = Some("vck_test".into());
        config.github.token = Some("ghp_test".into());
        config.sheets.sheet_id = Some("sheet".into());
        config.sheets.service_account = Some(
            serde_json::json!({
                "client_email": "svc@example.iam.gserviceaccount.com",
                "private_key": include_str!("../../votc-sheets/testdata/test-service-account.pem"),
            })
            .to_string(),
        );

        let adapters = build_adapters(&config, &Credentials::from_config(&config));
        assert!(adapters.completion.is_some());
        assert!(adapters.repository.is_some());
        assert!(adapters.waitlist.is_some());
    }

    #[test]
    fn unusable_service_account_is_skipped() {
        let mut config = VotcConfig::default();
        config.sheets.sheet_id = Some("sheet".into());
        config.sheets.service_account = Some("{\"client_email\": 1}".into());
        let adapters = build_adapters(&config, &Credentials::from_config(&config));
        assert!(adapters.waitlist.is_none());
    }
}
