// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Sheets waitlist store for votc.
//!
//! Implements [`WaitlistStore`] with the Sheets v4 `values:append` call on
//! `{sheet}!A:C`, authenticated as a service account (see [`auth`]).

pub mod auth;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};
use votc_config::model::SheetsConfig;
use votc_core::{
    AdapterType, PluginAdapter, VotcError, WaitlistEntry, WaitlistErrorKind, WaitlistStore,
};

use crate::auth::{ServiceAccount, TokenSource};

/// Waitlist rows appended to one tab of a spreadsheet.
pub struct SheetsWaitlist {
    client: reqwest::Client,
    tokens: TokenSource,
    api_base: Url,
    sheet_id: String,
    sheet_name: String,
}

impl SheetsWaitlist {
    /// Fails with a configuration error when the sheet id is missing or the
    /// service account cannot be parsed.
    pub fn new(config: &SheetsConfig, service_account: &SecretString) -> Result<Self, VotcError> {
        let sheet_id = config
            .sheet_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| VotcError::Config("sheets.sheet_id is not set".into()))?
            .to_string();

        let account = ServiceAccount::from_json(service_account.expose_secret())?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VotcError::Internal(format!("failed to build HTTP client: {e}")))?;

        let api_base = Url::parse(&config.api_base_url).map_err(|e| {
            VotcError::Config(format!(
                "invalid sheets.api_base_url '{}': {e}",
                config.api_base_url
            ))
        })?;

        let tokens = TokenSource::new(client.clone(), account)?;
        info!(
            account = tokens.client_email(),
            sheet = config.sheet_name,
            "Google Sheets waitlist initialized"
        );

        Ok(Self {
            client,
            tokens,
            api_base,
            sheet_id,
            sheet_name: config.sheet_name.clone(),
        })
    }

    /// `{base}/v4/spreadsheets/{id}/values/{sheet}!A:C:append?...`
    fn append_url(&self) -> Result<Url, VotcError> {
        let range = format!("{}!A:C:append", self.sheet_name);
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|()| VotcError::Config("sheets.api_base_url cannot be a base URL".into()))?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                self.sheet_id.as_str(),
                "values",
                range.as_str(),
            ]);
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");
        Ok(url)
    }
}

/// Connection failures are `Network`; everything else is `Other`.
pub(crate) fn transport_error(e: reqwest::Error) -> VotcError {
    let kind = if e.is_connect() || e.is_timeout() {
        WaitlistErrorKind::Network
    } else {
        WaitlistErrorKind::Other
    };
    VotcError::waitlist(kind, format!("Google Sheets request failed: {e}"))
}

#[async_trait]
impl PluginAdapter for SheetsWaitlist {
    fn name(&self) -> &str {
        "google-sheets"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Waitlist
    }
}

#[async_trait]
impl WaitlistStore for SheetsWaitlist {
    async fn append(&self, entry: WaitlistEntry) -> Result<(), VotcError> {
        let token = self.tokens.access_token().await?;
        let url = self.append_url()?;
        let body = serde_json::json!({ "values": [entry.to_row()] });

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(status = %status, detail = %detail, "sheets append rejected");
            return Err(VotcError::waitlist(
                WaitlistErrorKind::from_status(status.as_u16()),
                format!("Google Sheets returned {status}"),
            ));
        }

        debug!(sheet = self.sheet_name, "row appended");
        Ok(())
    }
}
