// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! GitHub repository adapter for votc.
//!
//! Implements [`RepositoryProvider`] with the contents API
//! (`PUT /repos/{owner}/{repo}/contents/{path}`). Failures are classified by
//! HTTP status into [`RepositoryErrorKind`]; nothing is retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use votc_config::model::GithubConfig;
use votc_core::{
    AdapterType, FileWrite, FileWritten, HealthStatus, PluginAdapter, RepositoryCoordinates,
    RepositoryErrorKind, RepositoryProvider, VotcError,
};

const API_VERSION: &str = "2022-11-28";

#[derive(Debug, Serialize)]
struct PutContentsRequest<'a> {
    message: &'a str,
    content: &'a str,
    branch: &'a str,
}

#[derive(Debug, Deserialize)]
struct PutContentsResponse {
    content: ContentInfo,
}

#[derive(Debug, Deserialize)]
struct ContentInfo {
    path: String,
    #[serde(default)]
    sha: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubErrorBody {
    message: String,
}

/// Repository provider writing files through the GitHub contents API.
pub struct GithubRepository {
    client: reqwest::Client,
    api_base: Url,
    coordinates: RepositoryCoordinates,
}

impl GithubRepository {
    pub fn new(config: &GithubConfig, token: &SecretString) -> Result<Self, VotcError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| VotcError::Config(format!("invalid GitHub token header value: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static(API_VERSION),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("votc/", env!("CARGO_PKG_VERSION"))),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VotcError::Internal(format!("failed to build HTTP client: {e}")))?;

        let api_base = Url::parse(&config.api_base_url).map_err(|e| {
            VotcError::Config(format!(
                "invalid github.api_base_url '{}': {e}",
                config.api_base_url
            ))
        })?;

        let coordinates = config.coordinates();
        info!(
            owner = coordinates.owner,
            repo = coordinates.repo,
            branch = coordinates.branch,
            "GitHub repository adapter initialized"
        );

        Ok(Self {
            client,
            api_base,
            coordinates,
        })
    }

    /// `{api_base}/repos/{owner}/{repo}` followed by `extra` segments, each
    /// percent-encoded on its own.
    fn repo_url<'a>(&self, extra: impl IntoIterator<Item = &'a str>) -> Result<Url, VotcError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|()| VotcError::Config("github.api_base_url cannot be a base URL".into()))?
            .pop_if_empty()
            .extend([
                "repos",
                self.coordinates.owner.as_str(),
                self.coordinates.repo.as_str(),
            ])
            .extend(extra);
        Ok(url)
    }

    fn contents_url(&self, path: &str) -> Result<Url, VotcError> {
        self.repo_url(
            std::iter::once("contents").chain(path.split('/').filter(|s| !s.is_empty())),
        )
    }
}

fn transport_error(e: reqwest::Error) -> VotcError {
    let kind = if e.is_timeout() {
        RepositoryErrorKind::Timeout
    } else {
        RepositoryErrorKind::Other
    };
    VotcError::repository(kind, format!("GitHub request failed: {e}"))
}

async fn status_error(response: reqwest::Response) -> VotcError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<GithubErrorBody>(&body)
        .map(|b| b.message)
        .unwrap_or(body);
    VotcError::repository(
        RepositoryErrorKind::from_status(status.as_u16()),
        format!("GitHub returned {status}: {detail}"),
    )
}

#[async_trait]
impl PluginAdapter for GithubRepository {
    fn name(&self) -> &str {
        "github"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Repository
    }

    /// Reads the repository metadata; does not write anything.
    async fn health_check(&self) -> Result<HealthStatus, VotcError> {
        let url = self.repo_url([])?;
        match self.client.get(url).send().await {
            Ok(response) if response.status().is_success() => Ok(HealthStatus::Healthy),
            Ok(response) => Ok(HealthStatus::Unhealthy(status_error(response).await.to_string())),
            Err(e) => Ok(HealthStatus::Unhealthy(transport_error(e).to_string())),
        }
    }
}

#[async_trait]
impl RepositoryProvider for GithubRepository {
    fn coordinates(&self) -> &RepositoryCoordinates {
        &self.coordinates
    }

    async fn create_or_update_file(&self, write: FileWrite) -> Result<FileWritten, VotcError> {
        let url = self.contents_url(&write.path)?;
        debug!(path = write.path, bytes = write.encoded_content.len(), "writing file");

        let body = PutContentsRequest {
            message: &write.commit_message,
            content: &write.encoded_content,
            branch: &self.coordinates.branch,
        };

        let response = self
            .client
            .put(url)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            let err = status_error(response).await;
            warn!(path = write.path, error = %err, "GitHub write failed");
            return Err(err);
        }

        let parsed: PutContentsResponse = response.json().await.map_err(|e| {
            VotcError::repository(
                RepositoryErrorKind::Other,
                format!("failed to parse GitHub response: {e}"),
            )
        })?;

        info!(path = parsed.content.path, "file written");
        Ok(FileWritten {
            path: parsed.content.path,
            sha: parsed.content.sha,
        })
    }
}
