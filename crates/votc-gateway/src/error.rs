// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON error envelope and the per-endpoint mapping from [`VotcError`].
//!
//! Client-facing text never carries credentials or raw provider bodies; the
//! chat endpoint adds `details` only outside production.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use votc_core::{RepositoryErrorKind, VotcError, WaitlistErrorKind};

pub const CONFIG_ERROR_MESSAGE: &str = "Server configuration error";
pub const UPSTREAM_ERROR_MESSAGE: &str = "AI service temporarily unavailable. Please try again.";
pub const EXPORT_FAILED_MESSAGE: &str = "Failed to share to GitHub. Please try again later.";
pub const WAITLIST_FAILED_MESSAGE: &str = "Failed to join waitlist. Please try again later.";

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details: None,
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    /// Mapping for `POST /chat`.
    pub fn chat(err: &VotcError, expose_details: bool) -> Self {
        match err {
            VotcError::Validation(msg) => Self::bad_request(msg.clone()),
            VotcError::RateLimited(msg) => Self::new(StatusCode::TOO_MANY_REQUESTS, msg.clone()),
            VotcError::Config(_) => Self::new(StatusCode::INTERNAL_SERVER_ERROR, CONFIG_ERROR_MESSAGE),
            other if expose_details => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: format!("AI Gateway error: {}", upstream_message(other)),
                details: Some(format!("{other:?}")),
            },
            _ => Self::new(StatusCode::INTERNAL_SERVER_ERROR, UPSTREAM_ERROR_MESSAGE),
        }
    }

    /// Mapping for `POST /export`.
    pub fn export(err: &VotcError) -> Self {
        match err {
            VotcError::Validation(msg) => Self::bad_request(msg.clone()),
            VotcError::Config(_) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server configuration error: Missing GitHub token",
            ),
            VotcError::Repository { kind, .. } => match kind {
                RepositoryErrorKind::Unauthorized => Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Authentication error. Please contact support.",
                ),
                RepositoryErrorKind::RateLimited => Self::new(
                    StatusCode::TOO_MANY_REQUESTS,
                    "Rate limit exceeded. Please try again later.",
                ),
                RepositoryErrorKind::NotFound => Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Repository not found. Please contact support.",
                ),
                RepositoryErrorKind::InvalidPath => {
                    Self::bad_request("Invalid file path. Please try again.")
                }
                RepositoryErrorKind::Timeout | RepositoryErrorKind::Other => {
                    Self::new(StatusCode::INTERNAL_SERVER_ERROR, EXPORT_FAILED_MESSAGE)
                }
            },
            _ => Self::new(StatusCode::INTERNAL_SERVER_ERROR, EXPORT_FAILED_MESSAGE),
        }
    }

    /// Mapping for `POST /waitlist`.
    pub fn waitlist(err: &VotcError) -> Self {
        let message = match err {
            VotcError::Validation(msg) => return Self::bad_request(msg.clone()),
            VotcError::Config(_) => CONFIG_ERROR_MESSAGE,
            VotcError::Waitlist { kind, .. } => match kind {
                WaitlistErrorKind::Network => {
                    "Network error connecting to Google Sheets. Please try again later."
                }
                WaitlistErrorKind::PermissionDenied => "Permission error. Please contact support.",
                WaitlistErrorKind::NotFound => "Sheet configuration error. Please contact support.",
                WaitlistErrorKind::Other => WAITLIST_FAILED_MESSAGE,
            },
            _ => WAITLIST_FAILED_MESSAGE,
        };
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

/// The provider's own message, without the variant prefix.
fn upstream_message(err: &VotcError) -> String {
    match err {
        VotcError::Provider { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.error,
                details: self.details,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_hides_upstream_detail_in_production() {
        let err = VotcError::provider("401 invalid key vck_secret");
        let prod = ApiError::chat(&err, false);
        assert_eq!(prod.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(prod.error, UPSTREAM_ERROR_MESSAGE);
        assert!(prod.details.is_none());

        let dev = ApiError::chat(&err, true);
        assert_eq!(dev.error, "AI Gateway error: 401 invalid key vck_secret");
        assert!(dev.details.is_some());
    }

    #[test]
    fn chat_config_error_is_generic_even_in_development() {
        let err = VotcError::Config("completion credentials are not configured".into());
        let api = ApiError::chat(&err, true);
        assert_eq!(api.error, CONFIG_ERROR_MESSAGE);
        assert!(api.details.is_none());
    }

    #[test]
    fn export_statuses_follow_repository_kind() {
        let cases = [
            (RepositoryErrorKind::Unauthorized, 500),
            (RepositoryErrorKind::RateLimited, 429),
            (RepositoryErrorKind::NotFound, 500),
            (RepositoryErrorKind::InvalidPath, 400),
            (RepositoryErrorKind::Timeout, 500),
            (RepositoryErrorKind::Other, 500),
        ];
        for (kind, status) in cases {
            let api = ApiError::export(&VotcError::repository(kind, "token ghp_x rejected"));
            assert_eq!(api.status.as_u16(), status, "{kind}");
            assert!(!api.error.contains("ghp_x"));
        }
    }

    #[test]
    fn error_response_omits_absent_details() {
        let json = serde_json::to_string(&ErrorResponse {
            error: "x".into(),
            details: None,
        })
        .unwrap();
        assert_eq!(json, r#"{"error":"x"}"#);
    }
}
