// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Waitlist sign-ups: validates `{ email, name? }` and appends one row.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{info, warn};
use votc_core::{VotcError, WaitlistEntry, WaitlistErrorKind, WaitlistStore};

/// Client-facing success text.
pub const WAITLIST_SUCCESS_MESSAGE: &str = "Successfully joined the waitlist!";

/// A parsed sign-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupRequest {
    pub email: String,
    pub name: Option<String>,
}

impl SignupRequest {
    /// The email must be a string containing `@`. A blank name counts as absent.
    pub fn parse(value: &Value) -> Result<Self, VotcError> {
        let email = value
            .get("email")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|e| e.contains('@'))
            .ok_or_else(|| VotcError::Validation("Valid email is required".into()))?;

        let name = value
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        Ok(Self {
            email: email.to_string(),
            name,
        })
    }
}

pub struct WaitlistService {
    store: Option<Arc<dyn WaitlistStore>>,
    timeout: Duration,
}

impl WaitlistService {
    /// A `None` store means the sheet is not configured.
    pub fn new(store: Option<Arc<dyn WaitlistStore>>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub async fn join(&self, request: SignupRequest, now: DateTime<Utc>) -> Result<(), VotcError> {
        let Some(store) = self.store.as_ref() else {
            votc_prometheus::record_waitlist("config_error");
            return Err(VotcError::Config("waitlist store is not configured".into()));
        };

        let entry = WaitlistEntry {
            timestamp: now,
            email: request.email,
            name: request.name,
        };

        let result = match tokio::time::timeout(self.timeout, store.append(entry)).await {
            Ok(result) => result,
            Err(_) => Err(VotcError::waitlist(
                WaitlistErrorKind::Network,
                format!("no response within {:?}", self.timeout),
            )),
        };

        match &result {
            Ok(()) => {
                info!(store = store.name(), "waitlist sign-up appended");
                votc_prometheus::record_waitlist("success");
            }
            Err(e) => {
                warn!(store = store.name(), error = %e, "waitlist append failed");
                votc_prometheus::record_waitlist("failure");
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use votc_test_utils::MockWaitlist;

    #[test]
    fn email_without_at_is_rejected() {
        for body in [json!({}), json!({"email": "nobody"}), json!({"email": 5})] {
            let err = SignupRequest::parse(&body).unwrap_err();
            assert!(matches!(err, VotcError::Validation(ref m) if m == "Valid email is required"));
        }
    }

    #[test]
    fn blank_name_is_absent() {
        let req = SignupRequest::parse(&json!({"email": " a@b.c ", "name": "  "})).unwrap();
        assert_eq!(req.email, "a@b.c");
        assert_eq!(req.name, None);
    }

    #[tokio::test]
    async fn join_appends_row() {
        let store = MockWaitlist::new();
        let service = WaitlistService::new(Some(Arc::new(store.clone())), Duration::from_secs(5));
        let now = Utc.with_ymd_and_hms(2026, 4, 1, 12, 0, 0).unwrap();
        service
            .join(
                SignupRequest::parse(&json!({"email": "a@b.c", "name": "Ada"})).unwrap(),
                now,
            )
            .await
            .unwrap();
        let entries = store.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].to_row(), [
            "2026-04-01T12:00:00.000Z".to_string(),
            "a@b.c".to_string(),
            "Ada".to_string()
        ]);
    }

    #[tokio::test]
    async fn missing_store_is_config_error() {
        let service = WaitlistService::new(None, Duration::from_secs(5));
        let err = service
            .join(
                SignupRequest::parse(&json!({"email": "a@b.c"})).unwrap(),
                Utc::now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, VotcError::Config(_)));
    }
}
