// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transcript exporter: renders or accepts a markdown document, derives the
//! timestamped destination path, and writes it through the repository provider.
//!
//! Exports are single attempts. There are no retries and no transactional
//! guarantees beyond one create-or-update call.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use strum::Display;
use tracing::{info, warn};
use votc_config::model::GithubConfig;
use votc_core::{FileWrite, RepositoryErrorKind, RepositoryProvider, VotcError};

use crate::sanitize::truncate_chars;
use crate::template::{extract_themes, render_idea};

/// Maximum characters kept from a pre-rendered document.
pub const MAX_CONTENT_CHARS: usize = 50_000;

/// Maximum characters kept from an excerpt.
pub const MAX_EXCERPT_CHARS: usize = 5_000;

/// What is being exported. Decides directory, filename prefix, and commit message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ExportKind {
    Idea,
    Conversation,
}

impl ExportKind {
    pub fn commit_message(&self) -> &'static str {
        match self {
            ExportKind::Idea => "Add idea from game master conversation",
            ExportKind::Conversation => "Add full conversation from game master dialogue",
        }
    }

    /// `{prefix}-YYYY-MM-DD-HHMMSS.md` for the given instant (UTC).
    pub fn filename(&self, now: DateTime<Utc>) -> String {
        format!("{self}-{}.md", now.format("%Y-%m-%d-%H%M%S"))
    }
}

/// Document source of an export request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportBody {
    /// Pre-rendered document, stored as given.
    Content(String),
    /// Excerpt rendered through the idea template.
    Excerpt { excerpt: String, themes: Vec<String> },
}

/// A parsed `/export` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub body: ExportBody,
    pub kind: ExportKind,
}

impl ExportRequest {
    /// Parses `{ content?, excerpt?, context?, isFullChat? }`.
    ///
    /// A non-empty `content` string wins over `excerpt`. Content is cut to
    /// [`MAX_CONTENT_CHARS`] and excerpts to [`MAX_EXCERPT_CHARS`] before
    /// trimming; an empty result is a validation error. The kind is
    /// `Conversation` only when `isFullChat` is literally `true`.
    pub fn parse(value: &Value) -> Result<Self, VotcError> {
        let kind = if value.get("isFullChat").and_then(Value::as_bool) == Some(true) {
            ExportKind::Conversation
        } else {
            ExportKind::Idea
        };

        let body = if let Some(content) = non_empty_str(value, "content") {
            let content = truncate_chars(content, MAX_CONTENT_CHARS).trim();
            if content.is_empty() {
                return Err(VotcError::Validation("Content cannot be empty".into()));
            }
            ExportBody::Content(content.to_string())
        } else if let Some(excerpt) = non_empty_str(value, "excerpt") {
            let excerpt = truncate_chars(excerpt, MAX_EXCERPT_CHARS).trim();
            if excerpt.is_empty() {
                return Err(VotcError::Validation("Excerpt cannot be empty".into()));
            }
            ExportBody::Excerpt {
                excerpt: excerpt.to_string(),
                themes: context_themes(value.get("context")),
            }
        } else {
            return Err(VotcError::Validation(
                "Content or excerpt is required".into(),
            ));
        };

        Ok(Self { body, kind })
    }
}

fn non_empty_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn context_themes(context: Option<&Value>) -> Vec<String> {
    context
        .and_then(|c| c.get("themes"))
        .and_then(Value::as_array)
        .map(|themes| {
            themes
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Successful export result returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReceipt {
    pub url: String,
    pub filename: String,
    pub path: String,
}

/// Writes export documents through a [`RepositoryProvider`].
pub struct TranscriptExporter {
    repository: Option<Arc<dyn RepositoryProvider>>,
    ideas_path: String,
    conversations_path: String,
    timeout: Duration,
}

impl TranscriptExporter {
    /// A `None` repository means the token is missing; every valid export is
    /// then a configuration error.
    pub fn new(
        repository: Option<Arc<dyn RepositoryProvider>>,
        ideas_path: impl Into<String>,
        conversations_path: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            repository,
            ideas_path: ideas_path.into(),
            conversations_path: conversations_path.into(),
            timeout,
        }
    }

    pub fn from_config(
        repository: Option<Arc<dyn RepositoryProvider>>,
        config: &GithubConfig,
    ) -> Self {
        Self::new(
            repository,
            config.ideas_path.clone(),
            config.conversations_path.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn base_dir(&self, kind: ExportKind) -> &str {
        match kind {
            ExportKind::Idea => self.ideas_path.trim_end_matches('/'),
            ExportKind::Conversation => self.conversations_path.trim_end_matches('/'),
        }
    }

    /// Renders the document and writes it at the path derived from `now`.
    pub async fn export(
        &self,
        request: ExportRequest,
        now: DateTime<Utc>,
    ) -> Result<ExportReceipt, VotcError> {
        let kind = request.kind;
        let document = match request.body {
            ExportBody::Content(content) => content,
            ExportBody::Excerpt { excerpt, themes } => {
                let themes = if themes.is_empty() {
                    extract_themes(&excerpt)
                } else {
                    themes
                };
                render_idea(&excerpt, &themes, now)
            }
        };

        let Some(repository) = self.repository.as_ref() else {
            votc_prometheus::record_export(&kind.to_string(), "config_error");
            return Err(VotcError::Config("repository token is not configured".into()));
        };

        let filename = kind.filename(now);
        let path = format!("{}/{}", self.base_dir(kind), filename);
        let write = FileWrite {
            path: path.clone(),
            encoded_content: STANDARD.encode(document.as_bytes()),
            commit_message: kind.commit_message().to_string(),
        };

        info!(
            %kind,
            path = %path,
            document_chars = document.chars().count(),
            "writing export"
        );

        let result = match tokio::time::timeout(self.timeout, repository.create_or_update_file(write))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(VotcError::repository(
                RepositoryErrorKind::Timeout,
                format!("no response within {:?}", self.timeout),
            )),
        };

        match result {
            Ok(written) => {
                info!(%kind, path = %written.path, sha = ?written.sha, "export written");
                votc_prometheus::record_export(&kind.to_string(), "success");
                Ok(ExportReceipt {
                    url: repository.coordinates().blob_url(&path),
                    filename,
                    path,
                })
            }
            Err(e) => {
                warn!(%kind, path = %path, error = %e, "export failed");
                votc_prometheus::record_export(&kind.to_string(), "failure");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use votc_test_utils::MockRepository;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()
    }

    fn exporter(repo: &MockRepository) -> TranscriptExporter {
        TranscriptExporter::new(
            Some(Arc::new(repo.clone())),
            "build_game/ideas",
            "build_game/conversations",
            Duration::from_secs(15),
        )
    }

    #[test]
    fn parse_rejects_empty_and_whitespace_excerpt() {
        let err = ExportRequest::parse(&json!({"excerpt": ""})).unwrap_err();
        assert!(matches!(err, VotcError::Validation(ref m) if m == "Content or excerpt is required"));
        let err = ExportRequest::parse(&json!({"excerpt": "   "})).unwrap_err();
        assert!(matches!(err, VotcError::Validation(ref m) if m == "Excerpt cannot be empty"));
        let err = ExportRequest::parse(&json!({"content": "\n\t"})).unwrap_err();
        assert!(matches!(err, VotcError::Validation(ref m) if m == "Content cannot be empty"));
    }

    #[test]
    fn parse_prefers_content_and_reads_full_chat_flag() {
        let req = ExportRequest::parse(&json!({
            "content": "  # Doc  ",
            "excerpt": "ignored",
            "isFullChat": true
        }))
        .unwrap();
        assert_eq!(req.kind, ExportKind::Conversation);
        assert_eq!(req.body, ExportBody::Content("# Doc".into()));
    }

    #[test]
    fn full_chat_flag_must_be_boolean_true() {
        let req = ExportRequest::parse(&json!({"excerpt": "x", "isFullChat": "true"})).unwrap();
        assert_eq!(req.kind, ExportKind::Idea);
    }

    #[test]
    fn parse_truncates_before_trimming() {
        let long = format!("{}{}", "a".repeat(MAX_EXCERPT_CHARS), "tail");
        let req = ExportRequest::parse(&json!({"excerpt": long})).unwrap();
        match req.body {
            ExportBody::Excerpt { excerpt, .. } => {
                assert_eq!(excerpt.chars().count(), MAX_EXCERPT_CHARS);
                assert!(!excerpt.contains("tail"));
            }
            other => panic!("expected excerpt, got {other:?}"),
        }
    }

    #[test]
    fn parse_reads_context_themes() {
        let req = ExportRequest::parse(&json!({
            "excerpt": "x",
            "context": {"themes": ["ritual", " ", 7, "map"]}
        }))
        .unwrap();
        match req.body {
            ExportBody::Excerpt { themes, .. } => assert_eq!(themes, vec!["ritual", "map"]),
            other => panic!("expected excerpt, got {other:?}"),
        }
    }

    #[test]
    fn filenames_are_timestamped() {
        assert_eq!(ExportKind::Idea.filename(now()), "idea-2026-01-02-030405.md");
        assert_eq!(
            ExportKind::Conversation.filename(now()),
            "conversation-2026-01-02-030405.md"
        );
    }

    #[tokio::test]
    async fn excerpt_export_writes_idea_document() {
        let repo = MockRepository::new();
        let receipt = exporter(&repo)
            .export(
                ExportRequest::parse(&json!({"excerpt": "Quests could follow old paths."})).unwrap(),
                now(),
            )
            .await
            .unwrap();

        assert_eq!(receipt.filename, "idea-2026-01-02-030405.md");
        assert_eq!(receipt.path, "build_game/ideas/idea-2026-01-02-030405.md");
        assert_eq!(
            receipt.url,
            "https://github.com/understories/votc/blob/main/build_game/ideas/idea-2026-01-02-030405.md"
        );

        let writes = repo.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].commit_message, "Add idea from game master conversation");
        let decoded = String::from_utf8(STANDARD.decode(&writes[0].encoded_content).unwrap()).unwrap();
        assert!(decoded.contains("Quests could follow old paths."));
        assert!(decoded.contains("**Themes:** quest, path"));
    }

    #[tokio::test]
    async fn full_chat_export_uses_conversation_dir() {
        let repo = MockRepository::new();
        let receipt = exporter(&repo)
            .export(
                ExportRequest::parse(&json!({"content": "# Conversation", "isFullChat": true}))
                    .unwrap(),
                now(),
            )
            .await
            .unwrap();
        assert_eq!(
            receipt.path,
            "build_game/conversations/conversation-2026-01-02-030405.md"
        );
        assert_eq!(
            repo.writes()[0].commit_message,
            "Add full conversation from game master dialogue"
        );
    }

    #[tokio::test]
    async fn missing_repository_is_config_error() {
        let exporter = TranscriptExporter::new(None, "a", "b", Duration::from_secs(1));
        let err = exporter
            .export(ExportRequest::parse(&json!({"excerpt": "x"})).unwrap(), now())
            .await
            .unwrap_err();
        assert!(matches!(err, VotcError::Config(_)));
    }

    #[tokio::test]
    async fn provider_errors_pass_through_classified() {
        let repo = MockRepository::new();
        repo.fail_with(RepositoryErrorKind::RateLimited);
        let err = exporter(&repo)
            .export(ExportRequest::parse(&json!({"excerpt": "x"})).unwrap(), now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VotcError::Repository {
                kind: RepositoryErrorKind::RateLimited,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_repository_times_out() {
        let repo = MockRepository::new();
        repo.delay(Duration::from_secs(60));
        let err = exporter(&repo)
            .export(ExportRequest::parse(&json!({"excerpt": "x"})).unwrap(), now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VotcError::Repository {
                kind: RepositoryErrorKind::Timeout,
                ..
            }
        ));
    }
}
