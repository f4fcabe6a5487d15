// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock completion provider for deterministic testing.
//!
//! `MockCompletionProvider` implements `CompletionProvider` with scripted
//! streams, records every request it receives, and reports whether the last
//! stream it handed out was dropped or ran to completion.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures::{Stream, StreamExt, stream};

use votc_core::{
    AdapterType, CompletionProvider, CompletionRequest, PluginAdapter, TextStream, VotcError,
};

/// One scripted upstream response.
#[derive(Debug, Clone)]
pub enum MockStream {
    /// Yields the fragments, then ends cleanly.
    Fragments(Vec<String>),
    /// `stream()` itself fails.
    FailBefore(String),
    /// Yields the fragments, then an error item.
    FailAfter(Vec<String>, String),
    /// Yields the fragments, then stays pending forever.
    Hold(Vec<String>),
}

impl MockStream {
    pub fn fragments<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MockStream::Fragments(fragments.into_iter().map(Into::into).collect())
    }

    pub fn fail_before(message: impl Into<String>) -> Self {
        MockStream::FailBefore(message.into())
    }

    pub fn fail_after<I, S>(fragments: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MockStream::FailAfter(
            fragments.into_iter().map(Into::into).collect(),
            message.into(),
        )
    }

    pub fn hold<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MockStream::Hold(fragments.into_iter().map(Into::into).collect())
    }
}

/// A mock completion provider. Clones share scripts and recordings.
///
/// Scripts are popped from a FIFO queue. When the queue is empty the
/// provider streams a single "mock response" fragment.
#[derive(Clone, Default)]
pub struct MockCompletionProvider {
    scripts: Arc<Mutex<VecDeque<MockStream>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    dropped: Arc<AtomicBool>,
    exhausted: Arc<AtomicBool>,
}

impl MockCompletionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a scripted response.
    pub fn push(&self, script: MockStream) {
        if let Ok(mut scripts) = self.scripts.lock() {
            scripts.push_back(script);
        }
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// True once the most recent stream has been dropped.
    pub fn stream_dropped(&self) -> bool {
        self.dropped.load(Ordering::SeqCst)
    }

    /// True once the most recent stream has yielded its end.
    pub fn stream_exhausted(&self) -> bool {
        self.exhausted.load(Ordering::SeqCst)
    }

    fn next_script(&self) -> MockStream {
        self.scripts
            .lock()
            .ok()
            .and_then(|mut s| s.pop_front())
            .unwrap_or_else(|| MockStream::fragments(["mock response"]))
    }
}

#[async_trait]
impl PluginAdapter for MockCompletionProvider {
    fn name(&self) -> &str {
        "mock-completion"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Completion
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn stream(&self, request: CompletionRequest) -> Result<TextStream, VotcError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        self.dropped.store(false, Ordering::SeqCst);
        self.exhausted.store(false, Ordering::SeqCst);

        let inner: TextStream = match self.next_script() {
            MockStream::Fragments(fragments) => Box::pin(stream::iter(
                fragments.into_iter().map(Ok::<String, VotcError>),
            )),
            MockStream::FailBefore(message) => return Err(VotcError::provider(message)),
            MockStream::FailAfter(fragments, message) => Box::pin(
                stream::iter(fragments.into_iter().map(Ok::<String, VotcError>))
                    .chain(stream::once(async move { Err(VotcError::provider(message)) })),
            ),
            MockStream::Hold(fragments) => Box::pin(
                stream::iter(fragments.into_iter().map(Ok::<String, VotcError>))
                    .chain(stream::pending()),
            ),
        };

        Ok(Box::pin(TrackedStream {
            inner,
            dropped: self.dropped.clone(),
            exhausted: self.exhausted.clone(),
        }))
    }
}

struct TrackedStream {
    inner: TextStream,
    dropped: Arc<AtomicBool>,
    exhausted: Arc<AtomicBool>,
}

impl Stream for TrackedStream {
    type Item = Result<String, VotcError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let poll = self.inner.as_mut().poll_next(cx);
        if let Poll::Ready(None) = poll {
            self.exhausted.store(true, Ordering::SeqCst);
        }
        poll
    }
}

impl Drop for TrackedStream {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "m".into(),
            system: "s".into(),
            messages: vec![],
            max_tokens: 10,
            temperature: 0.7,
        }
    }

    #[tokio::test]
    async fn default_script_streams_mock_response() {
        let provider = MockCompletionProvider::new();
        let out: Vec<_> = provider.stream(request()).await.unwrap().collect().await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].as_ref().unwrap(), "mock response");
        assert!(provider.stream_exhausted());
        assert!(provider.stream_dropped());
    }

    #[tokio::test]
    async fn fail_before_errors_immediately() {
        let provider = MockCompletionProvider::new();
        provider.push(MockStream::fail_before("boom"));
        assert!(provider.stream(request()).await.is_err());
        assert_eq!(provider.requests().len(), 1);
    }
}
