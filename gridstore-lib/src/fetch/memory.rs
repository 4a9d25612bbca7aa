//! In-memory fetcher using DashMap

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use super::Fetcher;
use super::QueryParams;
use crate::error::FetchError;

#[derive(Debug, Clone)]
enum Canned {
    Payload(serde_json::Value),
    Failure(String),
}

/// A fetcher answering from a concurrent map of URL to canned response.
///
/// Useful for embedding static data and for driving the store in tests.
/// Query parameters are ignored; every request made is recorded.
///
/// # Example
///
/// ```
/// use gridstore_lib::fetch::InMemoryFetcher;
///
/// let fetcher = InMemoryFetcher::new();
/// fetcher.insert("/devices", serde_json::json!([{"id": 1}]));
/// fetcher.fail("/broken", "offline");
/// ```
#[derive(Debug, Default)]
pub struct InMemoryFetcher {
    store: DashMap<String, Canned>,
    requests: DashMap<u64, (String, QueryParams)>,
    next_request: AtomicU64,
}

impl InMemoryFetcher {
    /// Creates a fetcher with no registered URLs.
    pub fn new() -> Self {
        Self {
            store: DashMap::new(),
            requests: DashMap::new(),
            next_request: AtomicU64::new(0),
        }
    }

    /// Answers requests for `url` with `payload`.
    pub fn insert(&self, url: impl Into<String>, payload: serde_json::Value) {
        self.store.insert(url.into(), Canned::Payload(payload));
    }

    /// Answers requests for `url` with a failure.
    pub fn fail(&self, url: impl Into<String>, message: impl Into<String>) {
        self.store.insert(url.into(), Canned::Failure(message.into()));
    }

    /// Forgets the canned response for `url`.
    pub fn remove(&self, url: &str) {
        self.store.remove(url);
    }

    /// Returns the requests made so far, oldest first.
    pub fn requests(&self) -> Vec<(String, QueryParams)> {
        let mut entries: Vec<(u64, (String, QueryParams))> = self
            .requests
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        entries.sort_by_key(|(n, _)| *n);
        entries.into_iter().map(|(_, request)| request).collect()
    }
}

#[async_trait]
impl Fetcher for InMemoryFetcher {
    async fn request(&self, url: &str, params: &QueryParams) -> Result<serde_json::Value, FetchError> {
        let n = self.next_request.fetch_add(1, Ordering::SeqCst);
        self.requests.insert(n, (url.to_string(), params.clone()));

        let canned = self.store.get(url).map(|entry| entry.value().clone());
        match canned {
            Some(Canned::Payload(payload)) => Ok(payload),
            Some(Canned::Failure(message)) => Err(FetchError::Failed(message)),
            None => Err(FetchError::not_found(url)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_canned_responses() {
        let fetcher = InMemoryFetcher::new();
        fetcher.insert("/ok", serde_json::json!([1]));
        fetcher.fail("/bad", "offline");

        let params = QueryParams::new().with("a", "b");
        assert_eq!(fetcher.request("/ok", &params).await.unwrap(), serde_json::json!([1]));
        assert!(matches!(
            fetcher.request("/bad", &params).await,
            Err(FetchError::Failed(_))
        ));
        assert!(matches!(
            fetcher.request("/none", &params).await,
            Err(FetchError::NotFound { .. })
        ));

        let requests = fetcher.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].0, "/ok");
        assert_eq!(requests[0].1.get("a"), Some("b"));
    }
}
