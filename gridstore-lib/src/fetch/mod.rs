//! Data fetching
//!
//! Provides the [`Fetcher`] trait the registry delegates data requests to, and
//! the request/response pair that carries a request across the asynchronous
//! boundary. Requests are tagged with a per-registry sequence number so that a
//! response landing after a newer request for the same instance can be
//! recognised and discarded.

mod http;
mod memory;

pub use http::*;
pub use memory::*;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::error::FetchError;

/// Query string parameters sent with a data request.
///
/// Deserializes from any JSON object; scalar values are stringified and
/// `null` values are dropped.
///
/// # Example
///
/// ```
/// use gridstore_lib::fetch::QueryParams;
///
/// let params: QueryParams = serde_json::from_str(r#"{"site": 4, "q": "abc"}"#).unwrap();
/// assert_eq!(params.get("site"), Some("4"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, serde_json::Value>")]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter (builder pattern).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns a parameter value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Iterates over the parameters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns `true` if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, serde_json::Value>> for QueryParams {
    fn from(map: BTreeMap<String, serde_json::Value>) -> Self {
        let params = map
            .into_iter()
            .filter_map(|(key, value)| {
                let value = match value {
                    serde_json::Value::Null => return None,
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                Some((key, value))
            })
            .collect();
        Self(params)
    }
}

/// Performs data requests on behalf of a registry.
///
/// Implementations return the raw JSON payload; normalization into records
/// happens in the instance's data-received hook.
///
/// # Example
///
/// ```ignore
/// use gridstore_lib::fetch::{Fetcher, QueryParams};
///
/// struct Fixed(serde_json::Value);
///
/// #[async_trait::async_trait]
/// impl Fetcher for Fixed {
///     async fn request(&self, _url: &str, _params: &QueryParams) -> Result<serde_json::Value, FetchError> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Requests the payload at `url` with `params`.
    async fn request(&self, url: &str, params: &QueryParams) -> Result<serde_json::Value, FetchError>;
}

/// A data request issued by the registry and not yet answered.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    /// Instance the data is for.
    pub id: String,
    /// Instance URL at issue time.
    pub url: String,
    /// Query parameters.
    pub params: QueryParams,
    /// Monotonic sequence number within the issuing registry.
    pub seq: u64,
}

impl PendingRequest {
    /// Runs the request against `fetcher`.
    pub async fn execute(self, fetcher: &dyn Fetcher) -> FetchResponse {
        log::debug!("[fetch] #{} {} -> {}", self.seq, self.id, self.url);
        let result = fetcher.request(&self.url, &self.params).await;
        if let Err(e) = &result {
            log::warn!("[fetch] #{} {} failed: {}", self.seq, self.id, e);
        }
        FetchResponse {
            request: self,
            result,
        }
    }
}

/// The outcome of a [`PendingRequest`].
#[derive(Debug)]
pub struct FetchResponse {
    /// The request this answers.
    pub request: PendingRequest,
    /// Payload or failure.
    pub result: Result<serde_json::Value, FetchError>,
}

/// Executes requests concurrently, returning responses in issue order.
pub async fn execute_all(fetcher: &dyn Fetcher, requests: Vec<PendingRequest>) -> Vec<FetchResponse> {
    futures::future::join_all(requests.into_iter().map(|request| request.execute(fetcher))).await
}
