//! HTTP fetcher backed by reqwest

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::Fetcher;
use super::QueryParams;
use crate::error::FetchError;

/// Fetches table data with `GET <url>?<params>` and parses the body as JSON.
///
/// Relative instance URLs (`/api/devices`) are resolved against the base URL
/// when one is configured.
///
/// This fetcher is cheap to clone; the underlying `reqwest::Client` shares its
/// connection pool.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use gridstore_lib::fetch::HttpFetcher;
///
/// let fetcher = HttpFetcher::new()
///     .with_base_url("https://example.com")?
///     .with_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    http_client: Client,
    base_url: Option<Url>,
    timeout: Option<Duration>,
}

impl HttpFetcher {
    /// Creates a fetcher with a default client and no base URL.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses an existing reqwest client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.http_client = client;
        self
    }

    /// Resolves relative instance URLs against `base_url`.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, FetchError> {
        let parsed = Url::parse(base_url).map_err(|_| FetchError::InvalidUrl(base_url.to_string()))?;
        self.base_url = Some(parsed);
        Ok(self)
    }

    /// Sets a per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the full request URL.
    pub fn resolve(&self, url: &str, params: &QueryParams) -> Result<Url, FetchError> {
        let mut resolved = match &self.base_url {
            Some(base) => base.join(url),
            None => Url::parse(url),
        }
        .map_err(|_| FetchError::InvalidUrl(url.to_string()))?;

        if !params.is_empty() {
            let mut pairs = resolved.query_pairs_mut();
            for (key, value) in params.iter() {
                pairs.append_pair(key, value);
            }
        }
        Ok(resolved)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn request(&self, url: &str, params: &QueryParams) -> Result<serde_json::Value, FetchError> {
        let target = self.resolve(url, params)?;

        let mut request = self.http_client.get(target);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| self.map_error(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_error(e))?;

        if !status.is_success() {
            return Err(FetchError::http(status.as_u16(), body));
        }

        serde_json::from_str(&body).map_err(|e| FetchError::parse_with_body(e.to_string(), body))
    }
}

impl HttpFetcher {
    fn map_error(&self, error: reqwest::Error) -> FetchError {
        match self.timeout {
            Some(timeout) if error.is_timeout() => FetchError::Timeout(timeout),
            _ => FetchError::Network(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_url_with_params() {
        let fetcher = HttpFetcher::new().with_base_url("https://example.com/app/").unwrap();
        let params = QueryParams::new().with("site", "4").with("q", "a b");
        let url = fetcher.resolve("/api/devices", &params).unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/devices?q=a+b&site=4");
    }

    #[test]
    fn test_resolve_relative_url_without_base_fails() {
        let fetcher = HttpFetcher::new();
        assert!(matches!(
            fetcher.resolve("/api/devices", &QueryParams::new()),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(HttpFetcher::new().with_base_url("not a url").is_err());
    }
}
