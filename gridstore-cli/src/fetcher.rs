//! Payload source for the replay tool

use std::path::Path;
use std::path::PathBuf;

use async_trait::async_trait;
use gridstore_lib::error::FetchError;
use gridstore_lib::fetch::Fetcher;
use gridstore_lib::fetch::HttpFetcher;
use gridstore_lib::fetch::QueryParams;

/// Serves payloads from disk.
///
/// With an override path every request reads that file. Otherwise `http(s)`
/// urls go over the network and anything else is read as a path relative to
/// `base_dir`.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    base_dir: PathBuf,
    data: Option<PathBuf>,
    http: HttpFetcher,
}

impl FileFetcher {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            data: None,
            http: HttpFetcher::new(),
        }
    }

    /// Serves `path` for every request.
    pub fn with_data(mut self, path: impl Into<PathBuf>) -> Self {
        self.data = Some(path.into());
        self
    }

    fn resolve(&self, url: &str) -> PathBuf {
        if let Some(data) = &self.data {
            return data.clone();
        }
        let path = Path::new(url);
        if path.is_absolute() && path.exists() {
            return path.to_path_buf();
        }
        self.base_dir.join(url.trim_start_matches('/'))
    }
}

fn is_remote(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[async_trait]
impl Fetcher for FileFetcher {
    async fn request(&self, url: &str, params: &QueryParams) -> Result<serde_json::Value, FetchError> {
        if self.data.is_none() && is_remote(url) {
            return self.http.request(url, params).await;
        }

        let path = self.resolve(url);
        log::debug!("[fetcher] reading {}", path.display());
        let body = tokio::fs::read_to_string(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FetchError::not_found(path.display().to_string()),
            _ => FetchError::Failed(format!("{}: {}", path.display(), e)),
        })?;
        serde_json::from_str(&body).map_err(|e| FetchError::parse_with_body(e.to_string(), body))
    }
}
