use std::path::{Path, PathBuf};
use std::time::Duration;

use co2cast_core::LoadError;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use tracing::{debug, info, instrument};

use crate::artifact::ArtifactModel;
use crate::source::{cache_file_name, resolve_download_url};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Downloads remote artifacts into a local cache directory.
#[derive(Debug, Clone)]
pub struct ArtifactFetcher {
    client: reqwest::Client,
    cache_dir: PathBuf,
}

impl ArtifactFetcher {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Result<Self, LoadError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LoadError::Remote(e.to_string()))?;
        Ok(Self {
            client,
            cache_dir: cache_dir.into(),
        })
    }

    pub fn cached_path(&self, url: &Url) -> PathBuf {
        self.cache_dir.join(cache_file_name(url))
    }

    /// Returns the cached copy when present, otherwise downloads it first.
    /// Only bodies that parse as a valid artifact are written to the cache.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_to_cache(&self, url: &Url) -> Result<PathBuf, LoadError> {
        let target = self.cached_path(url);
        if tokio::fs::try_exists(&target).await.unwrap_or(false) {
            debug!(path = %target.display(), "Using cached artifact");
            return Ok(target);
        }

        let download = resolve_download_url(url);
        info!(download = %download, "Downloading model artifact");

        let resp = self
            .client
            .get(download)
            .send()
            .await
            .map_err(|e| LoadError::Remote(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(LoadError::Remote(format!(
                "download failed: {}",
                resp.status()
            )));
        }

        let is_html = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("text/html"));
        if is_html {
            return Err(LoadError::Remote(
                "received an HTML page instead of a model artifact (is the link shared publicly?)"
                    .to_string(),
            ));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| LoadError::Remote(e.to_string()))?;

        let text = std::str::from_utf8(&bytes)
            .map_err(|_| LoadError::Malformed("downloaded artifact is not UTF-8 text".to_string()))?;
        ArtifactModel::from_json(text)?;

        tokio::fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| io_error(&self.cache_dir, e))?;

        // Partial downloads must never be picked up as a cache hit.
        let partial = target.with_extension("part");
        tokio::fs::write(&partial, &bytes)
            .await
            .map_err(|e| io_error(&partial, e))?;
        tokio::fs::rename(&partial, &target)
            .await
            .map_err(|e| io_error(&target, e))?;

        info!(bytes = bytes.len(), path = %target.display(), "Artifact cached");
        Ok(target)
    }
}

pub(crate) fn io_error(path: &Path, e: std::io::Error) -> LoadError {
    LoadError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}
