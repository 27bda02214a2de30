//! Generic HTTP download to a fixed path.

use std::path::Path;

use casmclips_common::{Error, Result};
use tokio::io::AsyncWriteExt;

/// Streams a URL's body to disk.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// GET `url` and write the body to `target`, returning the byte count.
    ///
    /// Redirects are followed; a non-success final status is an error.
    pub async fn fetch_to(&self, url: &str, target: &Path) -> Result<u64> {
        tracing::info!("Fetching {} to {}", url, target.display());

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::fetch(url, e))?;

        let mut file = tokio::fs::File::create(target)
            .await
            .map_err(|e| Error::filesystem(target, e))?;

        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await.map_err(|e| Error::fetch(url, e))? {
            file.write_all(&chunk)
                .await
                .map_err(|e| Error::filesystem(target, e))?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(|e| Error::filesystem(target, e))?;

        tracing::debug!("Fetched {} bytes from {}", written, url);
        Ok(written)
    }
}
