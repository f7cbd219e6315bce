use std::path::Path;

use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::common::errors::{FsError, Result};

/// Options for `download_file_with`
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    /// Skip TLS certificate verification. Off unless explicitly enabled.
    pub accept_invalid_certs: bool,
}

impl DownloadOptions {
    pub fn insecure() -> Self {
        Self {
            accept_invalid_certs: true,
        }
    }
}

/// Download `url` to `dest` with certificate verification on
pub async fn download_file(dest: impl AsRef<Path>, url: &str) -> Result<u64> {
    download_file_with(dest, url, &DownloadOptions::default()).await
}

/// Single unauthenticated GET, body streamed straight to `dest`.
///
/// No resume, retry or checksum. The destination is created only once the
/// server has answered with a success status. Returns the bytes written.
pub async fn download_file_with(
    dest: impl AsRef<Path>,
    url: &str,
    options: &DownloadOptions,
) -> Result<u64> {
    let dest = dest.as_ref();
    let network = |source: reqwest::Error| FsError::Network {
        url: url.to_string(),
        source,
    };

    if options.accept_invalid_certs {
        warn!(url, "TLS certificate verification disabled for download");
    }

    let client = reqwest::Client::builder()
        .danger_accept_invalid_certs(options.accept_invalid_certs)
        .build()
        .map_err(network)?;

    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(network)?
        .error_for_status()
        .map_err(network)?;

    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(|e| FsError::io(dest, e))?;

    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await.map_err(network)? {
        file.write_all(&chunk)
            .await
            .map_err(|e| FsError::io(dest, e))?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(|e| FsError::io(dest, e))?;

    debug!(url, dest = %dest.display(), bytes = written, "download complete");
    Ok(written)
}
