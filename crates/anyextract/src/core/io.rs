//! Byte acquisition: local files and remote locations.

use crate::core::config::HttpSettings;
use crate::{AnyExtractError, Result};
use std::path::Path;
use tokio::fs;
use tokio::time::Duration;

/// Read a file asynchronously.
///
/// A missing file is reported as `Io` with kind `NotFound`, naming the path.
pub async fn read_file_async(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AnyExtractError::not_found(path.display())
        } else {
            AnyExtractError::Io(e)
        }
    })
}

/// Build the shared HTTP client used for downloads, wiki and vision requests.
pub fn build_http_client(settings: &HttpSettings) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .build()
        .map_err(|e| AnyExtractError::configuration_with_source("Failed to create HTTP client", e))
}

/// True when `input` parses as an `http` or `https` URL.
pub fn looks_like_url(input: &str) -> bool {
    reqwest::Url::parse(input)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Download `url`, optionally sending `auth_header` as the `Authorization` value.
///
/// Transport failures and non-success status codes are `Io` errors naming the
/// URL; a status failure also carries the status and response body.
pub async fn fetch_bytes(client: &reqwest::Client, url: &str, auth_header: Option<&str>) -> Result<Vec<u8>> {
    let mut request = client.get(url);
    if let Some(auth) = auth_header {
        request = request.header(reqwest::header::AUTHORIZATION, auth);
    }

    let response = request.send().await.map_err(|e| fetch_error(url, e))?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(fetch_error(url, format!("HTTP {}: {}", status, body)));
    }

    let bytes = response.bytes().await.map_err(|e| fetch_error(url, e))?;
    tracing::debug!(url, size_bytes = bytes.len(), "downloaded remote document");
    Ok(bytes.to_vec())
}

fn fetch_error(url: &str, detail: impl std::fmt::Display) -> AnyExtractError {
    AnyExtractError::Io(std::io::Error::other(format!("Failed to fetch {}: {}", url, detail)))
}
