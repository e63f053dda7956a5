//! Shared HTTP plumbing for generator adapters.
//!
//! Every vendor adapter sends JSON over HTTPS and maps failures the same way;
//! this module holds that common code plus the URL fetcher the engine uses to
//! download generated images.

use crate::generators::base::GeneratorError;
use reqwest::{Client, Response};
use std::path::Path;
use tracing::{debug, error};

/// HTTP executor shared by the adapters.
///
/// Cloning is cheap; the underlying `reqwest::Client` keeps one connection pool.
#[derive(Debug, Clone, Default)]
pub struct HttpExecutor {
    client: Client,
}

impl HttpExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing client (e.g. one configured with a proxy).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Download the resource behind `url`.
    ///
    /// Supports `http://`, `https://` and `file://` URLs. Any other scheme is
    /// rejected with `GeneratorError::InvalidResponse`.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, GeneratorError> {
        if let Some(path) = url.strip_prefix("file://") {
            debug!(path, "Reading local artifact");
            return Ok(tokio::fs::read(Path::new(path)).await?);
        }

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(GeneratorError::InvalidResponse(format!(
                "Unsupported URL scheme: {url}"
            )));
        }

        debug!(url, "Fetching remote artifact");
        let response = ensure_success(self.client.get(url).send().await?).await?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

/// Turn a non-2xx response into `GeneratorError::Api`, keeping the body as message.
pub async fn ensure_success(response: Response) -> Result<Response, GeneratorError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    error!(status = %status, body = %message, "Upstream API returned error");
    Err(GeneratorError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_fetch_file_url() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("image.png");
        std::fs::write(&path, b"png-bytes").unwrap();

        let executor = HttpExecutor::new();
        let url = format!("file://{}", path.display());
        let bytes = executor.fetch_bytes(&url).await.unwrap();

        assert_eq!(bytes, b"png-bytes");
    }

    #[tokio::test]
    async fn test_fetch_missing_file() {
        let dir = tempdir().unwrap();
        let url = format!("file://{}", dir.path().join("missing.png").display());

        let result = HttpExecutor::new().fetch_bytes(&url).await;
        assert!(matches!(result, Err(GeneratorError::Io(_))));
    }

    #[tokio::test]
    async fn test_fetch_rejects_unknown_scheme() {
        let result = HttpExecutor::new().fetch_bytes("ftp://example.com/a.png").await;
        assert!(matches!(result, Err(GeneratorError::InvalidResponse(_))));
    }
}
