//! Remote media download.

use std::time::Duration;

use bytes::Bytes;
use gifsmith_core::MediaError;
use gifsmith_logging::redact_url;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::debug;

const USER_AGENT: &str = concat!("gifsmith/", env!("CARGO_PKG_VERSION"));

/// A downloaded payload and what the server said about it.
#[derive(Debug, Clone)]
pub struct FetchedMedia {
    pub url: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// HTTP downloader with a fixed request timeout.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Result<Self, MediaError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| MediaError::Fetch {
                url: String::new(),
                status: None,
                reason: format!("could not build http client: {e}"),
            })?;
        Ok(Self { client })
    }

    /// GET `url` into memory. Non-2xx responses and transport failures are `MediaError::Fetch`.
    pub async fn fetch(&self, url: &str) -> Result<FetchedMedia, MediaError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(MediaError::Fetch {
                url: redact_url(url),
                status: Some(status.as_u16()),
                reason: format!("HTTP {status}"),
            });
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = resp.bytes().await.map_err(|e| transport_error(url, e))?;
        debug!(url = %redact_url(url), bytes = bytes.len(), "Downloaded media");

        Ok(FetchedMedia {
            url: url.to_string(),
            content_type,
            bytes,
        })
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> MediaError {
    let reason = if err.is_timeout() {
        "request timed out".to_string()
    } else {
        err.to_string()
    };
    MediaError::Fetch {
        url: redact_url(url),
        status: err.status().map(|s| s.as_u16()),
        reason,
    }
}
