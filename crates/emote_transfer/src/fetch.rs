//! Validated HTTP retrieval of images and archives.

use async_trait::async_trait;
use emote_error::{ConfigError, EmoteResult, FetchError, FetchErrorKind};
use emote_rate_limit::HttpSettings;
use reqwest::{Client, Response, Url, header::CONTENT_TYPE};
use std::time::Duration;
use tracing::{debug, instrument};

/// MIME types accepted when downloading a single emote image.
pub const IMAGE_MIMETYPES: &[&str] = &["image/png", "image/jpeg", "image/gif", "image/webp"];

/// MIME types accepted when downloading an archive for import.
///
/// Hosts often serve archives as generic binary data, so `application/octet-stream`
/// is accepted and the container is identified from its content afterwards.
pub const ARCHIVE_MIMETYPES: &[&str] = &[
    "application/x-tar",
    "application/zip",
    "application/x-zip-compressed",
    "application/octet-stream",
    "multipart/x-zip",
];

/// Largest body `HttpFetcher` downloads unless configured otherwise.
pub const DEFAULT_BODY_LIMIT: u64 = 50_000_000;

/// Retrieves remote files, checking their status and declared MIME type.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Download `url` and return its body.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute http(s) URL
    /// * `allowed` - MIME types the response may declare (parameters such as
    ///   `; charset=` are ignored)
    /// * `check_headers` - Issue a HEAD request first and give up before downloading
    ///   the body if its status or type is wrong
    ///
    /// # Errors
    ///
    /// Every failure maps onto a `FetchErrorKind`; nothing is retried.
    async fn fetch(
        &self,
        url: &str,
        allowed: &[&str],
        check_headers: bool,
    ) -> Result<Vec<u8>, FetchError>;
}

/// `Fetcher` backed by a shared `reqwest` client.
///
/// Cloning is cheap and clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    head_timeout: Duration,
    body_limit: u64,
}

impl HttpFetcher {
    /// Build a fetcher from the `[http]` configuration section.
    ///
    /// The read timeout bounds the whole GET, including the body.
    pub fn new(settings: &HttpSettings) -> EmoteResult<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent().as_str())
            .timeout(settings.read_timeout())
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(client, settings.head_timeout()))
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client, head_timeout: Duration) -> Self {
        Self {
            client,
            head_timeout,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Give up on bodies larger than `limit` bytes.
    ///
    /// A declared `Content-Length` over the limit fails before any of the body is
    /// read; otherwise the download stops as soon as the limit is passed.
    pub fn with_body_limit(mut self, limit: u64) -> Self {
        self.body_limit = limit;
        self
    }

    async fn read_body(&self, mut response: Response) -> Result<Vec<u8>, FetchError> {
        let too_large = || FetchError::new(FetchErrorKind::TooLarge(self.body_limit));

        if response.content_length().is_some_and(|declared| declared > self.body_limit) {
            return Err(too_large());
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(classify)? {
            if (body.len() + chunk.len()) as u64 > self.body_limit {
                debug!(limit = self.body_limit, "Body exceeded the download limit");
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }

    async fn check_headers(&self, url: Url, allowed: &[&str]) -> Result<(), FetchError> {
        let response = self
            .client
            .head(url)
            .timeout(self.head_timeout)
            .send()
            .await
            .map_err(classify)?;
        validate(&response, allowed)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[instrument(skip(self, allowed))]
    async fn fetch(
        &self,
        url: &str,
        allowed: &[&str],
        check_headers: bool,
    ) -> Result<Vec<u8>, FetchError> {
        let url = parse_url(url)?;

        if check_headers {
            self.check_headers(url.clone(), allowed).await?;
        }

        let response = self.client.get(url).send().await.map_err(classify)?;
        validate(&response, allowed)?;

        let body = self.read_body(response).await?;
        debug!(size = body.len(), "Downloaded");
        Ok(body)
    }
}

fn parse_url(url: &str) -> Result<Url, FetchError> {
    let parsed =
        Url::parse(url).map_err(|e| FetchError::new(FetchErrorKind::InvalidUrl(e.to_string())))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(FetchError::new(FetchErrorKind::InvalidUrl(format!(
            "unsupported scheme {}",
            scheme
        )))),
    }
}

/// Strip parameters and normalise case, e.g. `Image/PNG; charset=x` -> `image/png`.
fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn validate(response: &Response, allowed: &[&str]) -> Result<(), FetchError> {
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::new(FetchErrorKind::Status(status.as_u16())));
    }

    let declared = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(essence)
        .unwrap_or_default();

    if allowed.iter().any(|mime| *mime == declared) {
        Ok(())
    } else {
        debug!(content_type = %declared, "Rejected content type");
        Err(FetchError::new(FetchErrorKind::InvalidFile))
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    let kind = if err.is_timeout() {
        FetchErrorKind::Timeout
    } else if err.is_builder() {
        FetchErrorKind::InvalidUrl(err.to_string())
    } else if let Some(status) = err.status() {
        FetchErrorKind::Status(status.as_u16())
    } else {
        FetchErrorKind::Transport(err.to_string())
    };
    FetchError::new(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_essence_drops_parameters() {
        assert_eq!(essence("Image/PNG; charset=binary"), "image/png");
        assert_eq!(essence("application/zip"), "application/zip");
        assert_eq!(essence(""), "");
    }

    #[test]
    fn test_parse_url_rejects_non_http() {
        let err = parse_url("ftp://example.com/a.png").unwrap_err();
        assert!(matches!(err.kind, FetchErrorKind::InvalidUrl(_)));

        let err = parse_url("not a url").unwrap_err();
        assert!(matches!(err.kind, FetchErrorKind::InvalidUrl(_)));

        assert!(parse_url("https://cdn.example.com/emojis/1.png").is_ok());
    }
}
