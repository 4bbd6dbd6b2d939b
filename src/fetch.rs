use reqwest::header::{HeaderMap, LOCATION};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

use crate::config::{FETCH_MAX_ATTEMPTS, FETCH_RETRY_DELAY_MS, MAX_REDIRECTS};
use crate::error::FetchError;

/// Response body after opportunistic JSON decoding. A parse failure keeps
/// the raw text; callers must accept either shape.
#[derive(Debug, Clone)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }
}

/// One completed HTTP exchange, redirects already resolved.
#[derive(Debug)]
pub struct FetchResult {
    pub body: ResponseBody,
    pub status: u16,
    pub headers: HeaderMap,
}

#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub max_redirects: u32,
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_redirects: MAX_REDIRECTS,
            max_attempts: FETCH_MAX_ATTEMPTS,
            retry_delay: Duration::from_millis(FETCH_RETRY_DELAY_MS),
        }
    }
}

/// HTTP GET with bounded redirect-following and transport-error retry.
///
/// The client has automatic redirects disabled; 301/302 handling, the
/// redirect bound and the retry loop all live in [`Fetcher::get`]. No
/// state is retained between calls.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    config: FetcherConfig,
}

impl Fetcher {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_config(FetcherConfig::default())
    }

    pub fn with_config(config: FetcherConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client, config })
    }

    /// GET `url`, following 301/302 up to the configured bound and retrying
    /// connection-level failures after a fixed delay. HTTP error statuses
    /// come back as ordinary results; interpreting them is the caller's job.
    pub async fn get(&self, url: &str) -> Result<FetchResult, FetchError> {
        let mut url = Url::parse(url)?;
        let mut redirects = 0u32;
        let mut failures = 0u32;

        loop {
            match self.attempt(url.as_str()).await {
                Ok((status, headers, text)) => {
                    failures = 0;

                    if status == 301 || status == 302 {
                        if redirects == self.config.max_redirects {
                            return Err(FetchError::TooManyRedirects(self.config.max_redirects));
                        }
                        let location = headers
                            .get(LOCATION)
                            .and_then(|value| value.to_str().ok())
                            .ok_or(FetchError::MissingLocation)?;
                        let next = url.join(location)?;
                        debug!("following redirect {} -> {}", url, next);
                        url = next;
                        redirects += 1;
                        continue;
                    }

                    let body = match serde_json::from_str(&text) {
                        Ok(value) => ResponseBody::Json(value),
                        Err(_) => ResponseBody::Text(text),
                    };
                    return Ok(FetchResult {
                        body,
                        status,
                        headers,
                    });
                }
                Err(err) => {
                    failures += 1;
                    if failures >= self.config.max_attempts {
                        return Err(FetchError::Transport(err));
                    }
                    warn!(
                        "request to {} failed ({}), retrying in {:?}",
                        url, err, self.config.retry_delay
                    );
                    sleep(self.config.retry_delay).await;
                }
            }
        }
    }

    /// One request/response exchange. Redirect responses skip the body read;
    /// only their Location header matters.
    async fn attempt(&self, url: &str) -> Result<(u16, HeaderMap, String), reqwest::Error> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status().as_u16();
        let headers = resp.headers().clone();
        let text = if status == 301 || status == 302 {
            String::new()
        } else {
            resp.text().await?
        };
        Ok((status, headers, text))
    }
}
