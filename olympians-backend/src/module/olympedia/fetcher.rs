//! Rate-limited page fetcher
//!
//! Every request, first attempts included, waits for the current delay.
//! HTTP 429 doubles the delay (capped) and retries; any other failure aborts
//! the call. A success resets the delay to the base value, so the delay
//! carries sustained throttling across calls and recovers as soon as the
//! site answers again.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use std::time::Duration;

use crate::config::OlympediaConfig;

const SESSION_COOKIE_NAME: &str = "_olympedia_session";

/// Status and body of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse {
    pub status: u16,
    pub body: String,
}

/// One HTTP GET. `Err` means the request never produced a status line
/// (timeout, connection failure, unreadable body).
#[async_trait]
pub trait PageTransport: Send + Sync {
    async fn get(&self, url: &str) -> anyhow::Result<PageResponse>;
}

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// reqwest-backed transport sending browser-like headers and the session cookie.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &OlympediaConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .default_headers(default_headers(config)?)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client })
    }
}

fn default_headers(config: &OlympediaConfig) -> anyhow::Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(header::DNT, HeaderValue::from_static("1"));
    headers.insert(header::UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(
        header::USER_AGENT,
        HeaderValue::from_str(&config.user_agent).context("Invalid user agent")?,
    );

    if config.session_cookie.is_empty() {
        tracing::warn!("No session cookie configured; olympedia.org may answer with login pages");
    } else {
        let cookie = format!("{}={}", SESSION_COOKIE_NAME, config.session_cookie);
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&cookie).context("Invalid session cookie")?,
        );
    }

    Ok(headers)
}

#[async_trait]
impl PageTransport for HttpTransport {
    async fn get(&self, url: &str) -> anyhow::Result<PageResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?;

        Ok(PageResponse { status, body })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Attempts per call, the first one included.
    pub max_attempts: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(4),
            max_delay: Duration::from_secs(60),
            max_attempts: 6,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Fetch failed for {url}: {reason}")]
    Transport { url: String, reason: String },

    #[error("Max retries ({attempts}) exceeded for {url}")]
    RetriesExhausted { url: String, attempts: u32 },
}

/// Fetcher owning the shared back-off delay.
///
/// `fetch` takes `&mut self`, so every request made through one fetcher is
/// serialized and reads the delay left behind by the previous one.
pub struct RateLimitedFetcher {
    transport: Box<dyn PageTransport>,
    sleeper: Box<dyn Sleeper>,
    policy: BackoffPolicy,
    current_delay: Duration,
}

impl RateLimitedFetcher {
    pub fn new(
        transport: Box<dyn PageTransport>,
        sleeper: Box<dyn Sleeper>,
        policy: BackoffPolicy,
    ) -> Self {
        Self {
            transport,
            sleeper,
            policy,
            current_delay: policy.base_delay,
        }
    }

    /// Fetcher talking to the real site through reqwest and tokio timers.
    pub fn from_config(config: &OlympediaConfig, policy: BackoffPolicy) -> anyhow::Result<Self> {
        Ok(Self::new(
            Box::new(HttpTransport::new(config)?),
            Box::new(TokioSleeper),
            policy,
        ))
    }

    pub fn current_delay(&self) -> Duration {
        self.current_delay
    }

    pub fn policy(&self) -> BackoffPolicy {
        self.policy
    }

    /// GET `url` and return the body.
    pub async fn fetch(&mut self, url: &str) -> Result<String, FetchError> {
        let max_attempts = self.policy.max_attempts;

        for attempt in 1..=max_attempts {
            self.sleeper.sleep(self.current_delay).await;

            let response = match self.transport.get(url).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!("Fetch failed for {}: {:#}", url, e);
                    return Err(FetchError::Transport {
                        url: url.to_string(),
                        reason: format!("{:#}", e),
                    });
                }
            };

            match response.status {
                200..=299 => {
                    self.current_delay = self.policy.base_delay;
                    return Ok(response.body);
                }
                429 => {
                    self.current_delay = (self.current_delay * 2).min(self.policy.max_delay);
                    tracing::warn!(
                        "[429] rate-limited, backing off {:.0}s (attempt {}/{}) → {}",
                        self.current_delay.as_secs_f64(),
                        attempt,
                        max_attempts,
                        url
                    );
                }
                status => {
                    tracing::warn!("HTTP {} for {}", status, url);
                    return Err(FetchError::Status {
                        url: url.to_string(),
                        status,
                    });
                }
            }
        }

        tracing::error!("Max retries exceeded for {}", url);
        Err(FetchError::RetriesExhausted {
            url: url.to_string(),
            attempts: max_attempts,
        })
    }
}
