//! HTTP client for portal fetches with rate limiting and bounded retry
//!
//! Wraps reqwest with browser-like default headers, a cookie jar scoped to
//! one run, a governor rate limiter that enforces the minimum inter-request
//! spacing toward the portal host, and a bounded exponential-backoff retry
//! loop for transient transport failures.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue, REFERER, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::config::defaults;

/// Backoff is capped so a long retry chain cannot stall a run for minutes.
const MAX_BACKOFF_MS: u64 = 60_000;

/// Fetch failure, split by whether a bounded retry is worthwhile.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {url}")]
    Status { status: StatusCode, url: String },

    #[error("invalid HTTP client configuration: {reason}")]
    Configuration { reason: String },
}

impl FetchError {
    /// Transient failures (timeouts, connection errors, server-side 5xx,
    /// throttling) are retried with backoff; everything else aborts.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Transport { source, .. } => source.is_timeout() || source.is_connect(),
            Self::Status { status, .. } => {
                status.is_server_error()
                    || *status == StatusCode::TOO_MANY_REQUESTS
                    || *status == StatusCode::REQUEST_TIMEOUT
            }
            Self::Configuration { .. } => false,
        }
    }

    fn configuration(reason: impl ToString) -> Self {
        Self::Configuration {
            reason: reason.to_string(),
        }
    }
}

/// HTTP client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    pub user_agent: String,
    pub accept_language: String,
    pub referer: String,
    pub timeout_seconds: u64,
    /// Upper bound on request rate toward the portal; the inverse is the
    /// minimum spacing between consecutive requests.
    pub max_requests_per_second: u32,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::USER_AGENT.to_string(),
            accept_language: defaults::ACCEPT_LANGUAGE.to_string(),
            referer: defaults::BASE_URL.to_string(),
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            max_requests_per_second: defaults::MAX_REQUESTS_PER_SECOND,
            max_retries: defaults::MAX_RETRIES,
            retry_base_delay_ms: defaults::RETRY_BASE_DELAY_MS,
        }
    }
}

/// Rate-limited HTTP client with a per-run cookie session.
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    config: HttpClientConfig,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).map_err(FetchError::configuration)?,
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language).map_err(FetchError::configuration)?,
        );
        headers.insert(
            REFERER,
            HeaderValue::from_str(&config.referer).map_err(FetchError::configuration)?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .cookie_store(true)
            .build()
            .map_err(FetchError::configuration)?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.max_requests_per_second)
                .ok_or_else(|| FetchError::configuration("request rate must be greater than 0"))?,
        );
        let rate_limiter = RateLimiter::direct(quota);

        Ok(Self {
            client,
            rate_limiter,
            config,
        })
    }

    /// GET a URL and return the response body as text.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.send_with_retry(self.client.get(url), url).await?;
        self.read_text(response, url).await
    }

    /// POST an HTML-form-encoded body and return the response body as text.
    pub async fn post_form(
        &self,
        url: &str,
        form: &[(&str, String)],
    ) -> Result<String, FetchError> {
        let request = self.client.post(url).form(form);
        let response = self.send_with_retry(request, url).await?;
        self.read_text(response, url).await
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    async fn read_text(&self, response: Response, url: &str) -> Result<String, FetchError> {
        let text = response.text().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            source: e,
        })?;
        debug!("fetched {} ({} chars)", url, text.len());
        Ok(text)
    }

    /// Send a request, retrying recoverable failures with exponential
    /// backoff up to the configured attempt limit.
    async fn send_with_retry(
        &self,
        request: RequestBuilder,
        url: &str,
    ) -> Result<Response, FetchError> {
        let mut attempt = 0u32;
        loop {
            self.rate_limiter.until_ready().await;

            let this_try = request.try_clone().ok_or_else(|| {
                FetchError::configuration("request body is not replayable for retry")
            })?;

            let failure = match this_try.send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => FetchError::Status {
                    status: response.status(),
                    url: url.to_string(),
                },
                Err(e) => FetchError::Transport {
                    url: url.to_string(),
                    source: e,
                },
            };

            attempt += 1;
            if attempt > self.config.max_retries || !failure.is_recoverable() {
                return Err(failure);
            }

            let backoff = self.backoff_delay(attempt);
            warn!(
                "attempt {}/{} for {} failed ({}), retrying in {:?}",
                attempt, self.config.max_retries, url, failure, backoff
            );
            sleep(backoff).await;
        }
    }

    /// Exponential backoff with a small attempt-derived jitter, capped.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponential = self
            .config
            .retry_base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
        let jitter = u64::from(attempt % 3) * 250;
        Duration::from_millis(exponential.saturating_add(jitter).min(MAX_BACKOFF_MS))
    }
}
