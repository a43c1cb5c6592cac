//! HTTP transport with rate limiting for the rezka backend
//!
//! Provides the [`Transport`] seam used by the mirror resolver and the
//! session, and [`HttpTransport`], the reqwest-backed implementation that
//! spaces data requests to respect the backend's request budget.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::error::{Result, RezkaError};
use crate::mirror::DEFAULT_MIRRORS;

/// Default per-candidate probe timeout in milliseconds
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5000;

/// Longest spacing the rate limiter will enforce between two requests
pub const MAX_REQUEST_INTERVAL: Duration = Duration::from_secs(3600);

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Configuration for the client session
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Candidate mirror origins in priority order
    pub mirrors: Vec<String>,
    /// Timeout for each mirror probe in milliseconds (default: 5000)
    pub probe_timeout_ms: u64,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Maximum data requests per second (default: 1.0, the backend allows 60/min)
    pub requests_per_second: f64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            mirrors: DEFAULT_MIRRORS.iter().map(|m| m.to_string()).collect(),
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            timeout_secs: 30,
            requests_per_second: 1.0,
        }
    }
}

impl ClientConfig {
    /// Default configuration overlaid with `REZKA_*` environment variables
    ///
    /// Recognized variables:
    /// - `REZKA_MIRRORS` - comma-separated list of mirror origins
    /// - `REZKA_PROBE_TIMEOUT_MS`
    /// - `REZKA_TIMEOUT_SECS`
    /// - `REZKA_REQUESTS_PER_SECOND`
    ///
    /// Values that fail to parse are ignored and the default is kept.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] but reads variables through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("REZKA_MIRRORS") {
            let mirrors: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect();
            if mirrors.is_empty() {
                tracing::warn!("REZKA_MIRRORS is set but empty, keeping default mirrors");
            } else {
                config.mirrors = mirrors;
            }
        }

        if let Some(value) = parse_var(&lookup, "REZKA_PROBE_TIMEOUT_MS") {
            config.probe_timeout_ms = value;
        }
        if let Some(value) = parse_var(&lookup, "REZKA_TIMEOUT_SECS") {
            config.timeout_secs = value;
        }
        if let Some(value) = parse_var::<_, f64>(&lookup, "REZKA_REQUESTS_PER_SECOND") {
            if request_interval(value).is_some() {
                config.requests_per_second = value;
            } else {
                tracing::warn!("Ignoring out-of-range REZKA_REQUESTS_PER_SECOND={}", value);
            }
        }

        config
    }

    /// Replace the mirror list
    pub fn with_mirrors<I, S>(mut self, mirrors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mirrors = mirrors.into_iter().map(Into::into).collect();
        self
    }

    /// Probe timeout as a [`Duration`]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

/// Spacing implied by a rate; `None` for rates that are not finite or whose
/// interval does not fit in a [`Duration`]. Non-positive rates mean no spacing.
fn request_interval(requests_per_second: f64) -> Option<Duration> {
    if !requests_per_second.is_finite() {
        return None;
    }
    if requests_per_second <= 0.0 {
        return Some(Duration::ZERO);
    }
    Duration::try_from_secs_f64(1.0 / requests_per_second).ok()
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring unparsable {}={:?}", key, raw);
            None
        }
    }
}

/// Rate limiter to control request frequency
///
/// Ensures requests are spaced at least `min_interval` apart.
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Arc<Mutex<Instant>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the specified requests per second
    ///
    /// A non-positive or non-finite rate disables limiting. The interval is
    /// capped at [`MAX_REQUEST_INTERVAL`].
    pub fn new(requests_per_second: f64) -> Self {
        let min_interval = if requests_per_second.is_finite() && requests_per_second > 0.0 {
            request_interval(requests_per_second)
                .map_or(MAX_REQUEST_INTERVAL, |interval| interval.min(MAX_REQUEST_INTERVAL))
        } else {
            Duration::ZERO
        };
        let now = Instant::now();
        Self {
            min_interval,
            last_request: Arc::new(Mutex::new(now.checked_sub(min_interval).unwrap_or(now))),
        }
    }

    /// Acquire permission to make a request
    ///
    /// If called before the minimum interval has passed since the last request,
    /// this method will sleep until the interval has elapsed.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();

        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }

        *last = Instant::now();
    }

    /// Get the minimum interval between requests
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

/// Network seam used by the resolver and the session
///
/// [`HttpTransport`] is the production implementation; tests inject fakes.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Lightweight reachability check. `Ok(())` means a success status came back
    /// within `timeout`.
    async fn probe(&self, url: &str, timeout: Duration) -> Result<()>;

    /// GET `url` and parse the body as JSON
    async fn get_json(&self, url: &str) -> Result<Value>;
}

/// reqwest-backed [`Transport`]
///
/// Handles all HTTP communication with the backend:
/// - HEAD probes bounded by the caller's timeout
/// - Rate limiting for data requests
/// - Status code mapping to [`RezkaError`]
pub struct HttpTransport {
    client: reqwest::Client,
    rate_limiter: RateLimiter,
}

impl HttpTransport {
    /// Create a new transport with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(&ClientConfig::default())
    }

    /// Create a new transport with custom configuration
    pub fn with_config(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(RezkaError::HttpError)?;

        Ok(Self {
            client,
            rate_limiter: RateLimiter::new(config.requests_per_second),
        })
    }

    /// Get a reference to the rate limiter (for testing)
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn probe(&self, url: &str, timeout: Duration) -> Result<()> {
        let response = self
            .client
            .head(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(RezkaError::HttpError)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(RezkaError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            })
        }
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        self.rate_limiter.acquire().await;
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(RezkaError::HttpError)?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(RezkaError::RateLimited);
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RezkaError::NotFound(url.to_string()));
        }

        if !status.is_success() {
            return Err(RezkaError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await.map_err(RezkaError::HttpError)?;
        Ok(serde_json::from_str(&body)?)
    }
}
