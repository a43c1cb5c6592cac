//! Mirror selection
//!
//! The backend is served from several interchangeable origins. Before the
//! first request a session walks the configured list in priority order and
//! settles on the first origin that answers a HEAD probe.

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::client::Transport;
use crate::error::{Result, RezkaError};
use crate::url::{build_probe_url, normalize_base};

/// Mirrors used when no list is configured, highest priority first
pub const DEFAULT_MIRRORS: &[&str] = &["https://hdrezka.ag", "https://flymaterez.net"];

/// Non-empty, ordered list of absolute http(s) mirror origins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorList {
    mirrors: Vec<String>,
}

impl MirrorList {
    /// Validate and normalize a candidate list
    ///
    /// # Errors
    /// - `InvalidMirrorList` if `mirrors` is empty
    /// - `InvalidUrl` if an entry is not an absolute http(s) URL
    pub fn new<I, S>(mirrors: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut validated = Vec::new();

        for mirror in mirrors {
            let raw = mirror.as_ref().trim();
            let parsed = Url::parse(raw).map_err(|_| RezkaError::InvalidUrl(raw.to_string()))?;
            if !matches!(parsed.scheme(), "http" | "https") || !parsed.has_host() {
                return Err(RezkaError::InvalidUrl(raw.to_string()));
            }
            validated.push(normalize_base(raw));
        }

        if validated.is_empty() {
            return Err(RezkaError::InvalidMirrorList(
                "at least one mirror is required".to_string(),
            ));
        }

        Ok(Self { mirrors: validated })
    }

    /// Highest-priority mirror, used as the fail-open fallback
    pub fn primary(&self) -> &str {
        &self.mirrors[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.mirrors.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.mirrors.len()
    }

    /// Never true for a constructed list
    pub fn is_empty(&self) -> bool {
        self.mirrors.is_empty()
    }
}

impl Default for MirrorList {
    fn default() -> Self {
        Self {
            mirrors: DEFAULT_MIRRORS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

/// Picks a reachable mirror
///
/// Probes are sequential, one per candidate, each bounded by `probe_timeout`.
/// There are no retries and the result is not re-checked later.
#[derive(Clone)]
pub struct MirrorResolver {
    transport: Arc<dyn Transport>,
    probe_timeout: Duration,
}

impl MirrorResolver {
    pub fn new(transport: Arc<dyn Transport>, probe_timeout: Duration) -> Self {
        Self {
            transport,
            probe_timeout,
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    /// Return the first mirror that answers its probe
    ///
    /// Stops probing at the first success. If every probe fails the primary
    /// mirror is returned anyway, so callers always get a base URL.
    pub async fn resolve(&self, mirrors: &MirrorList) -> String {
        for mirror in mirrors.iter() {
            let probe_url = build_probe_url(mirror);
            match self.transport.probe(&probe_url, self.probe_timeout).await {
                Ok(()) => {
                    tracing::info!("Using mirror {}", mirror);
                    return mirror.to_string();
                }
                Err(e) => {
                    tracing::warn!("Mirror {} is not available: {}", mirror, e);
                }
            }
        }

        tracing::warn!(
            "No mirror answered, falling back to {}",
            mirrors.primary()
        );
        mirrors.primary().to_string()
    }
}
