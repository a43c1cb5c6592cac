//! In-memory [`Transport`] for unit tests

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::client::Transport;
use crate::error::{Result, RezkaError};

/// Canned response for a GET
pub(crate) enum Canned {
    Json(Value),
    Status(u16),
    Malformed,
}

/// Scripted transport that records every call
pub(crate) struct FakeTransport {
    reachable: HashSet<String>,
    responses: HashMap<String, Canned>,
    probe_delay: Duration,
    probed: Mutex<Vec<String>>,
    probe_timeouts: Mutex<Vec<Duration>>,
    requested: Mutex<Vec<String>>,
}

impl FakeTransport {
    /// Only the listed probe URLs answer
    pub(crate) fn reachable<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            reachable: urls.into_iter().map(Into::into).collect(),
            responses: HashMap::new(),
            probe_delay: Duration::ZERO,
            probed: Mutex::new(Vec::new()),
            probe_timeouts: Mutex::new(Vec::new()),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn respond(mut self, url: &str, canned: Canned) -> Self {
        self.responses.insert(url.to_string(), canned);
        self
    }

    pub(crate) fn with_probe_delay(mut self, delay: Duration) -> Self {
        self.probe_delay = delay;
        self
    }

    pub(crate) fn probed(&self) -> Vec<String> {
        self.probed.lock().unwrap().clone()
    }

    pub(crate) fn probe_count(&self) -> usize {
        self.probed.lock().unwrap().len()
    }

    pub(crate) fn last_probe_timeout(&self) -> Option<Duration> {
        self.probe_timeouts.lock().unwrap().last().copied()
    }

    pub(crate) fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn probe(&self, url: &str, timeout: Duration) -> Result<()> {
        self.probed.lock().unwrap().push(url.to_string());
        self.probe_timeouts.lock().unwrap().push(timeout);

        if !self.probe_delay.is_zero() {
            tokio::time::sleep(self.probe_delay).await;
        }

        if self.reachable.contains(url) {
            Ok(())
        } else {
            Err(RezkaError::Status {
                status: 503,
                url: url.to_string(),
            })
        }
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        self.requested.lock().unwrap().push(url.to_string());

        match self.responses.get(url) {
            Some(Canned::Json(value)) => Ok(value.clone()),
            Some(Canned::Status(status)) => Err(RezkaError::Status {
                status: *status,
                url: url.to_string(),
            }),
            Some(Canned::Malformed) => Ok(serde_json::from_str("<html>oops</html>")?),
            None => Err(RezkaError::NotFound(url.to_string())),
        }
    }
}
