use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Sliding-window parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdmissionConfig {
    pub max_events: usize,
    #[serde(with = "humantime_serde")]
    pub window: Duration,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            max_events: 5,
            window: Duration::from_secs(1),
        }
    }
}

/// Per-client sliding-window limiter for mutating requests.
#[derive(Clone)]
pub struct AdmissionController {
    config: AdmissionConfig,
    windows: Arc<Mutex<HashMap<String, VecDeque<Instant>>>>,
}

impl AdmissionController {
    pub fn new(config: AdmissionConfig) -> Self {
        Self {
            config,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> AdmissionConfig {
        self.config
    }

    /// Evict timestamps that fell out of the window ending at `now`; admit and
    /// record `now` if fewer than `max_events` remain. Denied attempts are not
    /// recorded. Eviction, the count and the append happen under one lock.
    pub fn admit(&self, client: &str, now: Instant) -> Result<bool> {
        let mut windows = self.windows.lock()
            .map_err(|_| Error::Internal("Failed to acquire lock on admission windows".to_string()))?;

        let window = windows.entry(client.to_string()).or_default();
        evict_expired(window, now, self.config.window);

        if window.len() < self.config.max_events {
            window.push_back(now);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Time until the oldest recorded event for `client` leaves the window.
    pub fn retry_after(&self, client: &str, now: Instant) -> Result<Duration> {
        let windows = self.windows.lock()
            .map_err(|_| Error::Internal("Failed to acquire lock on admission windows".to_string()))?;

        let wait = windows
            .get(client)
            .and_then(|window| window.front())
            .map(|oldest| (*oldest + self.config.window).saturating_duration_since(now))
            .unwrap_or_default();
        Ok(wait)
    }

    /// Drop clients whose windows hold no live events at `now`.
    pub fn purge_idle(&self, now: Instant) -> Result<usize> {
        let mut windows = self.windows.lock()
            .map_err(|_| Error::Internal("Failed to acquire lock on admission windows".to_string()))?;

        let initial_count = windows.len();
        windows.retain(|_, window| {
            evict_expired(window, now, self.config.window);
            !window.is_empty()
        });

        Ok(initial_count - windows.len())
    }

    /// Number of client addresses currently tracked.
    pub fn tracked_clients(&self) -> Result<usize> {
        let windows = self.windows.lock()
            .map_err(|_| Error::Internal("Failed to acquire lock on admission windows".to_string()))?;
        Ok(windows.len())
    }
}

fn evict_expired(window: &mut VecDeque<Instant>, now: Instant, length: Duration) {
    while let Some(oldest) = window.front() {
        if now.saturating_duration_since(*oldest) > length {
            window.pop_front();
        } else {
            break;
        }
    }
}
