use crate::app::ports::LookupError;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use tracing::warn;

/// Trailing-window call budget shared by every lookup source.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Calls allowed per source within the window. Zero disables limiting.
    pub max_calls: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_calls: 100,
            window: Duration::from_secs(60),
        }
    }
}

/// Counts recent calls per lookup source and rejects once the trailing
/// window is full. One limiter value is injected into the orchestrator at
/// construction; clones share the same counters.
#[derive(Clone)]
pub struct SourceRateLimiter {
    inner: Arc<Inner>,
}

struct Inner {
    config: RateLimitConfig,
    calls: Mutex<HashMap<&'static str, VecDeque<Instant>>>,
}

impl SourceRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                calls: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// No limiting at all; used by tests and one-off runs.
    pub fn unlimited() -> Self {
        Self::new(RateLimitConfig {
            max_calls: 0,
            ..RateLimitConfig::default()
        })
    }

    /// Record one call against `source`, or reject it when the window is
    /// already full. Rejections surface as ordinary lookup failures on the
    /// contact being enriched; nothing waits.
    pub async fn try_acquire(&self, source: &'static str) -> Result<(), LookupError> {
        if self.inner.config.max_calls == 0 {
            return Ok(());
        }
        let mut calls = self.inner.calls.lock().await;
        let now = Instant::now();
        let window = self.inner.config.window;
        let timestamps = calls.entry(source).or_default();
        while timestamps
            .front()
            .map_or(false, |t| now.duration_since(*t) >= window)
        {
            timestamps.pop_front();
        }
        if timestamps.len() >= self.inner.config.max_calls as usize {
            warn!(source, in_window = timestamps.len(), "rate limit exceeded");
            return Err(LookupError::RateLimited(source));
        }
        timestamps.push_back(now);
        Ok(())
    }
}
