// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter for the form endpoints.
//!
//! Each client key gets a counter that opens with its first request and
//! expires `window` later. The window is fixed, not sliding: a client that
//! bursts across a window boundary can land up to twice `max_requests`
//! submissions in a short span.
//!
//! State lives in this process only. It is owned by the application state
//! rather than a global so a shared store can replace it later.

use crate::config::RateLimitConfig;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Remaining requests in current window
        remaining: u32,
        /// Time until window resets
        reset_in: Duration,
    },
    /// Request is rate limited
    Limited {
        /// Time until the current window expires
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Counter for a single client window.
#[derive(Debug, Clone, Copy)]
struct WindowRecord {
    count: u32,
    window_start: Instant,
}

impl WindowRecord {
    fn new(now: Instant) -> Self {
        Self {
            count: 1,
            window_start: now,
        }
    }

    fn is_expired(&self, now: Instant, window: Duration) -> bool {
        now.saturating_duration_since(self.window_start) > window
    }

    fn reset_in(&self, now: Instant, window: Duration) -> Duration {
        window.saturating_sub(now.saturating_duration_since(self.window_start))
    }
}

/// Thread-safe rate limiter.
#[derive(Clone)]
pub struct RateLimiter {
    /// Configuration
    config: RateLimitConfig,
    /// Per-client windows
    windows: Arc<RwLock<HashMap<String, WindowRecord>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Check and count a request from `key` at the current instant.
    pub async fn check(&self, key: &str) -> RateLimitResult {
        self.check_at(key, Instant::now()).await
    }

    /// Check and count a request from `key` at `now`.
    pub async fn check_at(&self, key: &str, now: Instant) -> RateLimitResult {
        let window = self.config.window_duration();
        let max = self.config.max_requests;

        let mut windows = self.windows.write().await;
        if let Some(record) = windows.get_mut(key) {
            if !record.is_expired(now, window) {
                if record.count >= max {
                    let retry_after = record.reset_in(now, window);
                    debug!(key, count = record.count, ?retry_after, "Client rate limit exceeded");
                    return RateLimitResult::Limited { retry_after };
                }
                record.count += 1;
                return RateLimitResult::Allowed {
                    remaining: max.saturating_sub(record.count),
                    reset_in: record.reset_in(now, window),
                };
            }
        }

        // max_requests == 0 shuts the endpoint off entirely
        if max == 0 {
            return RateLimitResult::Limited {
                retry_after: window,
            };
        }

        windows.insert(key.to_string(), WindowRecord::new(now));
        RateLimitResult::Allowed {
            remaining: max - 1,
            reset_in: window,
        }
    }

    /// Number of client windows currently tracked.
    pub async fn len(&self) -> usize {
        self.windows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.windows.read().await.is_empty()
    }

    /// Drop windows that have expired (should be called periodically).
    pub async fn cleanup(&self) -> usize {
        self.cleanup_at(Instant::now()).await
    }

    /// Drop windows that have expired as of `now`, returning how many were removed.
    pub async fn cleanup_at(&self, now: Instant) -> usize {
        let window = self.config.window_duration();
        let mut windows = self.windows.write().await;
        let before = windows.len();
        windows.retain(|_, record| !record.is_expired(now, window));
        let removed = before - windows.len();
        if removed > 0 {
            debug!(removed, remaining = windows.len(), "Purged expired rate limit windows");
        }
        removed
    }
}
