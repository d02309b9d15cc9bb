// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the form submission service.
//!
//! Defaults mirror the limits the website has always shipped with:
//! 5 contact messages and 3 volunteer/course submissions per minute per client.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Configuration for the form submission service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Rate limit for the contact endpoint
    #[serde(default = "default_contact_limit")]
    pub contact_limit: RateLimitConfig,

    /// Rate limit for the volunteer/course/donation endpoint
    #[serde(default = "default_submission_limit")]
    pub submission_limit: RateLimitConfig,

    /// Free-text sanitization
    #[serde(default)]
    pub sanitizer: SanitizerConfig,

    /// External spreadsheet integration
    #[serde(default)]
    pub sheets: SheetsConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// How often stale rate-limit windows are purged, in seconds (default: 60)
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,

    /// Origins allowed to post cross-site; empty when the site proxies same-origin
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Fixed-window rate limit for one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests admitted per window per client
    pub max_requests: u32,

    /// Window length in seconds
    pub window_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizerConfig {
    /// Maximum characters kept per field (default: 5000)
    #[serde(default = "default_max_field_length")]
    pub max_field_length: usize,
}

/// Spreadsheet integration. With no spreadsheet id every submission is only
/// logged; with an id but no webhook the append is logged as a dry run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    #[serde(default)]
    pub spreadsheet_id: Option<String>,

    /// Endpoint that appends rows on our behalf (e.g. an Apps Script web app)
    #[serde(default)]
    pub webhook_url: Option<Url>,

    #[serde(default = "default_sheets_timeout_ms")]
    pub timeout_ms: u64,

    /// Retries after the first attempt, for 5xx and transport failures
    #[serde(default = "default_sheets_max_retries")]
    pub max_retries: u32,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_contact_limit() -> RateLimitConfig {
    RateLimitConfig {
        max_requests: 5,
        window_secs: 60,
    }
}

fn default_submission_limit() -> RateLimitConfig {
    RateLimitConfig {
        max_requests: 3,
        window_secs: 60,
    }
}

fn default_max_field_length() -> usize {
    5000
}

fn default_sheets_timeout_ms() -> u64 {
    10_000
}

fn default_sheets_max_retries() -> u32 {
    2
}

fn default_cleanup_interval_secs() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            contact_limit: default_contact_limit(),
            submission_limit: default_submission_limit(),
            sanitizer: SanitizerConfig::default(),
            sheets: SheetsConfig::default(),
            metrics: MetricsConfig::default(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
            allowed_origins: Vec::new(),
        }
    }
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            max_field_length: default_max_field_length(),
        }
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            webhook_url: None,
            timeout_ms: default_sheets_timeout_ms(),
            max_retries: default_sheets_max_retries(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl RateLimitConfig {
    /// Get the rate window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl SheetsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Unset or unparseable values keep their defaults. Blank strings count as unset,
    /// matching how the site's `.env` files leave optional integrations empty.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let defaults = Config::default();
        let contact = defaults.contact_limit;
        let submission = defaults.submission_limit;

        Config {
            bind_addr: var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            contact_limit: RateLimitConfig {
                max_requests: parse_var(var("CONTACT_MAX_REQUESTS"))
                    .unwrap_or(contact.max_requests),
                window_secs: parse_var(var("CONTACT_WINDOW_SECS"))
                    .unwrap_or(contact.window_secs),
            },
            submission_limit: RateLimitConfig {
                max_requests: parse_var(var("SUBMISSION_MAX_REQUESTS"))
                    .unwrap_or(submission.max_requests),
                window_secs: parse_var(var("SUBMISSION_WINDOW_SECS"))
                    .unwrap_or(submission.window_secs),
            },
            sanitizer: SanitizerConfig {
                max_field_length: parse_var(var("MAX_FIELD_LENGTH"))
                    .unwrap_or(defaults.sanitizer.max_field_length),
            },
            sheets: SheetsConfig {
                spreadsheet_id: var("GOOGLE_SHEETS_SPREADSHEET_ID"),
                webhook_url: var("SHEETS_WEBHOOK_URL").and_then(|v| Url::parse(v.trim()).ok()),
                timeout_ms: parse_var(var("SHEETS_TIMEOUT_MS"))
                    .unwrap_or(defaults.sheets.timeout_ms),
                max_retries: parse_var(var("SHEETS_MAX_RETRIES"))
                    .unwrap_or(defaults.sheets.max_retries),
            },
            metrics: MetricsConfig {
                enabled: parse_var(var("METRICS_ENABLED")).unwrap_or(defaults.metrics.enabled),
                path: defaults.metrics.path,
            },
            cleanup_interval_secs: parse_var(var("CLEANUP_INTERVAL_SECS"))
                .unwrap_or(defaults.cleanup_interval_secs),
            allowed_origins: var("ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|o| !o.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

fn parse_var<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}
