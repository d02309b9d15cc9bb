// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for the form endpoints.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Outcome label of `form_submissions_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    Invalid,
    Malformed,
    Failed,
}

impl Outcome {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Invalid => "invalid",
            Self::Malformed => "malformed",
            Self::Failed => "failed",
        }
    }
}

/// Service metrics, registered on a private registry.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    submissions: IntCounterVec,
    rate_limited: IntCounterVec,
    dispatch_duration: Histogram,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let submissions = IntCounterVec::new(
            Opts::new("form_submissions_total", "Form submissions by form and outcome"),
            &["form", "outcome"],
        )?;
        let rate_limited = IntCounterVec::new(
            Opts::new("form_rate_limited_total", "Requests rejected by the rate limiter"),
            &["endpoint"],
        )?;
        let dispatch_duration = Histogram::with_opts(HistogramOpts::new(
            "form_dispatch_duration_seconds",
            "Time spent handing a record to its sink",
        ))?;

        registry.register(Box::new(submissions.clone()))?;
        registry.register(Box::new(rate_limited.clone()))?;
        registry.register(Box::new(dispatch_duration.clone()))?;

        Ok(Self {
            registry,
            submissions,
            rate_limited,
            dispatch_duration,
        })
    }

    pub fn record_submission(&self, form: &str, outcome: Outcome) {
        self.submissions
            .with_label_values(&[form, outcome.as_str()])
            .inc();
    }

    pub fn record_rate_limited(&self, endpoint: &str) {
        self.rate_limited.with_label_values(&[endpoint]).inc();
    }

    pub fn observe_dispatch(&self, seconds: f64) {
        self.dispatch_duration.observe(seconds);
    }

    pub fn submissions(&self, form: &str, outcome: Outcome) -> u64 {
        self.submissions
            .with_label_values(&[form, outcome.as_str()])
            .get()
    }

    pub fn rate_limited(&self, endpoint: &str) -> u64 {
        self.rate_limited.with_label_values(&[endpoint]).get()
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
