// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the form submission service.
//!
//! Every submission runs the same pipeline with an early exit at each gate:
//! rate limit, JSON parse, validation, sanitization, dispatch.

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::{AppError, ErrorResponse, Result, METHOD_NOT_ALLOWED_MESSAGE};
use crate::forms::{ContactForm, FormKind, SanitizedRecord, Submission, SubmissionEnvelope};
use crate::limiter::{RateLimitResult, RateLimiter};
use crate::metrics::{Metrics, Outcome};
use crate::sanitizer::Sanitizer;
use crate::validator::FormValidator;
use anyhow::Context;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Client key used when no forwarding header is present.
pub const UNKNOWN_CLIENT: &str = "unknown";

pub const CONTACT_ENDPOINT: &str = "contact";
pub const SUBMISSION_ENDPOINT: &str = "sheets";

/// Shared application state.
pub struct AppState {
    pub contact_limiter: RateLimiter,
    pub submission_limiter: RateLimiter,
    pub validator: FormValidator,
    pub sanitizer: Sanitizer,
    pub dispatcher: Dispatcher,
    pub metrics: Metrics,
    pub config: Config,
}

impl AppState {
    /// Build state with the dispatcher chosen from configuration.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let dispatcher = Dispatcher::from_config(&config.sheets)?;
        Self::with_dispatcher(config, dispatcher)
    }

    pub fn with_dispatcher(config: Config, dispatcher: Dispatcher) -> anyhow::Result<Self> {
        Ok(Self {
            contact_limiter: RateLimiter::new(config.contact_limit),
            submission_limiter: RateLimiter::new(config.submission_limit),
            validator: FormValidator::new(),
            sanitizer: Sanitizer::from(&config.sanitizer),
            dispatcher,
            metrics: Metrics::new()?,
            config,
        })
    }

    fn record_outcome<T>(&self, form: &str, result: &Result<T>) {
        match result {
            Ok(_) => self.metrics.record_submission(form, Outcome::Accepted),
            Err(err) => self.record_failure(form, err),
        }
    }

    fn record_failure(&self, form: &str, err: &AppError) {
        let outcome = match err {
            AppError::Validation(_) | AppError::UnknownFormType(_) => Outcome::Invalid,
            AppError::MalformedRequest(_) => Outcome::Malformed,
            AppError::Internal(_) => Outcome::Failed,
            AppError::RateLimited { .. } => return,
        };
        self.metrics.record_submission(form, outcome);
    }
}

/// Success response body.
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub success: bool,
    pub message: &'static str,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "pastoral-forms",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Prometheus scrape endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Result<Response> {
    let body = state.metrics.render()?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response())
}

/// `GET` on a form endpoint.
pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        Json(ErrorResponse::new(METHOD_NOT_ALLOWED_MESSAGE, "METHOD_NOT_ALLOWED")),
    )
        .into_response()
}

/// Contact form submission (`POST /api/contact`).
pub async fn contact(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SubmissionResponse>> {
    let client = client_key(&headers);
    enforce_rate_limit(&state.contact_limiter, &state.metrics, CONTACT_ENDPOINT, &client).await?;

    let result = process_contact(&state, &client, &body).await;
    state.record_outcome(FormKind::Contact.as_str(), &result);
    result
}

async fn process_contact(
    state: &AppState,
    client: &str,
    body: &[u8],
) -> Result<Json<SubmissionResponse>> {
    let form: ContactForm = parse_body(body)?;
    state.validator.validate_contact(&form).into_result()?;
    let record = form.sanitize(&state.sanitizer, Utc::now());
    deliver(state, client, record).await
}

/// Volunteer, course and donation submissions (`POST /api/sheets`).
pub async fn submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SubmissionResponse>> {
    let client = client_key(&headers);
    enforce_rate_limit(
        &state.submission_limiter,
        &state.metrics,
        SUBMISSION_ENDPOINT,
        &client,
    )
    .await?;

    let (kind, data) = match read_envelope(&body) {
        Ok(parts) => parts,
        Err(err) => {
            state.record_failure("unknown", &err);
            return Err(err);
        }
    };

    let result = process_submission(&state, &client, kind, data).await;
    state.record_outcome(kind.as_str(), &result);
    result
}

/// Split `{type, data}` into a known form kind and its raw data.
fn read_envelope(body: &[u8]) -> Result<(FormKind, serde_json::Value)> {
    let envelope: SubmissionEnvelope = parse_body(body)?;

    let form_type = envelope.form_type.filter(|t| !t.is_empty());
    let data = envelope.data.filter(|d| !d.is_null());
    let (Some(form_type), Some(data)) = (form_type, data) else {
        return Err(AppError::MalformedRequest(
            "missing type or data".to_string(),
        ));
    };

    let kind = FormKind::from_submission_type(&form_type)
        .ok_or(AppError::UnknownFormType(form_type))?;
    Ok((kind, data))
}

async fn process_submission(
    state: &AppState,
    client: &str,
    kind: FormKind,
    data: serde_json::Value,
) -> Result<Json<SubmissionResponse>> {
    let submission = Submission::decode(kind, data)
        .map_err(|e| AppError::MalformedRequest(e.to_string()))?
        .ok_or_else(|| AppError::UnknownFormType(kind.to_string()))?;

    state.validator.validate(&submission).into_result()?;
    let record = submission.sanitize(&state.sanitizer, Utc::now());
    deliver(state, client, record).await
}

/// Hand a sanitized record to the dispatcher and build the success response.
async fn deliver(
    state: &AppState,
    client: &str,
    record: SanitizedRecord,
) -> Result<Json<SubmissionResponse>> {
    let started = Instant::now();
    let ack = state
        .dispatcher
        .dispatch(&record)
        .await
        .with_context(|| format!("dispatching {} submission", record.kind))?;
    state.metrics.observe_dispatch(started.elapsed().as_secs_f64());

    debug!(client, form = %record.kind, "Submission dispatched");
    info!(
        form = %record.kind,
        sheet = record.category,
        sink = ack.sink,
        attempts = ack.attempts,
        "Submission accepted"
    );

    Ok(Json(SubmissionResponse {
        success: true,
        message: record.kind.success_message(),
    }))
}

async fn enforce_rate_limit(
    limiter: &RateLimiter,
    metrics: &Metrics,
    endpoint: &'static str,
    client: &str,
) -> Result<()> {
    match limiter.check(client).await {
        RateLimitResult::Allowed { remaining, .. } => {
            debug!(client, endpoint, remaining, "Request allowed");
            Ok(())
        }
        RateLimitResult::Limited { retry_after } => {
            info!(
                client,
                endpoint,
                retry_after_secs = retry_after.as_secs(),
                "Request rate limited"
            );
            metrics.record_rate_limited(endpoint);
            Err(AppError::RateLimited { retry_after })
        }
    }
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| AppError::MalformedRequest(e.to_string()))
}

/// Client identifier for rate limiting: the first `X-Forwarded-For` hop.
pub fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}
