// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Router assembly.

use crate::error::AppError;
use crate::handlers::{self, AppState};
use axum::{
    http::{header, HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

/// Build the service router over shared state.
pub fn build_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route(
            "/api/contact",
            post(handlers::contact).get(handlers::method_not_allowed),
        )
        .route(
            "/api/sheets",
            post(handlers::submit).get(handlers::method_not_allowed),
        )
        .route("/health", get(handlers::health))
        .route("/healthz", get(handlers::health));

    if state.config.metrics.enabled {
        router = router.route(&state.config.metrics.path, get(handlers::metrics));
    }

    if let Some(cors) = cors_layer(&state.config.allowed_origins) {
        router = router.layer(cors);
    }

    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the configured origins. `None` when the list is empty.
fn cors_layer(allowed_origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]),
    )
}

fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = detail, "Handler panicked");

    AppError::Internal(anyhow::anyhow!("handler panicked")).into_response()
}
