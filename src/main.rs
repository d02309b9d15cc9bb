// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Pastoral Forms Service
//!
//! Accepts the contact, volunteer, course registration and donation forms of
//! the Pastoral de la Salud website.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables (a `.env` file is read
//! first when present):
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `CONTACT_MAX_REQUESTS` / `CONTACT_WINDOW_SECS`: contact limit (default: 5 per 60s)
//! - `SUBMISSION_MAX_REQUESTS` / `SUBMISSION_WINDOW_SECS`: form limit (default: 3 per 60s)
//! - `GOOGLE_SHEETS_SPREADSHEET_ID`: enables spreadsheet delivery
//! - `SHEETS_WEBHOOK_URL`: append endpoint; without it appends are only logged
//! - `ALLOWED_ORIGINS`: comma-separated CORS origins

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{debug, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pastoral_forms::{config::Config, handlers::AppState, routes::build_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = Config::from_env();
    info!(
        bind_addr = %config.bind_addr,
        contact_max_requests = config.contact_limit.max_requests,
        contact_window_secs = config.contact_limit.window_secs,
        submission_max_requests = config.submission_limit.max_requests,
        submission_window_secs = config.submission_limit.window_secs,
        metrics_enabled = config.metrics.enabled,
        "Starting pastoral forms service"
    );

    let state = Arc::new(AppState::from_config(config.clone())?);
    info!(sink = state.dispatcher.sink_name(), "Submission sink selected");

    // Spawn cleanup task
    let cleanup_state = state.clone();
    let cleanup_every = Duration::from_secs(config.cleanup_interval_secs.max(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cleanup_every);
        loop {
            interval.tick().await;
            let purged = cleanup_state.contact_limiter.cleanup().await
                + cleanup_state.submission_limiter.cleanup().await;
            if purged > 0 {
                debug!(purged, "Expired rate limit windows removed");
            }
        }
    });

    let app = build_router(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
