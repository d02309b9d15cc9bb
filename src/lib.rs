// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Pastoral Forms
//!
//! Form submission backend for the Pastoral de la Salud website. Two
//! endpoints accept JSON form posts:
//!
//! - `POST /api/contact`: the contact form (5 requests per minute per client)
//! - `POST /api/sheets`: volunteer, course and donation forms wrapped in a
//!   `{type, data}` envelope (3 requests per minute per client)
//!
//! Each request is rate limited, validated (first failure wins, messages in
//! Spanish), sanitized and handed to a [`dispatch::SubmissionSink`].

pub mod config;
pub mod dispatch;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod limiter;
pub mod metrics;
pub mod routes;
pub mod sanitizer;
pub mod validator;

pub use config::Config;
pub use dispatch::{Dispatcher, SubmissionSink};
pub use error::{AppError, Result};
pub use handlers::AppState;
pub use limiter::{RateLimitResult, RateLimiter};
pub use routes::build_router;
pub use sanitizer::Sanitizer;
pub use validator::{FormValidator, ValidationError, ValidationResult};
