// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test harness for abuse simulation against the form endpoints.
//!
//! Requests go through the full router, so every simulated request passes
//! the same rate limit, validation and sanitization gates as real traffic.

pub mod generators;
pub mod metrics;
