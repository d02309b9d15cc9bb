// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Submission dispatch.
//!
//! Accepted records go to a [`SubmissionSink`]. Which sink is used depends on
//! configuration:
//!
//! - no spreadsheet id: [`LogSink`], records are only logged
//! - spreadsheet id without webhook: [`StubSheetsSink`], the append is logged as a dry run
//! - spreadsheet id and webhook: [`SheetsSink`], rows are POSTed to the webhook

use crate::config::SheetsConfig;
use crate::forms::SanitizedRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

/// Dispatch error types.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Spreadsheet service returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Spreadsheet service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<DispatchError>,
    },
}

impl DispatchError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Rejected { status, .. } => *status >= 500,
            Self::Transport(_) => true,
            Self::Exhausted { .. } => false,
        }
    }
}

/// Acknowledgement of a dispatched record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    /// Which sink accepted the record
    pub sink: &'static str,
    /// Attempts it took, 1 when nothing was retried
    pub attempts: u32,
}

/// Destination for sanitized submissions.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    async fn submit(&self, record: &SanitizedRecord) -> Result<Ack, DispatchError>;

    fn name(&self) -> &'static str;
}

/// Development sink: logs the record and nothing else.
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl SubmissionSink for LogSink {
    async fn submit(&self, record: &SanitizedRecord) -> Result<Ack, DispatchError> {
        let fields = Value::Object(record.fields.clone());
        info!(
            form = %record.kind,
            fields = %fields,
            "Form submission"
        );
        Ok(Ack {
            sink: self.name(),
            attempts: 1,
        })
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// A spreadsheet is configured but there is nowhere to send rows yet.
#[derive(Debug)]
pub struct StubSheetsSink {
    spreadsheet_id: String,
}

impl StubSheetsSink {
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
        }
    }
}

#[async_trait]
impl SubmissionSink for StubSheetsSink {
    async fn submit(&self, record: &SanitizedRecord) -> Result<Ack, DispatchError> {
        let fields = Value::Object(record.fields.clone());
        info!(
            spreadsheet_id = %self.spreadsheet_id,
            sheet = record.category,
            fields = %fields,
            "Would append to spreadsheet"
        );
        Ok(Ack {
            sink: self.name(),
            attempts: 1,
        })
    }

    fn name(&self) -> &'static str {
        "sheets-stub"
    }
}

/// Row append request sent to the spreadsheet webhook.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendRowRequest {
    pub spreadsheet_id: String,
    pub sheet: String,
    pub values: Vec<Value>,
}

/// Appends rows through an HTTP webhook in front of the spreadsheet.
pub struct SheetsSink {
    spreadsheet_id: String,
    webhook_url: Url,
    max_retries: u32,
    backoff: Duration,
    client: reqwest::Client,
}

impl SheetsSink {
    pub fn new(spreadsheet_id: String, webhook_url: Url, config: &SheetsConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            spreadsheet_id,
            webhook_url,
            max_retries: config.max_retries,
            backoff: Duration::from_millis(250),
            client,
        })
    }

    /// Base delay between attempts; attempt `n` waits `n * backoff`.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    async fn append(&self, request: &AppendRowRequest) -> Result<(), DispatchError> {
        let response = self
            .client
            .post(self.webhook_url.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(DispatchError::Rejected {
            status: status.as_u16(),
            body: body.chars().take(200).collect(),
        })
    }
}

#[async_trait]
impl SubmissionSink for SheetsSink {
    async fn submit(&self, record: &SanitizedRecord) -> Result<Ack, DispatchError> {
        let request = AppendRowRequest {
            spreadsheet_id: self.spreadsheet_id.clone(),
            sheet: record.category.to_string(),
            values: record.row(),
        };

        let max_attempts = self.max_retries + 1;
        let mut attempt = 1;
        loop {
            match self.append(&request).await {
                Ok(()) => {
                    debug!(sheet = record.category, attempt, "Row appended");
                    return Ok(Ack {
                        sink: self.name(),
                        attempts: attempt,
                    });
                }
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    warn!(sheet = record.category, attempt, error = %err, "Append failed, retrying");
                    tokio::time::sleep(self.backoff * attempt).await;
                    attempt += 1;
                }
                Err(err) if attempt > 1 => {
                    return Err(DispatchError::Exhausted {
                        attempts: attempt,
                        last: Box::new(err),
                    })
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn name(&self) -> &'static str {
        "sheets"
    }
}

/// Routes sanitized records to the configured sink.
#[derive(Clone)]
pub struct Dispatcher {
    sink: Arc<dyn SubmissionSink>,
}

impl Dispatcher {
    pub fn new(sink: Arc<dyn SubmissionSink>) -> Self {
        Self { sink }
    }

    /// Pick a sink from the spreadsheet configuration.
    pub fn from_config(config: &SheetsConfig) -> anyhow::Result<Self> {
        let sink: Arc<dyn SubmissionSink> = match (&config.spreadsheet_id, &config.webhook_url) {
            (Some(id), Some(url)) => Arc::new(SheetsSink::new(id.clone(), url.clone(), config)?),
            (Some(id), None) => Arc::new(StubSheetsSink::new(id.clone())),
            (None, _) => Arc::new(LogSink),
        };
        Ok(Self::new(sink))
    }

    pub fn sink_name(&self) -> &'static str {
        self.sink.name()
    }

    pub async fn dispatch(&self, record: &SanitizedRecord) -> Result<Ack, DispatchError> {
        self.sink.submit(record).await
    }
}
