//! Error taxonomy for the client.
//!
//! Per-document failures are not errors here: they travel inside
//! `ResultCollection` as `DocumentResult::Err` entries. Everything in
//! `TextAnalyticsError` aborts the call it came from.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lro::{JobId, JobStatus};
use crate::models::ServiceVersion;

/// Error payload returned by the service, for a single document or a whole job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub target: Option<String>,
    /// Innermost error code reported by the service, when more specific than `code`.
    pub inner_code: Option<String>,
    pub details: Vec<ErrorPayload>,
}

impl ErrorPayload {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// The most specific code available.
    pub fn effective_code(&self) -> &str {
        self.inner_code.as_deref().unwrap_or(&self.code)
    }
}

impl std::fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.effective_code(), self.message)?;
        if let Some(target) = &self.target {
            write!(f, " (target: {target})")?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum TextAnalyticsError {
    #[error("Document batch must contain at least one document")]
    EmptyBatch,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Service returned error (status {status}): {}", describe_http(.error, .body))]
    Http {
        status: u16,
        error: Option<ErrorPayload>,
        body: String,
    },

    #[error("Cannot connect to {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP transport error: {0}")]
    Transport(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Job {job_id} failed with {} error(s): {}", .errors.len(), join_errors(.errors))]
    JobFailed {
        job_id: JobId,
        errors: Vec<ErrorPayload>,
    },

    #[error("{feature} is not supported by service version {version}; requires {minimum} or later")]
    UnsupportedVersion {
        feature: String,
        version: ServiceVersion,
        minimum: ServiceVersion,
    },

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Job has not completed successfully (status: {0})")]
    JobNotComplete(JobStatus),

    #[error("Invalid continuation token: {0}")]
    InvalidContinuationToken(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl TextAnalyticsError {
    /// HTTP status code, for errors that came back from the service.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for errors raised before any request was sent.
    pub fn is_client_side(&self) -> bool {
        matches!(
            self,
            Self::EmptyBatch
                | Self::InvalidInput(_)
                | Self::UnsupportedVersion { .. }
                | Self::UnsupportedOperation(_)
                | Self::JobNotComplete(_)
                | Self::InvalidContinuationToken(_)
                | Self::Configuration(_)
        )
    }
}

fn describe_http(error: &Option<ErrorPayload>, body: &str) -> String {
    match error {
        Some(payload) => payload.to_string(),
        None => body.to_string(),
    }
}

fn join_errors(errors: &[ErrorPayload]) -> String {
    errors
        .iter()
        .map(ErrorPayload::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T, E = TextAnalyticsError> = std::result::Result<T, E>;
