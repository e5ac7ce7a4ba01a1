//! Async client for a cloud text-analytics service.
//!
//! Synchronous capabilities (language detection, key phrases, entity, PII
//! and linked-entity recognition, sentiment, dynamic classification) return
//! a `ResultCollection` with one entry per input document. Healthcare and
//! multi-action analysis run as jobs driven by a `JobPoller`.

pub mod client;
pub mod config;
pub mod error;
pub mod lro;
pub mod mapper;
pub mod models;
pub mod options;
pub mod service; // legacy v3.x and /language backends
pub mod transport;
pub mod wire;

pub use client::{TextAnalyticsClient, TextAnalyticsClientBuilder};
pub use config::{init_tracing, ClientConfig};
pub use error::{ErrorPayload, TextAnalyticsError};
pub use lro::{
    ActionsJob, ContinuationToken, HealthcareJob, JobId, JobKind, JobPoller, JobStatus, JobType, OperationDetail, Page,
    PagedResults, PollerSettings,
};
pub use options::{
    ActionKind, AnalysisAction, AnalyzeActionsOptions, AnalyzeHealthcareEntitiesOptions, AnalyzeSentimentOptions,
    DynamicClassifyOptions, RecognizePiiEntitiesOptions, TextAnalyticsRequestOptions,
};
