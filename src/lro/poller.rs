//! Poller for a submitted job.
//!
//! The poller only reports what the service says. It sends one status
//! request per `poll`, stops touching the network once the job is terminal,
//! and hands out results only after a successful completion.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use super::{job_failure_errors, ContinuationToken, JobId, JobKind, JobStatus, OperationDetail, PageRequest, PagedResults};
use crate::config::DEFAULT_POLL_INTERVAL;
use crate::error::{ErrorPayload, TextAnalyticsError};
use crate::service::{AnalysisService, JobSubmission};

/// How a poller paces itself and what it asks for.
#[derive(Debug, Clone)]
pub struct PollerSettings {
    pub poll_interval: Duration,
    pub show_stats: bool,
    pub span: tracing::Span,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            show_stats: false,
            span: tracing::Span::none(),
        }
    }
}

pub struct JobPoller<K: JobKind> {
    service: Arc<dyn AnalysisService>,
    detail: OperationDetail,
    status: JobStatus,
    settings: PollerSettings,
    failure: Option<Vec<ErrorPayload>>,
    polls: u32,
    _kind: PhantomData<K>,
}

impl<K: JobKind> std::fmt::Debug for JobPoller<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobPoller")
            .field("job_type", &K::JOB_TYPE)
            .field("detail", &self.detail)
            .field("status", &self.status)
            .field("polls", &self.polls)
            .finish()
    }
}

impl<K: JobKind> JobPoller<K> {
    /// Submit the job and return a poller for it, in `NotStarted`.
    pub async fn activate(
        service: Arc<dyn AnalysisService>,
        mut submission: JobSubmission,
        settings: PollerSettings,
    ) -> Result<Self, TextAnalyticsError> {
        submission.job_type = K::JOB_TYPE;
        let documents = submission.documents.len();
        let tasks = submission.tasks.len();
        let job_id = service.submit_job(submission).await?;
        settings.span.in_scope(|| {
            tracing::info!(
                job_type = %K::JOB_TYPE,
                job_id = %job_id,
                documents,
                tasks,
                "Job activated"
            );
        });
        Ok(Self::attach(service, job_id, settings))
    }

    /// Attach to a job submitted earlier, e.g. by another process.
    pub fn attach(service: Arc<dyn AnalysisService>, job_id: JobId, settings: PollerSettings) -> Self {
        Self {
            service,
            detail: OperationDetail::new(job_id),
            status: JobStatus::NotStarted,
            settings,
            failure: None,
            polls: 0,
            _kind: PhantomData,
        }
    }

    pub fn job_id(&self) -> JobId {
        self.detail.job_id
    }

    pub fn detail(&self) -> &OperationDetail {
        &self.detail
    }

    pub fn status(&self) -> &JobStatus {
        &self.status
    }

    pub fn poll_interval(&self) -> Duration {
        self.settings.poll_interval
    }

    /// Ask the service for the job status once.
    ///
    /// A `Failed` status yields `JobFailed` carrying every job and
    /// document error, and so does every later call, without further I/O.
    /// Once any other terminal status is seen, later calls return it
    /// without I/O.
    pub async fn poll(&mut self) -> Result<JobStatus, TextAnalyticsError> {
        if let Some(errors) = &self.failure {
            return Err(self.failed(errors.clone()));
        }
        if self.status.is_terminal() {
            return Ok(self.status.clone());
        }

        let state = self
            .service
            .job_state(K::JOB_TYPE, self.detail.job_id, PageRequest::first(self.settings.show_stats))
            .await?;
        self.polls += 1;
        self.detail.update_from(&state);

        let status = JobStatus::parse(&state.status);
        if status != self.status {
            self.settings.span.in_scope(|| {
                tracing::info!(
                    job_id = %self.detail.job_id,
                    from = %self.status,
                    to = %status,
                    polls = self.polls,
                    "Job status changed"
                );
            });
        }
        self.status = status;

        if self.status == JobStatus::Failed {
            let errors = self.settings.span.in_scope(|| job_failure_errors(&state));
            self.settings.span.in_scope(|| {
                tracing::warn!(job_id = %self.detail.job_id, errors = errors.len(), "Job failed");
            });
            self.failure = Some(errors.clone());
            return Err(self.failed(errors));
        }
        Ok(self.status.clone())
    }

    /// Poll until the job reaches a terminal status, sleeping
    /// `poll_interval` between polls.
    pub async fn wait_until_done(&mut self) -> Result<JobStatus, TextAnalyticsError> {
        loop {
            let status = self.poll().await?;
            if status.is_terminal() {
                return Ok(status);
            }
            tokio::time::sleep(self.settings.poll_interval).await;
        }
    }

    /// Request cancellation. The local status is left alone: only a later
    /// poll observes `Cancelling` or `Cancelled`.
    pub async fn cancel(&self) -> Result<(), TextAnalyticsError> {
        if !self.service.supports_cancel(K::JOB_TYPE) {
            return Err(TextAnalyticsError::UnsupportedOperation(format!(
                "{} jobs cannot be cancelled on service version {}",
                K::JOB_TYPE,
                self.service.service_version()
            )));
        }
        if self.status.is_terminal() {
            self.settings.span.in_scope(|| {
                tracing::debug!(job_id = %self.detail.job_id, status = %self.status, "Job already finished, nothing to cancel");
            });
            return Ok(());
        }
        self.service.cancel_job(K::JOB_TYPE, self.detail.job_id).await?;
        self.settings.span.in_scope(|| {
            tracing::info!(job_id = %self.detail.job_id, "Cancellation requested");
        });
        Ok(())
    }

    /// Results from the first page on.
    pub fn results(&self) -> Result<PagedResults<K>, TextAnalyticsError> {
        self.ensure_succeeded()?;
        Ok(self.pages(PageRequest::first(self.settings.show_stats)))
    }

    /// Results from the page a continuation token points at.
    pub fn results_from(&self, token: ContinuationToken) -> Result<PagedResults<K>, TextAnalyticsError> {
        self.ensure_succeeded()?;
        Ok(self.pages(PageRequest::from(token)))
    }

    fn ensure_succeeded(&self) -> Result<(), TextAnalyticsError> {
        if let Some(errors) = &self.failure {
            return Err(self.failed(errors.clone()));
        }
        if self.status.is_success() {
            Ok(())
        } else {
            Err(TextAnalyticsError::JobNotComplete(self.status.clone()))
        }
    }

    fn pages(&self, first: PageRequest) -> PagedResults<K> {
        PagedResults::new(
            Arc::clone(&self.service),
            self.detail.job_id,
            first,
            self.settings.span.clone(),
        )
    }

    fn failed(&self, errors: Vec<ErrorPayload>) -> TextAnalyticsError {
        TextAnalyticsError::JobFailed {
            job_id: self.detail.job_id,
            errors,
        }
    }
}
