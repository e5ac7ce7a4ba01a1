//! Long-running jobs: submission handle, status polling and paged results.
//!
//! A job moves through `JobStatus` values reported by the service; the
//! poller never infers a status on its own. What a page of results looks
//! like depends on the job, which is what `JobKind` describes.

pub mod operation;
pub mod pages;
pub mod poller;
pub mod status;
pub mod token;

pub use operation::{JobId, OperationDetail};
pub use pages::{Page, PagedResults};
pub use poller::{JobPoller, PollerSettings};
pub use status::JobStatus;
pub use token::{ContinuationToken, PageRequest};

use serde::Deserialize;

use crate::error::{ErrorPayload, TextAnalyticsError};
use crate::mapper;
use crate::models::{ActionResult, AnalyzeActionsResult, HealthcareEntitiesResult, ResultCollection};
use crate::wire::{self, DocumentErrorWire, JobState, TaskKind, TaskState};

/// Which job endpoint family a job lives under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobType {
    Healthcare,
    Actions,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthcare => "healthcare",
            Self::Actions => "analyze-actions",
        }
    }
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The shape of one job's results.
pub trait JobKind: Send + Sync + 'static {
    /// One page of results.
    type Page: Send + Default;

    const JOB_TYPE: JobType;

    /// Decode the results carried by one job-state response.
    fn decode_page(state: &JobState) -> Result<Self::Page, TextAnalyticsError>;

    /// Append a later page onto an accumulated one.
    fn merge(into: &mut Self::Page, page: Self::Page);
}

/// Healthcare entity extraction: one collection per page.
#[derive(Debug, Clone, Copy)]
pub struct HealthcareJob;

impl JobKind for HealthcareJob {
    type Page = ResultCollection<HealthcareEntitiesResult>;

    const JOB_TYPE: JobType = JobType::Healthcare;

    fn decode_page(state: &JobState) -> Result<Self::Page, TextAnalyticsError> {
        let Some(task) = state.tasks.iter().find(|t| t.kind == TaskKind::Healthcare) else {
            return Ok(ResultCollection::default());
        };
        match &task.results {
            Some(value) => {
                let batch = mapper::decode_batch::<wire::HealthcareBody>(value.clone())?;
                Ok(mapper::to_collection(batch, mapper::healthcare))
            }
            None => Ok(ResultCollection::default()),
        }
    }

    fn merge(into: &mut Self::Page, page: Self::Page) {
        into.extend(page);
    }
}

/// A batch of actions run as one job; each page carries every action's
/// slice of results.
#[derive(Debug, Clone, Copy)]
pub struct ActionsJob;

impl JobKind for ActionsJob {
    type Page = AnalyzeActionsResult;

    const JOB_TYPE: JobType = JobType::Actions;

    fn decode_page(state: &JobState) -> Result<Self::Page, TextAnalyticsError> {
        let mut page = AnalyzeActionsResult::default();
        for task in &state.tasks {
            match task.kind {
                TaskKind::EntityRecognition => page
                    .recognize_entities
                    .push(action_result(state, task, mapper::entities)?),
                TaskKind::PiiEntityRecognition => page
                    .recognize_pii_entities
                    .push(action_result(state, task, mapper::pii_entities)?),
                TaskKind::KeyPhraseExtraction => page
                    .extract_key_phrases
                    .push(action_result(state, task, mapper::key_phrases)?),
                TaskKind::EntityLinking => page
                    .recognize_linked_entities
                    .push(action_result(state, task, mapper::linked_entities)?),
                TaskKind::SentimentAnalysis => page
                    .analyze_sentiment
                    .push(action_result(state, task, mapper::sentiment)?),
                TaskKind::Healthcare => {
                    tracing::debug!(job_id = %state.job_id, "Ignoring healthcare task in actions job");
                }
            }
        }
        Ok(page)
    }

    fn merge(into: &mut Self::Page, page: Self::Page) {
        merge_actions(&mut into.recognize_entities, page.recognize_entities);
        merge_actions(&mut into.recognize_pii_entities, page.recognize_pii_entities);
        merge_actions(&mut into.extract_key_phrases, page.extract_key_phrases);
        merge_actions(&mut into.recognize_linked_entities, page.recognize_linked_entities);
        merge_actions(&mut into.analyze_sentiment, page.analyze_sentiment);
    }
}

fn action_result<B, T>(
    state: &JobState,
    task: &TaskState,
    f: impl Fn(B) -> T,
) -> Result<ActionResult<T>, TextAnalyticsError>
where
    B: serde::de::DeserializeOwned,
{
    let outcome = if matches!(JobStatus::parse(&task.status), JobStatus::Failed) {
        Err(task_error(state, task))
    } else {
        match &task.results {
            Some(value) => Ok(mapper::to_collection(mapper::decode_batch::<B>(value.clone())?, f)),
            None => Ok(ResultCollection::default()),
        }
    };
    Ok(ActionResult {
        task_name: task.name.clone(),
        completed_at: task.last_updated,
        outcome,
    })
}

/// The job error that targets `task`, or a generic one when none does.
fn task_error(state: &JobState, task: &TaskState) -> ErrorPayload {
    state
        .errors
        .iter()
        .find(|e| e.target.as_deref() == Some(task.pointer.as_str()))
        .cloned()
        .map(ErrorPayload::from)
        .unwrap_or_else(|| {
            ErrorPayload::new("TaskFailed", format!("task {} failed", task.pointer))
                .with_target(task.pointer.clone())
        })
}

/// Pair each action with the one at the same position on the later page.
fn merge_actions<T>(into: &mut Vec<ActionResult<T>>, page: Vec<ActionResult<T>>) {
    let mut page = page.into_iter();
    for existing in into.iter_mut() {
        let Some(next) = page.next() else { break };
        match next.outcome {
            Ok(more) => {
                if let Ok(collection) = &mut existing.outcome {
                    collection.extend(more);
                }
            }
            Err(e) => {
                if existing.outcome.is_ok() {
                    existing.outcome = Err(e);
                }
            }
        }
        if next.completed_at.is_some() {
            existing.completed_at = next.completed_at;
        }
    }
    into.extend(page);
}

#[derive(Deserialize)]
struct TaskErrors {
    #[serde(default)]
    errors: Vec<DocumentErrorWire>,
}

/// Every error a failed job reports: job-level errors first, then each
/// task's per-document errors, each targeted at its document id.
pub(crate) fn job_failure_errors(state: &JobState) -> Vec<ErrorPayload> {
    let mut errors: Vec<ErrorPayload> = state.errors.iter().cloned().map(ErrorPayload::from).collect();
    for task in &state.tasks {
        let Some(value) = &task.results else { continue };
        let Ok(parsed) = serde_json::from_value::<TaskErrors>(value.clone()) else {
            tracing::warn!(task = %task.pointer, "Unreadable task results in failed job");
            continue;
        };
        errors.extend(parsed.errors.into_iter().map(|e| {
            let payload = ErrorPayload::from(e.error);
            if payload.target.is_some() {
                payload
            } else {
                payload.with_target(e.id)
            }
        }));
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(status: &str, errors: serde_json::Value, tasks: Vec<TaskState>) -> JobState {
        JobState {
            job_id: "4d7e2a10-0000-4000-8000-000000000001".into(),
            display_name: None,
            created_at: None,
            last_modified_at: None,
            expires_at: None,
            status: status.into(),
            errors: serde_json::from_value(errors).unwrap(),
            tasks,
            next_link: None,
        }
    }

    fn task(kind: TaskKind, status: &str, pointer: &str, results: Option<serde_json::Value>) -> TaskState {
        TaskState {
            kind,
            name: None,
            status: status.into(),
            last_updated: None,
            pointer: pointer.into(),
            results,
        }
    }

    #[test]
    fn healthcare_page_decodes_results() {
        let results = serde_json::json!({
            "documents": [{"id": "1", "entities": [], "relations": [], "warnings": []}],
            "errors": [{"id": "2", "error": {"code": "InvalidArgument", "message": "Document text is empty."}}],
            "modelVersion": "2021-05-15"
        });
        let s = state("succeeded", serde_json::json!([]), vec![task(TaskKind::Healthcare, "succeeded", "#/results", Some(results))]);
        let page = HealthcareJob::decode_page(&s).unwrap();
        assert_eq!(page.ids(), vec!["1", "2"]);
        assert_eq!(page.model_version.as_deref(), Some("2021-05-15"));
    }

    #[test]
    fn failed_action_takes_the_targeted_job_error() {
        let s = state(
            "partiallyCompleted",
            serde_json::json!([{"code": "InternalServerError", "message": "kp broke", "target": "#/tasks/items/1"}]),
            vec![
                task(TaskKind::EntityRecognition, "succeeded", "#/tasks/items/0", Some(serde_json::json!({"documents": []}))),
                task(TaskKind::KeyPhraseExtraction, "failed", "#/tasks/items/1", None),
                task(TaskKind::SentimentAnalysis, "failed", "#/tasks/items/2", None),
            ],
        );
        let page = ActionsJob::decode_page(&s).unwrap();
        assert!(page.recognize_entities[0].outcome.is_ok());
        let kp = page.extract_key_phrases[0].outcome.as_ref().unwrap_err();
        assert_eq!(kp.message, "kp broke");
        let sa = page.analyze_sentiment[0].outcome.as_ref().unwrap_err();
        assert_eq!(sa.code, "TaskFailed");
        assert_eq!(sa.target.as_deref(), Some("#/tasks/items/2"));
    }

    #[test]
    fn action_pages_merge_positionally() {
        let page = |ids: &[&str]| {
            let docs: Vec<_> = ids.iter().map(|id| serde_json::json!({"id": id, "keyPhrases": []})).collect();
            let s = state(
                "succeeded",
                serde_json::json!([]),
                vec![task(TaskKind::KeyPhraseExtraction, "succeeded", "#/tasks/items/0", Some(serde_json::json!({"documents": docs})))],
            );
            ActionsJob::decode_page(&s).unwrap()
        };
        let mut all = page(&["a", "b"]);
        ActionsJob::merge(&mut all, page(&["c"]));
        assert_eq!(all.extract_key_phrases.len(), 1);
        let collection = all.extract_key_phrases[0].outcome.as_ref().unwrap();
        assert_eq!(collection.ids(), vec!["a", "b", "c"]);
    }

    #[test]
    fn failure_errors_include_document_errors() {
        let results = serde_json::json!({
            "documents": [],
            "errors": [
                {"id": "3", "error": {"code": "InvalidDocument", "message": "too long"}},
                {"id": "7", "error": {"code": "InvalidDocument", "message": "empty"}}
            ]
        });
        let s = state(
            "failed",
            serde_json::json!([{"code": "InternalServerError", "message": "job failed"}]),
            vec![task(TaskKind::Healthcare, "failed", "#/results", Some(results))],
        );
        let errors = job_failure_errors(&s);
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].message, "job failed");
        assert_eq!(errors[1].target.as_deref(), Some("3"));
        assert_eq!(errors[2].target.as_deref(), Some("7"));
    }
}
