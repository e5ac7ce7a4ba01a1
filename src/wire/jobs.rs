//! Job submission bodies and job-state responses for both backends,
//! plus the backend-neutral `JobState` the poller consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::documents::{TaskParameters, WireError};
use crate::models::{PiiCategory, PiiDomain, StringIndexType};

/// Task types that can run inside an asynchronous job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Healthcare,
    EntityRecognition,
    PiiEntityRecognition,
    KeyPhraseExtraction,
    EntityLinking,
    SentimentAnalysis,
}

impl TaskKind {
    /// `kind` value used by the language backend.
    pub fn language_kind(&self) -> &'static str {
        match self {
            Self::Healthcare => "Healthcare",
            Self::EntityRecognition => "EntityRecognition",
            Self::PiiEntityRecognition => "PiiEntityRecognition",
            Self::KeyPhraseExtraction => "KeyPhraseExtraction",
            Self::EntityLinking => "EntityLinking",
            Self::SentimentAnalysis => "SentimentAnalysis",
        }
    }

    /// Parse a result kind such as `"KeyPhraseExtractionLROResults"`.
    pub fn from_result_kind(kind: &str) -> Option<Self> {
        let base = kind.strip_suffix("LROResults").unwrap_or(kind);
        [
            Self::Healthcare,
            Self::EntityRecognition,
            Self::PiiEntityRecognition,
            Self::KeyPhraseExtraction,
            Self::EntityLinking,
            Self::SentimentAnalysis,
        ]
        .into_iter()
        .find(|k| k.language_kind() == base)
    }
}

// ═══════════════════════════════════════════
// Submission
// ═══════════════════════════════════════════

/// One task of a job, as requested by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRequest {
    pub kind: TaskKind,
    pub name: Option<String>,
    pub parameters: TaskParameters,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisInput<D> {
    pub documents: Vec<D>,
}

/// `POST language/analyze-text/jobs`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageJobRequest<D> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub analysis_input: AnalysisInput<D>,
    pub tasks: Vec<LanguageJobTask>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageJobTask {
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,
    pub parameters: TaskParameters,
}

/// Legacy task parameters use a hyphenated model version key.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyTaskParameters {
    #[serde(rename = "model-version", skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging_opt_out: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_index_type: Option<StringIndexType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opinion_mining: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<PiiDomain>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pii_categories: Vec<PiiCategory>,
}

impl From<&TaskParameters> for LegacyTaskParameters {
    fn from(p: &TaskParameters) -> Self {
        Self {
            model_version: p.model_version.clone(),
            logging_opt_out: p.logging_opt_out,
            string_index_type: p.string_index_type,
            opinion_mining: p.opinion_mining,
            domain: p.domain,
            pii_categories: p.pii_categories.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyJobTask {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,
    pub parameters: LegacyTaskParameters,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyJobTasks {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entity_recognition_tasks: Vec<LegacyJobTask>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entity_recognition_pii_tasks: Vec<LegacyJobTask>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub key_phrase_extraction_tasks: Vec<LegacyJobTask>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entity_linking_tasks: Vec<LegacyJobTask>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sentiment_analysis_tasks: Vec<LegacyJobTask>,
}

/// `POST text/analytics/v3.x/analyze`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyAnalyzeRequest<D> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub analysis_input: AnalysisInput<D>,
    pub tasks: LegacyJobTasks,
}

// ═══════════════════════════════════════════
// Job state
// ═══════════════════════════════════════════

/// Job state normalized across backends.
#[derive(Debug, Clone)]
pub struct JobState {
    pub job_id: String,
    pub display_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_modified_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub status: String,
    pub errors: Vec<WireError>,
    pub tasks: Vec<TaskState>,
    pub next_link: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TaskState {
    pub kind: TaskKind,
    pub name: Option<String>,
    pub status: String,
    pub last_updated: Option<DateTime<Utc>>,
    /// JSON pointer the service uses to target this task in job errors.
    pub pointer: String,
    /// Raw batch results, decoded by the job kind that owns the task.
    pub results: Option<serde_json::Value>,
}

/// `GET text/analytics/v3.x/entities/health/jobs/{id}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyHealthcareJobState {
    pub job_id: String,
    #[serde(default)]
    pub created_date_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_update_date_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expiration_date_time: Option<DateTime<Utc>>,
    pub status: String,
    #[serde(default)]
    pub errors: Vec<WireError>,
    #[serde(default)]
    pub results: Option<serde_json::Value>,
    #[serde(rename = "@nextLink", default)]
    pub next_link: Option<String>,
}

impl From<LegacyHealthcareJobState> for JobState {
    fn from(s: LegacyHealthcareJobState) -> Self {
        let task = TaskState {
            kind: TaskKind::Healthcare,
            name: None,
            status: s.status.clone(),
            last_updated: s.last_update_date_time,
            pointer: "#/results".to_string(),
            results: s.results,
        };
        Self {
            job_id: s.job_id,
            display_name: None,
            created_at: s.created_date_time,
            last_modified_at: s.last_update_date_time,
            expires_at: s.expiration_date_time,
            status: s.status,
            errors: s.errors,
            tasks: vec![task],
            next_link: s.next_link,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyTaskItem {
    #[serde(default)]
    pub task_name: Option<String>,
    #[serde(default)]
    pub last_update_date_time: Option<DateTime<Utc>>,
    pub state: String,
    #[serde(default)]
    pub results: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyTaskGroups {
    #[serde(default)]
    pub entity_recognition_tasks: Vec<LegacyTaskItem>,
    #[serde(default)]
    pub entity_recognition_pii_tasks: Vec<LegacyTaskItem>,
    #[serde(default)]
    pub key_phrase_extraction_tasks: Vec<LegacyTaskItem>,
    #[serde(default)]
    pub entity_linking_tasks: Vec<LegacyTaskItem>,
    #[serde(default)]
    pub sentiment_analysis_tasks: Vec<LegacyTaskItem>,
}

/// `GET text/analytics/v3.x/analyze/jobs/{id}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyAnalyzeJobState {
    pub job_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub created_date_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_update_date_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expiration_date_time: Option<DateTime<Utc>>,
    pub status: String,
    #[serde(default)]
    pub errors: Vec<WireError>,
    #[serde(default)]
    pub tasks: LegacyTaskGroups,
    #[serde(rename = "@nextLink", default)]
    pub next_link: Option<String>,
}

impl From<LegacyAnalyzeJobState> for JobState {
    fn from(s: LegacyAnalyzeJobState) -> Self {
        let groups = s.tasks;
        let tasks = [
            (TaskKind::EntityRecognition, "entityRecognitionTasks", groups.entity_recognition_tasks),
            (TaskKind::PiiEntityRecognition, "entityRecognitionPiiTasks", groups.entity_recognition_pii_tasks),
            (TaskKind::KeyPhraseExtraction, "keyPhraseExtractionTasks", groups.key_phrase_extraction_tasks),
            (TaskKind::EntityLinking, "entityLinkingTasks", groups.entity_linking_tasks),
            (TaskKind::SentimentAnalysis, "sentimentAnalysisTasks", groups.sentiment_analysis_tasks),
        ]
        .into_iter()
        .flat_map(|(kind, group, items)| {
            items.into_iter().enumerate().map(move |(i, item)| TaskState {
                kind,
                name: item.task_name,
                status: item.state,
                last_updated: item.last_update_date_time,
                pointer: format!("#/tasks/{group}/{i}"),
                results: item.results,
            })
        })
        .collect();
        Self {
            job_id: s.job_id,
            display_name: s.display_name,
            created_at: s.created_date_time,
            last_modified_at: s.last_update_date_time,
            expires_at: s.expiration_date_time,
            status: s.status,
            errors: s.errors,
            tasks,
            next_link: s.next_link,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageTaskItem {
    pub kind: String,
    #[serde(default)]
    pub task_name: Option<String>,
    #[serde(default)]
    pub last_update_date_time: Option<DateTime<Utc>>,
    pub status: String,
    #[serde(default)]
    pub results: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LanguageTasks {
    #[serde(default)]
    pub items: Vec<LanguageTaskItem>,
}

/// `GET language/analyze-text/jobs/{id}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageJobState {
    pub job_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub created_date_time: Option<DateTime<Utc>>,
    #[serde(default, alias = "lastUpdateDateTime")]
    pub last_updated_date_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expiration_date_time: Option<DateTime<Utc>>,
    pub status: String,
    #[serde(default)]
    pub errors: Vec<WireError>,
    #[serde(default)]
    pub tasks: LanguageTasks,
    #[serde(default)]
    pub next_link: Option<String>,
}

impl From<LanguageJobState> for JobState {
    fn from(s: LanguageJobState) -> Self {
        let tasks = s
            .tasks
            .items
            .into_iter()
            .enumerate()
            .filter_map(|(i, item)| {
                let kind = TaskKind::from_result_kind(&item.kind);
                if kind.is_none() {
                    tracing::debug!(kind = %item.kind, "Skipping task of unknown kind");
                }
                kind.map(|kind| TaskState {
                    kind,
                    name: item.task_name,
                    status: item.status,
                    last_updated: item.last_update_date_time,
                    pointer: format!("#/tasks/items/{i}"),
                    results: item.results,
                })
            })
            .collect();
        Self {
            job_id: s.job_id,
            display_name: s.display_name,
            created_at: s.created_date_time,
            last_modified_at: s.last_updated_date_time,
            expires_at: s.expiration_date_time,
            status: s.status,
            errors: s.errors,
            tasks,
            next_link: s.next_link,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_kind_parsing() {
        assert_eq!(
            TaskKind::from_result_kind("HealthcareLROResults"),
            Some(TaskKind::Healthcare)
        );
        assert_eq!(
            TaskKind::from_result_kind("KeyPhraseExtraction"),
            Some(TaskKind::KeyPhraseExtraction)
        );
        assert_eq!(TaskKind::from_result_kind("CustomEntityRecognitionLROResults"), None);
    }

    #[test]
    fn legacy_healthcare_state_becomes_single_task() {
        let json = r#"{
            "jobId": "8f2c3e4a-1b2c-4d5e-8f90-123456789abc",
            "createdDateTime": "2021-03-01T10:00:00Z",
            "lastUpdateDateTime": "2021-03-01T10:00:05Z",
            "expirationDateTime": "2021-03-02T10:00:00Z",
            "status": "succeeded",
            "errors": [],
            "results": {"documents": [], "errors": [], "modelVersion": "2021-03-01"},
            "@nextLink": "https://x/text/analytics/v3.1/entities/health/jobs/8f2c3e4a-1b2c-4d5e-8f90-123456789abc?$skip=20&$top=20"
        }"#;
        let state: JobState = serde_json::from_str::<LegacyHealthcareJobState>(json).unwrap().into();
        assert_eq!(state.tasks.len(), 1);
        assert_eq!(state.tasks[0].kind, TaskKind::Healthcare);
        assert!(state.tasks[0].results.is_some());
        assert!(state.next_link.unwrap().contains("$skip=20"));
        assert!(state.created_at.is_some());
    }

    #[test]
    fn legacy_analyze_state_flattens_task_groups() {
        let json = r#"{
            "jobId": "8f2c3e4a-1b2c-4d5e-8f90-123456789abc",
            "status": "running",
            "displayName": "nightly",
            "tasks": {
                "completed": 1, "failed": 0, "inProgress": 1, "total": 2,
                "keyPhraseExtractionTasks": [{"taskName": "kp", "state": "succeeded", "results": {"documents": []}}],
                "sentimentAnalysisTasks": [{"taskName": "sa", "state": "running"}]
            }
        }"#;
        let state: JobState = serde_json::from_str::<LegacyAnalyzeJobState>(json).unwrap().into();
        assert_eq!(state.display_name.as_deref(), Some("nightly"));
        let kinds: Vec<_> = state.tasks.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TaskKind::KeyPhraseExtraction, TaskKind::SentimentAnalysis]);
        assert_eq!(state.tasks[1].pointer, "#/tasks/sentimentAnalysisTasks/0");
        assert!(state.tasks[1].results.is_none());
    }

    #[test]
    fn language_state_skips_unknown_tasks() {
        let json = r#"{
            "jobId": "8f2c3e4a-1b2c-4d5e-8f90-123456789abc",
            "status": "succeeded",
            "lastUpdatedDateTime": "2023-01-01T00:00:00Z",
            "tasks": {"completed": 2, "failed": 0, "inProgress": 0, "total": 2, "items": [
                {"kind": "HealthcareLROResults", "status": "succeeded", "results": {"documents": []}},
                {"kind": "SomethingNewLROResults", "status": "succeeded"}
            ]},
            "nextLink": null
        }"#;
        let state: JobState = serde_json::from_str::<LanguageJobState>(json).unwrap().into();
        assert_eq!(state.tasks.len(), 1);
        assert!(state.last_modified_at.is_some());
        assert!(state.next_link.is_none());
    }

    #[test]
    fn legacy_task_parameters_use_hyphenated_model_version() {
        let params = TaskParameters {
            model_version: Some("latest".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(LegacyTaskParameters::from(&params)).unwrap();
        assert_eq!(json, serde_json::json!({"model-version": "latest"}));
    }
}
