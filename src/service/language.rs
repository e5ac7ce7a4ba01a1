//! `/language` backend (2022-05-01 and later).
//!
//! Every synchronous capability goes through `:analyze-text` with a `kind`
//! discriminator; jobs live under `analyze-text/jobs` and all of them can
//! be cancelled.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{page_query, to_json, AnalysisService, JobSubmission, ServiceCore};
use crate::error::TextAnalyticsError;
use crate::lro::{JobId, JobType, PageRequest};
use crate::models::ServiceVersion;
use crate::transport::{HttpRequest, Method};
use crate::wire::{self, BatchResults, JobState, TaskParameters};

const ANALYZE_TEXT: &str = "/language/:analyze-text";
const JOBS: &str = "/language/analyze-text/jobs";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeTextRequest<'a, D> {
    kind: &'static str,
    analysis_input: wire::AnalysisInput<D>,
    parameters: &'a TaskParameters,
}

#[derive(Deserialize)]
struct AnalyzeTextResponse<B> {
    results: BatchResults<B>,
}

pub struct LanguageService {
    core: ServiceCore,
}

impl LanguageService {
    pub fn new(core: ServiceCore) -> Self {
        Self { core }
    }

    fn api_version(&self) -> (&'static str, String) {
        ("api-version", self.core.version().as_str().to_string())
    }

    async fn analyze<D: Serialize + Send, B: DeserializeOwned>(
        &self,
        kind: &'static str,
        documents: Vec<D>,
        parameters: &TaskParameters,
        show_stats: bool,
    ) -> Result<BatchResults<B>, TextAnalyticsError> {
        let url = self.core.url(
            ANALYZE_TEXT,
            &[self.api_version(), ("showStats", show_stats.to_string())],
        )?;
        let count = documents.len();
        let body = to_json(&AnalyzeTextRequest {
            kind,
            analysis_input: wire::AnalysisInput { documents },
            parameters,
        })?;
        self.core.span.in_scope(|| {
            tracing::debug!(kind, documents = count, "Submitting analyze-text request");
        });
        let response: AnalyzeTextResponse<B> = self
            .core
            .send_json("analyze_text", HttpRequest::post(url, body))
            .await?;
        Ok(response.results)
    }

    fn job_url(&self, job_id: JobId, suffix: &str, query: &[(&'static str, String)]) -> Result<String, TextAnalyticsError> {
        let mut params = vec![self.api_version()];
        params.extend_from_slice(query);
        self.core.url(&format!("{JOBS}/{job_id}{suffix}"), &params)
    }
}

#[async_trait]
impl AnalysisService for LanguageService {
    fn service_version(&self) -> ServiceVersion {
        self.core.version()
    }

    async fn detect_language(
        &self,
        documents: Vec<wire::LanguageInput>,
        parameters: &TaskParameters,
        show_stats: bool,
    ) -> Result<BatchResults<wire::LanguageBody>, TextAnalyticsError> {
        self.analyze("LanguageDetection", documents, parameters, show_stats)
            .await
    }

    async fn extract_key_phrases(
        &self,
        documents: Vec<wire::MultiLanguageInput>,
        parameters: &TaskParameters,
        show_stats: bool,
    ) -> Result<BatchResults<wire::KeyPhrasesBody>, TextAnalyticsError> {
        self.analyze("KeyPhraseExtraction", documents, parameters, show_stats)
            .await
    }

    async fn recognize_entities(
        &self,
        documents: Vec<wire::MultiLanguageInput>,
        parameters: &TaskParameters,
        show_stats: bool,
    ) -> Result<BatchResults<wire::EntitiesBody>, TextAnalyticsError> {
        self.analyze("EntityRecognition", documents, parameters, show_stats)
            .await
    }

    async fn recognize_pii_entities(
        &self,
        documents: Vec<wire::MultiLanguageInput>,
        parameters: &TaskParameters,
        show_stats: bool,
    ) -> Result<BatchResults<wire::PiiBody>, TextAnalyticsError> {
        self.analyze("PiiEntityRecognition", documents, parameters, show_stats)
            .await
    }

    async fn recognize_linked_entities(
        &self,
        documents: Vec<wire::MultiLanguageInput>,
        parameters: &TaskParameters,
        show_stats: bool,
    ) -> Result<BatchResults<wire::LinkedEntitiesBody>, TextAnalyticsError> {
        self.analyze("EntityLinking", documents, parameters, show_stats)
            .await
    }

    async fn analyze_sentiment(
        &self,
        documents: Vec<wire::MultiLanguageInput>,
        parameters: &TaskParameters,
        show_stats: bool,
    ) -> Result<BatchResults<wire::SentimentBody>, TextAnalyticsError> {
        self.analyze("SentimentAnalysis", documents, parameters, show_stats)
            .await
    }

    async fn dynamic_classify(
        &self,
        documents: Vec<wire::MultiLanguageInput>,
        parameters: &TaskParameters,
        show_stats: bool,
    ) -> Result<BatchResults<wire::ClassificationBody>, TextAnalyticsError> {
        let version = self.core.version();
        if version < ServiceVersion::V2023_04_01 {
            return Err(TextAnalyticsError::UnsupportedVersion {
                feature: "dynamic classification".into(),
                version,
                minimum: ServiceVersion::V2023_04_01,
            });
        }
        self.analyze("DynamicClassification", documents, parameters, show_stats)
            .await
    }

    async fn submit_job(&self, submission: JobSubmission) -> Result<JobId, TextAnalyticsError> {
        let url = self.core.url(JOBS, &[self.api_version()])?;
        let tasks = submission
            .tasks
            .into_iter()
            .map(|t| wire::LanguageJobTask {
                kind: t.kind.language_kind(),
                task_name: t.name,
                parameters: t.parameters,
            })
            .collect();
        let body = wire::LanguageJobRequest {
            display_name: submission.display_name,
            analysis_input: wire::AnalysisInput {
                documents: submission.documents,
            },
            tasks,
        };
        self.core
            .submit("submit_job", HttpRequest::post(url, to_json(&body)?))
            .await
    }

    async fn job_state(
        &self,
        _job_type: JobType,
        job_id: JobId,
        page: PageRequest,
    ) -> Result<JobState, TextAnalyticsError> {
        let url = self.job_url(job_id, "", &page_query(&page))?;
        self.core
            .send_json::<wire::LanguageJobState>("job_state", HttpRequest::get(url))
            .await
            .map(|state| self.core.span.in_scope(|| JobState::from(state)))
    }

    fn supports_cancel(&self, _job_type: JobType) -> bool {
        true
    }

    async fn cancel_job(&self, _job_type: JobType, job_id: JobId) -> Result<(), TextAnalyticsError> {
        let url = self.job_url(job_id, ":cancel", &[])?;
        self.core
            .send(
                "cancel_job",
                HttpRequest {
                    method: Method::Post,
                    url,
                    headers: Vec::new(),
                    body: None,
                },
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::ClassificationType;
    use crate::transport::{HttpResponse, MockTransport};
    use crate::wire::{TaskKind, TaskRequest};

    const JOB: &str = "c1f0e2d3-4b5a-4687-9a8b-0c1d2e3f4a5b";

    fn service(transport: Arc<MockTransport>, version: ServiceVersion) -> LanguageService {
        LanguageService::new(ServiceCore::new(
            "https://lang.example.com",
            version,
            transport,
            tracing::Span::none(),
        ))
    }

    #[tokio::test]
    async fn analyze_text_wraps_kind_and_parameters() {
        let transport = Arc::new(MockTransport::new().with_json(
            200,
            serde_json::json!({
                "kind": "KeyPhraseExtractionResults",
                "results": {
                    "documents": [{"id": "0", "keyPhrases": ["wolf", "moon"], "warnings": []}],
                    "errors": [],
                    "modelVersion": "2022-10-01"
                }
            }),
        ));
        let svc = service(transport.clone(), ServiceVersion::V2022_05_01);
        let params = TaskParameters {
            model_version: Some("latest".into()),
            ..Default::default()
        };
        let docs = vec![wire::MultiLanguageInput {
            id: "0".into(),
            text: "The wolf howls at the moon".into(),
            language: None,
        }];
        let batch = svc.extract_key_phrases(docs, &params, false).await.unwrap();
        assert_eq!(batch.documents[0].body.key_phrases, vec!["wolf", "moon"]);

        let request = &transport.requests()[0];
        assert_eq!(request.path(), "/language/:analyze-text");
        assert_eq!(request.query_param("api-version").as_deref(), Some("2022-05-01"));
        let body = request.body.clone().unwrap();
        assert_eq!(body["kind"], "KeyPhraseExtraction");
        assert_eq!(body["parameters"]["modelVersion"], "latest");
        assert_eq!(body["analysisInput"]["documents"][0]["id"], "0");
    }

    #[tokio::test]
    async fn dynamic_classification_requires_2023_04_01() {
        let transport = Arc::new(MockTransport::new());
        let svc = service(transport.clone(), ServiceVersion::V2022_05_01);
        let err = svc
            .dynamic_classify(vec![], &TaskParameters::default(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, TextAnalyticsError::UnsupportedVersion { .. }));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn dynamic_classification_sends_categories() {
        let transport = Arc::new(MockTransport::new().with_json(
            200,
            serde_json::json!({"kind": "DynamicClassificationResults", "results": {"documents": [], "errors": []}}),
        ));
        let svc = service(transport.clone(), ServiceVersion::V2023_04_01);
        let params = TaskParameters {
            categories: vec!["Health".into(), "Politics".into()],
            classification_type: Some(ClassificationType::Multi),
            ..Default::default()
        };
        svc.dynamic_classify(vec![], &params, false).await.unwrap();
        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(body["kind"], "DynamicClassification");
        assert_eq!(body["parameters"]["categories"][1], "Politics");
        assert_eq!(body["parameters"]["classificationType"], "Multi");
    }

    #[tokio::test]
    async fn job_submission_lists_tasks_by_kind() {
        let location = format!("https://lang.example.com/language/analyze-text/jobs/{JOB}?api-version=2022-05-01");
        let transport = Arc::new(
            MockTransport::new().with_response(HttpResponse::new(202, "").with_header("operation-location", location)),
        );
        let svc = service(transport.clone(), ServiceVersion::V2022_05_01);
        let job_id = svc
            .submit_job(JobSubmission {
                job_type: JobType::Healthcare,
                display_name: Some("intake".into()),
                documents: vec![],
                tasks: vec![TaskRequest {
                    kind: TaskKind::Healthcare,
                    name: None,
                    parameters: TaskParameters::default(),
                }],
            })
            .await
            .unwrap();
        assert_eq!(job_id.to_string(), JOB);
        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(body["displayName"], "intake");
        assert_eq!(body["tasks"][0]["kind"], "Healthcare");
    }

    #[tokio::test]
    async fn every_job_can_be_cancelled() {
        let transport = Arc::new(MockTransport::new().with_response(HttpResponse::new(202, "")));
        let svc = service(transport.clone(), ServiceVersion::V2023_04_01);
        assert!(svc.supports_cancel(JobType::Actions));
        svc.cancel_job(JobType::Actions, JobId::parse(JOB).unwrap())
            .await
            .unwrap();
        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.path(), format!("/language/analyze-text/jobs/{JOB}:cancel"));
    }

    #[tokio::test]
    async fn job_state_is_normalized() {
        let transport = Arc::new(MockTransport::new().with_json(
            200,
            serde_json::json!({
                "jobId": JOB,
                "status": "running",
                "createdDateTime": "2023-04-01T08:00:00Z",
                "tasks": {"items": []}
            }),
        ));
        let svc = service(transport.clone(), ServiceVersion::V2023_04_01);
        let state = svc
            .job_state(JobType::Healthcare, JobId::parse(JOB).unwrap(), PageRequest::first(false))
            .await
            .unwrap();
        assert_eq!(state.status, "running");
        assert!(state.created_at.is_some());
        let request = &transport.requests()[0];
        assert!(request.query_param("$top").is_none());
        assert_eq!(request.query_param("showStats").as_deref(), Some("false"));
    }
}
