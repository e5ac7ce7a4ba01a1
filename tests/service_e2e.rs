//! End-to-end tests of the client over real HTTP.
//!
//! A wiremock server stands in for the service; requests go through the
//! default reqwest transport, so headers, URLs and bodies are what the
//! service would see.

use std::time::Duration;

use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, header_exists, method, path, query_param},
};

use lexis::models::{ServiceVersion, TextDocumentInput};
use lexis::{
    AnalyzeHealthcareEntitiesOptions, JobStatus, TextAnalyticsClient, TextAnalyticsError, TextAnalyticsRequestOptions,
};

const API_KEY: &str = "test-key";
const JOB: &str = "2f1a8c3e-5d6b-4e7f-9a0b-1c2d3e4f5a6b";

fn client(server: &MockServer, version: ServiceVersion) -> TextAnalyticsClient {
    TextAnalyticsClient::builder()
        .endpoint(server.uri())
        .api_key(API_KEY)
        .service_version(version)
        .poll_interval(Duration::from_millis(10))
        .build()
        .expect("client should build")
}

fn health_page(server: &MockServer, ids: &[&str], next_skip: Option<u32>) -> serde_json::Value {
    let documents: Vec<_> = ids
        .iter()
        .map(|id| {
            json!({
                "id": id,
                "entities": [{"text": "aspirin", "category": "MedicationName", "offset": 0, "length": 7, "confidenceScore": 0.97}],
                "relations": [],
                "warnings": []
            })
        })
        .collect();
    let next = next_skip.map(|skip| {
        format!(
            "{}/text/analytics/v3.1/entities/health/jobs/{JOB}?$skip={skip}&$top=1&showStats=false",
            server.uri()
        )
    });
    json!({
        "jobId": JOB,
        "status": "succeeded",
        "createdDateTime": "2021-06-01T09:00:00Z",
        "lastUpdateDateTime": "2021-06-01T09:00:07Z",
        "expirationDateTime": "2021-06-02T09:00:00Z",
        "results": {"documents": documents, "errors": [], "modelVersion": "2021-05-15"},
        "@nextLink": next
    })
}

#[tokio::test]
async fn key_phrases_over_language_api() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/language/:analyze-text"))
        .and(query_param("api-version", "2023-04-01"))
        .and(header("Ocp-Apim-Subscription-Key", API_KEY))
        .and(header_exists("x-ms-client-request-id"))
        .and(body_partial_json(json!({"kind": "KeyPhraseExtraction"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "KeyPhraseExtractionResults",
            "results": {
                "documents": [{"id": "0", "keyPhrases": ["cat", "veterinarian"], "warnings": []}],
                "errors": [{"id": "1", "error": {"code": "InvalidArgument", "message": "Document text is empty."}}],
                "modelVersion": "2022-10-01"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, ServiceVersion::V2023_04_01);
    let result = client
        .extract_key_phrases_batch(&["My cat might need to see a veterinarian.", ""], Some("en"), &TextAnalyticsRequestOptions::default())
        .await
        .expect("request should succeed");

    assert_eq!(result.len(), 2);
    assert_eq!(result.ids(), vec!["0", "1"]);
    let first = result.successes().next().expect("one success");
    assert_eq!(first.value, vec!["cat", "veterinarian"]);
    assert_eq!(result.model_version.as_deref(), Some("2022-10-01"));
}

#[tokio::test]
async fn service_error_is_surfaced_with_payload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/text/analytics/v3.1/sentiment"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"code": "401", "message": "Access denied due to invalid subscription key."}
        })))
        .mount(&server)
        .await;

    let client = client(&server, ServiceVersion::V3_1);
    let err = client
        .analyze_sentiment(&[TextDocumentInput::new("a", "Great hotel.")], &Default::default())
        .await
        .expect_err("401 should fail");

    assert_eq!(err.status(), Some(401));
    match err {
        TextAnalyticsError::Http { error: Some(payload), .. } => {
            assert!(payload.message.contains("invalid subscription key"));
        }
        other => panic!("expected Http error with payload, got {other:?}"),
    }
}

#[tokio::test]
async fn healthcare_job_polls_then_pages() {
    let server = MockServer::start().await;
    let job_path = format!("/text/analytics/v3.1/entities/health/jobs/{JOB}");

    Mock::given(method("POST"))
        .and(path("/text/analytics/v3.1/entities/health/jobs"))
        .and(query_param("loggingOptOut", "true"))
        .and(header("Ocp-Apim-Subscription-Key", API_KEY))
        .respond_with(
            ResponseTemplate::new(202).insert_header("operation-location", format!("{}{job_path}", server.uri())),
        )
        .expect(1)
        .mount(&server)
        .await;

    // Second result page.
    Mock::given(method("GET"))
        .and(path(job_path.as_str()))
        .and(query_param("$skip", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(health_page(&server, &["1"], None)))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    // First status poll.
    Mock::given(method("GET"))
        .and(path(job_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"jobId": JOB, "status": "running"})))
        .up_to_n_times(1)
        .with_priority(2)
        .mount(&server)
        .await;

    // Every later poll and the first result page.
    Mock::given(method("GET"))
        .and(path(job_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(health_page(&server, &["0"], Some(1))))
        .with_priority(3)
        .expect(2)
        .mount(&server)
        .await;

    let client = client(&server, ServiceVersion::V3_1);
    let documents = vec![
        TextDocumentInput::new("0", "Take aspirin daily."),
        TextDocumentInput::new("1", "Aspirin was stopped."),
    ];
    let mut poller = client
        .begin_analyze_healthcare_entities(&documents, &AnalyzeHealthcareEntitiesOptions::default())
        .await
        .expect("submission should succeed");
    assert_eq!(poller.job_id().to_string(), JOB);

    let status = poller.wait_until_done().await.expect("job should finish");
    assert_eq!(status, JobStatus::Succeeded);
    assert!(poller.detail().expires_at.is_some());

    let results = poller
        .results()
        .expect("results available")
        .collect_all()
        .await
        .expect("pages should load");
    assert_eq!(results.ids(), vec!["0", "1"]);
    let doc = results.successes().next().expect("one success");
    assert_eq!(doc.value.entities[0].category, "MedicationName");
}

#[tokio::test]
async fn language_job_cancel_posts_to_cancel_endpoint() {
    let server = MockServer::start().await;
    let job_path = format!("/language/analyze-text/jobs/{JOB}");

    Mock::given(method("POST"))
        .and(path("/language/analyze-text/jobs"))
        .and(body_partial_json(json!({"tasks": [{"kind": "Healthcare"}]})))
        .respond_with(ResponseTemplate::new(202).insert_header(
            "operation-location",
            format!("{}{job_path}?api-version=2022-05-01", server.uri()),
        ))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("{job_path}:cancel").as_str()))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(job_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"jobId": JOB, "status": "cancelled"})))
        .mount(&server)
        .await;

    let client = client(&server, ServiceVersion::V2022_05_01);
    let mut poller = client
        .begin_analyze_healthcare_entities(
            &[TextDocumentInput::new("0", "Patient denies chest pain.")],
            &AnalyzeHealthcareEntitiesOptions::default(),
        )
        .await
        .expect("submission should succeed");

    poller.cancel().await.expect("cancel should be accepted");
    assert_eq!(poller.status(), &JobStatus::NotStarted);
    assert_eq!(poller.wait_until_done().await.expect("poll"), JobStatus::Cancelled);
    assert!(matches!(poller.results(), Err(TextAnalyticsError::JobNotComplete(JobStatus::Cancelled))));
}
