//! JSON shapes of document inputs and per-document results.
//!
//! Both backends share these; only the envelopes around them differ.

use serde::{Deserialize, Serialize};

use crate::error::ErrorPayload;
use crate::models::{
    BatchStatistics, Certainty, Conditionality, Association, PiiCategory, PiiDomain,
    SentimentLabel, StringIndexType, TextDocumentStatistics, Warning,
};

// ═══════════════════════════════════════════
// Inputs
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct MultiLanguageInput {
    pub id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageInput {
    pub id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_hint: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentsBody<D> {
    pub documents: Vec<D>,
}

/// Task parameters, serialized as JSON by the language backend and as
/// query parameters by the legacy backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
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
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification_type: Option<crate::models::ClassificationType>,
}

// ═══════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct WireInnerError {
    pub code: String,
    #[serde(default)]
    pub innererror: Option<Box<WireInnerError>>,
}

impl WireInnerError {
    fn innermost_code(&self) -> &str {
        match &self.innererror {
            Some(inner) => inner.innermost_code(),
            None => &self.code,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireError {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub details: Vec<WireError>,
    #[serde(default)]
    pub innererror: Option<WireInnerError>,
}

impl From<WireError> for ErrorPayload {
    fn from(e: WireError) -> Self {
        ErrorPayload {
            inner_code: e.innererror.as_ref().map(|i| i.innermost_code().to_string()),
            code: e.code,
            message: e.message,
            target: e.target,
            details: e.details.into_iter().map(ErrorPayload::from).collect(),
        }
    }
}

/// Body of a non-2xx response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: WireError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentErrorWire {
    pub id: String,
    pub error: WireError,
}

// ═══════════════════════════════════════════
// Batch envelope
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStatisticsWire {
    pub characters_count: u32,
    pub transactions_count: u32,
}

impl From<DocumentStatisticsWire> for TextDocumentStatistics {
    fn from(s: DocumentStatisticsWire) -> Self {
        Self {
            character_count: s.characters_count,
            transaction_count: s.transactions_count,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestStatisticsWire {
    pub documents_count: u64,
    pub valid_documents_count: u64,
    pub erroneous_documents_count: u64,
    pub transactions_count: u64,
}

impl From<RequestStatisticsWire> for BatchStatistics {
    fn from(s: RequestStatisticsWire) -> Self {
        Self {
            document_count: s.documents_count,
            valid_document_count: s.valid_documents_count,
            invalid_document_count: s.erroneous_documents_count,
            transaction_count: s.transactions_count,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarningWire {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub target_ref: Option<String>,
}

impl From<WarningWire> for Warning {
    fn from(w: WarningWire) -> Self {
        Self {
            code: w.code,
            message: w.message,
            target: w.target_ref,
        }
    }
}

/// A successful document: common fields plus the capability-specific body.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentEnvelope<B> {
    pub id: String,
    #[serde(default)]
    pub warnings: Vec<WarningWire>,
    #[serde(default)]
    pub statistics: Option<DocumentStatisticsWire>,
    #[serde(flatten)]
    pub body: B,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResults<B> {
    #[serde(default = "Vec::new")]
    pub documents: Vec<DocumentEnvelope<B>>,
    #[serde(default)]
    pub errors: Vec<DocumentErrorWire>,
    #[serde(default)]
    pub statistics: Option<RequestStatisticsWire>,
    #[serde(default)]
    pub model_version: Option<String>,
}

// ═══════════════════════════════════════════
// Capability bodies
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedLanguageWire {
    pub name: String,
    pub iso6391_name: String,
    pub confidence_score: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageBody {
    pub detected_language: DetectedLanguageWire,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPhrasesBody {
    pub key_phrases: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityWire {
    pub text: String,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    pub offset: u32,
    pub length: u32,
    pub confidence_score: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntitiesBody {
    pub entities: Vec<EntityWire>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PiiBody {
    pub redacted_text: String,
    pub entities: Vec<EntityWire>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedMatchWire {
    pub text: String,
    pub offset: u32,
    pub length: u32,
    pub confidence_score: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedEntityWire {
    pub name: String,
    pub matches: Vec<LinkedMatchWire>,
    pub language: String,
    #[serde(default)]
    pub id: Option<String>,
    pub url: String,
    pub data_source: String,
    #[serde(default)]
    pub bing_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkedEntitiesBody {
    pub entities: Vec<LinkedEntityWire>,
}

#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct SentimentScoresWire {
    #[serde(default)]
    pub positive: f64,
    #[serde(default)]
    pub neutral: f64,
    #[serde(default)]
    pub negative: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationWire {
    pub relation_type: String,
    #[serde(rename = "ref")]
    pub reference: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetWire {
    pub text: String,
    pub sentiment: SentimentLabel,
    pub confidence_scores: SentimentScoresWire,
    pub offset: u32,
    pub length: u32,
    #[serde(default)]
    pub relations: Vec<RelationWire>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentWire {
    pub text: String,
    pub sentiment: SentimentLabel,
    pub confidence_scores: SentimentScoresWire,
    pub offset: u32,
    pub length: u32,
    #[serde(default)]
    pub is_negated: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceWire {
    pub text: String,
    pub sentiment: SentimentLabel,
    pub confidence_scores: SentimentScoresWire,
    pub offset: u32,
    pub length: u32,
    #[serde(default)]
    pub targets: Vec<TargetWire>,
    #[serde(default)]
    pub assessments: Vec<AssessmentWire>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentBody {
    pub sentiment: SentimentLabel,
    pub confidence_scores: SentimentScoresWire,
    pub sentences: Vec<SentenceWire>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationWire {
    pub category: String,
    pub confidence_score: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassificationBody {
    #[serde(rename = "class", alias = "classifications")]
    pub classifications: Vec<ClassificationWire>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssertionWire {
    #[serde(default)]
    pub certainty: Option<Certainty>,
    #[serde(default)]
    pub conditionality: Option<Conditionality>,
    #[serde(default)]
    pub association: Option<Association>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityLinkWire {
    pub data_source: String,
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthcareEntityWire {
    pub text: String,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    pub offset: u32,
    pub length: u32,
    pub confidence_score: f64,
    #[serde(default)]
    pub assertion: Option<AssertionWire>,
    /// Normalized name from the medical ontology.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub links: Vec<EntityLinkWire>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelationRoleWire {
    #[serde(rename = "ref")]
    pub reference: String,
    pub role: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthcareRelationWire {
    pub relation_type: String,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    pub entities: Vec<RelationRoleWire>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthcareBody {
    pub entities: Vec<HealthcareEntityWire>,
    #[serde(default)]
    pub relations: Vec<HealthcareRelationWire>,
}
