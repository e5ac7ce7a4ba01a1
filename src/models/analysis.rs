//! Per-document values for the synchronous capabilities.

use serde::{Deserialize, Serialize};

use super::enums::SentimentLabel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedLanguage {
    pub name: String,
    pub iso6391_name: String,
    pub confidence_score: f64,
}

pub type KeyPhrases = Vec<String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizedEntity {
    pub text: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub offset: u32,
    pub length: u32,
    pub confidence_score: f64,
}

pub type RecognizedEntities = Vec<CategorizedEntity>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiiEntity {
    pub text: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub offset: u32,
    pub length: u32,
    pub confidence_score: f64,
}

/// PII entities plus the input text with every entity masked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiiEntities {
    pub redacted_text: String,
    pub entities: Vec<PiiEntity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedEntityMatch {
    pub text: String,
    pub offset: u32,
    pub length: u32,
    pub confidence_score: f64,
}

/// An entity resolved against a knowledge base (e.g. Wikipedia).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedEntity {
    pub name: String,
    pub matches: Vec<LinkedEntityMatch>,
    pub language: String,
    pub data_source_entity_id: Option<String>,
    pub url: String,
    pub data_source: String,
    pub bing_entity_search_api_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct SentimentConfidenceScores {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSentiment {
    pub sentiment: SentimentLabel,
    pub confidence_scores: SentimentConfidenceScores,
    pub sentences: Vec<SentenceSentiment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceSentiment {
    pub text: String,
    pub sentiment: SentimentLabel,
    pub confidence_scores: SentimentConfidenceScores,
    pub offset: u32,
    pub length: u32,
    /// Empty unless opinion mining was requested.
    pub opinions: Vec<SentenceOpinion>,
}

/// A target (e.g. "food") and the assessments made about it (e.g. "tasty").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceOpinion {
    pub target: TargetSentiment,
    pub assessments: Vec<AssessmentSentiment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSentiment {
    pub text: String,
    pub sentiment: SentimentLabel,
    pub confidence_scores: SentimentConfidenceScores,
    pub offset: u32,
    pub length: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSentiment {
    pub text: String,
    pub sentiment: SentimentLabel,
    pub confidence_scores: SentimentConfidenceScores,
    pub offset: u32,
    pub length: u32,
    pub is_negated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationCategory {
    pub category: String,
    pub confidence_score: f64,
}

pub type DocumentClassifications = Vec<ClassificationCategory>;
