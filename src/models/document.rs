//! Caller-supplied document batches.

use serde::{Deserialize, Serialize};

use crate::error::TextAnalyticsError;

/// A document for every capability except language detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextDocumentInput {
    pub id: String,
    pub text: String,
    /// ISO 639-1 language, e.g. "en". `None` lets the client default apply.
    pub language: Option<String>,
}

impl TextDocumentInput {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            language: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// A document for language detection, with an optional country hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectLanguageInput {
    pub id: String,
    pub text: String,
    /// ISO 3166-1 alpha-2 country hint, e.g. "US".
    pub country_hint: Option<String>,
}

impl DetectLanguageInput {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            country_hint: None,
        }
    }

    pub fn with_country_hint(mut self, hint: impl Into<String>) -> Self {
        self.country_hint = Some(hint.into());
        self
    }
}

/// Anything that carries a document id.
pub trait HasDocumentId {
    fn document_id(&self) -> &str;
}

impl HasDocumentId for TextDocumentInput {
    fn document_id(&self) -> &str {
        &self.id
    }
}

impl HasDocumentId for DetectLanguageInput {
    fn document_id(&self) -> &str {
        &self.id
    }
}

/// Reject empty batches and documents without an id.
///
/// Id uniqueness is the caller's responsibility and is not checked.
pub fn validate_batch<D: HasDocumentId>(documents: &[D]) -> Result<(), TextAnalyticsError> {
    if documents.is_empty() {
        return Err(TextAnalyticsError::EmptyBatch);
    }
    if let Some(pos) = documents
        .iter()
        .position(|d| d.document_id().trim().is_empty())
    {
        return Err(TextAnalyticsError::InvalidInput(format!(
            "document at position {pos} has an empty id"
        )));
    }
    Ok(())
}

/// Build a batch from plain strings, numbering ids from "0" in input order.
pub fn text_documents<S: AsRef<str>>(texts: &[S], language: Option<&str>) -> Vec<TextDocumentInput> {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| TextDocumentInput {
            id: i.to_string(),
            text: text.as_ref().to_string(),
            language: language.map(str::to_string),
        })
        .collect()
}

/// Language-detection counterpart of [`text_documents`].
pub fn detect_language_documents<S: AsRef<str>>(
    texts: &[S],
    country_hint: Option<&str>,
) -> Vec<DetectLanguageInput> {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| DetectLanguageInput {
            id: i.to_string(),
            text: text.as_ref().to_string(),
            country_hint: country_hint.map(str::to_string),
        })
        .collect()
}
