//! Batch result containers shared by every capability.
//!
//! A batch never fails because one document failed: each input id gets
//! exactly one entry, either a value or a `DocumentError`.

use serde::{Deserialize, Serialize};

use crate::error::ErrorPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TextDocumentStatistics {
    pub character_count: u32,
    pub transaction_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BatchStatistics {
    pub document_count: u64,
    pub valid_document_count: u64,
    pub invalid_document_count: u64,
    pub transaction_count: u64,
}

/// Non-fatal warning attached to a successful document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub code: String,
    pub message: String,
    pub target: Option<String>,
}

/// A document the service could not process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentError {
    pub id: String,
    pub error: ErrorPayload,
}

/// A successfully analyzed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedDocument<T> {
    pub id: String,
    pub value: T,
    pub warnings: Vec<Warning>,
    pub statistics: Option<TextDocumentStatistics>,
}

pub type DocumentResult<T> = Result<AnalyzedDocument<T>, DocumentError>;

/// Id of an entry regardless of its outcome.
pub fn result_id<T>(result: &DocumentResult<T>) -> &str {
    match result {
        Ok(doc) => &doc.id,
        Err(err) => &err.id,
    }
}

/// Ordered per-document results for one request or one result page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultCollection<T> {
    pub documents: Vec<DocumentResult<T>>,
    pub model_version: Option<String>,
    pub statistics: Option<BatchStatistics>,
}

impl<T> Default for ResultCollection<T> {
    fn default() -> Self {
        Self {
            documents: Vec::new(),
            model_version: None,
            statistics: None,
        }
    }
}

impl<T> ResultCollection<T> {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DocumentResult<T>> {
        self.documents.iter()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.documents.iter().map(result_id).collect()
    }

    pub fn get(&self, id: &str) -> Option<&DocumentResult<T>> {
        self.documents.iter().find(|r| result_id(r) == id)
    }

    pub fn successes(&self) -> impl Iterator<Item = &AnalyzedDocument<T>> {
        self.documents.iter().filter_map(|r| r.as_ref().ok())
    }

    pub fn errors(&self) -> impl Iterator<Item = &DocumentError> {
        self.documents.iter().filter_map(|r| r.as_ref().err())
    }

    pub fn has_errors(&self) -> bool {
        self.documents.iter().any(Result::is_err)
    }

    /// Append another page of the same result set.
    ///
    /// Statistics are summed; the model version of the first page wins.
    pub fn extend(&mut self, other: ResultCollection<T>) {
        self.documents.extend(other.documents);
        if self.model_version.is_none() {
            self.model_version = other.model_version;
        }
        self.statistics = match (self.statistics, other.statistics) {
            (Some(a), Some(b)) => Some(BatchStatistics {
                document_count: a.document_count + b.document_count,
                valid_document_count: a.valid_document_count + b.valid_document_count,
                invalid_document_count: a.invalid_document_count + b.invalid_document_count,
                transaction_count: a.transaction_count + b.transaction_count,
            }),
            (a, b) => a.or(b),
        };
    }
}

impl<T> IntoIterator for ResultCollection<T> {
    type Item = DocumentResult<T>;
    type IntoIter = std::vec::IntoIter<DocumentResult<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a ResultCollection<T> {
    type Item = &'a DocumentResult<T>;
    type IntoIter = std::slice::Iter<'a, DocumentResult<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}
