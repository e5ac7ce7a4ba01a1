//! Wire → model conversion.
//!
//! Successful documents keep the order the service returned them in, and
//! per-document errors are appended after them in their own server order.

use serde::de::DeserializeOwned;

use crate::error::{ErrorPayload, TextAnalyticsError};
use crate::models::*;
use crate::wire::{self, BatchResults, DocumentEnvelope};

/// Convert a batch envelope, mapping each successful body with `f`.
pub fn to_collection<B, T>(batch: BatchResults<B>, f: impl Fn(B) -> T) -> ResultCollection<T> {
    let mut documents: Vec<DocumentResult<T>> =
        Vec::with_capacity(batch.documents.len() + batch.errors.len());

    for DocumentEnvelope {
        id,
        warnings,
        statistics,
        body,
    } in batch.documents
    {
        documents.push(Ok(AnalyzedDocument {
            id,
            value: f(body),
            warnings: warnings.into_iter().map(Warning::from).collect(),
            statistics: statistics.map(TextDocumentStatistics::from),
        }));
    }

    for err in batch.errors {
        documents.push(Err(DocumentError {
            id: err.id,
            error: ErrorPayload::from(err.error),
        }));
    }

    ResultCollection {
        documents,
        model_version: batch.model_version,
        statistics: batch.statistics.map(BatchStatistics::from),
    }
}

/// Decode raw task results carried inside a job-state response.
pub fn decode_batch<B: DeserializeOwned>(
    value: serde_json::Value,
) -> Result<BatchResults<B>, TextAnalyticsError> {
    serde_json::from_value(value).map_err(|e| TextAnalyticsError::ResponseParsing(e.to_string()))
}

pub fn detected_language(body: wire::LanguageBody) -> DetectedLanguage {
    let l = body.detected_language;
    DetectedLanguage {
        name: l.name,
        iso6391_name: l.iso6391_name,
        confidence_score: l.confidence_score,
    }
}

pub fn key_phrases(body: wire::KeyPhrasesBody) -> KeyPhrases {
    body.key_phrases
}

fn categorized_entity(e: wire::EntityWire) -> CategorizedEntity {
    CategorizedEntity {
        text: e.text,
        category: e.category,
        subcategory: e.subcategory,
        offset: e.offset,
        length: e.length,
        confidence_score: e.confidence_score,
    }
}

pub fn entities(body: wire::EntitiesBody) -> RecognizedEntities {
    body.entities.into_iter().map(categorized_entity).collect()
}

pub fn pii_entities(body: wire::PiiBody) -> PiiEntities {
    PiiEntities {
        redacted_text: body.redacted_text,
        entities: body
            .entities
            .into_iter()
            .map(|e| PiiEntity {
                text: e.text,
                category: e.category,
                subcategory: e.subcategory,
                offset: e.offset,
                length: e.length,
                confidence_score: e.confidence_score,
            })
            .collect(),
    }
}

pub fn linked_entities(body: wire::LinkedEntitiesBody) -> Vec<LinkedEntity> {
    body.entities
        .into_iter()
        .map(|e| LinkedEntity {
            name: e.name,
            matches: e
                .matches
                .into_iter()
                .map(|m| LinkedEntityMatch {
                    text: m.text,
                    offset: m.offset,
                    length: m.length,
                    confidence_score: m.confidence_score,
                })
                .collect(),
            language: e.language,
            data_source_entity_id: e.id,
            url: e.url,
            data_source: e.data_source,
            bing_entity_search_api_id: e.bing_id,
        })
        .collect()
}

fn scores(s: wire::SentimentScoresWire) -> SentimentConfidenceScores {
    SentimentConfidenceScores {
        positive: s.positive,
        neutral: s.neutral,
        negative: s.negative,
    }
}

/// Index following `segment` in a JSON-pointer style reference,
/// e.g. `ref_index("#/documents/0/sentences/1/assessments/2", "assessments") == Some(2)`.
pub(crate) fn ref_index(reference: &str, segment: &str) -> Option<usize> {
    let mut parts = reference.split('/');
    while let Some(part) = parts.next() {
        if part == segment {
            return parts.next().and_then(|n| n.parse().ok());
        }
    }
    None
}

pub fn sentiment(body: wire::SentimentBody) -> DocumentSentiment {
    // Assessments are referenced by (sentence, assessment) index, so keep the
    // raw sentence list around while resolving targets.
    let all_assessments: Vec<Vec<AssessmentSentiment>> = body
        .sentences
        .iter()
        .map(|s| {
            s.assessments
                .iter()
                .map(|a| AssessmentSentiment {
                    text: a.text.clone(),
                    sentiment: a.sentiment.clone(),
                    confidence_scores: scores(a.confidence_scores),
                    offset: a.offset,
                    length: a.length,
                    is_negated: a.is_negated,
                })
                .collect()
        })
        .collect();

    let sentences = body
        .sentences
        .into_iter()
        .enumerate()
        .map(|(sentence_idx, s)| {
            let opinions = s
                .targets
                .into_iter()
                .map(|t| {
                    let assessments = t
                        .relations
                        .iter()
                        .filter(|r| r.relation_type == "assessment")
                        .filter_map(|r| {
                            let sentence = ref_index(&r.reference, "sentences").unwrap_or(sentence_idx);
                            let idx = ref_index(&r.reference, "assessments")?;
                            all_assessments.get(sentence)?.get(idx).cloned()
                        })
                        .collect();
                    SentenceOpinion {
                        target: TargetSentiment {
                            text: t.text,
                            sentiment: t.sentiment,
                            confidence_scores: scores(t.confidence_scores),
                            offset: t.offset,
                            length: t.length,
                        },
                        assessments,
                    }
                })
                .collect();
            SentenceSentiment {
                text: s.text,
                sentiment: s.sentiment,
                confidence_scores: scores(s.confidence_scores),
                offset: s.offset,
                length: s.length,
                opinions,
            }
        })
        .collect();

    DocumentSentiment {
        sentiment: body.sentiment,
        confidence_scores: scores(body.confidence_scores),
        sentences,
    }
}

pub fn classifications(body: wire::ClassificationBody) -> DocumentClassifications {
    body.classifications
        .into_iter()
        .map(|c| ClassificationCategory {
            category: c.category,
            confidence_score: c.confidence_score,
        })
        .collect()
}

pub fn healthcare(body: wire::HealthcareBody) -> HealthcareEntitiesResult {
    let entity_count = body.entities.len();
    let entities = body
        .entities
        .into_iter()
        .map(|e| HealthcareEntity {
            text: e.text,
            category: e.category,
            subcategory: e.subcategory,
            offset: e.offset,
            length: e.length,
            confidence_score: e.confidence_score,
            normalized_text: e.name,
            assertion: e.assertion.map(|a| HealthcareEntityAssertion {
                certainty: a.certainty,
                conditionality: a.conditionality,
                association: a.association,
            }),
            data_sources: e
                .links
                .into_iter()
                .map(|l| EntityDataSource {
                    name: l.data_source,
                    entity_id: l.id,
                })
                .collect(),
        })
        .collect();

    let relations = body
        .relations
        .into_iter()
        .map(|r| HealthcareEntityRelation {
            relation_type: r.relation_type,
            confidence_score: r.confidence_score,
            roles: r
                .entities
                .into_iter()
                .filter_map(|role| {
                    let idx = ref_index(&role.reference, "entities").filter(|i| *i < entity_count);
                    if idx.is_none() {
                        tracing::warn!(reference = %role.reference, "Unresolvable relation reference");
                    }
                    idx.map(|entity_index| HealthcareEntityRelationRole {
                        name: role.role,
                        entity_index,
                    })
                })
                .collect(),
        })
        .collect();

    HealthcareEntitiesResult { entities, relations }
}
