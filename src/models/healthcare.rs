use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::analysis::{CategorizedEntity, DocumentSentiment, KeyPhrases, LinkedEntity, PiiEntities};
use super::enums::{Association, Certainty, Conditionality};
use super::results::ResultCollection;
use crate::error::ErrorPayload;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDataSource {
    pub name: String,
    pub entity_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HealthcareEntityAssertion {
    pub certainty: Option<Certainty>,
    pub conditionality: Option<Conditionality>,
    pub association: Option<Association>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthcareEntity {
    pub text: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub offset: u32,
    pub length: u32,
    pub confidence_score: f64,
    pub normalized_text: Option<String>,
    pub assertion: Option<HealthcareEntityAssertion>,
    pub data_sources: Vec<EntityDataSource>,
}

/// One participant in a relation; `entity_index` points into
/// `HealthcareEntitiesResult::entities`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthcareEntityRelationRole {
    pub name: String,
    pub entity_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthcareEntityRelation {
    /// E.g. "DosageOfMedication", "TimeOfCondition".
    pub relation_type: String,
    pub confidence_score: Option<f64>,
    pub roles: Vec<HealthcareEntityRelationRole>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HealthcareEntitiesResult {
    pub entities: Vec<HealthcareEntity>,
    pub relations: Vec<HealthcareEntityRelation>,
}

impl HealthcareEntitiesResult {
    /// Entities taking part in a relation, in role order.
    pub fn relation_entities<'a>(
        &'a self,
        relation: &'a HealthcareEntityRelation,
    ) -> impl Iterator<Item = (&'a str, &'a HealthcareEntity)> + 'a {
        relation
            .roles
            .iter()
            .filter_map(|role| self.entities.get(role.entity_index).map(|e| (role.name.as_str(), e)))
    }
}

/// Outcome of one task inside a multi-action job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult<T> {
    pub task_name: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub outcome: Result<ResultCollection<T>, ErrorPayload>,
}

/// One page of a multi-action job's results, grouped by action type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AnalyzeActionsResult {
    pub recognize_entities: Vec<ActionResult<Vec<CategorizedEntity>>>,
    pub recognize_pii_entities: Vec<ActionResult<PiiEntities>>,
    pub extract_key_phrases: Vec<ActionResult<KeyPhrases>>,
    pub recognize_linked_entities: Vec<ActionResult<Vec<LinkedEntity>>>,
    pub analyze_sentiment: Vec<ActionResult<DocumentSentiment>>,
}

impl AnalyzeActionsResult {
    pub fn action_count(&self) -> usize {
        self.recognize_entities.len()
            + self.recognize_pii_entities.len()
            + self.extract_key_phrases.len()
            + self.recognize_linked_entities.len()
            + self.analyze_sentiment.len()
    }

    /// Every task-level failure on this page.
    pub fn failed_actions(&self) -> Vec<&ErrorPayload> {
        fn failures<T>(actions: &[ActionResult<T>]) -> impl Iterator<Item = &ErrorPayload> {
            actions.iter().filter_map(|a| a.outcome.as_ref().err())
        }
        failures(&self.recognize_entities)
            .chain(failures(&self.recognize_pii_entities))
            .chain(failures(&self.extract_key_phrases))
            .chain(failures(&self.recognize_linked_entities))
            .chain(failures(&self.analyze_sentiment))
            .collect()
    }
}
