use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TextAnalyticsError;
use crate::wire::JobState;

/// Identifier of a submitted job, as assigned by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn parse(s: &str) -> Result<Self, TextAnalyticsError> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| TextAnalyticsError::ResponseParsing(format!("invalid job id '{s}': {e}")))
    }

    /// Extract the id from an `operation-location` header such as
    /// `https://host/language/analyze-text/jobs/{id}?api-version=2022-05-01`.
    pub fn from_operation_location(location: &str) -> Result<Self, TextAnalyticsError> {
        let path = location.split(['?', '#']).next().unwrap_or_default();
        let segment = path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                TextAnalyticsError::ResponseParsing(format!(
                    "operation-location has no job id: '{location}'"
                ))
            })?;
        Self::parse(segment)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// What the caller can observe about a job between polls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDetail {
    pub job_id: JobId,
    pub display_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_modified_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl OperationDetail {
    pub fn new(job_id: JobId) -> Self {
        Self {
            job_id,
            display_name: None,
            created_at: None,
            last_modified_at: None,
            expires_at: None,
        }
    }

    /// Take whatever the latest poll reported; fields it omits keep their value.
    pub fn update_from(&mut self, state: &JobState) {
        if state.display_name.is_some() {
            self.display_name = state.display_name.clone();
        }
        if state.created_at.is_some() {
            self.created_at = state.created_at;
        }
        if state.last_modified_at.is_some() {
            self.last_modified_at = state.last_modified_at;
        }
        if state.expires_at.is_some() {
            self.expires_at = state.expires_at;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "0d2bd3b4-7f1c-4d8e-b5a1-6c9f2e0a4b13";

    #[test]
    fn job_id_from_language_operation_location() {
        let location = format!("https://lang.example.com/language/analyze-text/jobs/{ID}?api-version=2022-05-01");
        let id = JobId::from_operation_location(&location).unwrap();
        assert_eq!(id.to_string(), ID);
    }

    #[test]
    fn job_id_from_legacy_operation_location() {
        let location = format!("https://lang.example.com/text/analytics/v3.1/entities/health/jobs/{ID}");
        assert_eq!(JobId::from_operation_location(&location).unwrap().to_string(), ID);
    }

    #[test]
    fn garbled_operation_location_is_rejected() {
        assert!(JobId::from_operation_location("https://lang.example.com/jobs/not-a-uuid").is_err());
        assert!(JobId::from_operation_location("").is_err());
    }

    #[test]
    fn detail_keeps_fields_missing_from_later_polls() {
        let id = JobId::parse(ID).unwrap();
        let mut detail = OperationDetail::new(id);
        let created: DateTime<Utc> = "2023-05-01T10:00:00Z".parse().unwrap();
        let mut state = JobState {
            job_id: ID.into(),
            display_name: Some("nightly".into()),
            created_at: Some(created),
            last_modified_at: Some(created),
            expires_at: None,
            status: "running".into(),
            errors: vec![],
            tasks: vec![],
            next_link: None,
        };
        detail.update_from(&state);
        state.display_name = None;
        state.last_modified_at = Some("2023-05-01T10:00:09Z".parse().unwrap());
        detail.update_from(&state);
        assert_eq!(detail.display_name.as_deref(), Some("nightly"));
        assert_eq!(detail.created_at, Some(created));
        assert_ne!(detail.last_modified_at, Some(created));
    }
}
