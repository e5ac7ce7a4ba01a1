//! Per-call options.
//!
//! Every option struct has plain defaults and is resolved once, at call
//! entry, against the client's service version. Resolution is where
//! version gates fail; nothing after it looks at the raw options again.

use std::time::Duration;

use crate::error::TextAnalyticsError;
use crate::models::{ClassificationType, PiiCategory, PiiDomain, ServiceVersion, StringIndexType};
use crate::wire::{TaskKind, TaskParameters, TaskRequest};

/// Options shared by every capability.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextAnalyticsRequestOptions {
    pub model_version: Option<String>,
    pub include_statistics: bool,
    /// Ask the service not to log the input text. `None` leaves the
    /// per-capability default in place.
    pub disable_service_logs: Option<bool>,
}

impl TextAnalyticsRequestOptions {
    pub fn with_model_version(mut self, model_version: impl Into<String>) -> Self {
        self.model_version = Some(model_version.into());
        self
    }

    pub fn with_statistics(mut self) -> Self {
        self.include_statistics = true;
        self
    }

    pub fn with_service_logs_disabled(mut self, disabled: bool) -> Self {
        self.disable_service_logs = Some(disabled);
        self
    }

    /// `opt_out_by_default` is true for capabilities that handle sensitive
    /// text (PII, healthcare), where the service itself opts out.
    pub(crate) fn resolve(
        &self,
        version: ServiceVersion,
        opt_out_by_default: bool,
    ) -> Result<ResolvedRequest, TextAnalyticsError> {
        let logging_opt_out = match self.disable_service_logs {
            Some(true) => {
                require(version, ServiceVersion::V3_1, "disabling service logs")?;
                Some(true)
            }
            Some(false) if version >= ServiceVersion::V3_1 => Some(false),
            Some(false) => None,
            None if opt_out_by_default && version >= ServiceVersion::V3_1 => Some(true),
            None => None,
        };
        Ok(ResolvedRequest {
            parameters: TaskParameters {
                model_version: self.model_version.clone(),
                logging_opt_out,
                ..Default::default()
            },
            show_stats: self.include_statistics,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecognizePiiEntitiesOptions {
    pub request: TextAnalyticsRequestOptions,
    pub domain: Option<PiiDomain>,
    /// Restrict recognition to these categories. Empty means all.
    pub categories: Vec<PiiCategory>,
    pub string_index_type: Option<StringIndexType>,
}

impl RecognizePiiEntitiesOptions {
    pub(crate) fn resolve(&self, version: ServiceVersion) -> Result<ResolvedRequest, TextAnalyticsError> {
        require(version, ServiceVersion::V3_1, "PII entity recognition")?;
        let mut resolved = self.request.resolve(version, true)?;
        resolved.parameters.domain = self.domain;
        resolved.parameters.pii_categories = self.categories.clone();
        resolved.parameters.string_index_type = self.string_index_type;
        Ok(resolved)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyzeSentimentOptions {
    pub request: TextAnalyticsRequestOptions,
    /// Also report targets and the assessments made about them.
    pub include_opinion_mining: bool,
    pub string_index_type: Option<StringIndexType>,
}

impl AnalyzeSentimentOptions {
    pub(crate) fn resolve(&self, version: ServiceVersion) -> Result<ResolvedRequest, TextAnalyticsError> {
        if self.include_opinion_mining {
            require(version, ServiceVersion::V3_1, "opinion mining")?;
        }
        let mut resolved = self.request.resolve(version, false)?;
        resolved.parameters.opinion_mining = self.include_opinion_mining.then_some(true);
        resolved.parameters.string_index_type = string_index_type(self.string_index_type, version)?;
        Ok(resolved)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynamicClassifyOptions {
    pub request: TextAnalyticsRequestOptions,
    /// Candidate labels. At least one is required.
    pub categories: Vec<String>,
    pub classification_type: Option<ClassificationType>,
}

impl DynamicClassifyOptions {
    pub fn new<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            categories: categories.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub(crate) fn resolve(&self, version: ServiceVersion) -> Result<ResolvedRequest, TextAnalyticsError> {
        require(version, ServiceVersion::V2023_04_01, "dynamic classification")?;
        if self.categories.iter().all(|c| c.trim().is_empty()) {
            return Err(TextAnalyticsError::InvalidInput(
                "dynamic classification needs at least one category".into(),
            ));
        }
        let mut resolved = self.request.resolve(version, false)?;
        resolved.parameters.categories = self.categories.clone();
        resolved.parameters.classification_type = self.classification_type;
        Ok(resolved)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyzeHealthcareEntitiesOptions {
    pub request: TextAnalyticsRequestOptions,
    pub display_name: Option<String>,
    /// Overrides the client's poll interval for this job.
    pub poll_interval: Option<Duration>,
}

impl AnalyzeHealthcareEntitiesOptions {
    pub(crate) fn resolve(&self, version: ServiceVersion) -> Result<ResolvedJob, TextAnalyticsError> {
        require(version, ServiceVersion::V3_1, "healthcare entity analysis")?;
        let display_name = display_name(&self.display_name, version)?;
        let resolved = self.request.resolve(version, true)?;
        Ok(ResolvedJob {
            display_name,
            tasks: vec![TaskRequest {
                kind: TaskKind::Healthcare,
                name: None,
                parameters: resolved.parameters,
            }],
            show_stats: resolved.show_stats,
            poll_interval: self.poll_interval,
        })
    }
}

/// One action of a multi-action job.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    RecognizeEntities(TextAnalyticsRequestOptions),
    RecognizePiiEntities(RecognizePiiEntitiesOptions),
    ExtractKeyPhrases(TextAnalyticsRequestOptions),
    RecognizeLinkedEntities(TextAnalyticsRequestOptions),
    AnalyzeSentiment(AnalyzeSentimentOptions),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisAction {
    /// Echoed back on the action's results.
    pub name: Option<String>,
    pub kind: ActionKind,
}

impl AnalysisAction {
    pub fn new(kind: ActionKind) -> Self {
        Self { name: None, kind }
    }

    pub fn recognize_entities() -> Self {
        Self::new(ActionKind::RecognizeEntities(Default::default()))
    }

    pub fn recognize_pii_entities(options: RecognizePiiEntitiesOptions) -> Self {
        Self::new(ActionKind::RecognizePiiEntities(options))
    }

    pub fn extract_key_phrases() -> Self {
        Self::new(ActionKind::ExtractKeyPhrases(Default::default()))
    }

    pub fn recognize_linked_entities() -> Self {
        Self::new(ActionKind::RecognizeLinkedEntities(Default::default()))
    }

    pub fn analyze_sentiment(options: AnalyzeSentimentOptions) -> Self {
        Self::new(ActionKind::AnalyzeSentiment(options))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The task for this action, plus whether it asked for statistics.
    fn resolve(&self, version: ServiceVersion) -> Result<(TaskRequest, bool), TextAnalyticsError> {
        let (kind, resolved) = match &self.kind {
            ActionKind::RecognizeEntities(o) => (TaskKind::EntityRecognition, o.resolve(version, false)?),
            ActionKind::RecognizePiiEntities(o) => (TaskKind::PiiEntityRecognition, o.resolve(version)?),
            ActionKind::ExtractKeyPhrases(o) => (TaskKind::KeyPhraseExtraction, o.resolve(version, false)?),
            ActionKind::RecognizeLinkedEntities(o) => (TaskKind::EntityLinking, o.resolve(version, false)?),
            ActionKind::AnalyzeSentiment(o) => (TaskKind::SentimentAnalysis, o.resolve(version)?),
        };
        let task = TaskRequest {
            kind,
            name: self.name.clone(),
            parameters: resolved.parameters,
        };
        Ok((task, resolved.show_stats))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyzeActionsOptions {
    pub display_name: Option<String>,
    pub include_statistics: bool,
    pub poll_interval: Option<Duration>,
}

impl AnalyzeActionsOptions {
    pub(crate) fn resolve(
        &self,
        actions: &[AnalysisAction],
        version: ServiceVersion,
    ) -> Result<ResolvedJob, TextAnalyticsError> {
        require(version, ServiceVersion::V3_1, "multi-action analysis")?;
        if actions.is_empty() {
            return Err(TextAnalyticsError::InvalidInput(
                "at least one action is required".into(),
            ));
        }
        let display_name = display_name(&self.display_name, version)?;
        let mut show_stats = self.include_statistics;
        let mut tasks = Vec::with_capacity(actions.len());
        for action in actions {
            let (task, stats) = action.resolve(version)?;
            show_stats |= stats;
            tasks.push(task);
        }
        Ok(ResolvedJob {
            display_name,
            tasks,
            show_stats,
            poll_interval: self.poll_interval,
        })
    }
}

/// Options after version checks, ready for the service layer.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResolvedRequest {
    pub parameters: TaskParameters,
    pub show_stats: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResolvedJob {
    pub display_name: Option<String>,
    pub tasks: Vec<TaskRequest>,
    pub show_stats: bool,
    pub poll_interval: Option<Duration>,
}

fn require(version: ServiceVersion, minimum: ServiceVersion, feature: &str) -> Result<(), TextAnalyticsError> {
    if version >= minimum {
        Ok(())
    } else {
        Err(TextAnalyticsError::UnsupportedVersion {
            feature: feature.to_string(),
            version,
            minimum,
        })
    }
}

fn string_index_type(
    value: Option<StringIndexType>,
    version: ServiceVersion,
) -> Result<Option<StringIndexType>, TextAnalyticsError> {
    if value.is_some() {
        require(version, ServiceVersion::V3_1, "string index type")?;
    }
    Ok(value)
}

fn display_name(value: &Option<String>, version: ServiceVersion) -> Result<Option<String>, TextAnalyticsError> {
    if value.is_some() {
        require(version, ServiceVersion::V2022_05_01, "job display name")?;
    }
    Ok(value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opinion_mining_needs_v3_1() {
        let options = AnalyzeSentimentOptions {
            include_opinion_mining: true,
            ..Default::default()
        };
        let err = options.resolve(ServiceVersion::V3_0).unwrap_err();
        match err {
            TextAnalyticsError::UnsupportedVersion { feature, version, minimum } => {
                assert_eq!(feature, "opinion mining");
                assert_eq!(version, ServiceVersion::V3_0);
                assert_eq!(minimum, ServiceVersion::V3_1);
            }
            other => panic!("unexpected error: {other}"),
        }
        let resolved = options.resolve(ServiceVersion::V3_1).unwrap();
        assert_eq!(resolved.parameters.opinion_mining, Some(true));
    }

    #[test]
    fn plain_sentiment_works_everywhere() {
        let resolved = AnalyzeSentimentOptions::default()
            .resolve(ServiceVersion::V3_0)
            .unwrap();
        assert_eq!(resolved.parameters, TaskParameters::default());
    }

    #[test]
    fn sensitive_capabilities_opt_out_of_logging_by_default() {
        let pii = RecognizePiiEntitiesOptions::default()
            .resolve(ServiceVersion::V3_1)
            .unwrap();
        assert_eq!(pii.parameters.logging_opt_out, Some(true));

        let plain = TextAnalyticsRequestOptions::default()
            .resolve(ServiceVersion::V3_1, false)
            .unwrap();
        assert_eq!(plain.parameters.logging_opt_out, None);

        let explicit = RecognizePiiEntitiesOptions {
            request: TextAnalyticsRequestOptions::default().with_service_logs_disabled(false),
            ..Default::default()
        }
        .resolve(ServiceVersion::V3_1)
        .unwrap();
        assert_eq!(explicit.parameters.logging_opt_out, Some(false));
    }

    #[test]
    fn disabling_logs_on_v3_0_is_rejected() {
        let options = TextAnalyticsRequestOptions::default().with_service_logs_disabled(true);
        assert!(matches!(
            options.resolve(ServiceVersion::V3_0, false),
            Err(TextAnalyticsError::UnsupportedVersion { .. })
        ));
        let options = TextAnalyticsRequestOptions::default().with_service_logs_disabled(false);
        assert_eq!(
            options.resolve(ServiceVersion::V3_0, false).unwrap().parameters.logging_opt_out,
            None
        );
    }

    #[test]
    fn pii_needs_v3_1() {
        assert!(matches!(
            RecognizePiiEntitiesOptions::default().resolve(ServiceVersion::V3_0),
            Err(TextAnalyticsError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn dynamic_classification_gates() {
        let options = DynamicClassifyOptions::new(["Sports", "Weather"]);
        assert!(matches!(
            options.resolve(ServiceVersion::V2022_05_01),
            Err(TextAnalyticsError::UnsupportedVersion { .. })
        ));
        let resolved = options.resolve(ServiceVersion::V2023_04_01).unwrap();
        assert_eq!(resolved.parameters.categories, vec!["Sports", "Weather"]);

        let empty = DynamicClassifyOptions::default();
        assert!(matches!(
            empty.resolve(ServiceVersion::V2023_04_01),
            Err(TextAnalyticsError::InvalidInput(_))
        ));
    }

    #[test]
    fn display_name_needs_language_api() {
        let options = AnalyzeHealthcareEntitiesOptions {
            display_name: Some("intake".into()),
            ..Default::default()
        };
        assert!(matches!(
            options.resolve(ServiceVersion::V3_1),
            Err(TextAnalyticsError::UnsupportedVersion { .. })
        ));
        let job = options.resolve(ServiceVersion::V2022_05_01).unwrap();
        assert_eq!(job.display_name.as_deref(), Some("intake"));
        assert_eq!(job.tasks[0].kind, TaskKind::Healthcare);
        assert_eq!(job.tasks[0].parameters.logging_opt_out, Some(true));
    }

    #[test]
    fn healthcare_needs_v3_1() {
        assert!(matches!(
            AnalyzeHealthcareEntitiesOptions::default().resolve(ServiceVersion::V3_0),
            Err(TextAnalyticsError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn actions_resolve_to_named_tasks() {
        let actions = [
            AnalysisAction::extract_key_phrases().with_name("kp"),
            AnalysisAction::analyze_sentiment(AnalyzeSentimentOptions {
                include_opinion_mining: true,
                ..Default::default()
            }),
        ];
        let job = AnalyzeActionsOptions::default()
            .resolve(&actions, ServiceVersion::V3_1)
            .unwrap();
        assert_eq!(job.tasks.len(), 2);
        assert_eq!(job.tasks[0].name.as_deref(), Some("kp"));
        assert_eq!(job.tasks[1].kind, TaskKind::SentimentAnalysis);
        assert_eq!(job.tasks[1].parameters.opinion_mining, Some(true));

        assert!(matches!(
            AnalyzeActionsOptions::default().resolve(&[], ServiceVersion::V3_1),
            Err(TextAnalyticsError::InvalidInput(_))
        ));
    }

    #[test]
    fn action_statistics_request_statistics_for_the_job() {
        let actions = [
            AnalysisAction::extract_key_phrases(),
            AnalysisAction::new(ActionKind::RecognizeEntities(
                TextAnalyticsRequestOptions::default().with_statistics(),
            )),
        ];
        let job = AnalyzeActionsOptions::default()
            .resolve(&actions, ServiceVersion::V3_1)
            .unwrap();
        assert!(job.show_stats);

        let job = AnalyzeActionsOptions::default()
            .resolve(&actions[..1], ServiceVersion::V3_1)
            .unwrap();
        assert!(!job.show_stats);
    }
}
