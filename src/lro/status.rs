use serde::{Deserialize, Serialize};

/// Remote job status. Never computed locally: only a status poll changes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    NotStarted,
    Running,
    Cancelling,
    Succeeded,
    /// Finished with some tasks failed; results are still fetchable.
    PartiallySucceeded,
    Cancelled,
    Failed,
    /// A status this client predates. Treated as still in progress.
    Other(String),
}

impl JobStatus {
    /// Lenient parse: case, `_`, `-` and spaces are ignored, and unknown
    /// values are kept rather than rejected.
    pub fn parse(raw: &str) -> Self {
        let normalized: String = raw
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "notstarted" => Self::NotStarted,
            "running" | "inprogress" => Self::Running,
            "cancelling" | "canceling" => Self::Cancelling,
            "succeeded" | "successfullycompleted" => Self::Succeeded,
            "partiallysucceeded" | "partiallycompleted" => Self::PartiallySucceeded,
            "cancelled" | "canceled" | "usercancelled" => Self::Cancelled,
            "failed" | "rejected" => Self::Failed,
            _ => Self::Other(raw.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::PartiallySucceeded | Self::Cancelled | Self::Failed
        )
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded | Self::PartiallySucceeded)
    }

    pub fn is_in_progress(&self) -> bool {
        !self.is_terminal()
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::NotStarted => "notStarted",
            Self::Running => "running",
            Self::Cancelling => "cancelling",
            Self::Succeeded => "succeeded",
            Self::PartiallySucceeded => "partiallySucceeded",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
            Self::Other(raw) => raw,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
