//! The `Configuration` record threaded through every provisioning call.
//!
//! Defined here (in the provisioning crate) so both the engine and the
//! individual collaborator clients can import it without a circular
//! dependency.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// WorkflowType
// ---------------------------------------------------------------------------

/// Branching model applied to the repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowType {
    #[default]
    Gitflow,
}

impl std::fmt::Display for WorkflowType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gitflow => write!(f, "gitflow"),
        }
    }
}

impl std::str::FromStr for WorkflowType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gitflow" => Ok(Self::Gitflow),
            other => Err(format!("unknown workflow type: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Release-process configuration for one repository.
///
/// `id` is the repository key and never changes once the record exists.
/// The CI/build fields stay `None` until a `JobBuilder::create_job` call
/// succeeds for this configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub id: String,
    pub application_name: Option<String>,
    pub technology: Option<String>,
    pub repository_url: Option<String>,
    pub workflow_type: WorkflowType,
    /// Status checks that must pass before merging into a protected branch.
    pub required_status_checks: Vec<String>,
    pub continuous_integration_provider: Option<String>,
    pub continuous_integration_url: Option<String>,
    pub build_server_provider: Option<String>,
    pub build_server_url: Option<String>,
    /// Minimum pull-request coverage, as a percentage.
    pub code_coverage_pull_request_threshold: Option<f64>,
    /// Set by the record store.
    pub created_at: Option<DateTime<Utc>>,
    /// Set by the record store.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Configuration {
    /// An unprovisioned configuration for the repository `id`.
    pub fn new(id: impl Into<String>, workflow_type: WorkflowType) -> Self {
        Self {
            id: id.into(),
            application_name: None,
            technology: None,
            repository_url: None,
            workflow_type,
            required_status_checks: Vec::new(),
            continuous_integration_provider: None,
            continuous_integration_url: None,
            build_server_provider: None,
            build_server_url: None,
            code_coverage_pull_request_threshold: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// True once the CI job has been provisioned and its endpoints recorded.
    pub fn has_ci_job(&self) -> bool {
        self.continuous_integration_url.is_some() && self.build_server_url.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_type_round_trips_through_its_name() {
        assert_eq!("gitflow".parse::<WorkflowType>(), Ok(WorkflowType::Gitflow));
        assert_eq!(WorkflowType::Gitflow.to_string(), "gitflow");
        assert!("trunk".parse::<WorkflowType>().is_err());
    }

    #[test]
    fn new_configuration_has_no_ci_job() {
        let mut cfg = Configuration::new("repo-a", WorkflowType::Gitflow);
        assert!(!cfg.has_ci_job());

        cfg.continuous_integration_url = Some("https://ci/job/a/".into());
        cfg.build_server_url = Some("https://ci/job/a/".into());
        assert!(cfg.has_ci_job());
    }
}
