//! Request payloads accepted by the orchestrator.
//!
//! The JSON shape groups fields by the system they end up in
//! (`repository`, `workflow`, `application`, `code_coverage`). Both payloads
//! are validated before any collaborator is called.

use std::collections::HashSet;

use provisioning::{Configuration, WorkflowType};
use serde::{Deserialize, Serialize};

use crate::EngineError;

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositorySection {
    /// Repository key; becomes `Configuration::id`.
    pub name: Option<String>,
    pub required_status_checks: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSection {
    #[serde(rename = "type")]
    pub workflow_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeCoverageSection {
    pub pull_request_threshold: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationSection {
    pub technology: Option<String>,
}

// ---------------------------------------------------------------------------
// CreatePayload
// ---------------------------------------------------------------------------

/// Body of a create request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatePayload {
    #[serde(default)]
    pub repository: RepositorySection,
    #[serde(default)]
    pub workflow: WorkflowSection,
    #[serde(default)]
    pub code_coverage: CodeCoverageSection,
}

impl CreatePayload {
    /// Convenience constructor for testing.
    pub fn new(name: impl Into<String>, checks: &[&str]) -> Self {
        Self {
            repository: RepositorySection {
                name: Some(name.into()),
                required_status_checks: Some(checks.iter().map(|c| c.to_string()).collect()),
            },
            ..Self::default()
        }
    }

    /// Validate and turn the payload into an unprovisioned configuration.
    pub fn into_configuration(self) -> Result<Configuration, EngineError> {
        let id = validate_name(self.repository.name.as_deref())?.to_string();

        let workflow_type = match self.workflow.workflow_type.as_deref() {
            None => WorkflowType::default(),
            Some(raw) => raw.parse::<WorkflowType>().map_err(EngineError::Validation)?,
        };

        let checks = self.repository.required_status_checks.unwrap_or_default();
        validate_checks(&checks)?;
        validate_threshold(self.code_coverage.pull_request_threshold)?;

        let mut cfg = Configuration::new(id, workflow_type);
        cfg.required_status_checks = checks;
        cfg.code_coverage_pull_request_threshold = self.code_coverage.pull_request_threshold;
        Ok(cfg)
    }
}

// ---------------------------------------------------------------------------
// UpdatePayload
// ---------------------------------------------------------------------------

/// Body of an update request. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdatePayload {
    #[serde(default)]
    pub application: ApplicationSection,
    #[serde(default)]
    pub repository: RepositorySection,
    #[serde(default)]
    pub code_coverage: CodeCoverageSection,
}

/// Which parts of a configuration an update touches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub status_checks: bool,
    pub technology: bool,
    pub coverage_threshold: bool,
}

impl UpdatePayload {
    /// An update for `id` that changes nothing yet.
    pub fn for_repository(id: impl Into<String>) -> Self {
        Self {
            repository: RepositorySection {
                name: Some(id.into()),
                required_status_checks: None,
            },
            ..Self::default()
        }
    }

    pub fn with_technology(mut self, technology: impl Into<String>) -> Self {
        self.application.technology = Some(technology.into());
        self
    }

    pub fn with_status_checks(mut self, checks: &[&str]) -> Self {
        self.repository.required_status_checks =
            Some(checks.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.code_coverage.pull_request_threshold = Some(threshold);
        self
    }

    /// Check the payload and return the id of the configuration it targets.
    pub fn validate(&self) -> Result<&str, EngineError> {
        let id = validate_name(self.repository.name.as_deref())?;

        if let Some(technology) = &self.application.technology {
            if technology.trim().is_empty() {
                return Err(EngineError::Validation("technology must not be blank".into()));
            }
        }
        if let Some(checks) = &self.repository.required_status_checks {
            validate_checks(checks)?;
        }
        validate_threshold(self.code_coverage.pull_request_threshold)?;

        Ok(id)
    }

    pub fn changes(&self) -> ChangeSet {
        ChangeSet {
            status_checks: self.repository.required_status_checks.is_some(),
            technology: self.application.technology.is_some(),
            coverage_threshold: self.code_coverage.pull_request_threshold.is_some(),
        }
    }

    /// Copy the present fields onto `cfg`.
    pub fn apply(&self, cfg: &mut Configuration) {
        if let Some(checks) = &self.repository.required_status_checks {
            cfg.required_status_checks = checks.clone();
        }
        if let Some(technology) = &self.application.technology {
            cfg.technology = Some(technology.clone());
        }
        if let Some(threshold) = self.code_coverage.pull_request_threshold {
            cfg.code_coverage_pull_request_threshold = Some(threshold);
        }
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn validate_name(name: Option<&str>) -> Result<&str, EngineError> {
    match name.map(str::trim) {
        Some(n) if !n.is_empty() => Ok(n),
        _ => Err(EngineError::Validation("repository name is required".into())),
    }
}

fn validate_checks(checks: &[String]) -> Result<(), EngineError> {
    let mut seen = HashSet::new();
    for check in checks {
        if check.trim().is_empty() {
            return Err(EngineError::Validation("status check names must not be blank".into()));
        }
        if !seen.insert(check.as_str()) {
            return Err(EngineError::Validation(format!("duplicate status check '{check}'")));
        }
    }
    Ok(())
}

fn validate_threshold(threshold: Option<f64>) -> Result<(), EngineError> {
    match threshold {
        Some(t) if !(0.0..=100.0).contains(&t) => Err(EngineError::Validation(format!(
            "pull request coverage threshold must be between 0 and 100, got {t}"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_payload_parses_nested_json() {
        let payload: CreatePayload = serde_json::from_value(json!({
            "repository": { "name": "repo-a", "required_status_checks": ["ci", "coverage"] },
            "workflow": { "type": "gitflow" },
            "code_coverage": { "pull_request_threshold": 80.0 }
        }))
        .expect("valid payload");

        let cfg = payload.into_configuration().expect("valid configuration");
        assert_eq!(cfg.id, "repo-a");
        assert_eq!(cfg.workflow_type, WorkflowType::Gitflow);
        assert_eq!(cfg.required_status_checks, vec!["ci", "coverage"]);
        assert_eq!(cfg.code_coverage_pull_request_threshold, Some(80.0));
        assert!(!cfg.has_ci_job());
    }

    #[test]
    fn workflow_type_defaults_to_gitflow() {
        let cfg = CreatePayload::new("repo-a", &[])
            .into_configuration()
            .expect("valid");
        assert_eq!(cfg.workflow_type, WorkflowType::Gitflow);
    }

    #[test]
    fn missing_name_is_rejected() {
        let payload = CreatePayload::default();
        assert!(matches!(payload.into_configuration(), Err(EngineError::Validation(_))));

        let blank = CreatePayload::new("   ", &[]);
        assert!(matches!(blank.into_configuration(), Err(EngineError::Validation(_))));
    }

    #[test]
    fn unknown_workflow_type_is_rejected() {
        let mut payload = CreatePayload::new("repo-a", &[]);
        payload.workflow.workflow_type = Some("trunk".into());
        assert!(matches!(payload.into_configuration(), Err(EngineError::Validation(_))));
    }

    #[test]
    fn duplicate_checks_and_bad_threshold_are_rejected() {
        let dupes = CreatePayload::new("repo-a", &["ci", "ci"]);
        assert!(matches!(dupes.into_configuration(), Err(EngineError::Validation(_))));

        let mut out_of_range = CreatePayload::new("repo-a", &[]);
        out_of_range.code_coverage.pull_request_threshold = Some(120.0);
        assert!(matches!(out_of_range.into_configuration(), Err(EngineError::Validation(_))));

        let mut nan = CreatePayload::new("repo-a", &[]);
        nan.code_coverage.pull_request_threshold = Some(f64::NAN);
        assert!(matches!(nan.into_configuration(), Err(EngineError::Validation(_))));
    }

    #[test]
    fn update_changes_follow_field_presence() {
        let payload = UpdatePayload::for_repository("repo-a").with_threshold(75.0);
        assert_eq!(
            payload.changes(),
            ChangeSet {
                status_checks: false,
                technology: false,
                coverage_threshold: true,
            }
        );

        let mut cfg = Configuration::new("repo-a", WorkflowType::Gitflow);
        cfg.technology = Some("java".into());
        cfg.required_status_checks = vec!["ci".into()];
        payload.apply(&mut cfg);

        assert_eq!(cfg.code_coverage_pull_request_threshold, Some(75.0));
        assert_eq!(cfg.technology.as_deref(), Some("java"));
        assert_eq!(cfg.required_status_checks, vec!["ci"]);
    }

    #[test]
    fn update_replaces_status_checks_wholesale() {
        let payload = UpdatePayload::for_repository("repo-a").with_status_checks(&["lint"]);
        let mut cfg = Configuration::new("repo-a", WorkflowType::Gitflow);
        cfg.required_status_checks = vec!["ci".into(), "coverage".into()];

        payload.apply(&mut cfg);
        assert_eq!(cfg.required_status_checks, vec!["lint"]);
    }

    #[test]
    fn update_without_id_is_rejected() {
        let payload = UpdatePayload::default().with_technology("go");
        assert!(matches!(payload.validate(), Err(EngineError::Validation(_))));
        assert_eq!(
            UpdatePayload::for_repository("repo-a").validate().expect("valid"),
            "repo-a"
        );
    }
}
