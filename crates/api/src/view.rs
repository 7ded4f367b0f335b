//! Response body for a configuration, grouped by the system each field
//! belongs to.

use chrono::{DateTime, Utc};
use provisioning::{Configuration, WorkflowType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationView {
    pub application: ApplicationView,
    pub repository: RepositoryView,
    pub continuous_integration: ProviderView,
    pub build_server: ProviderView,
    pub code_coverage: CodeCoverageView,
    pub workflow: WorkflowView,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationView {
    pub name: Option<String>,
    pub technology: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryView {
    pub name: String,
    pub url: Option<String>,
    pub required_status_checks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderView {
    pub provider: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeCoverageView {
    pub pull_request_threshold: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowView {
    #[serde(rename = "type")]
    pub workflow_type: WorkflowType,
}

impl From<Configuration> for ConfigurationView {
    fn from(cfg: Configuration) -> Self {
        Self {
            application: ApplicationView {
                name: cfg.application_name,
                technology: cfg.technology,
            },
            repository: RepositoryView {
                name: cfg.id,
                url: cfg.repository_url,
                required_status_checks: cfg.required_status_checks,
            },
            continuous_integration: ProviderView {
                provider: cfg.continuous_integration_provider,
                url: cfg.continuous_integration_url,
            },
            build_server: ProviderView {
                provider: cfg.build_server_provider,
                url: cfg.build_server_url,
            },
            code_coverage: CodeCoverageView {
                pull_request_threshold: cfg.code_coverage_pull_request_threshold,
            },
            workflow: WorkflowView {
                workflow_type: cfg.workflow_type,
            },
            created_at: cfg.created_at,
            updated_at: cfg.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn view_nests_fields_by_system() {
        let mut cfg = Configuration::new("repo-a", WorkflowType::Gitflow);
        cfg.technology = Some("java".into());
        cfg.required_status_checks = vec!["ci".into()];
        cfg.continuous_integration_provider = Some("jenkins".into());
        cfg.code_coverage_pull_request_threshold = Some(80.0);

        let value = serde_json::to_value(ConfigurationView::from(cfg)).expect("serializable");

        assert_eq!(value["repository"]["name"], json!("repo-a"));
        assert_eq!(value["repository"]["required_status_checks"], json!(["ci"]));
        assert_eq!(value["application"]["technology"], json!("java"));
        assert_eq!(value["continuous_integration"]["provider"], json!("jenkins"));
        assert_eq!(value["build_server"]["provider"], json!(null));
        assert_eq!(value["code_coverage"]["pull_request_threshold"], json!(80.0));
        assert_eq!(value["workflow"]["type"], json!("gitflow"));
    }
}
