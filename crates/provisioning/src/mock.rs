//! `MockProvisioner` — a test double for every collaborator trait.
//!
//! One instance implements all five traits and writes every call into a
//! single shared log, so tests can assert the relative order of calls that
//! land on different collaborators (e.g. a rollback chain).

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::{
    ApplicationRegistry, BranchWorkflow, Configuration, CoverageThreshold, JobBuilder,
    ProviderError, ReleaseTracking,
};

pub const FETCH_APPLICATION_DATA: &str = "fetch_application_data";
pub const ENABLE_RELEASE_PROCESS_FIELD: &str = "enable_release_process_field";
pub const DISABLE_RELEASE_PROCESS_FIELD: &str = "disable_release_process_field";
pub const UPDATE_APPLICATION_TECHNOLOGY: &str = "update_application_technology";
pub const SET_WORKFLOW: &str = "set_workflow";
pub const UNSET_WORKFLOW: &str = "unset_workflow";
pub const CREATE_JOB: &str = "create_job";
pub const DELETE_JOB: &str = "delete_job";
pub const SET_THRESHOLD: &str = "set_threshold";
pub const UPDATE_THRESHOLD: &str = "update_threshold";
pub const ENABLE_RELEASE_TRACKING: &str = "enable_release_tracking";
pub const DISABLE_RELEASE_TRACKING: &str = "disable_release_tracking";

/// Records every call and fails the operations it was told to fail.
#[derive(Default)]
pub struct MockProvisioner {
    /// Operation names in call order.
    pub calls: Arc<Mutex<Vec<&'static str>>>,
    /// Operation -> (first failing call, 1-based; error).
    failures: Mutex<HashMap<&'static str, (usize, ProviderError)>>,
}

impl MockProvisioner {
    /// A mock on which every operation succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `operation` fail with `err` from now on.
    pub fn fail_on(self, operation: &'static str, err: ProviderError) -> Self {
        self.fail_after(operation, 0, err)
    }

    /// Let the first `successes` calls of `operation` succeed, then fail
    /// every later one with `err`.
    pub fn fail_after(self, operation: &'static str, successes: usize, err: ProviderError) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(operation, (successes + 1, err));
        self
    }

    /// Snapshot of the call log.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of times `operation` has been called.
    pub fn call_count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c == operation)
            .count()
    }

    /// Forget the calls seen so far.
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, operation: &'static str) -> Result<(), ProviderError> {
        self.calls.lock().unwrap().push(operation);
        let seen = self.call_count(operation);
        match self.failures.lock().unwrap().get(operation) {
            Some((from, err)) if seen >= *from => Err(err.clone()),
            _ => Ok(()),
        }
    }
}

/// Convenience constructor for the error a mock should return.
pub fn rejected(service: &'static str, message: impl Into<String>) -> ProviderError {
    ProviderError::Rejected {
        service,
        status: 500,
        message: message.into(),
    }
}

#[async_trait]
impl ApplicationRegistry for MockProvisioner {
    async fn fetch_application_data(&self, cfg: &mut Configuration) -> Result<(), ProviderError> {
        self.record(FETCH_APPLICATION_DATA)?;
        cfg.application_name.get_or_insert_with(|| cfg.id.clone());
        cfg.technology.get_or_insert_with(|| "java".to_string());
        let url = format!("https://github.com/acme/{}", cfg.id);
        cfg.repository_url.get_or_insert(url);
        Ok(())
    }

    async fn enable_release_process_field(&self, _cfg: &Configuration) -> Result<(), ProviderError> {
        self.record(ENABLE_RELEASE_PROCESS_FIELD)
    }

    async fn disable_release_process_field(
        &self,
        _cfg: &Configuration,
    ) -> Result<(), ProviderError> {
        self.record(DISABLE_RELEASE_PROCESS_FIELD)
    }

    async fn update_application_technology(
        &self,
        _cfg: &Configuration,
    ) -> Result<(), ProviderError> {
        self.record(UPDATE_APPLICATION_TECHNOLOGY)
    }
}

#[async_trait]
impl BranchWorkflow for MockProvisioner {
    async fn set_workflow(&self, _cfg: &Configuration) -> Result<(), ProviderError> {
        self.record(SET_WORKFLOW)
    }

    async fn unset_workflow(&self, _cfg: &Configuration) -> Result<(), ProviderError> {
        self.record(UNSET_WORKFLOW)
    }
}

#[async_trait]
impl JobBuilder for MockProvisioner {
    async fn create_job(&self, cfg: &mut Configuration) -> Result<(), ProviderError> {
        self.record(CREATE_JOB)?;
        let name = cfg.application_name.clone().unwrap_or_else(|| cfg.id.clone());
        let url = format!("https://ci.example.com/job/{name}/");
        cfg.continuous_integration_provider = Some("jenkins".into());
        cfg.continuous_integration_url = Some(url.clone());
        cfg.build_server_provider = Some("jenkins".into());
        cfg.build_server_url = Some(url);
        Ok(())
    }

    async fn delete_job(&self, _cfg: &Configuration) -> Result<(), ProviderError> {
        self.record(DELETE_JOB)
    }
}

#[async_trait]
impl CoverageThreshold for MockProvisioner {
    async fn set_threshold(&self, _cfg: &Configuration) -> Result<(), ProviderError> {
        self.record(SET_THRESHOLD)
    }

    async fn update_threshold(&self, _cfg: &Configuration) -> Result<(), ProviderError> {
        self.record(UPDATE_THRESHOLD)
    }
}

#[async_trait]
impl ReleaseTracking for MockProvisioner {
    async fn enable(&self, _cfg: &Configuration) -> Result<(), ProviderError> {
        self.record(ENABLE_RELEASE_TRACKING)
    }

    async fn disable(&self, _cfg: &Configuration) -> Result<(), ProviderError> {
        self.record(DISABLE_RELEASE_TRACKING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WorkflowType;

    #[tokio::test]
    async fn fail_after_lets_early_calls_through() {
        let mock = MockProvisioner::new().fail_after(SET_WORKFLOW, 1, rejected("github", "locked"));
        let cfg = Configuration::new("repo-a", WorkflowType::Gitflow);

        assert!(mock.set_workflow(&cfg).await.is_ok());
        assert!(mock.set_workflow(&cfg).await.is_err());
        assert!(mock.set_workflow(&cfg).await.is_err());
        assert_eq!(mock.call_count(SET_WORKFLOW), 3);
    }
}
