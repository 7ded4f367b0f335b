//! The collaborator bundle injected into the orchestrator, and the
//! [`Action`] vocabulary the saga runner dispatches through it.

use std::sync::Arc;

use provisioning::{
    ApplicationRegistry, BranchWorkflow, Configuration, CoverageThreshold, JobBuilder,
    ProviderError, ReleaseTracking,
};

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// One call against one collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    FetchApplicationData,
    EnableReleaseProcessField,
    DisableReleaseProcessField,
    UpdateApplicationTechnology,
    SetWorkflow,
    UnsetWorkflow,
    CreateJob,
    DeleteJob,
    SetCoverageThreshold,
    UpdateCoverageThreshold,
    EnableReleaseTracking,
    DisableReleaseTracking,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FetchApplicationData => "fetch_application_data",
            Self::EnableReleaseProcessField => "enable_release_process_field",
            Self::DisableReleaseProcessField => "disable_release_process_field",
            Self::UpdateApplicationTechnology => "update_application_technology",
            Self::SetWorkflow => "set_workflow",
            Self::UnsetWorkflow => "unset_workflow",
            Self::CreateJob => "create_job",
            Self::DeleteJob => "delete_job",
            Self::SetCoverageThreshold => "set_threshold",
            Self::UpdateCoverageThreshold => "update_threshold",
            Self::EnableReleaseTracking => "enable_release_tracking",
            Self::DisableReleaseTracking => "disable_release_tracking",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Handles to the five provisioning collaborators.
#[derive(Clone)]
pub struct Collaborators {
    pub registry: Arc<dyn ApplicationRegistry>,
    pub workflow: Arc<dyn BranchWorkflow>,
    pub builder: Arc<dyn JobBuilder>,
    pub coverage: Arc<dyn CoverageThreshold>,
    pub tracking: Arc<dyn ReleaseTracking>,
}

impl Collaborators {
    /// Use one object for every collaborator (handy for test doubles).
    pub fn from_single<T>(provisioner: Arc<T>) -> Self
    where
        T: ApplicationRegistry + BranchWorkflow + JobBuilder + CoverageThreshold + ReleaseTracking + 'static,
    {
        Self {
            registry: provisioner.clone(),
            workflow: provisioner.clone(),
            builder: provisioner.clone(),
            coverage: provisioner.clone(),
            tracking: provisioner,
        }
    }

    /// Perform `action` against `cfg`.
    pub async fn invoke(&self, action: Action, cfg: &mut Configuration) -> Result<(), ProviderError> {
        match action {
            Action::FetchApplicationData => self.registry.fetch_application_data(cfg).await,
            Action::EnableReleaseProcessField => self.registry.enable_release_process_field(cfg).await,
            Action::DisableReleaseProcessField => {
                self.registry.disable_release_process_field(cfg).await
            }
            Action::UpdateApplicationTechnology => {
                self.registry.update_application_technology(cfg).await
            }
            Action::SetWorkflow => self.workflow.set_workflow(cfg).await,
            Action::UnsetWorkflow => self.workflow.unset_workflow(cfg).await,
            Action::CreateJob => self.builder.create_job(cfg).await,
            Action::DeleteJob => self.builder.delete_job(cfg).await,
            Action::SetCoverageThreshold => self.coverage.set_threshold(cfg).await,
            Action::UpdateCoverageThreshold => self.coverage.update_threshold(cfg).await,
            Action::EnableReleaseTracking => self.tracking.enable(cfg).await,
            Action::DisableReleaseTracking => self.tracking.disable(cfg).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provisioning::mock::{self, MockProvisioner};
    use provisioning::WorkflowType;

    /// Action names double as the mock's call-log entries.
    #[tokio::test]
    async fn every_action_reaches_the_matching_collaborator_call() {
        let expected = [
            (Action::FetchApplicationData, mock::FETCH_APPLICATION_DATA),
            (Action::EnableReleaseProcessField, mock::ENABLE_RELEASE_PROCESS_FIELD),
            (Action::DisableReleaseProcessField, mock::DISABLE_RELEASE_PROCESS_FIELD),
            (Action::UpdateApplicationTechnology, mock::UPDATE_APPLICATION_TECHNOLOGY),
            (Action::SetWorkflow, mock::SET_WORKFLOW),
            (Action::UnsetWorkflow, mock::UNSET_WORKFLOW),
            (Action::CreateJob, mock::CREATE_JOB),
            (Action::DeleteJob, mock::DELETE_JOB),
            (Action::SetCoverageThreshold, mock::SET_THRESHOLD),
            (Action::UpdateCoverageThreshold, mock::UPDATE_THRESHOLD),
            (Action::EnableReleaseTracking, mock::ENABLE_RELEASE_TRACKING),
            (Action::DisableReleaseTracking, mock::DISABLE_RELEASE_TRACKING),
        ];

        let provisioner = Arc::new(MockProvisioner::new());
        let collaborators = Collaborators::from_single(provisioner.clone());
        let mut cfg = Configuration::new("repo-a", WorkflowType::Gitflow);

        for (action, name) in expected {
            assert_eq!(action.as_str(), name);
            collaborators.invoke(action, &mut cfg).await.expect("mock succeeds");
            assert_eq!(provisioner.calls().last().copied(), Some(name));
        }
    }
}
