//! Contracts for the five provisioning collaborators.
//!
//! Each collaborator pairs a provisioning call with the call that removes
//! what it provisioned. Removal calls must tolerate state that is already
//! gone so a failed teardown can simply be re-run.

use async_trait::async_trait;

use crate::{Configuration, ProviderError};

/// Application registry: owns application metadata and the
/// "release process enabled" flag.
#[async_trait]
pub trait ApplicationRegistry: Send + Sync {
    /// Fill in application name, technology and repository URL for `cfg.id`.
    async fn fetch_application_data(&self, cfg: &mut Configuration) -> Result<(), ProviderError>;

    async fn enable_release_process_field(&self, cfg: &Configuration) -> Result<(), ProviderError>;

    async fn disable_release_process_field(&self, cfg: &Configuration)
        -> Result<(), ProviderError>;

    async fn update_application_technology(&self, cfg: &Configuration)
        -> Result<(), ProviderError>;
}

/// Branch protection rules for the configured workflow type.
#[async_trait]
pub trait BranchWorkflow: Send + Sync {
    async fn set_workflow(&self, cfg: &Configuration) -> Result<(), ProviderError>;

    async fn unset_workflow(&self, cfg: &Configuration) -> Result<(), ProviderError>;
}

/// CI / build-server job provisioning.
#[async_trait]
pub trait JobBuilder: Send + Sync {
    /// Create (or re-create) the job and record its provider and URLs on `cfg`.
    async fn create_job(&self, cfg: &mut Configuration) -> Result<(), ProviderError>;

    async fn delete_job(&self, cfg: &Configuration) -> Result<(), ProviderError>;
}

/// Minimum pull-request coverage gate.
#[async_trait]
pub trait CoverageThreshold: Send + Sync {
    async fn set_threshold(&self, cfg: &Configuration) -> Result<(), ProviderError>;

    async fn update_threshold(&self, cfg: &Configuration) -> Result<(), ProviderError>;
}

/// Release tracking service that lists release-process applications.
#[async_trait]
pub trait ReleaseTracking: Send + Sync {
    async fn enable(&self, cfg: &Configuration) -> Result<(), ProviderError>;

    async fn disable(&self, cfg: &Configuration) -> Result<(), ProviderError>;
}
