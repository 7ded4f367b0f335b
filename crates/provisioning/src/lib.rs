//! `provisioning` crate — the collaborator traits and their implementations.
//!
//! The saga engine only ever talks to the five traits in [`traits`]; the
//! reqwest clients in [`http`] are the production implementations and
//! [`mock::MockProvisioner`] is the test double.

pub mod configuration;
pub mod error;
pub mod http;
pub mod mock;
pub mod traits;
pub mod workflow;

pub use configuration::{Configuration, WorkflowType};
pub use error::ProviderError;
pub use traits::{ApplicationRegistry, BranchWorkflow, CoverageThreshold, JobBuilder, ReleaseTracking};
