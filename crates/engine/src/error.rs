//! Engine-level error types.

use provisioning::ProviderError;
use thiserror::Error;

use crate::collaborators::Action;

/// Errors produced by the release-process orchestrator.
#[derive(Debug, Error)]
pub enum EngineError {
    // ------ Request errors ------

    /// No configuration exists for this repository.
    #[error("configuration '{0}' not found")]
    NotFound(String),

    /// The record store already holds a configuration with this id.
    #[error("configuration '{0}' already exists")]
    Conflict(String),

    /// The payload is malformed; nothing was provisioned.
    #[error("invalid payload: {0}")]
    Validation(String),

    // ------ Saga errors ------

    /// A provisioning step failed and every completed step was rolled back.
    #[error("step '{step}' failed: {source}")]
    Collaborator {
        step: Action,
        #[source]
        source: ProviderError,
    },

    /// A provisioning step failed and rolling back an earlier step failed
    /// too. External state may now hold orphaned resources.
    #[error("step '{failed_step}' failed ({cause}) and compensation '{compensation}' failed: {source}")]
    Compensation {
        failed_step: Action,
        cause: ProviderError,
        compensation: Action,
        #[source]
        source: ProviderError,
    },

    /// The record store failed.
    #[error("database error: {0}")]
    Persistence(#[from] db::DbError),
}

impl EngineError {
    /// The collaborator step this error originated from, if any.
    pub fn failed_step(&self) -> Option<Action> {
        match self {
            Self::Collaborator { step, .. } => Some(*step),
            Self::Compensation { failed_step, .. } => Some(*failed_step),
            _ => None,
        }
    }
}
