//! `engine` crate — release-process orchestration.
//!
//! Validates request payloads, runs the create / update / delete sagas
//! against the provisioning collaborators, and persists the result through
//! a [`RecordStore`].

pub mod collaborators;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod saga;
pub mod store;

pub use collaborators::{Action, Collaborators};
pub use error::EngineError;
pub use models::{ChangeSet, CreatePayload, UpdatePayload};
pub use orchestrator::ReleaseProcessOrchestrator;
pub use store::{PgRecordStore, RecordStore};

#[cfg(test)]
mod test_support;
