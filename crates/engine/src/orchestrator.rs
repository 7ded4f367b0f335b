//! Release-process orchestrator.
//!
//! `ReleaseProcessOrchestrator` owns the create / get / update / delete
//! entry points:
//! 1. Validates the payload before touching anything external.
//! 2. Builds the saga for the operation (see [`create_saga`],
//!    [`update_saga`], [`delete_saga`]) and runs it against the
//!    collaborators.
//! 3. Writes the outcome to the record store once provisioning succeeded.

use std::sync::Arc;

use db::DbError;
use provisioning::Configuration;
use tracing::{error, field, info, instrument, warn, Span};

use crate::collaborators::{Action, Collaborators};
use crate::models::{ChangeSet, CreatePayload, UpdatePayload};
use crate::saga::{Compensation, Saga, SagaOutcome, SagaStep};
use crate::store::RecordStore;
use crate::EngineError;

// ---------------------------------------------------------------------------
// Saga definitions
// ---------------------------------------------------------------------------

/// Provision every system a new configuration needs.
pub fn create_saga() -> Saga {
    Saga::new("create")
        .then(SagaStep::critical(Action::FetchApplicationData))
        .then(SagaStep::critical(Action::SetWorkflow).compensated_by(Action::UnsetWorkflow))
        .then(SagaStep::critical(Action::CreateJob).compensated_by(Action::DeleteJob))
        .then(SagaStep::advisory(Action::SetCoverageThreshold))
        .then(
            SagaStep::critical(Action::EnableReleaseTracking)
                .compensated_by(Action::DisableReleaseTracking),
        )
        .then(SagaStep::critical(Action::EnableReleaseProcessField))
}

/// Re-provision only what `changes` touches.
///
/// Rollback only happens when the workflow was re-applied:
/// - CreateJob failing unsets the workflow of the previous configuration.
/// - UpdateApplicationTechnology failing re-applies the previous workflow
///   and job, reporting the registry error whatever the restore does.
pub fn update_saga(changes: ChangeSet) -> Saga {
    let workflow_changed = changes.status_checks;
    let when_workflow_changed = |compensations: Vec<Compensation>| {
        if workflow_changed {
            compensations
        } else {
            Vec::new()
        }
    };

    Saga::new("update")
        .then_if(changes.status_checks, SagaStep::critical(Action::SetWorkflow))
        .then_if(
            changes.technology,
            SagaStep::critical(Action::CreateJob).on_failure(when_workflow_changed(vec![
                Compensation::previous(Action::UnsetWorkflow),
            ])),
        )
        .then_if(
            changes.technology,
            SagaStep::critical(Action::UpdateApplicationTechnology).on_failure_best_effort(
                when_workflow_changed(vec![
                    Compensation::previous(Action::SetWorkflow),
                    Compensation::previous(Action::CreateJob),
                ]),
            ),
        )
        .then_if(
            changes.coverage_threshold,
            SagaStep::advisory(Action::UpdateCoverageThreshold),
        )
}

/// Tear everything down. No compensation: the first failure stops the run
/// and a retry picks up where it left off.
pub fn delete_saga() -> Saga {
    Saga::new("delete")
        .then(SagaStep::critical(Action::UnsetWorkflow))
        .then(SagaStep::critical(Action::DeleteJob))
        .then(SagaStep::critical(Action::DisableReleaseTracking))
        .then(SagaStep::critical(Action::DisableReleaseProcessField))
}

// ---------------------------------------------------------------------------
// ReleaseProcessOrchestrator
// ---------------------------------------------------------------------------

pub struct ReleaseProcessOrchestrator {
    collaborators: Collaborators,
    store: Arc<dyn RecordStore>,
}

impl ReleaseProcessOrchestrator {
    pub fn new(collaborators: Collaborators, store: Arc<dyn RecordStore>) -> Self {
        Self {
            collaborators,
            store,
        }
    }

    /// Provision and persist a new configuration.
    ///
    /// If a configuration with the same id is already stored it is returned
    /// as-is and nothing is provisioned.
    ///
    /// # Errors
    /// `Validation` for a bad payload, `Collaborator`/`Compensation` when
    /// provisioning fails, `Conflict`/`Persistence` when the insert fails.
    #[instrument(skip(self, payload), fields(id = field::Empty))]
    pub async fn create(&self, payload: CreatePayload) -> Result<Configuration, EngineError> {
        let mut cfg = payload.into_configuration()?;
        Span::current().record("id", cfg.id.as_str());

        if let Some(existing) = self.store.get_by_id(&cfg.id).await? {
            info!("configuration already exists, nothing to provision");
            return Ok(existing);
        }

        let outcome = create_saga().run(&self.collaborators, &mut cfg, None).await?;
        log_advisory_failures(&outcome);

        match self.store.insert(&cfg).await {
            Ok(stored) => {
                info!("configuration created");
                Ok(stored)
            }
            Err(err) => {
                log_unpersisted(&outcome, &err);
                Err(store_error(&cfg.id, err))
            }
        }
    }

    /// Look up a stored configuration.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Configuration, EngineError> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or_else(|| EngineError::NotFound(id.to_string()))
    }

    /// Apply the fields present in `payload` to an existing configuration.
    ///
    /// The stored status checks are replaced together with the record, after
    /// every provisioning step succeeded.
    #[instrument(skip(self, payload), fields(id = field::Empty))]
    pub async fn update(&self, payload: UpdatePayload) -> Result<Configuration, EngineError> {
        let id = payload.validate()?.to_string();
        Span::current().record("id", id.as_str());

        let previous = self.get(&id).await?;
        let changes = payload.changes();
        let mut cfg = previous.clone();
        payload.apply(&mut cfg);

        let outcome = update_saga(changes)
            .run(&self.collaborators, &mut cfg, Some(&previous))
            .await?;
        log_advisory_failures(&outcome);

        match self.store.update(&cfg).await {
            Ok(stored) => {
                info!(?changes, "configuration updated");
                Ok(stored)
            }
            Err(err) => {
                log_unpersisted(&outcome, &err);
                Err(store_error(&id, err))
            }
        }
    }

    /// Deprovision and forget a configuration.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), EngineError> {
        let mut cfg = self.get(id).await?;

        delete_saga().run(&self.collaborators, &mut cfg, None).await?;

        self.store
            .delete(&cfg)
            .await
            .map_err(|err| store_error(id, err))?;
        info!("configuration deleted");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn store_error(id: &str, err: DbError) -> EngineError {
    match err {
        DbError::Conflict => EngineError::Conflict(id.to_string()),
        DbError::NotFound => EngineError::NotFound(id.to_string()),
        other => EngineError::Persistence(other),
    }
}

fn log_advisory_failures(outcome: &SagaOutcome) {
    for (action, err) in &outcome.advisory_failures {
        warn!(step = %action, error = %err, "advisory step skipped");
    }
}

/// External systems were provisioned but the record was not written.
fn log_unpersisted(outcome: &SagaOutcome, err: &DbError) {
    let provisioned: Vec<&'static str> = outcome.completed.iter().map(Action::as_str).collect();
    error!(
        ?provisioned,
        error = %err,
        "record store failed after provisioning; external state needs manual cleanup"
    );
}
