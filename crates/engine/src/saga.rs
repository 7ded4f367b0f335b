//! Generic saga runner.
//!
//! A [`Saga`] is an ordered list of [`SagaStep`] descriptors. Each step names
//! a forward [`Action`], whether its failure aborts the saga
//! ([`StepPolicy::Critical`]) or is only logged ([`StepPolicy::Advisory`]),
//! and the optional [`Compensation`] that undoes it.
//!
//! ```text
//! forward:       [step 1] → [step 2] → [step 3] → [step 4 FAILS]
//! compensation:                        [comp 3] → [comp 2] → [comp 1]
//! ```
//!
//! A step may instead carry its own [`Rollback`] plan, which replaces the
//! reverse unwind when that step fails. Updates use this: what has to be
//! restored depends on which earlier steps the request switched on.
//!
//! Every compensation is attempted even when an earlier one fails. The
//! caller gets [`EngineError::Collaborator`] if the rollback was clean and
//! [`EngineError::Compensation`] (naming the first failed compensation)
//! otherwise, unless the plan is best-effort: then the triggering failure
//! is always returned and compensation failures are only logged.

use provisioning::{Configuration, ProviderError};
use tracing::{error, info, instrument, warn};

use crate::collaborators::{Action, Collaborators};
use crate::EngineError;

// ---------------------------------------------------------------------------
// Step descriptors
// ---------------------------------------------------------------------------

/// What a step failure does to the rest of the saga.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPolicy {
    /// Failure aborts the saga and rolls back completed steps.
    Critical,
    /// Failure is logged and the saga carries on.
    Advisory,
}

/// Which configuration a compensation runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The configuration the saga is provisioning.
    Current,
    /// The configuration as it was before the saga started (updates only).
    Previous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compensation {
    pub action: Action,
    pub target: Target,
}

impl Compensation {
    pub fn current(action: Action) -> Self {
        Self {
            action,
            target: Target::Current,
        }
    }

    pub fn previous(action: Action) -> Self {
        Self {
            action,
            target: Target::Previous,
        }
    }
}

/// Compensations to run, in order, when a particular step fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rollback {
    pub compensations: Vec<Compensation>,
    /// Report compensation failures as [`EngineError::Compensation`].
    pub report_failures: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SagaStep {
    pub action: Action,
    pub policy: StepPolicy,
    /// Undoes this step when a later step fails.
    pub compensation: Option<Compensation>,
    /// Replaces the reverse unwind when this step fails.
    pub rollback: Option<Rollback>,
}

impl SagaStep {
    pub fn critical(action: Action) -> Self {
        Self {
            action,
            policy: StepPolicy::Critical,
            compensation: None,
            rollback: None,
        }
    }

    pub fn advisory(action: Action) -> Self {
        Self {
            action,
            policy: StepPolicy::Advisory,
            compensation: None,
            rollback: None,
        }
    }

    /// Undo this step by running `action` on the current configuration.
    pub fn compensated_by(mut self, action: Action) -> Self {
        self.compensation = Some(Compensation::current(action));
        self
    }

    /// On failure of this step run exactly `compensations`.
    pub fn on_failure(mut self, compensations: Vec<Compensation>) -> Self {
        self.rollback = Some(Rollback {
            compensations,
            report_failures: true,
        });
        self
    }

    /// Like [`on_failure`](Self::on_failure), but the step's own error is
    /// returned even if a compensation fails.
    pub fn on_failure_best_effort(mut self, compensations: Vec<Compensation>) -> Self {
        self.rollback = Some(Rollback {
            compensations,
            report_failures: false,
        });
        self
    }
}

// ---------------------------------------------------------------------------
// Saga
// ---------------------------------------------------------------------------

/// What a successful run did.
#[derive(Debug, Default)]
pub struct SagaOutcome {
    /// Forward actions that succeeded, in order.
    pub completed: Vec<Action>,
    /// Advisory steps that failed and were skipped.
    pub advisory_failures: Vec<(Action, ProviderError)>,
}

#[derive(Debug, Clone)]
pub struct Saga {
    name: &'static str,
    steps: Vec<SagaStep>,
}

impl Saga {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            steps: Vec::new(),
        }
    }

    /// Append a step.
    pub fn then(mut self, step: SagaStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Append a step when `condition` holds.
    pub fn then_if(self, condition: bool, step: SagaStep) -> Self {
        if condition {
            self.then(step)
        } else {
            self
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn steps(&self) -> &[SagaStep] {
        &self.steps
    }

    /// Compensations that would run if the step at `failed_index` failed,
    /// in execution order.
    pub fn compensations_for_failure_at(&self, failed_index: usize) -> Vec<Compensation> {
        if let Some(rollback) = self.steps.get(failed_index).and_then(|s| s.rollback.as_ref()) {
            return rollback.compensations.clone();
        }
        unwind(&self.steps[..failed_index.min(self.steps.len())])
    }

    /// Execute the steps in order against `cfg`.
    ///
    /// `previous` is required by compensations targeting [`Target::Previous`].
    #[instrument(skip_all, fields(saga = self.name, id = %cfg.id))]
    pub async fn run(
        &self,
        collaborators: &Collaborators,
        cfg: &mut Configuration,
        previous: Option<&Configuration>,
    ) -> Result<SagaOutcome, EngineError> {
        let mut outcome = SagaOutcome::default();
        let mut completed: Vec<&SagaStep> = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            match collaborators.invoke(step.action, cfg).await {
                Ok(()) => {
                    info!(step = %step.action, "step succeeded");
                    completed.push(step);
                    outcome.completed.push(step.action);
                }

                Err(err) if step.policy == StepPolicy::Advisory => {
                    warn!(step = %step.action, error = %err, "advisory step failed, continuing");
                    outcome.advisory_failures.push((step.action, err));
                }

                Err(err) => {
                    error!(step = %step.action, error = %err, "step failed, rolling back");
                    let plan = step.rollback.clone().unwrap_or_else(|| Rollback {
                        compensations: unwind(completed.iter().copied()),
                        report_failures: true,
                    });
                    return Err(compensate(collaborators, &plan, cfg, previous, step.action, err).await);
                }
            }
        }

        Ok(outcome)
    }
}

// ---------------------------------------------------------------------------
// Internal: rollback
// ---------------------------------------------------------------------------

/// Compensations of `steps` in reverse order.
fn unwind<'a, I>(steps: I) -> Vec<Compensation>
where
    I: IntoIterator<Item = &'a SagaStep>,
    I::IntoIter: DoubleEndedIterator,
{
    steps.into_iter().rev().filter_map(|s| s.compensation).collect()
}

async fn compensate(
    collaborators: &Collaborators,
    plan: &Rollback,
    cfg: &Configuration,
    previous: Option<&Configuration>,
    failed_step: Action,
    cause: ProviderError,
) -> EngineError {
    let mut first_failure: Option<(Action, ProviderError)> = None;

    for comp in &plan.compensations {
        // Compensations work on a scratch copy so they never leak
        // fields into the configuration being returned.
        let mut target = match (comp.target, previous) {
            (Target::Current, _) => cfg.clone(),
            (Target::Previous, Some(prev)) => prev.clone(),
            (Target::Previous, None) => {
                error!(
                    compensation = %comp.action,
                    "no previous configuration to restore; external state may be orphaned"
                );
                continue;
            }
        };

        match collaborators.invoke(comp.action, &mut target).await {
            Ok(()) => info!(compensation = %comp.action, "compensation succeeded"),
            Err(err) => {
                error!(
                    failed_step = %failed_step,
                    compensation = %comp.action,
                    error = %err,
                    "compensation failed; external state may hold orphaned resources"
                );
                if first_failure.is_none() {
                    first_failure = Some((comp.action, err));
                }
            }
        }
    }

    match first_failure {
        Some((compensation, source)) if plan.report_failures => EngineError::Compensation {
            failed_step,
            cause,
            compensation,
            source,
        },
        _ => EngineError::Collaborator {
            step: failed_step,
            source: cause,
        },
    }
}
