// src/planning/recovery.rs
// Bounded retry loop around the external optimizer, as a small state machine.
// Every failed attempt runs again on an escalated copy of the parameters; the
// caller's parameter set is only ever read.

use log::{debug, error, info, warn};
use std::time::Instant;

use super::optimizer::{OptimizerContext, OptimizerFactory};
use crate::PlanningError;
use crate::config::OptimizerParameters;
use crate::robot::RobotState;
use crate::trajectory::TrajectoryBuffer;

/// Recovery loop states
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecoveryState {
    Init,       // Parameters captured, nothing run yet
    Attempting, // An optimizer context is (about to be) running
    Success,    // Last attempt converged
    Exhausted,  // Last attempt failed and no retry is left
}

/// Parameters for the next attempt after a failure
///
/// Raises the learning rate and ridge factor, adds five seconds of planning
/// time and fifty iterations.
pub fn escalate(parameters: &OptimizerParameters) -> OptimizerParameters {
    OptimizerParameters {
        learning_rate: parameters.learning_rate + 0.02,
        ridge_factor: parameters.ridge_factor + 0.002,
        planning_time_limit: parameters.planning_time_limit + 5.0,
        max_iterations: parameters.max_iterations + 50,
        ..parameters.clone()
    }
}

/// What the loop ended with
pub struct RecoveryOutcome {
    /// [`RecoveryState::Success`] or [`RecoveryState::Exhausted`]
    pub state: RecoveryState,
    /// Optimization attempts run, including the first
    pub attempts: u32,
    /// Parameter snapshot used by the last attempt
    pub parameters: OptimizerParameters,
    /// Context of the last attempt, kept for the collision gate
    pub context: Box<dyn OptimizerContext>,
}

/// Drives optimization attempts until one succeeds or retries run out
pub struct RecoveryController<'a> {
    factory: &'a dyn OptimizerFactory,
    original: OptimizerParameters,
    current: OptimizerParameters,
    escalations: u32,
    state: RecoveryState,
}

impl<'a> RecoveryController<'a> {
    /// Capture `parameters` as the starting snapshot
    pub fn new(factory: &'a dyn OptimizerFactory, parameters: &OptimizerParameters) -> Self {
        RecoveryController {
            factory,
            original: parameters.clone(),
            current: parameters.clone(),
            escalations: 0,
            state: RecoveryState::Init,
        }
    }

    /// Current state
    pub fn state(&self) -> RecoveryState {
        self.state
    }

    /// Snapshot captured at construction
    pub fn original_parameters(&self) -> &OptimizerParameters {
        &self.original
    }

    /// Snapshot the next attempt will use
    pub fn current_parameters(&self) -> &OptimizerParameters {
        &self.current
    }

    /// Run attempts on `trajectory` until success or exhaustion
    ///
    /// A context that fails to initialize ends the loop with
    /// [`PlanningError::OptimizerInitFailed`] without retrying.
    pub fn run(
        &mut self,
        group: &str,
        trajectory: &mut TrajectoryBuffer,
        start_state: &RobotState,
    ) -> Result<RecoveryOutcome, PlanningError> {
        let created = Instant::now();
        self.state = RecoveryState::Attempting;

        loop {
            let mut context = self.factory.create(group, &self.current, trajectory, start_state);
            if !context.initialize() {
                error!("Could not initialize optimizer");
                self.state = RecoveryState::Exhausted;
                return Err(PlanningError::OptimizerInitFailed);
            }
            debug!(
                "Optimizer took {:.4} sec to create",
                created.elapsed().as_secs_f64()
            );

            let success = context.optimize(trajectory);
            if self.current.enable_failure_recovery {
                info!(
                    "Planned with learning rate {} ridge factor {} planning time limit {} max iterations {}, attempt #{}",
                    self.current.learning_rate,
                    self.current.ridge_factor,
                    self.current.planning_time_limit,
                    self.current.max_iterations,
                    self.escalations + 1
                );
            }

            let used = self.current.clone();
            self.state = self.transition(success);
            if self.state == RecoveryState::Attempting {
                continue;
            }

            if self.state == RecoveryState::Exhausted {
                warn!("Optimization failed after {} attempt(s)", self.escalations + 1);
            }
            debug!(
                "Optimization actually took {:.4} sec to run",
                created.elapsed().as_secs_f64()
            );
            return Ok(RecoveryOutcome {
                state: self.state,
                attempts: self.escalations + 1,
                parameters: used,
                context,
            });
        }
    }

    fn transition(&mut self, success: bool) -> RecoveryState {
        if success {
            RecoveryState::Success
        } else if self.current.enable_failure_recovery
            && self.escalations < self.current.max_recovery_attempts
        {
            self.current = escalate(&self.current);
            self.escalations += 1;
            RecoveryState::Attempting
        } else {
            RecoveryState::Exhausted
        }
    }
}
