// src/planning/optimizer.rs
// Contract for the external trajectory optimizer. The planner never looks at
// cost terms or gradients; it only creates contexts and reads their verdicts.

use crate::config::OptimizerParameters;
use crate::robot::RobotState;
use crate::trajectory::TrajectoryBuffer;

/// One optimizer run bound to a parameter snapshot
#[cfg_attr(test, mockall::automock)]
pub trait OptimizerContext {
    /// Prepare internal state; false when the optimizer cannot run
    fn initialize(&mut self) -> bool;

    /// Optimize `trajectory` in place; true on convergence within budget
    fn optimize(&mut self, trajectory: &mut TrajectoryBuffer) -> bool;

    /// Whether the last optimized trajectory is collision free
    fn is_collision_free(&self) -> bool;
}

/// Builds a fresh [`OptimizerContext`] for every attempt
#[cfg_attr(test, mockall::automock)]
pub trait OptimizerFactory {
    /// Create a context for `group` starting at `start_state`
    fn create(
        &self,
        group: &str,
        parameters: &OptimizerParameters,
        trajectory: &TrajectoryBuffer,
        start_state: &RobotState,
    ) -> Box<dyn OptimizerContext>;
}
