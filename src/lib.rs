//! Trajseed - trajectory seeding for gradient-based joint-space planners
//!
//! This library turns a start/goal configuration pair into a fixed-length,
//! fixed-timestep trajectory buffer, hands it to an external optimizer inside a
//! bounded recovery loop, and annotates the result with finite-difference
//! velocities.

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

pub mod config;
pub mod planning;
pub mod robot;
pub mod trajectory;

// Re-export commonly used items for easier access
pub use config::{ConfigError, InitializationMethod, OptimizerParameters, PlannerConfig, PrebakedSource};
pub use planning::{PlanResponse, PlannedTrajectory, Planner, Waypoint};
pub use planning::optimizer::{OptimizerContext, OptimizerFactory};
pub use planning::recovery::{RecoveryController, RecoveryState};
pub use robot::{JointKind, JointModel, RobotModel, RobotState};
pub use robot::scene::{Constraints, JointConstraint, MotionPlanRequest, PlanningScene, StaticScene};
pub use trajectory::{FreeRange, TrajectoryBuffer};

/// Planning failure kinds
///
/// Every variant maps to a distinct [`ErrorCode`]. None of them are retried
/// except an optimizer returning `false`, which the recovery loop handles
/// before an error is ever produced.
#[derive(Debug, thiserror::Error)]
pub enum PlanningError {
    /// No planning scene was supplied
    #[error("no planning scene initialized")]
    NoPlanningScene,
    /// Start state violates joint limits or names an unknown joint
    #[error("invalid start state: {0}")]
    InvalidStartState(String),
    /// Goal is not a single joint-space constraint set
    #[error("unsupported goal type: {0}")]
    UnsupportedGoalType(String),
    /// Goal state violates joint limits or names an unknown joint
    #[error("invalid goal state: {0}")]
    InvalidGoalState(String),
    /// Buffer sizing rejected
    #[error("invalid trajectory dimensions: {0}")]
    InvalidDimensions(String),
    /// Point or joint index past the end of the buffer
    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of valid indices
        len: usize,
    },
    /// Two buffers or matrices disagree in shape
    #[error("size mismatch: expected {expected}, got {actual}")]
    SizeMismatch {
        /// Expected size
        expected: usize,
        /// Actual size
        actual: usize,
    },
    /// A state projection does not match the buffer's joint count
    #[error("joint count mismatch: buffer has {expected} joints, source has {actual}")]
    JointCountMismatch {
        /// Joints in the target buffer
        expected: usize,
        /// Joints in the source
        actual: usize,
    },
    /// Resampling needs at least start and goal
    #[error("input trajectory has {0} waypoints, at least start and goal are required")]
    InsufficientWaypoints(usize),
    /// A free range does not fit inside the buffer's fixed boundaries
    #[error("free range [{start}, {end}] is invalid for {num_points} points")]
    InvalidFreeRange {
        /// First free index
        start: usize,
        /// Last free index
        end: usize,
        /// Buffer length
        num_points: usize,
    },
    /// Planning group not present in the robot model
    #[error("unknown planning group '{0}'")]
    UnknownGroup(String),
    /// Optimizer context refused to initialize
    #[error("could not initialize optimizer")]
    OptimizerInitFailed,
    /// Optimized trajectory is in collision
    #[error("motion plan is invalid: trajectory in collision")]
    CollisionDetected,
    /// Last waypoint does not satisfy a goal joint constraint
    #[error("goal constraint violated for joint '{0}'")]
    GoalToleranceViolated(String),
    /// Prebaked trajectory table could not be read
    #[error("trajectory table error: {0}")]
    Table(String),
}

/// Result code reported alongside every plan response
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorCode {
    /// Plan produced and accepted
    Success,
    /// See [`PlanningError::NoPlanningScene`]
    NoPlanningScene,
    /// See [`PlanningError::InvalidStartState`]
    InvalidStartState,
    /// See [`PlanningError::UnsupportedGoalType`]
    UnsupportedGoalType,
    /// See [`PlanningError::InvalidGoalState`]
    InvalidGoalState,
    /// See [`PlanningError::InvalidDimensions`]
    InvalidDimensions,
    /// See [`PlanningError::IndexOutOfRange`]
    IndexOutOfRange,
    /// See [`PlanningError::SizeMismatch`]
    SizeMismatch,
    /// See [`PlanningError::JointCountMismatch`]
    JointCountMismatch,
    /// See [`PlanningError::InsufficientWaypoints`]
    InsufficientWaypoints,
    /// See [`PlanningError::InvalidFreeRange`]
    InvalidFreeRange,
    /// See [`PlanningError::UnknownGroup`]
    UnknownGroup,
    /// See [`PlanningError::OptimizerInitFailed`]
    OptimizerInitFailed,
    /// See [`PlanningError::CollisionDetected`]
    CollisionDetected,
    /// See [`PlanningError::GoalToleranceViolated`]
    GoalToleranceViolated,
    /// See [`PlanningError::Table`]
    TableError,
}

impl ErrorCode {
    /// Signed integer form; success is positive, every failure a distinct negative value
    pub fn value(self) -> i32 {
        match self {
            ErrorCode::Success => 1,
            ErrorCode::NoPlanningScene => -1,
            ErrorCode::InvalidStartState => -2,
            ErrorCode::UnsupportedGoalType => -3,
            ErrorCode::InvalidGoalState => -4,
            ErrorCode::InvalidDimensions => -5,
            ErrorCode::IndexOutOfRange => -6,
            ErrorCode::SizeMismatch => -7,
            ErrorCode::JointCountMismatch => -8,
            ErrorCode::InsufficientWaypoints => -9,
            ErrorCode::InvalidFreeRange => -10,
            ErrorCode::UnknownGroup => -11,
            ErrorCode::OptimizerInitFailed => -12,
            ErrorCode::CollisionDetected => -13,
            ErrorCode::GoalToleranceViolated => -14,
            ErrorCode::TableError => -15,
        }
    }

    /// Whether the code reports an accepted plan
    pub fn is_success(self) -> bool {
        self == ErrorCode::Success
    }
}

impl PlanningError {
    /// Result code for this failure
    pub fn code(&self) -> ErrorCode {
        match self {
            PlanningError::NoPlanningScene => ErrorCode::NoPlanningScene,
            PlanningError::InvalidStartState(_) => ErrorCode::InvalidStartState,
            PlanningError::UnsupportedGoalType(_) => ErrorCode::UnsupportedGoalType,
            PlanningError::InvalidGoalState(_) => ErrorCode::InvalidGoalState,
            PlanningError::InvalidDimensions(_) => ErrorCode::InvalidDimensions,
            PlanningError::IndexOutOfRange { .. } => ErrorCode::IndexOutOfRange,
            PlanningError::SizeMismatch { .. } => ErrorCode::SizeMismatch,
            PlanningError::JointCountMismatch { .. } => ErrorCode::JointCountMismatch,
            PlanningError::InsufficientWaypoints(_) => ErrorCode::InsufficientWaypoints,
            PlanningError::InvalidFreeRange { .. } => ErrorCode::InvalidFreeRange,
            PlanningError::UnknownGroup(_) => ErrorCode::UnknownGroup,
            PlanningError::OptimizerInitFailed => ErrorCode::OptimizerInitFailed,
            PlanningError::CollisionDetected => ErrorCode::CollisionDetected,
            PlanningError::GoalToleranceViolated(_) => ErrorCode::GoalToleranceViolated,
            PlanningError::Table(_) => ErrorCode::TableError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn error_codes_are_distinct() {
        let errors = vec![
            PlanningError::NoPlanningScene,
            PlanningError::InvalidStartState(String::new()),
            PlanningError::UnsupportedGoalType(String::new()),
            PlanningError::InvalidGoalState(String::new()),
            PlanningError::InvalidDimensions(String::new()),
            PlanningError::IndexOutOfRange { index: 0, len: 0 },
            PlanningError::SizeMismatch { expected: 0, actual: 0 },
            PlanningError::JointCountMismatch { expected: 0, actual: 0 },
            PlanningError::InsufficientWaypoints(0),
            PlanningError::InvalidFreeRange { start: 0, end: 0, num_points: 0 },
            PlanningError::UnknownGroup(String::new()),
            PlanningError::OptimizerInitFailed,
            PlanningError::CollisionDetected,
            PlanningError::GoalToleranceViolated(String::new()),
            PlanningError::Table(String::new()),
        ];

        let values: HashSet<i32> = errors.iter().map(|e| e.code().value()).collect();
        assert_eq!(values.len(), errors.len());
        assert!(!values.contains(&ErrorCode::Success.value()));
        assert!(errors.iter().all(|e| !e.code().is_success()));
    }
}
