//! Joint-space planning pipeline
//!
//! [`Planner::solve`] builds the start/goal trajectory buffer, fills its
//! interior, runs the optimizer under the recovery loop and gates the result on
//! collision freedom and goal tolerance before emitting waypoints.

pub mod goal;
pub mod optimizer;
pub mod recovery;
pub mod velocity;

use log::{debug, error, info, warn};
use std::time::Instant;

pub use velocity::{VelocityDeriver, Waypoint};

use crate::config::{InitializationMethod, OptimizerParameters, PlannerConfig};
use crate::robot::constraints::{ConstraintEvaluator, JointConstraintEvaluator};
use crate::robot::scene::{JointConstraint, MotionPlanRequest, PlanningScene};
use crate::robot::{JointGroup, RobotModel, RobotState};
use crate::trajectory::fill::{self, Interpolation};
use crate::trajectory::{TrajectoryBuffer, resample, table};
use crate::{ErrorCode, PlanningError};
use optimizer::OptimizerFactory;
use recovery::{RecoveryController, RecoveryState};

/// Accepted plan
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedTrajectory {
    /// Planning group
    pub group_name: String,
    /// Active joint names, matching waypoint column order
    pub joint_names: Vec<String>,
    /// Velocity-annotated waypoints, start first
    pub waypoints: Vec<Waypoint>,
}

impl PlannedTrajectory {
    /// Final waypoint
    pub fn last_waypoint(&self) -> Option<&Waypoint> {
        self.waypoints.last()
    }

    /// Sum of all waypoint durations, in seconds
    pub fn duration(&self) -> f64 {
        self.waypoints.iter().map(|w| w.duration_from_previous).sum()
    }
}

/// Result of a planning request
#[derive(Debug, Clone)]
pub struct PlanResponse {
    /// Present only when `error_code` is success
    pub trajectory: Option<PlannedTrajectory>,
    /// Outcome
    pub error_code: ErrorCode,
    /// Wall-clock seconds spent in `solve`
    pub processing_time: f64,
}

/// Joint-space planner wrapping an external optimizer
pub struct Planner {
    config: PlannerConfig,
    factory: Box<dyn OptimizerFactory>,
    evaluator: Box<dyn ConstraintEvaluator>,
}

impl Planner {
    /// Create a planner using `factory` for every optimization attempt
    pub fn new(config: PlannerConfig, factory: Box<dyn OptimizerFactory>) -> Self {
        Planner {
            config,
            factory,
            evaluator: Box::new(JointConstraintEvaluator::default()),
        }
    }

    /// Replace the goal constraint evaluator
    pub fn with_evaluator(mut self, evaluator: Box<dyn ConstraintEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan `request` in `scene`
    ///
    /// `parameters` is only read; retries work on escalated copies. No
    /// trajectory is returned unless every check passes.
    pub fn solve(
        &mut self,
        scene: Option<&dyn PlanningScene>,
        request: &MotionPlanRequest,
        parameters: &OptimizerParameters,
    ) -> PlanResponse {
        let started = Instant::now();
        let result = self.plan(scene, request, parameters);
        let processing_time = started.elapsed().as_secs_f64();
        debug!("Serviced planning request in {:.4} wall-seconds", processing_time);

        match result {
            Ok(trajectory) => PlanResponse {
                trajectory: Some(trajectory),
                error_code: ErrorCode::Success,
                processing_time,
            },
            Err(e) => {
                error!("Planning failed: {}", e);
                PlanResponse {
                    trajectory: None,
                    error_code: e.code(),
                    processing_time,
                }
            }
        }
    }

    fn plan(
        &mut self,
        scene: Option<&dyn PlanningScene>,
        request: &MotionPlanRequest,
        parameters: &OptimizerParameters,
    ) -> Result<PlannedTrajectory, PlanningError> {
        let scene = scene.ok_or(PlanningError::NoPlanningScene)?;
        let model = scene.robot_model();
        let group = model
            .group(&request.group_name)
            .ok_or_else(|| PlanningError::UnknownGroup(request.group_name.clone()))?;

        let start_state = merged_start_state(scene, model, request)?;
        let goal_constraints = joint_goal(request)?;

        let mut trajectory = TrajectoryBuffer::with_duration(
            self.config.trajectory_duration,
            self.config.discretization,
            group.len(),
        )?;
        let goal_index = trajectory.num_points() - 1;
        trajectory.set_point(0, &group.positions(&start_state))?;

        let mut goal_state = start_state.clone();
        for constraint in goal_constraints {
            let joint = model.joint(&constraint.joint_name).ok_or_else(|| {
                PlanningError::InvalidGoalState(format!("unknown joint '{}'", constraint.joint_name))
            })?;
            goal_state.set_position(joint.variable_index, constraint.position);
        }
        if !goal_state.satisfies_bounds(model) {
            return Err(PlanningError::InvalidGoalState(
                "goal state violates joint limits".to_string(),
            ));
        }
        trajectory.set_point(goal_index, &group.positions(&goal_state))?;

        goal::adjust_goal(&mut trajectory, &group, 0, goal_index)?;
        self.initialize(&mut trajectory, &group, request)?;
        info!(
            "Trajectory of {} points initialized using method: {:?}",
            trajectory.num_points(),
            self.config.initialization
        );

        let mut controller = RecoveryController::new(&*self.factory, parameters);
        let outcome = controller.run(group.name(), &mut trajectory, &start_state)?;
        if outcome.state == RecoveryState::Exhausted {
            warn!("Optimizer did not converge; gating the last attempt's trajectory");
        }

        debug!("Output trajectory has {} joints", trajectory.num_joints());
        let waypoints = VelocityDeriver::new(trajectory.num_points()).derive(&trajectory)?;

        if !outcome.context.is_collision_free() {
            return Err(PlanningError::CollisionDetected);
        }

        let mut last_state = start_state.clone();
        if let Some(last) = waypoints.last() {
            for (joint, value) in group.active_joints().iter().zip(&last.positions) {
                last_state.set_position(joint.variable_index, *value);
            }
        }
        for constraint in goal_constraints {
            if !self.evaluator.configure(model, constraint) || !self.evaluator.evaluate(&last_state) {
                return Err(PlanningError::GoalToleranceViolated(constraint.joint_name.clone()));
            }
        }

        Ok(PlannedTrajectory {
            group_name: group.name().to_string(),
            joint_names: group.active_joints().iter().map(|j| j.name.clone()).collect(),
            waypoints,
        })
    }

    fn initialize(
        &self,
        trajectory: &mut TrajectoryBuffer,
        group: &JointGroup<'_>,
        request: &MotionPlanRequest,
    ) -> Result<(), PlanningError> {
        let range = trajectory.free_range();
        if range.is_empty() {
            return Ok(());
        }

        match self.config.initialization {
            InitializationMethod::QuinticSpline => Interpolation::MinimumJerk.apply(trajectory, range),
            InitializationMethod::Linear => Interpolation::Linear.apply(trajectory, range),
            InitializationMethod::Cubic => Interpolation::Cubic.apply(trajectory, range),
            InitializationMethod::FillTrajectory => {
                let seed = request.seed_trajectory.as_deref().unwrap_or(&[]);
                let start = trajectory.point(0)?.clone_owned();
                let goal_index = trajectory.num_points() - 1;
                let goal = trajectory.point(goal_index)?.clone_owned();

                resample::resample(seed, group, trajectory)?;
                // boundaries stay the caller's start and goal
                trajectory.point_mut(0)?.copy_from(&start);
                trajectory.point_mut(goal_index)?.copy_from(&goal);
                Ok(())
            }
            InitializationMethod::Prebaked => {
                let source = self.config.prebaked.as_ref().ok_or_else(|| {
                    PlanningError::Table("no prebaked source configured".to_string())
                })?;
                let matrix = table::read_source(source)?;
                fill::from_matrix(trajectory, range, &matrix)
            }
        }
    }
}

/// Scene state with the request's start values merged on top
fn merged_start_state(
    scene: &dyn PlanningScene,
    model: &RobotModel,
    request: &MotionPlanRequest,
) -> Result<RobotState, PlanningError> {
    let mut state = scene.current_state();
    for (name, value) in &request.start_state {
        let joint = model
            .joint(name)
            .ok_or_else(|| PlanningError::InvalidStartState(format!("unknown joint '{}'", name)))?;
        state.set_position(joint.variable_index, *value);
    }
    if !state.satisfies_bounds(model) {
        return Err(PlanningError::InvalidStartState(
            "start state violates joint limits".to_string(),
        ));
    }
    Ok(state)
}

/// The single joint-space goal set of `request`
fn joint_goal(request: &MotionPlanRequest) -> Result<&[JointConstraint], PlanningError> {
    if request.goal_constraints.len() != 1 {
        return Err(PlanningError::UnsupportedGoalType(format!(
            "expecting exactly one goal constraint, got {}",
            request.goal_constraints.len()
        )));
    }
    let goal = &request.goal_constraints[0];
    if goal.joint_constraints.is_empty()
        || !goal.position_constraints.is_empty()
        || !goal.orientation_constraints.is_empty()
    {
        return Err(PlanningError::UnsupportedGoalType(
            "only joint-space goals are supported".to_string(),
        ));
    }
    Ok(&goal.joint_constraints)
}
