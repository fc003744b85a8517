// src/robot/scene.rs
// Planning scene contract and the request/goal types handed to the planner.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{RobotModel, RobotState};

/// Source of the robot model and current state for a planning request
pub trait PlanningScene {
    /// Robot model the scene was built for
    fn robot_model(&self) -> &RobotModel;

    /// Snapshot of the robot's current state
    fn current_state(&self) -> RobotState;
}

/// A scene with a fixed model and state
#[derive(Debug, Clone)]
pub struct StaticScene {
    model: RobotModel,
    state: RobotState,
}

impl StaticScene {
    /// Create a scene whose current state is `state`
    pub fn new(model: RobotModel, state: RobotState) -> Self {
        StaticScene { model, state }
    }

    /// Create a scene at the model's all-zero state
    pub fn at_rest(model: RobotModel) -> Self {
        let state = model.default_state();
        StaticScene { model, state }
    }
}

impl PlanningScene for StaticScene {
    fn robot_model(&self) -> &RobotModel {
        &self.model
    }

    fn current_state(&self) -> RobotState {
        self.state.clone()
    }
}

/// Joint-space goal for a single joint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointConstraint {
    /// Constrained joint
    pub joint_name: String,
    /// Target position
    pub position: f64,
    /// Allowed overshoot above the target
    #[serde(default = "default_tolerance")]
    pub tolerance_above: f64,
    /// Allowed undershoot below the target
    #[serde(default = "default_tolerance")]
    pub tolerance_below: f64,
    /// Relative importance; informational only
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_tolerance() -> f64 {
    1e-3
}

fn default_weight() -> f64 {
    1.0
}

impl JointConstraint {
    /// Constraint with symmetric tolerance
    pub fn new(joint_name: impl Into<String>, position: f64, tolerance: f64) -> Self {
        JointConstraint {
            joint_name: joint_name.into(),
            position,
            tolerance_above: tolerance,
            tolerance_below: tolerance,
            weight: default_weight(),
        }
    }
}

/// Cartesian position goal for a link; rejected by this planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionConstraint {
    /// Constrained link
    pub link_name: String,
    /// Target position in the planning frame
    pub target: [f64; 3],
}

/// Orientation goal for a link; rejected by this planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrientationConstraint {
    /// Constrained link
    pub link_name: String,
    /// Target orientation as a quaternion (x, y, z, w)
    pub target: [f64; 4],
}

/// One goal constraint set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Constraints {
    /// Joint-space constraints
    pub joint_constraints: Vec<JointConstraint>,
    /// Link position constraints
    pub position_constraints: Vec<PositionConstraint>,
    /// Link orientation constraints
    pub orientation_constraints: Vec<OrientationConstraint>,
}

impl Constraints {
    /// A set holding only joint constraints
    pub fn joints(joint_constraints: Vec<JointConstraint>) -> Self {
        Constraints {
            joint_constraints,
            ..Default::default()
        }
    }
}

/// Motion planning request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionPlanRequest {
    /// Planning group
    pub group_name: String,
    /// Joint values merged over the scene's current state, by joint name
    pub start_state: HashMap<String, f64>,
    /// Goal constraint sets; exactly one joint-space set is accepted
    pub goal_constraints: Vec<Constraints>,
    /// Seed trajectory for the `fill-trajectory` initialization
    pub seed_trajectory: Option<Vec<RobotState>>,
}
