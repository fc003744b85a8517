// src/robot/constraints.rs
// Joint constraint evaluation used by the final goal-tolerance gate.

use super::scene::JointConstraint;
use super::{RobotModel, RobotState};
use crate::planning::goal::shortest_angular_distance;

/// Decides whether a state satisfies a single joint constraint
pub trait ConstraintEvaluator {
    /// Bind the evaluator to `constraint`; false when it cannot be applied to `model`
    fn configure(&mut self, model: &RobotModel, constraint: &JointConstraint) -> bool;

    /// Whether `state` satisfies the configured constraint
    fn evaluate(&self, state: &RobotState) -> bool;
}

#[derive(Debug, Clone)]
struct Bound {
    variable_index: usize,
    continuous: bool,
    target: f64,
    above: f64,
    below: f64,
}

/// Tolerance-band evaluator for joint constraints
#[derive(Debug, Clone, Default)]
pub struct JointConstraintEvaluator {
    bound: Option<Bound>,
}

impl ConstraintEvaluator for JointConstraintEvaluator {
    fn configure(&mut self, model: &RobotModel, constraint: &JointConstraint) -> bool {
        self.bound = None;
        let Some(joint) = model.joint(&constraint.joint_name) else {
            log::warn!("Joint '{}' not found in model", constraint.joint_name);
            return false;
        };
        if constraint.tolerance_above < 0.0 || constraint.tolerance_below < 0.0 {
            log::warn!("Negative tolerance for joint '{}'", constraint.joint_name);
            return false;
        }
        self.bound = Some(Bound {
            variable_index: joint.variable_index,
            continuous: joint.kind.is_continuous(),
            target: constraint.position,
            above: constraint.tolerance_above,
            below: constraint.tolerance_below,
        });
        true
    }

    fn evaluate(&self, state: &RobotState) -> bool {
        let Some(bound) = &self.bound else {
            return false;
        };
        let actual = state.position(bound.variable_index);
        let diff = if bound.continuous {
            shortest_angular_distance(bound.target, actual)
        } else {
            actual - bound.target
        };
        diff <= bound.above && diff >= -bound.below
    }
}
