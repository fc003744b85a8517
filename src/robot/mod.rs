//! Robot model and state
//!
//! Joint kinds are resolved once when the model is built, so callers match
//! on [`JointKind`] instead of inspecting joint types at run time.

pub mod constraints;
pub mod scene;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Joint type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JointKind {
    /// Rotational joint; `continuous` joints have no travel limit and wrap at 2π
    Revolute {
        /// Unbounded, wrapping joint
        continuous: bool,
    },
    /// Linear joint
    Prismatic,
    /// Rigid connection, carries no variable
    Fixed,
    /// Planar base joint
    Planar,
    /// Free-floating base joint
    Floating,
}

impl JointKind {
    /// Whether the joint wraps around at 2π
    pub fn is_continuous(&self) -> bool {
        matches!(self, JointKind::Revolute { continuous: true })
    }
}

/// Position limits of a joint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointLimits {
    /// Lower bound
    pub min: f64,
    /// Upper bound
    pub max: f64,
}

/// A single joint in the robot model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JointModel {
    /// Unique joint name
    pub name: String,
    /// Joint type tag
    pub kind: JointKind,
    /// Index of the joint's variable in a [`RobotState`]
    pub variable_index: usize,
    /// Position limits; ignored for continuous joints
    #[serde(default)]
    pub limits: Option<JointLimits>,
}

impl JointModel {
    /// Whether `position` lies within the joint's limits
    pub fn satisfies_bounds(&self, position: f64) -> bool {
        if self.kind.is_continuous() {
            return position.is_finite();
        }
        match self.limits {
            Some(limits) => position >= limits.min && position <= limits.max,
            None => position.is_finite(),
        }
    }
}

/// Robot model: joints plus named planning groups
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RobotModel {
    joints: Vec<JointModel>,
    #[serde(default)]
    groups: HashMap<String, Vec<String>>,
}

impl RobotModel {
    /// Create a model from joints and group definitions (group name to joint names)
    pub fn new(joints: Vec<JointModel>, groups: HashMap<String, Vec<String>>) -> Self {
        RobotModel { joints, groups }
    }

    /// All joints in declaration order
    pub fn joints(&self) -> &[JointModel] {
        &self.joints
    }

    /// Look up a joint by name
    pub fn joint(&self, name: &str) -> Option<&JointModel> {
        self.joints.iter().find(|j| j.name == name)
    }

    /// Number of state variables
    pub fn variable_count(&self) -> usize {
        self.joints
            .iter()
            .map(|j| j.variable_index + 1)
            .max()
            .unwrap_or(0)
    }

    /// Resolve a planning group to its active (non-fixed) joints, in group order
    ///
    /// Entries naming a joint the model does not have are skipped with a warning.
    pub fn group(&self, name: &str) -> Option<JointGroup<'_>> {
        let names = self.groups.get(name)?;
        let active = names
            .iter()
            .filter_map(|n| {
                let joint = self.joint(n);
                if joint.is_none() {
                    log::warn!("Group '{}' names unknown joint '{}'; skipping it", name, n);
                }
                joint
            })
            .filter(|j| j.kind != JointKind::Fixed)
            .collect();
        Some(JointGroup {
            name: name.to_string(),
            active,
        })
    }

    /// A state with every variable at zero
    pub fn default_state(&self) -> RobotState {
        RobotState::zeros(self.variable_count())
    }
}

/// Ordered active joints of a planning group
///
/// The order here is the column order of every trajectory buffer planned for the group.
#[derive(Debug, Clone)]
pub struct JointGroup<'a> {
    name: String,
    active: Vec<&'a JointModel>,
}

impl<'a> JointGroup<'a> {
    /// Group name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Active joints in column order
    pub fn active_joints(&self) -> &[&'a JointModel] {
        &self.active
    }

    /// Number of active joints
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether the group has no active joints
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Active-joint positions of `state`, in group order
    pub fn positions(&self, state: &RobotState) -> Vec<f64> {
        self.active
            .iter()
            .map(|j| state.position(j.variable_index))
            .collect()
    }
}

/// Joint positions and velocities, indexed by variable index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotState {
    positions: Vec<f64>,
    #[serde(default)]
    velocities: Vec<f64>,
}

impl RobotState {
    /// A state with `variables` zeroed positions and velocities
    pub fn zeros(variables: usize) -> Self {
        RobotState {
            positions: vec![0.0; variables],
            velocities: vec![0.0; variables],
        }
    }

    /// A state at rest at the given positions
    pub fn from_positions(positions: Vec<f64>) -> Self {
        let velocities = vec![0.0; positions.len()];
        RobotState { positions, velocities }
    }

    /// Position of a variable; out-of-range indices read as zero
    pub fn position(&self, index: usize) -> f64 {
        self.positions.get(index).copied().unwrap_or(0.0)
    }

    /// Velocity of a variable; out-of-range indices read as zero
    pub fn velocity(&self, index: usize) -> f64 {
        self.velocities.get(index).copied().unwrap_or(0.0)
    }

    /// Set a variable position, growing the state if needed
    pub fn set_position(&mut self, index: usize, value: f64) {
        self.ensure_len(index + 1);
        self.positions[index] = value;
    }

    /// Set a variable velocity, growing the state if needed
    pub fn set_velocity(&mut self, index: usize, value: f64) {
        self.ensure_len(index + 1);
        self.velocities[index] = value;
    }

    /// All positions
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    /// All velocities
    pub fn velocities(&self) -> &[f64] {
        &self.velocities
    }

    /// Whether every joint of `model` is within its limits
    pub fn satisfies_bounds(&self, model: &RobotModel) -> bool {
        model
            .joints()
            .iter()
            .filter(|j| j.kind != JointKind::Fixed)
            .all(|j| j.satisfies_bounds(self.position(j.variable_index)))
    }

    fn ensure_len(&mut self, len: usize) {
        if self.positions.len() < len {
            self.positions.resize(len, 0.0);
        }
        if self.velocities.len() < len {
            self.velocities.resize(len, 0.0);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Three-joint arm: a bounded shoulder, a continuous wrist and a fixed flange
    pub(crate) fn arm_model() -> RobotModel {
        let joints = vec![
            JointModel {
                name: "shoulder".into(),
                kind: JointKind::Revolute { continuous: false },
                variable_index: 0,
                limits: Some(JointLimits { min: -2.0, max: 2.0 }),
            },
            JointModel {
                name: "flange".into(),
                kind: JointKind::Fixed,
                variable_index: 1,
                limits: None,
            },
            JointModel {
                name: "wrist".into(),
                kind: JointKind::Revolute { continuous: true },
                variable_index: 2,
                limits: None,
            },
        ];
        let mut groups = HashMap::new();
        groups.insert(
            "arm".to_string(),
            vec!["shoulder".to_string(), "flange".to_string(), "wrist".to_string()],
        );
        RobotModel::new(joints, groups)
    }

    #[test]
    fn group_skips_fixed_joints() {
        let model = arm_model();
        let group = model.group("arm").unwrap();
        let names: Vec<&str> = group.active_joints().iter().map(|j| j.name.as_str()).collect();
        assert_eq!(names, vec!["shoulder", "wrist"]);
        assert!(model.group("leg").is_none());
    }

    #[test]
    fn group_skips_unknown_joint_names() {
        let mut model = arm_model();
        model
            .groups
            .insert("partial".to_string(), vec!["wrist".to_string(), "elbow".to_string()]);
        let group = model.group("partial").unwrap();
        assert_eq!(group.len(), 1);
        assert_eq!(group.active_joints()[0].name, "wrist");
    }

    #[test]
    fn projection_follows_group_order() {
        let model = arm_model();
        let group = model.group("arm").unwrap();
        let state = RobotState::from_positions(vec![0.5, 9.0, -1.5]);
        assert_eq!(group.positions(&state), vec![0.5, -1.5]);
    }

    #[test]
    fn bounds_ignore_continuous_joints() {
        let model = arm_model();
        assert!(RobotState::from_positions(vec![1.0, 0.0, 40.0]).satisfies_bounds(&model));
        assert!(!RobotState::from_positions(vec![2.5, 0.0, 0.0]).satisfies_bounds(&model));
    }

    #[test]
    fn model_deserializes_from_yaml() {
        let doc = r#"
joints:
  - name: base
    kind: { type: revolute, continuous: true }
    variable_index: 0
  - name: slider
    kind: { type: prismatic }
    variable_index: 1
    limits: { min: 0.0, max: 0.5 }
groups:
  all: [base, slider]
"#;
        let model: RobotModel = serde_yaml::from_str(doc).unwrap();
        assert!(model.joint("base").unwrap().kind.is_continuous());
        assert_eq!(model.group("all").unwrap().len(), 2);
        assert_eq!(model.variable_count(), 2);
    }
}
