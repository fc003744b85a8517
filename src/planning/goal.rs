// src/planning/goal.rs
// Wrap-around goal adjustment for continuously rotating joints.

use std::f64::consts::{PI, TAU};

use crate::PlanningError;
use crate::robot::{JointGroup, JointKind};
use crate::trajectory::TrajectoryBuffer;

/// Map `angle` into `(-π, π]`
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Signed shortest rotation taking `from` to `to`, in `(-π, π]`
///
/// `from + result` equals `to` modulo 2π; a half-turn resolves to `+π`.
pub fn shortest_angular_distance(from: f64, to: f64) -> f64 {
    normalize_angle(to - from)
}

/// Rewrite the goal of every continuous joint so the trajectory takes the short way round
pub fn adjust_goal(
    buffer: &mut TrajectoryBuffer,
    group: &JointGroup<'_>,
    start_index: usize,
    goal_index: usize,
) -> Result<(), PlanningError> {
    if group.len() != buffer.num_joints() {
        return Err(PlanningError::JointCountMismatch {
            expected: buffer.num_joints(),
            actual: group.len(),
        });
    }

    for (column, joint) in group.active_joints().iter().enumerate() {
        match joint.kind {
            JointKind::Revolute { continuous: true } => {
                let start = buffer.point(start_index)?[column];
                let end = buffer.point(goal_index)?[column];
                let shortest = shortest_angular_distance(start, end);
                log::info!("Start is {} end {} short {}", start, end, shortest);
                buffer.point_mut(goal_index)?[column] = start + shortest;
            }
            JointKind::Revolute { continuous: false }
            | JointKind::Prismatic
            | JointKind::Fixed
            | JointKind::Planar
            | JointKind::Floating => {}
        }
    }
    Ok(())
}
