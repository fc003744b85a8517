// src/trajectory/resample.rs
// Maps an arbitrary-length external trajectory onto a fixed-length buffer.
// Shorter inputs are stretched by repeating waypoints in order; longer inputs
// are decimated by floor sampling.

use super::TrajectoryBuffer;
use crate::PlanningError;
use crate::robot::{JointGroup, RobotState};

/// Source waypoint index for every target point
///
/// When `source_len <= target_len` each waypoint is repeated
/// `target_len / source_len` times, and the first `target_len % source_len`
/// waypoints get one extra copy. Otherwise target point `i` takes waypoint
/// `floor(i * source_len / target_len)`.
pub fn resample_indices(source_len: usize, target_len: usize) -> Result<Vec<usize>, PlanningError> {
    if source_len < 2 {
        return Err(PlanningError::InsufficientWaypoints(source_len));
    }
    if target_len < 2 {
        return Err(PlanningError::InvalidDimensions(format!(
            "need at least 2 target points, got {}",
            target_len
        )));
    }

    let mut indices = Vec::with_capacity(target_len);
    if source_len <= target_len {
        let repeat = target_len / source_len;
        let remainder = target_len % source_len;
        for i in 0..source_len {
            let copies = if i < remainder { repeat + 1 } else { repeat };
            indices.extend(std::iter::repeat(i).take(copies));
        }
    } else {
        for i in 0..target_len {
            indices.push((i * source_len / target_len).min(source_len - 1));
        }
    }
    Ok(indices)
}

/// Fill every point of `target` from `waypoints`, projected onto `group`'s active joints
///
/// Every waypoint must carry a value for each active joint's variable.
pub fn resample(
    waypoints: &[RobotState],
    group: &JointGroup<'_>,
    target: &mut TrajectoryBuffer,
) -> Result<(), PlanningError> {
    if group.len() != target.num_joints() {
        return Err(PlanningError::JointCountMismatch {
            expected: target.num_joints(),
            actual: group.len(),
        });
    }
    let indices = resample_indices(waypoints.len(), target.num_points())?;

    let required = group
        .active_joints()
        .iter()
        .map(|j| j.variable_index + 1)
        .max()
        .unwrap_or(0);
    if let Some(short) = waypoints.iter().find(|w| w.positions().len() < required) {
        return Err(PlanningError::JointCountMismatch {
            expected: required,
            actual: short.positions().len(),
        });
    }

    for (point, source) in indices.into_iter().enumerate() {
        let values = group.positions(&waypoints[source]);
        target.set_point(point, &values)?;
    }

    log::debug!(
        "Resampled {} waypoints onto {} trajectory points",
        waypoints.len(),
        target.num_points()
    );
    Ok(())
}
