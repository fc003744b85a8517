// src/trajectory/fill.rs
// Interpolation fillers. Each one writes the free interior of a buffer from
// the two fixed points just outside the range and never touches those points.

use nalgebra::DMatrix;

use super::{FreeRange, TrajectoryBuffer};
use crate::PlanningError;

/// Micro-timestep used by the cubic filler, independent of the buffer's discretization
pub const CUBIC_TIMESTEP: f64 = 0.001;

/// Closed-form interpolation strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    /// Straight line in joint space
    Linear,
    /// Cubic on the fixed [`CUBIC_TIMESTEP`]
    Cubic,
    /// Quintic with zero boundary velocity and acceleration
    MinimumJerk,
}

impl Interpolation {
    /// Fill `range` of `buffer`
    pub fn apply(self, buffer: &mut TrajectoryBuffer, range: FreeRange) -> Result<(), PlanningError> {
        match self {
            Interpolation::Linear => linear(buffer, range),
            Interpolation::Cubic => cubic(buffer, range),
            Interpolation::MinimumJerk => minimum_jerk(buffer, range),
        }
    }
}

/// Linear fill: `value(j) = start + j * (end - start) / (end_index - 1)`
///
/// `j` is the absolute point index, so for a buffer whose start boundary is
/// point 0 the goal value is reached at `end_index - 1`.
pub fn linear(buffer: &mut TrajectoryBuffer, range: FreeRange) -> Result<(), PlanningError> {
    let (first, last) = buffer.boundaries(range)?;
    let positions = buffer.positions_mut();

    for joint in 0..positions.ncols() {
        let start = positions[(first, joint)];
        let end = positions[(last, joint)];
        let theta = (end - start) / (last as f64 - 1.0);
        for j in (first + 1)..last {
            positions[(j, joint)] = start + j as f64 * theta;
        }
    }
    Ok(())
}

/// Cubic fill with zero initial slope, timed on [`CUBIC_TIMESTEP`]
///
/// Total time is `(end_index - 1) * CUBIC_TIMESTEP` and point `j` is
/// evaluated at `t = j * CUBIC_TIMESTEP`.
pub fn cubic(buffer: &mut TrajectoryBuffer, range: FreeRange) -> Result<(), PlanningError> {
    let (first, last) = buffer.boundaries(range)?;
    let total_time = (last as f64 - 1.0) * CUBIC_TIMESTEP;
    let positions = buffer.positions_mut();

    for joint in 0..positions.ncols() {
        let start = positions[(first, joint)];
        let delta = positions[(last, joint)] - start;
        let c2 = 3.0 / total_time.powi(2) * delta;
        let c3 = -2.0 / total_time.powi(3) * delta;
        for j in (first + 1)..last {
            let t = j as f64 * CUBIC_TIMESTEP;
            positions[(j, joint)] = start + c2 * t.powi(2) + c3 * t.powi(3);
        }
    }
    Ok(())
}

/// Minimum-jerk fill between the boundary points, sampled at the buffer's discretization
pub fn minimum_jerk(buffer: &mut TrajectoryBuffer, range: FreeRange) -> Result<(), PlanningError> {
    let (first, last) = buffer.boundaries(range)?;
    let dt = buffer.discretization();
    let duration = (last - first) as f64 * dt;
    let positions = buffer.positions_mut();

    let segments: Vec<MinJerkSegment> = (0..positions.ncols())
        .map(|joint| MinJerkSegment::new(positions[(first, joint)], positions[(last, joint)], duration))
        .collect();

    for i in (first + 1)..last {
        let t = (i - first) as f64 * dt;
        for (joint, segment) in segments.iter().enumerate() {
            positions[(i, joint)] = segment.position(t);
        }
    }
    Ok(())
}

/// Copy the free rows of a pre-baked matrix into `buffer`
///
/// The matrix must have the buffer's exact shape; boundary rows are left alone.
pub fn from_matrix(
    buffer: &mut TrajectoryBuffer,
    range: FreeRange,
    matrix: &DMatrix<f64>,
) -> Result<(), PlanningError> {
    buffer.check_interior(range)?;
    if matrix.nrows() != buffer.num_points() {
        return Err(PlanningError::SizeMismatch {
            expected: buffer.num_points(),
            actual: matrix.nrows(),
        });
    }
    if matrix.ncols() != buffer.num_joints() {
        return Err(PlanningError::JointCountMismatch {
            expected: buffer.num_joints(),
            actual: matrix.ncols(),
        });
    }
    for i in range.start..=range.end {
        buffer.positions_mut().set_row(i, &matrix.row(i));
    }
    Ok(())
}

/// Quintic from rest to rest
///
/// Velocity and acceleration are zero at both `t = 0` and `t = duration`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinJerkSegment {
    coefficients: [f64; 6],
}

impl MinJerkSegment {
    /// Segment from `x0` to `x1` over `duration` seconds
    pub fn new(x0: f64, x1: f64, duration: f64) -> Self {
        let delta = x1 - x0;
        let t3 = duration.powi(3);
        let t4 = t3 * duration;
        let t5 = t4 * duration;
        MinJerkSegment {
            coefficients: [
                x0,
                0.0,
                0.0,
                10.0 * delta / t3,
                -15.0 * delta / t4,
                6.0 * delta / t5,
            ],
        }
    }

    /// Position at `t`
    pub fn position(&self, t: f64) -> f64 {
        let c = &self.coefficients;
        c[0] + t * (c[1] + t * (c[2] + t * (c[3] + t * (c[4] + t * c[5]))))
    }

    /// First derivative at `t`
    pub fn velocity(&self, t: f64) -> f64 {
        let c = &self.coefficients;
        c[1] + t * (2.0 * c[2] + t * (3.0 * c[3] + t * (4.0 * c[4] + t * 5.0 * c[5])))
    }

    /// Second derivative at `t`
    pub fn acceleration(&self, t: f64) -> f64 {
        let c = &self.coefficients;
        2.0 * c[2] + t * (6.0 * c[3] + t * (12.0 * c[4] + t * 20.0 * c[5]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints(num_points: usize, start: &[f64], goal: &[f64]) -> TrajectoryBuffer {
        let mut buffer = TrajectoryBuffer::new(num_points, 0.1, start.len()).unwrap();
        buffer.set_point(0, start).unwrap();
        buffer.set_point(num_points - 1, goal).unwrap();
        buffer
    }

    #[test]
    fn linear_steps_by_constant_increment() {
        let mut buffer = endpoints(6, &[0.0], &[10.0]);
        let range = buffer.free_range();
        linear(&mut buffer, range).unwrap();
        let column = buffer.joint_column(0).unwrap();
        assert_eq!(column.as_slice(), &[0.0, 2.5, 5.0, 7.5, 10.0, 10.0]);
    }

    #[test]
    fn cubic_reaches_goal_one_step_early() {
        let mut buffer = endpoints(11, &[1.0, -1.0], &[3.0, 1.0]);
        let range = buffer.free_range();
        cubic(&mut buffer, range).unwrap();
        for joint in 0..2 {
            let column = buffer.joint_column(joint).unwrap();
            assert!((column[9] - column[10]).abs() < 1e-9);
            assert!(column.as_slice().windows(2).all(|w| w[1] >= w[0] - 1e-12));
        }
    }

    #[test]
    fn minimum_jerk_matches_boundaries() {
        let mut buffer = endpoints(21, &[0.5, 2.0], &[-1.0, 2.0]);
        let range = buffer.free_range();
        minimum_jerk(&mut buffer, range).unwrap();

        assert_eq!(buffer.point(0).unwrap()[0], 0.5);
        assert_eq!(buffer.point(20).unwrap()[0], -1.0);
        // midpoint of a symmetric quintic is the average of the endpoints
        assert!((buffer.point(10).unwrap()[0] - (-0.25)).abs() < 1e-12);
        // unchanged joint stays put
        assert!(buffer.joint_column(1).unwrap().iter().all(|v| (v - 2.0).abs() < 1e-12));
    }

    #[test]
    fn minimum_jerk_segment_starts_and_ends_at_rest() {
        let segment = MinJerkSegment::new(-0.3, 1.7, 2.4);
        assert!((segment.position(0.0) + 0.3).abs() < 1e-12);
        assert!((segment.position(2.4) - 1.7).abs() < 1e-9);
        for t in [0.0, 2.4] {
            assert!(segment.velocity(t).abs() < 1e-9);
            assert!(segment.acceleration(t).abs() < 1e-9);
        }
        assert!(segment.velocity(1.2) > 0.0);
    }

    #[test]
    fn fillers_reject_range_without_boundaries() {
        let mut buffer = endpoints(5, &[0.0], &[1.0]);
        let bad = FreeRange { start: 0, end: 3 };
        assert!(matches!(
            Interpolation::Linear.apply(&mut buffer, bad),
            Err(PlanningError::InvalidFreeRange { .. })
        ));
    }

    #[test]
    fn matrix_fill_keeps_boundaries_and_checks_shape() {
        let mut buffer = endpoints(4, &[0.0, 0.0], &[9.0, 9.0]);
        let range = buffer.free_range();
        let matrix = DMatrix::from_fn(4, 2, |i, j| (i + j) as f64 + 0.5);
        from_matrix(&mut buffer, range, &matrix).unwrap();
        assert_eq!(buffer.point(0).unwrap()[0], 0.0);
        assert_eq!(buffer.point(2).unwrap()[1], 3.5);
        assert_eq!(buffer.point(3).unwrap()[1], 9.0);

        let wrong = DMatrix::zeros(5, 2);
        assert!(matches!(
            from_matrix(&mut buffer, range, &wrong),
            Err(PlanningError::SizeMismatch { expected: 4, actual: 5 })
        ));
    }
}
