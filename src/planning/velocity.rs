//! Finite-difference velocities for output waypoints

use nalgebra::DMatrix;

use crate::PlanningError;
use crate::trajectory::TrajectoryBuffer;

/// Number of taps in every difference rule
pub const DIFF_RULE_LENGTH: usize = 7;

/// First-derivative rule
pub const VELOCITY_RULE: [f64; DIFF_RULE_LENGTH] =
    [0.0, 0.0, -2.0 / 6.0, -3.0 / 6.0, 6.0 / 6.0, -1.0 / 6.0, 0.0];

/// Second-derivative rule
pub const ACCELERATION_RULE: [f64; DIFF_RULE_LENGTH] =
    [0.0, -1.0 / 12.0, 16.0 / 12.0, -30.0 / 12.0, 16.0 / 12.0, -1.0 / 12.0, 0.0];

/// Third-derivative rule
pub const JERK_RULE: [f64; DIFF_RULE_LENGTH] = [
    0.0,
    1.0 / 12.0,
    -17.0 / 12.0,
    46.0 / 12.0,
    -46.0 / 12.0,
    17.0 / 12.0,
    -1.0 / 12.0,
];

/// Time between consecutive output waypoints, in seconds
pub const OUTPUT_WAYPOINT_STEP: f64 = 0.1;

/// Banded `size × size` matrix applying `rule` centred on each row
///
/// Taps that would read before the first or past the last point are dropped.
pub fn diff_matrix(size: usize, rule: &[f64; DIFF_RULE_LENGTH]) -> DMatrix<f64> {
    let half = (DIFF_RULE_LENGTH / 2) as isize;
    let mut matrix = DMatrix::zeros(size, size);
    for i in 0..size {
        for offset in -half..=half {
            let index = i as isize + offset;
            if index < 0 || index >= size as isize {
                continue;
            }
            matrix[(i, index as usize)] = rule[(offset + half) as usize];
        }
    }
    matrix
}

/// One emitted trajectory sample
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    /// Joint positions, group order
    pub positions: Vec<f64>,
    /// Joint velocities, group order
    pub velocities: Vec<f64>,
    /// Seconds since the previous waypoint
    pub duration_from_previous: f64,
}

/// Turns a position buffer into velocity-annotated waypoints
#[derive(Debug, Clone)]
pub struct VelocityDeriver {
    diff: DMatrix<f64>,
    step: f64,
}

impl VelocityDeriver {
    /// Deriver for trajectories of `num_points` points
    pub fn new(num_points: usize) -> Self {
        VelocityDeriver {
            diff: diff_matrix(num_points, &VELOCITY_RULE),
            step: OUTPUT_WAYPOINT_STEP,
        }
    }

    /// Use a different output waypoint spacing
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    /// Number of points this deriver accepts
    pub fn num_points(&self) -> usize {
        self.diff.nrows()
    }

    /// `D · P`: one velocity column per joint column
    pub fn velocities(&self, buffer: &TrajectoryBuffer) -> Result<DMatrix<f64>, PlanningError> {
        if buffer.num_points() != self.num_points() {
            return Err(PlanningError::SizeMismatch {
                expected: self.num_points(),
                actual: buffer.num_points(),
            });
        }
        Ok(&self.diff * buffer.positions())
    }

    /// Emit one waypoint per point
    ///
    /// The first and last waypoints report zero velocity; the first has zero duration.
    pub fn derive(&self, buffer: &TrajectoryBuffer) -> Result<Vec<Waypoint>, PlanningError> {
        let num_points = buffer.num_points();
        let num_joints = buffer.num_joints();
        let velocities = self.velocities(buffer)?;

        let waypoints: Vec<Waypoint> = (0..num_points)
            .map(|i| {
                let positions = buffer.positions().row(i).iter().copied().collect();
                let velocities = if i == 0 || i == num_points - 1 {
                    vec![0.0; num_joints]
                } else {
                    velocities.row(i).iter().copied().collect()
                };
                Waypoint {
                    positions,
                    velocities,
                    duration_from_previous: if i == 0 { 0.0 } else { self.step },
                }
            })
            .collect();
        Ok(waypoints)
    }
}
