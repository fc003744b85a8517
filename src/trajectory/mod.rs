//! Trajectory buffer
//!
//! A fixed-shape (point × joint) position matrix sampled at a constant
//! timestep. Rows outside the buffer's [`FreeRange`] are fixed boundary or
//! padding rows; rows inside it are what the optimizer is allowed to move.

pub mod fill;
pub mod resample;
pub mod table;

use nalgebra::{DMatrix, DVector, Dyn, MatrixView, MatrixViewMut, U1};

use crate::PlanningError;

/// Immutable view of one trajectory point (a row)
pub type PointView<'a> = MatrixView<'a, f64, U1, Dyn, U1, Dyn>;
/// Mutable view of one trajectory point (a row)
pub type PointViewMut<'a> = MatrixViewMut<'a, f64, U1, Dyn, U1, Dyn>;

/// Largest point count a buffer may be sized to
pub const MAX_POINTS: usize = 1 << 20;

/// Inclusive index interval of optimizable points
///
/// An empty range is represented by `end + 1 == start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeRange {
    /// First free point
    pub start: usize,
    /// Last free point
    pub end: usize,
}

impl FreeRange {
    /// Create a range; `end + 1 < start` is rejected
    pub fn new(start: usize, end: usize) -> Result<Self, PlanningError> {
        if end.saturating_add(1) < start {
            return Err(PlanningError::InvalidFreeRange {
                start,
                end,
                num_points: 0,
            });
        }
        Ok(FreeRange { start, end })
    }

    /// Number of free points
    pub fn len(&self) -> usize {
        self.end.saturating_add(1).saturating_sub(self.start)
    }

    /// Whether no point is free
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `index` is free
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index <= self.end
    }

    /// Fixed point just before the range; `None` when the range starts at 0
    pub fn lower_boundary(&self) -> Option<usize> {
        self.start.checked_sub(1)
    }

    /// Fixed point just after the range
    pub fn upper_boundary(&self) -> Option<usize> {
        self.end.checked_add(1)
    }
}

/// Fixed-timestep joint trajectory
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryBuffer {
    positions: DMatrix<f64>,
    discretization: f64,
    free: FreeRange,
    source_index: Option<Vec<usize>>,
}

impl TrajectoryBuffer {
    /// Create a zeroed buffer of `num_points` points
    ///
    /// The first and last points are the fixed start and goal; everything in
    /// between is free.
    pub fn new(num_points: usize, discretization: f64, num_joints: usize) -> Result<Self, PlanningError> {
        if num_points < 2 || num_points > MAX_POINTS {
            return Err(PlanningError::InvalidDimensions(format!(
                "need between 2 and {} points, got {}",
                MAX_POINTS, num_points
            )));
        }
        if !(discretization > 0.0) || !discretization.is_finite() {
            return Err(PlanningError::InvalidDimensions(format!(
                "discretization must be positive, got {}",
                discretization
            )));
        }
        if num_joints == 0 {
            return Err(PlanningError::InvalidDimensions("need at least 1 joint".to_string()));
        }

        Ok(TrajectoryBuffer {
            positions: DMatrix::zeros(num_points, num_joints),
            discretization,
            free: FreeRange {
                start: 1,
                end: num_points - 2,
            },
            source_index: None,
        })
    }

    /// Create a zeroed buffer covering `duration` seconds
    ///
    /// `num_points = floor(duration / discretization) + 1`.
    pub fn with_duration(duration: f64, discretization: f64, num_joints: usize) -> Result<Self, PlanningError> {
        if !(duration > 0.0) || !(discretization > 0.0) {
            return Err(PlanningError::InvalidDimensions(format!(
                "duration {} and discretization {} must be positive",
                duration, discretization
            )));
        }
        let steps = (duration / discretization).floor();
        if !steps.is_finite() || steps >= MAX_POINTS as f64 {
            return Err(PlanningError::InvalidDimensions(format!(
                "duration {} at discretization {} exceeds {} points",
                duration, discretization, MAX_POINTS
            )));
        }
        Self::new(steps as usize + 1, discretization, num_joints)
    }

    /// Copy `source` with boundary rows replicated so a finite-difference
    /// stencil of `stencil_width` taps per side has context at both ends
    ///
    /// Padded row `i` is a verbatim copy of source row
    /// `clamp(i - start_extra, 0, n - 1)`; the mapping is kept in
    /// [`source_index`](Self::source_index).
    ///
    /// The free range is the source's shifted by `start_extra`, so its length
    /// never changes. Where the source already has enough context no padding is
    /// added: a stencil width of 1 keeps the source range `1..=n-2` rather than
    /// starting the free range at 0.
    pub fn padded(source: &TrajectoryBuffer, stencil_width: usize) -> Result<Self, PlanningError> {
        if stencil_width == 0 {
            return Err(PlanningError::InvalidDimensions(
                "stencil width must be at least 1".to_string(),
            ));
        }
        let context = stencil_width - 1;
        let last = source.num_points() - 1;
        let start_extra = context.saturating_sub(source.free.start);
        let end_extra = context.saturating_sub(last - source.free.end);
        let num_points = source.num_points() + start_extra + end_extra;

        let mut positions = DMatrix::zeros(num_points, source.num_joints());
        let mut source_index = Vec::with_capacity(num_points);
        for i in 0..num_points {
            let src = i.saturating_sub(start_extra).min(last);
            positions.set_row(i, &source.positions.row(src));
            source_index.push(src);
        }

        log::debug!(
            "Padded {} points to {} (stencil width {}, +{} / +{})",
            source.num_points(),
            num_points,
            stencil_width,
            start_extra,
            end_extra
        );

        Ok(TrajectoryBuffer {
            positions,
            discretization: source.discretization,
            free: FreeRange {
                start: source.free.start + start_extra,
                end: source.free.end + start_extra,
            },
            source_index: Some(source_index),
        })
    }

    /// Number of points
    pub fn num_points(&self) -> usize {
        self.positions.nrows()
    }

    /// Number of joints
    pub fn num_joints(&self) -> usize {
        self.positions.ncols()
    }

    /// Seconds per step
    pub fn discretization(&self) -> f64 {
        self.discretization
    }

    /// Total duration, `(num_points - 1) * discretization`
    pub fn duration(&self) -> f64 {
        (self.num_points() - 1) as f64 * self.discretization
    }

    /// Optimizable interior
    pub fn free_range(&self) -> FreeRange {
        self.free
    }

    /// For padded copies, the source row each row was copied from
    pub fn source_index(&self) -> Option<&[usize]> {
        self.source_index.as_deref()
    }

    /// Whole position matrix
    pub fn positions(&self) -> &DMatrix<f64> {
        &self.positions
    }

    /// Whole position matrix, mutable
    pub fn positions_mut(&mut self) -> &mut DMatrix<f64> {
        &mut self.positions
    }

    /// Point `i`
    pub fn point(&self, i: usize) -> Result<PointView<'_>, PlanningError> {
        self.check_point(i)?;
        Ok(self.positions.row(i))
    }

    /// Point `i`, mutable
    pub fn point_mut(&mut self, i: usize) -> Result<PointViewMut<'_>, PlanningError> {
        self.check_point(i)?;
        Ok(self.positions.row_mut(i))
    }

    /// Overwrite point `i` with one value per joint
    pub fn set_point(&mut self, i: usize, values: &[f64]) -> Result<(), PlanningError> {
        if values.len() != self.num_joints() {
            return Err(PlanningError::JointCountMismatch {
                expected: self.num_joints(),
                actual: values.len(),
            });
        }
        let mut row = self.point_mut(i)?;
        for (j, v) in values.iter().enumerate() {
            row[j] = *v;
        }
        Ok(())
    }

    /// Positions of joint `j` across all points
    pub fn joint_column(&self, j: usize) -> Result<DVector<f64>, PlanningError> {
        if j >= self.num_joints() {
            return Err(PlanningError::IndexOutOfRange {
                index: j,
                len: self.num_joints(),
            });
        }
        Ok(self.positions.column(j).clone_owned())
    }

    /// Copy `other`'s free rows into this buffer's free rows
    ///
    /// Used to merge an optimizer's padded working copy back into the
    /// canonical buffer.
    pub fn update_free_region(&mut self, other: &TrajectoryBuffer) -> Result<(), PlanningError> {
        let ours = self.free;
        let theirs = other.free_range();
        if ours.len() != theirs.len() {
            return Err(PlanningError::SizeMismatch {
                expected: ours.len(),
                actual: theirs.len(),
            });
        }
        if other.num_joints() != self.num_joints() {
            return Err(PlanningError::JointCountMismatch {
                expected: self.num_joints(),
                actual: other.num_joints(),
            });
        }
        for k in 0..ours.len() {
            self.positions
                .set_row(ours.start + k, &other.positions.row(theirs.start + k));
        }
        Ok(())
    }

    /// The fixed points just outside `range`, once it passes [`check_interior`](Self::check_interior)
    pub fn boundaries(&self, range: FreeRange) -> Result<(usize, usize), PlanningError> {
        self.check_interior(range)?;
        match (range.lower_boundary(), range.upper_boundary()) {
            (Some(first), Some(last)) => Ok((first, last)),
            _ => Err(PlanningError::InvalidFreeRange {
                start: range.start,
                end: range.end,
                num_points: self.num_points(),
            }),
        }
    }

    /// Check that `range` lies inside the buffer with a fixed point on each side
    pub fn check_interior(&self, range: FreeRange) -> Result<(), PlanningError> {
        if range.start == 0 || range.end >= self.num_points() - 1 || range.end.saturating_add(1) < range.start {
            return Err(PlanningError::InvalidFreeRange {
                start: range.start,
                end: range.end,
                num_points: self.num_points(),
            });
        }
        Ok(())
    }

    fn check_point(&self, i: usize) -> Result<(), PlanningError> {
        if i >= self.num_points() {
            return Err(PlanningError::IndexOutOfRange {
                index: i,
                len: self.num_points(),
            });
        }
        Ok(())
    }
}
