// tests/trajectory_tests.rs
// Buffer sizing, padding, resampling and fill behaviour through the public API.

use rstest::rstest;
use std::collections::HashMap;

use trajseed::robot::{JointLimits, RobotModel};
use trajseed::trajectory::fill::{Interpolation, MinJerkSegment};
use trajseed::trajectory::resample::{resample, resample_indices};
use trajseed::trajectory::table;
use trajseed::{JointKind, JointModel, PlanningError, RobotState, TrajectoryBuffer};

fn two_joint_model() -> RobotModel {
    let joints = vec![
        JointModel {
            name: "base".to_string(),
            kind: JointKind::Revolute { continuous: false },
            variable_index: 0,
            limits: Some(JointLimits { min: -3.0, max: 3.0 }),
        },
        JointModel {
            name: "slide".to_string(),
            kind: JointKind::Prismatic,
            variable_index: 1,
            limits: Some(JointLimits { min: 0.0, max: 1.0 }),
        },
    ];
    let mut groups = HashMap::new();
    groups.insert("pair".to_string(), vec!["base".to_string(), "slide".to_string()]);
    RobotModel::new(joints, groups)
}

#[test]
fn default_timing_gives_89_points() {
    let buffer = TrajectoryBuffer::with_duration(3.0, 0.03409, 7).unwrap();
    assert_eq!(buffer.num_points(), 89);
    assert_eq!(buffer.num_joints(), 7);
    let free = buffer.free_range();
    assert_eq!((free.start, free.end), (1, 87));
}

#[rstest]
#[case(1.0, 0.1)]
#[case(2.5, 0.03)]
#[case(0.2, 0.05)]
#[case(10.0, 0.25)]
fn point_count_covers_duration(#[case] duration: f64, #[case] discretization: f64) {
    let buffer = TrajectoryBuffer::with_duration(duration, discretization, 3).unwrap();
    let expected = (duration / discretization).floor() as usize + 1;
    assert_eq!(buffer.num_points(), expected);
    assert!(buffer.duration() <= duration + 1e-9);
    assert!(buffer.duration() + discretization > duration);
}

#[test]
fn too_short_duration_is_rejected() {
    let result = TrajectoryBuffer::with_duration(0.01, 0.1, 2);
    assert!(matches!(result, Err(PlanningError::InvalidDimensions(_))));
}

#[rstest]
#[case(1e30, 0.001)]
#[case(f64::INFINITY, 0.03409)]
#[case(3.0, f64::MIN_POSITIVE)]
fn unbounded_point_counts_are_rejected(#[case] duration: f64, #[case] discretization: f64) {
    assert!(matches!(
        TrajectoryBuffer::with_duration(duration, discretization, 1),
        Err(PlanningError::InvalidDimensions(_))
    ));
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(4)]
#[case(5)]
#[case(9)]
fn padding_gives_stencil_context(#[case] stencil_width: usize) {
    let mut source = TrajectoryBuffer::new(10, 0.1, 2).unwrap();
    for i in 0..10 {
        source.set_point(i, &[i as f64, -(i as f64)]).unwrap();
    }

    let padded = TrajectoryBuffer::padded(&source, stencil_width).unwrap();
    let free = padded.free_range();
    let context = stencil_width - 1;
    assert!(free.start >= context);
    assert!(padded.num_points() - 1 - free.end >= context);
    assert_eq!(free.len(), source.free_range().len());

    let mapping = padded.source_index().unwrap();
    assert_eq!(mapping.len(), padded.num_points());
    for (i, &src) in mapping.iter().enumerate() {
        assert_eq!(padded.point(i).unwrap(), source.point(src).unwrap());
    }
    // interior rows line up one-to-one with the source's free rows
    for (offset, i) in (free.start..=free.end).enumerate() {
        assert_eq!(mapping[i], source.free_range().start + offset);
    }
}

#[test]
fn padded_free_region_writes_back() {
    let source = TrajectoryBuffer::new(6, 0.1, 1).unwrap();
    let mut padded = TrajectoryBuffer::padded(&source, 4).unwrap();
    let free = padded.free_range();
    for i in free.start..=free.end {
        padded.set_point(i, &[7.0]).unwrap();
    }

    let mut target = TrajectoryBuffer::new(6, 0.1, 1).unwrap();
    target.update_free_region(&padded).unwrap();
    assert_eq!(target.point(0).unwrap()[0], 0.0);
    for i in 1..5 {
        assert_eq!(target.point(i).unwrap()[0], 7.0);
    }
    assert_eq!(target.point(5).unwrap()[0], 0.0);
}

#[rstest]
#[case(2, 2)]
#[case(3, 89)]
#[case(10, 89)]
#[case(89, 89)]
#[case(200, 89)]
#[case(7, 5)]
fn resampling_is_ordered_and_exact_length(#[case] source_len: usize, #[case] target_len: usize) {
    let indices = resample_indices(source_len, target_len).unwrap();
    assert_eq!(indices.len(), target_len);
    assert_eq!(indices[0], 0);
    assert!(indices.windows(2).all(|w| w[0] <= w[1]));
    assert!(indices.iter().all(|&i| i < source_len));
    if source_len <= target_len {
        assert_eq!(*indices.last().unwrap(), source_len - 1);
    }
}

#[test]
fn stretching_ten_waypoints_onto_89_points() {
    let indices = resample_indices(10, 89).unwrap();
    for waypoint in 0..10 {
        let copies = indices.iter().filter(|&&i| i == waypoint).count();
        let expected = if waypoint < 9 { 9 } else { 8 };
        assert_eq!(copies, expected, "waypoint {}", waypoint);
    }
}

#[test]
fn single_waypoint_cannot_be_resampled() {
    assert!(matches!(
        resample_indices(1, 89),
        Err(PlanningError::InsufficientWaypoints(1))
    ));
}

#[test]
fn resample_projects_group_joints() {
    let model = two_joint_model();
    let group = model.group("pair").unwrap();
    let waypoints: Vec<RobotState> = (0..4)
        .map(|i| RobotState::from_positions(vec![i as f64 * 0.5, i as f64 * 0.1]))
        .collect();

    let mut buffer = TrajectoryBuffer::new(8, 0.1, 2).unwrap();
    resample(&waypoints, &group, &mut buffer).unwrap();
    assert_eq!(buffer.point(0).unwrap()[0], 0.0);
    assert_eq!(buffer.point(1).unwrap()[0], 0.0);
    assert_eq!(buffer.point(2).unwrap()[0], 0.5);
    assert!((buffer.point(7).unwrap()[1] - 0.3).abs() < 1e-12);
}

#[test]
fn seed_without_every_group_variable_is_rejected() {
    let model = two_joint_model();
    let group = model.group("pair").unwrap();
    let waypoints = vec![RobotState::from_positions(vec![0.5]); 3];

    let mut buffer = TrajectoryBuffer::new(8, 0.1, 2).unwrap();
    assert!(matches!(
        resample(&waypoints, &group, &mut buffer),
        Err(PlanningError::JointCountMismatch { expected: 2, actual: 1 })
    ));
}

#[test]
fn min_jerk_segment_starts_and_ends_at_rest() {
    let segment = MinJerkSegment::new(-1.0, 2.0, 1.5);
    assert!((segment.position(0.0) + 1.0).abs() < 1e-12);
    assert!((segment.position(1.5) - 2.0).abs() < 1e-9);
    for t in [0.0, 1.5] {
        assert!(segment.velocity(t).abs() < 1e-9);
        assert!(segment.acceleration(t).abs() < 1e-9);
    }
    assert!((segment.position(0.75) - 0.5).abs() < 1e-9);
}

#[rstest]
#[case(Interpolation::Linear)]
#[case(Interpolation::Cubic)]
#[case(Interpolation::MinimumJerk)]
fn fills_keep_boundaries(#[case] interpolation: Interpolation) {
    let mut buffer = TrajectoryBuffer::new(20, 0.05, 2).unwrap();
    buffer.set_point(0, &[0.0, 1.0]).unwrap();
    buffer.set_point(19, &[1.0, -1.0]).unwrap();

    let range = buffer.free_range();
    interpolation.apply(&mut buffer, range).unwrap();
    assert_eq!(buffer.point(0).unwrap()[0], 0.0);
    assert_eq!(buffer.point(0).unwrap()[1], 1.0);
    assert_eq!(buffer.point(19).unwrap()[0], 1.0);
    assert_eq!(buffer.point(19).unwrap()[1], -1.0);
    assert!(buffer.positions().iter().all(|v| v.is_finite()));
}

#[test]
fn minimum_jerk_fill_is_monotone_between_boundaries() {
    let mut buffer = TrajectoryBuffer::new(30, 0.1, 1).unwrap();
    buffer.set_point(29, &[2.0]).unwrap();
    let range = buffer.free_range();
    Interpolation::MinimumJerk.apply(&mut buffer, range).unwrap();

    let column = buffer.joint_column(0).unwrap();
    assert!(column.as_slice().windows(2).all(|w| w[0] <= w[1] + 1e-12));
    assert!((column[15] - 1.0).abs() < 0.1);
}

#[test]
fn table_round_trip_keeps_precision() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seed.csv");
    let mut buffer = TrajectoryBuffer::new(3, 0.1, 2).unwrap();
    buffer.set_point(1, &[0.123456789, -2.5]).unwrap();

    table::write_matrix(&path, buffer.positions(), ';', 4).unwrap();
    let read = table::read_matrix(&path, ';', 4).unwrap();
    assert_eq!(read.shape(), (3, 2));
    assert!((read[(1, 0)] - 0.1235).abs() < 1e-12);
    assert_eq!(read[(1, 1)], -2.5);
}
