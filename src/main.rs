// src/main.rs
// Command-line driver: loads a planner configuration and a scenario, plans the
// request with a pass-through optimizer and optionally writes the positions.

use clap::Parser;
use log::{error, info};
use nalgebra::DMatrix;
use serde::Deserialize;
use std::error::Error;
use std::path::PathBuf;

use trajseed::trajectory::table;
use trajseed::{
    MotionPlanRequest, OptimizerContext, OptimizerFactory, OptimizerParameters, PlannedTrajectory,
    Planner, PlannerConfig, RobotModel, RobotState, StaticScene, TrajectoryBuffer,
};

/// Trajectory seeding CLI
#[derive(Parser, Debug)]
#[command(name = "trajseed", about = "Seed and gate joint-space trajectories.")]
struct Args {
    /// Planner configuration (YAML)
    #[arg(short, long, default_value = "config/planner.yaml")]
    config: PathBuf,

    /// Scenario holding the robot model and the request (YAML)
    #[arg(short, long)]
    scenario: PathBuf,

    /// Write the planned positions here, one point per line
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct Scenario {
    model: RobotModel,
    #[serde(default)]
    current_state: Option<RobotState>,
    request: MotionPlanRequest,
}

/// Accepts the initial trajectory unchanged
struct SeedOnly;

impl OptimizerContext for SeedOnly {
    fn initialize(&mut self) -> bool {
        true
    }

    fn optimize(&mut self, _trajectory: &mut TrajectoryBuffer) -> bool {
        true
    }

    fn is_collision_free(&self) -> bool {
        true
    }
}

struct SeedOnlyFactory;

impl OptimizerFactory for SeedOnlyFactory {
    fn create(
        &self,
        _group: &str,
        _parameters: &OptimizerParameters,
        _trajectory: &TrajectoryBuffer,
        _start_state: &RobotState,
    ) -> Box<dyn OptimizerContext> {
        Box::new(SeedOnly)
    }
}

fn positions_matrix(trajectory: &PlannedTrajectory) -> DMatrix<f64> {
    let rows = trajectory.waypoints.len();
    let cols = trajectory.joint_names.len();
    DMatrix::from_fn(rows, cols, |i, j| trajectory.waypoints[i].positions[j])
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let config = PlannerConfig::from_yaml_file(&args.config)?;

    let document = std::fs::read_to_string(&args.scenario)?;
    let scenario: Scenario = serde_yaml::from_str(&document)?;
    let scene = match scenario.current_state {
        Some(state) => StaticScene::new(scenario.model, state),
        None => StaticScene::at_rest(scenario.model),
    };

    let parameters = config.optimizer.clone();
    let mut planner = Planner::new(config, Box::new(SeedOnlyFactory));
    let response = planner.solve(Some(&scene), &scenario.request, &parameters);
    info!(
        "Planning finished with {:?} ({}) in {:.4} s",
        response.error_code,
        response.error_code.value(),
        response.processing_time
    );

    let Some(trajectory) = response.trajectory else {
        error!("No trajectory produced for group '{}'", scenario.request.group_name);
        return Err(format!("planning failed: {:?}", response.error_code).into());
    };

    info!(
        "{} waypoints over {:.2} s for joints {:?}",
        trajectory.waypoints.len(),
        trajectory.duration(),
        trajectory.joint_names
    );
    if let Some(last) = trajectory.last_waypoint() {
        info!("Final positions: {:?}", last.positions);
    }

    if let Some(path) = &args.output {
        let precision = planner.config().prebaked.as_ref().map_or(8, |p| p.precision);
        table::write_matrix(path, &positions_matrix(&trajectory), ',', precision)?;
        info!("Wrote positions to {}", path.display());
    }
    Ok(())
}
