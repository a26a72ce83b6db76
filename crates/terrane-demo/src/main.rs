//! Headless terrain streaming demo.
//!
//! Loads `config.ron` (CLI flags override it), then flies a scripted observer
//! across the terrain at a fixed 60 Hz, logging what the streamer produces.
//! Run with `cargo run -p terrane-demo -- --ticks 600 --seed 7`.

mod fixed_step;
mod scene;
mod setup;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use glam::{Vec2, Vec3};
use terrane_config::{CliArgs, Config};
use terrane_input::{AxisKeyframe, FlightRig, FlightSettings, ScriptedAxes};
use terrane_stream::Observer;
use tracing::{debug, error, info};

use crate::fixed_step::{FIXED_DT, FixedStep};
use crate::scene::Scene;

/// Fixed steps between statistics lines.
const STATS_INTERVAL: u64 = 120;

#[derive(Parser, Debug)]
#[command(name = "terrane-demo", about = "Stream procedural terrain around a scripted flight")]
struct DemoArgs {
    #[command(flatten)]
    cli: CliArgs,

    /// Number of 60 Hz steps to simulate.
    #[arg(long, default_value_t = 1800)]
    ticks: u64,

    /// Observer speed in world units per second.
    #[arg(long, default_value_t = 120.0)]
    speed: f32,
}

/// Cruise, bank right, cruise, climb while turning left, repeat.
fn flight_script() -> ScriptedAxes {
    ScriptedAxes::new(
        vec![
            AxisKeyframe::new(6.0, Vec2::ZERO, Vec2::Y),
            AxisKeyframe::new(1.5, Vec2::X, Vec2::Y),
            AxisKeyframe::new(6.0, Vec2::ZERO, Vec2::Y),
            AxisKeyframe::new(1.5, Vec2::new(-0.8, 0.5), Vec2::new(0.3, 1.0)),
        ],
        true,
    )
}

fn config_dir(args: &CliArgs) -> PathBuf {
    args.config.clone().unwrap_or_else(|| {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("terrane")
    })
}

fn main() -> ExitCode {
    let args = DemoArgs::parse();
    let config_dir = config_dir(&args.cli);

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args.cli);

    let log_dir = config_dir.join("logs");
    terrane_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    match run(&config, &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("demo failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config, args: &DemoArgs) -> Result<(), setup::SetupError> {
    let mut streamer = setup::build_streamer(config)?;
    let (min_height, max_height) = config.terrain.height_range().unwrap_or((0.0, 0.0));
    info!(
        seed = config.noise.height.seed,
        chunk_cells = config.terrain.chunk_cells(),
        min_height,
        max_height,
        ticks = args.ticks,
        "starting flight"
    );

    let mut axes = flight_script();
    let mut rig = FlightRig::new(
        FlightSettings {
            move_speed: args.speed,
            ..FlightSettings::default()
        },
        Vec3::new(0.0, max_height, 0.0),
    );
    let mut scene = Scene::default();
    let mut clock = FixedStep::new();

    while clock.step_count() < args.ticks {
        clock.tick(|dt, _| {
            let dt = dt as f32;
            axes.advance(dt);
            rig.update(&axes, dt);
            let events = streamer.tick(&Observer::at(rig.position));
            scene.apply_all(&events);
        });

        let step = clock.step_count();
        if step > 0 && step % STATS_INTERVAL == 0 {
            let stats = streamer.stats();
            info!(
                step,
                x = rig.position.x,
                z = rig.position.z,
                yaw = rig.yaw,
                chunks = stats.chunks,
                visible = scene.visible_chunks(),
                triangles = scene.visible_triangles(),
                colliders = scene.colliders(),
                fauna = scene.active_fauna(),
                uploaded_bytes = scene.uploaded_bytes(),
                in_flight = streamer.jobs_in_flight(),
                "streaming"
            );
        }
        std::thread::sleep(Duration::from_secs_f64(FIXED_DT / 4.0));
    }

    let stats = streamer.stats();
    info!(
        sim_seconds = clock.total_sim_time(),
        chunks = stats.chunks,
        map_requests = stats.map_requests,
        mesh_requests = stats.mesh_requests,
        completions = stats.completions,
        coalesced = stats.coalesced,
        deferred = stats.deferred,
        failed_jobs = stats.failed_jobs,
        visibility_passes = stats.visibility_passes,
        evicted = stats.evicted,
        mesh_swaps = scene.mesh_swaps(),
        uploaded_bytes = scene.uploaded_bytes(),
        unclassified_cells = stats.unclassified_cells,
        "flight finished"
    );
    if let Some((low, high)) = scene.visible_height_span() {
        debug!(low, high, "visible height span");
    }
    Ok(())
}
