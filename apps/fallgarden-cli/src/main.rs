use anyhow::Context;
use clap::{Parser, Subcommand};
use fallgarden_lighting::{EventConfig, LightingRig};
use fallgarden_persist::ProgramState;
use fallgarden_render::{
    CameraView, RecordingBackend, SCREEN_HEIGHT, SCREEN_WIDTH, SceneAssets, SceneSession,
};
use fallgarden_scene::Species;
use fallgarden_tools::SceneInspector;
use glam::{Mat4, Vec3};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fallgarden-cli", about = "Headless tools for the garden scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Resources directory the scene paths are resolved against
    #[arg(long, default_value = "resources", global = true)]
    resources: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version, species and event tuning
    Info,
    /// Print the generated scene layout
    Layout {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Step the lighting event with a scripted camera
    Simulate {
        /// Camera start position
        #[arg(
            long,
            required = true,
            num_args = 3,
            value_names = ["X", "Y", "Z"],
            allow_negative_numbers = true
        )]
        camera: Vec<f32>,
        /// Simulated duration in seconds
        #[arg(long, default_value = "10")]
        seconds: f32,
        /// Time step in seconds
        #[arg(long, default_value = "0.5")]
        step: f32,
        /// Move the camera linearly to above the origin over the run
        #[arg(long)]
        approach: bool,
        /// Print the recorded draw commands of the last frame
        #[arg(long)]
        commands: bool,
        /// Override the trigger radius around the origin
        #[arg(long)]
        trigger_radius: Option<f32>,
        /// Override the blend ramp duration in seconds
        #[arg(long)]
        ramp: Option<f32>,
    },
    /// Validate and print a program state file
    State {
        #[arg(long)]
        file: PathBuf,
    },
}

fn load_session(
    backend: &mut RecordingBackend,
    resources: &Path,
    rig: LightingRig,
) -> anyhow::Result<SceneSession> {
    let assets = SceneAssets::load(backend, resources).context("loading scene assets")?;
    backend.clear();
    Ok(SceneSession::new(assets, rig))
}

fn camera_view(position: Vec3) -> CameraView {
    let target = Vec3::new(0.0, position.y, 0.0);
    let view = if position.abs_diff_eq(target, 1e-4) {
        Mat4::look_to_rh(position, Vec3::NEG_Z, Vec3::Y)
    } else {
        Mat4::look_at_rh(position, target, Vec3::Y)
    };
    CameraView {
        position,
        view,
        projection: Mat4::perspective_rh(
            45.0_f32.to_radians(),
            SCREEN_WIDTH as f32 / SCREEN_HEIGHT as f32,
            0.1,
            100.0,
        ),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            println!("fallgarden-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("Species:");
            for species in Species::ALL {
                println!("  {:<14} {}", species.name(), species.model_path());
            }
            let c = EventConfig::default();
            println!(
                "Event: trigger r^2<{} ramp={}s damping={:.3} orbit r={} h={} rate={}",
                c.trigger_distance_sq,
                c.ramp_seconds,
                c.damping,
                c.orbit_radius,
                c.orbit_height,
                c.orbit_rate
            );
        }
        Commands::Layout { json } => {
            let mut backend = RecordingBackend::new();
            let session = load_session(&mut backend, &cli.resources, LightingRig::new())?;
            let species_of: BTreeMap<_, _> = session
                .assets()
                .models
                .iter()
                .map(|(species, model)| (*model, *species))
                .collect();

            if json {
                let entries: Vec<_> = session
                    .layout()
                    .iter()
                    .map(|(instance, transform)| {
                        serde_json::json!({
                            "species": species_of.get(&instance.model).map(|s| s.name()),
                            "instance": instance,
                            "transform": transform.to_cols_array(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                println!("Layout: {} instances", session.layout().len());
                for (i, (instance, _)) in session.layout().iter().enumerate() {
                    let t = instance.translation;
                    let name = species_of.get(&instance.model).map_or("?", |s| s.name());
                    println!(
                        "{i:>3} {name:<14} pos=({:.2}, {:.2}, {:.2}) scale={:.4}{}",
                        t.x,
                        t.y,
                        t.z,
                        instance.scale.x,
                        if instance.cull_back_faces { " [culled]" } else { "" }
                    );
                }
            }
        }
        Commands::Simulate {
            camera,
            seconds,
            step,
            approach,
            commands,
            trigger_radius,
            ramp,
        } => {
            anyhow::ensure!(step > 0.0, "step must be positive");
            let mut config = EventConfig::default();
            if let Some(radius) = trigger_radius {
                config.trigger_distance_sq = radius * radius;
            }
            if let Some(ramp) = ramp {
                anyhow::ensure!(ramp > 0.0, "ramp must be positive");
                config.ramp_seconds = ramp;
            }
            let start = Vec3::from_slice(&camera);
            let end = Vec3::new(0.0, start.y, 0.0);

            let mut backend = RecordingBackend::new();
            let mut session = load_session(
                &mut backend,
                &cli.resources,
                LightingRig::with_config(config),
            )?;

            let c = session.rig().config();
            println!(
                "Simulating {seconds}s in {step}s steps from ({}, {}, {}), trigger r^2<{} ramp={}s",
                start.x, start.y, start.z, c.trigger_distance_sq, c.ramp_seconds
            );
            let steps = (seconds / step).floor() as u32;
            let mut lighting = None;
            for i in 0..=steps {
                let t = i as f32 * step;
                let position = if approach && seconds > 0.0 {
                    start.lerp(end, (t / seconds).min(1.0))
                } else {
                    start
                };
                backend.clear();
                let frame =
                    session.render_frame(&mut backend, t, &camera_view(position), Vec3::ZERO);
                let p = frame.point.position;
                println!(
                    "t={t:>6.2} cam=({:>6.2}, {:>6.2}) {} coef={:.3} point=({:.2}, {:.2}, {:.2}) dir={:.3}",
                    position.x,
                    position.z,
                    if frame.triggered { "fallen " } else { "dormant" },
                    frame.coef,
                    p.x,
                    p.y,
                    p.z,
                    frame.dir.diffuse.x
                );
                lighting = Some(frame);
            }

            if let Some(lighting) = lighting {
                println!();
                println!("{}", SceneInspector::summary(&session, &lighting));
            }
            if commands {
                println!();
                print!("{}", backend.to_text());
            }
        }
        Commands::State { file } => {
            let state = ProgramState::load(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let c = state.clear_color;
            let p = state.camera_position;
            let f = state.camera_front;
            println!("clear color:     ({}, {}, {})", c.x, c.y, c.z);
            println!("overlay:         {}", if state.overlay_enabled { "on" } else { "off" });
            println!("camera position: ({}, {}, {})", p.x, p.y, p.z);
            println!("camera front:    ({}, {}, {})", f.x, f.y, f.z);
        }
    }

    Ok(())
}
