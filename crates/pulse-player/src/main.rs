//! Pulse - beating-heart particle demos
//!
//! Opens a window and plays one of the heart scenes.
//!
//! Usage:
//!   pulse [--scene <name>] [--config <pulse.toml>] [--width W] [--height H]
//!         [--particles N] [--seed S] [--list]

use anyhow::{Context, Result};
use clap::Parser;
use pulse_player::config::CliOverrides;
use pulse_player::scenes::SCENE_NAMES;
use pulse_player::{PlayerApp, PulseConfig};
use std::path::PathBuf;
use winit::event_loop::{ControlFlow, EventLoop};

#[derive(Parser)]
#[command(name = "pulse")]
#[command(about = "Beating-heart particle demos")]
struct Args {
    /// Scene to start with (see --list)
    #[arg(long)]
    scene: Option<String>,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Window width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Window height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Particle count for the scene's main field
    #[arg(long)]
    particles: Option<usize>,

    /// Seed for particle placement
    #[arg(long)]
    seed: Option<u32>,

    /// Print the available scenes and exit
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.list {
        for name in SCENE_NAMES {
            println!("{name}");
        }
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => PulseConfig::load(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => PulseConfig::default(),
    };
    config.apply_overrides(CliOverrides {
        scene: args.scene,
        width: args.width,
        height: args.height,
        particles: args.particles,
        seed: args.seed,
    });
    config.validate().context("Invalid configuration")?;

    println!("Scene: {}", config.window.scene);
    println!();
    println!("Controls:");
    println!("  Up/Down     - Faster / slower heartbeat");
    println!("  Tab/Right   - Next scene");
    println!("  Left        - Previous scene");
    println!("  Escape      - Exit");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = PlayerApp::new(config)?;
    event_loop.run_app(&mut app)?;

    match app.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
