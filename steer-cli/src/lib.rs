use std::io::Write;
use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use steer_core::{BehaviorMode, Scene, SceneConfig, Vector2};
use steer_shared::FrameReport;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Headless steering behaviour simulation", long_about = None)]
pub struct Args {
    /// Behaviour mode: seek, flee, arrive, wander, pursuit, evade,
    /// collisionAvoidance, pathFollowing, leaderFollowing or queue
    #[arg(short, long)]
    pub mode: Option<BehaviorMode>,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 600)]
    pub frames: u64,

    /// RNG seed (overrides the settings file)
    #[arg(long)]
    pub seed: Option<u64>,

    /// World width (overrides the settings file)
    #[arg(long)]
    pub width: Option<f64>,

    /// World height (overrides the settings file)
    #[arg(long)]
    pub height: Option<f64>,

    /// Target point as X,Y, applied after the scene is set up
    #[arg(short, long, value_parser = parse_point)]
    pub target: Option<Vector2>,

    /// Extra vehicle to add as X,Y (repeatable)
    #[arg(long = "spawn", value_parser = parse_point)]
    pub spawn: Vec<Vector2>,

    /// Write a report every N frames; the last frame is always written
    #[arg(short, long, default_value_t = 1)]
    pub every: u64,

    /// Include wander circles and obstacle threats in reports
    #[arg(long)]
    pub debug_geometry: bool,

    /// JSON settings file
    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses `X,Y` into a point.
pub fn parse_point(s: &str) -> Result<Vector2, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got `{}`", s))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("bad X in `{}`: {}", s, e))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("bad Y in `{}`: {}", s, e))?;
    if !x.is_finite() || !y.is_finite() {
        return Err(format!("point `{}` must be finite", s));
    }
    Ok(Vector2::new(x, y))
}

/// Settings file (or defaults) with command line overrides applied.
pub fn build_config(args: &Args) -> Result<SceneConfig> {
    let mut config = match &args.settings {
        Some(path) => steer_shared::load_settings_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => SceneConfig::default(),
    };

    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }

    steer_shared::validate(&config).context("Invalid settings after command line overrides")?;
    Ok(config)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub reports: u64,
    pub agents: usize,
}

/// Runs the simulation described by `args`, writing one JSON report per line to `out`.
pub fn run<W: Write>(args: &Args, out: &mut W) -> Result<RunSummary> {
    ensure!(args.every > 0, "--every must be at least 1");

    let config = build_config(args)?;
    log::info!(
        "Simulating {} frames of {} in a {}x{} world (seed {})",
        args.frames,
        config.mode,
        config.width,
        config.height,
        config.seed
    );

    let mut scene = Scene::new(config);
    if let Some(target) = args.target {
        scene.set_target(target);
    }
    for &position in &args.spawn {
        scene.spawn(position);
    }

    let mut reports = 0;
    for frame in 1..=args.frames {
        scene.update();

        if frame % args.every == 0 || frame == args.frames {
            let line = FrameReport::capture(&scene, args.debug_geometry)
                .to_json_line()
                .context("Failed to encode frame report")?;
            writeln!(out, "{}", line).context("Failed to write frame report")?;
            reports += 1;
        }
    }
    out.flush().context("Failed to flush output")?;

    let summary = RunSummary {
        frames: scene.frame(),
        reports,
        agents: scene.agents().len(),
    };
    log::info!("Done: {:?}", summary);
    Ok(summary)
}
