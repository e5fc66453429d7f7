use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ballpit::headless::{self, RunOptions};
use ballpit::viewport::MAX_BACKING_PIXELS;
use ballpit::{SimulationConfig, Viewport};

mod cli;

use cli::{Cli, Commands, RunArgs};

const PREVIEW_COLUMNS: usize = 80;

fn load_config(cli: &Cli) -> anyhow::Result<SimulationConfig> {
    match &cli.config {
        Some(path) => SimulationConfig::from_path(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(SimulationConfig::default()),
    }
}

fn run(mut config: SimulationConfig, args: &RunArgs) -> anyhow::Result<()> {
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    let viewport = Viewport::new(args.width, args.height, args.dpr);
    let resizes: Vec<Viewport> = args
        .resizes
        .iter()
        .map(|&(w, h)| Viewport::new(w, h, args.dpr))
        .collect();
    for candidate in std::iter::once(&viewport).chain(&resizes) {
        if candidate.width == 0 || candidate.height == 0 {
            anyhow::bail!(
                "viewport must be at least 1x1, got {}x{}",
                candidate.width,
                candidate.height
            );
        }
        if !candidate.fits_backing_limit() {
            anyhow::bail!(
                "viewport {}x{} at pixel ratio {} needs {} device pixels, more than the limit of {}",
                candidate.width,
                candidate.height,
                candidate.device_pixel_ratio,
                candidate.backing_pixels(),
                MAX_BACKING_PIXELS
            );
        }
    }

    let options = RunOptions {
        ticks: args.ticks,
        pointer: args.pointer,
        resizes,
    };

    let output = headless::run(config, viewport, &options);
    let report = &output.report;
    println!(
        "Simulated {} frames of {} particles (k = {:.2}, alpha = {:.3}, {} dataset(s) generated)",
        report.frames, report.particles, report.scale, report.alpha, report.regenerations
    );
    if let Some((x, y)) = report.anchor {
        println!("Anchor at ({x:.1}, {y:.1}), {} pixels covered", report.covered_pixels);
    }
    if args.preview {
        println!("{}", headless::ascii_preview(&output.surface, PREVIEW_COLUMNS));
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Run(args) => run(config, args)?,
        Commands::Config => print!("{}", config.to_yaml()?),
    }

    Ok(())
}
