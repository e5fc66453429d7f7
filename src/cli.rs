use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Run the ball pit without a browser.
#[derive(Parser, Debug)]
#[command(name = "ballpit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (.yaml, .yml or .json)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Simulate a number of frames and report on the result
    Run(RunArgs),
    /// Print the effective configuration as YAML
    Config,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Viewport width in CSS pixels
    #[arg(long, default_value_t = 1000)]
    pub width: u32,

    /// Viewport height in CSS pixels
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// Device pixel ratio
    #[arg(long, default_value_t = 1.0)]
    pub dpr: f64,

    /// Frames to simulate
    #[arg(short, long, default_value_t = 120)]
    pub ticks: u64,

    /// Random seed (overrides the config file)
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Pointer position X,Y in canvas-local pixels
    #[arg(long, value_parser = parse_pair::<f32>)]
    pub pointer: Option<(f32, f32)>,

    /// Extra viewport WxH applied during the run (repeatable)
    #[arg(long = "resize", value_parser = parse_size)]
    pub resizes: Vec<(u32, u32)>,

    /// Print an ASCII preview of the last frame
    #[arg(long)]
    pub preview: bool,
}

fn parse_pair<T: std::str::FromStr>(value: &str) -> Result<(T, T), String> {
    let (a, b) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{value}'"))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<T>()
            .map_err(|_| format!("'{s}' is not a number"))
    };
    Ok((parse(a)?, parse(b)?))
}

fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH but got '{value}'"))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<u32>()
            .map_err(|_| format!("'{s}' is not a size"))
    };
    Ok((parse(w)?, parse(h)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_run_with_defaults() {
        let cli = Cli::try_parse_from(["ballpit", "run"]).unwrap();
        assert!(cli.config.is_none());
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.width, 1000);
                assert_eq!(args.height, 800);
                assert_eq!(args.dpr, 1.0);
                assert_eq!(args.ticks, 120);
                assert!(args.seed.is_none());
                assert!(args.pointer.is_none());
                assert!(args.resizes.is_empty());
                assert!(!args.preview);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn cli_parses_run_options() {
        let cli = Cli::try_parse_from([
            "ballpit", "run", "--width", "640", "--height", "480", "--dpr", "2", "--ticks",
            "10", "--seed", "7", "--pointer", "12.5,40", "--resize", "800x600", "--resize",
            "1200X900", "--preview",
        ])
        .unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.width, 640);
                assert_eq!(args.dpr, 2.0);
                assert_eq!(args.ticks, 10);
                assert_eq!(args.seed, Some(7));
                assert_eq!(args.pointer, Some((12.5, 40.0)));
                assert_eq!(args.resizes, vec![(800, 600), (1200, 900)]);
                assert!(args.preview);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn cli_parses_global_config() {
        let cli = Cli::try_parse_from(["ballpit", "config", "--config", "pit.yaml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("pit.yaml")));
        assert!(matches!(cli.command, Commands::Config));
    }

    #[test]
    fn cli_rejects_malformed_pointer() {
        assert!(Cli::try_parse_from(["ballpit", "run", "--pointer", "12"]).is_err());
        assert!(Cli::try_parse_from(["ballpit", "run", "--resize", "800by600"]).is_err());
    }

    #[test]
    fn cli_requires_a_subcommand() {
        assert!(Cli::try_parse_from(["ballpit"]).is_err());
    }
}
