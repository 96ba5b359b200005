use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use springscope::app::{self, PlayOptions};
use springscope::series::SampleSeries;
use springscope::solver;

/// Default simulated duration of the built-in demo series
const DEMO_STOP_TIME: f64 = 10.0;

/// Sample interval of the built-in demo series
const DEMO_STEP: f64 = 0.02;

/// 3D playback and charting for mass-spring-damper simulation results.
#[derive(Parser)]
#[command(name = "springscope")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Solver result file (JSON) - used when no subcommand specified
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the playback window (default behavior)
    Play {
        /// Solver result file (JSON); omit to play the built-in demo series
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Mass magnitude, drives the block's visual scale
        #[arg(long, default_value_t = 1.0)]
        mass: f64,

        /// Rest position shown before playback and after a bare reset
        #[arg(long, default_value_t = -2.0)]
        position: f64,

        /// Start playing immediately instead of waiting for Space
        #[arg(long)]
        autoplay: bool,
    },
    /// Print statistics about a solver result file
    Info {
        /// Solver result file (JSON)
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn load_series(input: Option<&Path>) -> anyhow::Result<(SampleSeries, String)> {
    match input {
        Some(path) => {
            let series = solver::load_result(path)?;
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "result".to_string());
            Ok((series, name))
        }
        None => Ok((
            solver::demo_series(DEMO_STOP_TIME, DEMO_STEP),
            "demo oscillator".to_string(),
        )),
    }
}

fn play(
    input: Option<&Path>,
    mass: f64,
    position: f64,
    autoplay: bool,
) -> anyhow::Result<()> {
    let (series, model_name) = load_series(input)?;
    app::run(PlayOptions {
        series,
        model_name,
        mass,
        initial_position: position,
        autoplay,
    })
}

fn info(input: &Path) -> anyhow::Result<()> {
    let series = solver::load_result(input)?;
    let (mut min, mut max) = (f64::MAX, f64::MIN);
    for &v in series.values() {
        min = min.min(v);
        max = max.max(v);
    }
    println!("{}", input.display());
    println!("  samples:  {}", series.len());
    println!("  duration: {:.3} s", series.duration());
    println!("  position: {min:.4} .. {max:.4} m");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("springscope=info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Play {
            input,
            mass,
            position,
            autoplay,
        }) => {
            play(input.as_deref(), mass, position, autoplay)?;
        }
        Some(Commands::Info { input }) => {
            info(&input)?;
        }
        None => {
            // Default behavior: play the given input, or the demo series
            play(cli.input.as_deref(), 1.0, -2.0, false)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_with_defaults() {
        let cli = Cli::try_parse_from(["springscope"]).unwrap();
        assert!(cli.input.is_none());
        assert!(cli.command.is_none());
    }

    #[test]
    fn cli_parses_play_subcommand() {
        let cli = Cli::try_parse_from([
            "springscope",
            "play",
            "--input",
            "result.json",
            "--mass",
            "2.5",
            "--autoplay",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Play {
                input,
                mass,
                autoplay,
                position,
            }) => {
                assert_eq!(input, Some(PathBuf::from("result.json")));
                assert_eq!(mass, 2.5);
                assert_eq!(position, -2.0);
                assert!(autoplay);
            }
            _ => panic!("Expected Play command"),
        }
    }

    #[test]
    fn cli_parses_info_subcommand() {
        let cli =
            Cli::try_parse_from(["springscope", "info", "--input", "result.json"]).unwrap();
        match cli.command {
            Some(Commands::Info { input }) => {
                assert_eq!(input, PathBuf::from("result.json"));
            }
            _ => panic!("Expected Info command"),
        }
    }

    #[test]
    fn load_series_falls_back_to_demo() {
        let (series, name) = load_series(None).unwrap();
        assert!(series.len() > 1);
        assert_eq!(name, "demo oscillator");
    }

    #[test]
    fn load_series_reports_missing_file() {
        assert!(load_series(Some(Path::new("/nonexistent/result.json"))).is_err());
    }
}
