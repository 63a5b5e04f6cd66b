// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "tubewalk")]
#[command(about = "Camera and object placement along a closed tube", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArg {
    /// Session config (JSON); defaults are used when omitted
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print sampled frames and placements as JSON
    Frames {
        #[command(flatten)]
        config: ConfigArg,
        /// Number of evenly spaced samples over [0, 1)
        #[arg(long, default_value_t = 8)]
        samples: usize,
        /// Lateral offset for placements; defaults to the camera offset
        #[arg(long)]
        offset: Option<f64>,
    },
    /// Run a headless session and print one camera pose per line
    Tour {
        #[command(flatten)]
        config: ConfigArg,
        #[arg(long, default_value_t = 120)]
        frames: usize,
        #[arg(long, default_value_t = 30.0)]
        fps: f64,
        /// Request the next stop every this many seconds
        #[arg(long)]
        next_every: Option<f64>,
        /// Directory model URLs are resolved against; models are skipped without it
        #[arg(long)]
        assets: Option<PathBuf>,
        /// Pace frames with the wall clock instead of a simulated timeline
        #[arg(long, default_value = "false")]
        realtime: bool,
    },
    /// Write the tube surface as Wavefront OBJ
    Mesh {
        #[command(flatten)]
        config: ConfigArg,
        #[arg(long, short)]
        out: PathBuf,
    },
}
