//! tubewalk: headless driver for tube frame sampling and camera tours.

mod cli;
mod commands;

use std::io::{self, BufWriter, Write};

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Command};
use commands::TourOptions;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::debug!("tubewalk v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match cli.command {
        Command::Frames {
            config,
            samples,
            offset,
        } => {
            let config = commands::load_config(config.config.as_deref())?;
            commands::frames(&config, samples, offset, &mut out)?;
        }
        Command::Tour {
            config,
            frames,
            fps,
            next_every,
            assets,
            realtime,
        } => {
            let config = commands::load_config(config.config.as_deref())?;
            let options = TourOptions {
                frames,
                fps,
                next_every,
                assets,
                realtime,
            };
            commands::tour(config, &options, &mut out)?;
        }
        Command::Mesh { config, out: path } => {
            let config = commands::load_config(config.config.as_deref())?;
            commands::mesh(&config, &path)?;
        }
    }

    out.flush()?;
    Ok(())
}
