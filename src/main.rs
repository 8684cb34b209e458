// SPDX-License-Identifier: GPL-3.0-or-later
use std::io::{self, BufReader};

use anyhow::Context as _;
use structopt::StructOpt;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod alert;
mod app;
mod camera;
mod capture;
mod command;
mod display;
mod error;
mod image_buffer;
mod pipeline;
mod render;
mod settings;
mod temperature;
mod util;

use crate::app::App;
use crate::settings::{Args, Settings};

/// Log to stderr, so stdout stays free for the threshold prompts.
///
/// `RUST_LOG` takes precedence over the verbosity flags.
fn init_tracing(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::from_args();
    init_tracing(args.verbose);
    let settings = Settings::load(&args)?;
    debug!(?settings, "Loaded settings");
    let thresholds = {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        settings
            .thresholds
            .resolve(&mut input, &mut io::stdout())
            .context("Unable to determine the alert thresholds")?
    };
    let commands = command::spawn_reader(BufReader::new(io::stdin()))
        .context("Unable to start reading commands")?;
    App::from_settings(&settings, thresholds, commands)?.run()
}
