//! cli
//!
//! Command-line interface layer for featuretrail.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Initialize logging
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to
//! handlers that load configuration and drive the [`crate::engine`].
//! Logs go to stderr so report output on stdout stays clean.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use crate::engine;
use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.debug, cli.quiet);

    let ctx = engine::Context {
        cwd: cli.cwd.clone(),
        config: cli.config.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
    };

    commands::dispatch(cli.command, &ctx)
}

/// Log filter: `RUST_LOG` if set, else derived from the global flags.
fn log_filter(debug: bool, quiet: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let directive = if debug {
        "featuretrail=debug"
    } else if quiet {
        "warn"
    } else {
        "featuretrail=info"
    };
    EnvFilter::new(directive)
}

fn init_tracing(debug: bool, quiet: bool) {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(debug))
        .with(log_filter(debug, quiet))
        .try_init();
}
