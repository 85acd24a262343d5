//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads configuration for the working directory
//! 2. Calls the engine to do the work
//! 3. Formats and displays output
//!
//! # Async Commands
//!
//! `report` talks to the tracker over HTTP and is async. Its handler
//! builds a tokio runtime and blocks on the async implementation, so
//! dispatch itself stays synchronous.

mod auth;
mod completion;
mod config_cmd;
mod history;
mod report;

pub use auth::auth;
pub use completion::completion;
pub use config_cmd::show as config_show;
pub use history::history;
pub use report::{report, ReportOptions};

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::cli::args::Command;
use crate::core::config::Config;
use crate::engine::Context;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Report {
            profiles,
            format,
            output,
            no_sync,
        } => report::report(
            ctx,
            &ReportOptions {
                profiles,
                format,
                output,
                sync: !no_sync,
            },
        ),
        Command::History { keys, no_sync } => history::history(ctx, &keys, !no_sync),
        Command::Auth {
            token,
            status,
            logout,
        } => auth::auth(ctx, token.as_deref(), status, logout),
        Command::Config => config_cmd::show(ctx),
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Configuration loaded for a working directory.
pub(crate) struct Workspace {
    pub cwd: PathBuf,
    pub config: Config,
}

impl Workspace {
    /// Load configuration, logging any warnings.
    pub fn load(ctx: &Context) -> Result<Self> {
        let cwd = ctx
            .working_dir()
            .context("Failed to determine working directory")?;
        let loaded =
            Config::load(&cwd, ctx.config.as_deref()).context("Failed to load config")?;

        for warning in &loaded.warnings {
            match &warning.path {
                Some(path) => tracing::warn!(path = %path.display(), "{}", warning.message),
                None => tracing::warn!("{}", warning.message),
            }
        }

        Ok(Self {
            cwd,
            config: loaded.config,
        })
    }

    /// Resolve a possibly relative path against the working directory.
    pub fn resolve(&self, path: &std::path::Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}
