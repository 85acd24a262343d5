//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--config <path>`: Use this project config file
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// featuretrail - reassemble tracker tickets found in git history into a feature tree
#[derive(Parser, Debug)]
#[command(name = "ftr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if ftr was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Project config file (default: <cwd>/.featuretrail/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true, conflicts_with = "quiet")]
    pub debug: bool,

    /// Minimal output; only warnings are logged
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build feature trees for the configured profiles
    #[command(
        name = "report",
        long_about = "Build feature trees for the configured profiles.\n\n\
            Reads the commit history of every configured branch, queries the tracker \
            once per profile, keeps the tickets referenced by the history, and groups \
            them under their epics and stories.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Every profile, JSON and TSV to stdout
    ftr report

    # One profile as TSV, written to a directory
    ftr report --profile 7.0.x --format tsv --output reports/

    # Skip checkout/pull of branches marked sync = true
    ftr report --no-sync"
    )]
    Report {
        /// Only run these profiles (repeatable)
        #[arg(long = "profile", short = 'p', value_name = "NAME")]
        profiles: Vec<String>,

        /// Output format: json, tsv, or all
        #[arg(long, short = 'f', value_name = "FORMAT")]
        format: Option<String>,

        /// Write reports into this directory instead of stdout
        #[arg(long, short = 'o', value_name = "DIR")]
        output: Option<PathBuf>,

        /// Do not sync branches before reading history
        #[arg(long)]
        no_sync: bool,
    },

    /// Inspect the git history index
    #[command(
        name = "history",
        after_help = "\
WORKFLOW EXAMPLES:
    # Index statistics
    ftr history

    # Is a ticket referenced, and how?
    ftr history LPS-1234 LPS-99"
    )]
    History {
        /// Ticket keys to look up
        keys: Vec<String>,

        /// Do not sync branches before reading history
        #[arg(long)]
        no_sync: bool,
    },

    /// Manage the stored tracker token
    Auth {
        /// Token to store (prompted for when omitted)
        #[arg(long)]
        token: Option<String>,

        /// Show whether a token is available
        #[arg(long, conflicts_with_all = ["logout", "token"])]
        status: bool,

        /// Remove the stored token
        #[arg(long, conflicts_with = "token")]
        logout: bool,
    },

    /// Show the effective configuration
    Config,

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_report_flags() {
        let cli = Cli::try_parse_from([
            "ftr", "--debug", "report", "-p", "a", "--profile", "b", "--format", "tsv", "--no-sync",
        ])
        .unwrap();

        assert!(cli.debug);
        match cli.command {
            Command::Report {
                profiles,
                format,
                output,
                no_sync,
            } => {
                assert_eq!(profiles, vec!["a", "b"]);
                assert_eq!(format.as_deref(), Some("tsv"));
                assert!(output.is_none());
                assert!(no_sync);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn debug_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["ftr", "--debug", "-q", "config"]).is_err());
    }

    #[test]
    fn status_conflicts_with_logout() {
        assert!(Cli::try_parse_from(["ftr", "auth", "--status", "--logout"]).is_err());
    }
}
