//! report command - Build and print feature trees for each profile

use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};
use chrono::Local;

use super::Workspace;
use crate::engine::{Context, Run};
use crate::report::{self, Format};
use crate::secrets;
use crate::tracker;

/// Options of the report command.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Profiles to run; all when empty.
    pub profiles: Vec<String>,
    /// Format override (`json`, `tsv`, `all`).
    pub format: Option<String>,
    /// Output directory override.
    pub output: Option<PathBuf>,
    /// Sync branches marked `sync = true` before reading history.
    pub sync: bool,
}

/// Run the report command.
pub fn report(ctx: &Context, opts: &ReportOptions) -> Result<()> {
    let ws = Workspace::load(ctx)?;

    let profiles = ws.config.select_profiles(&opts.profiles)?;
    if profiles.is_empty() {
        bail!("No profiles configured. Add [[profiles]] to .featuretrail/config.toml");
    }

    let formats = match &opts.format {
        Some(name) => Format::parse_list(name)?,
        None => ws
            .config
            .output_formats()
            .iter()
            .map(|f| f.parse())
            .collect::<Result<Vec<Format>, _>>()?,
    };

    let output_dir = opts
        .output
        .clone()
        .or_else(|| ws.config.output_dir().map(PathBuf::from))
        .map(|dir| ws.resolve(&dir));

    let tracker = tracker::create_tracker(&ws.config, tracker_token(&ws))?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let mut run = Run::new(tracker.as_ref());
        index_branches(&mut run, &ws, opts.sync);

        for profile in profiles {
            let max_results = ws.config.max_results(profile);
            let outcome = run
                .run_profile(&profile.name, &profile.query, max_results)
                .await
                .with_context(|| format!("Tracker query for profile '{}' failed", profile.name))?;

            for format in &formats {
                match &output_dir {
                    Some(dir) => {
                        let path =
                            report::export(&outcome.forest, &outcome.name, *format, dir, &Local::now())?;
                        if !ctx.quiet {
                            println!("Wrote {}", path.display());
                        }
                    }
                    None => print!("{}", report::render(&outcome.forest, *format)?),
                }
            }

            if !ctx.quiet {
                eprintln!("{}: {}", outcome.name, outcome.summary());
            }
        }
        Ok::<(), anyhow::Error>(())
    })
}

/// Index every configured branch; a failing branch contributes nothing.
fn index_branches(run: &mut Run<'_>, ws: &Workspace, sync: bool) {
    let ignore = ws.config.ignore_patterns();
    for branch in ws.config.branches() {
        if let Err(err) = run.index_branch(branch, &ws.cwd, &ignore, sync) {
            tracing::warn!(branch = %branch.name, "skipping branch history: {}", err);
        }
    }
}

/// Tracker token from the environment or the secret store.
///
/// A broken secret store is logged and treated as "no token".
fn tracker_token(ws: &Workspace) -> Option<String> {
    let store = match secrets::create_store(ws.config.secrets_provider()) {
        Ok(store) => store,
        Err(err) => {
            tracing::warn!("secret store unavailable: {}", err);
            return None;
        }
    };
    match secrets::resolve_token(store.as_ref()) {
        Ok(found) => found.map(|(token, source)| {
            tracing::debug!(?source, "using tracker token");
            token
        }),
        Err(err) => {
            tracing::warn!("cannot read tracker token: {}", err);
            None
        }
    }
}
