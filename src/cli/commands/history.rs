//! history command - Inspect the git history index
//!
//! Without keys, prints per-branch and index statistics. With keys, prints
//! one line per key telling whether and how it is referenced:
//!
//! ```text
//! LPS-1       exact
//! LPS-3       substring
//! LPS-9       absent
//! ```

use anyhow::{bail, Result};

use super::Workspace;
use crate::core::types::IssueKey;
use crate::engine::{self, Context, GitHistoryIndex};

/// Run the history command.
pub fn history(ctx: &Context, keys: &[String], sync: bool) -> Result<()> {
    let ws = Workspace::load(ctx)?;

    let keys: Vec<IssueKey> = keys
        .iter()
        .map(|k| IssueKey::new(k.as_str()))
        .collect::<Result<_, _>>()?;

    if ws.config.branches().is_empty() {
        bail!("No branches configured. Add [[branches]] to .featuretrail/config.toml");
    }

    let ignore = ws.config.ignore_patterns();
    let mut index = GitHistoryIndex::new();
    for branch in ws.config.branches() {
        match engine::index_branch(&mut index, branch, &ws.cwd, &ignore, sync) {
            Ok(stats) => {
                if keys.is_empty() && !ctx.quiet {
                    println!(
                        "{:<16} {:<24} {:>6} commits {:>6} indexed",
                        branch.name,
                        branch.range(),
                        stats.commits,
                        stats.kept
                    );
                }
            }
            Err(err) => tracing::warn!(branch = %branch.name, "skipping branch history: {}", err),
        }
    }

    if keys.is_empty() {
        println!(
            "{} subjects under {} distinct tokens",
            index.line_count(),
            index.len()
        );
        return Ok(());
    }

    for key in &keys {
        println!("{:<12} {}", key, index.membership(key.as_str()));
    }
    Ok(())
}
