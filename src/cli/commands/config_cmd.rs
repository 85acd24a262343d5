//! config command - Show the effective configuration

use anyhow::Result;

use super::Workspace;
use crate::engine::Context;

/// Print loaded config files, tracker settings, branches, and profiles.
pub fn show(ctx: &Context) -> Result<()> {
    let ws = Workspace::load(ctx)?;
    let config = &ws.config;

    let describe = |path: Option<&std::path::Path>| {
        path.map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".to_string())
    };
    println!("global config:  {}", describe(config.global_config_loaded_from()));
    println!("project config: {}", describe(config.project_config_loaded_from()));

    let tracker = config.tracker();
    println!();
    println!("[tracker]");
    println!("provider        = {}", config.tracker_provider());
    println!("url             = {}", tracker.url.as_deref().unwrap_or("(unset)"));
    println!("username        = {}", tracker.username.as_deref().unwrap_or("(unset)"));
    println!("epic_link_field = {}", config.epic_link_field());

    if !config.branches().is_empty() {
        println!();
        println!("branches:");
        for branch in config.branches() {
            println!(
                "  {:<16} {:<24} {}{}",
                branch.name,
                branch.range(),
                ws.resolve(&branch.dir).display(),
                if branch.sync {
                    format!(" (sync from {})", branch.remote())
                } else {
                    String::new()
                }
            );
        }
    }

    if !config.profiles().is_empty() {
        println!();
        println!("profiles:");
        for profile in config.profiles() {
            println!(
                "  {:<16} max {:<5} {}",
                profile.name,
                config.max_results(profile),
                profile.query
            );
        }
    }

    if !ctx.quiet {
        println!();
        println!("history ignore: {}", config.ignore_patterns().join(", "));
        println!("output formats: {}", config.output_formats().join(", "));
    }
    Ok(())
}
