//! cli::commands::auth
//!
//! Store, inspect, or remove the tracker API token.
//!
//! The token is kept in the configured secret store under
//! `tracker.token` and is never printed.
//!
//! ```bash
//! # Interactive (prompts for token)
//! ftr auth
//!
//! # Non-interactive
//! ftr auth --token <TOKEN>
//!
//! # Check status
//! ftr auth --status
//!
//! # Remove stored token
//! ftr auth --logout
//! ```

use std::io::{self, IsTerminal, Write};

use anyhow::{bail, Context as _, Result};

use super::Workspace;
use crate::engine::Context;
use crate::secrets::{self, SecretStore, TokenSource, TOKEN_KEY};

/// Run the auth command.
pub fn auth(ctx: &Context, token: Option<&str>, status: bool, logout: bool) -> Result<()> {
    let ws = Workspace::load(ctx)?;
    let store = secrets::create_store(ws.config.secrets_provider())
        .context("Failed to initialize secret store")?;

    if status {
        return show_status(store.as_ref(), ctx.quiet);
    }

    if logout {
        store
            .delete(TOKEN_KEY)
            .context("Failed to remove stored token")?;
        if !ctx.quiet {
            println!("Removed stored tracker token.");
        }
        return Ok(());
    }

    let value = read_token(ctx, token)?;
    validate_token(&value)?;
    store
        .set(TOKEN_KEY, &value)
        .context("Failed to store token")?;

    if !ctx.quiet {
        let user = ws.config.tracker().username;
        match user {
            Some(user) => println!("Stored tracker token for {}.", user),
            None => println!(
                "Stored tracker token. Set [tracker] username in config to use it."
            ),
        }
    }
    Ok(())
}

fn show_status(store: &dyn SecretStore, quiet: bool) -> Result<()> {
    let source = secrets::resolve_token(store)?.map(|(_, source)| source);

    if quiet {
        println!(
            "{}",
            if source.is_some() {
                "authenticated"
            } else {
                "not_authenticated"
            }
        );
        return Ok(());
    }

    match source {
        Some(TokenSource::Environment) => {
            println!("Tracker token provided by ${}.", secrets::TOKEN_ENV)
        }
        Some(TokenSource::Store) => println!("Tracker token stored."),
        None => {
            println!("No tracker token available.");
            println!("Run 'ftr auth' to store one.");
        }
    }
    Ok(())
}

fn read_token(ctx: &Context, token: Option<&str>) -> Result<String> {
    if let Some(t) = token {
        return Ok(t.to_string());
    }

    if ctx.quiet || !io::stdin().is_terminal() {
        bail!("Token required. Use --token <TOKEN> or run interactively.");
    }

    print!("Tracker API token: ");
    io::stdout().flush()?;
    rpassword::read_password().context("Failed to read token")
}

fn validate_token(token: &str) -> Result<()> {
    if token.is_empty() {
        bail!("Token cannot be empty.");
    }
    if token.chars().any(char::is_whitespace) {
        bail!("Token should not contain whitespace.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_spaced_tokens() {
        assert!(validate_token("").is_err());
        assert!(validate_token("abc def").is_err());
        assert!(validate_token("abc\n").is_err());
        assert!(validate_token("s3cr3t").is_ok());
    }
}
