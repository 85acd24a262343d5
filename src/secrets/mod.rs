//! secrets
//!
//! Credential storage for the tracker API token.
//!
//! # Token Resolution
//!
//! [`resolve_token`] checks `$FEATURETRAIL_TOKEN` first, then the
//! configured store under [`TOKEN_KEY`]. Tokens are never logged.
//!
//! # Providers
//!
//! - `"file"` (default): [`FileSecretStore`] in `~/.featuretrail/secrets.toml`

mod file_store;
mod traits;

pub use file_store::FileSecretStore;
pub use traits::{SecretError, SecretStore};

/// The default secret store provider name.
pub const DEFAULT_PROVIDER: &str = "file";

/// Store key of the tracker API token.
pub const TOKEN_KEY: &str = "tracker.token";

/// Environment variable overriding the stored token.
pub const TOKEN_ENV: &str = "FEATURETRAIL_TOKEN";

/// Create a secret store based on the provider name.
///
/// # Errors
///
/// Unknown provider names, and initialization errors from the store.
pub fn create_store(provider: &str) -> Result<Box<dyn SecretStore>, SecretError> {
    match provider {
        "file" => Ok(Box::new(FileSecretStore::new()?)),
        other => Err(SecretError::ProviderNotAvailable(format!(
            "unknown secret provider: '{}' (valid: file)",
            other
        ))),
    }
}

/// Where a resolved token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Environment,
    Store,
}

/// Find the tracker token, environment first.
///
/// An empty environment value is treated as unset.
pub fn resolve_token(
    store: &dyn SecretStore,
) -> Result<Option<(String, TokenSource)>, SecretError> {
    if let Ok(token) = std::env::var(TOKEN_ENV) {
        if !token.is_empty() {
            return Ok(Some((token, TokenSource::Environment)));
        }
    }
    Ok(store.get(TOKEN_KEY)?.map(|t| (t, TokenSource::Store)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_provider() {
        match create_store("keychain") {
            Err(SecretError::ProviderNotAvailable(msg)) => assert!(msg.contains("keychain")),
            Err(e) => panic!("unexpected error type: {:?}", e),
            Ok(_) => panic!("expected error"),
        }
    }

    #[test]
    fn token_from_store() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = FileSecretStore::with_path(temp.path().join("secrets.toml"));
        store.set(TOKEN_KEY, "stored").unwrap();

        // FEATURETRAIL_TOKEN is not set by the test harness
        if std::env::var(TOKEN_ENV).is_err() {
            assert_eq!(
                resolve_token(&store).unwrap(),
                Some(("stored".to_string(), TokenSource::Store))
            );
        }
    }
}
