//! secrets::traits
//!
//! Secret storage trait definition.
//!
//! Keys are dotted names such as `tracker.token`. Implementations must
//! never log secret values or put them in error messages.

use thiserror::Error;

/// Errors from secret storage operations.
///
/// Messages never carry secret values.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("failed to read secret store: {0}")]
    ReadError(String),

    #[error("failed to write secret store: {0}")]
    WriteError(String),

    #[error("secret provider not available: {0}")]
    ProviderNotAvailable(String),
}

/// Key-value storage for credentials.
pub trait SecretStore: Send + Sync {
    /// Get a secret by key, `Ok(None)` if absent.
    fn get(&self, key: &str) -> Result<Option<String>, SecretError>;

    /// Set a secret, replacing any existing value.
    fn set(&self, key: &str, value: &str) -> Result<(), SecretError>;

    /// Delete a secret. Deleting an absent key succeeds.
    fn delete(&self, key: &str) -> Result<(), SecretError>;

    fn exists(&self, key: &str) -> Result<bool, SecretError> {
        Ok(self.get(key)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = SecretError::ReadError("disk full".into());
        assert_eq!(err.to_string(), "failed to read secret store: disk full");

        let err = SecretError::ProviderNotAvailable("vault".into());
        assert!(err.to_string().contains("provider"));
    }
}
