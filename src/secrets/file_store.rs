//! secrets::file_store
//!
//! File-based secret storage in `~/.featuretrail/secrets.toml`.
//!
//! The file is a flat TOML table of dotted keys. On Unix it is created
//! with 0600 permissions, and every write goes to a temp file that is
//! then renamed over the original.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use super::traits::{SecretError, SecretStore};

#[derive(Debug)]
pub struct FileSecretStore {
    path: PathBuf,
}

impl FileSecretStore {
    /// Store at the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, SecretError> {
        let home = dirs::home_dir()
            .ok_or_else(|| SecretError::ReadError("cannot determine home directory".into()))?;
        Ok(Self::with_path(home.join(".featuretrail").join("secrets.toml")))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, SecretError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| SecretError::ReadError(format!("cannot read {}: {}", self.path.display(), e)))?;

        toml::from_str(&content).map_err(|_| {
            SecretError::ReadError(format!("{} is not a valid secrets file", self.path.display()))
        })
    }

    fn store(&self, secrets: &BTreeMap<String, String>) -> Result<(), SecretError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| SecretError::WriteError(format!("cannot create directory: {}", e)))?;
        }

        let content = toml::to_string(secrets)
            .map_err(|e| SecretError::WriteError(format!("cannot serialize secrets: {}", e)))?;

        let temp_path = self.path.with_extension("toml.tmp");
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|e| SecretError::WriteError(format!("cannot create temp file: {}", e)))?;

            // restrict before any content lands on disk
            #[cfg(unix)]
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(|e| SecretError::WriteError(format!("cannot set permissions: {}", e)))?;

            file.write_all(content.as_bytes())
                .and_then(|_| file.sync_all())
                .map_err(|e| SecretError::WriteError(format!("cannot write secrets: {}", e)))?;
        }

        fs::rename(&temp_path, &self.path)
            .map_err(|e| SecretError::WriteError(format!("cannot replace secrets file: {}", e)))
    }
}

impl SecretStore for FileSecretStore {
    fn get(&self, key: &str) -> Result<Option<String>, SecretError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SecretError> {
        let mut secrets = self.load()?;
        secrets.insert(key.to_string(), value.to_string());
        self.store(&secrets)
    }

    fn delete(&self, key: &str) -> Result<(), SecretError> {
        let mut secrets = self.load()?;
        if secrets.remove(key).is_none() {
            return Ok(());
        }
        self.store(&secrets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, FileSecretStore) {
        let temp = TempDir::new().expect("create temp dir");
        let store = FileSecretStore::with_path(temp.path().join("nested").join("secrets.toml"));
        (temp, store)
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let (_temp, store) = test_store();
        assert!(store.get("tracker.token").unwrap().is_none());
        assert!(!store.exists("tracker.token").unwrap());
    }

    #[test]
    fn set_get_delete() {
        let (_temp, store) = test_store();

        store.set("tracker.token", "first").unwrap();
        store.set("tracker.token", "second").unwrap();
        assert_eq!(store.get("tracker.token").unwrap().as_deref(), Some("second"));

        store.delete("tracker.token").unwrap();
        assert!(store.get("tracker.token").unwrap().is_none());
        store.delete("tracker.token").unwrap();
    }

    #[test]
    fn persists_across_instances() {
        let (_temp, store) = test_store();
        store.set("tracker.token", "abc \"quoted\" = x").unwrap();

        let reopened = FileSecretStore::with_path(store.path().to_path_buf());
        assert_eq!(
            reopened.get("tracker.token").unwrap().as_deref(),
            Some("abc \"quoted\" = x")
        );
    }

    #[test]
    fn parse_error_hides_content() {
        let (_temp, store) = test_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "token = \"s3cret").unwrap();

        let err = store.get("token").unwrap_err().to_string();
        assert!(err.contains("not a valid secrets file"));
        assert!(!err.contains("s3cret"));
    }

    #[cfg(unix)]
    #[test]
    fn file_is_owner_only() {
        let (_temp, store) = test_store();
        store.set("tracker.token", "value").unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
