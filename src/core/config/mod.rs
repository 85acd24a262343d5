//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! featuretrail has two configuration scopes:
//! - **Global**: User-level settings (tracker connection, secrets)
//! - **Project**: Branches to index, report profiles, export settings
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Project config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$FEATURETRAIL_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/featuretrail/config.toml`
//! 3. `~/.featuretrail/config.toml`
//!
//! # Project Config Locations
//!
//! 1. The path given with `--config`, which must exist
//! 2. `.featuretrail/config.toml` under the working directory
//!
//! # Example
//!
//! ```no_run
//! use featuretrail::core::config::Config;
//! use std::path::Path;
//!
//! let result = Config::load(Path::new("/path/to/project"), None).unwrap();
//! let config = result.config;
//!
//! for profile in config.profiles() {
//!     println!("{}: {}", profile.name, profile.query);
//! }
//! println!("Epic link field: {}", config.epic_link_field());
//! ```

pub mod schema;

pub use schema::{
    BranchConfig, GlobalConfig, HistoryConfig, OutputConfig, ProfileConfig, ProjectConfig,
    SecretsConfig, TrackerConfig,
};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default custom field carrying the epic link on Jira.
pub const DEFAULT_EPIC_LINK_FIELD: &str = "customfield_12821";

/// Default bound on search results per profile.
pub const DEFAULT_MAX_RESULTS: u32 = 500;

/// Boilerplate commit subjects dropped from the history by default.
pub const DEFAULT_IGNORE: &[&str] = &[
    "SUBREPO:IGNORE",
    "ARTIFACT:IGNORE",
    "RECORD REFERENCE TO LIFERAY-PORTAL",
];

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("unknown profile '{name}' (configured: {available})")]
    UnknownProfile { name: String, available: String },

    #[error("missing config value: {0}")]
    MissingValue(String),
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning, if any.
    pub path: Option<PathBuf>,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Merged configuration from all sources.
///
/// Accessor methods apply precedence rules and defaults. Project config
/// overrides global config.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Project configuration (if found)
    pub project: Option<ProjectConfig>,
    global_path: Option<PathBuf>,
    project_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// `cwd` is searched for a project config unless `explicit` names one.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed or fail
    /// validation, or if `explicit` does not exist. Missing default config
    /// files are not an error (defaults are used).
    pub fn load(cwd: &Path, explicit: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let (global, global_path) = Self::load_global()?;
        let (project, project_path) = Self::load_project(cwd, explicit)?;

        global.validate()?;
        if let Some(p) = &project {
            p.validate()?;
        }

        match (&project, &project_path) {
            (Some(p), Some(path)) => {
                if p.branches.is_empty() {
                    warnings.push(ConfigWarning {
                        message: "no [[branches]] configured; every ticket will be reported as missing from git".to_string(),
                        path: Some(path.clone()),
                    });
                }
                if p.profiles.is_empty() {
                    warnings.push(ConfigWarning {
                        message: "no [[profiles]] configured; nothing to report".to_string(),
                        path: Some(path.clone()),
                    });
                }
            }
            _ => warnings.push(ConfigWarning {
                message: format!(
                    "no project config found; expected '{}'",
                    Self::project_config_path(cwd).display()
                ),
                path: None,
            }),
        }

        Ok(ConfigLoadResult {
            config: Config {
                global,
                project,
                global_path,
                project_path,
            },
            warnings,
        })
    }

    /// Load global configuration from standard locations.
    fn load_global() -> Result<(GlobalConfig, Option<PathBuf>), ConfigError> {
        // 1. Check $FEATURETRAIL_CONFIG
        if let Ok(path) = std::env::var("FEATURETRAIL_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                let config = Self::read_toml(&path)?;
                return Ok((config, Some(path)));
            }
        }

        // 2. Check $XDG_CONFIG_HOME/featuretrail/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("featuretrail/config.toml");
            if path.exists() {
                let config = Self::read_toml(&path)?;
                return Ok((config, Some(path)));
            }
        }

        // 3. Check ~/.featuretrail/config.toml
        if let Some(home) = dirs::home_dir() {
            let path = home.join(".featuretrail/config.toml");
            if path.exists() {
                let config = Self::read_toml(&path)?;
                return Ok((config, Some(path)));
            }
        }

        Ok((GlobalConfig::default(), None))
    }

    /// Load project configuration.
    fn load_project(
        cwd: &Path,
        explicit: Option<&Path>,
    ) -> Result<(Option<ProjectConfig>, Option<PathBuf>), ConfigError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            let config = Self::read_toml(path)?;
            return Ok((Some(config), Some(path.to_path_buf())));
        }

        let canonical = Self::project_config_path(cwd);
        if canonical.exists() {
            let config = Self::read_toml(&canonical)?;
            return Ok((Some(config), Some(canonical)));
        }

        Ok((None, None))
    }

    /// Read and parse a TOML config file.
    fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the canonical path for project config under `dir`.
    pub fn project_config_path(dir: &Path) -> PathBuf {
        dir.join(".featuretrail/config.toml")
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Effective tracker settings (project overrides global).
    pub fn tracker(&self) -> TrackerConfig {
        let global = self.global.tracker.clone().unwrap_or_default();
        match self.project.as_ref().and_then(|p| p.tracker.as_ref()) {
            Some(project) => global.merged_with(project),
            None => global,
        }
    }

    /// Tracker base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingValue` if no scope sets `[tracker] url`.
    pub fn tracker_url(&self) -> Result<String, ConfigError> {
        self.tracker()
            .url
            .ok_or_else(|| ConfigError::MissingValue("[tracker] url".to_string()))
    }

    /// Tracker provider. Defaults to "jira".
    pub fn tracker_provider(&self) -> String {
        self.tracker().provider.unwrap_or_else(|| "jira".to_string())
    }

    /// Custom field holding the epic link.
    pub fn epic_link_field(&self) -> String {
        self.tracker()
            .epic_link_field
            .unwrap_or_else(|| DEFAULT_EPIC_LINK_FIELD.to_string())
    }

    /// Search result bound for a profile (profile → tracker → default).
    pub fn max_results(&self, profile: &ProfileConfig) -> u32 {
        profile
            .max_results
            .or(self.tracker().max_results)
            .unwrap_or(DEFAULT_MAX_RESULTS)
    }

    /// Branches to index, in configuration order.
    pub fn branches(&self) -> &[BranchConfig] {
        self.project
            .as_ref()
            .map(|p| p.branches.as_slice())
            .unwrap_or(&[])
    }

    /// Subject substrings to drop from history.
    pub fn ignore_patterns(&self) -> Vec<String> {
        self.project
            .as_ref()
            .and_then(|p| p.history.as_ref())
            .and_then(|h| h.ignore.clone())
            .unwrap_or_else(|| DEFAULT_IGNORE.iter().map(|s| s.to_string()).collect())
    }

    /// All configured profiles.
    pub fn profiles(&self) -> &[ProfileConfig] {
        self.project
            .as_ref()
            .map(|p| p.profiles.as_slice())
            .unwrap_or(&[])
    }

    /// Select profiles by name, or all of them when `names` is empty.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownProfile` for a name that is not configured.
    pub fn select_profiles(&self, names: &[String]) -> Result<Vec<&ProfileConfig>, ConfigError> {
        if names.is_empty() {
            return Ok(self.profiles().iter().collect());
        }
        names
            .iter()
            .map(|name| {
                self.profiles()
                    .iter()
                    .find(|p| &p.name == name)
                    .ok_or_else(|| ConfigError::UnknownProfile {
                        name: name.clone(),
                        available: self
                            .profiles()
                            .iter()
                            .map(|p| p.name.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            })
            .collect()
    }

    /// Directory for report files, if configured.
    pub fn output_dir(&self) -> Option<&Path> {
        self.project
            .as_ref()
            .and_then(|p| p.output.as_ref())
            .and_then(|o| o.dir.as_deref())
    }

    /// Output formats. Defaults to json and tsv.
    pub fn output_formats(&self) -> Vec<String> {
        self.project
            .as_ref()
            .and_then(|p| p.output.as_ref())
            .and_then(|o| o.formats.clone())
            .unwrap_or_else(|| vec!["json".to_string(), "tsv".to_string()])
    }

    /// Get the secrets provider. Defaults to "file".
    pub fn secrets_provider(&self) -> &str {
        self.global
            .secrets
            .as_ref()
            .and_then(|s| s.provider.as_deref())
            .unwrap_or(crate::secrets::DEFAULT_PROVIDER)
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded project config file.
    pub fn project_config_loaded_from(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }
}
