//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$FEATURETRAIL_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/featuretrail/config.toml`
//! 3. `~/.featuretrail/config.toml` (canonical write location)
//!
//! # Project Config
//!
//! Located at `.featuretrail/config.toml` in the working directory, or
//! wherever `--config` points.
//!
//! # Validation
//!
//! Config values are validated after parsing (e.g. profile names must be
//! unique, branch ranges must be non-empty).

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// [tracker]
/// url = "https://issues.example.com"
/// username = "jdoe"
///
/// [secrets]
/// provider = "file"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Tracker connection defaults
    pub tracker: Option<TrackerConfig>,

    /// Secret storage settings
    pub secrets: Option<SecretsConfig>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(tracker) = &self.tracker {
            tracker.validate()?;
        }
        if let Some(secrets) = &self.secrets {
            secrets.validate()?;
        }
        Ok(())
    }
}

/// Project configuration: which branches to read and which reports to build.
///
/// # Example
///
/// ```toml
/// [[branches]]
/// name = "master"
/// dir = "/src/portal"
/// from = "7.4.x"
/// to = "master"
///
/// [history]
/// ignore = ["SUBREPO:IGNORE"]
///
/// [[profiles]]
/// name = "features"
/// query = "project = LPS AND fixVersion = 7.5"
///
/// [output]
/// dir = "reports"
/// formats = ["json", "tsv"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Tracker overrides for this project
    pub tracker: Option<TrackerConfig>,

    /// Branches whose history is indexed, in processing order
    pub branches: Vec<BranchConfig>,

    /// Commit subject filtering
    pub history: Option<HistoryConfig>,

    /// Report profiles
    pub profiles: Vec<ProfileConfig>,

    /// Export settings
    pub output: Option<OutputConfig>,
}

impl ProjectConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(tracker) = &self.tracker {
            tracker.validate()?;
        }

        for branch in &self.branches {
            branch.validate()?;
        }

        let mut seen = HashSet::new();
        for profile in &self.profiles {
            profile.validate()?;
            if !seen.insert(profile.name.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "duplicate profile name '{}'",
                    profile.name
                )));
            }
        }

        if let Some(output) = &self.output {
            output.validate()?;
        }

        Ok(())
    }
}

/// Issue tracker connection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    /// Tracker kind (only "jira")
    pub provider: Option<String>,

    /// Base URL, e.g. `https://issues.example.com`
    pub url: Option<String>,

    /// Login name for basic authentication
    pub username: Option<String>,

    /// Custom field holding the epic link
    pub epic_link_field: Option<String>,

    /// Upper bound on search results per profile
    pub max_results: Option<u32>,
}

impl TrackerConfig {
    /// Valid tracker providers.
    pub const VALID_PROVIDERS: &'static [&'static str] = &["jira"];

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(provider) = &self.provider {
            if !Self::VALID_PROVIDERS.contains(&provider.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid tracker provider '{}', must be one of: {}",
                    provider,
                    Self::VALID_PROVIDERS.join(", ")
                )));
            }
        }
        if let Some(url) = &self.url {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(ConfigError::InvalidValue(format!(
                    "tracker url '{}' must start with http:// or https://",
                    url
                )));
            }
        }
        if self.max_results == Some(0) {
            return Err(ConfigError::InvalidValue(
                "tracker max_results must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Overlay `other` on top of `self`; set fields in `other` win.
    pub fn merged_with(&self, other: &TrackerConfig) -> TrackerConfig {
        TrackerConfig {
            provider: other.provider.clone().or_else(|| self.provider.clone()),
            url: other.url.clone().or_else(|| self.url.clone()),
            username: other.username.clone().or_else(|| self.username.clone()),
            epic_link_field: other
                .epic_link_field
                .clone()
                .or_else(|| self.epic_link_field.clone()),
            max_results: other.max_results.or(self.max_results),
        }
    }
}

/// A branch whose commit subjects feed the history index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BranchConfig {
    /// Branch name (checked out when syncing)
    pub name: String,

    /// Repository working directory
    pub dir: PathBuf,

    /// Start of the commit range (exclusive)
    pub from: String,

    /// End of the commit range (inclusive)
    pub to: String,

    /// Check out and pull the branch before reading history
    #[serde(default)]
    pub sync: bool,

    /// Remote to pull from when syncing (default: "upstream")
    pub remote: Option<String>,
}

impl BranchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("name", &self.name), ("from", &self.from), ("to", &self.to)] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue(format!(
                    "branch {} cannot be empty",
                    field
                )));
            }
        }
        Ok(())
    }

    pub fn remote(&self) -> &str {
        self.remote.as_deref().unwrap_or("upstream")
    }

    /// The `from..to` range as passed to git.
    pub fn range(&self) -> String {
        format!("{}..{}", self.from, self.to)
    }
}

/// Commit subject filtering.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    /// Subject lines containing any of these (case-insensitive) are dropped
    pub ignore: Option<Vec<String>>,
}

/// A named report run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    /// Profile name, used in output file names
    pub name: String,

    /// Tracker query (JQL for Jira)
    pub query: String,

    /// Per-profile override of the tracker result bound
    pub max_results: Option<u32>,
}

impl ProfileConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty()
            || !self
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ConfigError::InvalidValue(format!(
                "invalid profile name '{}': use letters, digits, '-' or '_'",
                self.name
            )));
        }
        if self.query.trim().is_empty() {
            return Err(ConfigError::InvalidValue(format!(
                "profile '{}' has an empty query",
                self.name
            )));
        }
        if self.max_results == Some(0) {
            return Err(ConfigError::InvalidValue(format!(
                "profile '{}' max_results must be greater than zero",
                self.name
            )));
        }
        Ok(())
    }
}

/// Export settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory for report files; stdout when unset
    pub dir: Option<PathBuf>,

    /// Formats to produce ("json", "tsv")
    pub formats: Option<Vec<String>>,
}

impl OutputConfig {
    /// Valid output formats.
    pub const VALID_FORMATS: &'static [&'static str] = &["json", "tsv"];

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(formats) = &self.formats {
            for format in formats {
                if !Self::VALID_FORMATS.contains(&format.as_str()) {
                    return Err(ConfigError::InvalidValue(format!(
                        "invalid output format '{}', must be one of: {}",
                        format,
                        Self::VALID_FORMATS.join(", ")
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Secrets configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SecretsConfig {
    /// Provider to use ("file")
    pub provider: Option<String>,
}

impl SecretsConfig {
    /// Valid secret providers.
    pub const VALID_PROVIDERS: &'static [&'static str] = &["file"];

    /// Validate the secrets configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(provider) = &self.provider {
            if !Self::VALID_PROVIDERS.contains(&provider.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid secrets provider '{}', must be one of: {}",
                    provider,
                    Self::VALID_PROVIDERS.join(", ")
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_project_config() {
        let toml = r#"
            [[branches]]
            name = "master"
            dir = "/src/portal"
            from = "7.4.x"
            to = "master"
            sync = true

            [[branches]]
            name = "master-private"
            dir = "/src/portal-ee"
            from = "7.4.x-private"
            to = "master-private"
            remote = "origin"

            [history]
            ignore = ["SUBREPO:IGNORE"]

            [[profiles]]
            name = "features"
            query = "project = LPS"
            max_results = 100

            [output]
            dir = "reports"
            formats = ["json"]
        "#;

        let config: ProjectConfig = toml::from_str(toml).unwrap();
        config.validate().unwrap();

        assert_eq!(config.branches.len(), 2);
        assert!(config.branches[0].sync);
        assert_eq!(config.branches[0].remote(), "upstream");
        assert_eq!(config.branches[1].remote(), "origin");
        assert_eq!(config.branches[0].range(), "7.4.x..master");
        assert_eq!(config.profiles[0].max_results, Some(100));
        assert_eq!(
            config.output.unwrap().formats,
            Some(vec!["json".to_string()])
        );
    }

    #[test]
    fn duplicate_profiles_rejected() {
        let config = ProjectConfig {
            profiles: vec![
                ProfileConfig {
                    name: "a".into(),
                    query: "q".into(),
                    max_results: None,
                },
                ProfileConfig {
                    name: "a".into(),
                    query: "q2".into(),
                    max_results: None,
                },
            ],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_profile_name_rejected() {
        let profile = ProfileConfig {
            name: "with space".into(),
            query: "q".into(),
            max_results: None,
        };
        assert!(profile.validate().is_err());
    }

    #[test]
    fn empty_query_rejected() {
        let profile = ProfileConfig {
            name: "p".into(),
            query: "  ".into(),
            max_results: None,
        };
        assert!(profile.validate().is_err());
    }

    #[test]
    fn empty_branch_range_rejected() {
        let branch = BranchConfig {
            name: "master".into(),
            dir: PathBuf::from("."),
            from: "".into(),
            to: "master".into(),
            sync: false,
            remote: None,
        };
        assert!(branch.validate().is_err());
    }

    #[test]
    fn invalid_output_format_rejected() {
        let output = OutputConfig {
            dir: None,
            formats: Some(vec!["csv".into()]),
        };
        assert!(output.validate().is_err());
    }

    #[test]
    fn invalid_tracker_values_rejected() {
        let bad_provider = TrackerConfig {
            provider: Some("bugzilla".into()),
            ..Default::default()
        };
        assert!(bad_provider.validate().is_err());

        let bad_url = TrackerConfig {
            url: Some("issues.example.com".into()),
            ..Default::default()
        };
        assert!(bad_url.validate().is_err());

        let zero = TrackerConfig {
            max_results: Some(0),
            ..Default::default()
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn tracker_merge_prefers_overlay() {
        let base = TrackerConfig {
            url: Some("https://a.example.com".into()),
            username: Some("alice".into()),
            max_results: Some(500),
            ..Default::default()
        };
        let overlay = TrackerConfig {
            url: Some("https://b.example.com".into()),
            ..Default::default()
        };

        let merged = base.merged_with(&overlay);
        assert_eq!(merged.url.as_deref(), Some("https://b.example.com"));
        assert_eq!(merged.username.as_deref(), Some("alice"));
        assert_eq!(merged.max_results, Some(500));
    }

    #[test]
    fn unknown_secrets_provider_rejected() {
        let secrets = SecretsConfig {
            provider: Some("vault".into()),
        };
        assert!(secrets.validate().is_err());
    }
}
