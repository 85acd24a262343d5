//! report
//!
//! Rendering and export of feature forests.
//!
//! # Formats
//!
//! - [`Format::Json`]: the forest as nested objects, see [`json`]
//! - [`Format::Tsv`]: one row per feature, see [`tsv`]
//!
//! Both renderers traverse every map in natural key order, so the same
//! forest always renders to the same bytes.
//!
//! # Export
//!
//! [`export`] writes a rendered profile to
//! `<dir>/<profile>-<YYYYMMDD-HHMMSS>.<ext>`.

pub mod json;
pub mod tsv;

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::core::tree::FeatureForest;

/// Errors from rendering or writing reports.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cannot serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown report format '{0}' (valid: json, tsv, all)")]
    UnknownFormat(String),
}

/// Output format of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Json,
    Tsv,
}

impl Format {
    pub const ALL: [Format; 2] = [Format::Json, Format::Tsv];

    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Tsv => "tsv",
        }
    }

    /// Parse a format name, where `all` expands to every format.
    pub fn parse_list(name: &str) -> Result<Vec<Format>, ReportError> {
        if name.eq_ignore_ascii_case("all") {
            return Ok(Self::ALL.to_vec());
        }
        Ok(vec![name.parse()?])
    }
}

impl FromStr for Format {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "tsv" => Ok(Format::Tsv),
            _ => Err(ReportError::UnknownFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Render a forest in the given format.
pub fn render(forest: &FeatureForest, format: Format) -> Result<String, ReportError> {
    match format {
        Format::Json => Ok(json::render(forest)?),
        Format::Tsv => Ok(tsv::render(forest)),
    }
}

/// File name of an exported report.
pub fn file_name(profile: &str, format: Format, stamp: &DateTime<Local>) -> String {
    format!(
        "{}-{}.{}",
        profile,
        stamp.format("%Y%m%d-%H%M%S"),
        format.extension()
    )
}

/// Render and write a profile's forest into `dir`.
///
/// Creates `dir` if needed. Returns the written path.
pub fn export(
    forest: &FeatureForest,
    profile: &str,
    format: Format,
    dir: &Path,
    stamp: &DateTime<Local>,
) -> Result<PathBuf, ReportError> {
    let content = render(forest, format)?;
    let path = dir.join(file_name(profile, format, stamp));

    fs::create_dir_all(dir)
        .and_then(|_| fs::write(&path, content))
        .map_err(|source| ReportError::Write {
            path: path.clone(),
            source,
        })?;

    tracing::info!(profile, path = %path.display(), "wrote {} report", format);
    Ok(path)
}
