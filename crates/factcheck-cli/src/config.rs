//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use factcheck_extractor::{DeniabilityScanner, ExtractorConfig, PatternSet};
use factcheck_verifier::VerifierConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
///
/// Stored as TOML; every section is optional and falls back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Deniability pattern table replacing the built-in one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patterns: Option<PathBuf>,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// Claim extraction settings
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Verification settings
    #[serde(default)]
    pub verifier: VerifierConfig,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".factcheck").join("config.toml"))
    }

    /// Load configuration from `path`, or from the default path.
    ///
    /// A missing default file yields the defaults; a missing explicit file
    /// is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load_from(path)?,
            None => {
                let path = Self::path()?;
                if path.exists() {
                    Self::load_from(&path)?
                } else {
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Check the extractor and verifier sections.
    pub fn validate(&self) -> Result<()> {
        self.extractor
            .validate()
            .map_err(|e| CliError::Config(format!("extractor: {}", e)))?;
        self.verifier
            .validate()
            .map_err(|e| CliError::Config(format!("verifier: {}", e)))?;
        Ok(())
    }

    /// Deniability scanner for this configuration.
    ///
    /// `override_path` wins over the configured pattern file.
    pub fn scanner(&self, override_path: Option<&Path>) -> Result<DeniabilityScanner> {
        match override_path.or(self.patterns.as_deref()) {
            Some(path) => {
                let json = fs::read_to_string(path)?;
                Ok(DeniabilityScanner::new(PatternSet::from_json(&json)?)?)
            }
            None => Ok(DeniabilityScanner::default()),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}
