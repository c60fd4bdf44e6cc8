//! Application configuration loaded from `paystub.toml`.

use std::path::{Path, PathBuf};

use paystub_glossary::matcher::Threshold;
use serde::Deserialize;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "paystub.toml";

/// Errors that can occur while loading the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML or has fields of the wrong type.
    #[error("Invalid configuration in {path}: {message}")]
    Parse {
        /// Offending file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
}

/// Settings shared by the CLI subcommands and the interactive flow.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Glossary file, one deduction label per line.
    pub glossary_path: PathBuf,
    /// Directory reports are written to.
    pub output_dir: PathBuf,
    /// Similarity threshold as a fraction in `0.0..=1.0`.
    pub threshold: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            glossary_path: PathBuf::from("Rubricas.txt"),
            output_dir: PathBuf::from("."),
            threshold: Threshold::DEFAULT_FRACTION,
        }
    }
}

impl AppConfig {
    /// Parses a configuration document. Missing fields take their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if `contents` is not a valid
    /// configuration.
    pub fn parse(contents: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Loads the configuration from `path`, or from
    /// [`DEFAULT_CONFIG_FILE`] when `path` is `None`.
    ///
    /// A missing file yields the defaults. An explicitly requested file
    /// that is missing also logs a warning.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or
    /// parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));

        if !file.exists() {
            if path.is_some() {
                log::warn!(
                    "Config file {} not found; using defaults",
                    file.display()
                );
            } else {
                log::debug!("No {DEFAULT_CONFIG_FILE} found; using defaults");
            }
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(file)?;
        let config = Self::parse(&contents, file)?;
        log::debug!("Loaded config from {}: {config:?}", file.display());
        Ok(config)
    }

    /// The configured threshold on the matcher's 0–100 scale.
    #[must_use]
    pub fn threshold(&self) -> Threshold {
        Threshold::from_fraction(self.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = AppConfig::parse("", Path::new("paystub.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!((config.threshold().percent() - 85.0).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_partial_document() {
        let config = AppConfig::parse(
            "glossary_path = \"data/Rubricas.txt\"\nthreshold = 0.7\n",
            Path::new("paystub.toml"),
        )
        .unwrap();
        assert_eq!(config.glossary_path, PathBuf::from("data/Rubricas.txt"));
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert!((config.threshold().percent() - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_wrong_types() {
        let err = AppConfig::parse("threshold = \"high\"", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("paystub_config_does_not_exist.toml");
        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn loads_file_from_disk() {
        let path = std::env::temp_dir().join(format!("paystub_config_{}.toml", std::process::id()));
        std::fs::write(&path, "output_dir = \"out\"\n").unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("out"));

        std::fs::remove_file(&path).unwrap();
    }
}
