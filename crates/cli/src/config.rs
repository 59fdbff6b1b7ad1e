//! Optional `tycat.toml` settings.
//!
//! ```toml
//! output = "json"
//! quiet = false
//! step_limit = 50000
//! skip = ["never", "class"]
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::OutputFormat;

/// File looked up in the current directory when `--config` is absent.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "tycat.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
    pub output: Option<OutputFormat>,
    pub quiet: Option<bool>,
    pub step_limit: Option<u64>,
    #[serde(default)]
    pub skip: Vec<String>,
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("could not read config '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("config '{}': unknown entry '{label}' in skip", .path.display())]
    UnknownLabel { path: PathBuf, label: String },
}

/// Load `explicit`, or the default file if it exists, or nothing.
pub(crate) fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let p = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !p.is_file() {
                return Ok(Config::default());
            }
            p
        }
    };
    let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let config: Config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;
    if let Some(label) = config
        .skip
        .iter()
        .find(|l| tycat_eval::catalog::find(l).is_none())
    {
        return Err(ConfigError::UnknownLabel {
            path,
            label: label.clone(),
        });
    }
    log::debug!("loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, text: &str) -> PathBuf {
        let path = dir.path().join("tycat.toml");
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn parses_all_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "output = \"json\"\nquiet = true\nstep_limit = 10\nskip = [\"never\"]\n",
        );
        let config = load(Some(&path)).unwrap();
        assert_eq!(config.output, Some(OutputFormat::Json));
        assert_eq!(config.quiet, Some(true));
        assert_eq!(config.step_limit, Some(10));
        assert_eq!(config.skip, vec!["never"]);
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(Some(&write(&dir, ""))).unwrap();
        assert!(config.output.is_none());
        assert!(config.skip.is_empty());
    }

    #[test]
    fn rejects_unknown_keys_and_labels() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(Some(&write(&dir, "colour = \"red\"\n"))).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        let err = load(Some(&write(&dir, "skip = [\"nope\"]\n"))).unwrap_err();
        assert!(err.to_string().contains("unknown entry 'nope'"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
