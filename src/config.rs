use crate::devices::joypad_layout::{AxisTuning, DEFAULT_AXIS_FLAT, DEFAULT_AXIS_FUZZ};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Requested controller count; the pool clamps it into 1..=16.
    pub controllers: i64,
    pub axes: AxesConfig,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            controllers: 1,
            axes: AxesConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct AxesConfig {
    pub fuzz: i32,
    pub flat: i32,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            fuzz: DEFAULT_AXIS_FUZZ,
            flat: DEFAULT_AXIS_FLAT,
        }
    }
}

impl From<AxesConfig> for AxisTuning {
    fn from(c: AxesConfig) -> Self {
        AxisTuning {
            fuzz: c.fuzz,
            flat: c.flat,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// 0 = low, 1 = medium, 2 = high.
    pub verbosity: u8,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&raw)?;
        debug!(path = %path.display(), ?config, "config loaded");
        Ok(config)
    }

    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(AxisTuning::from(config.axes), AxisTuning::default());
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "controllers = 4\n\n[axes]\nflat = 32\n\n[logging]\nverbosity = 2"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.controllers, 4);
        assert_eq!(config.axes.fuzz, DEFAULT_AXIS_FUZZ);
        assert_eq!(config.axes.flat, 32);
        assert_eq!(config.logging.verbosity, 2);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn bad_types_are_parse_errors() {
        let err = Config::parse("controllers = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
