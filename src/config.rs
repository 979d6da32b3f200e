//! Front-end configuration
//!
//! Priority (highest to lowest):
//! 1. Command-line flags (applied by the caller)
//! 2. `VAPEKIT_`-prefixed environment variables
//! 3. `vapekit.toml` in the working directory
//! 4. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::units::VolumeUnit;

pub const CONFIG_FILE: &str = "vapekit.toml";
pub const ENV_PREFIX: &str = "VAPEKIT_";

#[derive(Error, Debug)]
#[error("failed to load configuration: {0}")]
pub struct ConfigError(#[from] Box<figment::Error>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// JSON file holding persisted settings and presets
    pub store_path: PathBuf,
    /// `EnvFilter` directive, e.g. `info` or `vapekit=debug`
    pub log_level: String,
    /// Report liquid volumes in US fluid ounces
    pub fluid_ounces: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("vapekit-store.json"),
            log_level: "warn".to_string(),
            fluid_ounces: false,
        }
    }
}

impl AppConfig {
    /// Layered sources, with `file` standing in for `vapekit.toml`
    pub fn figment(file: impl AsRef<Path>) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(file.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::extract(Self::figment(CONFIG_FILE))
    }

    pub fn extract(figment: Figment) -> Result<Self, ConfigError> {
        figment.extract().map_err(|e| ConfigError(Box::new(e)))
    }

    pub fn volume_unit(&self) -> VolumeUnit {
        if self.fluid_ounces {
            VolumeUnit::Imperial
        } else {
            VolumeUnit::Metric
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(dir.path().join(CONFIG_FILE)));
        let config = AppConfig::extract(figment).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.volume_unit(), VolumeUnit::Metric);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let figment = Figment::from(Serialized::defaults(AppConfig::default())).merge(
            Toml::string(
                r#"
                store_path = "/tmp/juice.json"
                fluid_ounces = true
                "#,
            ),
        );
        let config = AppConfig::extract(figment).unwrap();
        assert_eq!(config.store_path, PathBuf::from("/tmp/juice.json"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.volume_unit(), VolumeUnit::Imperial);
    }

    #[test]
    fn test_bad_type_is_an_error() {
        let figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::string("fluid_ounces = \"sometimes\""));
        assert!(AppConfig::extract(figment).is_err());
    }
}
