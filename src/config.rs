//! Engine configuration from environment variables
//!
//! | var             | default                             |
//! |-----------------|-------------------------------------|
//! | `DATA_DIR`      | `data`                              |
//! | `MODEL_FILE`    | `$DATA_DIR/agrox_model.json`        |
//! | `TRAITS_FILE`   | `$DATA_DIR/genus_traits.csv`        |
//! | `SALINITY_FILE` | `$DATA_DIR/genus_data_enriched.csv` |
//! | `PLANTS_FILE`   | `$DATA_DIR/plants.csv`              |
//! | `PORT`          | `3000`                              |

use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_PORT: u16 = 3000;

const MODEL_FILE_NAME: &str = "agrox_model.json";
const TRAITS_FILE_NAME: &str = "genus_traits.csv";
const SALINITY_FILE_NAME: &str = "genus_data_enriched.csv";
const PLANTS_FILE_NAME: &str = "plants.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub data_dir: PathBuf,
    pub model_file: PathBuf,
    pub traits_file: PathBuf,
    pub salinity_file: PathBuf,
    pub plants_file: PathBuf,
    pub port: u16,
}

impl EngineConfig {
    /// Every file at its default name under `data_dir`
    pub fn with_data_dir(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref().to_path_buf();
        Self {
            model_file: data_dir.join(MODEL_FILE_NAME),
            traits_file: data_dir.join(TRAITS_FILE_NAME),
            salinity_file: data_dir.join(SALINITY_FILE_NAME),
            plants_file: data_dir.join(PLANTS_FILE_NAME),
            data_dir,
            port: DEFAULT_PORT,
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key -> value source (the process environment in production)
    ///
    /// An unparsable `PORT` falls back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_dir = lookup("DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
        let mut config = Self::with_data_dir(data_dir);

        if let Some(path) = lookup("MODEL_FILE") {
            config.model_file = PathBuf::from(path);
        }
        if let Some(path) = lookup("TRAITS_FILE") {
            config.traits_file = PathBuf::from(path);
        }
        if let Some(path) = lookup("SALINITY_FILE") {
            config.salinity_file = PathBuf::from(path);
        }
        if let Some(path) = lookup("PLANTS_FILE") {
            config.plants_file = PathBuf::from(path);
        }

        config.port = lookup("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        config
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::with_data_dir(DEFAULT_DATA_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::from_lookup(|_| None);
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.model_file, PathBuf::from("data/agrox_model.json"));
        assert_eq!(config.salinity_file, PathBuf::from("data/genus_data_enriched.csv"));
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("DATA_DIR", "/srv/agro"),
            ("TRAITS_FILE", "/tmp/traits.csv"),
            ("PORT", "8080"),
        ]
        .into_iter()
        .collect();
        let config = EngineConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.model_file, PathBuf::from("/srv/agro/agrox_model.json"));
        assert_eq!(config.traits_file, PathBuf::from("/tmp/traits.csv"));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_bad_port_falls_back() {
        let config = EngineConfig::from_lookup(|k| (k == "PORT").then(|| "http".to_string()));
        assert_eq!(config.port, DEFAULT_PORT);
    }
}
