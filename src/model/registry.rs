use crate::error::{PicassoError, Result};
use crate::model::params::{GeneralParams, Rgb, ShapeKind, StyleParams};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG: &str = "freestyle";

/// A fully resolved bundle of parameters for one run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralParams,
    pub style: StyleParams,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.general.validate()?;
        self.style.validate()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)
            .map_err(|e| PicassoError::config(format!("malformed config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path.as_ref()).map_err(|e| {
            PicassoError::config(format!(
                "failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        debug!("Loaded config file '{}'", path.as_ref().display());
        Self::from_json_str(&json)
    }
}

/// Named parameter bundles selectable from the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigRegistry {
    configs: BTreeMap<String, Config>,
}

impl ConfigRegistry {
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        registry.register(DEFAULT_CONFIG, freestyle());
        registry.register("classic", classic());
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, config: Config) {
        self.configs.insert(name.into(), config);
    }

    pub fn get(&self, name: &str) -> Result<Config> {
        self.configs.get(name).cloned().ok_or_else(|| {
            PicassoError::config(format!(
                "unknown config '{}', expected one of: {}",
                name,
                self.names().collect::<Vec<_>>().join(", ")
            ))
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.configs.keys().map(String::as_str)
    }
}

fn freestyle() -> Config {
    Config {
        general: GeneralParams::default(),
        style: StyleParams::new(
            Rgb::WHITE,
            vec![
                Rgb(0.96, 0.0, 0.86),
                Rgb(0.82, 0.96, 0.02),
                Rgb(0.0, 1.0, 0.88),
                Rgb(0.0, 0.0, 0.0),
                Rgb(0.7, 0.0, 1.0),
            ],
            &["circle", "rectangle"],
        ),
    }
}

fn classic() -> Config {
    Config {
        general: GeneralParams::default()
            .with_size(512, 512)
            .with_scale(200.0)
            .with_shape(ShapeKind::Circle),
        style: StyleParams::new(
            Rgb(0.9, 0.9, 0.9),
            vec![Rgb(1.0, 0.0, 0.0), Rgb(0.0, 1.0, 0.0), Rgb(0.0, 0.0, 1.0)],
            &["rectangle", "circle"],
        ),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builtin_configs_are_valid() {
        env_logger::try_init().unwrap_or(());

        let registry = ConfigRegistry::builtin();
        for name in registry.names() {
            let config = registry.get(name).unwrap();
            assert!(config.validate().is_ok(), "config '{}' is invalid", name);
        }

        let freestyle = registry.get(DEFAULT_CONFIG).unwrap();
        assert_eq!(freestyle.general.width, 1024);
        assert_eq!(freestyle.general.scale, 80.0);
        assert_eq!(freestyle.style.shape_colors.len(), 5);
    }

    #[test]
    fn unknown_config_name() {
        env_logger::try_init().unwrap_or(());

        let err = ConfigRegistry::builtin().get("cubism").unwrap_err();
        assert!(matches!(err, PicassoError::Config(ref msg) if msg.contains("freestyle")));
    }

    #[test]
    fn json_config_with_partial_general_params() {
        env_logger::try_init().unwrap_or(());

        let json = r#"{
            "general": { "width": 100, "height": 100, "scale": 80.0 },
            "style": {
                "background_color": [1.0, 1.0, 1.0],
                "shape_colors": [[1.0, 0.0, 0.0]],
                "shapes": ["circle"]
            }
        }"#;

        let config = Config::from_json_str(json).unwrap();
        assert_eq!(config.general.width, 100);
        assert!(!config.general.use_drum);
        assert_eq!(config.general.max_length, 1024.0);
        assert_eq!(config.style.shape_colors, vec![Rgb(1.0, 0.0, 0.0)]);
    }

    #[test]
    fn json_config_is_validated() {
        env_logger::try_init().unwrap_or(());

        let json = r#"{
            "general": { "scale": -5.0 },
            "style": {
                "background_color": [1.0, 1.0, 1.0],
                "shape_colors": [[1.0, 0.0, 0.0]],
                "shapes": ["circle"]
            }
        }"#;
        assert!(matches!(Config::from_json_str(json), Err(PicassoError::Config(_))));
        assert!(matches!(Config::from_json_str("{"), Err(PicassoError::Config(_))));
    }
}
