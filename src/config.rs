//! Configuration loader - optional YAML file + .env overrides
//!
//! The rule set and stroke styles are fixed; only the window, the turtle's
//! starting point, the depth cap and logging are adjustable.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::turtle::{Point, ORIGIN};

/// Main configuration, loaded from tree.yaml when present
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub origin: Point,
    /// Stop growing after drawing this depth; grow forever when unset
    pub max_depth: Option<u32>,
    pub log_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: f32,
    pub height: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            origin: ORIGIN,
            max_depth: None,
            log_dir: "logs".to_string(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Christmas Tree".to_string(),
            width: 1000.0,
            height: 800.0,
        }
    }
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply overrides from the environment (and a .env file, if any)
    pub fn with_env(mut self) -> Self {
        dotenvy::dotenv().ok();

        if let Ok(dir) = std::env::var("CHRISTMAS_TREE_LOG_DIR") {
            self.log_dir = dir;
        }
        if let Some(depth) = std::env::var("CHRISTMAS_TREE_MAX_DEPTH")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            self.max_depth = Some(depth);
        }
        self
    }
}
