//! CLI configuration file.
//!
//! ```toml
//! [build]
//! generate_path_data = true
//! min_exit_width = 3
//!
//! [render]
//! blocked = " "
//! walkable = "."
//! edge = "#"
//! color = true
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use areamap::BuildOptions;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "areamap.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub build: BuildOptions,
    pub render: RenderConfig,
}

/// Characters and colouring used by `render`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub blocked: char,
    pub walkable: char,
    pub edge: char,
    pub color: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            blocked: ' ',
            walkable: '.',
            edge: '#',
            color: true,
        }
    }
}

impl CliConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Load the given config, or `areamap.toml` if present.
    ///
    /// An explicit path that cannot be loaded is reported and replaced by
    /// defaults.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let (path, explicit) = match path {
            Some(path) => (path, true),
            None => (Path::new(DEFAULT_CONFIG_FILE), false),
        };

        if !explicit && !path.exists() {
            debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
            return Self::default();
        }

        match Self::load(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("{:#}, using defaults", e);
                Self::default()
            }
        }
    }
}
