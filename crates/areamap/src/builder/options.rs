use serde::{Deserialize, Serialize};

/// Options for [`AreaBuilder`](super::AreaBuilder)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Derive the coarse path grid after stitching
    pub generate_path_data: bool,
    /// Narrowest boundary opening, in fine cells, that becomes an exit
    pub min_exit_width: i32,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            generate_path_data: false,
            min_exit_width: 3,
        }
    }
}

impl BuildOptions {
    /// Create a new options builder
    pub fn builder() -> BuildOptionsBuilder {
        BuildOptionsBuilder::default()
    }
}

/// Builder for BuildOptions
#[derive(Debug, Clone, Default)]
pub struct BuildOptionsBuilder {
    generate_path_data: Option<bool>,
    min_exit_width: Option<i32>,
}

impl BuildOptionsBuilder {
    /// Enable or disable path grid generation
    pub fn generate_path_data(mut self, enabled: bool) -> Self {
        self.generate_path_data = Some(enabled);
        self
    }

    /// Set the narrowest opening that counts as an exit
    pub fn min_exit_width(mut self, width: i32) -> Self {
        self.min_exit_width = Some(width);
        self
    }

    /// Build the options
    pub fn build(self) -> BuildOptions {
        let default = BuildOptions::default();
        BuildOptions {
            generate_path_data: self
                .generate_path_data
                .unwrap_or(default.generate_path_data),
            min_exit_width: self.min_exit_width.unwrap_or(default.min_exit_width),
        }
    }
}
