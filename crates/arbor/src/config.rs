//! Viewer configuration read from TOML.
//!
//! ```toml
//! pattern = "run[0]/sweep[:]/..."
//! include_attrs = true
//!
//! [dump]
//! style = "ascii"
//! indent_size = 4
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use std::path::Path;

use arbor_core::TreeFormatOptions;
use arbor_core::logging::targets;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::BuildOptions;
use crate::store::HierarchyPath;

/// Settings for building and printing a tree model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Path filter; `None` shows the whole hierarchy.
    pub pattern: Option<String>,
    /// Show attribute rows.
    pub include_attrs: bool,
    /// Show array rows.
    pub include_arrays: bool,
    /// Show group rows.
    pub include_groups: bool,
    /// Text rendering options.
    pub dump: TreeFormatOptions,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let build = BuildOptions::default();
        Self {
            pattern: build.pattern,
            include_attrs: build.include_attrs,
            include_arrays: build.include_arrays,
            include_groups: build.include_groups,
            dump: TreeFormatOptions::default(),
        }
    }
}

impl ViewerConfig {
    /// Parse a config from TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Read a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(target: targets::CONFIG, path = %path.display(), "loaded viewer config");
        Ok(config)
    }

    /// Model build options for the subtree at `root`.
    pub fn build_options(&self, root: HierarchyPath) -> BuildOptions {
        BuildOptions {
            root,
            pattern: self.pattern.clone(),
            include_attrs: self.include_attrs,
            include_arrays: self.include_arrays,
            include_groups: self.include_groups,
        }
    }
}
