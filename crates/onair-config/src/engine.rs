//! Engine configuration file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use onair_core::{
    CompileLimits, CompileOptions, DEFAULT_MAX_EDGES, DEFAULT_MAX_NODES, DEFAULT_SEGMENT_WIDTH,
    PageSize,
};

use crate::error::ConfigError;
use crate::validation::validate_engine_config;

/// Engine-wide settings.
///
/// # TOML Format
///
/// ```toml
/// page_width = 1920
/// page_height = 1080
/// segment_width = 1000
/// max_nodes = 4194304
/// max_edges = 16777216
/// ```
///
/// Every field is optional; missing fields take the defaults shown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Page width used by templates that do not declare one.
    pub page_width: i32,
    /// Page height used by templates that do not declare one.
    pub page_height: i32,
    /// Interpolation ticks per keyframe segment.
    pub segment_width: u32,
    /// Largest node arena a template may request.
    pub max_nodes: usize,
    /// Largest edge arena a template may request.
    pub max_edges: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let page = PageSize::default();
        Self {
            page_width: page.width,
            page_height: page.height,
            segment_width: DEFAULT_SEGMENT_WIDTH,
            max_nodes: DEFAULT_MAX_NODES,
            max_edges: DEFAULT_MAX_EDGES,
        }
    }
}

impl EngineConfig {
    /// Load and validate a config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load the config at `path`, or the user config file, falling back to
    /// defaults when neither exists.
    ///
    /// An explicit `path` that cannot be read is an error; a missing user
    /// config file is not.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let user = crate::paths::engine_config_path();
        if user.is_file() {
            tracing::debug!("engine config: {}", user.display());
            Self::load(&user)
        } else {
            tracing::debug!("engine config: defaults");
            Ok(Self::default())
        }
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(toml_str)?;
        validate_engine_config(&config)?;
        Ok(config)
    }

    /// Save the config to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
        std::fs::write(path, self.to_toml()?).map_err(|e| ConfigError::write_file(path, e))
    }

    /// Convert the config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Default page size.
    pub fn page_size(&self) -> PageSize {
        PageSize::new(self.page_width, self.page_height)
    }

    /// Compile options derived from this config.
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            page: self.page_size(),
            limits: CompileLimits {
                max_nodes: self.max_nodes,
                max_edges: self.max_edges,
            },
        }
    }
}
