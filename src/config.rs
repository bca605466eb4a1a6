//! Configuration management for entity-lens
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (entity-lens.toml)
//! - Environment variables (LENS__*)
//!
//! ## Example config file (entity-lens.toml):
//! ```toml
//! [layout]
//! columns = 3
//! spacing_x = 400.0
//! spacing_y = 350.0
//!
//! [parse]
//! extensions = ["json", "js"]
//! skip_prefixes = ["node_modules/"]
//! validate_descriptors = true
//!
//! [openapi]
//! supported_versions = ["3.0.3", "3.1.0", "3.2.0"]
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LensConfig {
    /// Diagram grid settings
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Descriptor loading/parsing settings
    #[serde(default)]
    pub parse: ParseConfig,

    /// OpenAPI document settings
    #[serde(default)]
    pub openapi: OpenApiConfig,
}

/// Fixed grid used by the graph projector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Nodes per row
    #[serde(default = "default_columns")]
    pub columns: usize,

    /// Horizontal distance between node origins
    #[serde(default = "default_spacing_x")]
    pub spacing_x: f64,

    /// Vertical distance between rows
    #[serde(default = "default_spacing_y")]
    pub spacing_y: f64,
}

/// Descriptor parsing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseConfig {
    /// File extensions picked up when loading a directory
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Skip files whose relative path starts with one of these
    #[serde(default = "default_skip_prefixes")]
    pub skip_prefixes: Vec<String>,

    /// Validate descriptors against the embedded TypeORM/Sequelize schemas
    #[serde(default)]
    pub validate_descriptors: bool,
}

/// OpenAPI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenApiConfig {
    /// OpenAPI versions with a known validator schema
    #[serde(default = "default_supported_versions")]
    pub supported_versions: Vec<String>,
}

// Default value functions
fn default_columns() -> usize {
    3
}

fn default_spacing_x() -> f64 {
    400.0
}

fn default_spacing_y() -> f64 {
    350.0
}

fn default_extensions() -> Vec<String> {
    vec!["json".to_string(), "js".to_string()]
}

fn default_skip_prefixes() -> Vec<String> {
    vec![
        "node_modules/".to_string(),
        ".git/".to_string(),
        "target/".to_string(),
    ]
}

fn default_supported_versions() -> Vec<String> {
    vec!["3.0.3".to_string(), "3.1.0".to_string(), "3.2.0".to_string()]
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            columns: default_columns(),
            spacing_x: default_spacing_x(),
            spacing_y: default_spacing_y(),
        }
    }
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            skip_prefixes: default_skip_prefixes(),
            validate_descriptors: false,
        }
    }
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            supported_versions: default_supported_versions(),
        }
    }
}

impl LensConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, optionally adding a required file on top
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "entity-lens.toml",
            ".entity-lens.toml",
            "config/entity-lens.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "entity-lens") {
            let xdg_config = config_dir.config_dir().join("entity-lens.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("LENS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LensConfig::default();
        assert_eq!(config.layout.columns, 3);
        assert_eq!(config.layout.spacing_x, 400.0);
        assert_eq!(config.openapi.supported_versions.len(), 3);
        assert!(!config.parse.validate_descriptors);
    }

    #[test]
    fn test_serialize_config() {
        let config = LensConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[layout]"));
        assert!(toml_str.contains("[parse]"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lens.toml");
        std::fs::write(&path, "[layout]\ncolumns = 4\n").unwrap();

        let config = LensConfig::load_from(path.to_str()).unwrap();
        assert_eq!(config.layout.columns, 4);
        assert_eq!(config.layout.spacing_y, 350.0);
        assert_eq!(config.parse.extensions, vec!["json", "js"]);
    }
}
