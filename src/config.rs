//! Project configuration file
//!
//! Render settings can be kept in a TOML file next to the documents:
//!
//! ```toml
//! [grid]
//! row_height = "2.5em"
//!
//! [html]
//! table_classes = ["longtable", "borderless"]
//! image_class = "image-grid"
//! embed_images = false
//!
//! [latex]
//! environment = "longtable"
//! ```
//!
//! Every key is optional; missing keys keep their defaults.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::RenderConfig;

/// Errors that can occur when loading or parsing the configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Settings loaded from a project configuration file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    #[serde(default)]
    pub grid: GridSection,
    #[serde(default)]
    pub html: HtmlSection,
    #[serde(default)]
    pub latex: LatexSection,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridSection {
    pub row_height: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HtmlSection {
    pub table_classes: Option<Vec<String>>,
    pub image_class: Option<String>,
    pub title_class: Option<String>,
    #[serde(default)]
    pub embed_images: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LatexSection {
    pub environment: Option<String>,
}

impl ProjectConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay these settings on `config`
    ///
    /// `source_root` is where embedded images are read from.
    pub fn apply(&self, mut config: RenderConfig, source_root: &Path) -> RenderConfig {
        if let Some(height) = &self.grid.row_height {
            config.html = config.html.with_row_height(height.clone());
            config.latex = config.latex.with_row_height(height.clone());
        }
        if let Some(classes) = &self.html.table_classes {
            config.html = config.html.with_table_classes(classes.clone());
        }
        if let Some(class) = &self.html.image_class {
            config.html = config.html.with_image_class(class.clone());
        }
        if let Some(class) = &self.html.title_class {
            config.html = config.html.with_title_class(class.clone());
        }
        if self.html.embed_images {
            config.html = config.html.with_embedded_images(source_root);
        }
        if let Some(env) = &self.latex.environment {
            config.latex = config.latex.with_environment(env.clone());
        }
        config
    }
}
