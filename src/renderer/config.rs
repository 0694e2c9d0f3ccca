//! Configuration for HTML and LaTeX output

use std::path::PathBuf;

/// Height every grid image is scaled to, so grids line up with text
pub const DEFAULT_ROW_HEIGHT: &str = "3em";

/// Configuration options for HTML output
#[derive(Debug, Clone)]
pub struct HtmlConfig {
    /// CSS height of every grid image
    pub row_height: String,

    /// Classes on the `<table>` element
    pub table_classes: Vec<String>,

    /// Class on every grid `<img>`
    pub image_class: String,

    /// Class on inference and definition titles
    pub title_class: String,

    /// When set, images are read from this directory and inlined as data URIs
    pub embed_root: Option<PathBuf>,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            row_height: DEFAULT_ROW_HEIGHT.to_string(),
            table_classes: vec!["longtable".to_string(), "borderless".to_string()],
            image_class: "image-grid".to_string(),
            title_class: "inference-title".to_string(),
            embed_root: None,
        }
    }
}

impl HtmlConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_row_height(mut self, height: impl Into<String>) -> Self {
        self.row_height = height.into();
        self
    }

    pub fn with_table_classes(mut self, classes: Vec<String>) -> Self {
        self.table_classes = classes;
        self
    }

    pub fn with_image_class(mut self, class: impl Into<String>) -> Self {
        self.image_class = class.into();
        self
    }

    pub fn with_title_class(mut self, class: impl Into<String>) -> Self {
        self.title_class = class.into();
        self
    }

    /// Inline images as base64 data URIs, reading them from `root`
    pub fn with_embedded_images(mut self, root: impl Into<PathBuf>) -> Self {
        self.embed_root = Some(root.into());
        self
    }
}

/// Configuration options for LaTeX output
#[derive(Debug, Clone)]
pub struct LatexConfig {
    /// `\includegraphics` height of every grid image
    pub row_height: String,

    /// Table environment wrapping the grid
    pub environment: String,
}

impl Default for LatexConfig {
    fn default() -> Self {
        Self {
            row_height: DEFAULT_ROW_HEIGHT.to_string(),
            environment: "longtable".to_string(),
        }
    }
}

impl LatexConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_row_height(mut self, height: impl Into<String>) -> Self {
        self.row_height = height.into();
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let html = HtmlConfig::default();
        assert_eq!(html.row_height, "3em");
        assert_eq!(html.table_classes, vec!["longtable", "borderless"]);
        assert!(html.embed_root.is_none());

        let latex = LatexConfig::default();
        assert_eq!(latex.row_height, "3em");
        assert_eq!(latex.environment, "longtable");
    }

    #[test]
    fn test_builder_pattern() {
        let html = HtmlConfig::new()
            .with_row_height("2em")
            .with_image_class("tile")
            .with_table_classes(vec!["grid".to_string()])
            .with_embedded_images("doc");
        assert_eq!(html.row_height, "2em");
        assert_eq!(html.image_class, "tile");
        assert_eq!(html.table_classes, vec!["grid"]);
        assert_eq!(html.embed_root, Some(PathBuf::from("doc")));

        let latex = LatexConfig::new()
            .with_row_height("1cm")
            .with_environment("tabular");
        assert_eq!(latex.row_height, "1cm");
        assert_eq!(latex.environment, "tabular");
    }
}
