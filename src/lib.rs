//! image-grid - character-grid image tables and math blocks for documentation builds
//!
//! This library parses `grid-map` and `image-grid` directive blocks, keeps a
//! build-wide registry of grid maps, resolves grids into tables of images and
//! writes them as HTML or LaTeX. It also handles the `inference` and
//! `definition` math blocks that accompany them.
//!
//! # Example
//!
//! ```rust
//! use image_grid::render;
//!
//! let html = render("
//! .. grid-map:: tiles
//!
//!    g: grass.png
//!    w: water.png
//!
//! .. image-grid:: tiles
//!
//!    |gw|
//! ").unwrap();
//!
//! assert!(html.contains(r#"<img src="grass.png""#));
//! assert!(html.contains(r#"<img src="water.png""#));
//! ```

pub mod build;
pub mod config;
pub mod error;
pub mod gridmap;
pub mod math;
pub mod parser;
pub mod paths;
pub mod renderer;

pub use build::{Build, BuildError, DocumentOutput};
pub use config::{ConfigError, ProjectConfig};
pub use error::{ConsistencyError, DirectiveError, ErrorClass};
pub use gridmap::{GridMap, ImageCell, ImageTable, Registry};
pub use math::MathBlock;
pub use parser::{parse_grid_map, parse_image_grid, scan, Document};
pub use paths::{PathResolver, SourceTree};
pub use renderer::{
    Block, HtmlConfig, HtmlWriter, LatexConfig, LatexWriter, OutputFormat, WriteError, Writer,
};

use thiserror::Error;

/// Document name used when rendering a single source string
pub const DEFAULT_DOCNAME: &str = "index";

/// Errors that can occur during the render pipeline
#[derive(Debug, Error)]
pub enum RenderError {
    /// One or more directive blocks failed
    #[error("directive errors: {}", format_directive_errors(.0))]
    Directive(Vec<DirectiveError>),

    #[error("build error: {0}")]
    Build(#[from] BuildError),

    #[error("write error: {0}")]
    Write(#[from] WriteError),
}

impl From<Vec<DirectiveError>> for RenderError {
    fn from(errors: Vec<DirectiveError>) -> Self {
        RenderError::Directive(errors)
    }
}

fn format_directive_errors(errors: &[DirectiveError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Configuration for the complete render pipeline
#[derive(Debug, Clone, Default)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub html: HtmlConfig,
    pub latex: LatexConfig,
    /// Debug mode: print the grid map registry to stderr
    pub debug: bool,
}

impl RenderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_html(mut self, config: HtmlConfig) -> Self {
        self.html = config;
        self
    }

    pub fn with_latex(mut self, config: LatexConfig) -> Self {
        self.latex = config;
        self
    }

    /// Enable or disable debug mode
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Writer for the configured output format
    pub fn writer(&self) -> Box<dyn Writer> {
        match self.format {
            OutputFormat::Html => Box::new(HtmlWriter::new(self.html.clone())),
            OutputFormat::Latex => Box::new(LatexWriter::new(self.latex.clone())),
        }
    }
}

/// Print the registry to stderr, one map per line
pub fn debug_registry(registry: &Registry) {
    eprintln!("=== Grid Maps ===");
    for map in registry.iter() {
        let parents = if map.parents.is_empty() {
            String::new()
        } else {
            format!(" : {}", map.parents.join(", "))
        };
        eprintln!(
            "[{}{}] from '{}', {} entries",
            map.name,
            parents,
            map.source_document,
            map.entries.len()
        );
    }
    eprintln!("=================");
}

/// Render a single document with default configuration
///
/// Image filenames resolve relative to the current directory. Any failed
/// directive block fails the whole render.
pub fn render(source: &str) -> Result<String, RenderError> {
    render_with_config(source, RenderConfig::default())
}

/// Render a single document with custom configuration
///
/// # Example
///
/// ```rust
/// use image_grid::{render_with_config, LatexConfig, OutputFormat, RenderConfig};
///
/// let config = RenderConfig::new()
///     .with_format(OutputFormat::Latex)
///     .with_latex(LatexConfig::new().with_row_height("1cm"));
///
/// let latex = render_with_config(".. grid-map:: m\n\n   x: x.png\n\n.. image-grid:: m\n\n   |x|\n", config).unwrap();
/// assert!(latex.contains(r"\includegraphics[height=1cm]{x.png}"));
/// ```
pub fn render_with_config(source: &str, config: RenderConfig) -> Result<String, RenderError> {
    let mut build = Build::new(SourceTree::new("."));
    build.read(DEFAULT_DOCNAME, source)?;
    let output = build.write(DEFAULT_DOCNAME)?;

    if config.debug {
        debug_registry(build.registry());
        eprintln!(
            "{}: {} blocks, {} errors",
            output.docname,
            output.blocks.len(),
            output.errors.len()
        );
        if !output.skipped.is_empty() {
            eprintln!("{}: skipped {}", output.docname, output.skipped.join(", "));
        }
    }

    if !output.errors.is_empty() {
        return Err(output.errors.into());
    }

    Ok(config.writer().write_blocks(&output.blocks)?)
}
