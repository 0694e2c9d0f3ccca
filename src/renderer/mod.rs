//! Writers turning rendered blocks into HTML or LaTeX
//!
//! Every writer handles the two kinds of block output: image tables and
//! math blocks.

pub mod config;
pub mod html;
pub mod latex;

use std::path::PathBuf;

use thiserror::Error;

use crate::gridmap::ImageTable;
use crate::math::MathBlock;

pub use config::{HtmlConfig, LatexConfig};
pub use html::HtmlWriter;
pub use latex::LatexWriter;

/// Errors that can occur while writing output
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to read image {}: {source}", path.display())]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Output of one successfully processed directive
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    ImageGrid(ImageTable),
    Math(MathBlock),
}

/// Output format of a [`Writer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Html,
    Latex,
}

pub trait Writer {
    fn write_table(&self, table: &ImageTable) -> Result<String, WriteError>;

    fn write_math(&self, math: &MathBlock) -> String;

    fn write_block(&self, block: &Block) -> Result<String, WriteError> {
        match block {
            Block::ImageGrid(table) => self.write_table(table),
            Block::Math(math) => Ok(self.write_math(math)),
        }
    }

    /// Write blocks separated by blank lines
    fn write_blocks(&self, blocks: &[Block]) -> Result<String, WriteError> {
        let parts = blocks
            .iter()
            .map(|b| self.write_block(b))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(parts.join("\n\n"))
    }
}
