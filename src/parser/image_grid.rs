//! Parser for `image-grid` blocks
//!
//! ```text
//! .. image-grid:: terrain base
//!
//!    |ggw|
//!    |gww|
//! ```

use crate::error::DirectiveError;

use super::ast::{Directive, DirectiveKind, ImageGridSpec, Spanned};

pub fn parse_image_grid(directive: &Directive) -> Result<ImageGridSpec, DirectiveError> {
    let parents = directive.arguments.words();
    if parents.is_empty() {
        return Err(DirectiveError::MissingArgument {
            directive: DirectiveKind::ImageGrid.name(),
            what: "at least one grid map name",
            span: directive.name.span.clone(),
        });
    }

    let mut columns = None;
    let mut rows = Vec::new();
    for line in &directive.body {
        let line = line.trimmed();
        let text = line.node.as_str();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        let Some(inner) = text.strip_prefix('|') else {
            return Err(DirectiveError::MissingLeftDelimiter {
                line: text.to_string(),
                span: line.span,
            });
        };
        let Some(inner) = inner.strip_suffix('|') else {
            return Err(DirectiveError::MissingRightDelimiter {
                line: text.to_string(),
                span: line.span,
            });
        };

        let cells: Vec<char> = inner.chars().collect();
        let expected = *columns.get_or_insert(cells.len());
        if cells.len() != expected {
            return Err(DirectiveError::RaggedRow {
                expected,
                found: cells.len(),
                span: line.span,
            });
        }
        let start = line.span.start + 1;
        rows.push(Spanned::new(cells, start..start + inner.len()));
    }

    match columns {
        Some(columns) if columns > 0 => Ok(ImageGridSpec {
            parents,
            rows,
            columns,
        }),
        _ => Err(DirectiveError::EmptyGrid {
            span: directive.span.clone(),
        }),
    }
}
