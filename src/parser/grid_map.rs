//! Parser for `grid-map` blocks
//!
//! ```text
//! .. grid-map:: terrain : base, extra
//!
//!    # full-line comment
//!    g: grass.png
//!    'w': water.png       # trailing comment
//!    '#': 'hash#1.png'    # quoted filenames may contain #
//! ```
//!
//! Each entry maps a single character to an image filename. A failed block
//! produces no declaration at all.

use std::collections::BTreeMap;

use crate::error::DirectiveError;

use super::ast::{Directive, DirectiveKind, GridMapDecl, Identifier, Line, Spanned};

/// Parse a complete `grid-map` directive
pub fn parse_grid_map(directive: &Directive) -> Result<GridMapDecl, DirectiveError> {
    let (name, parents) = parse_header(&directive.arguments)?;
    let entries = parse_entries(name.node.as_str(), &directive.body)?;
    Ok(GridMapDecl {
        name,
        parents,
        entries,
    })
}

/// Parse `name` or `name : parent1, parent2`
///
/// The text is split once on the first `:`.
pub fn parse_header(
    arguments: &Spanned<String>,
) -> Result<(Spanned<Identifier>, Vec<Spanned<Identifier>>), DirectiveError> {
    let header = arguments.trimmed();
    if header.node.is_empty() {
        return Err(DirectiveError::MissingArgument {
            directive: DirectiveKind::GridMap.name(),
            what: "a map name",
            span: arguments.span.clone(),
        });
    }

    let (name, rest) = match header.node.find(':') {
        Some(colon) => (
            header.slice(0..colon),
            Some(header.slice(colon + 1..header.node.len())),
        ),
        None => (header.clone(), None),
    };

    let name = name.trimmed();
    let name = match Identifier::parse(&name.node) {
        Some(id) => Spanned::new(id, name.span),
        None => {
            return Err(DirectiveError::InvalidName {
                name: name.node,
                span: name.span,
            })
        }
    };

    let mut parents = Vec::new();
    if let Some(rest) = rest {
        let mut offset = 0;
        for piece in rest.node.split(',') {
            let parent = rest.slice(offset..offset + piece.len()).trimmed();
            offset += piece.len() + 1;
            match Identifier::parse(&parent.node) {
                Some(id) => parents.push(Spanned::new(id, parent.span)),
                None => {
                    return Err(DirectiveError::InvalidParent {
                        name: parent.node,
                        span: parent.span,
                    })
                }
            }
        }
    }

    Ok((name, parents))
}

/// Parse the entry lines of the map named `map`
pub fn parse_entries(map: &str, body: &[Line]) -> Result<BTreeMap<char, String>, DirectiveError> {
    let mut entries = BTreeMap::new();
    for line in body {
        let Some((ch, filename)) = parse_entry(line)? else {
            continue;
        };
        if entries.contains_key(&ch.node) {
            return Err(DirectiveError::DuplicateChar {
                map: map.to_string(),
                ch: ch.node,
                span: ch.span,
            });
        }
        entries.insert(ch.node, filename);
    }
    Ok(entries)
}

/// Parse one `char: filename` line; blank and comment lines yield `None`
fn parse_entry(line: &Line) -> Result<Option<(Spanned<char>, String)>, DirectiveError> {
    let line = line.trimmed();
    let text = line.node.as_str();
    let start = line.span.start;

    let Some(first) = text.chars().next() else {
        return Ok(None);
    };
    if first == '#' {
        return Ok(None);
    }

    // Character token: `c` or `'c'`
    let (ch, token_len) = if first == '\'' {
        let mut quoted = text[1..].chars();
        match (quoted.next(), quoted.next()) {
            (Some(c), Some('\'')) => (c, c.len_utf8() + 2),
            _ => {
                let end = text.find(':').unwrap_or(text.len());
                return Err(DirectiveError::MalformedQuotedChar {
                    text: text[..end].trim_end().to_string(),
                    span: start..start + end,
                });
            }
        }
    } else {
        (first, first.len_utf8())
    };
    let ch = Spanned::new(ch, start..start + token_len);

    let after = text[token_len..].trim_start();
    let Some(value) = after.strip_prefix(':') else {
        let found = if after.is_empty() { "end of line" } else { after };
        let at = start + text.len() - after.len();
        return Err(DirectiveError::ExpectedColon {
            found: found.to_string(),
            span: at..start + text.len(),
        });
    };

    let value = Spanned::new(value.to_string(), start + text.len() - value.len()..line.span.end);
    let filename = parse_filename(ch.node, &value)?;
    Ok(Some((ch, filename)))
}

/// Parse the filename part of an entry: `'quoted # kept'` or `bare # comment`
fn parse_filename(ch: char, value: &Spanned<String>) -> Result<String, DirectiveError> {
    let value = value.trimmed();
    let text = value.node.as_str();

    let filename = if let Some(quoted) = text.strip_prefix('\'') {
        let Some(close) = quoted.find('\'') else {
            return Err(DirectiveError::UnterminatedFilename {
                text: text.to_string(),
                span: value.span,
            });
        };
        let tail = quoted[close + 1..].trim_start();
        if !tail.is_empty() && !tail.starts_with('#') {
            let at = value.span.end - tail.len();
            return Err(DirectiveError::TrailingText {
                text: tail.to_string(),
                span: at..value.span.end,
            });
        }
        &quoted[..close]
    } else {
        match text.split_once('#') {
            Some((filename, _comment)) => filename.trim(),
            None => text,
        }
    };

    if filename.is_empty() {
        return Err(DirectiveError::MissingFilename {
            ch,
            span: value.span,
        });
    }
    Ok(filename.to_string())
}
