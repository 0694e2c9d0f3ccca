//! Splits a source document into directive blocks

use lazy_static::lazy_static;
use regex::Regex;

use super::ast::{Directive, DirectiveKind, Document, Line, Spanned};

lazy_static! {
    /// `.. name:: arguments`, matched against a line with its indent removed
    static ref MARKER: Regex =
        Regex::new(r"^\.\.\s+([A-Za-z0-9][A-Za-z0-9_-]*)::(?:\s+(.*?))?\s*$")
            .expect("directive marker regex");
}

struct RawLine<'a> {
    text: &'a str,
    start: usize,
}

fn raw_lines(source: &str) -> Vec<RawLine<'_>> {
    let mut lines = Vec::new();
    let mut start = 0;
    for piece in source.split('\n') {
        let text = piece.strip_suffix('\r').unwrap_or(piece);
        lines.push(RawLine { text, start });
        start += piece.len() + 1;
    }
    lines
}

fn indent_of(text: &str) -> usize {
    text.len() - text.trim_start().len()
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Scan `source` for directive blocks
///
/// A block's body is every following line that is blank or indented deeper
/// than its marker. Body lines are dedented by their common indentation and
/// stripped of leading and trailing blank lines. Text outside directives is
/// ignored. The bodies of directives other than [`DirectiveKind`] ones
/// (`note`, `container`, tabs) are scanned for nested blocks, which follow
/// their container in the result.
pub fn scan(source: &str) -> Document {
    let lines = raw_lines(source);
    let mut directives = Vec::new();
    scan_lines(&lines, &mut directives);
    Document { directives }
}

fn scan_lines(lines: &[RawLine<'_>], directives: &mut Vec<Directive>) {
    let mut i = 0;

    while i < lines.len() {
        let line = &lines[i];
        let indent = indent_of(line.text);
        let Some(caps) = MARKER.captures(&line.text[indent..]) else {
            i += 1;
            continue;
        };
        let Some(name) = caps.get(1) else {
            i += 1;
            continue;
        };

        let base = line.start + indent;
        let line_end = line.start + line.text.len();
        let name = Spanned::new(
            name.as_str().to_string(),
            base + name.start()..base + name.end(),
        );
        let arguments = match caps.get(2) {
            Some(m) => Spanned::new(m.as_str().to_string(), base + m.start()..base + m.end()),
            None => Spanned::new(String::new(), line_end..line_end),
        };

        let mut next = i + 1;
        while next < lines.len() {
            let text = lines[next].text;
            if !is_blank(text) && indent_of(text) <= indent {
                break;
            }
            next += 1;
        }

        let block = &lines[i + 1..next];
        let first = block
            .iter()
            .position(|l| !is_blank(l.text))
            .unwrap_or(block.len());
        let last = block
            .iter()
            .rposition(|l| !is_blank(l.text))
            .map_or(first, |p| p + 1);
        let block = &block[first..last];

        let dedent = block
            .iter()
            .filter(|l| !is_blank(l.text))
            .map(|l| indent_of(l.text))
            .min()
            .unwrap_or(0);

        let body: Vec<Line> = block
            .iter()
            .map(|l| {
                if is_blank(l.text) {
                    Spanned::new(String::new(), l.start..l.start + l.text.len())
                } else {
                    let cut = if l.text.is_char_boundary(dedent) {
                        dedent
                    } else {
                        indent_of(l.text)
                    };
                    Spanned::new(l.text[cut..].to_string(), l.start + cut..l.start + l.text.len())
                }
            })
            .collect();

        let end = body.last().map_or(line_end, |l| l.span.end);
        let container = DirectiveKind::from_name(&name.node).is_none();
        directives.push(Directive {
            name,
            arguments,
            body,
            span: base..end,
        });
        if container {
            scan_lines(&lines[i + 1..next], directives);
        }
        i = next;
    }
}

/// Split free-standing text into body lines, spans relative to `text`
///
/// Used to feed the block parsers directly, without a directive marker.
pub fn body_lines(text: &str) -> Vec<Line> {
    raw_lines(text)
        .into_iter()
        .map(|l| Spanned::new(l.text.to_string(), l.start..l.start + l.text.len()))
        .collect()
}
