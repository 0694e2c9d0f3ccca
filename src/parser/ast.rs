//! Syntax types for directive documents

use std::collections::BTreeMap;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Syntax node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

impl Spanned<String> {
    /// Trim surrounding whitespace, narrowing the span to match
    pub fn trimmed(&self) -> Spanned<String> {
        let lead = self.node.len() - self.node.trim_start().len();
        let text = self.node.trim();
        let start = self.span.start + lead;
        Spanned::new(text.to_string(), start..start + text.len())
    }

    /// Split on whitespace, keeping the span of every word
    pub fn words(&self) -> Vec<Spanned<String>> {
        let mut words = Vec::new();
        let mut start = None;
        for (i, c) in self.node.char_indices() {
            if c.is_whitespace() {
                if let Some(s) = start.take() {
                    words.push(self.slice(s..i));
                }
            } else if start.is_none() {
                start = Some(i);
            }
        }
        if let Some(s) = start {
            words.push(self.slice(s..self.node.len()));
        }
        words
    }

    /// Sub-slice by byte range relative to the node text
    pub fn slice(&self, range: Span) -> Spanned<String> {
        let start = self.span.start + range.start;
        let end = self.span.start + range.end;
        Spanned::new(self.node[range].to_string(), start..end)
    }
}

/// One line of a directive body
pub type Line = Spanned<String>;

/// Valid identifier (alphanumeric + underscore, not starting with a digit)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns `None` unless `s` is a valid identifier
    pub fn parse(s: &str) -> Option<Self> {
        Self::is_valid(s).then(|| Self::new(s))
    }

    pub fn is_valid(s: &str) -> bool {
        let mut chars = s.chars();
        match chars.next() {
            Some(c) if c.is_alphabetic() || c == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_alphanumeric() || c == '_')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Root node - a scanned source document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub directives: Vec<Directive>,
}

/// A directive block: `.. name:: arguments` followed by an indented body
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub name: Spanned<String>,
    /// Raw header text after `::`
    pub arguments: Spanned<String>,
    /// Dedented body lines
    pub body: Vec<Line>,
    pub span: Span,
}

impl Directive {
    pub fn kind(&self) -> Option<DirectiveKind> {
        DirectiveKind::from_name(&self.name.node)
    }
}

/// The directives this crate handles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    GridMap,
    ImageGrid,
    Inference,
    Definition,
}

impl DirectiveKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "grid-map" => Some(Self::GridMap),
            "image-grid" => Some(Self::ImageGrid),
            "inference" => Some(Self::Inference),
            "definition" => Some(Self::Definition),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::GridMap => "grid-map",
            Self::ImageGrid => "image-grid",
            Self::Inference => "inference",
            Self::Definition => "definition",
        }
    }
}

/// Parsed `grid-map` block: `name[: parent, ...]` plus its entries
#[derive(Debug, Clone, PartialEq)]
pub struct GridMapDecl {
    pub name: Spanned<Identifier>,
    pub parents: Vec<Spanned<Identifier>>,
    pub entries: BTreeMap<char, String>,
}

/// Parsed `image-grid` block
#[derive(Debug, Clone, PartialEq)]
pub struct ImageGridSpec {
    /// Grid map names in search order
    pub parents: Vec<Spanned<String>>,
    /// Cell characters per row; the span covers the text between the `|`
    pub rows: Vec<Spanned<Vec<char>>>,
    pub columns: usize,
}
