//! Error types for directive parsing and resolution

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::paths::PathError;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Broad category of a directive error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Malformed input text
    Syntax,
    /// Well-formed input that does not make sense in context
    Semantic,
}

/// An error that aborts a single directive block
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DirectiveError {
    #[error("{directive} directive requires {what}")]
    MissingArgument {
        directive: &'static str,
        what: &'static str,
        span: Span,
    },

    #[error("grid map name '{name}' is not a valid identifier")]
    InvalidName { name: String, span: Span },

    #[error("grid map parent '{name}' is not a valid identifier")]
    InvalidParent { name: String, span: Span },

    #[error("quoted character '{text}' must end with ' and contain exactly 1 character")]
    MalformedQuotedChar { text: String, span: Span },

    #[error("expected a colon instead of '{found}'")]
    ExpectedColon { found: String, span: Span },

    #[error("filename missing for character '{ch}'")]
    MissingFilename { ch: char, span: Span },

    #[error("missing terminating ' on filename {text}")]
    UnterminatedFilename { text: String, span: Span },

    #[error("only a comment may follow the filename, found '{text}'")]
    TrailingText { text: String, span: Span },

    #[error("grid map '{map}' already defined character '{ch}'")]
    DuplicateChar { map: String, ch: char, span: Span },

    #[error("grid map '{name}' is already defined in this document")]
    DuplicateMap { name: String, span: Span },

    #[error("invalid line '{line}': image grid lines must start with |")]
    MissingLeftDelimiter { line: String, span: Span },

    #[error("invalid line '{line}': image grid lines must end with |")]
    MissingRightDelimiter { line: String, span: Span },

    #[error("all image grid rows must have the same number of columns (expected {expected}, found {found})")]
    RaggedRow {
        expected: usize,
        found: usize,
        span: Span,
    },

    #[error("image grid has no cells")]
    EmptyGrid { span: Span },

    #[error("unknown grid map '{name}'")]
    UnknownMap { name: String, span: Span },

    #[error("unable to find character '{ch}' in grid maps {}", maps.join(", "))]
    UnresolvedChar {
        ch: char,
        maps: Vec<String>,
        span: Span,
    },

    #[error("cannot resolve image '{filename}': {source}")]
    Path {
        filename: String,
        #[source]
        source: PathError,
        span: Span,
    },

    #[error("the definition directive should contain exactly 3 lines, found {found}")]
    DefinitionLineCount { found: usize, span: Span },

    #[error("the second definition line should contain 3 or more equal signs by themselves")]
    DefinitionSeparator { line: String, span: Span },
}

impl DirectiveError {
    pub fn span(&self) -> &Span {
        match self {
            Self::MissingArgument { span, .. }
            | Self::InvalidName { span, .. }
            | Self::InvalidParent { span, .. }
            | Self::MalformedQuotedChar { span, .. }
            | Self::ExpectedColon { span, .. }
            | Self::MissingFilename { span, .. }
            | Self::UnterminatedFilename { span, .. }
            | Self::TrailingText { span, .. }
            | Self::DuplicateChar { span, .. }
            | Self::DuplicateMap { span, .. }
            | Self::MissingLeftDelimiter { span, .. }
            | Self::MissingRightDelimiter { span, .. }
            | Self::RaggedRow { span, .. }
            | Self::EmptyGrid { span }
            | Self::UnknownMap { span, .. }
            | Self::UnresolvedChar { span, .. }
            | Self::Path { span, .. }
            | Self::DefinitionLineCount { span, .. }
            | Self::DefinitionSeparator { span, .. } => span,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::DuplicateChar { .. }
            | Self::DuplicateMap { .. }
            | Self::UnknownMap { .. }
            | Self::UnresolvedChar { .. }
            | Self::Path { .. } => ErrorClass::Semantic,
            _ => ErrorClass::Syntax,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        let span = self.span().clone();
        let message = self.to_string();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_config(Config::default().with_color(false))
            .with_message(&message)
            .with_label(
                Label::new((filename, span))
                    .with_message(&message)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);
        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => format!("{}: {}", filename, message),
        }
    }
}

/// Two documents define the same grid map name
///
/// This is fatal for the whole build: picking either definition would make
/// the output depend on the order documents were read in.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("grid map '{name}' appears in multiple documents: '{first_document}' and '{second_document}'")]
pub struct ConsistencyError {
    pub name: String,
    pub first_document: String,
    pub second_document: String,
}
