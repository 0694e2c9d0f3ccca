//! `inference` and `definition` math blocks
//!
//! ```text
//! .. inference:: weak
//!
//!    \Gamma \vdash t
//!    --- (W)
//!    \Gamma, u \vdash t
//!
//! .. definition:: context-inclusion
//!
//!    \Gamma \subseteq \Gamma'
//!    ===
//!    \forall x. x \in \Gamma \to x \in \Gamma'
//! ```

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::DirectiveError;
use crate::parser::ast::{Directive, DirectiveKind};

lazy_static! {
    static ref INFERENCE_DIVIDER: Regex =
        Regex::new(r"^ *---+( +.*)?$").expect("inference divider regex");
    static ref DEFINITION_DIVIDER: Regex =
        Regex::new(r"^ *===+ *$").expect("definition divider regex");
}

/// Block title; titles containing `$` are typeset in math mode
#[derive(Debug, Clone, PartialEq)]
pub enum Title {
    Text(String),
    Math(String),
}

impl Title {
    pub fn new(text: &str) -> Self {
        if text.contains('$') {
            Title::Math(format!(r"\textbf{{{}}}", text))
        } else {
            Title::Text(text.to_string())
        }
    }
}

/// A display math block with an optional title
#[derive(Debug, Clone, PartialEq)]
pub struct MathBlock {
    pub title: Option<Title>,
    pub latex: String,
}

/// Parse an `inference` block
///
/// Lines before the first divider (`---`, optionally followed by a label)
/// are premises, the non-blank lines after it form the conclusion.
pub fn parse_inference(directive: &Directive) -> Result<MathBlock, DirectiveError> {
    let title = directive.arguments.trimmed();
    if title.node.is_empty() {
        return Err(DirectiveError::MissingArgument {
            directive: DirectiveKind::Inference.name(),
            what: "a title",
            span: directive.name.span.clone(),
        });
    }

    let mut premises = Vec::new();
    let mut conclusion = Vec::new();
    let mut label = "";
    let mut lines = directive.body.iter();
    for line in lines.by_ref() {
        if let Some(caps) = INFERENCE_DIVIDER.captures(&line.node) {
            label = caps.get(1).map_or("", |m| m.as_str());
            break;
        }
        // Blank lines are not allowed inside inline math
        if !line.node.trim().is_empty() {
            premises.push(line.node.as_str());
        }
    }
    for line in lines {
        if !line.node.trim().is_empty() {
            conclusion.push(line.node.as_str());
        }
    }

    let latex = format!(
        "\\dfrac{{\n{}\n}}{{\n{}\n}} {}",
        premises.join("\\qquad\n"),
        conclusion.join("\n"),
        label
    );
    Ok(MathBlock {
        title: Some(Title::new(&title.node)),
        latex,
    })
}

/// Parse a `definition` block: definiendum, `===` line, definiens
pub fn parse_definition(directive: &Directive) -> Result<MathBlock, DirectiveError> {
    let [definiendum, divider, definiens] = directive.body.as_slice() else {
        return Err(DirectiveError::DefinitionLineCount {
            found: directive.body.len(),
            span: directive.span.clone(),
        });
    };
    if !DEFINITION_DIVIDER.is_match(&divider.node) {
        return Err(DirectiveError::DefinitionSeparator {
            line: divider.node.clone(),
            span: divider.span.clone(),
        });
    }

    let title = directive.arguments.trimmed();
    let latex = format!(
        r"{} \enspace \triangleq \enspace {}",
        definiendum.node, definiens.node
    );
    Ok(MathBlock {
        title: (!title.node.is_empty()).then(|| Title::new(&title.node)),
        latex,
    })
}
