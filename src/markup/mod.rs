//! Conversion of section markup into typed content nodes.
//!
//! The markup is a constrained subset of Markdown: three heading levels, flat `- ` lists,
//! fenced code blocks and paragraphs, with inline code spans and links. Rendering never
//! fails; malformed input degrades to best-effort output plus [`Diagnostic`]s.

mod inline;
mod parser;

pub mod emit;

use serde::{Deserialize, Serialize};
use std::fmt::Display;

use self::parser::MarkupParser;

/// Render raw markup into an ordered sequence of content nodes.
pub fn render(source: &str) -> Vec<ContentNode> {
    MarkupParser::new(source).parse().0
}

/// Render raw markup, also returning any non-fatal problems found along the way.
pub fn render_with_diagnostics(source: &str) -> (Vec<ContentNode>, Vec<Diagnostic>) {
    MarkupParser::new(source).parse()
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
pub enum HeadingLevel {
    #[default]
    H1,
    H2,
    H3,
}

/// A block produced by the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ContentNode {
    Heading {
        level: HeadingLevel,
        text: InlineText,
    },
    List {
        items: Vec<ListItem>,
    },
    Paragraph {
        text: InlineText,
    },
    CodeBlock {
        code: String,
        /// The tag following the opening fence, if there was one.
        language: Option<String>,
    },
}

/// An item of a list, optionally starting with an emphasized `**Label**:` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    pub label: Option<String>,
    /// Text following the label (or the whole item when there is none).
    pub text: InlineText,
}

/// A line of text split into plain text, inline code and link spans.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InlineText(Vec<Inline>);

impl InlineText {
    pub fn parse(source: &str) -> Self {
        Self(inline::parse(source))
    }

    pub fn spans(&self) -> &[Inline] {
        &self.0
    }

    /// The text a reader sees, with all markers removed.
    pub fn plain_text(&self) -> String {
        self.0
            .iter()
            .map(|span| match span {
                Inline::Text(text) | Inline::Code(text) => text.as_str(),
                Inline::Link { label, .. } => label.as_str(),
            })
            .collect()
    }
}

impl From<Vec<Inline>> for InlineText {
    fn from(spans: Vec<Inline>) -> Self {
        Self(spans)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum Inline {
    Text(String),
    Code(String),
    /// A hyperlink, opened in a new browsing context when displayed.
    Link { label: String, url: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Display for Position {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "line: {}, column: {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub position: Position,
    pub kind: DiagnosticKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// A code fence was still open at the end of input; its content was kept anyway.
    UnterminatedFence,
}

impl Display for Diagnostic {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            DiagnosticKind::UnterminatedFence => {
                write!(formatter, "unterminated code fence at {}", self.position)
            }
        }
    }
}
