use super::{ContentNode, Diagnostic, DiagnosticKind, HeadingLevel, InlineText, ListItem, Position};

const FENCE: &str = "```";
const LABEL_OPEN: &str = "**";
const LABEL_CLOSE: &str = "**:";

/// How a single source line is interpreted outside of a code fence.
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Heading(HeadingLevel, &'a str),
    Item(&'a str),
    Fence(Option<&'a str>),
    Blank,
    Text(&'a str),
}

impl<'a> Line<'a> {
    fn classify(line: &'a str) -> Self {
        if let Some(text) = line.strip_prefix("# ") {
            return Line::Heading(HeadingLevel::H1, text.trim());
        }

        if let Some(text) = line.strip_prefix("## ") {
            return Line::Heading(HeadingLevel::H2, text.trim());
        }

        if let Some(text) = line.strip_prefix("### ") {
            return Line::Heading(HeadingLevel::H3, text.trim());
        }

        if let Some(item) = line.strip_prefix("- ") {
            return Line::Item(item.trim_end());
        }

        if let Some(language) = fence_language(line) {
            return Line::Fence(language);
        }

        if line.trim().is_empty() {
            Line::Blank
        } else {
            Line::Text(line.trim_end())
        }
    }
}

/// Returns `Some` when `line` is a fence, holding the language tag if one follows the backticks.
fn fence_language(line: &str) -> Option<Option<&str>> {
    let tag = line.trim_end().strip_prefix(FENCE)?;

    if tag.is_empty() {
        return Some(None);
    }

    if tag.contains(|c: char| c.is_whitespace() || c == '`') {
        return None;
    }

    Some(Some(tag))
}

fn is_closing_fence(line: &str) -> bool {
    line.trim_end() == FENCE
}

struct Capture<'a> {
    language: Option<&'a str>,
    lines: Vec<&'a str>,
    opened_at: Position,
}

/// Single forward pass over the source lines, accumulating list items and fenced code
/// until something flushes them.
pub(super) struct MarkupParser<'a> {
    source: &'a str,
    nodes: Vec<ContentNode>,
    list: Vec<String>,
    capture: Option<Capture<'a>>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> MarkupParser<'a> {
    pub(super) fn new(source: &'a str) -> Self {
        Self {
            source,
            nodes: Vec::new(),
            list: Vec::new(),
            capture: None,
            diagnostics: Vec::new(),
        }
    }

    pub(super) fn parse(mut self) -> (Vec<ContentNode>, Vec<Diagnostic>) {
        let source = self.source;

        for (index, line) in source.lines().enumerate() {
            if self.capture.is_some() {
                if is_closing_fence(line) {
                    self.flush_capture();
                } else if let Some(capture) = self.capture.as_mut() {
                    capture.lines.push(line);
                }

                continue;
            }

            match Line::classify(line) {
                Line::Heading(level, text) => {
                    self.flush_list();
                    self.nodes.push(ContentNode::Heading {
                        level,
                        text: InlineText::parse(text),
                    });
                }
                Line::Item(item) => self.list.push(String::from(item)),
                Line::Fence(language) => {
                    self.flush_list();
                    self.capture = Some(Capture {
                        language,
                        lines: Vec::new(),
                        opened_at: Position {
                            line: index + 1,
                            column: 1,
                        },
                    });
                }
                Line::Blank => self.flush_list(),
                Line::Text(text) => match self.list.last_mut() {
                    // NOTE: Lazy continuation of the previous list item.
                    Some(item) => {
                        item.push(' ');
                        item.push_str(text.trim_start());
                    }
                    None => self.nodes.push(ContentNode::Paragraph {
                        text: InlineText::parse(text),
                    }),
                },
            }
        }

        self.flush_list();

        if let Some(opened_at) = self.capture.as_ref().map(|capture| capture.opened_at) {
            self.diagnostics.push(Diagnostic {
                position: opened_at,
                kind: DiagnosticKind::UnterminatedFence,
            });
            self.flush_capture();
        }

        (self.nodes, self.diagnostics)
    }

    fn flush_list(&mut self) {
        if self.list.is_empty() {
            return;
        }

        let items = self.list.drain(..).map(|item| parse_item(&item)).collect();
        self.nodes.push(ContentNode::List { items });
    }

    fn flush_capture(&mut self) {
        let Some(capture) = self.capture.take() else {
            return;
        };

        self.nodes.push(ContentNode::CodeBlock {
            code: capture.lines.join("\n"),
            language: capture.language.map(String::from),
        });
    }
}

/// Splits `**Label**: rest` items into an emphasized label and the text after the colon.
fn parse_item(item: &str) -> ListItem {
    let labeled = item
        .strip_prefix(LABEL_OPEN)
        .and_then(|rest| rest.split_once(LABEL_CLOSE));

    match labeled {
        Some((label, rest)) => ListItem {
            label: Some(String::from(label)),
            text: InlineText::parse(rest),
        },
        None => ListItem {
            label: None,
            text: InlineText::parse(item),
        },
    }
}
