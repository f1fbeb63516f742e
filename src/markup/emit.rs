//! Conversion of content nodes into pulldown-cmark events, and from there into HTML or
//! normalized CommonMark.

use pulldown_cmark::{
    escape::escape_href, html, CodeBlockKind, CowStr, Event, HeadingLevel as CMarkLevel, LinkType,
    Tag,
};
use pulldown_cmark_to_cmark::{cmark_with_options, Options};
use std::borrow::Borrow;

use super::{ContentNode, HeadingLevel, Inline, InlineText, ListItem};
use crate::error::Result;

pub trait EventIteratorExt {
    /// Consume an event collection and return a stringified representation.
    fn stringify(self) -> Result<String>;
}

impl<'a, I, E> EventIteratorExt for I
where
    I: Iterator<Item = E>,
    E: Borrow<Event<'a>>,
{
    fn stringify(self) -> Result<String> {
        let mut buffer = String::new();
        let options = Options {
            code_block_token_count: 3,
            list_token: '-',
            ..Default::default()
        };

        cmark_with_options(self, &mut buffer, options)?;

        Ok(buffer)
    }
}

/// Which output the event stream is destined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// Links become raw anchors that open in a new browsing context.
    Html,
    /// Links stay regular CommonMark links.
    CommonMark,
}

impl From<HeadingLevel> for CMarkLevel {
    fn from(value: HeadingLevel) -> Self {
        match value {
            HeadingLevel::H1 => CMarkLevel::H1,
            HeadingLevel::H2 => CMarkLevel::H2,
            HeadingLevel::H3 => CMarkLevel::H3,
        }
    }
}

/// Render nodes to an HTML fragment.
pub fn to_html(nodes: &[ContentNode]) -> Result<String> {
    let events = to_events(nodes, Flavor::Html)?;
    let mut buffer = String::new();
    html::push_html(&mut buffer, events.into_iter());

    Ok(buffer)
}

/// Render nodes back to CommonMark.
pub fn to_commonmark(nodes: &[ContentNode]) -> Result<String> {
    to_events(nodes, Flavor::CommonMark)?.iter().stringify()
}

pub fn to_events(nodes: &[ContentNode], flavor: Flavor) -> Result<Vec<Event<'_>>> {
    let mut events = Vec::new();

    for node in nodes {
        match node {
            ContentNode::Heading { level, text } => {
                let tag = Tag::Heading((*level).into(), None, Vec::new());
                events.push(Event::Start(tag.clone()));
                push_inline(&mut events, text, flavor)?;
                events.push(Event::End(tag));
            }
            ContentNode::List { items } => {
                events.push(Event::Start(Tag::List(None)));

                for item in items {
                    events.push(Event::Start(Tag::Item));
                    push_item(&mut events, item, flavor)?;
                    events.push(Event::End(Tag::Item));
                }

                events.push(Event::End(Tag::List(None)));
            }
            ContentNode::Paragraph { text } => {
                events.push(Event::Start(Tag::Paragraph));
                push_inline(&mut events, text, flavor)?;
                events.push(Event::End(Tag::Paragraph));
            }
            ContentNode::CodeBlock { code, language } => {
                let info = CowStr::from(language.as_deref().unwrap_or_default());
                let tag = Tag::CodeBlock(CodeBlockKind::Fenced(info));
                events.push(Event::Start(tag.clone()));

                if !code.is_empty() {
                    events.push(Event::Text(CowStr::from(format!("{code}\n"))));
                }

                events.push(Event::End(tag));
            }
        }
    }

    Ok(events)
}

fn push_item<'a>(events: &mut Vec<Event<'a>>, item: &'a ListItem, flavor: Flavor) -> Result<()> {
    if let Some(ref label) = item.label {
        events.push(Event::Start(Tag::Strong));
        events.push(Event::Text(CowStr::from(label.as_str())));
        events.push(Event::End(Tag::Strong));
        events.push(Event::Text(CowStr::from(":")));
    }

    push_inline(events, &item.text, flavor)
}

fn push_inline<'a>(events: &mut Vec<Event<'a>>, text: &'a InlineText, flavor: Flavor) -> Result<()> {
    for span in text.spans() {
        match span {
            Inline::Text(text) => events.push(Event::Text(CowStr::from(text.as_str()))),
            Inline::Code(code) => events.push(Event::Code(CowStr::from(code.as_str()))),
            Inline::Link { label, url } if flavor == Flavor::Html => {
                let mut anchor = String::from("<a href=\"");
                escape_href(&mut anchor, url)?;
                anchor.push_str("\" target=\"_blank\" rel=\"noopener noreferrer\">");

                events.push(Event::Html(CowStr::from(anchor)));
                events.push(Event::Text(CowStr::from(label.as_str())));
                events.push(Event::Html(CowStr::from("</a>")));
            }
            Inline::Link { label, url } => {
                let tag = Tag::Link(LinkType::Inline, CowStr::from(url.as_str()), CowStr::from(""));
                events.push(Event::Start(tag.clone()));
                events.push(Event::Text(CowStr::from(label.as_str())));
                events.push(Event::End(tag));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::markup::render;

    #[test]
    fn links_open_in_a_new_context() {
        let nodes = render("See [status](https://status.energy-platform.com).");
        let html = to_html(&nodes).expect("should render");

        assert_eq!(
            "<p>See <a href=\"https://status.energy-platform.com\" target=\"_blank\" rel=\"noopener noreferrer\">status</a>.</p>\n",
            html
        );
    }

    #[test]
    fn escapes_text_and_code() {
        let nodes = render("Use `<script>` & friends");
        let html = to_html(&nodes).expect("should render");

        assert_eq!("<p>Use <code>&lt;script&gt;</code> &amp; friends</p>\n", html);
    }

    #[test]
    fn renders_labeled_items_with_emphasis() {
        let nodes = render("- **Free Tier**: 1,000 requests per month");
        let html = to_html(&nodes).expect("should render");

        assert_eq!(
            "<ul>\n<li><strong>Free Tier</strong>: 1,000 requests per month</li>\n</ul>\n",
            html
        );
    }

    #[test]
    fn renders_code_blocks_with_language_class() {
        let nodes = render("```python\nprint(1)\n```");
        let html = to_html(&nodes).expect("should render");

        assert_eq!(
            "<pre><code class=\"language-python\">print(1)\n</code></pre>\n",
            html
        );
    }

    #[test]
    fn commonmark_output_keeps_structure() {
        let nodes = render(
            "## Rate Limits\n- **Free Tier**: 1,000 requests\n- see [status](https://status.energy-platform.com)",
        );
        let markup = to_commonmark(&nodes).expect("should stringify");

        assert_eq!(
            "## Rate Limits\n\n- **Free Tier**: 1,000 requests\n- see [status](https://status.energy-platform.com)",
            markup
        );
        assert_eq!(nodes, render(&markup));
    }
}
