//! The view of the active section: rendered body nodes plus one resolved sample per code
//! example, or a placeholder when the section doesn't exist.

use anyhow::Context;
use pulldown_cmark::escape::escape_html;
use serde::Serialize;
use std::{cell::RefCell, collections::HashMap, rc::Rc};
use tracing::{debug, warn};

use crate::{
    config::ViewerConfig,
    error::Result,
    markup::{self, emit, ContentNode},
    model::{SampleKey, Section, SectionRegistry},
    nav::NavigationState,
};

/// Code example as it should be displayed right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SampleView {
    pub key: SampleKey,
    pub language: String,
    pub code: String,
    pub available_languages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RenderedSection {
    pub id: String,
    pub title: String,
    pub nodes: Rc<[ContentNode]>,
    pub samples: Vec<SampleView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum SectionView {
    Found(RenderedSection),
    NotFound { id: String },
}

impl SectionView {
    pub fn is_found(&self) -> bool {
        matches!(self, SectionView::Found(_))
    }

    /// An HTML fragment for the view. Each code sample becomes a `<pre>` block carrying its
    /// sample key and the space-separated languages it can switch to, so a host can attach
    /// the language picker and copy button.
    pub fn to_html(&self) -> Result<String> {
        let section = match self {
            SectionView::Found(section) => section,
            SectionView::NotFound { .. } => {
                return Ok(String::from(
                    "<div class=\"not-found\"><p>Section not found</p></div>",
                ))
            }
        };

        let mut buffer = String::new();
        buffer.push_str("<section data-section-id=\"");
        escape_html(&mut buffer, &section.id)?;
        buffer.push_str("\">\n");
        buffer.push_str(&emit::to_html(&section.nodes)?);

        if !section.samples.is_empty() {
            buffer.push_str("<h3>Code Examples</h3>\n");
        }

        for sample in &section.samples {
            buffer.push_str("<pre data-sample=\"");
            escape_html(&mut buffer, &sample.key.to_string())?;
            buffer.push_str("\" data-languages=\"");
            escape_html(&mut buffer, &sample.available_languages.join(" "))?;
            buffer.push_str("\"><code class=\"language-");
            escape_html(&mut buffer, &sample.language)?;
            buffer.push_str("\">");
            escape_html(&mut buffer, &sample.code)?;
            buffer.push_str("</code></pre>\n");
        }

        buffer.push_str("</section>\n");

        Ok(buffer)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).with_context(|| "Failed to serialize section view")
    }
}

/// Builds [`SectionView`]s, memoizing rendered nodes by the raw content they came from.
#[derive(Debug)]
pub struct ContentView {
    preferred_language: String,
    cache: RefCell<HashMap<String, Rc<[ContentNode]>>>,
}

impl Default for ContentView {
    fn default() -> Self {
        ContentView::new(&ViewerConfig::default())
    }
}

impl ContentView {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            preferred_language: config.preferred_language.clone(),
            cache: RefCell::default(),
        }
    }

    /// View of whatever section `state` marks as active.
    pub fn active(&self, registry: &SectionRegistry, state: &NavigationState) -> SectionView {
        self.section(registry, state, state.active_section_id())
    }

    pub fn section(
        &self,
        registry: &SectionRegistry,
        state: &NavigationState,
        id: &str,
    ) -> SectionView {
        let Some(section) = registry.get(id) else {
            warn!(section = id, "Rendering a section that doesn't exist");
            return SectionView::NotFound {
                id: String::from(id),
            };
        };

        SectionView::Found(RenderedSection {
            id: section.id.clone(),
            title: section.title.clone(),
            nodes: self.nodes(&section.raw_content),
            samples: self.samples(section, state),
        })
    }

    /// Number of distinct sources rendered so far.
    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }

    fn nodes(&self, source: &str) -> Rc<[ContentNode]> {
        if let Some(nodes) = self.cache.borrow().get(source) {
            return Rc::clone(nodes);
        }

        debug!(bytes = source.len(), "Rendering section content");
        let nodes: Rc<[ContentNode]> = markup::render(source).into();
        self.cache
            .borrow_mut()
            .insert(String::from(source), Rc::clone(&nodes));

        nodes
    }

    fn samples(&self, section: &Section, state: &NavigationState) -> Vec<SampleView> {
        section
            .code_examples
            .iter()
            .enumerate()
            .map(|(index, example)| {
                let key = SampleKey::new(section.id.as_str(), index);
                let sample = example.resolve(state.selected_language(&key), &self.preferred_language);

                SampleView {
                    language: sample.language.clone(),
                    code: sample.code.clone(),
                    available_languages: example.languages().map(String::from).collect(),
                    key,
                }
            })
            .collect()
    }
}
