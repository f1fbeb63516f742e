use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt::Display};

use crate::error::{Error, Result};

/// One top-level documentation unit. Its `id` doubles as the anchor used for scrolling and
/// visibility observation.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Section {
    pub id: String,
    pub title: String,
    /// Shorter label for the navigation list, if it differs from the title.
    #[serde(default)]
    pub label: Option<String>,
    /// Markup source of the section body.
    #[serde(rename = "content")]
    pub raw_content: String,
    #[serde(default)]
    pub code_examples: Vec<CodeExample>,
}

impl Section {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        raw_content: impl Into<String>,
    ) -> Section {
        Section {
            id: id.into(),
            title: title.into(),
            label: None,
            raw_content: raw_content.into(),
            code_examples: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Section {
        self.label = Some(label.into());
        self
    }

    pub fn with_code_example(mut self, example: CodeExample) -> Section {
        self.code_examples.push(example);
        self
    }

    pub fn nav_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.title)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodeSample {
    pub language: String,
    pub code: String,
}

impl CodeSample {
    pub fn new(language: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            code: code.into(),
        }
    }
}

/// The same example written in several languages.
///
/// Always holds at least one sample and never two samples for the same language.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "CodeExampleDef")]
pub struct CodeExample {
    samples: Vec<CodeSample>,
}

#[derive(Deserialize)]
struct CodeExampleDef {
    samples: Vec<CodeSample>,
}

impl TryFrom<CodeExampleDef> for CodeExample {
    type Error = Error;

    fn try_from(value: CodeExampleDef) -> Result<Self, Self::Error> {
        CodeExample::new(value.samples)
    }
}

impl CodeExample {
    pub fn new(samples: Vec<CodeSample>) -> Result<CodeExample> {
        if samples.is_empty() {
            anyhow::bail!("A code example needs at least one language");
        }

        let mut seen = HashSet::new();
        if let Some(duplicate) = samples.iter().find(|s| !seen.insert(s.language.as_str())) {
            anyhow::bail!(
                "Language `{}` appears more than once in a code example",
                duplicate.language
            );
        }

        Ok(CodeExample { samples })
    }

    pub fn samples(&self) -> &[CodeSample] {
        &self.samples
    }

    /// Available languages in declaration order.
    pub fn languages(&self) -> impl Iterator<Item = &str> + '_ {
        self.samples.iter().map(|sample| sample.language.as_str())
    }

    pub fn get(&self, language: &str) -> Option<&CodeSample> {
        self.samples
            .iter()
            .find(|sample| sample.language == language)
    }

    pub fn contains(&self, language: &str) -> bool {
        self.get(language).is_some()
    }

    /// Pick the sample to show: the explicit selection if this example has it, otherwise
    /// `preferred` if present, otherwise the first declared sample.
    pub fn resolve(&self, selected: Option<&str>, preferred: &str) -> &CodeSample {
        selected
            .and_then(|language| self.get(language))
            .or_else(|| self.get(preferred))
            .unwrap_or(&self.samples[0])
    }
}

/// Identifies one code example: the section it belongs to and its position in that section.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SampleKey {
    pub section_id: String,
    pub example_index: usize,
}

impl SampleKey {
    pub fn new(section_id: impl Into<String>, example_index: usize) -> Self {
        Self {
            section_id: section_id.into(),
            example_index,
        }
    }
}

impl Display for SampleKey {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}-{}", self.section_id, self.example_index)
    }
}
