use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fs, path::Path, str::FromStr};
use tracing::warn;

use super::{CodeExample, SampleKey, Section};
use crate::{
    config::Config,
    error::{Error, Result},
    markup,
};

const BUILTIN_SECTIONS: &str = include_str!("../../content/sections.toml");

/// The ordered, read-only list of sections making up the reference.
///
/// A registry always holds at least one section and section ids are unique.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SectionRegistry {
    sections: Vec<Section>,
}

#[derive(Deserialize)]
struct RegistryDef {
    #[serde(default)]
    sections: Vec<Section>,
}

impl SectionRegistry {
    /// The reference shipped with the crate.
    pub fn builtin() -> Result<SectionRegistry> {
        SectionRegistry::from_str(BUILTIN_SECTIONS)
            .with_context(|| "Failed to load the built-in section registry")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<SectionRegistry> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to open section registry: {}", path.display()))?;

        SectionRegistry::from_str(&source)
            .with_context(|| format!("Failed to parse section registry: {}", path.display()))
    }

    /// Load the registry named by `config`, resolved relative to `root`, or the built-in one.
    pub fn from_config(root: impl AsRef<Path>, config: &Config) -> Result<SectionRegistry> {
        match config.viewer.sections {
            Some(ref path) => SectionRegistry::load(root.as_ref().join(path)),
            None => SectionRegistry::builtin(),
        }
    }

    pub fn new(sections: Vec<Section>) -> Result<SectionRegistry> {
        if sections.is_empty() {
            anyhow::bail!("A section registry needs at least one section");
        }

        let mut ids = HashSet::new();
        for section in &sections {
            if section.id.trim().is_empty() {
                anyhow::bail!("Section `{}` has an empty id", section.title);
            }

            if !ids.insert(section.id.as_str()) {
                anyhow::bail!("Section id `{}` is used more than once", section.id);
            }

            let (_, diagnostics) = markup::render_with_diagnostics(&section.raw_content);
            for diagnostic in diagnostics {
                warn!(section = %section.id, %diagnostic, "Section content is malformed");
            }
        }

        Ok(SectionRegistry { sections })
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.sections.iter().map(|section| section.id.as_str())
    }

    pub fn get(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Position of a section in navigation order.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|section| section.id == id)
    }

    pub fn first(&self) -> &Section {
        &self.sections[0]
    }

    pub fn example(&self, key: &SampleKey) -> Option<&CodeExample> {
        self.get(&key.section_id)?
            .code_examples
            .get(key.example_index)
    }
}

impl FromStr for SectionRegistry {
    type Err = Error;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let def: RegistryDef =
            toml::from_str(source).with_context(|| "Attempted to parse invalid section registry")?;

        SectionRegistry::new(def.sections)
    }
}
