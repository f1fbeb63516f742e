use std::collections::HashMap;
use tracing::warn;

use crate::model::{CodeExample, SampleKey, SectionRegistry};

/// Navigation state owned by the top-level view and handed to the sidebar, the mobile
/// menu and the content pane alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    active_section_id: String,
    selected_languages: HashMap<SampleKey, String>,
}

impl NavigationState {
    /// Start at `initial` if the registry knows it, else at the first section.
    pub fn new(registry: &SectionRegistry, initial: &str) -> Self {
        let active_section_id = if registry.contains(initial) {
            String::from(initial)
        } else {
            warn!(
                section = initial,
                fallback = %registry.first().id,
                "Initial section is not in the registry"
            );
            registry.first().id.clone()
        };

        Self {
            active_section_id,
            selected_languages: HashMap::new(),
        }
    }

    pub fn active_section_id(&self) -> &str {
        &self.active_section_id
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active_section_id == id
    }

    /// Only the navigation controller moves the active section, after checking the id.
    pub(crate) fn set_active(&mut self, id: &str) {
        if self.active_section_id != id {
            self.active_section_id = String::from(id);
        }
    }

    /// The explicitly chosen language for a sample, if the reader picked one.
    pub fn selected_language(&self, key: &SampleKey) -> Option<&str> {
        self.selected_languages.get(key).map(String::as_str)
    }

    /// Record a language choice. Rejected when the sample doesn't exist or lacks `language`.
    pub fn select_language(
        &mut self,
        registry: &SectionRegistry,
        key: SampleKey,
        language: &str,
    ) -> bool {
        let Some(example) = registry.example(&key) else {
            warn!(sample = %key, "Language selected for an unknown code sample");
            return false;
        };

        if !example.contains(language) {
            warn!(sample = %key, language, "Language is not available for this code sample");
            return false;
        }

        self.selected_languages.insert(key, String::from(language));
        true
    }

    /// Language to display for a sample, falling back to `preferred` and then to the
    /// example's first language when nothing was selected.
    pub fn resolve_language<'a>(
        &self,
        key: &SampleKey,
        example: &'a CodeExample,
        preferred: &str,
    ) -> &'a str {
        example
            .resolve(self.selected_language(key), preferred)
            .language
            .as_str()
    }
}
