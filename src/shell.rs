//! Layout state around the content pane: theme, sidebar and the mobile menu.

use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use tracing::debug;

use crate::{error::Error, model::SectionRegistry, nav::NavigationState};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl Display for Theme {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        match source {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => anyhow::bail!("Unknown theme `{other}`"),
        }
    }
}

/// One entry of the sidebar or mobile navigation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub id: String,
    pub label: String,
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    theme: Theme,
    sidebar_collapsed: bool,
    mobile_menu_open: bool,
}

impl Layout {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            ..Default::default()
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        debug!(theme = %self.theme, "Theme changed");
        self.theme
    }

    pub fn is_sidebar_collapsed(&self) -> bool {
        self.sidebar_collapsed
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_collapsed = !self.sidebar_collapsed;
    }

    pub fn is_mobile_menu_open(&self) -> bool {
        self.mobile_menu_open
    }

    pub fn open_mobile_menu(&mut self) {
        self.mobile_menu_open = true;
    }

    pub fn close_mobile_menu(&mut self) {
        self.mobile_menu_open = false;
    }

    /// A pick from the mobile menu closes it. The id is handed back for navigation.
    pub fn select_from_mobile_menu<'a>(&mut self, id: &'a str) -> &'a str {
        self.mobile_menu_open = false;
        id
    }

    /// Navigation entries in registry order, with the active one flagged.
    pub fn nav_items(registry: &SectionRegistry, state: &NavigationState) -> Vec<NavItem> {
        registry
            .sections()
            .iter()
            .map(|section| NavItem {
                id: section.id.clone(),
                label: String::from(section.nav_label()),
                active: state.is_active(&section.id),
            })
            .collect()
    }
}
