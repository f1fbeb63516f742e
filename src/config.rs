use anyhow::Context;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};
use toml::{value::Table, Value};

use crate::{
    error::{Error, Result},
    shell::Theme,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Configuration for the viewer core.
    pub viewer: ViewerConfig,

    /// Any remaining configuration, left for the hosting shell.
    rest: Value,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Config> {
        let mut buffer = String::new();
        File::open(path)
            .with_context(|| "Failed to open config file")?
            .read_to_string(&mut buffer)
            .with_context(|| "Failed to read config file")?;

        Config::from_str(&buffer)
    }

    /// Deserialize a host-specific table that the viewer itself does not interpret.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let Value::Table(ref table) = self.rest else {
            anyhow::bail!("configuration root is not a table");
        };

        let value = table
            .get(key)
            .with_context(|| format!("missing configuration table `{key}`"))?;

        value
            .clone()
            .try_into()
            .with_context(|| format!("invalid configuration table `{key}`"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            viewer: ViewerConfig::default(),
            rest: Value::Table(Table::default()),
        }
    }
}

impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        let raw = Value::deserialize(deserializer)?;
        let Value::Table(mut table) = raw else {
            return Err(D::Error::custom("docpane.toml must always be a toml table"));
        };

        let viewer: ViewerConfig = table
            .remove("viewer")
            .map(|viewer| viewer.try_into().map_err(D::Error::custom))
            .transpose()?
            .unwrap_or_default();

        if !(0.0..1.0).contains(&viewer.visibility_threshold) {
            return Err(D::Error::custom(
                "viewer.visibility-threshold must be in the range [0, 1)",
            ));
        }

        let config = Config {
            viewer,
            rest: Value::Table(table),
        };

        Ok(config)
    }
}

impl FromStr for Config {
    type Err = Error;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        toml::from_str(source).with_context(|| "Attempted to parse invalid configuration file")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct ViewerConfig {
    /// Section shown before the reader navigates anywhere.
    pub default_section: String,
    /// Language picked for a code example when the reader has not chosen one.
    pub preferred_language: String,
    /// Minimum intersection ratio a section needs before it can become active.
    pub visibility_threshold: f64,
    /// How long the "copied" confirmation stays up, in milliseconds.
    pub copy_feedback_ms: u64,
    /// How long observation is ignored after a programmatic scroll, in milliseconds.
    pub scroll_settle_ms: u64,
    /// Initial theme of the shell.
    pub theme: Theme,
    /// Optional section registry replacing the built-in one, relative to the config file.
    pub sections: Option<PathBuf>,
}

impl ViewerConfig {
    pub fn copy_feedback(&self) -> Duration {
        Duration::from_millis(self.copy_feedback_ms)
    }

    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            default_section: String::from("home"),
            preferred_language: String::from("python"),
            visibility_threshold: 0.3,
            copy_feedback_ms: 2000,
            scroll_settle_ms: 1000,
            theme: Theme::Light,
            sections: None,
        }
    }
}
