use serde::{Deserialize, Serialize};

use crate::model::category::DEFAULT_CATEGORY_ID;
use crate::model::task::Priority;

/// Configuration from config.toml. Every table and key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Keys the two blobs are stored under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_tasks_key")]
    pub tasks_key: String,
    #[serde(default = "default_categories_key")]
    pub categories_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            tasks_key: default_tasks_key(),
            categories_key: default_categories_key(),
        }
    }
}

fn default_tasks_key() -> String {
    "tasks".to_string()
}

fn default_categories_key() -> String {
    "categories".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub theme: Theme,
    /// Category preselected for new tasks
    #[serde(default = "default_category")]
    pub default_category: String,
    #[serde(default)]
    pub default_priority: Priority,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            theme: Theme::default(),
            default_category: default_category(),
            default_priority: Priority::default(),
        }
    }
}

fn default_category() -> String {
    DEFAULT_CATEGORY_ID.to_string()
}

/// Visual theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggle(self) -> Theme {
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

    pub fn parse_theme(s: &str) -> Option<Theme> {
        match s {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.storage.tasks_key, "tasks");
        assert_eq!(config.storage.categories_key, "categories");
        assert_eq!(config.ui.theme, Theme::Light);
        assert_eq!(config.ui.default_category, "personal");
    }

    #[test]
    fn partial_tables_fill_missing_keys() {
        let config: AppConfig = toml::from_str(
            r#"
[ui]
theme = "dark"
default_priority = "high"
"#,
        )
        .unwrap();
        assert_eq!(config.ui.theme, Theme::Dark);
        assert_eq!(config.ui.default_priority, Priority::High);
        assert_eq!(config.ui.default_category, "personal");
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[test]
    fn toggle_flips() {
        assert_eq!(Theme::Light.toggle(), Theme::Dark);
        assert_eq!(Theme::Dark.toggle().toggle(), Theme::Dark);
    }
}
