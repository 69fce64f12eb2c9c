use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::storage::{KeyValueStore, THEME_KEY};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Unknown values fall back to the default theme.
    pub fn parse_or_default(raw: &str) -> Self {
        match raw.trim() {
            "dark" => Theme::Dark,
            "light" => Theme::Light,
            other => {
                warn!("Ignoring unknown persisted theme '{other}'");
                Theme::default()
            }
        }
    }
}

/// Current theme plus its persistence under the `theme` key.
pub struct ThemeStore {
    current: Theme,
    store: Arc<dyn KeyValueStore>,
}

impl ThemeStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            current: Theme::default(),
            store,
        }
    }

    pub fn theme(&self) -> Theme {
        self.current
    }

    pub async fn restore(&mut self) {
        self.current = match self.store.get(THEME_KEY).await {
            Ok(Some(raw)) => Theme::parse_or_default(&raw),
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!("Could not read persisted theme: {e}");
                Theme::default()
            }
        };
    }

    pub async fn set_theme(&mut self, theme: Theme) -> Theme {
        self.current = theme;
        if let Err(e) = self.store.set(THEME_KEY, theme.as_str()).await {
            warn!("Failed to persist theme: {e}");
        }
        theme
    }

    pub async fn toggle(&mut self) -> Theme {
        self.set_theme(self.current.toggled()).await
    }
}
