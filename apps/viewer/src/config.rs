//! Viewer configuration read from the environment.
//!
//! | Variable                     | Default                                  |
//! |------------------------------|------------------------------------------|
//! | `BINDER_DB_PATH`             | `<local data dir>/binder-viewer/cache.db`|
//! | `BINDER_LAYOUT`              | `4x3`                                    |
//! | `BINDER_PAGES_PER_BINDER`    | `20`                                     |
//! | `BINDER_EXCLUDED_PAIR_NAMES` | empty, comma separated                   |
//! | `BINDER_CARD_BACK_URL`       | `card-back.png`                          |

use crate::error::ConfigError;
use binder_core::images::DEFAULT_CARD_BACK_URL;
use binder_core::{BinderSettings, LayoutMode};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub db_path: PathBuf,
    pub card_back_url: String,
    /// Settings before any per-file directives are applied.
    pub defaults: BinderSettings,
}

impl ViewerConfig {
    /// Read from the process environment. Call `dotenvy::dotenv()` first to
    /// pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut defaults = BinderSettings::default();

        if let Some(token) = var("BINDER_LAYOUT") {
            defaults.layout_mode = LayoutMode::from_token(&token).ok_or(ConfigError::Invalid {
                key: "BINDER_LAYOUT",
                value: token.clone(),
            })?;
        }

        if let Some(pages) = var("BINDER_PAGES_PER_BINDER") {
            defaults.pages_per_binder = pages
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|p| *p > 0)
                .ok_or(ConfigError::Invalid {
                    key: "BINDER_PAGES_PER_BINDER",
                    value: pages.clone(),
                })?;
        }

        if let Some(names) = var("BINDER_EXCLUDED_PAIR_NAMES") {
            defaults.excluded_pair_names = names
                .split(',')
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .collect();
        }

        Ok(Self {
            db_path: var("BINDER_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(default_db_path),
            card_back_url: var("BINDER_CARD_BACK_URL")
                .unwrap_or_else(|| DEFAULT_CARD_BACK_URL.to_string()),
            defaults,
        })
    }
}

fn default_db_path() -> PathBuf {
    // Use app data directory for production, fallback to current dir
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("binder-viewer")
        .join("cache.db")
}
