//! Configuration management
//!
//! Settings live in settings.json inside the data directory:
//! ```json
//! {
//!   "databaseFile": "recipe.duckdb",
//!   "passwordHashing": { "timeCost": 3, "memoryCost": 65536, "parallelism": 4, "hashLen": 32 }
//! }
//! ```
//! Keys this crate does not know about are kept untouched when saving.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::Argon2Params;

/// Default database file name inside the data directory
pub const DEFAULT_DB_FILE: &str = "recipe.duckdb";

/// Environment variable overriding the database file name
pub const DB_FILE_ENV: &str = "RECIPE_DB_FILE";

const SETTINGS_FILE: &str = "settings.json";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    database_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    password_hashing: Option<Argon2Params>,
    #[serde(flatten)]
    other: BTreeMap<String, serde_json::Value>,
}

/// Recipe configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_file: String,
    pub password_hashing: Argon2Params,
    // Keep the raw settings for preservation when saving
    raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_file: DEFAULT_DB_FILE.to_string(),
            password_hashing: Argon2Params::default(),
            raw_settings: SettingsFile::default(),
        }
    }
}

impl Config {
    /// Load config from the data directory.
    ///
    /// A missing settings file yields defaults. `RECIPE_DB_FILE` overrides
    /// the database file name (for CI/testing).
    pub fn load(recipe_dir: &Path) -> Result<Self> {
        let raw = read_settings(recipe_dir)?;

        let database_file = match std::env::var(DB_FILE_ENV).ok() {
            Some(name) if !name.trim().is_empty() => name,
            _ => raw
                .database_file
                .clone()
                .unwrap_or_else(|| DEFAULT_DB_FILE.to_string()),
        };

        Ok(Self {
            database_file,
            password_hashing: raw.password_hashing.clone().unwrap_or_default(),
            raw_settings: raw,
        })
    }

    /// Save config to the data directory, preserving keys we don't manage
    pub fn save(&self, recipe_dir: &Path) -> Result<()> {
        let mut settings = self.raw_settings.clone();

        settings.database_file = Some(self.database_file.clone());
        settings.password_hashing = Some(self.password_hashing.clone());

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(recipe_dir.join(SETTINGS_FILE), content)?;
        Ok(())
    }

    /// Path of the recipe database inside `recipe_dir`
    pub fn database_path(&self, recipe_dir: &Path) -> std::path::PathBuf {
        recipe_dir.join(&self.database_file)
    }
}

fn read_settings(recipe_dir: &Path) -> Result<SettingsFile> {
    let settings_path = recipe_dir.join(SETTINGS_FILE);
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(&settings_path)
        .with_context(|| format!("Failed to read {}", settings_path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid settings in {}", settings_path.display()))
}
