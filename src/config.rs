//! File configuration.
//!
//! Settings are read from `seed_dump.toml` in the working directory, falling
//! back to `<config dir>/seed-dump/config.toml`:
//!
//! ```toml
//! database_url = "sqlite://db/development.sqlite3"
//!
//! [dump]
//! file = "db/seeds.rb"
//! exclude = ["id", "created_at", "updated_at"]
//! batch_size = 500
//! import = { validate = false }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{DumpError, DumpResult};
use crate::options::{DumpOptions, ImportOptions};

/// Project-local config file name.
pub const CONFIG_FILE: &str = "seed_dump.toml";

/// Top-level configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub database_url: Option<String>,
    #[serde(default)]
    pub dump: DumpSection,
}

/// The `[dump]` table. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DumpSection {
    pub file: Option<PathBuf>,
    pub append: Option<bool>,
    pub migration: Option<bool>,
    pub migration_base: Option<String>,
    pub query: Option<String>,
    pub import: Option<ImportSetting>,
    pub exclude: Option<Vec<String>>,
    pub batch_size: Option<usize>,
    pub limit: Option<usize>,
}

/// `import = true` or `import = { validate = false }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ImportSetting {
    Enabled(bool),
    Options(toml::Table),
}

impl ImportSetting {
    fn into_options(self) -> Option<ImportOptions> {
        match self {
            ImportSetting::Enabled(false) => None,
            ImportSetting::Enabled(true) => Some(ImportOptions::new()),
            ImportSetting::Options(table) => Some(ImportOptions {
                trailing: table
                    .into_iter()
                    .map(|(k, v)| (k, toml_to_ruby(&v)))
                    .collect(),
            }),
        }
    }
}

/// Render a TOML value as the Ruby text written after `key: `.
fn toml_to_ruby(value: &toml::Value) -> String {
    match value {
        // Strings are spliced verbatim so `":name"` or `"[:a, :b]"` work
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(n) => n.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => b.to_string(),
        toml::Value::Datetime(dt) => format!("\"{}\"", dt),
        toml::Value::Array(items) => {
            let items: Vec<String> = items.iter().map(toml_to_ruby).collect();
            format!("[{}]", items.join(", "))
        }
        toml::Value::Table(table) => {
            let pairs: Vec<String> = table
                .iter()
                .map(|(k, v)| format!("{}: {}", k, toml_to_ruby(v)))
                .collect();
            format!("{{{}}}", pairs.join(", "))
        }
    }
}

impl Config {
    /// Parse configuration text.
    pub fn parse(content: &str) -> DumpResult<Self> {
        toml::from_str(content).map_err(|e| DumpError::config(e.to_string()))
    }

    /// Load an explicit config file.
    pub fn load(path: &Path) -> DumpResult<Self> {
        let content = fs::read_to_string(path)?;
        debug!(path = %path.display(), "loaded config");
        Self::parse(&content)
    }

    /// Load the first config file found, or defaults when there is none.
    pub fn discover() -> DumpResult<Self> {
        match Self::candidates().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    fn candidates() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("seed-dump").join("config.toml"));
        }
        paths
    }

    /// Dump options with unset keys left at their defaults.
    pub fn dump_options(self) -> DumpOptions {
        let section = self.dump;
        let defaults = DumpOptions::default();
        DumpOptions {
            file: section.file,
            append: section.append.unwrap_or(defaults.append),
            migration: section.migration.unwrap_or(defaults.migration),
            query: section.query,
            import: section.import.and_then(ImportSetting::into_options),
            exclude: section.exclude.unwrap_or(defaults.exclude),
            batch_size: section.batch_size.unwrap_or(defaults.batch_size),
            limit: section.limit,
            migration_base: section.migration_base.unwrap_or(defaults.migration_base),
        }
    }
}
