use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use core_types::UiLanguage;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const CURRENT_SCHEMA_VERSION: u32 = 1;
pub const APP_DIR_NAME: &str = "notekeeper";

pub const ENV_DATA_DIR: &str = "NOTE_APP_DATA_DIR";
pub const ENV_NOTES_FILE: &str = "NOTE_APP_NOTES_FILE";
pub const ENV_PREVIEW_LENGTH: &str = "NOTE_APP_PREVIEW_LENGTH";
pub const ENV_LANGUAGE: &str = "NOTE_APP_LANG";

const DEFAULT_NOTES_FILE: &str = "notes.json";
const DEFAULT_PREVIEW_LENGTH: usize = 100;
const DEFAULT_MAX_LIST_RESULTS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Missing in hand-written files; reads as 0 and goes through migration.
    #[serde(default)]
    pub schema_version: u32,
    /// Falls back to the platform data directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_notes_file")]
    pub notes_file: String,
    #[serde(default = "default_preview_length")]
    pub preview_length: usize,
    #[serde(default = "default_max_list_results")]
    pub max_list_results: usize,
    #[serde(default)]
    pub language: UiLanguage,
}

fn default_notes_file() -> String {
    DEFAULT_NOTES_FILE.to_string()
}

const fn default_preview_length() -> usize {
    DEFAULT_PREVIEW_LENGTH
}

const fn default_max_list_results() -> usize {
    DEFAULT_MAX_LIST_RESULTS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            data_dir: None,
            notes_file: default_notes_file(),
            preview_length: DEFAULT_PREVIEW_LENGTH,
            max_list_results: DEFAULT_MAX_LIST_RESULTS,
            language: UiLanguage::default(),
        }
    }
}

impl AppConfig {
    /// Layers environment overrides on top of the file values. `lookup` is
    /// usually `|key| std::env::var(key).ok()`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|value| !value.trim().is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }

        if let Some(file) = lookup(ENV_NOTES_FILE).filter(|value| !value.trim().is_empty()) {
            self.notes_file = file;
        }

        if let Some(raw) = lookup(ENV_PREVIEW_LENGTH) {
            match raw.trim().parse::<usize>() {
                Ok(length) if length > 0 => self.preview_length = length,
                _ => warn!(value = %raw, "ignoring invalid {ENV_PREVIEW_LENGTH}"),
            }
        }

        if let Some(raw) = lookup(ENV_LANGUAGE) {
            match raw.parse::<UiLanguage>() {
                Ok(language) => self.language = language,
                Err(err) => warn!("ignoring {ENV_LANGUAGE}: {err}"),
            }
        }
    }

    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }

        match dirs::data_local_dir() {
            Some(mut dir) => {
                dir.push(APP_DIR_NAME);
                dir
            }
            None => PathBuf::from("data"),
        }
    }
}

pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join("config.json"),
        }
    }

    pub fn from_default_location() -> Result<Self> {
        let mut dir = dirs::config_dir().context("failed to resolve config_dir")?;
        dir.push(APP_DIR_NAME);
        Ok(Self::from_dir(dir))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_or_init(&self) -> Result<AppConfig> {
        if !self.path.exists() {
            let config = AppConfig::default();
            self.save(&config)?;
            return Ok(config);
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let mut config: AppConfig =
            serde_json::from_str(&raw).context("failed to parse app config json")?;
        if self.migrate(&mut config) {
            self.save(&config)?;
        }
        Ok(config)
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let text = serde_json::to_string_pretty(config).context("failed to serialize config")?;
        fs::write(&self.path, text)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }

    fn migrate(&self, config: &mut AppConfig) -> bool {
        if config.schema_version >= CURRENT_SCHEMA_VERSION {
            return false;
        }

        warn!(
            from = config.schema_version,
            to = CURRENT_SCHEMA_VERSION,
            "migrating app config schema"
        );

        if config.notes_file.trim().is_empty() {
            config.notes_file = default_notes_file();
        }
        if config.preview_length == 0 {
            config.preview_length = DEFAULT_PREVIEW_LENGTH;
        }
        config.schema_version = CURRENT_SCHEMA_VERSION;
        true
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tempfile::tempdir;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn creates_default_config_when_missing() {
        let dir = tempdir().expect("tempdir");
        let store = ConfigStore::from_dir(dir.path());
        let config = store.load_or_init().expect("load default");
        assert_eq!(config, AppConfig::default());
        assert!(store.path().exists());
        assert_eq!(config.preview_length, 100);
        assert_eq!(config.notes_file, "notes.json");
    }

    #[test]
    fn fills_missing_fields_and_migrates_old_schema() {
        let dir = tempdir().expect("tempdir");
        let store = ConfigStore::from_dir(dir.path());
        fs::write(
            store.path(),
            r#"{"schema_version": 0, "notes_file": "", "language": "zh_cn"}"#,
        )
        .expect("seed");

        let config = store.load_or_init().expect("load");
        assert_eq!(config.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(config.notes_file, "notes.json");
        assert_eq!(config.max_list_results, 50);
        assert_eq!(config.language, UiLanguage::ZhCn);

        let saved = fs::read_to_string(store.path()).expect("read back");
        assert!(saved.contains("\"schema_version\": 1"));
    }

    #[test]
    fn config_without_schema_version_keeps_user_settings() {
        let dir = tempdir().expect("tempdir");
        let store = ConfigStore::from_dir(dir.path());
        fs::write(
            store.path(),
            r#"{"notes_file": "journal.json", "preview_length": 40, "language": "zh_cn"}"#,
        )
        .expect("seed");

        let config = store.load_or_init().expect("load");
        assert_eq!(config.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(config.notes_file, "journal.json");
        assert_eq!(config.preview_length, 40);
        assert_eq!(config.language, UiLanguage::ZhCn);

        let saved = fs::read_to_string(store.path()).expect("read back");
        assert!(saved.contains("\"schema_version\": 1"));
    }

    #[test]
    fn env_overrides_take_precedence() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[
            (ENV_DATA_DIR, "/tmp/notes-here"),
            (ENV_NOTES_FILE, "mine.json"),
            (ENV_PREVIEW_LENGTH, "20"),
            (ENV_LANGUAGE, "zh"),
        ]));

        assert_eq!(config.resolve_data_dir(), PathBuf::from("/tmp/notes-here"));
        assert_eq!(config.notes_file, "mine.json");
        assert_eq!(config.preview_length, 20);
        assert_eq!(config.language, UiLanguage::ZhCn);
    }

    #[test]
    fn invalid_env_values_are_ignored() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[
            (ENV_DATA_DIR, "  "),
            (ENV_PREVIEW_LENGTH, "lots"),
            (ENV_LANGUAGE, "klingon"),
        ]));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn default_data_dir_ends_with_app_name() {
        let config = AppConfig::default();
        let dir = config.resolve_data_dir();
        assert!(dir.ends_with(APP_DIR_NAME) || dir == Path::new("data"));
    }
}
