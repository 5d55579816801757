// Configuration Storage Service
// Handles config file read/write and version backup

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::users::DEFAULT_SESSION_DAYS;
use super::validation::DEFAULT_MAX_TEXT_CHARS;

const MAX_BACKUPS: usize = 10;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(serde_json::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub users: UsersConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            detection: DetectionConfig::default(),
            history: HistoryConfig::default(),
            users: UsersConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionConfig {
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,
    /// Characters of the submitted text kept in history
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
    #[serde(default = "default_batch_parallelism")]
    pub batch_parallelism: usize,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            preview_chars: 500,
            batch_parallelism: 4,
            timeout_ms: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
    /// JSON file backing the history; in-memory only when unset
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
            file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersConfig {
    #[serde(default = "default_session_days")]
    pub session_days: i64,
    /// JSON file backing accounts and sessions; in-memory only when unset
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            session_days: DEFAULT_SESSION_DAYS,
            file: None,
        }
    }
}

fn default_version() -> String { env!("CARGO_PKG_VERSION").to_string() }
fn default_max_text_chars() -> usize { DEFAULT_MAX_TEXT_CHARS }
fn default_preview_chars() -> usize { 500 }
fn default_batch_parallelism() -> usize { 4 }
fn default_page_size() -> usize { 10 }
fn default_max_page_size() -> usize { 100 }
fn default_session_days() -> i64 { DEFAULT_SESSION_DAYS }

pub struct ConfigStore {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_file = config_dir.join("config.json");
        Self { config_dir, config_file }
    }

    /// Get default config directory
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("textprobe"))
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Ensure config directory exists
    pub fn ensure_dir(&self) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.config_dir)?;
        Ok(())
    }

    /// Load configuration from file
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        if !self.config_file.exists() {
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_file)?;
        serde_json::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Save configuration to file
    pub fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        self.ensure_dir()?;

        // Create backup if file exists
        if self.config_file.exists() {
            self.create_backup()?;
        }

        let content = serde_json::to_string_pretty(config).map_err(ConfigError::Serialize)?;
        fs::write(&self.config_file, content)?;
        Ok(())
    }

    /// Default history file location next to the config
    pub fn history_file(&self, config: &AppConfig) -> PathBuf {
        config
            .history
            .file
            .clone()
            .unwrap_or_else(|| self.config_dir.join("history.json"))
    }

    /// Default account file location next to the config
    pub fn users_file(&self, config: &AppConfig) -> PathBuf {
        config
            .users
            .file
            .clone()
            .unwrap_or_else(|| self.config_dir.join("users.json"))
    }

    /// Create a backup of current config
    fn create_backup(&self) -> Result<(), ConfigError> {
        let backup_dir = self.config_dir.join("backups");
        fs::create_dir_all(&backup_dir)?;

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S%3f");
        let backup_file = backup_dir.join(format!("config_{}.json", timestamp));
        fs::copy(&self.config_file, &backup_file)?;

        self.cleanup_old_backups(&backup_dir, MAX_BACKUPS)
    }

    /// Remove old backups, keeping only the most recent N
    fn cleanup_old_backups(&self, backup_dir: &Path, keep: usize) -> Result<(), ConfigError> {
        let mut entries: Vec<_> = fs::read_dir(backup_dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map_or(false, |ext| ext == "json"))
            .collect();

        if entries.len() <= keep {
            return Ok(());
        }

        // Oldest first; names embed the timestamp
        entries.sort_by_key(|e| e.file_name());

        for entry in entries.iter().take(entries.len() - keep) {
            let _ = fs::remove_file(entry.path());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.detection.max_text_chars, 10_000);
        assert_eq!(config.detection.preview_chars, 500);
        assert_eq!(config.history.default_page_size, 10);
        assert!(config.history.file.is_none());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: AppConfig =
            serde_json::from_str(r#"{"detection":{"timeoutMs":250}}"#).unwrap();
        assert_eq!(parsed.detection.timeout_ms, Some(250));
        assert_eq!(parsed.detection.max_text_chars, 10_000);
        assert_eq!(parsed.history.max_page_size, 100);
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path().join("nested"));
        let config = store.load().unwrap();
        assert_eq!(config.detection.batch_parallelism, 4);
    }

    #[test]
    fn test_save_then_load_and_backup() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path().to_path_buf());

        let mut config = AppConfig::default();
        config.detection.preview_chars = 120;
        store.save(&config).unwrap();
        assert_eq!(store.load().unwrap().detection.preview_chars, 120);

        config.detection.preview_chars = 80;
        store.save(&config).unwrap();
        assert_eq!(store.load().unwrap().detection.preview_chars, 80);

        let backups = fs::read_dir(dir.path().join("backups")).unwrap().count();
        assert_eq!(backups, 1);
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.json"), "{not json").unwrap();
        let store = ConfigStore::new(dir.path().to_path_buf());
        assert!(matches!(store.load(), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_history_file_defaults_next_to_config() {
        let store = ConfigStore::new(PathBuf::from("/tmp/textprobe-test"));
        let config = AppConfig::default();
        assert_eq!(store.history_file(&config), PathBuf::from("/tmp/textprobe-test/history.json"));
        assert_eq!(store.users_file(&config), PathBuf::from("/tmp/textprobe-test/users.json"));
        assert_eq!(config.users.session_days, 7);
    }
}
