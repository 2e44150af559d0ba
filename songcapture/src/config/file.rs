//! INI configuration file.
//!
//! Settings live in `~/.songcapture/config.ini`. A missing file means all
//! defaults; a present file only needs the keys it wants to override.
//!
//! ```ini
//! [apple_music]
//! developer_token = eyJhbGciOi...
//! user_token = AkN3bW...
//! base_url = https://api.music.apple.com
//! artwork_size = 300
//!
//! [pagination]
//! page_size = 25
//! prefetch_threshold = 10
//!
//! [artwork]
//! memory_size = 64MB
//! asset_directory = ~/.songcapture/artwork
//! max_edge = 600
//!
//! [http]
//! timeout = 30
//!
//! [logging]
//! directory = ~/.songcapture/logs
//! level = info
//! ```

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;
use tracing::debug;

use crate::artwork::DEFAULT_ARTWORK_MEMORY_SIZE;
use crate::config::ConfigKey;
use crate::prefetch::DEFAULT_PREFETCH_THRESHOLD;
use crate::provider::{
    DEFAULT_APPLE_MUSIC_BASE_URL, DEFAULT_ARTWORK_SIZE, DEFAULT_HTTP_TIMEOUT_SECS,
};
use crate::repository::DEFAULT_PAGE_SIZE;

/// Directory name under the home directory.
pub const CONFIG_DIR_NAME: &str = ".songcapture";

/// Config file name inside [`CONFIG_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Default log level filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Errors reading or writing the config file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(String),

    #[error("Invalid value '{value}' for {section}.{key}: {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    #[error("Could not determine home directory")]
    NoHomeDirectory,
}

/// `[apple_music]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppleMusicSettings {
    pub developer_token: Option<String>,
    pub user_token: Option<String>,
    pub base_url: String,
    /// Edge length substituted into artwork URL templates.
    pub artwork_size: u32,
}

impl Default for AppleMusicSettings {
    fn default() -> Self {
        Self {
            developer_token: None,
            user_token: None,
            base_url: DEFAULT_APPLE_MUSIC_BASE_URL.to_string(),
            artwork_size: DEFAULT_ARTWORK_SIZE,
        }
    }
}

/// `[pagination]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationSettings {
    pub page_size: usize,
    pub prefetch_threshold: usize,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            prefetch_threshold: DEFAULT_PREFETCH_THRESHOLD,
        }
    }
}

/// `[artwork]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkSettings {
    /// Decoded artwork budget in bytes.
    pub memory_size: usize,
    /// Root for `musickit://` locators.
    pub asset_directory: PathBuf,
    pub max_edge: Option<u32>,
}

impl Default for ArtworkSettings {
    fn default() -> Self {
        Self {
            memory_size: DEFAULT_ARTWORK_MEMORY_SIZE as usize,
            asset_directory: config_directory().join("artwork"),
            max_edge: None,
        }
    }
}

/// `[http]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Where daily log files go; `None` logs to stderr only.
    pub directory: Option<PathBuf>,
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: Some(config_directory().join("logs")),
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub apple_music: AppleMusicSettings,
    pub pagination: PaginationSettings,
    pub artwork: ArtworkSettings,
    pub http: HttpSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Loads `~/.songcapture/config.ini`, or defaults if it does not exist.
    pub fn load() -> Result<Self, ConfigFileError> {
        let path = try_config_file_path()?;
        Self::load_from(&path)
    }

    /// Loads from `path`, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(e) => ConfigFileError::Io(e),
            ini::Error::Parse(e) => ConfigFileError::Parse(e.to_string()),
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Self::from_ini(&ini)
    }

    /// Parses INI text.
    pub fn parse(content: &str) -> Result<Self, ConfigFileError> {
        let ini = Ini::load_from_str(content).map_err(|e| ConfigFileError::Parse(e.to_string()))?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigFileError> {
        let mut config = Self::default();
        for key in ConfigKey::all() {
            let value = ini
                .section(Some(key.section()))
                .and_then(|props| props.get(key.key_name()));
            if let Some(value) = value {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    /// Renders every key as INI; unset optional keys are written empty.
    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini
    }

    /// Writes to `~/.songcapture/config.ini`, creating the directory.
    pub fn save(&self) -> Result<(), ConfigFileError> {
        let path = try_config_file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.to_ini().write_to_file(path)?;
        debug!(path = %path.display(), "Saved config file");
        Ok(())
    }
}

fn try_config_directory() -> Result<PathBuf, ConfigFileError> {
    dirs::home_dir()
        .map(|home| home.join(CONFIG_DIR_NAME))
        .ok_or(ConfigFileError::NoHomeDirectory)
}

fn try_config_file_path() -> Result<PathBuf, ConfigFileError> {
    Ok(try_config_directory()?.join(CONFIG_FILE_NAME))
}

/// `~/.songcapture`, or `./.songcapture` without a home directory.
pub fn config_directory() -> PathBuf {
    try_config_directory().unwrap_or_else(|_| PathBuf::from(CONFIG_DIR_NAME))
}

/// Path of the config file.
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

/// Expands a leading `~` to the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ConfigFile::default();
        assert_eq!(config.pagination.page_size, 25);
        assert_eq!(config.pagination.prefetch_threshold, 10);
        assert_eq!(config.artwork.memory_size, 64 * 1024 * 1024);
        assert_eq!(config.apple_music.artwork_size, 300);
        assert_eq!(config.apple_music.base_url, "https://api.music.apple.com");
        assert!(config.apple_music.developer_token.is_none());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_overrides() {
        let config = ConfigFile::parse(
            r#"
[apple_music]
developer_token = dev
user_token = usr
artwork_size = 600

[pagination]
page_size = 50
prefetch_threshold = 5

[artwork]
memory_size = 16MB
max_edge = 256

[http]
timeout = 10

[logging]
level = debug
"#,
        )
        .unwrap();

        assert_eq!(config.apple_music.developer_token.as_deref(), Some("dev"));
        assert_eq!(config.apple_music.user_token.as_deref(), Some("usr"));
        assert_eq!(config.apple_music.artwork_size, 600);
        assert_eq!(config.pagination.page_size, 50);
        assert_eq!(config.pagination.prefetch_threshold, 5);
        assert_eq!(config.artwork.memory_size, 16 * 1024 * 1024);
        assert_eq!(config.artwork.max_edge, Some(256));
        assert_eq!(config.http.timeout_secs, 10);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = ConfigFile::parse("[pagination]\npage_size = 40\n").unwrap();
        assert_eq!(config.pagination.page_size, 40);
        assert_eq!(config.pagination.prefetch_threshold, 10);
        assert_eq!(config.artwork, ArtworkSettings::default());
    }

    #[test]
    fn test_invalid_number_is_reported_with_location() {
        let err = ConfigFile::parse("[pagination]\npage_size = lots\n").unwrap_err();
        match err {
            ConfigFileError::InvalidValue {
                section, key, value, ..
            } => {
                assert_eq!(section, "pagination");
                assert_eq!(key, "page_size");
                assert_eq!(value, "lots");
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_page_size_rejected() {
        assert!(matches!(
            ConfigFile::parse("[pagination]\npage_size = 0\n"),
            Err(ConfigFileError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_invalid_size_rejected() {
        assert!(matches!(
            ConfigFile::parse("[artwork]\nmemory_size = huge\n"),
            Err(ConfigFileError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_empty_logging_directory_disables_file_logging() {
        let config = ConfigFile::parse("[logging]\ndirectory =\n").unwrap();
        assert_eq!(config.logging.directory, None);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&dir.path().join("absent.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.apple_music.developer_token = Some("dev".to_string());
        config.pagination.page_size = 30;
        config.artwork.max_edge = Some(512);
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded.apple_music.developer_token.as_deref(), Some("dev"));
        assert_eq!(loaded.pagination.page_size, 30);
        assert_eq!(loaded.artwork.max_edge, Some(512));
        assert_eq!(loaded.artwork.memory_size, config.artwork.memory_size);
        assert!(loaded.apple_music.user_token.is_none());
    }

    #[test]
    fn test_cleared_log_directory_survives_save() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");

        let mut config = ConfigFile::default();
        config.logging.directory = None;
        config.save_to(&path).unwrap();

        assert_eq!(ConfigFile::load_from(&path).unwrap().logging.directory, None);
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/logs"), home.join("logs"));
        }
    }

    #[test]
    fn test_config_file_path_name() {
        let path = config_file_path();
        assert!(path.ends_with(".songcapture/config.ini"));
    }
}
