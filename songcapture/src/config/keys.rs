//! Addressable configuration keys.
//!
//! Every setting in [`ConfigFile`] has a [`ConfigKey`] naming it as
//! `section.key`. Loading, saving, and the CLI's `config get/set/list` all
//! go through the same per-key parse and render, so they cannot disagree.

use std::fmt;
use std::str::FromStr;

use crate::config::{expand_tilde, parse_size, ConfigFile, ConfigFileError};

/// A single configuration setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    AppleMusicDeveloperToken,
    AppleMusicUserToken,
    AppleMusicBaseUrl,
    AppleMusicArtworkSize,
    PaginationPageSize,
    PaginationPrefetchThreshold,
    ArtworkMemorySize,
    ArtworkAssetDirectory,
    ArtworkMaxEdge,
    HttpTimeout,
    LoggingDirectory,
    LoggingLevel,
}

const ALL_KEYS: [ConfigKey; 12] = [
    ConfigKey::AppleMusicDeveloperToken,
    ConfigKey::AppleMusicUserToken,
    ConfigKey::AppleMusicBaseUrl,
    ConfigKey::AppleMusicArtworkSize,
    ConfigKey::PaginationPageSize,
    ConfigKey::PaginationPrefetchThreshold,
    ConfigKey::ArtworkMemorySize,
    ConfigKey::ArtworkAssetDirectory,
    ConfigKey::ArtworkMaxEdge,
    ConfigKey::HttpTimeout,
    ConfigKey::LoggingDirectory,
    ConfigKey::LoggingLevel,
];

impl ConfigKey {
    /// Every key, grouped by section in file order.
    pub fn all() -> &'static [ConfigKey] {
        &ALL_KEYS
    }

    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::AppleMusicDeveloperToken
            | ConfigKey::AppleMusicUserToken
            | ConfigKey::AppleMusicBaseUrl
            | ConfigKey::AppleMusicArtworkSize => "apple_music",
            ConfigKey::PaginationPageSize | ConfigKey::PaginationPrefetchThreshold => "pagination",
            ConfigKey::ArtworkMemorySize
            | ConfigKey::ArtworkAssetDirectory
            | ConfigKey::ArtworkMaxEdge => "artwork",
            ConfigKey::HttpTimeout => "http",
            ConfigKey::LoggingDirectory | ConfigKey::LoggingLevel => "logging",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::AppleMusicDeveloperToken => "developer_token",
            ConfigKey::AppleMusicUserToken => "user_token",
            ConfigKey::AppleMusicBaseUrl => "base_url",
            ConfigKey::AppleMusicArtworkSize => "artwork_size",
            ConfigKey::PaginationPageSize => "page_size",
            ConfigKey::PaginationPrefetchThreshold => "prefetch_threshold",
            ConfigKey::ArtworkMemorySize => "memory_size",
            ConfigKey::ArtworkAssetDirectory => "asset_directory",
            ConfigKey::ArtworkMaxEdge => "max_edge",
            ConfigKey::HttpTimeout => "timeout",
            ConfigKey::LoggingDirectory => "directory",
            ConfigKey::LoggingLevel => "level",
        }
    }

    /// `section.key`.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Whether the value should be masked when displayed.
    pub fn is_secret(&self) -> bool {
        matches!(
            self,
            ConfigKey::AppleMusicDeveloperToken | ConfigKey::AppleMusicUserToken
        )
    }

    /// Current value as it would be written to the file; empty if unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::AppleMusicDeveloperToken => {
                config.apple_music.developer_token.clone().unwrap_or_default()
            }
            ConfigKey::AppleMusicUserToken => {
                config.apple_music.user_token.clone().unwrap_or_default()
            }
            ConfigKey::AppleMusicBaseUrl => config.apple_music.base_url.clone(),
            ConfigKey::AppleMusicArtworkSize => config.apple_music.artwork_size.to_string(),
            ConfigKey::PaginationPageSize => config.pagination.page_size.to_string(),
            ConfigKey::PaginationPrefetchThreshold => {
                config.pagination.prefetch_threshold.to_string()
            }
            ConfigKey::ArtworkMemorySize => compact_size(config.artwork.memory_size),
            ConfigKey::ArtworkAssetDirectory => {
                config.artwork.asset_directory.display().to_string()
            }
            ConfigKey::ArtworkMaxEdge => config
                .artwork
                .max_edge
                .map(|e| e.to_string())
                .unwrap_or_default(),
            ConfigKey::HttpTimeout => config.http.timeout_secs.to_string(),
            ConfigKey::LoggingDirectory => config
                .logging
                .directory
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_default(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
        }
    }

    /// Value for display, with secrets masked.
    pub fn display_value(&self, config: &ConfigFile) -> String {
        let value = self.get(config);
        if self.is_secret() && !value.is_empty() {
            "********".to_string()
        } else {
            value
        }
    }

    /// Parses `value` and stores it in `config`.
    ///
    /// An empty value clears optional settings and is rejected for
    /// required ones.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigFileError> {
        let trimmed = value.trim();
        let invalid = |reason: &str| ConfigFileError::InvalidValue {
            section: self.section().to_string(),
            key: self.key_name().to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        };
        let optional_string = || (!trimmed.is_empty()).then(|| trimmed.to_string());

        match self {
            ConfigKey::AppleMusicDeveloperToken => {
                config.apple_music.developer_token = optional_string();
            }
            ConfigKey::AppleMusicUserToken => {
                config.apple_music.user_token = optional_string();
            }
            ConfigKey::AppleMusicBaseUrl => {
                if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
                    return Err(invalid("expected an http(s) URL"));
                }
                config.apple_music.base_url = trimmed.trim_end_matches('/').to_string();
            }
            ConfigKey::AppleMusicArtworkSize => {
                config.apple_music.artwork_size = parse_positive(trimmed).ok_or_else(|| {
                    invalid("expected a positive integer")
                })?;
            }
            ConfigKey::PaginationPageSize => {
                config.pagination.page_size =
                    parse_positive(trimmed).ok_or_else(|| invalid("expected a positive integer"))?;
            }
            ConfigKey::PaginationPrefetchThreshold => {
                config.pagination.prefetch_threshold = trimmed
                    .parse()
                    .map_err(|_| invalid("expected a non-negative integer"))?;
            }
            ConfigKey::ArtworkMemorySize => {
                config.artwork.memory_size = parse_size(trimmed)
                    .ok_or_else(|| invalid("expected a size such as 64MB"))?;
            }
            ConfigKey::ArtworkAssetDirectory => {
                if trimmed.is_empty() {
                    return Err(invalid("expected a directory"));
                }
                config.artwork.asset_directory = expand_tilde(trimmed);
            }
            ConfigKey::ArtworkMaxEdge => {
                config.artwork.max_edge = if trimmed.is_empty() {
                    None
                } else {
                    Some(
                        parse_positive(trimmed)
                            .ok_or_else(|| invalid("expected a positive integer"))?,
                    )
                };
            }
            ConfigKey::HttpTimeout => {
                config.http.timeout_secs = parse_positive(trimmed)
                    .ok_or_else(|| invalid("expected a positive number of seconds"))?;
            }
            ConfigKey::LoggingDirectory => {
                config.logging.directory =
                    (!trimmed.is_empty()).then(|| expand_tilde(trimmed));
            }
            ConfigKey::LoggingLevel => {
                if trimmed.is_empty() {
                    return Err(invalid("expected a level such as info or debug"));
                }
                config.logging.level = trimmed.to_string();
            }
        }
        Ok(())
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}

impl FromStr for ConfigKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_KEYS
            .iter()
            .copied()
            .find(|k| k.name() == s)
            .ok_or_else(|| format!("unknown configuration key '{}'", s))
    }
}

fn parse_positive<T>(s: &str) -> Option<T>
where
    T: FromStr + PartialOrd + Default,
{
    s.parse().ok().filter(|v| *v > T::default())
}

/// Renders a size with the largest unit that divides it exactly.
fn compact_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;
    const GB: usize = 1024 * MB;
    match bytes {
        0 => "0".to_string(),
        b if b % GB == 0 => format!("{}GB", b / GB),
        b if b % MB == 0 => format!("{}MB", b / MB),
        b if b % KB == 0 => format!("{}KB", b / KB),
        b => b.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_key_round_trips_through_name() {
        for key in ConfigKey::all() {
            let parsed: ConfigKey = key.name().parse().unwrap();
            assert_eq!(parsed, *key);
        }
    }

    #[test]
    fn test_unknown_key() {
        assert!("pagination.nope".parse::<ConfigKey>().is_err());
    }

    #[test]
    fn test_set_then_get() {
        let mut config = ConfigFile::default();
        ConfigKey::PaginationPageSize.set(&mut config, "40").unwrap();
        ConfigKey::ArtworkMemorySize.set(&mut config, "32MB").unwrap();
        assert_eq!(ConfigKey::PaginationPageSize.get(&config), "40");
        assert_eq!(ConfigKey::ArtworkMemorySize.get(&config), "32MB");
    }

    #[test]
    fn test_secrets_are_masked() {
        let mut config = ConfigFile::default();
        assert_eq!(ConfigKey::AppleMusicUserToken.display_value(&config), "");
        ConfigKey::AppleMusicUserToken.set(&mut config, "abc").unwrap();
        assert_eq!(ConfigKey::AppleMusicUserToken.display_value(&config), "********");
        assert_eq!(ConfigKey::AppleMusicUserToken.get(&config), "abc");
    }

    #[test]
    fn test_base_url_must_be_http() {
        let mut config = ConfigFile::default();
        assert!(ConfigKey::AppleMusicBaseUrl
            .set(&mut config, "ftp://x")
            .is_err());
        ConfigKey::AppleMusicBaseUrl
            .set(&mut config, "http://localhost:8080/")
            .unwrap();
        assert_eq!(config.apple_music.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_max_edge_can_be_cleared() {
        let mut config = ConfigFile::default();
        ConfigKey::ArtworkMaxEdge.set(&mut config, "512").unwrap();
        assert_eq!(config.artwork.max_edge, Some(512));
        ConfigKey::ArtworkMaxEdge.set(&mut config, "").unwrap();
        assert_eq!(config.artwork.max_edge, None);
    }

    #[test]
    fn test_compact_size() {
        assert_eq!(compact_size(64 * 1024 * 1024), "64MB");
        assert_eq!(compact_size(1536), "1536");
        assert_eq!(compact_size(2048), "2KB");
    }
}
