//! Configuration file handling.
//!
//! - [`ConfigFile`]: typed view of `~/.songcapture/config.ini`
//! - [`ConfigKey`]: `section.key` addressing for single settings
//! - [`parse_size`] / [`format_size`]: human-readable byte sizes

mod file;
mod keys;
mod size;

pub use file::{
    config_directory, config_file_path, expand_tilde, AppleMusicSettings, ArtworkSettings,
    ConfigFile, ConfigFileError, HttpSettings, LoggingSettings, PaginationSettings,
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_LOG_LEVEL,
};
pub use keys::ConfigKey;
pub use size::{format_size, parse_size};
