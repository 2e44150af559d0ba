//! Config command - inspect and edit `~/.songcapture/config.ini`.
//!
//! Every key goes through [`ConfigKey`], so values are validated and
//! rendered exactly as the library reads them. Tokens are masked in all
//! output except `config get`.

use clap::Subcommand;
use console::style;
use songcapture::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the raw value of one setting
    Get {
        /// Setting name, e.g. pagination.page_size
        key: String,
    },

    /// Validate and store a setting
    Set {
        /// Setting name, e.g. apple_music.user_token
        key: String,

        /// New value; empty clears optional settings
        value: String,
    },

    /// Restore a setting to its built-in default
    Reset {
        /// Setting name, e.g. artwork.memory_size
        key: String,
    },

    /// Show settings grouped by section
    List {
        /// Only show one section (apple_music, pagination, artwork, http, logging)
        #[arg(long)]
        section: Option<String>,
    },

    /// Show where the config file lives
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => {
            let key = parse_key(&key)?;
            let config = ConfigFile::load()?;
            println!("{}", or_unset(&key.get(&config)));
        }
        ConfigCommands::Set { key, value } => {
            let key = parse_key(&key)?;
            let mut config = ConfigFile::load()?;
            key.set(&mut config, &value)?;
            config.save()?;
            println!("{} = {}", key, or_unset(&key.display_value(&config)));
        }
        ConfigCommands::Reset { key } => {
            let key = parse_key(&key)?;
            let mut config = ConfigFile::load()?;
            reset_key(&mut config, key)?;
            config.save()?;
            println!("{} = {} (default)", key, or_unset(&key.display_value(&config)));
        }
        ConfigCommands::List { section } => {
            if let Some(section) = section.as_deref() {
                check_section(section)?;
            }
            let config = ConfigFile::load()?;
            let listing = section_listing(&config, &ConfigFile::default());
            print!("{}", render_listing(&listing, section.as_deref()));
        }
        ConfigCommands::Path => {
            let path = config_file_path();
            let note = if path.exists() {
                "exists"
            } else {
                "not created yet, defaults in effect"
            };
            println!("{} ({})", path.display(), note);
        }
    }
    Ok(())
}

/// One rendered setting.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SettingLine {
    key: ConfigKey,
    shown: String,
    is_default: bool,
}

/// Settings of one section, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SectionListing {
    section: &'static str,
    settings: Vec<SettingLine>,
}

fn parse_key(raw: &str) -> Result<ConfigKey, CliError> {
    raw.trim().parse::<ConfigKey>().map_err(|reason| {
        let names: Vec<String> = ConfigKey::all().iter().map(ConfigKey::name).collect();
        CliError::Config(format!("{} (known keys: {})", reason, names.join(", ")))
    })
}

fn check_section(section: &str) -> Result<(), CliError> {
    if ConfigKey::all().iter().any(|k| k.section() == section) {
        Ok(())
    } else {
        Err(CliError::Config(format!("unknown section '{}'", section)))
    }
}

/// Groups every key by section, comparing against `defaults`.
fn section_listing(config: &ConfigFile, defaults: &ConfigFile) -> Vec<SectionListing> {
    let mut listing: Vec<SectionListing> = Vec::new();
    for key in ConfigKey::all() {
        let line = SettingLine {
            key: *key,
            shown: key.display_value(config),
            is_default: key.get(config) == key.get(defaults),
        };
        match listing.last_mut() {
            Some(group) if group.section == key.section() => group.settings.push(line),
            _ => listing.push(SectionListing {
                section: key.section(),
                settings: vec![line],
            }),
        }
    }
    listing
}

fn render_listing(listing: &[SectionListing], only: Option<&str>) -> String {
    let mut out = String::new();
    for group in listing.iter().filter(|g| only.map_or(true, |s| s == g.section)) {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("{}\n", style(format!("[{}]", group.section)).bold()));
        for line in &group.settings {
            let marker = if line.is_default {
                format!(" {}", style("(default)").dim())
            } else {
                String::new()
            };
            out.push_str(&format!(
                "  {} = {}{}\n",
                line.key.key_name(),
                or_unset(&line.shown),
                marker
            ));
        }
    }
    out
}

/// Writes the default value of `key` back into `config`.
fn reset_key(config: &mut ConfigFile, key: ConfigKey) -> Result<(), CliError> {
    let default = key.get(&ConfigFile::default());
    key.set(config, &default)?;
    Ok(())
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}
