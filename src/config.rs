use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

/// Prefix for environment overrides, e.g. `ICAL2RSS_CHANNEL_TITLE`.
const ENV_PREFIX: &str = "ICAL2RSS";

/// Settings from ~/.config/ical2rss/config.toml and `ICAL2RSS_*` variables.
///
/// Every key is optional; command-line flags take precedence over all of them.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    pub channel_title: Option<String>,
    pub channel_link: Option<String>,
    pub channel_description: Option<String>,
    /// IANA name of the zone used for display times
    pub timezone: Option<String>,
    pub rand_guid: Option<bool>,
    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub log_level: Option<String>,
}

/// Get the config directory path (~/.config/ical2rss)
pub fn config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Could not determine config directory")?
        .join("ical2rss");
    Ok(config_dir)
}

/// Get the config file path (~/.config/ical2rss/config.toml)
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

impl Settings {
    /// Load settings from `explicit` if given (it must exist), otherwise from
    /// the default config file if there is one.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found at {}", path.display());
                }
                Self::load_with(Some(path), true, ENV_PREFIX)
            }
            None => match config_path() {
                Ok(path) => Self::load_with(Some(&path), false, ENV_PREFIX),
                Err(_) => Self::load_with(None, false, ENV_PREFIX),
            },
        }
    }

    fn load_with(path: Option<&Path>, required: bool, env_prefix: &str) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(
                File::new(&path.to_string_lossy(), FileFormat::Toml).required(required),
            );
        }

        builder
            .add_source(Environment::with_prefix(env_prefix).try_parsing(true))
            .build()
            .context("Could not read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNUSED_PREFIX: &str = "ICAL2RSS_TEST_UNSET";

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "channel_title = \"Vereinstermine\"\n\
             channel_link = \"https://verein.example.org\"\n\
             timezone = \"Europe/Berlin\"\n\
             rand_guid = true\n",
        )
        .unwrap();

        let settings = Settings::load_with(Some(&path), true, UNUSED_PREFIX).unwrap();

        assert_eq!(settings.channel_title.as_deref(), Some("Vereinstermine"));
        assert_eq!(
            settings.channel_link.as_deref(),
            Some("https://verein.example.org")
        );
        assert_eq!(settings.channel_description, None);
        assert_eq!(settings.timezone.as_deref(), Some("Europe/Berlin"));
        assert_eq!(settings.rand_guid, Some(true));
        assert_eq!(settings.log_level, None);
    }

    #[test]
    fn test_missing_optional_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let settings = Settings::load_with(Some(&path), false, UNUSED_PREFIX).unwrap();

        assert_eq!(settings.channel_title, None);
        assert_eq!(settings.rand_guid, None);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        assert!(Settings::load(Some(&path)).is_err());
    }

    #[test]
    fn test_invalid_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "rand_guid = [not toml").unwrap();

        assert!(Settings::load_with(Some(&path), true, UNUSED_PREFIX).is_err());
    }
}
