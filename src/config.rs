//! Application-level configuration loading, including the fixed answer
//! colour palette and the countdown duration.

use std::{env, fs, io::ErrorKind, path::Path, path::PathBuf, time::Duration};

use rand::seq::IndexedRandom;
use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "HOTSEAT_BACK_CONFIG_PATH";
/// Seconds between a question being announced and it opening.
const DEFAULT_COUNTDOWN_SECS: u64 = 3;
/// Flat file holding the persisted games snapshot.
const DEFAULT_DATA_PATH: &str = "database.json";
/// Colour handed out when the palette is configured empty.
const FALLBACK_COLOUR: &str = "red";

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    countdown_secs: u64,
    data_path: PathBuf,
    colours: Vec<String>,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to baked-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(path = %path.display(), "loaded configuration");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Duration of the pre-question countdown.
    pub fn countdown(&self) -> Duration {
        Duration::from_secs(self.countdown_secs)
    }

    /// Path of the persisted snapshot file.
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Pick a display colour from the fixed palette.
    pub fn random_colour(&self) -> String {
        self.colours
            .choose(&mut rand::rng())
            .cloned()
            .unwrap_or_else(|| FALLBACK_COLOUR.into())
    }

    /// Replace the countdown duration; mainly useful in tests.
    pub fn with_countdown_secs(mut self, secs: u64) -> Self {
        self.countdown_secs = secs;
        self
    }

    /// Replace the snapshot file location.
    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            colours: default_colours(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    countdown_secs: Option<u64>,
    #[serde(default)]
    data_path: Option<PathBuf>,
    #[serde(default)]
    colours: Option<Vec<String>>,
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            countdown_secs: raw.countdown_secs.unwrap_or(defaults.countdown_secs),
            data_path: raw.data_path.unwrap_or(defaults.data_path),
            colours: raw.colours.unwrap_or(defaults.colours),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Built-in answer colour palette shipped with the binary.
fn default_colours() -> Vec<String> {
    ["red", "blue", "green", "yellow", "purple", "pink", "orange"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_countdown_and_palette() {
        let config = AppConfig::default();
        assert_eq!(config.countdown(), Duration::from_secs(3));
        let colour = config.random_colour();
        assert!(default_colours().contains(&colour));
    }

    #[test]
    fn empty_palette_falls_back_to_a_colour() {
        let config = AppConfig {
            colours: Vec::new(),
            ..AppConfig::default()
        };
        assert_eq!(config.random_colour(), "red");
    }
}
