//! Process-wide configuration.
//!
//! Defaults are sensible for production; an optional `vitrine.toml` in the
//! working directory can override them:
//!
//! ```toml
//! [cache]
//! enabled = true
//! ttl_minutes = 60
//! ```
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::fs::read_to_string;
use std::io::IsTerminal;
use std::path::Path;
use thiserror::Error;
use time::Duration;

static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Error, Debug)]
pub enum Error {
    #[error("config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("config file not found")]
    Io(#[from] std::io::Error),

    #[error("config is already loaded")]
    ConfigLoaded,
}

/// Global configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub general: General,
    pub cache: Cache,
}

#[derive(Debug, Clone)]
pub struct General {
    /// Log with ANSI colors. Enabled automatically when stderr is a terminal.
    pub tty: bool,
}

#[derive(Debug, Clone)]
pub struct Cache {
    /// Write rendered output to the render cache.
    pub enabled: bool,
    /// How long a cached render stays fresh.
    pub ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: General {
                tty: std::io::stderr().is_terminal(),
            },
            cache: Cache {
                enabled: true,
                ttl: Duration::minutes(60),
            },
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, overlaying defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let mut config = Self::default();
        let file: ConfigFile = toml::from_str(&read_to_string(path)?)?;

        if let Some(cache) = file.cache {
            if let Some(enabled) = cache.enabled {
                config.cache.enabled = enabled;
            }

            if let Some(minutes) = cache.ttl_minutes {
                config.cache.ttl = Duration::minutes(minutes);
            }
        }

        Ok(config)
    }
}

#[derive(Deserialize, Debug, Default)]
struct ConfigFile {
    cache: Option<CacheConfig>,
}

#[derive(Deserialize, Debug)]
struct CacheConfig {
    enabled: Option<bool>,
    ttl_minutes: Option<i64>,
}

/// Get the global configuration, loading `vitrine.toml` on first access
/// if one exists.
pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(|| {
        if Path::new("vitrine.toml").exists() {
            match Config::load("vitrine.toml") {
                Ok(config) => return config,
                Err(err) => {
                    eprintln!("vitrine.toml is invalid, using defaults: {}", err);
                }
            }
        }

        Config::default()
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.cache.enabled);
        assert_eq!(config.cache.ttl, Duration::minutes(60));
    }
}
