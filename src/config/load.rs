use std::{env, path::PathBuf};

use super::schema::Settings;
use crate::error::{Error, Result};

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `LUDEX__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("LUDEX")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("library.directories")
                .with_list_parse_key("library.metadata_files"),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<()> {
        if self.gog.idle_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "gog.idle_timeout_ms must be >= 1".to_string(),
            ));
        }
        if self.library.metadata_files.iter().all(|f| f.trim().is_empty()) {
            return Err(Error::InvalidConfig(
                "library.metadata_files must name at least one file".to_string(),
            ));
        }
        if !self.gog.api_url.contains("{id}") {
            return Err(Error::InvalidConfig(
                "gog.api_url must contain the `{id}` placeholder".to_string(),
            ));
        }
        Ok(())
    }

    /// Cache root for provider responses.
    pub fn cache_dir(&self) -> Option<PathBuf> {
        self.gog.cache_dir.clone().or_else(default_cache_dir)
    }
}

/// Resolve the config path from `LUDEX_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("LUDEX_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/ludex/config.toml`
/// or `~/.config/ludex/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config").map(|d| d.join("ludex").join("config.toml"))
}

/// `$XDG_CACHE_HOME/ludex` or `~/.cache/ludex`.
pub fn default_cache_dir() -> Option<PathBuf> {
    xdg_dir("XDG_CACHE_HOME", ".cache").map(|d| d.join("ludex"))
}

fn xdg_dir(var: &str, home_fallback: &str) -> Option<PathBuf> {
    if let Some(xdg) = env::var_os(var) {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(home_fallback))
    }
}
