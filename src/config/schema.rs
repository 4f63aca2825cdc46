use std::path::PathBuf;

use serde::Deserialize;

/// Top-level settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/ludex/config.toml` or `~/.config/ludex/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `LUDEX__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
///
/// A legacy `settings.txt` next to the config file is applied on top by
/// [`Settings::apply_legacy_file`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub library: LibrarySettings,
    pub gog: GogSettings,
}

/// Front-end options. Carried for the UI layer; only `silent` matters here.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    pub portable: bool,
    /// Only warnings and errors are logged.
    pub silent: bool,
    pub fullscreen: bool,
    pub locale: String,
    pub theme: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            portable: false,
            silent: false,
            fullscreen: true,
            locale: String::new(),
            theme: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Directories searched for a metadata file, in order.
    pub directories: Vec<PathBuf>,
    /// Recognised metadata file names; the first one present wins.
    pub metadata_files: Vec<String>,
    /// Whether to follow symlinks while collecting files.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            directories: Vec::new(),
            metadata_files: vec!["metadata.pegasus.txt".into(), "metadata.txt".into()],
            follow_links: true,
            include_hidden: false,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GogSettings {
    pub enabled: bool,
    /// Games in this collection are looked up in the catalog.
    pub collection: String,
    /// Per-game metadata key holding the catalog id.
    pub id_key: String,
    /// Root of the response cache; `gog/` is created below it.
    /// Defaults to `$XDG_CACHE_HOME/ludex` or `~/.cache/ludex`.
    pub cache_dir: Option<PathBuf>,
    /// A batch gives up when no request finished for this long.
    pub idle_timeout_ms: u64,
    /// Product endpoint; `{id}` is replaced by the catalog id.
    pub api_url: String,
    /// Search endpoint; the title is appended as the `search` query pair.
    pub embed_url: String,
    /// `host:port` resolved once to decide whether the network is usable.
    pub connectivity_host: String,
}

impl Default for GogSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            collection: "GOG".to_string(),
            id_key: "x-gog-id".to_string(),
            cache_dir: None,
            idle_timeout_ms: 5000,
            api_url: "https://api.gog.com/products/{id}?expand=description,screenshots,videos"
                .to_string(),
            embed_url: "https://embed.gog.com/games/ajax/filtered?mediaType=game".to_string(),
            connectivity_host: "api.gog.com:443".to_string(),
        }
    }
}
