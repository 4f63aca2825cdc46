use log::{LevelFilter, debug};

use ludex::config;

/// Old-style options file, read from the config directory.
const LEGACY_FILE: &str = "settings.txt";

pub fn load_settings() -> config::Settings {
    match config::Settings::load() {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                eprintln!("ludex: invalid config, using defaults: {msg}");
                config::Settings::default()
            } else {
                s
            }
        }
        Err(e) => {
            // Config is optional; failures should not prevent a run.
            eprintln!("ludex: failed to load config, using defaults: {e}");
            config::Settings::default()
        }
    }
}

/// Apply `settings.txt` from the config directory, if there is one.
pub fn apply_legacy(settings: &mut config::Settings) {
    let Some(path) = config::resolve_config_path()
        .and_then(|p| p.parent().map(|dir| dir.join(LEGACY_FILE)))
    else {
        return;
    };
    if !path.is_file() {
        return;
    }

    let was_silent = settings.general.silent;
    let applied = settings.apply_legacy_file(&path);
    debug!("Settings: {applied} legacy options applied");

    if settings.general.silent && !was_silent && std::env::var_os("RUST_LOG").is_none() {
        log::set_max_level(LevelFilter::Warn);
    }
}
