use std::path::Path;

use log::{info, warn};

use super::schema::Settings;
use crate::kvtext::{self, ValueMode};

const PROVIDER_NAMES: [&str; 5] = ["es2", "steam", "gog", "androidapps", "skraper"];

fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

impl Settings {
    /// Apply a legacy `settings.txt` (`general.<opt>: value`,
    /// `providers.<name>.enabled: bool`) on top of the loaded settings.
    ///
    /// Problems are reported per line and never abort loading. Returns the
    /// number of options applied.
    pub fn apply_legacy_file(&mut self, path: &Path) -> usize {
        let mut applied = 0;
        let shown = path.display().to_string();
        let report = |line: usize, msg: &str| {
            warn!("Settings: `{shown}`, line {line}: {msg}");
        };

        let result = kvtext::read_file(
            path,
            ValueMode::Joined,
            |entry| match self.apply_legacy_entry(&entry.key, &entry.text()) {
                Ok(true) => applied += 1,
                Ok(false) => {}
                Err(msg) => report(entry.line, &msg),
            },
            |err| report(err.line, &err.message),
        );

        match result {
            Ok(()) => info!("Settings: program settings loaded from `{shown}`"),
            Err(e) => warn!("Settings: failed to read `{shown}`: {e}"),
        }
        applied
    }

    /// `Ok(false)` for recognised keys that carry nothing for this crate.
    fn apply_legacy_entry(&mut self, key: &str, val: &str) -> Result<bool, String> {
        let unknown = || format!("unrecognized option `{key}`, ignored");
        let needs_bool = || format!("this option (`{key}`) must be a boolean (true/false) value");

        let sections: Vec<&str> = key.split('.').collect();
        if sections.len() < 2 {
            return Err(unknown());
        }

        match sections[0] {
            "general" => {
                if sections.len() != 2 {
                    return Err(unknown());
                }
                let general = &mut self.general;
                let flag = match sections[1] {
                    "portable" => &mut general.portable,
                    "silent" => &mut general.silent,
                    "fullscreen" => &mut general.fullscreen,
                    "locale" => {
                        general.locale = val.to_string();
                        return Ok(true);
                    }
                    "theme" => {
                        general.theme = val.to_string();
                        return Ok(true);
                    }
                    _ => return Err(unknown()),
                };
                *flag = parse_bool(val).ok_or_else(needs_bool)?;
                Ok(true)
            }
            "providers" => {
                if sections.len() != 3
                    || !PROVIDER_NAMES.contains(&sections[1])
                    || sections[2] != "enabled"
                {
                    return Err(unknown());
                }
                let enabled = parse_bool(val).ok_or_else(needs_bool)?;
                if sections[1] == "gog" {
                    self.gog.enabled = enabled;
                    return Ok(true);
                }
                Ok(false)
            }
            // key bindings belong to the input layer
            "keys" => Ok(false),
            _ => Err(unknown()),
        }
    }
}
