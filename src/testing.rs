//! Test helpers shared across modules.

use std::sync::{Mutex, OnceLock};

use log::{Level, LevelFilter, Log, Metadata, Record};

/// Logger that keeps every record in memory.
pub struct CaptureLogger {
    records: Mutex<Vec<(Level, String)>>,
}

static LOGGER: OnceLock<CaptureLogger> = OnceLock::new();

impl Log for CaptureLogger {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut records) = self.records.lock() {
            records.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

impl CaptureLogger {
    /// Records whose message mentions `needle`. Tests run in parallel, so
    /// filter on something unique to the test, like its temp dir.
    pub fn lines_containing(&self, needle: &str) -> Vec<(Level, String)> {
        self.records
            .lock()
            .map(|r| {
                r.iter()
                    .filter(|(_, msg)| msg.contains(needle))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Install the capturing logger (once per test binary) and return it.
pub fn capture_logs() -> &'static CaptureLogger {
    let logger = LOGGER.get_or_init(|| CaptureLogger {
        records: Mutex::new(Vec::new()),
    });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(LevelFilter::Trace);
    }
    logger
}
