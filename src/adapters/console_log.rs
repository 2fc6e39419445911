//! Host console logger.
//!
//! A minimal [`log::Log`] backend for non-device builds: one
//! `[LEVEL target] message` line per record on stdout.  The maximum level
//! comes from `SENSORNODE_LOG` (`error`, `warn`, `info`, `debug`, `trace`),
//! defaulting to `info`.

use std::io::Write;

use log::{LevelFilter, Log, Metadata, Record};

/// Environment variable holding the log level.
pub const LOG_ENV: &str = "SENSORNODE_LOG";

pub struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "[{:<5} {}] {}", record.level(), record.target(), record.args());
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
    }
}

/// Parse a level name; unknown names fall back to `Info`.
pub fn parse_level(name: Option<&str>) -> LevelFilter {
    name.and_then(|s| s.trim().parse().ok())
        .unwrap_or(LevelFilter::Info)
}

/// Install the console logger as the global `log` backend.
///
/// Fails if a backend is already installed.
pub fn init() -> Result<(), log::SetLoggerError> {
    let level = parse_level(std::env::var(LOG_ENV).ok().as_deref());
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}
