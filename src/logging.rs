use std::io::{self, Write as _};

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Install a logger that writes `[LEVEL] target: message` lines to stderr.
pub fn init(max_level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_boxed_logger(Box::new(StderrLogger { max_level }))?;
    log::set_max_level(max_level);
    Ok(())
}

struct StderrLogger {
    max_level: LevelFilter,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let _ = writeln!(
            io::stderr().lock(),
            "[{:<5}] {}: {}",
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}
