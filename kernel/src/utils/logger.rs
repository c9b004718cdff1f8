/*
 * Kernel Logging System
 *
 * Implements `log::Log` on top of a byte sink registered at boot (the serial
 * port or the console). Records are printed as `[LEVEL] message`, one per
 * line. Filtering is done by `log::set_max_level`; the logger itself accepts
 * everything once a sink is attached.
 */

use core::fmt::{self, Write};

use log::{LevelFilter, Metadata, Record, SetLoggerError};
use spin::Once;

/// Destination for formatted log output
pub trait LogSink: Sync {
    fn write_str(&self, s: &str);
}

struct SinkWriter<'a>(&'a dyn LogSink);

impl Write for SinkWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write_str(s);
        Ok(())
    }
}

pub struct KernelLogger {
    sink: Once<&'static dyn LogSink>,
}

impl KernelLogger {
    pub const fn new() -> Self {
        Self { sink: Once::new() }
    }

    /// Attach the sink. Only the first call has an effect.
    pub fn attach(&self, sink: &'static dyn LogSink) {
        self.sink.call_once(|| sink);
    }
}

impl Default for KernelLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl log::Log for KernelLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        self.sink.is_completed()
    }

    fn log(&self, record: &Record) {
        if let Some(sink) = self.sink.get() {
            let mut out = SinkWriter(*sink);
            let _ = writeln!(out, "[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: KernelLogger = KernelLogger::new();

/// Install the kernel logger with `sink` as its output.
pub fn init(sink: &'static dyn LogSink, level: LevelFilter) -> Result<(), SetLoggerError> {
    LOGGER.attach(sink);
    log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}
