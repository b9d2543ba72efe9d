/*
 * Kernel Logging System
 *
 * Implements the `log` crate's `Log` trait over the debug UART (COM2), so
 * the rest of the kernel can use log::info!/debug!/... instead of raw
 * serial writes.
 */

use log::{LevelFilter, Metadata, Record};

use crate::serial_println;

struct KernelLogger;

/// Compiled-in level ceiling. With `trace-syscalls` off, `debug!`/`trace!`
/// call sites in the trap loop, dispatcher, and syscall facade are still
/// compiled but never reach the UART - `enabled` filters them before
/// `log()` ever formats anything.
#[cfg(feature = "trace-syscalls")]
const MAX_LEVEL: LevelFilter = LevelFilter::Trace;
#[cfg(not(feature = "trace-syscalls"))]
const MAX_LEVEL: LevelFilter = LevelFilter::Info;

impl log::Log for KernelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= MAX_LEVEL
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            serial_println!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: KernelLogger = KernelLogger;

/// Install the kernel logger as the global `log` sink.
///
/// # Panics
///
/// Panics if a logger has already been installed.
pub fn init() {
    match log::set_logger(&LOGGER).map(|()| log::set_max_level(MAX_LEVEL)) {
        Ok(()) => serial_println!("logger initialized"),
        Err(err) => panic!("failed to initialize logger: {}", err),
    }
}
