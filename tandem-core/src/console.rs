//! Serialized console output shared by every hart.
//!
//! All output goes through one print lock so lines from different harts never
//! interleave. Log records take the same lock, which is why nothing may log
//! while a [`LockedWriter`] is alive.

use core::fmt::{self, Write};

use log::{LevelFilter, Log, Metadata, Record};
use tandem_io::Console;

use crate::smp::SmpState;
use crate::sync::{SpinGuard, SpinLock};

/// A console paired with the lock that serializes it.
#[derive(Clone, Copy)]
pub struct SerialConsole<'a> {
    console: &'a (dyn Console + Sync),
    lock: &'a SpinLock,
}

impl<'a> SerialConsole<'a> {
    pub fn new(console: &'a (dyn Console + Sync), lock: &'a SpinLock) -> Self {
        Self { console, lock }
    }

    /// Writes `args` as one uninterrupted unit.
    pub fn print(&self, args: fmt::Arguments<'_>) {
        let mut out = self.locked();
        // Raw console writes cannot fail.
        let _ = out.write_fmt(args);
    }

    /// Writes `args` followed by a newline as one uninterrupted unit.
    pub fn line(&self, args: fmt::Arguments<'_>) {
        let mut out = self.locked();
        let _ = out.write_fmt(args);
        let _ = out.write_char('\n');
    }

    /// Holds the print lock until the writer is dropped, for multi-line blocks.
    pub fn locked(&self) -> LockedWriter<'a> {
        LockedWriter { console: self.console, _guard: self.lock.lock() }
    }
}

/// `fmt::Write` adapter that owns the print lock.
pub struct LockedWriter<'a> {
    console: &'a (dyn Console + Sync),
    _guard: SpinGuard<'a>,
}

impl Write for LockedWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.console.write_str(s);
        Ok(())
    }

    fn write_char(&mut self, c: char) -> fmt::Result {
        self.console.write_char(c);
        Ok(())
    }
}

/// `log` backend for images without an OS: `[<LEVEL>] <message>` lines
/// written through the console under the shared print lock.
pub struct ConsoleLogger {
    console: &'static (dyn Console + Sync),
    smp: &'static SmpState,
    level: LevelFilter,
}

impl ConsoleLogger {
    pub const fn new(
        console: &'static (dyn Console + Sync),
        smp: &'static SmpState,
        level: LevelFilter,
    ) -> Self {
        Self { console, smp, level }
    }

    /// Installs `logger` as the global logger. A second call is ignored.
    pub fn install(logger: &'static ConsoleLogger) {
        if log::set_logger(logger).is_ok() {
            log::set_max_level(logger.level);
        }
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.smp
            .console(self.console)
            .line(format_args!("[{}] {}", record.level(), record.args()));
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_utils::thread;
    use tandem_io::HostedPlatform;

    #[test]
    fn test_lines_from_many_harts_never_interleave() {
        let platform = HostedPlatform::capturing();
        let lock = SpinLock::new();
        let console = SerialConsole::new(&platform, &lock);

        thread::scope(|s| {
            for hart in 0..4 {
                s.spawn(move |_| {
                    for i in 0..50 {
                        console.line(format_args!("hart {} line {} end", hart, i));
                    }
                });
            }
        })
        .unwrap();

        let captured = platform.captured();
        let lines: Vec<&str> = captured.lines().collect();
        assert_eq!(lines.len(), 200);
        for line in lines {
            assert!(line.starts_with("hart "), "torn line: {line:?}");
            assert!(line.ends_with(" end"), "torn line: {line:?}");
        }
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_logger_formats_level_prefix() {
        let platform: &'static HostedPlatform = Box::leak(Box::new(HostedPlatform::capturing()));
        let smp: &'static SmpState = Box::leak(Box::new(SmpState::new(1)));
        let logger = ConsoleLogger::new(platform, smp, LevelFilter::Info);

        logger.log(
            &Record::builder()
                .level(log::Level::Warn)
                .args(format_args!("vector unit missing"))
                .build(),
        );
        logger.log(
            &Record::builder().level(log::Level::Debug).args(format_args!("dropped")).build(),
        );

        assert_eq!(platform.captured(), "[WARN] vector unit missing\n");
    }
}
