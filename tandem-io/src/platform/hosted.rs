//! Development-host platform: every hart is an OS thread.

use std::cell::Cell;
use std::io::Write;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::{Console, CycleCounter, Platform};
use crate::csr;

thread_local! {
    static HART_ID: Cell<usize> = const { Cell::new(0) };
}

enum Sink {
    Stdout,
    Capture(Mutex<String>),
}

pub struct HostedPlatform {
    sink: Sink,
    epoch: Instant,
}

impl HostedPlatform {
    /// Console output goes to stdout.
    pub fn new() -> Self {
        Self { sink: Sink::Stdout, epoch: Instant::now() }
    }

    /// Console output is kept in memory; see [`HostedPlatform::captured`].
    pub fn capturing() -> Self {
        Self { sink: Sink::Capture(Mutex::new(String::new())), epoch: Instant::now() }
    }

    /// Everything written so far, when capturing.
    pub fn captured(&self) -> String {
        match &self.sink {
            Sink::Capture(buf) => buf.lock().map(|b| b.clone()).unwrap_or_default(),
            Sink::Stdout => String::new(),
        }
    }

    /// Declares which hart the calling thread emulates.
    pub fn bind_hart(&self, hart_id: usize) {
        HART_ID.with(|id| id.set(hart_id));
    }
}

impl Default for HostedPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for HostedPlatform {
    fn write_str(&self, s: &str) {
        match &self.sink {
            Sink::Stdout => {
                let mut out = std::io::stdout().lock();
                let _ = out.write_all(s.as_bytes());
                let _ = out.flush();
            }
            Sink::Capture(buf) => {
                if let Ok(mut b) = buf.lock() {
                    b.push_str(s);
                }
            }
        }
    }
}

impl CycleCounter for HostedPlatform {
    /// Nanoseconds since construction stand in for cycles.
    fn cycles(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }
}

impl Platform for HostedPlatform {
    fn name(&self) -> &'static str {
        "Hosted emulation"
    }

    fn hart_id(&self) -> usize {
        HART_ID.with(|id| id.get())
    }

    fn machine_status(&self) -> usize {
        csr::MSTATUS_MPP
    }

    fn wait_for_interrupt(&self) {
        std::thread::park_timeout(Duration::from_millis(1));
    }

    fn terminate(&self, status: i32) -> ! {
        let _ = std::io::stdout().flush();
        std::process::exit(status)
    }
}
