//! Per-hart entry points and phase sequencing.

use log::{info, warn};
use tandem_io::{Platform, VectorUnit};

use crate::config::Config;
use crate::console::SerialConsole;
use crate::harness::{self, Harness, Tally, Workspace};
use crate::smp::{self, Hart, HartState, SmpState};
use crate::{selftest, vector};

/// Everything a hart needs to run its part of an image.
pub struct Runtime<'a, P> {
    platform: &'a P,
    smp: &'a SmpState,
    config: Config,
}

impl<'a, P: Platform> Runtime<'a, P> {
    pub fn new(platform: &'a P, smp: &'a SmpState, config: Config) -> Self {
        Self { platform, smp, config }
    }

    pub fn config(&self) -> Config {
        self.config
    }

    fn console(&self) -> SerialConsole<'a> {
        self.smp.console(self.platform)
    }

    /// Runs every phase on the primary and returns the exit status.
    ///
    /// The vector phase only exists in single-hart images; a missing vector
    /// extension skips it without failing the run.
    pub fn primary_main<V: VectorUnit>(&self, unit: V, ws: &mut Workspace) -> i32 {
        let console = self.console();
        let mut hart = Hart::new(0);
        let mut tally = Tally::new();

        {
            let mut out = console.locked();
            let _ = harness::write_banner(&mut out, self.platform.name(), self.config.harts);
        }
        console.line(format_args!("Hello RISC-V"));
        console.line(format_args!(""));

        if self.config.is_smp() {
            if self.config.vector {
                warn!("vector phase disabled in multi-hart images");
            }
            smp::run_primary(self.smp, &mut hart, &console, &mut tally);
        } else {
            hart.advance(HartState::ClearState);
            self.smp.init();
            hart.advance(HartState::InitShared);
            hart.advance(HartState::Online);
            hart.advance(HartState::Participating);

            selftest::run(self.platform, &console, &mut tally);
            if self.config.vector {
                self.vector_phase(unit, ws, &console, &mut tally);
            }
            hart.advance(HartState::Idle);
        }

        {
            let mut out = console.locked();
            let _ = harness::write_summary(&mut out, self.config.phase(), &tally);
        }
        info!("run finished: {}/{} passed", tally.passed, tally.total);
        tally.exit_status()
    }

    fn vector_phase<V: VectorUnit>(
        &self,
        unit: V,
        ws: &mut Workspace,
        console: &SerialConsole<'_>,
        tally: &mut Tally,
    ) {
        let active = vector::detect(unit).map(|detected| detected.enable());
        {
            let mut out = console.locked();
            let _ = vector::report(active.as_ref(), &mut out);
        }
        console.line(format_args!(""));

        let Some(active) = active else {
            return;
        };
        console.line(format_args!("[INFO] Running vector benchmarks..."));
        for result in Harness::new(&active, self.platform).run_all(ws) {
            tally.record_bench(console, &result);
        }
        console.line(format_args!(""));
    }

    /// Secondary harts: the whole SMP sequence, returning once idle.
    pub fn secondary_main(&self, hart_id: usize) {
        let console = self.console();
        let mut hart = Hart::new(hart_id);
        smp::run_secondary(self.smp, &mut hart, &console);
    }

    /// Terminal low-power wait for secondaries and unconfigured harts.
    pub fn idle(&self) -> ! {
        loop {
            self.platform.wait_for_interrupt();
        }
    }
}
