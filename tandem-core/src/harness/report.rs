//! Plain-text result lines. Meant for humans and log scrapers, not parsers
//! with a versioned schema.

use core::fmt::{self, Write};

use crate::console::SerialConsole;

const RULE: &str = "=================================================================";

/// One kernel measured against its scalar twin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BenchmarkResult {
    pub name: &'static str,
    pub scalar_cycles: u64,
    pub vector_cycles: u64,
    pub passed: bool,
}

impl BenchmarkResult {
    /// `scalar / vector`, or `None` when the vector run measured zero cycles.
    pub fn speedup(&self) -> Option<f32> {
        if self.vector_cycles == 0 {
            None
        } else {
            Some(self.scalar_cycles as f32 / self.vector_cycles as f32)
        }
    }
}

impl fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[BENCH] {}: {} scalar={} vector={}",
            self.name,
            verdict(self.passed),
            self.scalar_cycles,
            self.vector_cycles
        )?;
        if let Some(speedup) = self.speedup() {
            write!(f, " speedup={:.2}x", speedup)?;
        }
        Ok(())
    }
}

/// Running pass/total count for a phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    pub passed: u32,
    pub total: u32,
}

impl Tally {
    pub const fn new() -> Self {
        Self { passed: 0, total: 0 }
    }

    pub fn add(&mut self, passed: bool) {
        self.total += 1;
        if passed {
            self.passed += 1;
        }
    }

    /// Counts one named test and prints its `[TEST]` line.
    pub fn record(&mut self, console: &SerialConsole<'_>, name: &str, passed: bool) {
        self.add(passed);
        console.line(format_args!("[TEST] {}: {}", name, verdict(passed)));
    }

    /// Counts one benchmark and prints its `[BENCH]` line.
    pub fn record_bench(&mut self, console: &SerialConsole<'_>, result: &BenchmarkResult) {
        self.add(result.passed);
        console.line(format_args!("{}", result));
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }

    /// Process-style exit status: 0 when everything passed.
    pub fn exit_status(&self) -> i32 {
        if self.all_passed() {
            0
        } else {
            1
        }
    }
}

pub const fn verdict(passed: bool) -> &'static str {
    if passed {
        "PASS"
    } else {
        "FAIL"
    }
}

pub fn write_banner<W: Write>(out: &mut W, platform: &str, harts: u32) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "RISC-V Bare-Metal System Explorer")?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "Platform: {}", platform)?;
    if harts > 1 {
        writeln!(out, "Phase: 4 - Multi-Core SMP ({} harts)", harts)?;
    } else {
        writeln!(out, "Phase: 2 - Single-Core Bare-Metal")?;
    }
    writeln!(out, "{}", RULE)?;
    writeln!(out)
}

pub fn write_summary<W: Write>(out: &mut W, phase: u32, tally: &Tally) -> fmt::Result {
    writeln!(out, "{}", RULE)?;
    writeln!(
        out,
        "[RESULT] Phase {} tests: {}/{} {}",
        phase,
        tally.passed,
        tally.total,
        verdict(tally.all_passed())
    )?;
    writeln!(out, "{}", RULE)?;
    writeln!(out)?;
    writeln!(out, "[INFO] Phase {} complete. System halted.", phase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bench_line_format() {
        let result = BenchmarkResult {
            name: "saxpy",
            scalar_cycles: 900,
            vector_cycles: 300,
            passed: true,
        };
        assert_eq!(result.to_string(), "[BENCH] saxpy: PASS scalar=900 vector=300 speedup=3.00x");

        let stalled = BenchmarkResult { vector_cycles: 0, passed: false, ..result };
        assert_eq!(stalled.to_string(), "[BENCH] saxpy: FAIL scalar=900 vector=0");
    }

    #[test]
    fn test_tally_exit_status() {
        let mut tally = Tally::new();
        tally.add(true);
        tally.add(true);
        assert_eq!(tally.exit_status(), 0);
        tally.add(false);
        assert_eq!(tally, Tally { passed: 2, total: 3 });
        assert_eq!(tally.exit_status(), 1);
    }

    #[test]
    fn test_summary_block() {
        let mut out = String::new();
        write_summary(&mut out, 4, &Tally { passed: 4, total: 4 }).unwrap();
        assert!(out.contains("[RESULT] Phase 4 tests: 4/4 PASS\n"));
        assert!(out.ends_with("[INFO] Phase 4 complete. System halted.\n"));
    }

    #[test]
    fn test_banner_names_the_phase() {
        let mut out = String::new();
        write_banner(&mut out, "QEMU virt", 4).unwrap();
        assert!(out.contains("Platform: QEMU virt\n"));
        assert!(out.contains("Phase: 4 - Multi-Core SMP (4 harts)\n"));

        out.clear();
        write_banner(&mut out, "QEMU virt", 1).unwrap();
        assert!(out.contains("Phase: 2 - Single-Core Bare-Metal\n"));
    }
}
