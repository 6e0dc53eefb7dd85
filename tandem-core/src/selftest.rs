//! Machine sanity checks for single-hart images: CSR access, console output,
//! memory, and calls.

use core::fmt::Write;
use core::ptr;

use tandem_io::Platform;

use crate::console::SerialConsole;
use crate::harness::Tally;

const PATTERN: u64 = 0xDEAD_BEEF_0000_0000;

pub fn run<P: Platform>(platform: &P, console: &SerialConsole<'_>, tally: &mut Tally) {
    console.line(format_args!("[INFO] Running Phase 2 tests..."));
    console.line(format_args!(""));

    check_csrs(platform, console, tally);
    console.line(format_args!(""));

    check_console(console, tally);
    console.line(format_args!(""));

    tally.record(console, "Memory operations", check_memory());
    console.line(format_args!(""));

    tally.record(console, "Function calls", check_calls());
    console.line(format_args!(""));
}

fn check_csrs<P: Platform>(platform: &P, console: &SerialConsole<'_>, tally: &mut Tally) {
    let hart_id = platform.hart_id();
    console.line(format_args!("[CSR] Hart ID: {}", hart_id));
    let mstatus = platform.machine_status();
    console.line(format_args!("[CSR] mstatus: {:#018x}", mstatus));

    tally.record(console, "CSR Hart ID", hart_id == 0);
    tally.record(console, "CSR mstatus", mstatus != 0);
}

fn check_console(console: &SerialConsole<'_>, tally: &mut Tally) {
    {
        let mut out = console.locked();
        let _ = out.write_str("[CONSOLE] Character output: ");
        for c in ['P', 'A', 'S', 'S'] {
            let _ = out.write_char(c);
        }
        let _ = out.write_char('\n');
    }
    tally.record(console, "Console output", true);
}

/// Writes and reads back eight tagged words through volatile accesses so the
/// round trip actually reaches memory.
fn check_memory() -> bool {
    let mut words = [0u64; 8];
    for (i, word) in words.iter_mut().enumerate() {
        // SAFETY: `word` is a live, aligned element of a local array.
        unsafe { ptr::write_volatile(word, PATTERN | i as u64) };
    }
    words.iter().enumerate().all(|(i, word)| {
        // SAFETY: as above.
        unsafe { ptr::read_volatile(word) == PATTERN | i as u64 }
    })
}

#[inline(never)]
fn helper(a: u64, b: u64) -> u64 {
    a + b + 0x42
}

#[inline(never)]
fn triangular(n: u64) -> u64 {
    if n == 0 {
        0
    } else {
        n + triangular(n - 1)
    }
}

fn check_calls() -> bool {
    helper(10, 20) == 10 + 20 + 0x42 && triangular(5) == 15
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::SpinLock;
    use tandem_io::HostedPlatform;

    #[test]
    fn test_all_checks_pass_on_the_primary() {
        let platform = HostedPlatform::capturing();
        let lock = SpinLock::new();
        let console = SerialConsole::new(&platform, &lock);
        let mut tally = Tally::new();

        run(&platform, &console, &mut tally);

        assert_eq!(tally, Tally { passed: 5, total: 5 });
        let out = platform.captured();
        assert!(out.contains("[CONSOLE] Character output: PASS\n"));
        assert!(out.contains("[TEST] CSR Hart ID: PASS\n"));
        assert!(out.contains("[TEST] Function calls: PASS\n"));
    }

    #[test]
    fn test_hart_id_check_fails_off_the_primary() {
        let platform = HostedPlatform::capturing();
        let lock = SpinLock::new();
        let console = SerialConsole::new(&platform, &lock);
        let mut tally = Tally::new();

        std::thread::scope(|s| {
            s.spawn(|| {
                platform.bind_hart(2);
                check_csrs(&platform, &console, &mut tally);
            });
        });

        assert_eq!(tally, Tally { passed: 1, total: 2 });
    }
}
