//! Single-hart images: self-checks plus the vector phase.

use tandem_core::harness::{Workspace, WORKLOADS};
use tandem_core::{Config, Runtime, SmpState};
use tandem_io::{EmulatedVector, HostedPlatform};

fn run_single(config: Config, unit: EmulatedVector) -> (i32, String) {
    let _ = env_logger::builder().is_test(true).try_init();
    let platform = HostedPlatform::capturing();
    let smp = SmpState::new(1);
    let mut ws = Workspace::new();
    let status = Runtime::new(&platform, &smp, config).primary_main(unit, &mut ws);
    (status, platform.captured())
}

#[test]
fn test_vector_phase_passes_on_every_vlen() {
    for vlen in [128usize, 256, 512] {
        let unit = EmulatedVector::new(vlen).unwrap();
        let (status, out) = run_single(Config::new(1, true, vlen as u32), unit);

        assert_eq!(status, 0, "VLEN={vlen}:\n{out}");
        assert!(out.contains("RISC-V Bare-Metal System Explorer\n"));
        assert!(out.contains("Phase: 2 - Single-Core Bare-Metal\n"));
        assert!(out.contains("Hello RISC-V\n"));
        assert!(out.contains("[RVV] Available\n"));
        assert!(out.contains(&format!("[RVV] VLEN  = {vlen} bits\n")));
        assert!(out.contains(&format!("[RVV] VLENB = {} bytes\n", vlen / 8)));
        for name in WORKLOADS {
            assert!(out.contains(&format!("[BENCH] {name}: PASS scalar=")), "{name} missing");
        }
        assert!(out.contains("[RESULT] Phase 2 tests: 11/11 PASS\n"));
        assert!(out.ends_with("[INFO] Phase 2 complete. System halted.\n"));
    }
}

#[test]
fn test_missing_vector_extension_skips_cleanly() {
    let (status, out) = run_single(Config::new(1, true, 256), EmulatedVector::absent());

    assert_eq!(status, 0);
    assert!(out.contains("[RVV] Not available (misa V-bit not set)\n"));
    assert!(!out.contains("[BENCH]"));
    assert!(out.contains("[RESULT] Phase 2 tests: 5/5 PASS\n"));
}

#[test]
fn test_vector_disabled_by_config() {
    let unit = EmulatedVector::new(256).unwrap();
    let (status, out) = run_single(Config::new(1, false, 256), unit);

    assert_eq!(status, 0);
    assert!(!out.contains("[RVV]"));
    assert!(out.contains("[TEST] Memory operations: PASS\n"));
}
