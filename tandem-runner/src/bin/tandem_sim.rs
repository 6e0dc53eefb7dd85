use anyhow::{anyhow, Context};
use clap::Parser;
use crossbeam_utils::thread;
use log::{info, warn};
use tandem_core::harness::Workspace;
use tandem_core::{Runtime, SmpState};
use tandem_io::platform::affinity::pin_or_float;
use tandem_io::platform::topology::SystemTopology;
use tandem_io::{HostedPlatform, Platform};
use tandem_runner::sim::SimArgs;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = SimArgs::parse();
    let setup = args.validate().context("invalid simulator arguments")?;
    let config = setup.config;
    let pin = setup.pin;
    info!("Starting tandem simulator: {} hart(s), VLEN {}", config.harts, config.vlen_hint);

    // 1. Interrogate hardware
    let topology = SystemTopology::new();
    if pin && topology.is_oversubscribed(config.harts as usize) {
        warn!(
            "{} harts on {} cores: spinning harts will share cores",
            config.harts,
            topology.cores().len()
        );
    }

    // 2. One thread per hart, all sharing one SmpState
    let platform = HostedPlatform::new();
    let smp = SmpState::new(config.harts);
    let runtime = Runtime::new(&platform, &smp, config);
    let mut ws = Workspace::new();

    let status = thread::scope(|s| {
        for hart_id in 1..config.harts as usize {
            let (platform, runtime, topology) = (&platform, &runtime, &topology);
            s.builder()
                .name(format!("hart-{}", hart_id))
                .spawn(move |_| {
                    if pin {
                        pin_or_float(topology.core_for_hart(hart_id));
                    }
                    platform.bind_hart(hart_id);
                    runtime.secondary_main(hart_id);
                })
                .context("failed to spawn hart thread")?;
        }

        if pin {
            pin_or_float(topology.core_for_hart(0));
        }
        platform.bind_hart(0);
        Ok::<_, anyhow::Error>(runtime.primary_main(setup.unit, &mut ws))
    })
    .map_err(|_| anyhow!("a hart thread panicked"))??;

    info!("Primary finished with status {}", status);
    platform.terminate(status)
}
