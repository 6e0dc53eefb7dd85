//! Command line for the hosted simulator.

use clap::Parser;
use tandem_core::Config;
use tandem_io::error::validate_hart_count;
use tandem_io::{EmulatedVector, PlatformError};

#[derive(Parser, Debug)]
#[command(author, version, about = "Runs a tandem image with every hart on its own host thread")]
pub struct SimArgs {
    /// Harts to bring up, including the primary.
    #[arg(long, default_value_t = 1)]
    pub harts: usize,

    /// Emulated vector register width in bits.
    #[arg(long, default_value_t = 256)]
    pub vlen: usize,

    /// Skip the vector phase.
    #[arg(long)]
    pub no_vector: bool,

    /// Emulate a core without the V extension.
    #[arg(long)]
    pub no_v_bit: bool,

    /// Let the OS place hart threads.
    #[arg(long)]
    pub no_pin: bool,
}

/// Validated simulator settings.
pub struct SimSetup {
    pub config: Config,
    pub unit: EmulatedVector,
    pub pin: bool,
}

impl SimArgs {
    pub fn validate(&self) -> Result<SimSetup, PlatformError> {
        let harts = validate_hart_count(self.harts)?;
        let unit = if self.no_v_bit {
            EmulatedVector::absent()
        } else {
            EmulatedVector::new(self.vlen)?
        };
        let config = Config::new(harts as u32, !self.no_vector, self.vlen as u32);
        Ok(SimSetup { config, unit, pin: !self.no_pin })
    }
}
