//! Launch support for the two ways to run a tandem image: on host threads
//! (`tandem-sim`) or on a RISC-V machine (`tandem-rt`).
#![cfg_attr(target_os = "none", no_std)]

#[cfg(not(target_os = "none"))]
pub mod sim;
