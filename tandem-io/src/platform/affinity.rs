use log::{info, warn};

use crate::error::PlatformError;

/// Pins the calling thread to one physical core so an emulated hart behaves
/// like an independent hardware thread instead of migrating between CPUs.
///
/// # Logic
/// Uses `libc::sched_setaffinity` to restrict the OS scheduler for this thread
/// to a single bit in the CPU mask.
///
/// # Errors
/// `AffinityUnavailable` if the kernel rejects the mask (e.g. core index out of
/// bounds). Callers typically log it and let the hart run floating.
#[cfg(target_os = "linux")]
pub fn pin_thread_to_core(core_id: usize) -> Result<(), PlatformError> {
    // SAFETY: an all-zero cpu_set_t is the empty set.
    let mut cpu_set: libc::cpu_set_t = unsafe { std::mem::zeroed() };

    // SAFETY: CPU_ZERO/CPU_SET only touch the stack-allocated set.
    unsafe {
        libc::CPU_ZERO(&mut cpu_set);
        libc::CPU_SET(core_id, &mut cpu_set);
    }

    // SAFETY:
    // - pid 0 refers to the calling thread.
    // - `cpu_set` is valid and its size is passed alongside it.
    let ret = unsafe {
        libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &cpu_set)
    };

    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(PlatformError::AffinityUnavailable { core_id, source: err });
    }

    info!("Thread pinned to physical core {}", core_id);
    Ok(())
}

/// Non-Linux hosts fall back to `core_affinity`, which covers the other
/// desktop kernels.
#[cfg(not(target_os = "linux"))]
pub fn pin_thread_to_core(core_id: usize) -> Result<(), PlatformError> {
    let pinned = core_affinity::set_for_current(core_affinity::CoreId { id: core_id });
    if !pinned {
        return Err(PlatformError::AffinityUnavailable {
            core_id,
            source: std::io::Error::new(std::io::ErrorKind::Unsupported, "set_for_current refused"),
        });
    }
    info!("Thread pinned to core {}", core_id);
    Ok(())
}

/// Pins, or logs and carries on floating.
pub fn pin_or_float(core_id: usize) {
    if let Err(e) = pin_thread_to_core(core_id) {
        warn!("{} (running floating)", e);
    }
}
