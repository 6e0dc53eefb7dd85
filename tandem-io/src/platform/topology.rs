use log::{info, warn};

/// Host core discovery, used to place one emulated hart per core.
pub struct SystemTopology {
    cores: Vec<usize>,
}

impl SystemTopology {
    /// Detects the cores this process may run on.
    pub fn new() -> Self {
        let mut cores: Vec<usize> = core_affinity::get_core_ids()
            .unwrap_or_default()
            .into_iter()
            .map(|c| c.id)
            .collect();

        if cores.is_empty() {
            let count = match std::thread::available_parallelism() {
                Ok(n) => n.get(),
                Err(e) => {
                    warn!("Failed to detect core count ({}). Fallback to 1.", e);
                    1
                }
            };
            cores = (0..count).collect();
        }

        info!("Topology Discovery: {} cores available", cores.len());
        Self { cores }
    }

    pub fn cores(&self) -> &[usize] {
        &self.cores
    }

    /// Core for `hart_id`, wrapping when there are more harts than cores.
    pub fn core_for_hart(&self, hart_id: usize) -> usize {
        self.cores[hart_id % self.cores.len()]
    }

    /// Fewer cores than harts means emulated harts time-share, which makes
    /// spin-heavy phases slow but not incorrect.
    pub fn is_oversubscribed(&self, harts: usize) -> bool {
        harts > self.cores.len()
    }
}

impl Default for SystemTopology {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hart_placement_wraps() {
        let topo = SystemTopology { cores: vec![2, 3] };
        assert_eq!(topo.core_for_hart(0), 2);
        assert_eq!(topo.core_for_hart(1), 3);
        assert_eq!(topo.core_for_hart(2), 2);
        assert!(topo.is_oversubscribed(3));
        assert!(!topo.is_oversubscribed(2));
    }
}
