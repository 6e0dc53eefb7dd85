use thiserror::Error;

/// Failures of the hosted platform layer. Bare-metal images have none: a
/// misconfigured machine hangs instead.
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Invalid hart count {requested}: must be between 1 and {max}")]
    InvalidHartCount { requested: usize, max: usize },
    #[error("Unsupported VLEN {0}: must be a power of two between 64 and 65536")]
    UnsupportedVlen(usize),
    #[error("Failed to pin thread to core {core_id}: {source}")]
    AffinityUnavailable {
        core_id: usize,
        #[source]
        source: std::io::Error,
    },
}

/// Checks a requested hart count against [`crate::MAX_HARTS`].
pub fn validate_hart_count(requested: usize) -> Result<usize, PlatformError> {
    if requested == 0 || requested > crate::MAX_HARTS {
        return Err(PlatformError::InvalidHartCount { requested, max: crate::MAX_HARTS });
    }
    Ok(requested)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hart_count_bounds() {
        assert!(validate_hart_count(0).is_err());
        assert_eq!(validate_hart_count(1).unwrap(), 1);
        assert_eq!(validate_hart_count(8).unwrap(), 8);
        let err = validate_hart_count(9).unwrap_err();
        assert_eq!(err.to_string(), "Invalid hart count 9: must be between 1 and 8");
    }
}
