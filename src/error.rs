//! Unified error types for the relay.
//!
//! A single `Error` enum that every subsystem can convert into, keeping
//! the load manager's error handling uniform. All variants are `Copy` so
//! they can be cheaply passed between tasks without allocation.
//!
//! Queue-empty polls are *not* errors — they surface as `None` and mean
//! "no data this cycle". Everything here is expected and recoverable;
//! the relay keeps running in its current configuration.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level relay error
// ---------------------------------------------------------------------------

/// Every fallible operation in the relay funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A shed or reconnect request could not be satisfied.
    Load(LoadError),
    /// A frequency sample was unusable.
    Sample(SampleError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(e) => write!(f, "load: {e}"),
            Self::Sample(e) => write!(f, "sample: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Load registry errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadError {
    /// Every load is already disconnected or manually held off.
    NothingToShed,
    /// Reconnect requested but every load is already connected.
    AlreadyFullyConnected,
    /// Reconnect requested but every disconnected load is manually held
    /// off at its switch.
    BlockedByManualSwitches,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NothingToShed => write!(f, "no eligible load to shed"),
            Self::AlreadyFullyConnected => write!(f, "all loads already connected"),
            Self::BlockedByManualSwitches => {
                write!(f, "reconnect blocked by manual switch-off")
            }
        }
    }
}

impl From<LoadError> for Error {
    fn from(e: LoadError) -> Self {
        Self::Load(e)
    }
}

// ---------------------------------------------------------------------------
// Sample faults
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleError {
    /// A zero-frequency sample would divide by zero in the RoC
    /// derivation; the sample is discarded.
    ZeroFrequency,
    /// The analyser counter read zero — no period to invert.
    ZeroRawCount,
}

impl fmt::Display for SampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroFrequency => write!(f, "zero-frequency sample"),
            Self::ZeroRawCount => write!(f, "zero analyser count"),
        }
    }
}

impl From<SampleError> for Error {
    fn from(e: SampleError) -> Self {
        Self::Sample(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Relay-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_prefixed_by_subsystem() {
        let e: Error = LoadError::NothingToShed.into();
        assert_eq!(e.to_string(), "load: no eligible load to shed");

        let e: Error = SampleError::ZeroRawCount.into();
        assert_eq!(e.to_string(), "sample: zero analyser count");

        let e = Error::Config("frequency floor must be positive");
        assert_eq!(e.to_string(), "config: frequency floor must be positive");
    }
}
