//! Error types for buffer allocation and voice activation.
//!
//! Nothing on the processing path returns these. Construction and
//! activation are the only fallible operations in the crate.

use std::collections::TryReserveError;

use thiserror::Error;

/// Errors reported while building or activating a voice pool.
#[derive(Debug, Error)]
pub enum Error {
    /// The backing store of an audio buffer could not be reserved.
    #[error("failed to allocate audio buffer ({channels} channels x {frames} frames)")]
    Allocation {
        channels: usize,
        frames: usize,
        #[source]
        source: TryReserveError,
    },

    /// An inner module refused to activate. Every voice has been deactivated.
    #[error("voice {voice} failed to activate")]
    Activation {
        voice: usize,
        #[source]
        source: ModuleError,
    },

    /// The host asked for blocks longer than the pooled buffers hold.
    #[error("block of {requested} frames exceeds the {max}-frame pool buffers")]
    BlockTooLarge { requested: usize, max: usize },

    /// Activation at a new sample rate without deactivating first.
    #[error("expander is already active at {sample_rate} Hz")]
    AlreadyActive { sample_rate: f64 },

    #[error("invalid expander config: {0}")]
    InvalidConfig(&'static str),
}

/// Failure reported by an inner module from `Module::activate`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModuleError {
    #[error("unsupported sample rate {0} Hz")]
    UnsupportedSampleRate(f64),

    #[error("block of {requested} frames exceeds the supported {max}")]
    BlockTooLarge { requested: usize, max: usize },

    #[error("already active at {0} Hz")]
    AlreadyActive(f64),

    #[error("{0}")]
    Rejected(String),
}

/// Result type for pool construction and activation.
pub type Result<T> = std::result::Result<T, Error>;
