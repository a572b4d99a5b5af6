//! Error types for sponge configuration and misuse.

use thiserror::Error;

/// A rejected `(w, rounds, rate, capacity)` combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The lane width is not a positive multiple of 8.
    #[error("lane width {width} is not a positive multiple of 8")]
    InvalidLaneWidth { width: u32 },

    #[error("rate must be positive")]
    ZeroRate,

    #[error("rate of {rate_bits} bits is not a whole number of bytes")]
    UnalignedRate { rate_bits: usize },

    #[error("capacity of {capacity_bits} bits is not a whole number of bytes")]
    UnalignedCapacity { capacity_bits: usize },

    /// `rate + capacity` does not equal the state width `25 * w`.
    #[error(
        "rate ({rate_bits}) + capacity ({capacity_bits}) must equal the state width of {state_bits} bits"
    )]
    WidthMismatch {
        rate_bits: usize,
        capacity_bits: usize,
        state_bits: usize,
    },
}

/// An operation called in a sponge phase that does not allow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("cannot absorb after the sponge has been finalized")]
    AbsorbAfterFinalize,

    #[error("the sponge has already been finalized")]
    AlreadyFinalized,

    #[error("the state cannot be read before the sponge is finalized")]
    NotFinalized,

    #[error("a block of {len} bytes does not fit a {state_bytes}-byte state")]
    BlockTooLong { len: usize, state_bytes: usize },

    #[error("cannot read {len} bytes from a {state_bytes}-byte state")]
    ReadTooLong { len: usize, state_bytes: usize },
}
