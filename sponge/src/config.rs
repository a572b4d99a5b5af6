use kl_keccak::{KeccakP, LaneWidth};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Parameters of a Keccak sponge: lane width, round count, rate and capacity.
///
/// Only valid combinations can be constructed: `rate + capacity = 25 * w`, both byte aligned,
/// rate positive. Nothing else is checked, so reduced-round and zero-capacity variants are
/// accepted as-is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSpongeConfig", into = "RawSpongeConfig")]
pub struct SpongeConfig {
    width: LaneWidth,
    rounds: usize,
    rate_bits: usize,
    capacity_bits: usize,
}

impl SpongeConfig {
    /// The SHA3-224 parameters: 64-bit lanes, 24 rounds, 1152-bit rate.
    pub const SHA3_224: Self = Self::fips202(1152);
    pub const SHA3_256: Self = Self::fips202(1088);
    pub const SHA3_384: Self = Self::fips202(832);
    pub const SHA3_512: Self = Self::fips202(576);

    const fn fips202(rate_bits: usize) -> Self {
        Self {
            width: LaneWidth::W64,
            rounds: 24,
            rate_bits,
            capacity_bits: 1600 - rate_bits,
        }
    }

    pub fn new(
        width: u32,
        rounds: usize,
        rate_bits: usize,
        capacity_bits: usize,
    ) -> Result<Self, ConfigError> {
        let width = LaneWidth::new(width).ok_or(ConfigError::InvalidLaneWidth { width })?;
        if rate_bits == 0 {
            return Err(ConfigError::ZeroRate);
        }
        if rate_bits % 8 != 0 {
            return Err(ConfigError::UnalignedRate { rate_bits });
        }
        if capacity_bits % 8 != 0 {
            return Err(ConfigError::UnalignedCapacity { capacity_bits });
        }
        if rate_bits.checked_add(capacity_bits) != Some(width.state_bits()) {
            return Err(ConfigError::WidthMismatch {
                rate_bits,
                capacity_bits,
                state_bits: width.state_bits(),
            });
        }
        Ok(Self {
            width,
            rounds,
            rate_bits,
            capacity_bits,
        })
    }

    /// A configuration with capacity 512 when the state is wider than 512 bits and 8
    /// otherwise; the rate takes the rest of the state.
    pub fn with_default_capacity(width: u32, rounds: usize) -> Result<Self, ConfigError> {
        let state_bits = (width as usize).saturating_mul(25);
        let capacity_bits = if state_bits > 512 { 512 } else { 8 };
        Self::new(
            width,
            rounds,
            state_bits.saturating_sub(capacity_bits),
            capacity_bits,
        )
    }

    /// The whole state as rate, no capacity. Offers no security margin at all.
    pub fn full_rate(width: u32, rounds: usize) -> Result<Self, ConfigError> {
        let state_bits = (width as usize).saturating_mul(25);
        Self::new(width, rounds, state_bits, 0)
    }

    #[must_use]
    #[inline]
    pub const fn width(&self) -> LaneWidth {
        self.width
    }

    #[must_use]
    #[inline]
    pub const fn rounds(&self) -> usize {
        self.rounds
    }

    #[must_use]
    #[inline]
    pub const fn rate_bits(&self) -> usize {
        self.rate_bits
    }

    #[must_use]
    #[inline]
    pub const fn capacity_bits(&self) -> usize {
        self.capacity_bits
    }

    #[must_use]
    #[inline]
    pub const fn rate_bytes(&self) -> usize {
        self.rate_bits / 8
    }

    #[must_use]
    #[inline]
    pub const fn bytes_per_lane(&self) -> usize {
        self.width.bytes()
    }

    #[must_use]
    #[inline]
    pub const fn state_bytes(&self) -> usize {
        self.width.state_bytes()
    }

    #[must_use]
    pub const fn permutation(&self) -> KeccakP {
        KeccakP::new(self.width, self.rounds)
    }
}

/// The unvalidated wire form of [`SpongeConfig`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct RawSpongeConfig {
    width: u32,
    rounds: usize,
    rate_bits: usize,
    capacity_bits: usize,
}

impl TryFrom<RawSpongeConfig> for SpongeConfig {
    type Error = ConfigError;

    fn try_from(raw: RawSpongeConfig) -> Result<Self, Self::Error> {
        Self::new(raw.width, raw.rounds, raw.rate_bits, raw.capacity_bits)
    }
}

impl From<SpongeConfig> for RawSpongeConfig {
    fn from(config: SpongeConfig) -> Self {
        Self {
            width: config.width.bits(),
            rounds: config.rounds,
            rate_bits: config.rate_bits,
            capacity_bits: config.capacity_bits,
        }
    }
}
