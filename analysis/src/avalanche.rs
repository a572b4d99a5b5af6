use kl_keccak::KeccakState;
use kl_sponge::{ConfigError, SpongeConfig, keccak_hash};
use serde::Serialize;
use tracing::instrument;

/// Length of the digest reported alongside every avalanche profile.
pub const AVALANCHE_DIGEST_LEN: usize = 32;

/// Round-by-round Hamming distance between the states of two messages differing in one bit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AvalancheReport {
    /// `distances[0]` is measured before any round, `distances[r]` after round `r - 1`.
    pub distances: Vec<u32>,
    pub state_bits: usize,
    /// The message hashed under the same configuration.
    pub digest: Vec<u8>,
}

impl AvalancheReport {
    /// Each distance as a fraction of the state size.
    pub fn fractions(&self) -> impl Iterator<Item = f64> + '_ {
        self.distances
            .iter()
            .map(|&distance| f64::from(distance) / self.state_bits as f64)
    }

    /// The fraction of differing bits after the last round.
    #[must_use]
    pub fn final_fraction(&self) -> f64 {
        self.fractions().last().unwrap_or(0.0)
    }
}

/// Profiles the avalanche effect of the permutation alone.
///
/// `message` is XORed directly into a zero state, with no padding, and so is a copy whose last
/// byte has its lowest bit flipped (`[0x00]` against `[0x01]` for the empty message). Message
/// bytes that do not fit in the state are ignored. Both states then run through the configured
/// rounds one at a time.
#[instrument(
    level = "debug",
    skip(config, message),
    fields(width = %config.width(), rounds = config.rounds(), len = message.len())
)]
#[must_use]
pub fn avalanche_profile(config: SpongeConfig, message: &[u8]) -> AvalancheReport {
    let width = config.width();
    let state_bytes = width.state_bytes();

    let mut flipped = if message.is_empty() {
        vec![0]
    } else {
        message.to_vec()
    };
    if let Some(last) = flipped.last_mut() {
        *last ^= 1;
    }

    let mut original = KeccakState::new(width);
    let mut modified = KeccakState::new(width);
    original.xor_bytes(&message[..message.len().min(state_bytes)]);
    modified.xor_bytes(&flipped[..flipped.len().min(state_bytes)]);

    let permutation = config.permutation();
    let mut distances = Vec::with_capacity(config.rounds() + 1);
    distances.push(original.hamming_distance(&modified));
    for round in 0..config.rounds() {
        permutation.apply_round(&mut original, round);
        permutation.apply_round(&mut modified, round);
        distances.push(original.hamming_distance(&modified));
    }

    AvalancheReport {
        distances,
        state_bits: width.state_bits(),
        digest: keccak_hash(config, message, AVALANCHE_DIGEST_LEN),
    }
}

/// Preset groups of `(rounds, width, message)` comparisons.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AvalancheScenario {
    /// Full rounds, shrinking lanes.
    StateSize,
    /// Full width, fewer and fewer rounds.
    DiffusionSpeed,
    /// Full strength, structured and degenerate messages.
    InputPatterns,
}

impl AvalancheScenario {
    pub const ALL: [Self; 3] = [Self::StateSize, Self::DiffusionSpeed, Self::InputPatterns];

    #[must_use]
    pub const fn cases(self) -> &'static [(usize, u32, &'static str)] {
        match self {
            Self::StateSize => &[
                (24, 256, "test"),
                (24, 128, "test"),
                (24, 64, "test"),
                (24, 32, "test"),
                (24, 16, "test"),
                (24, 8, "test"),
            ],
            Self::DiffusionSpeed => &[
                (24, 64, "A"),
                (18, 64, "B"),
                (12, 64, "C"),
                (8, 64, "D"),
                (6, 64, "E"),
                (3, 64, "F"),
            ],
            Self::InputPatterns => &[
                (24, 64, ""),
                (24, 64, "0000000000000000"),
                (24, 64, "AAAAAAAAAAAAAAAA"),
                (24, 64, "RandomText!@#123"),
                (24, 64, "1111111111111111"),
                (24, 64, "Short"),
            ],
        }
    }

    /// Profiles every case, with the capacity chosen by
    /// [`SpongeConfig::with_default_capacity`].
    pub fn run(self) -> Result<Vec<AvalancheReport>, ConfigError> {
        self.cases()
            .iter()
            .map(|&(rounds, width, message)| {
                let config = SpongeConfig::with_default_capacity(width, rounds)?;
                Ok(avalanche_profile(config, message.as_bytes()))
            })
            .collect()
    }
}
