//! Command line definition and sponge parameter resolution.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use kl_analysis::{AvalancheScenario, DEFAULT_MAX_ATTEMPTS, DEFAULT_PROGRESS_INTERVAL};
use kl_keccak::{KeccakP, LaneWidth};
use kl_sponge::{ConfigError, SpongeConfig};

use crate::error::CliError;

#[derive(Parser, Debug)]
#[command(name = "kl", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub sponge: SpongeArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Sponge parameters shared by every subcommand.
///
/// Missing values are filled in: 64-bit lanes, the nominal round count for the width, and a
/// capacity chosen by the subcommand unless the rate or capacity pins it down.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct SpongeArgs {
    /// Read the whole configuration from a JSON file with `width`, `rounds`, `rate_bits` and
    /// `capacity_bits`.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Lane width in bits: any positive multiple of 8.
    #[arg(short, long, global = true)]
    pub width: Option<u32>,

    /// Number of rounds per permutation. Defaults to 12 + 2 * log2(width).
    #[arg(short, long, global = true)]
    pub rounds: Option<usize>,

    /// Rate in bits.
    #[arg(long, global = true)]
    pub rate: Option<usize>,

    /// Capacity in bits.
    #[arg(long, global = true)]
    pub capacity: Option<usize>,
}

impl SpongeArgs {
    pub fn resolve(&self) -> Result<SpongeConfig, CliError> {
        self.resolve_or(SpongeConfig::with_default_capacity)
    }

    /// Resolves the configuration, calling `default` with the width and round count when
    /// neither the rate nor the capacity was given.
    pub fn resolve_or<F>(&self, default: F) -> Result<SpongeConfig, CliError>
    where
        F: FnOnce(u32, usize) -> Result<SpongeConfig, ConfigError>,
    {
        if let Some(path) = &self.config {
            if self.width.is_some()
                || self.rounds.is_some()
                || self.rate.is_some()
                || self.capacity.is_some()
            {
                return Err(CliError::ConflictingConfig);
            }
            return load_config(path);
        }

        let width = self.width.unwrap_or(64);
        let lane_width = LaneWidth::new(width).ok_or(ConfigError::InvalidLaneWidth { width })?;
        let rounds = self
            .rounds
            .unwrap_or_else(|| KeccakP::nominal_rounds(lane_width));
        let state_bits = lane_width.state_bits();

        let config = match (self.rate, self.capacity) {
            (None, None) => default(width, rounds)?,
            (Some(rate), None) => {
                SpongeConfig::new(width, rounds, rate, state_bits.saturating_sub(rate))?
            }
            (None, Some(capacity)) => {
                SpongeConfig::new(width, rounds, state_bits.saturating_sub(capacity), capacity)?
            }
            (Some(rate), Some(capacity)) => SpongeConfig::new(width, rounds, rate, capacity)?,
        };
        Ok(config)
    }
}

fn load_config(path: &Path) -> Result<SpongeConfig, CliError> {
    let json = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| CliError::ConfigFile {
        path: path.to_path_buf(),
        source,
    })
}

/// A message given inline, as hex, or as a file. No source means the empty message.
#[derive(Args, Debug, Clone, Default)]
pub struct MessageArgs {
    /// The message, taken as UTF-8 bytes.
    pub text: Option<String>,

    /// Read the message from a file.
    #[arg(long, conflicts_with_all = ["text", "hex"])]
    pub file: Option<PathBuf>,

    /// The message as a hex string.
    #[arg(long, conflicts_with = "text")]
    pub hex: Option<String>,
}

impl MessageArgs {
    pub fn read(&self) -> Result<Vec<u8>, CliError> {
        if let Some(path) = &self.file {
            return fs::read(path).map_err(|source| CliError::Read {
                path: path.clone(),
                source,
            });
        }
        if let Some(encoded) = &self.hex {
            return Ok(hex::decode(encoded)?);
        }
        Ok(self.text.clone().unwrap_or_default().into_bytes())
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Hash a message and print the digest in hex.
    Hash {
        #[command(flatten)]
        message: MessageArgs,

        /// Digest length in bytes.
        #[arg(short, long, default_value_t = 32)]
        length: usize,
    },

    /// XOR a message with the keystream for a key and nonce. Decrypts as well.
    #[command(alias = "decrypt")]
    Encrypt {
        #[command(flatten)]
        message: MessageArgs,

        #[arg(short, long)]
        key: String,

        #[arg(short, long)]
        nonce: Option<String>,

        /// Write the raw result to a file instead of printing it in hex.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Permute a file in independent state-sized blocks, with no chaining and no padding.
    Blocks {
        input: PathBuf,

        output: PathBuf,

        /// XORed into every block's starting state, repeated to the block size.
        #[arg(short, long)]
        key: Option<String>,
    },

    /// Show how a one-bit difference in the message spreads over the rounds.
    Avalanche {
        /// Message to profile; flips the lowest bit of its last byte.
        #[arg(default_value = "test")]
        message: String,

        /// Run a preset group of comparisons instead. Each comparison fixes its own width and
        /// rounds, so this excludes a message and the sponge options.
        #[arg(long, value_enum, conflicts_with = "message")]
        scenario: Option<Scenario>,

        /// Print the reports as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Hash random inputs until two of them share a truncated digest.
    Collide {
        /// Length of each random input in bytes.
        #[arg(long, default_value_t = 16)]
        input_len: usize,

        /// Digest length in bytes.
        #[arg(long, default_value_t = 2)]
        digest_len: usize,

        #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
        max_attempts: u64,

        /// Seed for the input generator. Random if absent.
        #[arg(long)]
        seed: Option<u64>,

        /// Stop after this many seconds.
        #[arg(long)]
        timeout: Option<u64>,

        /// Attempts between progress reports.
        #[arg(long, default_value_t = DEFAULT_PROGRESS_INTERVAL)]
        progress_interval: u64,

        /// Print the outcome as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Hash a message, printing the state after every step of every permutation.
    Trace {
        #[command(flatten)]
        message: MessageArgs,

        /// Only print this round.
        #[arg(long)]
        round: Option<usize>,

        /// Digest length in bytes.
        #[arg(short, long, default_value_t = 32)]
        length: usize,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    StateSize,
    DiffusionSpeed,
    InputPatterns,
}

impl From<Scenario> for AvalancheScenario {
    fn from(scenario: Scenario) -> Self {
        match scenario {
            Scenario::StateSize => Self::StateSize,
            Scenario::DiffusionSpeed => Self::DiffusionSpeed,
            Scenario::InputPatterns => Self::InputPatterns,
        }
    }
}
