use alloc::boxed::Box;
use alloc::vec::Vec;
use core::{fmt, mem};

use kl_keccak::{KeccakP, KeccakState, Permutation, StepObserver};
use tracing::trace;

use crate::{SpongeConfig, UsageError};

/// A step observer that can be carried by a sponge across threads.
pub type BoxedObserver = Box<dyn StepObserver + Send>;

/// Where a [`KeccakSponge`] is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpongePhase {
    /// Accepting input. The initial phase, and the phase after [`KeccakSponge::reset`].
    Absorbing,
    /// Padded and permuted; only output may be requested.
    Squeezing,
}

/// A Keccak sponge over bytes.
///
/// Input is buffered until a full rate-sized block is available, then XORed into the state
/// and permuted. The first squeeze (or an explicit [`finalize`](Self::finalize)) pads the
/// remaining input with `0x06 0x00.. 0x80` (or the single byte `0x86`), absorbs it and switches
/// to squeezing for good. Output blocks are the first `rate` bytes of the serialized state; the
/// state is permuted again only once a whole block has been handed out, so squeezing in
/// several calls yields the same bytes as one large squeeze.
pub struct KeccakSponge {
    config: SpongeConfig,
    permutation: KeccakP,
    state: KeccakState,
    phase: SpongePhase,
    /// Absorbed bytes not yet folded into the state, always shorter than the rate.
    buffer: Vec<u8>,
    /// The rate portion of the state being squeezed, and how much of it has been read.
    output_block: Vec<u8>,
    output_pos: usize,
    observer: Option<BoxedObserver>,
}

impl KeccakSponge {
    #[must_use]
    pub fn new(config: SpongeConfig) -> Self {
        Self {
            config,
            permutation: config.permutation(),
            state: KeccakState::new(config.width()),
            phase: SpongePhase::Absorbing,
            buffer: Vec::with_capacity(config.rate_bytes()),
            output_block: Vec::with_capacity(config.rate_bytes()),
            output_pos: 0,
            observer: None,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &SpongeConfig {
        &self.config
    }

    #[must_use]
    pub const fn phase(&self) -> SpongePhase {
        self.phase
    }

    /// Installs `observer` to be told about every step of every permutation this sponge runs,
    /// returning the previous one. Results are identical with or without an observer.
    pub fn set_step_observer(&mut self, observer: Option<BoxedObserver>) -> Option<BoxedObserver> {
        mem::replace(&mut self.observer, observer)
    }

    /// Appends `input` to the message, absorbing every complete rate-sized block.
    pub fn absorb(&mut self, input: &[u8]) -> Result<(), UsageError> {
        if self.phase != SpongePhase::Absorbing {
            return Err(UsageError::AbsorbAfterFinalize);
        }
        self.absorb_unchecked(input);
        Ok(())
    }

    /// [`absorb`](Self::absorb) for callers that hold a sponge known to be absorbing.
    pub(crate) fn absorb_unchecked(&mut self, input: &[u8]) {
        debug_assert_eq!(self.phase, SpongePhase::Absorbing);
        let rate = self.config.rate_bytes();
        let mut buffer = mem::take(&mut self.buffer);
        buffer.extend_from_slice(input);

        let consumed = buffer.len() - buffer.len() % rate;
        for block in buffer[..consumed].chunks_exact(rate) {
            self.absorb_block(block);
        }
        buffer.drain(..consumed);

        self.buffer = buffer;
    }

    /// Pads and absorbs the pending input, ending the absorbing phase.
    ///
    /// Squeezing finalizes implicitly, so calling this is only needed to fix the point at which
    /// input stops. Finalizing twice is an error.
    pub fn finalize(&mut self) -> Result<(), UsageError> {
        if self.phase != SpongePhase::Absorbing {
            return Err(UsageError::AlreadyFinalized);
        }
        self.pad_and_switch();
        Ok(())
    }

    /// Returns the next `len` output bytes.
    #[must_use]
    pub fn squeeze(&mut self, len: usize) -> Vec<u8> {
        let mut out = alloc::vec![0; len];
        self.squeeze_into(&mut out);
        out
    }

    /// Fills `out` with the next output bytes.
    pub fn squeeze_into(&mut self, out: &mut [u8]) {
        if self.phase == SpongePhase::Absorbing {
            self.pad_and_switch();
        }

        let rate = self.config.rate_bytes();
        let mut written = 0;
        while written < out.len() {
            if self.output_pos == rate {
                self.permute();
                self.load_output_block();
            }
            let take = (rate - self.output_pos).min(out.len() - written);
            out[written..written + take]
                .copy_from_slice(&self.output_block[self.output_pos..self.output_pos + take]);
            self.output_pos += take;
            written += take;
        }
    }

    /// The current state. Only readable once the sponge has been finalized.
    pub fn state(&self) -> Result<&KeccakState, UsageError> {
        match self.phase {
            SpongePhase::Absorbing => Err(UsageError::NotFinalized),
            SpongePhase::Squeezing => Ok(&self.state),
        }
    }

    /// Returns to the initial absorbing phase with a zero state, keeping the configuration and
    /// any installed observer.
    pub fn reset(&mut self) {
        trace!("resetting sponge");
        self.state.clear();
        self.phase = SpongePhase::Absorbing;
        self.buffer.clear();
        self.output_block.clear();
        self.output_pos = 0;
    }

    fn absorb_block(&mut self, block: &[u8]) {
        self.state.xor_bytes(block);
        self.permute();
    }

    fn pad_and_switch(&mut self) {
        let rate = self.config.rate_bytes();
        let mut block = mem::take(&mut self.buffer);
        trace!(pending = block.len(), rate, "padding final block");

        if rate - block.len() == 1 {
            block.push(0x86);
        } else {
            block.push(0x06);
            block.resize(rate - 1, 0);
            block.push(0x80);
        }
        self.absorb_block(&block);

        block.clear();
        self.buffer = block;
        self.phase = SpongePhase::Squeezing;
        self.load_output_block();
    }

    fn load_output_block(&mut self) {
        self.output_block.resize(self.config.rate_bytes(), 0);
        self.state.write_bytes(&mut self.output_block);
        self.output_pos = 0;
    }

    fn permute(&mut self) {
        match self.observer.as_deref_mut() {
            Some(observer) => self.permutation.permute_observed(&mut self.state, observer),
            None => self.permutation.permute_mut(&mut self.state),
        }
    }
}

impl fmt::Debug for KeccakSponge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeccakSponge")
            .field("config", &self.config)
            .field("phase", &self.phase)
            .field("buffered", &self.buffer.len())
            .field("output_pos", &self.output_pos)
            .field("observed", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

/// Hashes `input` with a fresh sponge, returning `output_len` bytes.
#[must_use]
pub fn keccak_hash(config: SpongeConfig, input: &[u8], output_len: usize) -> Vec<u8> {
    let mut sponge = KeccakSponge::new(config);
    sponge.absorb_unchecked(input);
    sponge.squeeze(output_len)
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use hex_literal::hex;

    use super::*;

    fn sha3_256_config() -> SpongeConfig {
        SpongeConfig::new(64, 24, 1088, 512).unwrap()
    }

    #[test]
    fn test_krypto_known_answer() {
        let mut sponge = KeccakSponge::new(sha3_256_config());
        sponge.absorb(b"krypto").unwrap();
        assert_eq!(
            sponge.squeeze(32),
            hex!("19f57e3fc385b77a12329c0270beef8540d11b41df8e00623819c52f128b763c")
        );
    }

    #[test]
    fn test_zero_rounds_exposes_padding() {
        let config = SpongeConfig::new(16, 0, 256, 144).unwrap();
        let mut sponge = KeccakSponge::new(config);
        let out = sponge.squeeze(32);
        assert_eq!(out[0], 0x06);
        assert!(out[1..31].iter().all(|&b| b == 0));
        assert_eq!(out[31], 0x80);
    }

    #[test]
    fn test_single_byte_padding() {
        // One byte short of a block: the padding collapses to 0x86.
        let config = SpongeConfig::new(8, 0, 64, 136).unwrap();
        let mut sponge = KeccakSponge::new(config);
        sponge.absorb(&[1, 2, 3, 4, 5, 6, 7]).unwrap();
        assert_eq!(sponge.squeeze(8), vec![1, 2, 3, 4, 5, 6, 7, 0x86]);

        // A full block is absorbed first, then padded as an empty block.
        let mut sponge = KeccakSponge::new(config);
        sponge.absorb(&[0xff; 8]).unwrap();
        assert_eq!(
            sponge.squeeze(8),
            vec![0xff ^ 0x06, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff ^ 0x80]
        );
    }

    #[test]
    fn test_one_byte_rate() {
        let config = SpongeConfig::new(8, 0, 8, 192).unwrap();
        let mut sponge = KeccakSponge::new(config);
        sponge.absorb(&[0x10, 0x20]).unwrap();
        // Two blocks XORed into lane (0, 0), then 0x86.
        assert_eq!(sponge.squeeze(3), vec![0x10 ^ 0x20 ^ 0x86; 3]);
    }

    #[test]
    fn test_phases() {
        let mut sponge = KeccakSponge::new(sha3_256_config());
        assert_eq!(sponge.phase(), SpongePhase::Absorbing);
        assert_eq!(sponge.state().unwrap_err(), UsageError::NotFinalized);

        sponge.finalize().unwrap();
        assert_eq!(sponge.phase(), SpongePhase::Squeezing);
        assert!(sponge.state().is_ok());
        assert_eq!(sponge.finalize(), Err(UsageError::AlreadyFinalized));
        assert_eq!(sponge.absorb(b"late"), Err(UsageError::AbsorbAfterFinalize));

        sponge.reset();
        assert_eq!(sponge.phase(), SpongePhase::Absorbing);
        sponge.absorb(b"krypto").unwrap();
    }

    #[test]
    fn test_squeeze_zero_finalizes() {
        let mut sponge = KeccakSponge::new(sha3_256_config());
        assert!(sponge.squeeze(0).is_empty());
        assert_eq!(sponge.absorb(b""), Err(UsageError::AbsorbAfterFinalize));
    }

    #[test]
    fn test_keccak_hash_matches_sponge() {
        let config = sha3_256_config();
        let mut sponge = KeccakSponge::new(config);
        sponge.absorb(b"krypto").unwrap();
        assert_eq!(keccak_hash(config, b"krypto", 100), sponge.squeeze(100));

        // Several full blocks and a partial one, through the unchecked path.
        let input = [0x5a; 3 * 136 + 17];
        let mut sponge = KeccakSponge::new(config);
        sponge.absorb(&input[..100]).unwrap();
        sponge.absorb(&input[100..]).unwrap();
        assert_eq!(keccak_hash(config, &input, 64), sponge.squeeze(64));
    }

    #[test]
    fn test_keccak_hash_wide_lanes() {
        let config = SpongeConfig::new(128, 24, 2688, 512).unwrap();
        assert_eq!(
            keccak_hash(config, b"test", 32),
            hex!("9fbb585a4aa649e9abadea0530783d2312ad28c06d55dbb5876c4cc0861a620d")
        );
    }
}
