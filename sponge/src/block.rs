use alloc::vec::Vec;
use core::{fmt, mem};

use kl_keccak::{KeccakP, KeccakState, LaneWidth, Permutation};

use crate::{BoxedObserver, UsageError};

/// Independent, unchained permutation of full-state blocks.
///
/// Each block is XORed into a zero state (after an optional repeated key), permuted for the
/// configured number of rounds and read back in full. Identical blocks give identical outputs,
/// so this shows how far a given round count diffuses structure; it is not an encryption mode.
pub struct BlockPermuter {
    width: LaneWidth,
    rounds: usize,
    state: KeccakState,
    key_block: Option<Vec<u8>>,
    observer: Option<BoxedObserver>,
}

impl BlockPermuter {
    /// 64-bit lanes, so 200-byte blocks.
    #[must_use]
    pub fn new(rounds: usize) -> Self {
        Self::with_width(LaneWidth::W64, rounds)
    }

    #[must_use]
    pub fn with_width(width: LaneWidth, rounds: usize) -> Self {
        Self {
            width,
            rounds,
            state: KeccakState::new(width),
            key_block: None,
            observer: None,
        }
    }

    /// Sets a key to be XORed into every block's starting state, repeated to the block size.
    /// An empty key means no key.
    #[must_use]
    pub fn with_key(mut self, key: &[u8]) -> Self {
        self.key_block = (!key.is_empty()).then(|| {
            key.iter()
                .copied()
                .cycle()
                .take(self.width.state_bytes())
                .collect()
        });
        self
    }

    /// The block size: the whole state, `25 * w / 8` bytes.
    #[must_use]
    pub const fn block_len(&self) -> usize {
        self.width.state_bytes()
    }

    #[must_use]
    pub const fn rounds(&self) -> usize {
        self.rounds
    }

    pub fn set_step_observer(&mut self, observer: Option<BoxedObserver>) -> Option<BoxedObserver> {
        mem::replace(&mut self.observer, observer)
    }

    /// Zeroes the state.
    pub fn reset_state(&mut self) {
        self.state.clear();
    }

    /// XORs `block` into the state from lane `(0, 0)` onwards.
    pub fn xor_block_into_state(&mut self, block: &[u8]) -> Result<(), UsageError> {
        if block.len() > self.block_len() {
            return Err(UsageError::BlockTooLong {
                len: block.len(),
                state_bytes: self.block_len(),
            });
        }
        self.state.xor_bytes(block);
        Ok(())
    }

    /// Applies rounds `0..rounds` of Keccak-p to the state.
    pub fn run_permutation(&mut self, rounds: usize) {
        let permutation = KeccakP::new(self.width, rounds);
        match self.observer.as_deref_mut() {
            Some(observer) => permutation.permute_observed(&mut self.state, observer),
            None => permutation.permute_mut(&mut self.state),
        }
    }

    /// The first `len` bytes of the serialized state.
    pub fn read_state(&self, len: usize) -> Result<Vec<u8>, UsageError> {
        if len > self.block_len() {
            return Err(UsageError::ReadTooLong {
                len,
                state_bytes: self.block_len(),
            });
        }
        Ok(self.state.to_bytes(len))
    }

    /// Transforms one block of at most [`block_len`](Self::block_len) bytes. The output is as
    /// long as the input.
    pub fn transform_block(&mut self, block: &[u8]) -> Result<Vec<u8>, UsageError> {
        if block.len() > self.block_len() {
            return Err(UsageError::BlockTooLong {
                len: block.len(),
                state_bytes: self.block_len(),
            });
        }
        self.load_and_permute(block);
        Ok(self.state.to_bytes(block.len()))
    }

    /// Transforms `data` block by block. A short final block gives an equally short output.
    #[must_use]
    pub fn transform(&mut self, data: &[u8]) -> Vec<u8> {
        let mut out = alloc::vec![0; data.len()];
        let block_len = self.block_len();
        for (chunk, out_chunk) in data.chunks(block_len).zip(out.chunks_mut(block_len)) {
            self.load_and_permute(chunk);
            self.state.write_bytes(out_chunk);
        }
        out
    }

    fn load_and_permute(&mut self, block: &[u8]) {
        self.reset_state();
        if let Some(key_block) = &self.key_block {
            self.state.xor_bytes(key_block);
        }
        self.state.xor_bytes(block);
        self.run_permutation(self.rounds);
    }
}

impl fmt::Debug for BlockPermuter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockPermuter")
            .field("width", &self.width)
            .field("rounds", &self.rounds)
            .field("keyed", &self.key_block.is_some())
            .finish_non_exhaustive()
    }
}
