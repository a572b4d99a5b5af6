use alloc::vec::Vec;

use crate::{KeccakSponge, SpongeConfig};

/// A stream cipher built from the sponge: absorb `key || nonce`, squeeze a keystream as long as
/// the message and XOR it in.
///
/// Encryption and decryption are the same operation. Nothing here detects key or nonce reuse,
/// and reusing a `(key, nonce)` pair reveals the XOR of the two plaintexts. Every call uses a
/// fresh sponge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeystreamCipher {
    config: SpongeConfig,
}

impl KeystreamCipher {
    #[must_use]
    pub const fn new(config: SpongeConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &SpongeConfig {
        &self.config
    }

    /// The first `len` keystream bytes for `key` and `nonce`.
    #[must_use]
    pub fn keystream(&self, key: &[u8], nonce: Option<&[u8]>, len: usize) -> Vec<u8> {
        let mut sponge = self.keyed_sponge(key, nonce);
        sponge.squeeze(len)
    }

    /// Returns `data` XORed with the keystream.
    #[must_use]
    pub fn apply(&self, key: &[u8], nonce: Option<&[u8]>, data: &[u8]) -> Vec<u8> {
        let mut out = data.to_vec();
        self.apply_in_place(key, nonce, &mut out);
        out
    }

    /// XORs the keystream into `data`.
    pub fn apply_in_place(&self, key: &[u8], nonce: Option<&[u8]>, data: &mut [u8]) {
        let keystream = self.keystream(key, nonce, data.len());
        data.iter_mut()
            .zip(keystream)
            .for_each(|(byte, key_byte)| *byte ^= key_byte);
    }

    fn keyed_sponge(&self, key: &[u8], nonce: Option<&[u8]>) -> KeccakSponge {
        let mut sponge = KeccakSponge::new(self.config);
        sponge.absorb_unchecked(key);
        if let Some(nonce) = nonce {
            sponge.absorb_unchecked(nonce);
        }
        sponge
    }
}

impl Default for KeystreamCipher {
    /// SHA3-256 parameters.
    fn default() -> Self {
        Self::new(SpongeConfig::SHA3_256)
    }
}
