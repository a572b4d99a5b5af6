use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::LaneWidth;

/// The 5x5 array of `w`-bit lanes that the permutation acts on.
///
/// Lane `(x, y)` is stored at index `x + 5 * y`, as [`LaneWidth::limbs`] little-endian `u64`
/// limbs, and every lane is kept masked to its low `w` bits. Serialization visits lanes in that
/// same row-major order (y outer, x inner), each lane as `w / 8` little-endian bytes.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct KeccakState {
    limbs: Vec<u64>,
    width: LaneWidth,
}

impl KeccakState {
    /// The all-zero state.
    #[must_use]
    pub fn new(width: LaneWidth) -> Self {
        Self {
            limbs: vec![0; 25 * width.limbs()],
            width,
        }
    }

    /// Builds a state from the limbs of 25 lanes in `x + 5 * y` order. Bits above `w` are
    /// discarded.
    ///
    /// # Panics
    /// Panics unless `lanes` holds exactly `25 * width.limbs()` limbs.
    #[must_use]
    pub fn from_lanes(width: LaneWidth, lanes: &[u64]) -> Self {
        let k = width.limbs();
        assert_eq!(lanes.len(), 25 * k, "expected {} limbs", 25 * k);
        let mut limbs = lanes.to_vec();
        for lane in limbs.chunks_exact_mut(k) {
            lane[k - 1] &= width.mask();
        }
        Self { limbs, width }
    }

    #[must_use]
    #[inline]
    pub const fn width(&self) -> LaneWidth {
        self.width
    }

    /// Every limb of every lane, lane `(x, y)` at `(x + 5 * y) * width.limbs()`.
    #[must_use]
    #[inline]
    pub fn lanes(&self) -> &[u64] {
        &self.limbs
    }

    #[inline]
    pub(crate) fn lanes_mut(&mut self) -> &mut [u64] {
        &mut self.limbs
    }

    /// The 25 lanes as single words, if the width fits one limb.
    #[inline]
    pub(crate) fn word_lanes_mut(&mut self) -> Option<&mut [u64; 25]> {
        self.limbs.as_mut_slice().try_into().ok()
    }

    /// The limbs of lane `(x, y)`, least significant first.
    #[must_use]
    #[inline]
    pub fn lane(&self, x: usize, y: usize) -> &[u64] {
        let k = self.width.limbs();
        &self.limbs[(x + 5 * y) * k..][..k]
    }

    /// Bit `z` of lane `(x, y)`.
    #[must_use]
    #[inline]
    pub fn bit(&self, x: usize, y: usize, z: usize) -> bool {
        (self.lane(x, y)[z / 64] >> (z % 64)) & 1 != 0
    }

    /// Resets every lane to zero, keeping the width.
    pub fn clear(&mut self) {
        self.limbs.fill(0);
    }

    /// XORs `bytes` into the state, starting at lane `(0, 0)`.
    ///
    /// Bytes are grouped into `w / 8`-byte little-endian chunks, a short final chunk being
    /// zero-extended, and the chunks are XORed into successive lanes in row-major order.
    ///
    /// # Panics
    /// Panics if `bytes` is longer than the state.
    pub fn xor_bytes(&mut self, bytes: &[u8]) {
        assert!(
            bytes.len() <= self.width.state_bytes(),
            "{} bytes do not fit a {}-byte state",
            bytes.len(),
            self.width.state_bytes()
        );
        let k = self.width.limbs();
        for (lane, chunk) in self
            .limbs
            .chunks_exact_mut(k)
            .zip(bytes.chunks(self.width.bytes()))
        {
            for (i, &byte) in chunk.iter().enumerate() {
                lane[i / 8] ^= u64::from(byte) << (8 * (i % 8));
            }
        }
    }

    /// Writes the first `out.len()` bytes of the state's serialization into `out`.
    ///
    /// # Panics
    /// Panics if `out` is longer than the state.
    pub fn write_bytes(&self, out: &mut [u8]) {
        assert!(
            out.len() <= self.width.state_bytes(),
            "cannot read {} bytes from a {}-byte state",
            out.len(),
            self.width.state_bytes()
        );
        let k = self.width.limbs();
        for (lane, chunk) in self
            .limbs
            .chunks_exact(k)
            .zip(out.chunks_mut(self.width.bytes()))
        {
            for (i, byte) in chunk.iter_mut().enumerate() {
                *byte = (lane[i / 8] >> (8 * (i % 8))) as u8;
            }
        }
    }

    /// The first `len` bytes of the state's serialization.
    #[must_use]
    pub fn to_bytes(&self, len: usize) -> Vec<u8> {
        let mut out = vec![0; len];
        self.write_bytes(&mut out);
        out
    }

    /// Number of bit positions at which `self` and `other` differ.
    ///
    /// # Panics
    /// Panics if the two states have different widths.
    #[must_use]
    pub fn hamming_distance(&self, other: &Self) -> u32 {
        assert_eq!(self.width, other.width, "states of different widths");
        self.limbs
            .iter()
            .zip(&other.limbs)
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }
}

impl fmt::Debug for KeccakState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Most significant limb first, padded to the bits it actually holds.
        let top_digits = (self.width.bytes() - 8 * (self.width.limbs() - 1)) * 2;
        writeln!(f, "KeccakState (w = {}) {{", self.width)?;
        for y in 0..5 {
            write!(f, "   ")?;
            for x in 0..5 {
                let mut limbs = self.lane(x, y).iter().rev();
                if let Some(top) = limbs.next() {
                    write!(f, " {top:0top_digits$x}")?;
                }
                for limb in limbs {
                    write!(f, "{limb:016x}")?;
                }
            }
            writeln!(f)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;

    use super::*;

    #[test]
    fn test_xor_bytes_fills_row_major() {
        let mut state = KeccakState::new(LaneWidth::W16);
        state.xor_bytes(&[0x01, 0x02, 0x03, 0x04, 0x05]);
        assert_eq!(state.lane(0, 0), [0x0201]);
        assert_eq!(state.lane(1, 0), [0x0403]);
        // Short final chunk is zero-extended.
        assert_eq!(state.lane(2, 0), [0x0005]);
        assert_eq!(state.lane(3, 0), [0]);

        let mut state = KeccakState::new(LaneWidth::W8);
        state.xor_bytes(&[0xff; 5]);
        state.xor_bytes(&[0xff; 6]);
        assert_eq!(state.lane(4, 0), [0]);
        assert_eq!(state.lane(0, 1), [0xff]);
    }

    #[test]
    fn test_xor_bytes_spans_limbs() {
        let mut state = KeccakState::new(LaneWidth::new(72).unwrap());
        let bytes: Vec<u8> = (1..=12).collect();
        state.xor_bytes(&bytes);
        assert_eq!(state.lane(0, 0), [0x0807_0605_0403_0201, 0x09]);
        assert_eq!(state.lane(1, 0), [0x0c0b_0a, 0]);
        assert_eq!(state.to_bytes(12), bytes);
    }

    #[test]
    fn test_write_bytes_round_trips_lanes() {
        let width = LaneWidth::new(24).unwrap();
        let lanes: Vec<u64> = (0..25).map(|i| 0x0a0b0c + i).collect();
        let state = KeccakState::from_lanes(width, &lanes);
        let bytes = state.to_bytes(width.state_bytes());
        assert_eq!(&bytes[..6], &[0x0c, 0x0b, 0x0a, 0x0d, 0x0b, 0x0a]);

        let mut copy = KeccakState::new(width);
        copy.xor_bytes(&bytes);
        assert_eq!(copy, state);

        // Truncated reads stop mid-lane.
        assert_eq!(state.to_bytes(4), vec![0x0c, 0x0b, 0x0a, 0x0d]);
    }

    #[test]
    fn test_wide_bytes_round_trip() {
        let width = LaneWidth::new(128).unwrap();
        let bytes: Vec<u8> = (0..width.state_bytes()).map(|i| (i * 7) as u8).collect();
        let mut state = KeccakState::new(width);
        state.xor_bytes(&bytes);
        assert_eq!(state.to_bytes(width.state_bytes()), bytes);
        assert_eq!(state.lanes().len(), 50);
    }

    #[test]
    fn test_from_lanes_masks() {
        let state = KeccakState::from_lanes(LaneWidth::W8, &[0x1ff; 25]);
        assert!(state.lanes().iter().all(|&lane| lane == 0xff));

        let state = KeccakState::from_lanes(LaneWidth::new(80).unwrap(), &[u64::MAX; 50]);
        assert_eq!(state.lane(2, 4), [u64::MAX, 0xffff]);
    }

    #[test]
    fn test_hamming_distance() {
        let a = KeccakState::new(LaneWidth::W64);
        let mut b = a.clone();
        assert_eq!(a.hamming_distance(&b), 0);
        b.xor_bytes(&[0b1011, 0, 0, 0, 0, 0, 0, 0x80]);
        assert_eq!(a.hamming_distance(&b), 4);
        assert!(b.bit(0, 0, 63));
        assert!(!b.bit(0, 0, 2));

        let a = KeccakState::new(LaneWidth::new(128).unwrap());
        let mut b = a.clone();
        b.xor_bytes(&[0, 0, 0, 0, 0, 0, 0, 0, 0x81, 0, 0, 0, 0, 0, 0, 0x80]);
        assert_eq!(a.hamming_distance(&b), 3);
        assert!(b.bit(0, 0, 64));
        assert!(b.bit(0, 0, 127));
    }

    #[test]
    fn test_debug_pads_each_lane() {
        let mut state = KeccakState::new(LaneWidth::new(72).unwrap());
        state.xor_bytes(&[0x01, 0, 0, 0, 0, 0, 0, 0, 0x02]);
        let debug = format!("{state:?}");
        assert!(debug.starts_with("KeccakState (w = 72) {\n    020000000000000001 "));
    }

    #[test]
    #[should_panic]
    fn test_xor_bytes_rejects_oversized_block() {
        let mut state = KeccakState::new(LaneWidth::W8);
        state.xor_bytes(&[0; 26]);
    }
}
