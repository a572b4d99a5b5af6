use core::fmt;

/// The bit width `w` of a single lane.
///
/// Any positive multiple of 8 is representable, so that a lane serializes to a whole number of
/// bytes. Powers of two are not required: the rotation offsets are reduced modulo `w`.
///
/// A lane of width `w` is held in `ceil(w / 64)` little-endian `u64` limbs. Widths up to 64
/// use a single limb and take the word-level paths of the step mappings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LaneWidth(u32);

impl LaneWidth {
    pub const W8: Self = Self(8);
    pub const W16: Self = Self(16);
    pub const W32: Self = Self(32);
    pub const W64: Self = Self(64);

    /// Returns `None` unless `bits` is a positive multiple of 8.
    #[must_use]
    pub const fn new(bits: u32) -> Option<Self> {
        if bits == 0 || bits % 8 != 0 {
            None
        } else {
            Some(Self(bits))
        }
    }

    #[must_use]
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    #[inline]
    pub const fn bytes(self) -> usize {
        (self.0 / 8) as usize
    }

    /// Number of `u64` limbs in one lane.
    #[must_use]
    #[inline]
    pub const fn limbs(self) -> usize {
        self.0.div_ceil(64) as usize
    }

    /// Total width of the state, `b = 25 * w`, in bits.
    #[must_use]
    #[inline]
    pub const fn state_bits(self) -> usize {
        25 * self.0 as usize
    }

    #[must_use]
    #[inline]
    pub const fn state_bytes(self) -> usize {
        25 * self.bytes()
    }

    /// `floor(log2(w))`, the `l` of the Keccak-p family.
    #[must_use]
    #[inline]
    pub const fn log2(self) -> u32 {
        self.0.ilog2()
    }

    /// Mask selecting the valid bits of a lane's most significant limb.
    ///
    /// For widths up to 64 this is the mask of the low `w` bits of the whole lane.
    #[must_use]
    #[inline]
    pub const fn mask(self) -> u64 {
        match self.0 % 64 {
            0 => u64::MAX,
            top => (1 << top) - 1,
        }
    }

    /// Rotates the low `w` bits of a single-limb `lane` towards the most significant bit by
    /// `amount`.
    ///
    /// Bit `z` of the result is bit `(z - amount) mod w` of the input. Only meaningful when
    /// `w <= 64`; wider lanes go through [`LaneWidth::rotate_limbs_left`].
    #[must_use]
    #[inline]
    pub const fn rotate_left(self, lane: u64, amount: u32) -> u64 {
        debug_assert!(self.0 <= 64);
        let r = amount % self.0;
        if r == 0 {
            lane
        } else {
            ((lane << r) | (lane >> (self.0 - r))) & self.mask()
        }
    }

    /// Multi-limb form of [`LaneWidth::rotate_left`]: writes `lane` rotated by `amount` into
    /// `out`.
    ///
    /// # Panics
    /// Panics if `lane` or `out` is not exactly [`LaneWidth::limbs`] long.
    pub fn rotate_limbs_left(self, lane: &[u64], amount: u32, out: &mut [u64]) {
        assert_eq!(lane.len(), self.limbs());
        assert_eq!(out.len(), self.limbs());
        let r = (amount % self.0) as usize;
        if r == 0 {
            out.copy_from_slice(lane);
            return;
        }
        out.fill(0);
        or_shifted_left(lane, r, out);
        or_shifted_right(lane, self.0 as usize - r, out);
        if let Some(top) = out.last_mut() {
            *top &= self.mask();
        }
    }
}

/// `out |= src << shift`, truncated to the length of `out`.
fn or_shifted_left(src: &[u64], shift: usize, out: &mut [u64]) {
    let (whole, bits) = (shift / 64, shift % 64);
    for i in whole..out.len() {
        let j = i - whole;
        out[i] |= src[j] << bits;
        if bits != 0 && j > 0 {
            out[i] |= src[j - 1] >> (64 - bits);
        }
    }
}

/// `out |= src >> shift`.
fn or_shifted_right(src: &[u64], shift: usize, out: &mut [u64]) {
    let (whole, bits) = (shift / 64, shift % 64);
    for i in 0..out.len().saturating_sub(whole) {
        let j = i + whole;
        out[i] |= src[j] >> bits;
        if bits != 0 && j + 1 < src.len() {
            out[i] |= src[j + 1] << (64 - bits);
        }
    }
}

impl fmt::Display for LaneWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_widths() {
        for bits in (8..=64).step_by(8) {
            let width = LaneWidth::new(bits).unwrap();
            assert_eq!(width.bits(), bits);
            assert_eq!(width.state_bits(), 25 * bits as usize);
        }
        assert_eq!(LaneWidth::new(0), None);
        assert_eq!(LaneWidth::new(12), None);
        assert_eq!(LaneWidth::new(130), None);
    }

    #[test]
    fn test_wide_widths() {
        let w72 = LaneWidth::new(72).unwrap();
        assert_eq!(w72.limbs(), 2);
        assert_eq!(w72.mask(), 0xff);
        assert_eq!(w72.log2(), 6);
        assert_eq!(w72.state_bytes(), 225);

        let w128 = LaneWidth::new(128).unwrap();
        assert_eq!(w128.limbs(), 2);
        assert_eq!(w128.mask(), u64::MAX);
        assert_eq!(w128.log2(), 7);
        assert_eq!(w128.state_bits(), 3200);
        assert_eq!(LaneWidth::W64.limbs(), 1);
    }

    #[test]
    fn test_log2_floors() {
        assert_eq!(LaneWidth::W8.log2(), 3);
        assert_eq!(LaneWidth::new(24).unwrap().log2(), 4);
        assert_eq!(LaneWidth::W64.log2(), 6);
    }

    #[test]
    fn test_rotate_matches_native_for_powers_of_two() {
        let x = 0xa5c3_0f81_u64;
        assert_eq!(
            LaneWidth::W8.rotate_left(x & 0xff, 3),
            u64::from((x as u8).rotate_left(3))
        );
        assert_eq!(
            LaneWidth::W32.rotate_left(x, 17),
            u64::from((x as u32).rotate_left(17))
        );
        assert_eq!(LaneWidth::W64.rotate_left(x, 44), x.rotate_left(44));
    }

    #[test]
    fn test_rotate_non_power_of_two() {
        let w24 = LaneWidth::new(24).unwrap();
        assert_eq!(w24.rotate_left(0x80_0000, 1), 1);
        assert_eq!(w24.rotate_left(0x00_0001, 25), 2);
        assert_eq!(w24.rotate_left(0x12_3456, 24), 0x12_3456);
    }

    fn limbs_of(x: u128) -> [u64; 2] {
        [x as u64, (x >> 64) as u64]
    }

    #[test]
    fn test_rotate_limbs_matches_native_u128() {
        let w128 = LaneWidth::new(128).unwrap();
        let x = 0x0123_4567_89ab_cdef_fedc_ba98_7654_3210_u128;
        let mut out = [0; 2];
        for amount in [0, 1, 7, 63, 64, 65, 100, 127, 128, 300] {
            w128.rotate_limbs_left(&limbs_of(x), amount, &mut out);
            assert_eq!(out, limbs_of(x.rotate_left(amount)), "amount = {amount}");
        }
    }

    #[test]
    fn test_rotate_limbs_non_power_of_two() {
        let w72 = LaneWidth::new(72).unwrap();
        let mut out = [0; 2];

        // The top bit, 71, wraps round to bit 0.
        w72.rotate_limbs_left(&[0, 0x80], 1, &mut out);
        assert_eq!(out, [1, 0]);

        // Bit 63 crosses into the second limb.
        w72.rotate_limbs_left(&[1 << 63, 0], 1, &mut out);
        assert_eq!(out, [0, 1]);

        w72.rotate_limbs_left(&[1, 0], 71, &mut out);
        assert_eq!(out, [0, 0x80]);

        let lane = [0x0123_4567_89ab_cdef, 0xa5];
        w72.rotate_limbs_left(&lane, 144, &mut out);
        assert_eq!(out, lane);

        // Agrees with the single-limb rotation when both apply.
        let mut single = [0];
        for amount in [0, 5, 31, 64, 99] {
            let w40 = LaneWidth::new(40).unwrap();
            w40.rotate_limbs_left(&[0xab_cdef_0123], amount, &mut single);
            assert_eq!(single[0], w40.rotate_left(0xab_cdef_0123, amount));
        }
    }
}
