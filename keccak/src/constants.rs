use crate::LaneWidth;

/// The round-constant bit generator `rc(t)`.
///
/// An 8-bit LFSR over GF(2) with feedback taps at positions 0, 4, 5 and 6, started from the
/// register `1` and stepped `t mod 255` times. The output is bit 0 of the final register.
#[must_use]
pub const fn rc(t: usize) -> bool {
    let steps = t % 255;
    if steps == 0 {
        return true;
    }

    // Bit `i` of `register` is `R[i]`; shifting left prepends a zero at `R[0]`.
    let mut register: u16 = 1;
    let mut i = 0;
    while i < steps {
        register <<= 1;
        if register & 0x100 != 0 {
            register ^= 0b0111_0001;
        }
        register &= 0xff;
        i += 1;
    }

    register & 1 != 0
}

/// The low 64 bits of the ι constant for round `round` at lane width `width`.
///
/// Bit `2^j - 1` is `rc(j + 7 * round)` for `j = 0..=floor(log2(w))`; all other bits are 0.
/// For `w <= 64` this is the whole constant. Wider lanes also have the bits with `j >= 7`, see
/// [`round_constant_bit`].
#[must_use]
pub const fn round_constant(round: usize, width: LaneWidth) -> u64 {
    let top = if width.log2() < 6 { width.log2() } else { 6 };
    let mut constant = 0;
    let mut j = 0;
    while j <= top {
        if rc(j as usize + 7 * round) {
            constant |= 1 << ((1 << j) - 1);
        }
        j += 1;
    }
    constant
}

/// Bit `2^j - 1` of the ι constant for round `round`, or `false` once that position is outside
/// a lane of width `width`.
#[must_use]
pub const fn round_constant_bit(round: usize, width: LaneWidth, j: u32) -> bool {
    j <= width.log2() && rc(j as usize + 7 * round)
}

const fn compute_rho_offsets() -> [[u32; 5]; 5] {
    let mut offsets = [[0; 5]; 5];
    let mut x = 1;
    let mut y = 0;
    let mut t = 0;
    while t < 24 {
        offsets[x][y] = ((t + 1) * (t + 2) / 2) as u32;
        let new_y = (2 * x + 3 * y) % 5;
        x = y;
        y = new_y;
        t += 1;
    }
    offsets
}

/// Unreduced ρ offsets, indexed `[x][y]`. Lane `(0, 0)` is never rotated.
///
/// The offset applied to a lane of width `w` is this value modulo `w`.
pub const RHO_OFFSETS: [[u32; 5]; 5] = compute_rho_offsets();

const fn compute_keccak_f1600_round_constants() -> [u64; 24] {
    let mut out = [0; 24];
    let mut round = 0;
    while round < 24 {
        out[round] = round_constant(round, LaneWidth::W64);
        round += 1;
    }
    out
}

/// The 24 ι constants of Keccak-f[1600].
pub const KECCAK_F1600_ROUND_CONSTANTS: [u64; 24] = compute_keccak_f1600_round_constants();
