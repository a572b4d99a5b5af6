//! A bit-by-bit model of the step mappings, written directly from their coordinate
//! definitions. Only used to check the lane implementation.

#![allow(clippy::needless_range_loop)]

use alloc::vec;
use alloc::vec::Vec;

use crate::{KeccakState, LaneWidth, rc};

/// `bits[x][y][z]`, each entry 0 or 1.
type Bits = Vec<Vec<Vec<u8>>>;

fn zero(w: usize) -> Bits {
    vec![vec![vec![0; w]; 5]; 5]
}

fn to_bits(state: &KeccakState) -> Bits {
    let w = state.width().bits() as usize;
    let mut a = zero(w);
    for x in 0..5 {
        for y in 0..5 {
            for z in 0..w {
                a[x][y][z] = u8::from(state.bit(x, y, z));
            }
        }
    }
    a
}

fn from_bits(width: LaneWidth, a: &Bits) -> KeccakState {
    let k = width.limbs();
    let mut lanes = vec![0u64; 25 * k];
    for x in 0..5 {
        for y in 0..5 {
            for (z, &bit) in a[x][y].iter().enumerate() {
                lanes[(x + 5 * y) * k + z / 64] |= u64::from(bit) << (z % 64);
            }
        }
    }
    KeccakState::from_lanes(width, &lanes)
}

fn theta(a: &Bits, w: usize) -> Bits {
    let mut c = vec![vec![0u8; w]; 5];
    for x in 0..5 {
        for z in 0..w {
            c[x][z] = (0..5).fold(0, |acc, y| acc ^ a[x][y][z]);
        }
    }
    let mut out = zero(w);
    for x in 0..5 {
        for y in 0..5 {
            for z in 0..w {
                let d = c[(x + 4) % 5][z] ^ c[(x + 1) % 5][(z + w - 1) % w];
                out[x][y][z] = a[x][y][z] ^ d;
            }
        }
    }
    out
}

fn rho(a: &Bits, w: usize) -> Bits {
    let mut out = a.clone();
    let (mut x, mut y) = (1, 0);
    for t in 0..24 {
        let offset = ((t + 1) * (t + 2) / 2) % w;
        for z in 0..w {
            out[x][y][z] = a[x][y][(z + w - offset) % w];
        }
        (x, y) = (y, (2 * x + 3 * y) % 5);
    }
    out
}

fn pi(a: &Bits, w: usize) -> Bits {
    let mut out = zero(w);
    for x in 0..5 {
        for y in 0..5 {
            out[x][y] = a[(x + 3 * y) % 5][x].clone();
        }
    }
    out
}

fn chi(a: &Bits, w: usize) -> Bits {
    let mut out = zero(w);
    for x in 0..5 {
        for y in 0..5 {
            for z in 0..w {
                out[x][y][z] = a[x][y][z] ^ ((a[(x + 1) % 5][y][z] ^ 1) & a[(x + 2) % 5][y][z]);
            }
        }
    }
    out
}

fn iota(a: &Bits, w: usize, round: usize) -> Bits {
    let mut out = a.clone();
    let l = w.ilog2() as usize;
    for j in 0..=l {
        out[0][0][(1 << j) - 1] ^= u8::from(rc(j + 7 * round));
    }
    out
}

pub(crate) fn reference_round(state: &KeccakState, round: usize) -> KeccakState {
    let width = state.width();
    let w = width.bits() as usize;
    let a = to_bits(state);
    let a = iota(&chi(&pi(&rho(&theta(&a, w), w), w), w), w, round);
    from_bits(width, &a)
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::{KeccakP, Permutation};

    fn random_state(rng: &mut SmallRng, width: LaneWidth) -> KeccakState {
        let lanes: Vec<u64> = (0..25 * width.limbs()).map(|_| rng.random()).collect();
        KeccakState::from_lanes(width, &lanes)
    }

    #[test]
    fn test_bits_round_trip() {
        let mut rng = SmallRng::seed_from_u64(3);
        for bits in [40, 72, 128] {
            let state = random_state(&mut rng, LaneWidth::new(bits).unwrap());
            assert_eq!(from_bits(state.width(), &to_bits(&state)), state);
        }
    }

    #[test]
    fn test_steps_match_reference() {
        let mut rng = SmallRng::seed_from_u64(25);
        for bits in [8, 16, 24, 64, 72, 128] {
            let width = LaneWidth::new(bits).unwrap();
            let w = bits as usize;
            for _ in 0..16 {
                let state = random_state(&mut rng, width);
                let a = to_bits(&state);

                let mut s = state.clone();
                crate::theta(&mut s);
                assert_eq!(s, from_bits(width, &theta(&a, w)), "theta, w = {bits}");

                let mut s = state.clone();
                crate::rho(&mut s);
                assert_eq!(s, from_bits(width, &rho(&a, w)), "rho, w = {bits}");

                let mut s = state.clone();
                crate::pi(&mut s);
                assert_eq!(s, from_bits(width, &pi(&a, w)), "pi, w = {bits}");

                let mut s = state.clone();
                crate::chi(&mut s);
                assert_eq!(s, from_bits(width, &chi(&a, w)), "chi, w = {bits}");

                let round = rng.random_range(0..64);
                let mut s = state.clone();
                crate::iota(&mut s, round);
                assert_eq!(s, from_bits(width, &iota(&a, w, round)), "iota, w = {bits}");
            }
        }
    }

    #[test]
    fn test_permutation_matches_reference() {
        let mut rng = SmallRng::seed_from_u64(8);
        for bits in (8..=64).step_by(8).chain([72, 128]) {
            let width = LaneWidth::new(bits).unwrap();
            let perm = KeccakP::keccak_f(width);
            let state = random_state(&mut rng, width);

            let mut expected = state.clone();
            for round in 0..perm.rounds() {
                expected = reference_round(&expected, round);
            }
            assert_eq!(perm.permute(state), expected, "w = {bits}");
        }
    }

    #[test]
    fn test_exhaustive_single_bit_inputs_w8() {
        // Every one of the 200 single-bit states of Keccak-p[200], through two rounds.
        let width = LaneWidth::W8;
        let perm = KeccakP::new(width, 2);
        for i in 0..25 {
            for z in 0..8 {
                let mut lanes = [0; 25];
                lanes[i] = 1 << z;
                let state = KeccakState::from_lanes(width, &lanes);
                let expected = reference_round(&reference_round(&state, 0), 1);
                assert_eq!(perm.permute(state), expected);
            }
        }
    }
}
