//! The five step mappings of a Keccak-p round, at lane level.
//!
//! Each function transforms the state in place. A round is always `theta`, `rho`, `pi`, `chi`,
//! `iota`, in that order. Widths up to 64 bits work on whole words; wider lanes go limb by limb.

use alloc::vec;
use core::array;

use crate::{KeccakState, RHO_OFFSETS, round_constant, round_constant_bit};

/// θ: XOR each bit with the parities of two neighbouring columns.
///
/// `D[x] = C[x - 1] ^ rot(C[x + 1], 1)` where `C[x]` is the XOR of the five lanes of column `x`.
pub fn theta(state: &mut KeccakState) {
    let width = state.width();
    if let Some(lanes) = state.word_lanes_mut() {
        let parities: [u64; 5] =
            array::from_fn(|x| (0..5).fold(0, |acc, y| acc ^ lanes[x + 5 * y]));

        for x in 0..5 {
            let d = parities[(x + 4) % 5] ^ width.rotate_left(parities[(x + 1) % 5], 1);
            for y in 0..5 {
                lanes[x + 5 * y] ^= d;
            }
        }
        return;
    }

    let k = width.limbs();
    let lanes = state.lanes_mut();
    let mut parities = vec![0u64; 5 * k];
    for (i, lane) in lanes.chunks_exact(k).enumerate() {
        let column = &mut parities[(i % 5) * k..][..k];
        for (p, limb) in column.iter_mut().zip(lane) {
            *p ^= limb;
        }
    }

    let mut d = vec![0u64; k];
    for x in 0..5 {
        width.rotate_limbs_left(&parities[(x + 1) % 5 * k..][..k], 1, &mut d);
        for (dz, p) in d.iter_mut().zip(&parities[(x + 4) % 5 * k..][..k]) {
            *dz ^= p;
        }
        for y in 0..5 {
            for (limb, dz) in lanes[(x + 5 * y) * k..][..k].iter_mut().zip(&d) {
                *limb ^= dz;
            }
        }
    }
}

/// ρ: rotate every lane except `(0, 0)` by its triangular-number offset, reduced modulo `w`.
pub fn rho(state: &mut KeccakState) {
    let width = state.width();
    if let Some(lanes) = state.word_lanes_mut() {
        for y in 0..5 {
            for x in 0..5 {
                lanes[x + 5 * y] = width.rotate_left(lanes[x + 5 * y], RHO_OFFSETS[x][y]);
            }
        }
        return;
    }

    let k = width.limbs();
    let mut old = vec![0u64; k];
    for (i, lane) in state.lanes_mut().chunks_exact_mut(k).enumerate() {
        old.copy_from_slice(lane);
        width.rotate_limbs_left(&old, RHO_OFFSETS[i % 5][i / 5], lane);
    }
}

/// π: move lanes, `A'[x][y] = A[(x + 3y) mod 5][x]`.
pub fn pi(state: &mut KeccakState) {
    if let Some(lanes) = state.word_lanes_mut() {
        let old = *lanes;
        for y in 0..5 {
            for x in 0..5 {
                lanes[x + 5 * y] = old[(x + 3 * y) % 5 + 5 * x];
            }
        }
        return;
    }

    let k = state.width().limbs();
    let lanes = state.lanes_mut();
    let old = lanes.to_vec();

    for y in 0..5 {
        for x in 0..5 {
            let from = (x + 3 * y) % 5 + 5 * x;
            lanes[(x + 5 * y) * k..][..k].copy_from_slice(&old[from * k..][..k]);
        }
    }
}

/// χ: the non-linear step, `A'[x] = A[x] ^ (!A[x + 1] & A[x + 2])` along each row.
pub fn chi(state: &mut KeccakState) {
    let width = state.width();
    if let Some(lanes) = state.word_lanes_mut() {
        let mask = width.mask();
        for y in 0..5 {
            let row: [u64; 5] = array::from_fn(|x| lanes[x + 5 * y]);
            for x in 0..5 {
                lanes[x + 5 * y] = row[x] ^ (!row[(x + 1) % 5] & row[(x + 2) % 5] & mask);
            }
        }
        return;
    }

    // Limbs of the same significance never interact, and `A[x + 2]` is already masked.
    let k = width.limbs();
    let mut row = vec![0u64; 5 * k];
    for plane in state.lanes_mut().chunks_exact_mut(5 * k) {
        row.copy_from_slice(plane);
        for x in 0..5 {
            for i in 0..k {
                plane[x * k + i] =
                    row[x * k + i] ^ (!row[(x + 1) % 5 * k + i] & row[(x + 2) % 5 * k + i]);
            }
        }
    }
}

/// ι: XOR the round constant for round `round` into lane `(0, 0)`.
pub fn iota(state: &mut KeccakState, round: usize) {
    let width = state.width();
    let lanes = state.lanes_mut();
    lanes[0] ^= round_constant(round, width);
    for j in 7..=width.log2() {
        if round_constant_bit(round, width, j) {
            let z = (1 << j) - 1;
            lanes[z / 64] ^= 1 << (z % 64);
        }
    }
}
