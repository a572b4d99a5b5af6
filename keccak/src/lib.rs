//! The Keccak-p permutation family, generalized over any lane width that is a multiple of 8.
//!
//! The state is held as 25 lanes of `u64` limbs and every step mapping works at lane level,
//! on whole words when a lane fits in one.
//! A per-bit model of the same mappings lives in the test suite and is used to check the
//! lane arithmetic bit for bit.

#![no_std]

extern crate alloc;

mod constants;
mod observer;
mod permutation;
mod state;
mod steps;
mod width;

#[cfg(test)]
mod reference;

pub use constants::*;
pub use observer::*;
pub use permutation::*;
pub use state::*;
pub use steps::*;
pub use width::*;
