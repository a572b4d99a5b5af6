//! Sponge constructions over the Keccak-p permutation: hashing with arbitrary output length,
//! a keystream cipher, and a block-by-block permutation mode for diffusion experiments.
//!
//! The padding is `0x06 0x00 .. 0x00 0x80` (collapsing to `0x86` when one byte is missing).
//! With `w = 64`, 24 rounds and the FIPS 202 rates this coincides with SHA3-224/256/384/512.

#![no_std]

extern crate alloc;

mod block;
mod config;
mod error;
mod keystream;
mod sponge;

pub use block::*;
pub use config::*;
pub use error::*;
pub use keystream::*;
pub use sponge::*;
