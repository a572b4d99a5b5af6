//! Experiments on reduced Keccak sponges: how fast a one-bit input difference spreads through
//! the rounds, and how quickly a truncated digest collides.

mod avalanche;
mod collision;

pub use avalanche::*;
pub use collision::*;
