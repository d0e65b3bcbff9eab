pub mod chain;
pub mod error;
pub mod hasher;
pub mod node;
pub mod stat;

pub use chain::HashChain;
pub use chain::merkle::{EMPTY_HASH, MerkleTree, TreeConfig};
pub use error::{CapacityExceeded, Error, Result, VerificationFailure};
pub use hasher::{Blake3Hasher, Hasher};
pub use node::{Leaf, Node, Position};

/// Deterministic pseudo-random entry content for the `i`-th append of a measurement run.
pub fn entry_for(i: u64) -> String {
  format!("{:016x}", splitmix64(i))
}

pub fn splitmix64(x: u64) -> u64 {
  let mut z = x.wrapping_add(0x9e3779b97f4a7c15);
  z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
  z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
  z ^ (z >> 31)
}
