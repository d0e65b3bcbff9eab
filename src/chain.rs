use crate::error::VerificationFailure;
use crate::node::Leaf;

pub mod merkle;

/// Core hash chain abstraction
pub trait HashChain {
  type Error;

  /// Append a new entry and return the key it was recorded under
  fn append(&mut self, entry: &str) -> Result<String, Self::Error>;

  /// Recompute every stored hash and compare it against the recorded one
  fn verify(&self) -> Result<(), VerificationFailure>;

  /// Check that `entry` is what was recorded for `key`
  fn verify_entry(&self, key: &str, entry: &str) -> Result<(), VerificationFailure>;

  /// Discard all entries
  fn clear(&mut self);

  /// Get the current size (number of leaf nodes)
  fn leaves(&self) -> usize;

  /// Retrieve a leaf by key
  fn get(&self, key: &str) -> Option<&Leaf>;

  /// Get the root hash
  fn root_hash(&self) -> &str;
}
