use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  CapacityExceeded(#[from] CapacityExceeded),
  #[error(transparent)]
  Verification(#[from] VerificationFailure),
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
}

/// An append was rejected because the tree already holds its maximum number of entries. The tree is
/// left unmodified.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("tree max size: {capacity} reached")]
pub struct CapacityExceeded {
  pub capacity: usize,
}

/// A recomputed hash disagrees with a stored one, or the tree does not contain what was asked for.
///
/// Node locations are reported as the left/right path from the root, `0` for left and `1` for right
/// (the root itself is the empty path).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerificationFailure {
  #[error("no leaf with key {key}")]
  KeyNotFound { key: String },
  #[error("entry does not match leaf {key}: stored {stored}, computed {computed}")]
  EntryMismatch { key: String, stored: String, computed: String },
  #[error("hash mismatch at node [{path}]: stored {stored}, computed {computed}")]
  HashMismatch { path: String, stored: String, computed: String },
  #[error("node [{path}] is referenced but missing")]
  MissingNode { path: String },
  #[error("branch [{path}] is malformed: {reason}")]
  MalformedBranch { path: String, reason: &'static str },
}
