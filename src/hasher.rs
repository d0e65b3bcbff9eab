use rand::Rng;

/// Produces entry identifiers and content hashes for a hash tree.
///
/// `hash` must be deterministic: the tree recomputes hashes during verification and compares them
/// against the ones recorded at append time.
pub trait Hasher {
  /// Return a fresh identifier, unique on every call.
  fn create_id(&self) -> String;

  /// Hash an arbitrary string.
  fn hash(&self, input: &str) -> String;

  /// Derive a branch hash from the hashes of its children.
  ///
  /// Two children hash their concatenation (left first); a branch with only a left child hashes that
  /// child's hash alone.
  fn combine(&self, left: &str, right: Option<&str>) -> String {
    match right {
      Some(right) => self.hash(&[left, right].concat()),
      None => self.hash(left),
    }
  }
}

/// BLAKE3 content hashes with random 128-bit identifiers, both hex encoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Hasher;

pub const ID_SIZE: usize = 16;

impl Hasher for Blake3Hasher {
  fn create_id(&self) -> String {
    let bytes: [u8; ID_SIZE] = rand::rng().random();
    hex::encode(bytes)
  }

  fn hash(&self, input: &str) -> String {
    blake3::hash(input.as_bytes()).to_hex().to_string()
  }
}
