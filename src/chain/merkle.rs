use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::chain::HashChain;
use crate::error::{CapacityExceeded, VerificationFailure};
use crate::hasher::Hasher;
use crate::node::{Leaf, Node, Position};

/// Default upper bound on the number of entries a tree accepts.
pub const DEFAULT_MAX_ENTRIES: usize = 1024 * 1024;

/// Root hash reported by a tree without entries.
pub const EMPTY_HASH: &str = "";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeConfig {
  pub max_entries: usize,
}

impl TreeConfig {
  pub fn with_max_entries(max_entries: usize) -> Self {
    TreeConfig { max_entries }
  }
}

impl Default for TreeConfig {
  fn default() -> Self {
    TreeConfig { max_entries: DEFAULT_MAX_ENTRIES }
  }
}

/// One step of a leaf path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
  Left,
  Right,
}

impl Direction {
  fn bit(self) -> char {
    match self {
      Direction::Left => '0',
      Direction::Right => '1',
    }
  }
}

/// Append-only binary Merkle tree.
///
/// The n-th leaf (0-based) is addressed by the binary representation of n, most significant bit first,
/// read as a left/right path from the root. The branch at the end of that path holds the leaf as its
/// first child, so all leaves sit at the same depth. When the leaf count reaches a power of two the
/// tree is full at its height and a new root is placed above the current one.
///
/// Nodes live in an arena addressed by [`Position`]; a position is never reused until [`clear`].
///
/// [`clear`]: MerkleTree::clear
pub struct MerkleTree<H: Hasher> {
  hasher: H,
  config: TreeConfig,
  nodes: Vec<Node>,
  root: Option<Position>,
  index: HashMap<String, Position>,
  size: usize,
}

impl<H: Hasher> MerkleTree<H> {
  pub fn new(hasher: H, config: TreeConfig) -> Self {
    MerkleTree { hasher, config, nodes: Vec::new(), root: None, index: HashMap::new(), size: 0 }
  }

  pub fn hasher(&self) -> &H {
    &self.hasher
  }

  pub fn capacity(&self) -> usize {
    self.config.max_entries
  }

  /// Append an entry under a fresh key from the hasher and return that key.
  pub fn append(&mut self, entry: &str) -> Result<String, CapacityExceeded> {
    self.ensure_capacity()?;
    let key = self.hasher.create_id();
    self.append_with_key(key, entry)
  }

  /// Append an entry under a caller supplied key.
  ///
  /// Keys are expected to be unique; a repeated key replaces the earlier leaf in the key index while
  /// both leaves stay in the tree.
  pub fn append_with_key(&mut self, key: String, entry: &str) -> Result<String, CapacityExceeded> {
    self.ensure_capacity()?;

    let n = self.size;
    let hash = self.hasher.hash(entry);
    let path = leaf_path(n as u64);
    let trail = self.build_path(&path);

    let parent = *trail.last().expect("trail always starts at the root");
    let position = self.push(Node::new_leaf(key.clone(), hash));
    self.nodes[parent as usize].attach(position);
    self.index.insert(key.clone(), position);
    self.size += 1;

    self.rehash(&trail);
    debug!(key = %key, index = n, root = %self.root_hash(), "appended entry");
    Ok(key)
  }

  /// Append `n` entries whose contents are fresh ids, stopping at the first rejected append.
  pub fn load_random_entries(&mut self, n: usize) -> Result<Vec<String>, CapacityExceeded> {
    let mut keys = Vec::with_capacity(n);
    for _ in 0..n {
      let entry = self.hasher.create_id();
      keys.push(self.append(&entry)?);
    }
    Ok(keys)
  }

  fn ensure_capacity(&self) -> Result<(), CapacityExceeded> {
    if self.size >= self.config.max_entries {
      warn!(capacity = self.config.max_entries, "append rejected, tree is full");
      return Err(CapacityExceeded { capacity: self.config.max_entries });
    }
    Ok(())
  }

  fn push(&mut self, node: Node) -> Position {
    let position = self.nodes.len() as Position;
    self.nodes.push(node);
    position
  }

  /// Make sure every branch along `path` exists and return them from the root down. The last element is
  /// the branch the new leaf hangs from.
  fn build_path(&mut self, path: &[Direction]) -> Vec<Position> {
    let root = match self.root {
      // no entries yet, the fresh root is the parent
      None => {
        debug_assert!(path.is_empty());
        let root = self.push(Node::new_internal());
        self.root = Some(root);
        root
      }
      // full at the current height, start from a new root
      Some(old) if is_power_of_two(self.size) => {
        let root = self.push(Node::new_internal());
        self.nodes[root as usize].attach(old);
        self.root = Some(root);
        debug!(leaves = self.size, height = height_for(self.size + 1), "root doubled");
        root
      }
      Some(root) => root,
    };

    let mut trail = Vec::with_capacity(path.len() + 1);
    trail.push(root);
    let mut current = root;
    for direction in path.iter() {
      let node = &self.nodes[current as usize];
      let child = match direction {
        Direction::Left => node.left(),
        Direction::Right => {
          debug_assert!(node.left().is_some(), "right branch requested before left");
          node.right()
        }
      };
      let child = match child {
        Some(child) => child,
        None => {
          let child = self.push(Node::new_internal());
          self.nodes[current as usize].attach(child);
          child
        }
      };
      trail.push(child);
      current = child;
    }
    trail
  }

  /// Recompute branch hashes along `trail`, innermost first, ending at the root.
  fn rehash(&mut self, trail: &[Position]) {
    for position in trail.iter().rev() {
      let node = &self.nodes[*position as usize];
      let left = node.left().map(|p| self.nodes[p as usize].hash());
      let right = node.right().map(|p| self.nodes[p as usize].hash());
      let left = left.expect("every branch on a trail has a left child");
      let hash = self.hasher.combine(left, right);
      self.nodes[*position as usize].set_hash(hash);
    }
  }

  /// Recompute every branch hash bottom-up from the leaves and compare it with the stored one.
  ///
  /// Stops at the first mismatch, visiting children before their parent and left before right.
  pub fn verify(&self) -> Result<(), VerificationFailure> {
    if let Some(root) = self.root {
      let mut path = String::new();
      if let Err(failure) = self.verify_node(root, &mut path) {
        warn!(%failure, "tree verification failed");
        return Err(failure);
      }
    }
    Ok(())
  }

  fn verify_node(&self, position: Position, path: &mut String) -> Result<String, VerificationFailure> {
    let node =
      self.nodes.get(position as usize).ok_or_else(|| VerificationFailure::MissingNode { path: path.clone() })?;
    let (left, right) = match node {
      Node::Leaf(leaf) => return Ok(leaf.hash().to_string()),
      Node::Branch { left: Some(left), right, .. } => (*left, *right),
      Node::Branch { left: None, right: Some(_), .. } => {
        let reason = "right child without left child";
        return Err(VerificationFailure::MalformedBranch { path: path.clone(), reason });
      }
      Node::Branch { left: None, right: None, .. } => {
        return Err(VerificationFailure::MalformedBranch { path: path.clone(), reason: "no children" });
      }
    };

    let left = self.verify_child(left, Direction::Left, path)?;
    let right = match right {
      Some(right) => Some(self.verify_child(right, Direction::Right, path)?),
      None => None,
    };
    let computed = self.hasher.combine(&left, right.as_deref());
    if computed != node.hash() {
      let stored = node.hash().to_string();
      return Err(VerificationFailure::HashMismatch { path: path.clone(), stored, computed });
    }
    Ok(computed)
  }

  fn verify_child(
    &self,
    child: Position,
    direction: Direction,
    path: &mut String,
  ) -> Result<String, VerificationFailure> {
    path.push(direction.bit());
    let hash = self.verify_node(child, path)?;
    path.pop();
    Ok(hash)
  }

  /// Check that `entry` hashes to what was recorded for `key`.
  ///
  /// Only the leaf hash is compared; branches between the leaf and the root are not revisited.
  pub fn verify_entry(&self, key: &str, entry: &str) -> Result<(), VerificationFailure> {
    let result = match self.get(key) {
      None => Err(VerificationFailure::KeyNotFound { key: key.to_string() }),
      Some(leaf) => {
        let computed = self.hasher.hash(entry);
        if computed == leaf.hash() {
          Ok(())
        } else {
          let stored = leaf.hash().to_string();
          Err(VerificationFailure::EntryMismatch { key: key.to_string(), stored, computed })
        }
      }
    };
    if let Err(failure) = &result {
      warn!(%failure, "entry verification failed");
    }
    result
  }

  pub fn clear(&mut self) {
    self.nodes.clear();
    self.root = None;
    self.index.clear();
    self.size = 0;
    info!("tree cleared");
  }

  /// Number of entries appended since construction or the last clear.
  pub fn leaves(&self) -> usize {
    self.size
  }

  pub fn get(&self, key: &str) -> Option<&Leaf> {
    self.index.get(key).and_then(|position| self.node(*position)).and_then(Node::as_leaf)
  }

  /// Leaves in insertion order.
  pub fn leaf_iter(&self) -> impl Iterator<Item = &Leaf> {
    self.nodes.iter().filter_map(Node::as_leaf)
  }

  pub fn root_hash(&self) -> &str {
    self.root().map(Node::hash).unwrap_or(EMPTY_HASH)
  }

  /// `ceil(log2(leaves))`, 0 for an empty tree.
  pub fn height(&self) -> u32 {
    height_for(self.size)
  }

  pub fn root(&self) -> Option<&Node> {
    self.root.and_then(|position| self.node(position))
  }

  pub fn root_position(&self) -> Option<Position> {
    self.root
  }

  pub fn node(&self, position: Position) -> Option<&Node> {
    self.nodes.get(position as usize)
  }
}

impl<H: Hasher> HashChain for MerkleTree<H> {
  type Error = CapacityExceeded;

  fn append(&mut self, entry: &str) -> Result<String, CapacityExceeded> {
    MerkleTree::append(self, entry)
  }

  fn verify(&self) -> Result<(), VerificationFailure> {
    MerkleTree::verify(self)
  }

  fn verify_entry(&self, key: &str, entry: &str) -> Result<(), VerificationFailure> {
    MerkleTree::verify_entry(self, key, entry)
  }

  fn clear(&mut self) {
    MerkleTree::clear(self)
  }

  fn leaves(&self) -> usize {
    MerkleTree::leaves(self)
  }

  fn get(&self, key: &str) -> Option<&Leaf> {
    MerkleTree::get(self, key)
  }

  fn root_hash(&self) -> &str {
    MerkleTree::root_hash(self)
  }
}

/// Path from the root to the branch holding the n-th leaf: the bits of n, most significant first.
/// The first leaf has an empty path.
pub fn leaf_path(n: u64) -> Vec<Direction> {
  if n == 0 {
    return Vec::new();
  }
  let bits = u64::BITS - n.leading_zeros();
  (0..bits).rev().map(|i| if (n >> i) & 1 == 1 { Direction::Right } else { Direction::Left }).collect()
}

pub fn is_power_of_two(n: usize) -> bool {
  n != 0 && (n & (n - 1)) == 0
}

/// `ceil(log2(n))` for n ≧ 1, 0 otherwise.
pub fn height_for(n: usize) -> u32 {
  if n <= 1 { 0 } else { usize::BITS - (n - 1).leading_zeros() }
}
