/// Index of a node in the tree's node arena.
pub type Position = u64;

/// An appended entry: its externally visible key and the hash of its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
  key: String,
  hash: String,
}

impl Leaf {
  pub fn new(key: String, hash: String) -> Self {
    Leaf { key, hash }
  }

  pub fn key(&self) -> &str {
    &self.key
  }

  pub fn hash(&self) -> &str {
    &self.hash
  }
}

/// Node representation in the hash tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
  Branch { hash: String, left: Option<Position>, right: Option<Position> },
  Leaf(Leaf),
}

impl Node {
  /// An empty branch; its hash is assigned once a descendant leaf is attached.
  pub fn new_internal() -> Self {
    Node::Branch { hash: String::new(), left: None, right: None }
  }

  pub fn new_leaf(key: String, hash: String) -> Self {
    Node::Leaf(Leaf::new(key, hash))
  }

  pub fn hash(&self) -> &str {
    match self {
      Node::Branch { hash, .. } => hash,
      Node::Leaf(leaf) => leaf.hash(),
    }
  }

  pub fn is_leaf(&self) -> bool {
    match self {
      Node::Leaf(_) => true,
      Node::Branch { .. } => false,
    }
  }

  pub fn as_leaf(&self) -> Option<&Leaf> {
    match self {
      Node::Leaf(leaf) => Some(leaf),
      Node::Branch { .. } => None,
    }
  }

  pub fn left(&self) -> Option<Position> {
    match self {
      Node::Branch { left, .. } => *left,
      Node::Leaf(_) => None,
    }
  }

  pub fn right(&self) -> Option<Position> {
    match self {
      Node::Branch { right, .. } => *right,
      Node::Leaf(_) => None,
    }
  }

  /// Put `child` into the first free slot of this branch, left before right.
  pub(crate) fn attach(&mut self, child: Position) {
    match self {
      Node::Branch { left: left @ None, .. } => *left = Some(child),
      Node::Branch { right: right @ None, .. } => *right = Some(child),
      Node::Branch { .. } => panic!("branch already has two children"),
      Node::Leaf(_) => panic!("cannot attach a child to a leaf"),
    }
  }

  pub(crate) fn set_hash(&mut self, value: String) {
    match self {
      Node::Branch { hash, .. } => *hash = value,
      Node::Leaf(leaf) => leaf.hash = value,
    }
  }
}
