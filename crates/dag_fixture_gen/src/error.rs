use thiserror::Error;

pub type FixtureResult<T> = std::result::Result<T, FixtureError>;

/// Structural problems found while building or checking a fixture pair.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FixtureError {
  #[error("identifier {identifier:?} is shared by nodes {first} and {second}")]
  DuplicateIdentifier {
    identifier: String,
    first: usize,
    second: usize,
  },

  #[error("index encoding has {ids} ids but {children} child lists")]
  LengthMismatch { ids: usize, children: usize },

  #[error("node {node} has child {child} outside of 0..{num_nodes}")]
  ChildOutOfRange {
    node: usize,
    child: usize,
    num_nodes: usize,
  },

  #[error("edge {node} -> {child} does not point to a later node")]
  BackwardEdge { node: usize, child: usize },

  #[error("identifier encoding has {actual} nodes, index encoding has {expected}")]
  NodeCountMismatch { expected: usize, actual: usize },

  #[error("identifier encoding has no entry for {identifier:?}")]
  MissingNode { identifier: String },

  #[error("children of {identifier:?} differ: expected {expected:?}, found {actual:?}")]
  ChildrenMismatch {
    identifier: String,
    expected: Vec<String>,
    actual: Vec<String>,
  },
}
