use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{FixtureError, FixtureResult};

/// Graph keyed by node position.
///
/// `ids[i]` is the identifier of node `i` and `children[i]` its child indices.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEncoding {
  pub ids: Vec<String>,
  pub children: Vec<Vec<usize>>,
}

impl IndexEncoding {
  pub fn with_capacity(num_nodes: usize) -> Self {
    Self {
      ids: Vec::with_capacity(num_nodes),
      children: Vec::with_capacity(num_nodes),
    }
  }

  pub fn push(&mut self, id: String, children: Vec<usize>) {
    self.ids.push(id);
    self.children.push(children);
  }

  pub fn len(&self) -> usize {
    self.ids.len()
  }

  pub fn is_empty(&self) -> bool {
    self.ids.is_empty()
  }

  pub fn num_edges(&self) -> usize {
    self.children.iter().map(Vec::len).sum()
  }

  /// Every `(parent, child)` pair in node order.
  pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
    self
      .children
      .iter()
      .enumerate()
      .flat_map(|(parent, children)| children.iter().map(move |&child| (parent, child)))
  }

  /// Checks that the lists line up and that every edge points to a later node.
  pub fn validate(&self) -> FixtureResult<()> {
    if self.ids.len() != self.children.len() {
      return Err(FixtureError::LengthMismatch {
        ids: self.ids.len(),
        children: self.children.len(),
      });
    }

    let num_nodes = self.len();
    for (node, child) in self.edges() {
      if child >= num_nodes {
        return Err(FixtureError::ChildOutOfRange {
          node,
          child,
          num_nodes,
        });
      }
      if child <= node {
        return Err(FixtureError::BackwardEdge { node, child });
      }
    }

    let mut seen: HashMap<&str, usize> = HashMap::with_capacity(num_nodes);
    for (index, id) in self.ids.iter().enumerate() {
      if let Some(&first) = seen.get(id.as_str()) {
        return Err(FixtureError::DuplicateIdentifier {
          identifier: id.clone(),
          first,
          second: index,
        });
      }
      seen.insert(id, index);
    }

    Ok(())
  }
}

/// Graph keyed by node identifier, in node order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentifierEncoding {
  children: IndexMap<String, Vec<String>>,
}

impl IdentifierEncoding {
  pub fn with_capacity(num_nodes: usize) -> Self {
    Self {
      children: IndexMap::with_capacity(num_nodes),
    }
  }

  /// Returns the previous children if `id` was already present.
  pub fn insert(&mut self, id: String, children: Vec<String>) -> Option<Vec<String>> {
    self.children.insert(id, children)
  }

  pub fn get(&self, id: &str) -> Option<&[String]> {
    self.children.get(id).map(Vec::as_slice)
  }

  pub fn len(&self) -> usize {
    self.children.len()
  }

  pub fn is_empty(&self) -> bool {
    self.children.is_empty()
  }

  pub fn num_edges(&self) -> usize {
    self.children.values().map(Vec::len).sum()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
    self
      .children
      .iter()
      .map(|(id, children)| (id.as_str(), children.as_slice()))
  }
}

/// Checks that both encodings describe the same edge set.
///
/// For every node `i`, the identifier encoding must hold exactly
/// `[ids[j] for j in children[i]]` under the key `ids[i]`.
pub fn verify_equivalence(index: &IndexEncoding, identifiers: &IdentifierEncoding) -> FixtureResult<()> {
  index.validate()?;

  if identifiers.len() != index.len() {
    return Err(FixtureError::NodeCountMismatch {
      expected: index.len(),
      actual: identifiers.len(),
    });
  }

  for (id, children) in index.ids.iter().zip(&index.children) {
    let Some(actual) = identifiers.get(id) else {
      return Err(FixtureError::MissingNode {
        identifier: id.clone(),
      });
    };

    let expected: Vec<&str> = children.iter().map(|&child| index.ids[child].as_str()).collect();
    if actual.len() != expected.len() || actual.iter().zip(&expected).any(|(a, e)| a != e) {
      return Err(FixtureError::ChildrenMismatch {
        identifier: id.clone(),
        expected: expected.into_iter().map(String::from).collect(),
        actual: actual.to_vec(),
      });
    }
  }

  Ok(())
}
