use std::collections::HashMap;

use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::encoding::{IdentifierEncoding, IndexEncoding};
use crate::error::{FixtureError, FixtureResult};
use crate::identifier::IdentifierSynthesizer;

/// One generated graph in both encodings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FixtureGraph {
  pub index: IndexEncoding,
  pub identifiers: IdentifierEncoding,
  pub num_edges: usize,
}

impl FixtureGraph {
  pub fn num_nodes(&self) -> usize {
    self.index.len()
  }
}

/// Samples a random DAG over `num_nodes` nodes.
///
/// Node `i` gets a uniform out-degree in `0..=max_out_degree`, clamped to the
/// number of later nodes, and its children are a uniform subset of
/// `i + 1..num_nodes`. Every edge points forward, so index order is a
/// topological order.
pub fn generate<R>(
  num_nodes: usize,
  max_out_degree: usize,
  synthesizer: &dyn IdentifierSynthesizer,
  rng: &mut R,
) -> FixtureResult<FixtureGraph>
where
  R: Rng + ?Sized,
{
  let ids = synthesize_all(num_nodes, synthesizer)?;

  let mut index = IndexEncoding::with_capacity(num_nodes);
  let mut identifiers = IdentifierEncoding::with_capacity(num_nodes);
  let mut num_edges = 0;

  for (node_index, node_id) in ids.iter().enumerate() {
    let children = sample_children(node_index, num_nodes, max_out_degree, rng);
    trace!(node = node_index, out_degree = children.len(), "sampled children");
    num_edges += children.len();

    let child_ids = children.iter().map(|&child| ids[child].clone()).collect();
    identifiers.insert(node_id.clone(), child_ids);
    index.push(node_id.clone(), children);
  }

  debug!(nodes = num_nodes, edges = num_edges, "sampled DAG");

  Ok(FixtureGraph {
    index,
    identifiers,
    num_edges,
  })
}

/// Picks the children of `node_index` from the nodes after it.
pub fn sample_children<R>(
  node_index: usize,
  num_nodes: usize,
  max_out_degree: usize,
  rng: &mut R,
) -> Vec<usize>
where
  R: Rng + ?Sized,
{
  let min_child_index = node_index + 1;
  let eligible = num_nodes.saturating_sub(min_child_index);

  let target_out_degree = rng.gen_range(0..=max_out_degree);
  let out_degree = target_out_degree.min(eligible);
  if out_degree == 0 {
    return Vec::new();
  }

  rand::seq::index::sample(rng, eligible, out_degree)
    .into_iter()
    .map(|offset| min_child_index + offset)
    .collect()
}

/// Synthesizes every identifier up front and rejects collisions, which would
/// otherwise merge distinct nodes in the identifier encoding.
fn synthesize_all(
  num_nodes: usize,
  synthesizer: &dyn IdentifierSynthesizer,
) -> FixtureResult<Vec<String>> {
  let ids: Vec<String> = (0..num_nodes)
    .into_par_iter()
    .map(|node_index| synthesizer.synthesize(node_index))
    .collect();

  let mut seen: HashMap<&str, usize> = HashMap::with_capacity(num_nodes);
  for (node_index, id) in ids.iter().enumerate() {
    if let Some(&first) = seen.get(id.as_str()) {
      return Err(FixtureError::DuplicateIdentifier {
        identifier: id.clone(),
        first,
        second: node_index,
      });
    }
    seen.insert(id, node_index);
  }

  Ok(ids)
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use petgraph::algo::toposort;
  use petgraph::graph::DiGraph;
  use pretty_assertions::assert_eq;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  use super::*;
  use crate::encoding::verify_equivalence;
  use crate::identifier::{IdentifierForm, LegacyIdentifier, StructuredIdentifier};

  fn generate_seeded(num_nodes: usize, max_out_degree: usize, seed: u64) -> FixtureGraph {
    let mut rng = StdRng::seed_from_u64(seed);
    generate(num_nodes, max_out_degree, &StructuredIdentifier, &mut rng).unwrap()
  }

  fn assert_is_dag(graph: &FixtureGraph) {
    let mut g: DiGraph<(), ()> = DiGraph::new();
    let node_ix: Vec<_> = (0..graph.num_nodes()).map(|_| g.add_node(())).collect();
    for (src, dst) in graph.index.edges() {
      g.add_edge(node_ix[src], node_ix[dst], ());
    }
    assert!(toposort(&g, None).is_ok(), "graph contains a cycle");
  }

  #[test]
  fn zero_nodes_yields_empty_encodings() {
    let graph = generate_seeded(0, 5, 1);

    assert!(graph.index.is_empty());
    assert!(graph.identifiers.is_empty());
    assert_eq!(graph.num_edges, 0);
  }

  #[test]
  fn single_node_has_no_children() {
    let graph = generate_seeded(1, 10, 2);

    assert_eq!(graph.index.ids, vec!["model.dbt_utils.my_0_orders.v0"]);
    assert_eq!(graph.index.children, vec![Vec::<usize>::new()]);
    assert_eq!(
      graph.identifiers.get("model.dbt_utils.my_0_orders.v0"),
      Some(&[][..])
    );
    assert_eq!(graph.num_edges, 0);
  }

  #[test]
  fn zero_max_out_degree_yields_no_edges() {
    for seed in 0..20 {
      let graph = generate_seeded(3, 0, seed);

      let expected: Vec<Vec<usize>> = vec![vec![]; 3];
      assert_eq!(graph.index.children, expected);
      assert_eq!(graph.index.ids.len(), 3);
      assert_eq!(graph.num_edges, 0);
    }

    let graph = generate_seeded(50, 0, 3);
    assert!(graph.index.children.iter().all(Vec::is_empty));
    assert!(graph.identifiers.iter().all(|(_, children)| children.is_empty()));
  }

  #[test]
  fn edges_point_forward_and_respect_the_degree_bound() {
    let num_nodes = 300;
    let max_out_degree = 6;
    let graph = generate_seeded(num_nodes, max_out_degree, 12345);

    for (node, children) in graph.index.children.iter().enumerate() {
      assert!(children.len() <= max_out_degree);
      assert!(children.len() <= num_nodes - node - 1);
      assert!(children.iter().all(|&child| child > node && child < num_nodes));

      let unique: HashSet<_> = children.iter().collect();
      assert_eq!(unique.len(), children.len(), "duplicate child for {node}");
    }

    assert!(graph.index.children.last().unwrap().is_empty());
    assert_is_dag(&graph);
  }

  #[test]
  fn encodings_describe_the_same_edges() {
    for form in [IdentifierForm::Structured, IdentifierForm::Legacy] {
      let mut rng = StdRng::seed_from_u64(7);
      let graph = generate(200, 4, form.synthesizer(), &mut rng).unwrap();

      assert_eq!(verify_equivalence(&graph.index, &graph.identifiers), Ok(()));

      for (node, children) in graph.index.children.iter().enumerate() {
        let expected: HashSet<String> = children
          .iter()
          .map(|&child| form.synthesizer().synthesize(child))
          .collect();
        let actual: HashSet<String> = graph
          .identifiers
          .get(&form.synthesizer().synthesize(node))
          .unwrap()
          .iter()
          .cloned()
          .collect();
        assert_eq!(expected, actual);
      }
    }
  }

  #[test]
  fn edge_count_matches_both_encodings() {
    let graph = generate_seeded(150, 5, 99);

    assert_eq!(graph.num_edges, graph.index.num_edges());
    assert_eq!(graph.num_edges, graph.identifiers.num_edges());
  }

  #[test]
  fn same_seed_same_graph() {
    let first = generate_seeded(120, 4, 4242);
    let second = generate_seeded(120, 4, 4242);

    assert_eq!(first, second);
  }

  #[test]
  fn out_degree_covers_the_whole_range() {
    let mut rng = StdRng::seed_from_u64(5);
    let degrees: HashSet<usize> = (0..500)
      .map(|_| sample_children(0, 1_000, 3, &mut rng).len())
      .collect();

    assert_eq!(degrees, HashSet::from([0, 1, 2, 3]));
  }

  #[test]
  fn out_degree_is_clamped_to_remaining_nodes() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..100 {
      let children = sample_children(7, 10, 50, &mut rng);
      assert!(children.len() <= 2);
      assert!(children.iter().all(|&child| child == 8 || child == 9));
    }
  }

  #[test]
  fn index_order_matches_node_order() {
    let mut rng = StdRng::seed_from_u64(3);
    let graph = generate(40, 3, &LegacyIdentifier, &mut rng).unwrap();

    let expected: Vec<String> = (0..40).map(|i| LegacyIdentifier.synthesize(i)).collect();
    assert_eq!(graph.index.ids, expected);
    let keys: Vec<&str> = graph.identifiers.iter().map(|(id, _)| id).collect();
    assert_eq!(keys, expected.iter().map(String::as_str).collect::<Vec<_>>());
  }

  #[test]
  fn colliding_identifiers_are_rejected() {
    let mut rng = StdRng::seed_from_u64(0);
    let by_parity = |index: usize| format!("node_{}", index % 2);

    assert_eq!(
      generate(5, 2, &by_parity, &mut rng),
      Err(FixtureError::DuplicateIdentifier {
        identifier: "node_0".into(),
        first: 0,
        second: 2,
      })
    );
  }
}
