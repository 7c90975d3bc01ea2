use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::dot::render_dot;
use crate::encoding::{verify_equivalence, IdentifierEncoding, IndexEncoding};
use crate::identifier::IdentifierForm;
use crate::sampler::generate;

/// Which of the two fixture files a path refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FixtureKind {
  /// `{"ids": [...], "children": [[...]]}`
  Int,
  /// `{"<id>": ["<child id>", ...]}`
  String,
}

impl FixtureKind {
  fn suffix(self) -> &'static str {
    match self {
      FixtureKind::Int => "int",
      FixtureKind::String => "string",
    }
  }
}

pub fn fixture_file_name(num_nodes: usize, num_edges: usize, kind: FixtureKind) -> String {
  format!("{num_nodes}_nodes_{num_edges}_edges_{}.json", kind.suffix())
}

pub struct GenerateFixturesParams<'a> {
  pub output_dir: &'a Path,
  pub num_nodes: usize,
  pub max_out_degree: usize,
  pub form: IdentifierForm,
  pub seed: Option<u64>,
  pub pretty: bool,
  pub dot_output: Option<PathBuf>,
  pub verify: bool,
}

impl Default for GenerateFixturesParams<'_> {
  fn default() -> Self {
    Self {
      output_dir: Path::new("."),
      num_nodes: 100,
      max_out_degree: 3,
      form: IdentifierForm::default(),
      seed: None,
      pretty: false,
      dot_output: None,
      verify: false,
    }
  }
}

/// What a generation run wrote to disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixtureSummary {
  pub num_nodes: usize,
  pub num_edges: usize,
  pub int_path: PathBuf,
  pub string_path: PathBuf,
}

/// Samples one graph and writes the int-keyed and string-keyed fixture files.
pub fn generate_fixtures(
  GenerateFixturesParams {
    output_dir,
    num_nodes,
    max_out_degree,
    form,
    seed,
    pretty,
    dot_output,
    verify,
  }: GenerateFixturesParams,
) -> anyhow::Result<FixtureSummary> {
  let mut rng: StdRng = match seed {
    Some(s) => StdRng::seed_from_u64(s),
    None => StdRng::from_rng(rand::thread_rng())?,
  };

  info!(num_nodes, max_out_degree, ?form, ?seed, "building DAG");
  let graph = generate(num_nodes, max_out_degree, form.synthesizer(), &mut rng)?;
  info!(nodes = num_nodes, edges = graph.num_edges, "graph built");

  let int_path = output_dir.join(fixture_file_name(num_nodes, graph.num_edges, FixtureKind::Int));
  let string_path = output_dir.join(fixture_file_name(
    num_nodes,
    graph.num_edges,
    FixtureKind::String,
  ));

  info!("writing fixtures to disk");
  write_json(&string_path, &graph.identifiers, pretty)?;
  write_json(&int_path, &graph.index, pretty)?;

  if let Some(out_path) = dot_output {
    render_dot(&graph.index, &out_path)
      .with_context(|| format!("Failed to render graph to {}", out_path.display()))?;
  }

  if verify {
    verify_fixture_files(&int_path, &string_path)?;
    info!("fixtures verified");
  }

  Ok(FixtureSummary {
    num_nodes,
    num_edges: graph.num_edges,
    int_path,
    string_path,
  })
}

pub fn read_fixture_pair(
  int_path: &Path,
  string_path: &Path,
) -> anyhow::Result<(IndexEncoding, IdentifierEncoding)> {
  let index: IndexEncoding = read_json(int_path)?;
  let identifiers: IdentifierEncoding = read_json(string_path)?;
  Ok((index, identifiers))
}

/// Re-reads a written pair and checks that both files hold the same edges.
pub fn verify_fixture_files(int_path: &Path, string_path: &Path) -> anyhow::Result<()> {
  let (index, identifiers) = read_fixture_pair(int_path, string_path)?;
  verify_equivalence(&index, &identifiers).with_context(|| {
    format!(
      "{} and {} describe different graphs",
      int_path.display(),
      string_path.display()
    )
  })
}

pub(crate) fn write_file(path: &Path, content: &[u8]) -> anyhow::Result<()> {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent)?;
  }
  debug!(file = %path.display(), bytes = content.len(), "writing file");
  let mut f = fs::File::create(path)
    .with_context(|| format!("Failed to create {}", path.display()))?;
  f.write_all(content)
    .with_context(|| format!("Failed to write {}", path.display()))?;
  Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> anyhow::Result<()> {
  let s = if pretty {
    serde_json::to_string_pretty(value)?
  } else {
    serde_json::to_string(value)?
  };
  write_file(path, s.as_bytes())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
  let content =
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
  serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn file_names_carry_node_and_edge_counts() {
    assert_eq!(
      fixture_file_name(10, 17, FixtureKind::Int),
      "10_nodes_17_edges_int.json"
    );
    assert_eq!(
      fixture_file_name(0, 0, FixtureKind::String),
      "0_nodes_0_edges_string.json"
    );
  }

  #[test]
  fn writes_both_fixture_files() {
    let dir = tempfile::tempdir().unwrap();
    let summary = generate_fixtures(GenerateFixturesParams {
      output_dir: dir.path(),
      num_nodes: 3,
      max_out_degree: 0,
      seed: Some(1),
      ..Default::default()
    })
    .unwrap();

    assert_eq!(summary.num_edges, 0);
    assert_eq!(summary.int_path, dir.path().join("3_nodes_0_edges_int.json"));
    assert_eq!(
      summary.string_path,
      dir.path().join("3_nodes_0_edges_string.json")
    );

    let int_json = fs::read_to_string(&summary.int_path).unwrap();
    assert_eq!(
      int_json,
      concat!(
        r#"{"ids":["model.dbt_utils.my_0_orders.v0","macro.our_package_name.1_customers.v1","#,
        r#""source.our_package_name.my_2_payments.v2"],"children":[[],[],[]]}"#
      )
    );

    let string_json = fs::read_to_string(&summary.string_path).unwrap();
    assert_eq!(
      string_json,
      concat!(
        r#"{"model.dbt_utils.my_0_orders.v0":[],"macro.our_package_name.1_customers.v1":[],"#,
        r#""source.our_package_name.my_2_payments.v2":[]}"#
      )
    );
  }

  #[test]
  fn verify_detects_tampered_files() {
    let dir = tempfile::tempdir().unwrap();
    let summary = generate_fixtures(GenerateFixturesParams {
      output_dir: dir.path(),
      num_nodes: 20,
      max_out_degree: 4,
      form: IdentifierForm::Legacy,
      seed: Some(8),
      verify: true,
      ..Default::default()
    })
    .unwrap();

    let (mut index, identifiers) =
      read_fixture_pair(&summary.int_path, &summary.string_path).unwrap();
    index.children[18] = if index.children[18].is_empty() {
      vec![19]
    } else {
      vec![]
    };
    let int_json = serde_json::to_string(&index).unwrap();
    write_file(&summary.int_path, int_json.as_bytes()).unwrap();

    assert!(verify_equivalence(&index, &identifiers).is_err());
    assert!(verify_fixture_files(&summary.int_path, &summary.string_path).is_err());
  }

  #[test]
  fn reading_a_missing_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing_int.json");

    let error = read_fixture_pair(&missing, &missing).unwrap_err();
    assert!(error.to_string().contains("missing_int.json"));
  }
}
