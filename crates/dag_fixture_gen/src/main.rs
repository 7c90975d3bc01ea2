use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use dag_fixture_gen::{generate_fixtures, GenerateFixturesParams, IdentifierForm};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "dag-fixture-gen")]
#[command(about = "Generate random DAG fixtures in int-keyed and string-keyed JSON", long_about = None)]
struct Cli {
  /// Number of nodes in the generated graph
  num_nodes: usize,
  /// Maximum number of children per node (inclusive)
  max_num_edges: usize,
  /// Optional RNG seed for reproducible graphs
  #[arg(long = "seed", short = 's')]
  seed: Option<u64>,
  /// Shape of the synthesized node identifiers
  #[arg(long = "form", short = 'f', value_enum, default_value_t = IdentifierForm::Structured)]
  form: IdentifierForm,
  /// Directory the two fixture files are written to
  #[arg(long = "output-dir", short = 'o', env = "DAG_FIXTURE_OUTPUT_DIR", default_value = ".")]
  output_dir: PathBuf,
  /// Pretty-print the JSON fixtures
  #[arg(long = "pretty")]
  pretty: bool,
  /// Optional path for a rendering of the graph (.dot, or .png/.svg via graphviz)
  #[arg(long = "dot-output")]
  dot_output: Option<PathBuf>,
  /// Re-read the written fixtures and check that both describe the same graph
  #[arg(long = "verify")]
  verify: bool,
}

fn main() -> anyhow::Result<()> {
  let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
  tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_target(false)
    .compact()
    .init();

  let cli = Cli::parse();
  info!(?cli, "starting fixture generation");

  let summary = generate_fixtures(GenerateFixturesParams {
    output_dir: &cli.output_dir,
    num_nodes: cli.num_nodes,
    max_out_degree: cli.max_num_edges,
    form: cli.form,
    seed: cli.seed,
    pretty: cli.pretty,
    dot_output: cli.dot_output.clone(),
    verify: cli.verify,
  })
  .with_context(|| format!("Failed to generate fixtures in {}", cli.output_dir.display()))?;

  info!(
    edges = summary.num_edges,
    int = %summary.int_path.display(),
    string = %summary.string_path.display(),
    "fixtures written"
  );
  Ok(())
}
