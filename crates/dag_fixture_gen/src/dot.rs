use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::Context;
use petgraph::dot::{Config as DotConfig, Dot};
use petgraph::graph::DiGraph;
use tracing::info;

use crate::encoding::IndexEncoding;
use crate::output::write_file;

/// Builds a petgraph graph whose node weights are the identifiers.
pub fn to_petgraph(index: &IndexEncoding) -> DiGraph<&str, ()> {
  let mut g: DiGraph<&str, ()> = DiGraph::with_capacity(index.len(), index.num_edges());
  let node_ix: Vec<_> = index.ids.iter().map(|id| g.add_node(id.as_str())).collect();
  for (src, dst) in index.edges() {
    g.add_edge(node_ix[src], node_ix[dst], ());
  }
  g
}

pub fn to_dot(index: &IndexEncoding) -> String {
  let g = to_petgraph(index);
  format!("{:?}", Dot::with_config(&g, &[DotConfig::EdgeNoLabel]))
}

/// Writes the graph next to the fixtures.
///
/// `.png` and `.svg` paths are rendered through graphviz `dot`; anything else
/// receives the DOT source.
pub fn render_dot(index: &IndexEncoding, out_path: &Path) -> anyhow::Result<()> {
  let dot = to_dot(index);

  let format = match out_path.extension().and_then(|ext| ext.to_str()) {
    Some("png") => "png",
    Some("svg") => "svg",
    _ => {
      info!(path = %out_path.display(), "writing DOT source");
      return write_file(out_path, dot.as_bytes());
    }
  };

  info!(path = %out_path.display(), format, "rendering DOT via graphviz");
  let mut child = Command::new("dot")
    .arg(format!("-T{format}"))
    .arg("-o")
    .arg(out_path)
    .stdin(Stdio::piped())
    .stdout(Stdio::null())
    .stderr(Stdio::inherit())
    .spawn()
    .context("failed to spawn graphviz 'dot'")?;
  {
    let stdin = child
      .stdin
      .as_mut()
      .context("graphviz 'dot' stdin was not piped")?;
    stdin.write_all(dot.as_bytes())?;
  }
  let status = child.wait()?;
  if !status.success() {
    return Err(anyhow::anyhow!(
      "graphviz 'dot' failed with status {:?}",
      status
    ));
  }
  Ok(())
}
