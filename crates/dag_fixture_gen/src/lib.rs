//! Random DAG fixtures for graph-compression tests.
//!
//! Each generated graph is emitted twice: once keyed by node index and once
//! keyed by a synthetic resource identifier. Both encodings describe the same
//! edge set.
//!
//! ```
//! use dag_fixture_gen::{generate, verify_equivalence, IdentifierForm};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let graph = generate(10, 3, IdentifierForm::Structured.synthesizer(), &mut rng).unwrap();
//!
//! assert_eq!(graph.index.len(), 10);
//! assert!(verify_equivalence(&graph.index, &graph.identifiers).is_ok());
//! ```

pub mod dot;
pub mod encoding;
pub mod error;
pub mod identifier;
pub mod output;
pub mod sampler;

pub use encoding::{verify_equivalence, IdentifierEncoding, IndexEncoding};
pub use error::{FixtureError, FixtureResult};
pub use identifier::{
  IdentifierForm, IdentifierSynthesizer, LegacyIdentifier, ResourceId, StructuredIdentifier,
};
pub use output::{
  fixture_file_name, generate_fixtures, read_fixture_pair, verify_fixture_files, FixtureKind,
  FixtureSummary, GenerateFixturesParams,
};
pub use sampler::{generate, sample_children, FixtureGraph};
