use std::fmt;

use serde::{Deserialize, Serialize};

/// Resource types, selected by `index % 7`.
pub const RESOURCE_TYPES: [&str; 7] = [
  "model",
  "macro",
  "source",
  "documentation",
  "group",
  "node",
  "metric",
];

/// Package that owns every node not assigned to an imported package.
pub const DEFAULT_PACKAGE: &str = "our_package_name";

/// Packages used for every 13th node, selected by `index % 3`.
pub const IMPORTED_PACKAGES: [&str; 3] = ["dbt_utils", "dbt_date", "audit_helper"];

/// Name suffixes for the structured form, selected by `index % 5`.
pub const NAME_SUFFIXES: [&str; 5] = ["orders", "customers", "payments", "sessions", "invoices"];

const NAME_PREFIX: &str = "my_";
const VERSION_MODULUS: usize = 17;
const IMPORTED_PACKAGE_MODULUS: usize = 13;

const LEGACY_IMPORTED_PACKAGE: &str = "imported_package";
const LEGACY_CATEGORIES: [&str; 5] = ["finance_", "test_", "ingested_", "dbt_project_", "revenue_"];
const LEGACY_EXTENSION: &str = ".sql";

/// Maps a node index to the identifier used as its key in the string encoding.
///
/// Implementations must be pure: the same index always yields the same string.
pub trait IdentifierSynthesizer: Sync {
  fn synthesize(&self, index: usize) -> String;
}

impl<F> IdentifierSynthesizer for F
where
  F: Fn(usize) -> String + Sync,
{
  fn synthesize(&self, index: usize) -> String {
    self(index)
  }
}

/// Which built-in identifier shape to generate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierForm {
  /// `model.our_package_name.my_0_orders.v0`
  #[default]
  Structured,
  /// `our_package_name::my_finance_model_0.sql`
  Legacy,
}

impl IdentifierForm {
  pub fn synthesizer(self) -> &'static dyn IdentifierSynthesizer {
    match self {
      IdentifierForm::Structured => &StructuredIdentifier,
      IdentifierForm::Legacy => &LegacyIdentifier,
    }
  }
}

/// The four fields of a structured identifier.
///
/// Displays as `type.project.name.vVERSION`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceId {
  pub resource_type: &'static str,
  pub project_name: &'static str,
  pub name: String,
  pub version: usize,
}

impl ResourceId {
  pub fn from_index(index: usize) -> Self {
    let project_name = if index % IMPORTED_PACKAGE_MODULUS == 0 {
      IMPORTED_PACKAGES[index % IMPORTED_PACKAGES.len()]
    } else {
      DEFAULT_PACKAGE
    };

    let prefix = if index % 2 == 0 { NAME_PREFIX } else { "" };
    let suffix = NAME_SUFFIXES[index % NAME_SUFFIXES.len()];

    ResourceId {
      resource_type: RESOURCE_TYPES[index % RESOURCE_TYPES.len()],
      project_name,
      name: format!("{prefix}{index}_{suffix}"),
      version: index % VERSION_MODULUS,
    }
  }
}

impl fmt::Display for ResourceId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{}.{}.{}.v{}",
      self.resource_type, self.project_name, self.name, self.version
    )
  }
}

/// `type.project.name.vVERSION` identifiers.
#[derive(Clone, Copy, Debug, Default)]
pub struct StructuredIdentifier;

impl IdentifierSynthesizer for StructuredIdentifier {
  fn synthesize(&self, index: usize) -> String {
    ResourceId::from_index(index).to_string()
  }
}

/// `package::[my_]category_type_index.sql` identifiers.
#[derive(Clone, Copy, Debug, Default)]
pub struct LegacyIdentifier;

impl IdentifierSynthesizer for LegacyIdentifier {
  fn synthesize(&self, index: usize) -> String {
    let package = if index % IMPORTED_PACKAGE_MODULUS == 0 {
      LEGACY_IMPORTED_PACKAGE
    } else {
      DEFAULT_PACKAGE
    };
    let prefix = if index % 2 == 0 { NAME_PREFIX } else { "" };
    let category = LEGACY_CATEGORIES[index % LEGACY_CATEGORIES.len()];
    let resource_type = RESOURCE_TYPES[index % RESOURCE_TYPES.len()];

    format!("{package}::{prefix}{category}{resource_type}_{index}{LEGACY_EXTENSION}")
  }
}
