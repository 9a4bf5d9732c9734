//! Domain models used by the backend: domain tags, insights, problem context and catalog entries.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse category assigned to a problem statement.
///
/// Declaration order doubles as the classification tie-break priority
/// (`Array` wins over `Math`, which wins over `String`, and so on).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum DomainTag {
  Array,
  Math,
  String,
  Loop,
  Conditional,
  General,
}

impl DomainTag {
  /// Tags that own a keyword table, in tie-break priority order.
  pub const SCORED: [DomainTag; 5] = [
    DomainTag::Array,
    DomainTag::Math,
    DomainTag::String,
    DomainTag::Loop,
    DomainTag::Conditional,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      DomainTag::Array => "array",
      DomainTag::Math => "math",
      DomainTag::String => "string",
      DomainTag::Loop => "loop",
      DomainTag::Conditional => "conditional",
      DomainTag::General => "general",
    }
  }
}

impl Default for DomainTag {
  fn default() -> Self { DomainTag::General }
}

impl fmt::Display for DomainTag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Structural property detected in a statement. Absence means "not detected".
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Insight {
  HasIoFormat,
  HasExamples,
  HasConstraints,
  EfficiencyRequired,
  Mathematical,
  SourceFile,
  HasSolution,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum InsightValue {
  Flag(bool),
  Text(String),
}

pub type Insights = BTreeMap<Insight, InsightValue>;

/// Result of one analysis. Immutable once produced.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProblemContext {
  pub statement: String,
  pub domain_tag: DomainTag,
  pub complexity_level: u8,
  pub suggested_approaches: Vec<String>,
  #[serde(default)]
  pub insights: Insights,
}

impl ProblemContext {
  pub fn has_insight(&self, key: Insight) -> bool {
    self.insights.contains_key(&key)
  }

  pub fn insight(&self, key: Insight) -> Option<&InsightValue> {
    self.insights.get(&key)
  }
}

/// Where did a catalog problem come from?
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProblemSource {
  LocalBank,   // from the TOML [[problems]] bank
  SourceFile,  // ingested from PROBLEMS_DIR
  Seed,        // built-in seeds
}

/// Catalog entry: a titled problem plus its one-time classification.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemEntry {
  pub id: String,
  pub title: String,
  pub source: ProblemSource,
  pub context: ProblemContext,
}
