//! Heuristic problem classification.
//!
//! `ProblemClassifier::classify` is a pure function of the statement and the static
//! tables: keyword scoring picks the domain tag, fixed signals accumulate a complexity
//! score, and a handful of independent probes fill the insight map.
//!
//! Matching rules:
//!   - keywords match as substrings of the lower-cased statement, one point per distinct keyword
//!   - score ties resolve by `DomainTag::SCORED` order (array > math > string > loop > conditional)
//!   - constraint phrases (`if|when|where|such that|given that`) are counted as substring
//!     matches, so "different" counts once for "if"

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, instrument};

use crate::domain::{DomainTag, Insight, InsightValue, Insights, ProblemContext};
use crate::tables::Tables;

const MIN_COMPLEXITY: u32 = 1;
const MAX_COMPLEXITY: u32 = 5;
const LONG_STATEMENT_CHARS: usize = 500;
const TITLE_MARKER: &str = "Problem:";

fn condition_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"if|when|where|such that|given that").expect("valid regex"))
}

fn numeric_range_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"\d+\s*<=.*<=\s*\d+").expect("valid regex"))
}

fn number_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"\b\d+").expect("valid regex"))
}

#[derive(Clone, Copy)]
pub struct ProblemClassifier {
  tables: &'static Tables,
}

impl ProblemClassifier {
  pub fn new(tables: &'static Tables) -> Self {
    Self { tables }
  }

  #[instrument(level = "debug", skip(self, statement), fields(statement_len = statement.len()))]
  pub fn classify(&self, statement: &str) -> ProblemContext {
    if statement.trim().is_empty() {
      debug!(target: "tutor", "Empty statement; classifying as general");
      return ProblemContext {
        statement: statement.to_string(),
        domain_tag: DomainTag::General,
        complexity_level: MIN_COMPLEXITY as u8,
        suggested_approaches: self.approaches(DomainTag::General),
        insights: Insights::new(),
      };
    }

    let lower = statement.to_lowercase();
    let domain_tag = self.pick_domain(&lower);
    let complexity_level = estimate_complexity(statement);
    let insights = extract_insights(statement);
    debug!(target: "tutor", domain = %domain_tag, complexity = complexity_level, insights = insights.len(), "Statement classified");

    ProblemContext {
      statement: statement.to_string(),
      domain_tag,
      complexity_level,
      suggested_approaches: self.approaches(domain_tag),
      insights,
    }
  }

  /// Classify an annotated solution file by its declared (or derived) title and tag
  /// the result with provenance insights.
  #[instrument(level = "debug", skip(self, content), fields(%file_name, content_len = content.len()))]
  pub fn classify_source(&self, file_name: &str, content: &str) -> ProblemContext {
    let title = derive_title(file_name, content);
    let mut ctx = self.classify(&title);
    ctx.insights.insert(Insight::SourceFile, InsightValue::Text(file_name.to_string()));
    ctx.insights.insert(Insight::HasSolution, InsightValue::Flag(true));
    ctx
  }

  /// Distinct-keyword score per scored tag, in priority order.
  pub fn scores(&self, lower: &str) -> Vec<(DomainTag, usize)> {
    DomainTag::SCORED
      .iter()
      .map(|tag| {
        let hits = self.tables.keywords_for(*tag).iter().filter(|k| lower.contains(**k)).count();
        (*tag, hits)
      })
      .collect()
  }

  fn pick_domain(&self, lower: &str) -> DomainTag {
    let mut best = (DomainTag::General, 0usize);
    for (tag, score) in self.scores(lower) {
      // strict '>' keeps the earlier (higher-priority) tag on ties
      if score > best.1 {
        best = (tag, score);
      }
    }
    best.0
  }

  fn approaches(&self, tag: DomainTag) -> Vec<String> {
    self.tables.approaches_for(tag).iter().map(|s| s.to_string()).collect()
  }
}

/// Difficulty estimate in `[1, 5]`.
pub fn estimate_complexity(statement: &str) -> u8 {
  let lower = statement.to_lowercase();
  let has_any = |words: &[&str]| words.iter().any(|w| lower.contains(w));

  let mut complexity = MIN_COMPLEXITY;
  if has_any(&["nested", "two-dimensional"]) { complexity += 2; }
  if has_any(&["optimize", "efficient"]) { complexity += 2; }
  if has_any(&["multiple", "several"]) { complexity += 1; }
  if has_any(&["recursive", "recursion"]) { complexity += 3; }
  if statement.chars().count() > LONG_STATEMENT_CHARS { complexity += 1; }
  complexity += condition_re().find_iter(&lower).count() as u32;

  complexity.clamp(MIN_COMPLEXITY, MAX_COMPLEXITY) as u8
}

/// Independent structural probes. None of them suppresses another.
pub fn extract_insights(statement: &str) -> Insights {
  let lower = statement.to_lowercase();
  let has_any = |words: &[&str]| words.iter().any(|w| lower.contains(w));
  let mut insights = Insights::new();

  // case-sensitive on purpose: literal section markers
  if statement.contains("Input:") && statement.contains("Output:") {
    insights.insert(Insight::HasIoFormat, InsightValue::Flag(true));
  }
  if has_any(&["example", "sample"]) {
    insights.insert(Insight::HasExamples, InsightValue::Flag(true));
  }
  if has_any(&["constraint", "limit"]) || numeric_range_re().is_match(statement) {
    insights.insert(Insight::HasConstraints, InsightValue::Flag(true));
  }
  if has_any(&["efficient", "optimal", "fast"]) {
    insights.insert(Insight::EfficiencyRequired, InsightValue::Flag(true));
  }
  if number_re().is_match(statement) || has_any(&["calculate", "formula"]) {
    insights.insert(Insight::Mathematical, InsightValue::Flag(true));
  }
  insights
}

/// Title of an annotated source artifact.
///
/// Prefers the first `// Problem: <title>` line; otherwise strips digits and the
/// extension from the file name and splits CamelCase ("LargestInArray11.java" ->
/// "Largest In Array").
pub fn derive_title(file_name: &str, content: &str) -> String {
  let declared = content
    .lines()
    .filter_map(|l| l.trim().strip_prefix("//"))
    .find_map(|l| l.trim_start().strip_prefix(TITLE_MARKER))
    .map(str::trim)
    .filter(|t| !t.is_empty());
  if let Some(t) = declared {
    return t.to_string();
  }

  let name = Path::new(file_name)
    .file_name()
    .and_then(|n| n.to_str())
    .unwrap_or(file_name);
  let stem = match name.rsplit_once('.') {
    Some((stem, _ext)) if !stem.is_empty() => stem,
    _ => name,
  };

  let mut title = String::with_capacity(stem.len() + 8);
  for ch in stem.chars().filter(|c| !c.is_ascii_digit()) {
    if ch.is_uppercase() {
      title.push(' ');
    }
    title.push(if ch == '_' || ch == '-' { ' ' } else { ch });
  }
  let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
  if title.is_empty() { "Untitled problem".to_string() } else { title }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn classifier() -> ProblemClassifier {
    ProblemClassifier::new(Tables::builtin())
  }

  #[test]
  fn array_sum_statement_is_simple_array_problem() {
    let ctx = classifier().classify("Find the sum of all elements in the array");
    assert_eq!(ctx.domain_tag, DomainTag::Array);
    assert_eq!(ctx.complexity_level, 1);
    assert_eq!(ctx.suggested_approaches[0], "Iteration and tracking");
    assert_eq!(ctx.suggested_approaches.len(), 4);
  }

  #[test]
  fn escalators_are_clamped_to_five() {
    let ctx = classifier().classify("Calculate the recursive factorial of N using an optimized nested loop");
    assert_eq!(ctx.domain_tag, DomainTag::Math);
    assert_eq!(ctx.complexity_level, 5);
  }

  #[test]
  fn single_table_keyword_selects_that_table() {
    let c = classifier();
    assert_eq!(c.classify("is it a palindrome").domain_tag, DomainTag::String);
    assert_eq!(c.classify("print a fibonacci").domain_tag, DomainTag::Math);
    assert_eq!(c.classify("keep going until done").domain_tag, DomainTag::Loop);
  }

  #[test]
  fn no_keywords_means_general_with_base_complexity() {
    let ctx = classifier().classify("Say hello to the user");
    assert_eq!(ctx.domain_tag, DomainTag::General);
    assert_eq!(ctx.complexity_level, 1);
    assert!(ctx.insights.is_empty());
    assert_eq!(ctx.suggested_approaches[0], "Break down into sub-problems");
  }

  #[test]
  fn blank_statement_does_not_fault() {
    for s in ["", "   \n\t "] {
      let ctx = classifier().classify(s);
      assert_eq!(ctx.domain_tag, DomainTag::General);
      assert_eq!(ctx.complexity_level, 1);
      assert!(ctx.insights.is_empty());
    }
  }

  #[test]
  fn ties_resolve_by_priority_order() {
    // one array keyword ("sort") and one string keyword ("word")
    let scores = classifier().scores("sort word");
    assert_eq!(scores[0], (DomainTag::Array, 1));
    assert_eq!(scores[2], (DomainTag::String, 1));
    assert_eq!(classifier().classify("sort word").domain_tag, DomainTag::Array);
    // math vs conditional
    assert_eq!(classifier().classify("prime even").domain_tag, DomainTag::Math);
  }

  #[test]
  fn repeated_keyword_counts_once() {
    let scores = classifier().scores("string string string sum");
    assert_eq!(scores[2], (DomainTag::String, 1));
    assert_eq!(scores[0], (DomainTag::Array, 1));
  }

  #[test]
  fn complexity_counts_every_constraint_phrase() {
    assert_eq!(estimate_complexity("when x, when y"), 3);
    assert_eq!(estimate_complexity("given that a"), 2);
    let long = "a".repeat(501);
    assert_eq!(estimate_complexity(&long), 2);
    let wall = "if ".repeat(50);
    assert_eq!(estimate_complexity(&wall), 5);
  }

  #[test]
  fn insight_probes_are_independent() {
    let s = "Input: n\nOutput: sum\nExample: 3\nConstraints: 1 <= n <= 100. Be efficient.";
    let ins = extract_insights(s);
    for key in [
      Insight::HasIoFormat,
      Insight::HasExamples,
      Insight::HasConstraints,
      Insight::EfficiencyRequired,
      Insight::Mathematical,
    ] {
      assert_eq!(ins.get(&key), Some(&InsightValue::Flag(true)), "{key:?}");
    }
    // markers are case-sensitive
    assert!(!extract_insights("input: a output: b").contains_key(&Insight::HasIoFormat));
    assert!(extract_insights("2 <= k <= 9").contains_key(&Insight::HasConstraints));
  }

  #[test]
  fn declared_title_wins_over_file_name() {
    let content = "// Problem: Largest Number in Array\nimport java.util.Scanner;";
    assert_eq!(derive_title("LargestInArray11.java", content), "Largest Number in Array");
  }

  #[test]
  fn declared_title_tolerates_comment_spacing() {
    assert_eq!(derive_title("X1.java", "//Problem: Find odd one"), "Find odd one");
    assert_eq!(derive_title("X1.java", "  //   Problem:   Find odd one  "), "Find odd one");
    assert_eq!(derive_title("SearchInArray15.java", "/* Problem: not a line comment */"), "Search In Array");
  }

  #[test]
  fn fallback_title_splits_camel_case() {
    assert_eq!(derive_title("LargestInArray11.java", "class X {}"), "Largest In Array");
    assert_eq!(derive_title("dir/CountVowelConsonant18.java", ""), "Count Vowel Consonant");
    assert_eq!(derive_title("42.java", ""), "Untitled problem");
  }

  #[test]
  fn source_classification_carries_provenance() {
    let ctx = classifier().classify_source("SearchInArray15.java", "public class SearchInArray15 {}");
    assert_eq!(ctx.statement, "Search In Array");
    assert_eq!(ctx.domain_tag, DomainTag::Array);
    assert_eq!(
      ctx.insight(Insight::SourceFile),
      Some(&InsightValue::Text("SearchInArray15.java".into()))
    );
    assert!(ctx.has_insight(Insight::HasSolution));
  }
}
