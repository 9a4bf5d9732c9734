//! Problem catalog: seeds, TOML bank entries and annotated solution files, each
//! classified once when the catalog is built.

use std::collections::HashMap;
use std::path::Path;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::classifier::ProblemClassifier;
use crate::config::ProblemCfg;
use crate::domain::{Insight, ProblemEntry, ProblemSource};
use crate::seeds::seed_problems;

const SOURCE_EXTENSIONS: &[&str] = &["java", "rs", "py", "c", "cpp", "cc", "js", "ts", "go", "kt"];

#[derive(Default)]
pub struct ProblemCatalog {
  by_id: HashMap<String, ProblemEntry>,
}

impl ProblemCatalog {
  /// Bank entries first, then files from `dir`, then built-in seeds; earlier
  /// sources win on id collisions.
  #[instrument(level = "info", skip_all, fields(bank = bank.len()))]
  pub fn build(classifier: &ProblemClassifier, bank: &[ProblemCfg], dir: Option<&Path>) -> Self {
    let mut catalog = Self::default();

    for cfg in bank {
      let id = cfg.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
      if cfg.statement.trim().is_empty() {
        warn!(target: "tutor", %id, "Skipping bank problem: empty statement.");
        continue;
      }
      let title = cfg.title.clone().unwrap_or_else(|| first_line(&cfg.statement));
      catalog.insert(ProblemEntry {
        id,
        title,
        source: ProblemSource::LocalBank,
        context: classifier.classify(&cfg.statement),
      });
    }

    if let Some(dir) = dir {
      for (file_name, content) in read_source_dir(dir) {
        let context = classifier.classify_source(&file_name, &content);
        catalog.insert(ProblemEntry {
          id: format!("file:{}", file_name),
          title: context.statement.clone(),
          source: ProblemSource::SourceFile,
          context,
        });
      }
    }

    for seed in seed_problems() {
      catalog.insert(ProblemEntry {
        id: seed.id.to_string(),
        title: seed.title.to_string(),
        source: ProblemSource::Seed,
        context: classifier.classify(seed.statement),
      });
    }

    let mut counts: HashMap<String, usize> = HashMap::new();
    for e in catalog.by_id.values() {
      *counts.entry(e.context.domain_tag.to_string()).or_default() += 1;
    }
    for (domain, n) in counts {
      info!(target: "tutor", %domain, problems = n, "Startup catalog inventory");
    }
    let with_solutions = catalog.by_id.values().filter(|e| e.context.has_insight(Insight::HasSolution)).count();
    info!(target: "tutor", total = catalog.len(), with_solutions, "Problem catalog built");
    catalog
  }

  fn insert(&mut self, entry: ProblemEntry) {
    self.by_id.entry(entry.id.clone()).or_insert(entry);
  }

  pub fn get(&self, id: &str) -> Option<&ProblemEntry> {
    self.by_id.get(id)
  }

  pub fn len(&self) -> usize {
    self.by_id.len()
  }

  /// Entries sorted case-insensitively by title.
  pub fn list(&self) -> Vec<&ProblemEntry> {
    let mut out: Vec<&ProblemEntry> = self.by_id.values().collect();
    out.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()).then_with(|| a.id.cmp(&b.id)));
    out
  }
}

fn first_line(s: &str) -> String {
  s.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or_default().to_string()
}

/// `(file name, content)` for every readable source file directly inside `dir`.
fn read_source_dir(dir: &Path) -> Vec<(String, String)> {
  let entries = match std::fs::read_dir(dir) {
    Ok(e) => e,
    Err(e) => {
      warn!(target: "tutor", dir = %dir.display(), error = %e, "Cannot read problems directory");
      return Vec::new();
    }
  };

  let mut out = Vec::new();
  for entry in entries.flatten() {
    let path = entry.path();
    let is_source = path
      .extension()
      .and_then(|e| e.to_str())
      .map_or(false, |e| SOURCE_EXTENSIONS.contains(&e));
    if !path.is_file() || !is_source {
      continue;
    }
    let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else { continue };
    match std::fs::read_to_string(&path) {
      Ok(content) => out.push((name, content)),
      Err(e) => warn!(target: "tutor", file = %path.display(), error = %e, "Skipping unreadable problem file"),
    }
  }
  out.sort();
  out
}
