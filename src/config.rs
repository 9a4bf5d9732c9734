//! Loading tutor configuration (settings + optional problem bank) from TOML.
//!
//! See `TutorConfig` and `Settings` for the expected schema. Every key is optional;
//! missing keys take the defaults below. Settings are only read as initial values.

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::progress::{Adaptation, ProfileDefaults, MAX_HINT_LEVEL, MIN_HINT_LEVEL};
use crate::session::SessionSettings;
use crate::translate::DEFAULT_LANGUAGE;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct TutorConfig {
  #[serde(default)]
  pub settings: Settings,
  #[serde(default)]
  pub problems: Vec<ProblemCfg>,
}

/// Problem entry accepted in the TOML bank.
#[derive(Clone, Debug, Deserialize)]
pub struct ProblemCfg {
  #[serde(default)] pub id: Option<String>,
  #[serde(default)] pub title: Option<String>,
  #[serde(default)] pub statement: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
  pub default_language: String,
  pub default_hint_level: u8,
  pub default_learning_style: String,
  pub max_hints_per_session: usize,
  pub session_timeout_minutes: u64,
  pub translation_enabled: bool,
  pub progress_tracking_enabled: bool,
  pub feedback_collection_enabled: bool,
  pub adaptive_difficulty_enabled: bool,
  pub encouragement_enabled: bool,
  pub streak_rewards_enabled: bool,
  pub difficulty_adaptation_threshold: u32,
  pub supported_languages: Vec<String>,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      default_language: DEFAULT_LANGUAGE.into(),
      default_hint_level: 3,
      default_learning_style: "balanced".into(),
      max_hints_per_session: 10,
      session_timeout_minutes: 30,
      translation_enabled: true,
      progress_tracking_enabled: true,
      feedback_collection_enabled: true,
      adaptive_difficulty_enabled: true,
      encouragement_enabled: true,
      streak_rewards_enabled: true,
      difficulty_adaptation_threshold: 3,
      supported_languages: ["English", "Bangla", "Spanish", "French"].iter().map(|s| s.to_string()).collect(),
    }
  }
}

impl Settings {
  /// Repair out-of-range values instead of rejecting the file.
  pub fn validated(mut self) -> Self {
    if !(MIN_HINT_LEVEL..=MAX_HINT_LEVEL).contains(&self.default_hint_level) {
      warn!(target: "hintladder_backend", value = self.default_hint_level, "default_hint_level out of range; clamping");
      self.default_hint_level = self.default_hint_level.clamp(MIN_HINT_LEVEL, MAX_HINT_LEVEL);
    }
    self.supported_languages.retain(|l| !l.trim().is_empty());
    if self.supported_languages.is_empty() {
      self.supported_languages = Settings::default().supported_languages;
    }
    if !self.supported_languages.iter().any(|l| l == DEFAULT_LANGUAGE) {
      self.supported_languages.insert(0, DEFAULT_LANGUAGE.to_string());
    }
    if !self.supported_languages.contains(&self.default_language) {
      warn!(target: "hintladder_backend", language = %self.default_language, "default_language not supported; using English");
      self.default_language = DEFAULT_LANGUAGE.to_string();
    }
    self
  }

  pub fn is_supported_language(&self, language: &str) -> bool {
    self.supported_languages.iter().any(|l| l == language)
  }

  pub fn profile_defaults(&self) -> ProfileDefaults {
    ProfileDefaults {
      language: self.default_language.clone(),
      hint_level: self.default_hint_level,
      learning_style: self.default_learning_style.clone(),
    }
  }

  pub fn adaptation(&self) -> Adaptation {
    Adaptation { enabled: self.adaptive_difficulty_enabled, threshold: self.difficulty_adaptation_threshold }
  }

  pub fn session_settings(&self) -> SessionSettings {
    SessionSettings {
      max_hints: self.max_hints_per_session,
      translation_enabled: self.translation_enabled,
      encouragement_enabled: self.encouragement_enabled,
      // no streak remark for attempts that are never recorded
      streak_rewards_enabled: self.streak_rewards_enabled && self.progress_tracking_enabled,
    }
  }
}

pub fn parse_config(raw: &str) -> Result<TutorConfig, toml::de::Error> {
  let mut cfg = toml::from_str::<TutorConfig>(raw)?;
  cfg.settings = cfg.settings.validated();
  Ok(cfg)
}

/// Attempt to load `TutorConfig` from TUTOR_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_tutor_config_from_env() -> Option<TutorConfig> {
  let path = std::env::var("TUTOR_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_config(&s) {
      Ok(cfg) => {
        info!(target: "hintladder_backend", %path, problems = cfg.problems.len(), "Loaded tutor config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "hintladder_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "hintladder_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_file_yields_defaults() {
    let cfg = parse_config("").expect("parse");
    assert_eq!(cfg.settings, Settings::default());
    assert!(cfg.problems.is_empty());
  }

  #[test]
  fn partial_settings_and_bank_are_read() {
    let raw = r#"
      [settings]
      default_language = "Bangla"
      max_hints_per_session = 3
      translation_enabled = false

      [[problems]]
      title = "Vowel count"
      statement = "Count the vowels in a word"
    "#;
    let cfg = parse_config(raw).expect("parse");
    assert_eq!(cfg.settings.default_language, "Bangla");
    assert_eq!(cfg.settings.session_settings().max_hints, 3);
    assert!(!cfg.settings.session_settings().translation_enabled);
    assert_eq!(cfg.settings.default_hint_level, 3);
    assert_eq!(cfg.problems[0].title.as_deref(), Some("Vowel count"));
    assert!(cfg.problems[0].id.is_none());
  }

  #[test]
  fn validation_repairs_bad_values() {
    let raw = r#"
      [settings]
      default_hint_level = 9
      default_language = "Klingon"
      supported_languages = ["Spanish", ""]
    "#;
    let s = parse_config(raw).expect("parse").settings;
    assert_eq!(s.default_hint_level, 5);
    assert_eq!(s.default_language, "English");
    assert_eq!(s.supported_languages, vec!["English".to_string(), "Spanish".to_string()]);
    assert!(s.is_supported_language("Spanish"));
  }

  #[test]
  fn empty_language_list_falls_back_to_defaults() {
    let s = parse_config("[settings]\nsupported_languages = []").expect("parse").settings;
    assert_eq!(s.supported_languages, Settings::default().supported_languages);
  }

  #[test]
  fn bank_entry_without_statement_keeps_settings() {
    let raw = "[settings]\ndefault_language = \"Bangla\"\n[[problems]]\nid = \"x\"\ntitle = \"t\"\n";
    let cfg = parse_config(raw).expect("parse");
    assert_eq!(cfg.settings.default_language, "Bangla");
    assert_eq!(cfg.problems.len(), 1);
    assert!(cfg.problems[0].statement.is_empty());
  }

  #[test]
  fn streak_remark_needs_progress_tracking() {
    let s = Settings { progress_tracking_enabled: false, ..Settings::default() };
    assert!(!s.session_settings().streak_rewards_enabled);
    assert!(Settings::default().session_settings().streak_rewards_enabled);
  }

  #[test]
  fn malformed_toml_is_an_error() {
    assert!(parse_config("[settings\nfoo").is_err());
  }
}
