//! Per-user learning history: profiles, attempt recording, hint feedback and
//! personalised recommendations.
//!
//! Every lookup is lazy: an unknown user id gets a fresh profile built from the
//! configured defaults, so none of these operations can fail on missing data.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::domain::DomainTag;

pub const MIN_HINT_LEVEL: u8 = 1;
pub const MAX_HINT_LEVEL: u8 = 5;
const FAVORITE_TOPICS: usize = 3;
const HIGH_AVERAGE_HINTS: f64 = 4.0;
const LONG_STREAK: u32 = 5;

/// Initial values for newly created profiles.
#[derive(Clone, Debug)]
pub struct ProfileDefaults {
  pub language: String,
  pub hint_level: u8,
  pub learning_style: String,
}

impl Default for ProfileDefaults {
  fn default() -> Self {
    Self { language: "English".into(), hint_level: 3, learning_style: "balanced".into() }
  }
}

/// Adaptive hint-level policy.
#[derive(Clone, Copy, Debug)]
pub struct Adaptation {
  pub enabled: bool,
  /// Attempts required before the hint level starts moving.
  pub threshold: u32,
}

impl Default for Adaptation {
  fn default() -> Self { Self { enabled: true, threshold: 3 } }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HintFeedback {
  pub usefulness: u8, // 1-5
  pub feedback: String,
  pub recorded_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct UserProfile {
  user_id: String,
  preferred_language: String,
  hint_level: u8,
  learning_style: String,
  problems_attempted: u32,
  problems_solved: u32,
  hints_used_history: Vec<u32>,
  learning_streak: u32,
  // first-seen order; ties in the derived rankings resolve by position
  topic_experience: Vec<(DomainTag, u32)>,
  favorite_topics: Vec<DomainTag>,
  hint_feedback: BTreeMap<String, HintFeedback>,
  joined_at: DateTime<Utc>,
  last_active: DateTime<Utc>,
}

impl UserProfile {
  pub fn new(user_id: &str, defaults: &ProfileDefaults) -> Self {
    let now = Utc::now();
    Self {
      user_id: user_id.to_string(),
      preferred_language: defaults.language.clone(),
      hint_level: defaults.hint_level.clamp(MIN_HINT_LEVEL, MAX_HINT_LEVEL),
      learning_style: defaults.learning_style.clone(),
      problems_attempted: 0,
      problems_solved: 0,
      hints_used_history: Vec::new(),
      learning_streak: 0,
      topic_experience: Vec::new(),
      favorite_topics: Vec::new(),
      hint_feedback: BTreeMap::new(),
      joined_at: now,
      last_active: now,
    }
  }

  pub fn user_id(&self) -> &str { &self.user_id }
  pub fn preferred_language(&self) -> &str { &self.preferred_language }
  pub fn hint_level(&self) -> u8 { self.hint_level }
  pub fn learning_style(&self) -> &str { &self.learning_style }
  pub fn problems_attempted(&self) -> u32 { self.problems_attempted }
  pub fn problems_solved(&self) -> u32 { self.problems_solved }
  pub fn hints_used_history(&self) -> &[u32] { &self.hints_used_history }
  pub fn learning_streak(&self) -> u32 { self.learning_streak }
  pub fn topic_experience(&self) -> &[(DomainTag, u32)] { &self.topic_experience }
  pub fn favorite_topics(&self) -> &[DomainTag] { &self.favorite_topics }
  pub fn hint_feedback(&self) -> &BTreeMap<String, HintFeedback> { &self.hint_feedback }
  pub fn joined_at(&self) -> DateTime<Utc> { self.joined_at }
  pub fn last_active(&self) -> DateTime<Utc> { self.last_active }

  pub fn set_preferred_language(&mut self, language: &str) {
    self.preferred_language = language.to_string();
  }

  /// Clamped to `1..=5`.
  pub fn set_hint_level(&mut self, level: u8) {
    self.hint_level = level.clamp(MIN_HINT_LEVEL, MAX_HINT_LEVEL);
  }

  pub fn set_learning_style(&mut self, style: &str) {
    self.learning_style = style.to_string();
  }

  /// 0.0 when nothing has been recorded yet.
  pub fn average_hints_used(&self) -> f64 {
    if self.hints_used_history.is_empty() {
      return 0.0;
    }
    let total: u64 = self.hints_used_history.iter().map(|h| *h as u64).sum();
    total as f64 / self.hints_used_history.len() as f64
  }

  /// `solved / attempted`, 0.0 with no attempts.
  pub fn solve_rate(&self) -> f64 {
    if self.problems_attempted == 0 {
      return 0.0;
    }
    self.problems_solved as f64 / self.problems_attempted as f64
  }

  /// Active within the last 24 hours of `now`.
  pub fn is_active_user(&self, now: DateTime<Utc>) -> bool {
    self.last_active > now - Duration::hours(24)
  }

  fn record_attempt(&mut self, domain: DomainTag, hints_used: u32, solved: bool) {
    self.problems_attempted += 1;
    self.hints_used_history.push(hints_used);
    if solved {
      self.problems_solved += 1;
      self.learning_streak += 1;
    } else {
      self.learning_streak = 0;
    }
    self.bump_topic(domain);
    self.last_active = Utc::now();
  }

  fn bump_topic(&mut self, domain: DomainTag) {
    match self.topic_experience.iter_mut().find(|(t, _)| *t == domain) {
      Some((_, count)) => *count += 1,
      None => self.topic_experience.push((domain, 1)),
    }
    let mut ranked = self.topic_experience.clone();
    // stable: equal counts keep first-seen order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    self.favorite_topics = ranked.into_iter().take(FAVORITE_TOPICS).map(|(t, _)| t).collect();
  }

  /// Least-practised topic, first-seen on ties.
  pub fn least_practiced_topic(&self) -> Option<DomainTag> {
    let mut least: Option<(DomainTag, u32)> = None;
    for (tag, count) in &self.topic_experience {
      if least.map_or(true, |(_, c)| *count < c) {
        least = Some((*tag, *count));
      }
    }
    least.map(|(t, _)| t)
  }

  fn adapt_hint_level(&mut self, policy: Adaptation) {
    if !policy.enabled || self.problems_attempted < policy.threshold {
      return;
    }
    let rate = self.solve_rate();
    if rate >= 0.8 && self.average_hints_used() <= 2.0 {
      self.hint_level = self.hint_level.saturating_sub(1).max(MIN_HINT_LEVEL);
    } else if rate < 0.4 {
      self.hint_level = (self.hint_level + 1).min(MAX_HINT_LEVEL);
    }
  }
}

/// Owns every known profile, keyed by user id.
#[derive(Debug, Default)]
pub struct UserProgressStore {
  profiles: HashMap<String, UserProfile>,
  defaults: ProfileDefaults,
  adaptation: Adaptation,
}

impl UserProgressStore {
  pub fn new(defaults: ProfileDefaults, adaptation: Adaptation) -> Self {
    Self { profiles: HashMap::new(), defaults, adaptation }
  }

  /// Idempotent: the first call creates the profile, later calls return the same one.
  pub fn get_or_create(&mut self, user_id: &str) -> &mut UserProfile {
    let defaults = &self.defaults;
    self.profiles.entry(user_id.to_string()).or_insert_with(|| {
      debug!(target: "tutor", %user_id, "Creating user profile");
      UserProfile::new(user_id, defaults)
    })
  }

  pub fn len(&self) -> usize { self.profiles.len() }

  /// Runs `f` on the stored profile, or on an unsaved default one for an unknown user.
  pub fn with_profile<R>(&self, user_id: &str, f: impl FnOnce(&UserProfile) -> R) -> R {
    match self.profiles.get(user_id) {
      Some(profile) => f(profile),
      None => f(&UserProfile::new(user_id, &self.defaults)),
    }
  }

  #[instrument(level = "info", skip(self))]
  pub fn record_attempt(&mut self, user_id: &str, domain: DomainTag, hints_used: u32, solved: bool) -> &UserProfile {
    let adaptation = self.adaptation;
    let profile = self.get_or_create(user_id);
    let before = profile.hint_level;
    profile.record_attempt(domain, hints_used, solved);
    profile.adapt_hint_level(adaptation);
    info!(
      target: "tutor",
      %user_id,
      attempted = profile.problems_attempted,
      solved = profile.problems_solved,
      streak = profile.learning_streak,
      hint_level_before = before,
      hint_level = profile.hint_level,
      "Attempt recorded"
    );
    profile
  }

  /// Upsert feedback for one hint id. Usefulness is clamped to `1..=5`.
  #[instrument(level = "info", skip(self, feedback), fields(feedback_len = feedback.len()))]
  pub fn record_hint_feedback(&mut self, user_id: &str, hint_id: &str, usefulness: u8, feedback: &str) {
    let profile = self.get_or_create(user_id);
    let now = Utc::now();
    profile.hint_feedback.insert(
      hint_id.to_string(),
      HintFeedback { usefulness: usefulness.clamp(1, 5), feedback: feedback.to_string(), recorded_at: now },
    );
    profile.last_active = now;
  }

  /// Short ordered list of suggestions derived from the profile.
  pub fn recommendations(&self, user_id: &str) -> Vec<String> {
    self.with_profile(user_id, recommendations_for)
  }
}

fn recommendations_for(profile: &UserProfile) -> Vec<String> {
  let mut out = Vec::new();

  if profile.average_hints_used() > HIGH_AVERAGE_HINTS {
    out.push("Try working through problems step-by-step before asking for hints".to_string());
    out.push("Practice with simpler problems to build confidence".to_string());
  }
  if profile.learning_streak > LONG_STREAK {
    out.push("Great streak! Challenge yourself with harder problems".to_string());
  }
  let topic = profile.least_practiced_topic().unwrap_or(DomainTag::Array);
  out.push(format!("Consider practicing more {} problems", topic));
  out
}
