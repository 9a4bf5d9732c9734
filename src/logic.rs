//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Classifying statements and annotated source files
//!   - Opening a hint session for a user (claim + profile snapshot)
//!   - Finishing a session and flushing its outcome to the progress store
//!   - Profile views, preference updates, feedback and recommendations
//!   - Statement translation

use tracing::{debug, info, instrument, warn};

use crate::domain::ProblemContext;
use crate::protocol::{PreferencesIn, ProfileOut};
use crate::session::{HintSession, Learner, TutorReply};
use crate::state::{AppState, SessionClaim};
use crate::util::trunc_for_log;

#[instrument(level = "info", skip(state, statement), fields(statement_len = statement.len()))]
pub fn analyze(state: &AppState, statement: &str) -> ProblemContext {
  let ctx = state.classifier.classify(statement);
  debug!(target: "tutor", statement = %trunc_for_log(statement, 80), domain = %ctx.domain_tag, complexity = ctx.complexity_level, "Statement analyzed");
  ctx
}

#[instrument(level = "info", skip(state, content), fields(%file_name, content_len = content.len()))]
pub fn analyze_source(state: &AppState, file_name: &str, content: &str) -> ProblemContext {
  state.classifier.classify_source(file_name, content)
}

/// Catalog problem by id, or a fresh classification of a free-text statement.
pub fn resolve_problem(state: &AppState, problem_id: Option<&str>, statement: Option<&str>) -> Result<ProblemContext, String> {
  match (problem_id, statement) {
    (Some(id), _) => state
      .catalog
      .get(id)
      .map(|e| e.context.clone())
      .ok_or_else(|| format!("Unknown problemId: {}", id)),
    (None, Some(text)) => Ok(analyze(state, text)),
    (None, None) => Err("start_session needs a problemId or a statement".into()),
  }
}

/// Claim the user and build a session from a snapshot of their profile.
#[instrument(level = "info", skip(state, context), fields(domain = %context.domain_tag))]
pub async fn open_session(state: &AppState, user_id: &str, context: ProblemContext) -> Result<(HintSession, SessionClaim), String> {
  let claim = state
    .claim_session(user_id)
    .ok_or_else(|| format!("User {} already has an open session", user_id))?;
  let learner = {
    let mut store = state.progress.write().await;
    Learner::from(&*store.get_or_create(user_id))
  };
  Ok((state.engine.start(context, learner), claim))
}

/// Finish the session and record its outcome once. Returns the summary and whether
/// anything was written to the progress store.
#[instrument(level = "info", skip(state, session, _claim), fields(session_id = %session.session_id()))]
pub async fn close_session(state: &AppState, session: HintSession, _claim: SessionClaim, solved: bool) -> (TutorReply, bool) {
  let done = session.finish(solved);
  debug!(target: "tutor", session_id = %done.outcome.session_id, state = ?done.state, "Session closed");
  if !state.settings.progress_tracking_enabled {
    debug!(target: "tutor", session_id = %done.outcome.session_id, "Progress tracking disabled; outcome not recorded");
    return (done.summary, false);
  }
  let o = &done.outcome;
  state.progress.write().await.record_attempt(&o.user_id, o.domain, o.hints_used, o.solved);
  (done.summary, true)
}

#[instrument(level = "info", skip(state))]
pub async fn profile_view(state: &AppState, user_id: &str) -> ProfileOut {
  state.progress.read().await.with_profile(user_id, |p| ProfileOut::from(p))
}

#[instrument(level = "info", skip(state))]
pub async fn update_preferences(state: &AppState, user_id: &str, prefs: PreferencesIn) -> Result<ProfileOut, String> {
  if let Some(lang) = &prefs.preferred_language {
    if !state.settings.is_supported_language(lang) {
      warn!(target: "tutor", %user_id, language = %lang, "Rejected unsupported language");
      return Err(format!("Unsupported language: {}", lang));
    }
  }
  let mut store = state.progress.write().await;
  let profile = store.get_or_create(user_id);
  if let Some(lang) = &prefs.preferred_language {
    profile.set_preferred_language(lang);
  }
  if let Some(level) = prefs.hint_level {
    profile.set_hint_level(level);
  }
  if let Some(style) = &prefs.learning_style {
    profile.set_learning_style(style);
  }
  info!(target: "tutor", %user_id, language = %profile.preferred_language(), hint_level = profile.hint_level(), "Preferences updated");
  Ok(ProfileOut::from(&*profile))
}

#[instrument(level = "info", skip(state))]
pub async fn recommendations(state: &AppState, user_id: &str) -> Vec<String> {
  state.progress.read().await.recommendations(user_id)
}

/// Store hint feedback unless collection is switched off. Returns whether it was stored.
#[instrument(level = "info", skip(state, feedback), fields(feedback_len = feedback.len()))]
pub async fn record_feedback(state: &AppState, user_id: &str, hint_id: &str, usefulness: u8, feedback: &str) -> bool {
  if !state.settings.feedback_collection_enabled {
    debug!(target: "tutor", %user_id, %hint_id, "Feedback collection disabled");
    return false;
  }
  state.progress.write().await.record_hint_feedback(user_id, hint_id, usefulness, feedback);
  true
}

/// Statement phrases first (where a phrase table exists), then individual terms.
#[instrument(level = "info", skip(state, text), fields(text_len = text.len(), %language))]
pub fn translate_text(state: &AppState, text: &str, language: &str) -> String {
  if !state.settings.translation_enabled {
    return text.to_string();
  }
  let phrased = state.translator.translate_problem_pattern(text, language);
  state.translator.translate(&phrased, language)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::{Settings, TutorConfig};
  use crate::domain::DomainTag;

  fn state_with(settings: Settings) -> AppState {
    AppState::from_config(TutorConfig { settings, problems: vec![] }, None)
  }

  #[tokio::test]
  async fn finished_session_is_recorded_once() {
    let state = state_with(Settings::default());
    let ctx = resolve_problem(&state, Some("p101"), None).expect("seed problem");
    let (mut session, claim) = open_session(&state, "ana", ctx).await.expect("open");
    session.request_hint();
    session.request_hint();
    session.request_hint();
    let (summary, recorded) = close_session(&state, session, claim, false).await;
    assert!(recorded);
    assert!(summary.text.contains("Hints used: 3"));

    let view = profile_view(&state, "ana").await;
    assert_eq!(view.problems_attempted, 1);
    assert_eq!(view.hints_used_history, vec![3]);
    assert_eq!(view.topic_experience.get(&DomainTag::Array), Some(&1));
    assert_eq!(state.active_session_count(), 0);
  }

  #[tokio::test]
  async fn dropped_session_leaves_profile_untouched() {
    let state = state_with(Settings::default());
    let ctx = resolve_problem(&state, None, Some("Reverse a string")).expect("ctx");
    {
      let (mut session, _claim) = open_session(&state, "ben", ctx).await.expect("open");
      session.request_hint();
    }
    assert_eq!(profile_view(&state, "ben").await.problems_attempted, 0);
    assert_eq!(state.active_session_count(), 0);
  }

  #[tokio::test]
  async fn second_session_for_same_user_is_refused() {
    let state = state_with(Settings::default());
    let ctx = resolve_problem(&state, Some("p103"), None).expect("ctx");
    let _first = open_session(&state, "cy", ctx.clone()).await.expect("open");
    assert!(open_session(&state, "cy", ctx).await.is_err());
  }

  #[tokio::test]
  async fn tracking_and_feedback_toggles_are_honoured() {
    let settings = Settings { progress_tracking_enabled: false, feedback_collection_enabled: false, ..Settings::default() };
    let state = state_with(settings);
    let ctx = resolve_problem(&state, Some("p104"), None).expect("ctx");
    let (session, claim) = open_session(&state, "di", ctx).await.expect("open");
    let (summary, recorded) = close_session(&state, session, claim, true).await;
    assert!(!recorded);
    assert!(!summary.text.contains("streak"));
    assert!(!record_feedback(&state, "di", "conditional:1", 4, "ok").await);
    let view = profile_view(&state, "di").await;
    assert_eq!(view.problems_attempted, 0);
    assert!(view.hint_feedback.is_empty());
  }

  #[tokio::test]
  async fn preferences_validate_language() {
    let state = state_with(Settings::default());
    let bad = PreferencesIn { preferred_language: Some("Klingon".into()), hint_level: None, learning_style: None };
    assert!(update_preferences(&state, "ed", bad).await.is_err());
    let good = PreferencesIn { preferred_language: Some("Bangla".into()), hint_level: Some(7), learning_style: None };
    let view = update_preferences(&state, "ed", good).await.expect("ok");
    assert_eq!(view.preferred_language, "Bangla");
    assert_eq!(view.hint_level, 5);
  }

  #[test]
  fn resolve_problem_reports_missing_input() {
    let state = state_with(Settings::default());
    assert!(resolve_problem(&state, None, None).is_err());
    assert!(resolve_problem(&state, Some("nope"), None).is_err());
    assert_eq!(resolve_problem(&state, None, Some("")).map(|c| c.domain_tag), Ok(DomainTag::General));
  }

  #[test]
  fn bangla_translation_uses_phrases_then_terms() {
    let state = state_with(Settings::default());
    let out = translate_text(&state, "Find the sum of the array", "Bangla");
    assert!(out.starts_with("যোগফল বের করুন"), "{out}");
    assert!(out.contains("অ্যারে"));
    assert_eq!(translate_text(&state, "Find the sum", "English"), "Find the sum");
  }
}
