//! Application state: static tables, classifier, hint engine, problem catalog,
//! progress store and the set of users with an open session.
//!
//! The catalog and engines are immutable after startup. The progress store sits
//! behind an async RwLock; hint sessions are not stored here at all, they live in
//! the WebSocket task that owns them.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::catalog::ProblemCatalog;
use crate::classifier::ProblemClassifier;
use crate::config::{load_tutor_config_from_env, Settings, TutorConfig};
use crate::progress::UserProgressStore;
use crate::session::HintEngine;
use crate::tables::Tables;
use crate::translate::TermTranslator;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub classifier: ProblemClassifier,
    pub translator: TermTranslator,
    pub engine: HintEngine,
    pub catalog: Arc<ProblemCatalog>,
    pub progress: Arc<RwLock<UserProgressStore>>,
    active_sessions: Arc<Mutex<HashSet<String>>>,
}

impl AppState {
    /// Build state from env: TUTOR_CONFIG_PATH for settings/bank, PROBLEMS_DIR for source files.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_tutor_config_from_env().unwrap_or_default();
        let problems_dir = std::env::var("PROBLEMS_DIR").ok().map(PathBuf::from);
        Self::from_config(cfg, problems_dir)
    }

    pub fn from_config(cfg: TutorConfig, problems_dir: Option<PathBuf>) -> Self {
        let settings = cfg.settings.validated();
        let tables = Tables::builtin();
        let classifier = ProblemClassifier::new(tables);
        let translator = TermTranslator::builtin();
        let engine = HintEngine::new(tables, translator, settings.session_settings());

        for lang in &settings.supported_languages {
            if !translator.is_registered(lang) {
                warn!(target: "hintladder_backend", language = %lang, "Supported language has no term table; hints stay in English");
            }
        }

        let catalog = ProblemCatalog::build(&classifier, &cfg.problems, problems_dir.as_deref());
        info!(
            target: "hintladder_backend",
            problems = catalog.len(),
            default_language = %settings.default_language,
            progress_tracking = settings.progress_tracking_enabled,
            "Tutor state ready"
        );

        let progress = UserProgressStore::new(settings.profile_defaults(), settings.adaptation());
        Self {
            settings: Arc::new(settings),
            classifier,
            translator,
            engine,
            catalog: Arc::new(catalog),
            progress: Arc::new(RwLock::new(progress)),
            active_sessions: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Reserve `user_id` for one session. `None` if that user already has one open.
    pub fn claim_session(&self, user_id: &str) -> Option<SessionClaim> {
        let mut active = self.active_sessions.lock().unwrap_or_else(|p| p.into_inner());
        if !active.insert(user_id.to_string()) {
            return None;
        }
        Some(SessionClaim { user_id: user_id.to_string(), active: self.active_sessions.clone() })
    }

    pub fn active_session_count(&self) -> usize {
        self.active_sessions.lock().map(|a| a.len()).unwrap_or(0)
    }
}

/// Exclusive hold on a user's profile for the life of one session. Released on drop.
pub struct SessionClaim {
    user_id: String,
    active: Arc<Mutex<HashSet<String>>>,
}

impl Drop for SessionClaim {
    fn drop(&mut self) {
        let mut active = self.active.lock().unwrap_or_else(|p| p.into_inner());
        active.remove(&self.user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_session_per_user_until_released() {
        let state = AppState::from_config(TutorConfig::default(), None);
        let claim = state.claim_session("ana").expect("first claim");
        assert!(state.claim_session("ana").is_none());
        assert!(state.claim_session("ben").is_some());
        assert_eq!(state.active_session_count(), 1);
        drop(claim);
        assert!(state.claim_session("ana").is_some());
    }
}
