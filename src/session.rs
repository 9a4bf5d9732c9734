//! Hint escalation sessions.
//!
//! A `HintSession` walks one problem's hint ladder for one learner. The ladder position
//! only ever moves forward, one rung per hint request, and stops at the end of the ladder;
//! further requests repeat the closing remark. Approach/question/analogy branches never
//! touch the ladder.
//!
//! The session does not write to the progress store. `finish` consumes it and hands back
//! a `SessionOutcome` for the caller to record exactly once; a session that is dropped
//! without finishing leaves the learner's profile untouched.

use chrono::{DateTime, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::domain::{DomainTag, Insight, InsightValue, ProblemContext};
use crate::progress::UserProfile;
use crate::tables::Tables;
use crate::translate::{TermTranslator, DEFAULT_LANGUAGE};
use crate::util::difficulty_stars;

const REFLECT_PROMPT: &str = "Take some time to consider this question before asking for more help.";
const APPROACH_INTRO: &str = "Interesting approach! Let me ask you some questions:";
const QUESTION_INTRO: &str = "Let me help you think through that:";

const START_GUIDANCE: &str = "Great question! Think about:\n\
  - What data do you have available?\n\
  - What is the desired end result?\n\
  - What's the simplest case you could handle first?";
const LOGIC_GUIDANCE: &str = "For the logic, consider:\n\
  - Can you solve this manually with a small example?\n\
  - What steps did your mind take?\n\
  - Which of those steps could be repeated/automated?";

const SUMMARY_REMINDER: &str = "Remember: Every hint was designed to make you think, not to give answers!";
const ENCOURAGEMENT: &str = "The real learning happens when you struggle with the concepts. \
Keep practicing! Each problem makes you a stronger problem solver.";

/// Engine-wide knobs, read once from configuration.
#[derive(Clone, Copy, Debug)]
pub struct SessionSettings {
    pub max_hints: usize,
    pub translation_enabled: bool,
    pub encouragement_enabled: bool,
    pub streak_rewards_enabled: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self { max_hints: 10, translation_enabled: true, encouragement_enabled: true, streak_rewards_enabled: true }
    }
}

/// Read-only view of the learner taken when the session starts.
#[derive(Clone, Debug)]
pub struct Learner {
    pub user_id: String,
    pub language: String,
    pub hint_level: u8,
    pub learning_style: String,
    pub learning_streak: u32,
}

impl From<&UserProfile> for Learner {
    fn from(p: &UserProfile) -> Self {
        Self {
            user_id: p.user_id().to_string(),
            language: p.preferred_language().to_string(),
            hint_level: p.hint_level(),
            learning_style: p.learning_style().to_string(),
            learning_streak: p.learning_streak(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Active { hint_level: usize },
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    Hint,
    Exhausted,
    Socratic,
    Guidance,
    Analogy,
    Summary,
}

/// One tutor message.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorReply {
    pub kind: ReplyKind,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint_id: Option<String>,
    pub hint_level: usize,
}

/// What a finished session contributes to the learner's history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionOutcome {
    pub session_id: String,
    pub user_id: String,
    pub domain: DomainTag,
    pub hints_used: u32,
    pub solved: bool,
}

/// Shared, immutable dependencies for building sessions.
#[derive(Clone, Copy)]
pub struct HintEngine {
    tables: &'static Tables,
    translator: TermTranslator,
    settings: SessionSettings,
}

impl HintEngine {
    pub fn new(tables: &'static Tables, translator: TermTranslator, settings: SessionSettings) -> Self {
        Self { tables, translator, settings }
    }

    pub fn start(&self, context: ProblemContext, learner: Learner) -> HintSession {
        self.start_with_rng(context, learner, StdRng::from_entropy())
    }

    /// Same as `start` with a caller-supplied random source for filler selection.
    pub fn start_with_rng(&self, context: ProblemContext, learner: Learner, rng: StdRng) -> HintSession {
        let full = self.tables.ladder_for(context.domain_tag);
        let ladder = &full[..full.len().min(self.settings.max_hints)];
        let session = HintSession {
            session_id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            context,
            learner,
            ladder,
            level: 0,
            engine: *self,
            rng,
        };
        info!(target: "tutor", session_id = %session.session_id, user_id = %session.learner.user_id, domain = %session.context.domain_tag, ladder_len = ladder.len(), "Hint session started");
        session
    }
}

pub struct HintSession {
    session_id: String,
    started_at: DateTime<Utc>,
    context: ProblemContext,
    learner: Learner,
    ladder: &'static [&'static str],
    level: usize,
    engine: HintEngine,
    rng: StdRng,
}

/// Returned by `HintSession::finish`.
#[derive(Clone, Debug)]
pub struct FinishedSession {
    pub state: SessionState,
    pub summary: TutorReply,
    pub outcome: SessionOutcome,
}

impl HintSession {
    pub fn session_id(&self) -> &str { &self.session_id }
    pub fn started_at(&self) -> DateTime<Utc> { self.started_at }
    pub fn context(&self) -> &ProblemContext { &self.context }
    pub fn learner(&self) -> &Learner { &self.learner }
    pub fn hint_level(&self) -> usize { self.level }
    pub fn ladder_len(&self) -> usize { self.ladder.len() }

    pub fn state(&self) -> SessionState {
        SessionState::Active { hint_level: self.level }
    }

    /// Opening message: analysis summary plus the learner's hint level.
    pub fn intro(&self) -> String {
        let c = &self.context;
        let mut intro = format!(
            "Problem analysis\n  Category: {}\n  Difficulty: {} ({}/5)\n  Suggested approaches: {}\n  Your hint level: {}/5 ({} learner)\n\
I'll help you think through this problem with guiding questions. Remember: the goal is to develop your problem-solving skills!",
            c.domain_tag,
            difficulty_stars(c.complexity_level),
            c.complexity_level,
            c.suggested_approaches.join(", "),
            self.learner.hint_level,
            self.learner.learning_style,
        );
        if let Some(InsightValue::Text(file)) = c.insight(Insight::SourceFile) {
            intro.push_str(&format!("\n  Reference solution on file: {}", file));
        }
        intro
    }

    /// Next rung of the ladder, or the closing remark once the ladder is used up.
    #[instrument(level = "debug", skip(self), fields(session_id = %self.session_id, level = self.level))]
    pub fn request_hint(&mut self) -> TutorReply {
        let Some(hint) = self.ladder.get(self.level) else {
            debug!(target: "tutor", session_id = %self.session_id, "Hint ladder exhausted");
            return self.reply(ReplyKind::Exhausted, self.engine.tables.exhaustion.to_string(), None, None);
        };
        let text = self.localize(hint);
        self.level += 1;
        let hint_id = format!("{}:{}", self.context.domain_tag, self.level);
        info!(target: "tutor", session_id = %self.session_id, %hint_id, "Hint served");
        self.reply(ReplyKind::Hint, text, Some(REFLECT_PROMPT.to_string()), Some(hint_id))
    }

    /// Socratic follow-ups keyed on what the learner says they're doing.
    pub fn share_approach(&mut self, approach: &str) -> TutorReply {
        let lower = approach.to_lowercase();
        let mut lines = Vec::new();
        if lower.contains("loop") {
            lines.push("You mentioned loops. What will you be counting or tracking in each iteration?");
        }
        if lower.contains("array") {
            lines.push("With arrays, think about: Do you need to compare elements? Track positions? Store values?");
        }
        if lower.contains("condition") {
            lines.push("For conditions, consider: What makes a case true vs false? Any edge cases?");
        }
        let body = if lines.is_empty() {
            self.pick(self.engine.tables.approach_followups).to_string()
        } else {
            lines.join("\n")
        };
        self.reply(
            ReplyKind::Socratic,
            format!("{}\n{}", APPROACH_INTRO, body),
            Some("Does this help clarify your thinking? What seems most challenging?".to_string()),
            None,
        )
    }

    /// Conceptual guidance for a specific question; never an answer.
    pub fn ask_question(&mut self, question: &str) -> TutorReply {
        let lower = question.to_lowercase();
        let mut blocks = Vec::new();
        if lower.contains("how to start") || lower.contains("beginning") {
            blocks.push(START_GUIDANCE);
        }
        if lower.contains("algorithm") || lower.contains("logic") {
            blocks.push(LOGIC_GUIDANCE);
        }
        let body = if blocks.is_empty() {
            self.pick(self.engine.tables.question_followups).to_string()
        } else {
            blocks.join("\n")
        };
        self.reply(ReplyKind::Guidance, format!("{}\n{}", QUESTION_INTRO, body), None, None)
    }

    pub fn request_analogy(&self) -> TutorReply {
        let text = self.engine.tables.analogy_for(self.context.domain_tag);
        self.reply(ReplyKind::Analogy, format!("Here's an analogy to help you think about this: {}", text), None, None)
    }

    /// End the session. Consumes it; the outcome must be recorded by the caller.
    #[instrument(level = "info", skip(self), fields(session_id = %self.session_id))]
    pub fn finish(self, solved: bool) -> FinishedSession {
        let hints_used = self.level as u32;
        let mut text = format!("Session complete. Hints used: {}\n{}", hints_used, SUMMARY_REMINDER);
        let settings = self.engine.settings;
        if settings.encouragement_enabled {
            text.push('\n');
            text.push_str(ENCOURAGEMENT);
        }
        if settings.streak_rewards_enabled && solved {
            text.push_str(&format!("\nThat makes a streak of {} solved in a row!", self.learner.learning_streak + 1));
        }
        let summary = self.reply(ReplyKind::Summary, text, None, None);
        info!(target: "tutor", session_id = %self.session_id, hints_used, solved, "Hint session finished");

        FinishedSession {
            state: SessionState::Finished,
            summary,
            outcome: SessionOutcome {
                session_id: self.session_id,
                user_id: self.learner.user_id,
                domain: self.context.domain_tag,
                hints_used,
                solved,
            },
        }
    }

    fn localize(&self, text: &str) -> String {
        let lang = self.learner.language.as_str();
        if self.engine.settings.translation_enabled && lang != DEFAULT_LANGUAGE {
            self.engine.translator.translate(text, lang)
        } else {
            text.to_string()
        }
    }

    fn pick(&mut self, templates: &'static [&'static str]) -> &'static str {
        match templates.len() {
            0 => "What have you tried so far?",
            n => templates[self.rng.gen_range(0..n)],
        }
    }

    fn reply(&self, kind: ReplyKind, text: String, follow_up: Option<String>, hint_id: Option<String>) -> TutorReply {
        TutorReply { kind, text, follow_up, hint_id, hint_level: self.level }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ProblemClassifier;

    fn engine(settings: SessionSettings) -> HintEngine {
        HintEngine::new(Tables::builtin(), TermTranslator::builtin(), settings)
    }

    fn learner(language: &str) -> Learner {
        Learner {
            user_id: "u1".into(),
            language: language.into(),
            hint_level: 3,
            learning_style: "balanced".into(),
            learning_streak: 0,
        }
    }

    fn session_for(statement: &str, language: &str) -> HintSession {
        let ctx = ProblemClassifier::new(Tables::builtin()).classify(statement);
        engine(SessionSettings::default()).start_with_rng(ctx, learner(language), StdRng::seed_from_u64(7))
    }

    #[test]
    fn six_hints_walk_the_ladder_then_repeat_closing_remark() {
        let mut s = session_for("Find the sum of all elements in the array", "English");
        let ladder = Tables::builtin().ladder_for(DomainTag::Array);
        for (i, expected) in ladder.iter().enumerate() {
            let r = s.request_hint();
            assert_eq!(r.kind, ReplyKind::Hint);
            assert_eq!(r.text, *expected);
            assert_eq!(r.hint_id.as_deref(), Some(format!("array:{}", i + 1).as_str()));
        }
        let sixth = s.request_hint();
        assert_eq!(sixth.kind, ReplyKind::Exhausted);
        assert_eq!(sixth.text, Tables::builtin().exhaustion);
        assert_eq!(s.hint_level(), 5);
        for _ in 0..10 {
            assert_eq!(s.request_hint(), sixth);
        }
        assert_eq!(s.state(), SessionState::Active { hint_level: 5 });
    }

    #[test]
    fn side_branches_do_not_advance_the_ladder() {
        let mut s = session_for("Find the sum of all elements in the array", "English");
        s.request_hint();
        s.share_approach("I'd use a loop");
        s.ask_question("how to start?");
        s.request_analogy();
        assert_eq!(s.hint_level(), 1);
    }

    #[test]
    fn approach_triggers_each_add_a_follow_up() {
        let mut s = session_for("Say hello", "English");
        let r = s.share_approach("A LOOP over the array");
        assert!(r.text.contains("You mentioned loops"));
        assert!(r.text.contains("With arrays"));
        assert!(!r.text.contains("For conditions"));
        assert_eq!(r.kind, ReplyKind::Socratic);
    }

    #[test]
    fn generic_filler_is_deterministic_for_a_fixed_seed() {
        let mut a = session_for("Say hello", "English");
        let mut b = session_for("Say hello", "English");
        for _ in 0..5 {
            assert_eq!(a.share_approach("no idea"), b.share_approach("no idea"));
            assert_eq!(a.ask_question("why?"), b.ask_question("why?"));
        }
        let q = a.ask_question("hmm");
        assert!(q.text.contains("What have you tried so far"), "{}", q.text);
    }

    #[test]
    fn question_triggers_pick_guidance() {
        let mut s = session_for("Say hello", "English");
        assert!(s.ask_question("Where is the beginning?").text.contains("simplest case"));
        assert!(s.ask_question("the algorithm confuses me").text.contains("small example"));
    }

    #[test]
    fn analogy_falls_back_to_detective() {
        let s = session_for("Say hello", "English");
        assert!(s.request_analogy().text.contains("detective"));
        let s = session_for("reverse the string", "English");
        assert!(s.request_analogy().text.contains("book page by page"));
    }

    #[test]
    fn hints_are_translated_for_registered_languages() {
        let mut s = session_for("Find the sum of all elements in the array", "Spanish");
        let r = s.request_hint();
        assert!(r.text.contains("arreglo"), "{}", r.text);

        let ctx = ProblemClassifier::new(Tables::builtin()).classify("Find the sum of all elements in the array");
        let off = SessionSettings { translation_enabled: false, ..SessionSettings::default() };
        let mut s = engine(off).start_with_rng(ctx, learner("Spanish"), StdRng::seed_from_u64(1));
        assert!(s.request_hint().text.contains("array"));
    }

    #[test]
    fn max_hints_caps_the_ladder() {
        let ctx = ProblemClassifier::new(Tables::builtin()).classify("palindrome");
        let capped = SessionSettings { max_hints: 2, ..SessionSettings::default() };
        let mut s = engine(capped).start_with_rng(ctx, learner("English"), StdRng::seed_from_u64(1));
        assert_eq!(s.request_hint().kind, ReplyKind::Hint);
        assert_eq!(s.request_hint().kind, ReplyKind::Hint);
        assert_eq!(s.request_hint().kind, ReplyKind::Exhausted);
        assert_eq!(s.hint_level(), 2);
    }

    #[test]
    fn finish_reports_hints_consumed() {
        let mut s = session_for("is it even or odd", "English");
        s.request_hint();
        s.request_hint();
        let id = s.session_id().to_string();
        let done = s.finish(true);
        assert_eq!(done.state, SessionState::Finished);
        assert_eq!(done.summary.kind, ReplyKind::Summary);
        assert!(done.summary.text.contains("Hints used: 2"));
        assert!(done.summary.text.contains("streak of 1"));
        assert_eq!(
            done.outcome,
            SessionOutcome { session_id: id, user_id: "u1".into(), domain: DomainTag::Conditional, hints_used: 2, solved: true }
        );
    }

    #[test]
    fn intro_shows_difficulty_and_hint_level() {
        let s = session_for("Find the sum of all elements in the array", "English");
        let intro = s.intro();
        assert!(intro.contains("Category: array"));
        assert!(intro.contains("★☆☆☆☆ (1/5)"));
        assert!(intro.contains("Your hint level: 3/5 (balanced learner)"));
    }
}
