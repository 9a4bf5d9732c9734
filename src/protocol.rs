//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainTag, ProblemContext, ProblemEntry, ProblemSource};
use crate::progress::{HintFeedback, UserProfile};
use crate::session::TutorReply;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    StartSession {
        #[serde(rename = "userId")]
        user_id: String,
        #[serde(default, rename = "problemId")]
        problem_id: Option<String>,
        #[serde(default)]
        statement: Option<String>,
    },
    Hint,
    Approach {
        text: String,
    },
    Question {
        text: String,
    },
    Analogy,
    Finish {
        #[serde(default)]
        solved: bool,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    SessionStarted {
        #[serde(rename = "sessionId")]
        session_id: String,
        context: ProblemContext,
        intro: String,
    },
    Tutor {
        reply: TutorReply,
    },
    SessionFinished {
        summary: TutorReply,
        recorded: bool,
    },
    Error {
        message: String,
    },
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct ClassifyIn {
    pub statement: String,
}

#[derive(Debug, Deserialize)]
pub struct ClassifySourceIn {
    #[serde(rename = "fileName")]
    pub file_name: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemSummaryOut {
    pub id: String,
    pub title: String,
    pub source: ProblemSource,
    pub domain_tag: DomainTag,
    pub complexity_level: u8,
}

impl From<&ProblemEntry> for ProblemSummaryOut {
    fn from(e: &ProblemEntry) -> Self {
        Self {
            id: e.id.clone(),
            title: e.title.clone(),
            source: e.source.clone(),
            domain_tag: e.context.domain_tag,
            complexity_level: e.context.complexity_level,
        }
    }
}

#[derive(Deserialize)]
pub struct TranslateIn {
    pub text: String,
    pub language: String,
}
#[derive(Serialize)]
pub struct TranslateOut {
    pub translation: String,
}

#[derive(Serialize)]
pub struct LanguagesOut {
    pub supported: Vec<String>,
    pub translatable: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileOut {
    pub user_id: String,
    pub preferred_language: String,
    pub hint_level: u8,
    pub learning_style: String,
    pub problems_attempted: u32,
    pub problems_solved: u32,
    pub solve_rate: f64,
    pub average_hints_used: f64,
    pub hints_used_history: Vec<u32>,
    pub learning_streak: u32,
    pub favorite_topics: Vec<DomainTag>,
    pub topic_experience: BTreeMap<DomainTag, u32>,
    pub hint_feedback: BTreeMap<String, HintFeedback>,
    pub joined_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub active: bool,
}

impl From<&UserProfile> for ProfileOut {
    fn from(p: &UserProfile) -> Self {
        Self {
            user_id: p.user_id().to_string(),
            preferred_language: p.preferred_language().to_string(),
            hint_level: p.hint_level(),
            learning_style: p.learning_style().to_string(),
            problems_attempted: p.problems_attempted(),
            problems_solved: p.problems_solved(),
            solve_rate: p.solve_rate(),
            average_hints_used: p.average_hints_used(),
            hints_used_history: p.hints_used_history().to_vec(),
            learning_streak: p.learning_streak(),
            favorite_topics: p.favorite_topics().to_vec(),
            topic_experience: p.topic_experience().iter().copied().collect(),
            hint_feedback: p.hint_feedback().clone(),
            joined_at: p.joined_at(),
            last_active: p.last_active(),
            active: p.is_active_user(Utc::now()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesIn {
    #[serde(default)]
    pub preferred_language: Option<String>,
    #[serde(default)]
    pub hint_level: Option<u8>,
    #[serde(default)]
    pub learning_style: Option<String>,
}

#[derive(Serialize)]
pub struct RecommendationsOut {
    pub recommendations: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackIn {
    pub hint_id: String,
    pub usefulness: u8,
    #[serde(default)]
    pub feedback: String,
}
#[derive(Serialize)]
pub struct FeedbackOut {
    pub recorded: bool,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub problems: usize,
    #[serde(rename = "activeSessions")]
    pub active_sessions: usize,
    pub learners: usize,
}
