//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs its parameters and basic result info.

use std::sync::Arc;
use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument, warn};

use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;
use crate::util::normalize_user_id;

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
  (status, Json(ErrorOut { error: message.into() })).into_response()
}

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut {
    ok: true,
    problems: state.catalog.len(),
    active_sessions: state.active_session_count(),
    learners: state.progress.read().await.len(),
  })
}

#[instrument(level = "info", skip(state, body), fields(statement_len = body.statement.len()))]
pub async fn http_post_classify(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ClassifyIn>,
) -> impl IntoResponse {
  let ctx = analyze(&state, &body.statement);
  info!(target: "tutor", domain = %ctx.domain_tag, complexity = ctx.complexity_level, "HTTP classify served");
  Json(ctx)
}

#[instrument(level = "info", skip(state, body), fields(file_name = %body.file_name, content_len = body.content.len()))]
pub async fn http_post_classify_source(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ClassifySourceIn>,
) -> impl IntoResponse {
  Json(analyze_source(&state, &body.file_name, &body.content))
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_problems(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let out: Vec<ProblemSummaryOut> = state.catalog.list().into_iter().map(ProblemSummaryOut::from).collect();
  Json(out)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_problem(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Response {
  match state.catalog.get(&id) {
    Some(entry) => Json(entry.clone()).into_response(),
    None => {
      warn!(target: "tutor", %id, "HTTP problem not found");
      error_response(StatusCode::NOT_FOUND, format!("Unknown problem: {}", id))
    }
  }
}

/// Languages without a term table come back unchanged.
#[instrument(level = "info", skip(state, body), fields(text_len = body.text.len(), language = %body.language))]
pub async fn http_post_translate(
  State(state): State<Arc<AppState>>,
  Json(body): Json<TranslateIn>,
) -> impl IntoResponse {
  let translation = translate_text(&state, &body.text, &body.language);
  Json(TranslateOut { translation })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_languages(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(LanguagesOut {
    supported: state.settings.supported_languages.clone(),
    translatable: state.translator.available_languages(),
  })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_profile(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> impl IntoResponse {
  Json(profile_view(&state, &normalize_user_id(&id)).await)
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_put_preferences(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<PreferencesIn>,
) -> Response {
  match update_preferences(&state, &normalize_user_id(&id), body).await {
    Ok(view) => Json(view).into_response(),
    Err(message) => error_response(StatusCode::BAD_REQUEST, message),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_recommendations(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> impl IntoResponse {
  let recommendations = recommendations(&state, &normalize_user_id(&id)).await;
  info!(target: "tutor", user_id = %id, count = recommendations.len(), "HTTP recommendations served");
  Json(RecommendationsOut { recommendations })
}

#[instrument(level = "info", skip(state, body), fields(hint_id = %body.hint_id, usefulness = body.usefulness))]
pub async fn http_post_feedback(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<FeedbackIn>,
) -> impl IntoResponse {
  let recorded = record_feedback(&state, &normalize_user_id(&id), &body.hint_id, body.usefulness, &body.feedback).await;
  Json(FeedbackOut { recorded })
}
