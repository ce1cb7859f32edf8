//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs include parameters and basic result info.

use std::sync::Arc;
use axum::{extract::State, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::protocol::*;
use crate::state::AppState;
use crate::logic::*;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_daily(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let puzzle = state.daily().map(to_out);
  let completed_today = state.store.completed_on(&state.today_key()).await;
  let attempts = state.daily_attempts().await;
  if let Some(p) = &puzzle {
    info!(target: "puzzle", id = %p.id, %completed_today, "HTTP daily puzzle served");
  }
  Json(DailyOut { puzzle, completed_today, attempts })
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_practice(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let outcome = start_practice(&state).await;
  Json(practice_to_out(outcome))
}

#[instrument(level = "info", skip(state, body), fields(%body.practice, answer_len = body.answer.len()))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AnswerIn>,
) -> impl IntoResponse {
  let outcome = submit_answer(&state, &body.answer, body.practice).await;
  info!(target: "puzzle", correct = outcome.correct, points = outcome.points_awarded, "HTTP submit_answer evaluated");
  Json(answer_to_out(outcome))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let snapshot = stats_snapshot(&state).await;
  Json(stats_to_out(&snapshot))
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_level_up(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(level_up_to_out(level_up(&state).await))
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_open_box(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(box_to_out(open_box(&state).await))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_box_history(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(BoxHistoryOut { entries: box_history(&state).await })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_today_fact(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let fact = today_fact(&state).await;
  Json(TodayFactOut { fact: fact.as_ref().map(fact_to_out) })
}

#[instrument(level = "info", skip(state, body), fields(%body.rating))]
pub async fn http_post_rate_fact(
  State(state): State<Arc<AppState>>,
  Json(body): Json<RateIn>,
) -> impl IntoResponse {
  Json(rate_to_out(rate_fact(&state, body.rating).await))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_leaderboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(LeaderboardOut { rows: leaderboard_to_out(leaderboard(&state).await) })
}

#[instrument(level = "info", skip(state, body), fields(prompt_len = body.prompt.len()))]
pub async fn http_post_generate(
  State(state): State<Arc<AppState>>,
  Json(body): Json<GenerateIn>,
) -> impl IntoResponse {
  let text = relay_generate(&state, &body.prompt, body.model.as_deref()).await;
  match text {
    Ok(text) => Json(GenerateOut { text }).into_response(),
    Err(message) => (
      axum::http::StatusCode::BAD_GATEWAY,
      Json(serde_json::json!({ "error": message })),
    )
      .into_response(),
  }
}
