//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs include parameters and basic result info.

use std::sync::Arc;

use axum::{extract::{Query, State}, response::IntoResponse, Json};
use tracing::{info, instrument};

use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state), fields(user_id = %q.user_id))]
pub async fn http_get_problem(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ProblemQuery>,
) -> impl IntoResponse {
  let exam = q.exam.unwrap_or_else(|| "oge".into());
  let topic = q.topic.unwrap_or_else(|| "Algebra".into());
  let (out, origin) = serve_problem(&state, &exam, &topic, q.user_id).await;
  info!(target: "problem", %exam, %topic, id = %out.id, %origin, "HTTP problem served");
  Json(out)
}

#[instrument(level = "info", skip(state, body), fields(%body.problem_id, user_id = %body.user_id, answer_len = body.answer.len()))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AnswerIn>,
) -> impl IntoResponse {
  let (correct, expected, hint) =
    evaluate_answer(&state, &body.problem_id, body.user_id, &body.answer).await;
  info!(target: "problem", id = %body.problem_id, %correct, "HTTP submit_answer evaluated");
  Json(AnswerOut { correct, expected, hint })
}

#[instrument(level = "info", skip(state), fields(%q.problem_id))]
pub async fn http_get_hint(
  State(state): State<Arc<AppState>>,
  Query(q): Query<HintQuery>,
) -> impl IntoResponse {
  let text = get_hint_text(&state, &q.problem_id).await;
  info!(target: "problem", id = %q.problem_id, "HTTP hint served");
  Json(HintOut { text })
}

#[instrument(level = "info", skip(state), fields(user_id = %q.user_id))]
pub async fn http_get_stats(
  State(state): State<Arc<AppState>>,
  Query(q): Query<StatsQuery>,
) -> impl IntoResponse {
  let progress = get_stats(&state, q.user_id).await;
  Json(stats_out(progress))
}
