//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Serving adaptive problems (exam/topic bucket + user difficulty)
//!   - Evaluating answers against canonical answers with topic tolerances
//!   - Hint lookup and per-user stats

use tracing::{info, instrument};

use crate::checker::is_answer_correct;
use crate::domain::UserProgress;
use crate::protocol::{to_out, ProblemOut};
use crate::state::AppState;
use crate::util::trunc_for_log;

/// Pick a problem for the user: record their exam choice, read their
/// difficulty, and run the adaptive selection.
#[instrument(level = "info", skip(state), fields(%exam, %topic, %user_id))]
pub async fn serve_problem(state: &AppState, exam: &str, topic: &str, user_id: u64) -> (ProblemOut, &'static str) {
  let difficulty = state.user_difficulty(user_id, exam).await;
  let (p, origin) = state.choose_problem(exam, topic, difficulty).await;
  (to_out(&p), origin)
}

/// Evaluate an answer: (correct, expected, hint). A correct answer records
/// progress for the user; a wrong one returns the canonical answer plus the
/// worked solution, matching the quiz flow.
#[instrument(level = "info", skip(state, answer), fields(%problem_id, %user_id, answer_len = answer.len()))]
pub async fn evaluate_answer(
  state: &AppState,
  problem_id: &str,
  user_id: u64,
  answer: &str,
) -> (bool, String, String) {
  if let Some(p) = state.get_problem(problem_id).await {
    let correct = is_answer_correct(answer, &p.answer, &p.topic, &state.tolerances);
    info!(
      target: "problem",
      id = %p.id,
      topic = %p.topic,
      %correct,
      answer = %trunc_for_log(answer, 64),
      "Answer evaluated"
    );
    if correct {
      state.record_solved(user_id, &p.topic).await;
      (true, p.answer, String::new())
    } else {
      (false, p.answer, p.hint)
    }
  } else {
    (false, String::new(), format!("Unknown problemId: {}", problem_id))
  }
}

/// Hint text for a problem, without judging any answer.
#[instrument(level = "info", skip(state), fields(%problem_id))]
pub async fn get_hint_text(state: &AppState, problem_id: &str) -> String {
  match state.get_problem(problem_id).await {
    Some(p) if !p.hint.is_empty() => p.hint,
    Some(_) => "No hint recorded for this problem.".into(),
    None => "No hint: unknown problem.".into(),
  }
}

/// Progress snapshot; users we have never seen get a fresh default.
#[instrument(level = "info", skip(state), fields(%user_id))]
pub async fn get_stats(state: &AppState, user_id: u64) -> UserProgress {
  state.user_progress(user_id).await.unwrap_or(UserProgress {
    exam: String::new(),
    solved: Default::default(),
    difficulty: 1,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Problem, ProblemSource};
  use crate::checker::Tolerances;
  use std::{collections::HashMap, sync::Arc};
  use tokio::sync::RwLock;

  async fn state_with(problems: Vec<Problem>) -> AppState {
    let state = AppState {
      by_id: Arc::new(RwLock::new(HashMap::new())),
      by_bucket: Arc::new(RwLock::new(HashMap::new())),
      last_by_bucket: Arc::new(RwLock::new(HashMap::new())),
      users: Arc::new(RwLock::new(HashMap::new())),
      tolerances: Tolerances::default(),
    };
    for p in problems {
      state.insert_problem(p).await;
    }
    state
  }

  fn quadratic() -> Problem {
    Problem {
      id: "q1".into(),
      topic: "Algebra".into(),
      exam: "oge".into(),
      level: "basic".into(),
      source: ProblemSource::Seed,
      text: "x^2 - x - 6 = 0".into(),
      answer: "3; -2".into(),
      hint: "Vieta".into(),
      complexity: 1,
    }
  }

  #[tokio::test]
  async fn correct_answer_records_progress_and_hides_hint() {
    let state = state_with(vec![quadratic()]).await;
    let (correct, expected, hint) = evaluate_answer(&state, "q1", 42, "-2; 3").await;
    assert!(correct);
    assert_eq!(expected, "3; -2");
    assert!(hint.is_empty());
    assert_eq!(get_stats(&state, 42).await.solved["Algebra"], 1);
  }

  #[tokio::test]
  async fn wrong_answer_reveals_expected_and_hint() {
    let state = state_with(vec![quadratic()]).await;
    let (correct, expected, hint) = evaluate_answer(&state, "q1", 42, "5").await;
    assert!(!correct);
    assert_eq!(expected, "3; -2");
    assert_eq!(hint, "Vieta");
    assert!(get_stats(&state, 42).await.solved.is_empty());
  }

  #[tokio::test]
  async fn unknown_problem_is_reported_incorrect() {
    let state = state_with(vec![]).await;
    let (correct, expected, hint) = evaluate_answer(&state, "nope", 1, "6").await;
    assert!(!correct);
    assert!(expected.is_empty());
    assert!(hint.contains("Unknown problemId"));
  }

  #[tokio::test]
  async fn served_problem_withholds_the_answer() {
    let state = state_with(vec![quadratic()]).await;
    let (out, _origin) = serve_problem(&state, "oge", "Algebra", 42).await;
    assert_eq!(out.id, "q1");
    assert!(!out.text.is_empty());
  }
}
