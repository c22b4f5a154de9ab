//! Domain models: problems, where they came from, and per-user progress.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Where did a problem come from?
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProblemSource {
  LocalBank, // from user-provided TOML bank
  Seed,      // built-in seeds (last resort)
}

/// A quiz problem kept in the in-memory bank.
///
/// `exam`, `level` and `topic` are free-form tags (e.g. "oge"/"ege",
/// "basic"/"profile", "Geometry"); config banks may introduce new ones.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Problem {
  pub id: String,
  pub topic: String,
  pub exam: String,
  pub level: String,
  pub source: ProblemSource,

  /// Statement shown to the user.
  pub text: String,
  /// Canonical answer, optionally compound ("x1; x2").
  pub answer: String,
  /// Worked solution shown after a wrong answer or on request.
  pub hint: String,
  /// Difficulty on a 1..=5 scale, matched against user difficulty.
  pub complexity: u8,
}

/// Per-user progress, kept in memory only.
#[derive(Clone, Debug, Serialize, Default)]
pub struct UserProgress {
  /// Exam the user last picked ("oge" by default on first sight).
  pub exam: String,
  /// Solved-problem counters keyed by topic tag.
  pub solved: HashMap<String, u32>,
  /// Current difficulty level; starts at 1, bumped every 5th topic solve.
  pub difficulty: u32,
}
