//! Seed data and small utilities related to default content.

use uuid::Uuid;

use crate::domain::{Problem, ProblemSource};

/// Minimal set of built-in problems that guarantee the app is useful
/// even without an external config bank.
pub fn seed_problems() -> Vec<Problem> {
  vec![
    Problem {
      id: "p101".into(),
      topic: "Algebra".into(),
      exam: "oge".into(),
      level: "basic".into(),
      source: ProblemSource::Seed,
      text: r"Solve the equation: \( x^2 - x - 6 = 0 \). Give both roots separated by a semicolon.".into(),
      answer: "3; -2".into(),
      hint: r"By Vieta's theorem: \( x_1 + x_2 = 1, \, x_1 \cdot x_2 = -6 \).".into(),
      complexity: 2,
    },
    Problem {
      id: "p102".into(),
      topic: "Algebra".into(),
      exam: "ege".into(),
      level: "profile".into(),
      source: ProblemSource::Seed,
      text: r"Solve the equation: \( 2x + 4 = 0 \).".into(),
      answer: "-2".into(),
      hint: "2x = -4\nx = -2".into(),
      complexity: 1,
    },
    Problem {
      id: "p103".into(),
      topic: "Geometry".into(),
      exam: "oge".into(),
      level: "basic".into(),
      source: ProblemSource::Seed,
      text: "Find the area of a circle with radius 3 cm. Round to two decimal places.".into(),
      answer: "28.27".into(),
      hint: r"Circle area: \( S = \pi r^2 \approx 3.14 \cdot 9 \).".into(),
      complexity: 2,
    },
    Problem {
      id: "p104".into(),
      topic: "Geometry".into(),
      exam: "ege".into(),
      level: "basic".into(),
      source: ProblemSource::Seed,
      text: "Find the area of a rectangle with sides 4 and 6.".into(),
      answer: "24".into(),
      hint: "Area = 4 × 6 = 24".into(),
      complexity: 1,
    },
    Problem {
      id: "p105".into(),
      topic: "Probability theory".into(),
      exam: "oge".into(),
      level: "basic".into(),
      source: ProblemSource::Seed,
      text: "A box holds 7 red and 3 blue balls. What is the probability of drawing a red ball?".into(),
      answer: "0.7".into(),
      hint: "Probability = favorable outcomes / total outcomes = 7 / 10.".into(),
      complexity: 1,
    },
    Problem {
      id: "p106".into(),
      topic: "Probability theory".into(),
      exam: "ege".into(),
      level: "profile".into(),
      source: ProblemSource::Seed,
      text: "A fair coin is tossed twice. What is the probability of getting heads both times?".into(),
      answer: "0.25".into(),
      hint: "Independent events: 1/2 × 1/2 = 1/4.".into(),
      complexity: 3,
    },
  ]
}

/// Absolute last-resort fallback: if a bucket is empty, we inject this.
pub fn hard_fallback_problem(exam: String, topic: String) -> Problem {
  Problem {
    id: Uuid::new_v4().to_string(),
    topic,
    exam,
    level: "basic".into(),
    source: ProblemSource::Seed,
    text: r"Solve the equation: \( 2x + 4 = 0 \).".into(),
    answer: "-2".into(),
    hint: "2x = -4\nx = -2".into(),
    complexity: 1,
  }
}
