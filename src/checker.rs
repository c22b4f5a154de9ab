//! Tolerance-aware answer equivalence checking.
//!
//! The only entry point callers need is [`is_answer_correct`]:
//!   - Compound canonical answers ("3; -2") are treated as unordered sets
//!   - Numeric parts are compared with a per-topic absolute tolerance
//!   - Everything else falls back to case-insensitive string equality

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::error;

/// Absolute tolerance applied to topics without an explicit entry.
pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// Per-topic absolute tolerances plus the default fallback.
/// Owned by `AppState` and overridable from the TOML config.
#[derive(Clone, Debug)]
pub struct Tolerances {
  pub by_topic: HashMap<String, f64>,
  pub default: f64,
}

impl Default for Tolerances {
  fn default() -> Self {
    let by_topic = HashMap::from([
      ("Geometry".to_string(), 0.1),
      ("Statistics".to_string(), 0.01),
      ("Probability theory".to_string(), 0.01),
    ]);
    Self { by_topic, default: DEFAULT_TOLERANCE }
  }
}

impl Tolerances {
  /// Tolerance for a topic tag; unknown tags get the default.
  pub fn for_topic(&self, topic: &str) -> f64 {
    self.by_topic.get(topic).copied().unwrap_or(self.default)
  }

  /// Overlay config-file entries on top of the built-ins.
  pub fn apply_overrides(&mut self, default: Option<f64>, by_topic: &HashMap<String, f64>) {
    if let Some(d) = default {
      self.default = d;
    }
    for (topic, tol) in by_topic {
      self.by_topic.insert(topic.clone(), *tol);
    }
  }
}

/// Faults on malformed stored data. The public wrapper converts these to
/// "incorrect" after logging, so the surrounding flow never sees a panic.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
  #[error("canonical answer is empty")]
  EmptyCanonical,
}

/// A normalized answer token: numeric when it parses, text otherwise.
#[derive(Debug)]
enum Token {
  Number(f64),
  Text(String),
}

/// Normalize one token: trim, accept `,` as a decimal separator, parse
/// plain decimals and `a/b` fractions. Non-finite parses and anything
/// else stay text so the string fallback can handle them.
fn normalize(raw: &str) -> Token {
  let s = raw.trim().replace(',', ".");
  if let Ok(v) = s.parse::<f64>() {
    if v.is_finite() {
      return Token::Number(v);
    }
  }
  if let Some((num, den)) = s.split_once('/') {
    if let (Ok(n), Ok(d)) = (num.trim().parse::<f64>(), den.trim().parse::<f64>()) {
      if n.is_finite() && d.is_finite() && d != 0.0 {
        return Token::Number(n / d);
      }
    }
  }
  Token::Text(raw.trim().to_string())
}

/// Sort key for compound answers: numbers ascending, then text
/// case-insensitively. Keeps "3;-2" and "-2;3" in the same order.
fn token_order(a: &Token, b: &Token) -> Ordering {
  match (a, b) {
    (Token::Number(x), Token::Number(y)) => x.total_cmp(y),
    (Token::Number(_), Token::Text(_)) => Ordering::Less,
    (Token::Text(_), Token::Number(_)) => Ordering::Greater,
    (Token::Text(x), Token::Text(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
  }
}

/// Compare one submitted token against one canonical token.
fn check_single(submitted: &str, canonical: &str, tolerance: f64) -> bool {
  match (normalize(submitted), normalize(canonical)) {
    (Token::Number(a), Token::Number(b)) => (a - b).abs() <= tolerance,
    _ => submitted.trim().to_lowercase() == canonical.trim().to_lowercase(),
  }
}

fn check_answer(submitted: &str, canonical: &str, tolerance: f64) -> Result<bool, CheckError> {
  if canonical.trim().is_empty() {
    return Err(CheckError::EmptyCanonical);
  }
  if !canonical.contains(';') {
    return Ok(check_single(submitted, canonical, tolerance));
  }

  let mut got: Vec<String> = submitted.split(';').map(|p| p.trim().to_string()).collect();
  let mut want: Vec<String> = canonical.split(';').map(|p| p.trim().to_string()).collect();
  // Arity mismatch fails closed: no partial credit for compound answers.
  if got.len() != want.len() {
    return Ok(false);
  }

  got.sort_by(|a, b| token_order(&normalize(a), &normalize(b)));
  want.sort_by(|a, b| token_order(&normalize(a), &normalize(b)));
  Ok(got.iter().zip(&want).all(|(g, w)| check_single(g, w, tolerance)))
}

/// Decide whether a user's submission matches a (possibly compound)
/// canonical answer. Pure and stateless; never panics. Internal faults
/// are logged and reported as "incorrect" so the calling flow keeps going.
pub fn is_answer_correct(
  submitted: &str,
  canonical: &str,
  topic: &str,
  tolerances: &Tolerances,
) -> bool {
  let tolerance = tolerances.for_topic(topic);
  match check_answer(submitted, canonical, tolerance) {
    Ok(ok) => ok,
    Err(e) => {
      error!(target: "problem", %topic, error = %e, "Answer check failed; reporting incorrect");
      false
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn tol() -> Tolerances {
    Tolerances::default()
  }

  #[test]
  fn exact_numeric_match() {
    assert!(is_answer_correct("6", "6", "Statistics", &tol()));
  }

  #[test]
  fn statistics_tolerance_boundary() {
    assert!(is_answer_correct("0.70", "0.705", "Statistics", &tol()));
    assert!(!is_answer_correct("0.70", "0.72", "Statistics", &tol()));
  }

  #[test]
  fn geometry_gets_wider_tolerance() {
    assert!(is_answer_correct("28.2", "28.27", "Geometry", &tol()));
    assert!(!is_answer_correct("28.2", "28.27", "Statistics", &tol()));
  }

  #[test]
  fn unknown_topic_uses_default_tolerance() {
    assert!(is_answer_correct("1.005", "1", "Trigonometry", &tol()));
    assert!(!is_answer_correct("1.02", "1", "Trigonometry", &tol()));
  }

  #[test]
  fn compound_answers_are_order_independent() {
    assert!(is_answer_correct("3; -2", "-2;3", "Algebra", &tol()));
    assert!(is_answer_correct("-2;3", "-2; 3", "Algebra", &tol()));
  }

  #[test]
  fn arity_mismatch_fails_closed() {
    assert!(!is_answer_correct("3", "-2;3", "Algebra", &tol()));
    assert!(!is_answer_correct("3;-2;0", "-2;3", "Algebra", &tol()));
  }

  #[test]
  fn non_numeric_fallback_is_case_insensitive() {
    assert!(is_answer_correct("Yes", "yes", "General", &tol()));
    assert!(!is_answer_correct("Yes", "no", "General", &tol()));
  }

  #[test]
  fn integral_decimals_match_plain_integers() {
    assert!(is_answer_correct("4.0", "4", "Algebra", &tol()));
    assert!(is_answer_correct("4", "4.0", "Algebra", &tol()));
  }

  #[test]
  fn comma_decimal_separator_is_accepted() {
    assert!(is_answer_correct("0,705", "0.705", "Statistics", &tol()));
  }

  #[test]
  fn fractions_normalize_to_rationals() {
    assert!(is_answer_correct("1/2", "0.5", "Algebra", &tol()));
    assert!(is_answer_correct("0.5", "1/2", "Algebra", &tol()));
    // Division by zero stays text and fails the numeric path.
    assert!(!is_answer_correct("1/0", "0.5", "Algebra", &tol()));
  }

  #[test]
  fn malformed_input_never_panics() {
    let t = tol();
    for (got, want) in [
      ("", "6"),
      (";;", ";"),
      ("3;", "3"),
      ("nan", "6"),
      ("inf", "inf"),
      ("\u{feff}7", "7"),
    ] {
      let _ = is_answer_correct(got, want, "Algebra", &t);
    }
    // Empty canonical answers are malformed bank data: always incorrect.
    assert!(!is_answer_correct("6", "", "Algebra", &t));
    assert!(!is_answer_correct("", "", "Algebra", &t));
  }

  #[test]
  fn non_finite_tokens_fall_back_to_text() {
    // f64 would happily parse "inf"; the normalizer must not.
    assert!(is_answer_correct("inf", "INF", "Algebra", &tol()));
    assert!(!is_answer_correct("inf", "6", "Algebra", &tol()));
  }

  #[test]
  fn checker_is_idempotent() {
    let t = tol();
    for _ in 0..3 {
      assert!(is_answer_correct("0.70", "0.705", "Statistics", &t));
      assert!(!is_answer_correct("0.70", "0.72", "Statistics", &t));
    }
  }

  #[test]
  fn tolerance_overrides_replace_builtins() {
    let mut t = Tolerances::default();
    let mut by_topic = HashMap::new();
    by_topic.insert("Geometry".to_string(), 0.5);
    t.apply_overrides(Some(0.001), &by_topic);
    assert!(is_answer_correct("28.0", "28.27", "Geometry", &t));
    assert!(!is_answer_correct("1.005", "1", "Trigonometry", &t));
  }
}
