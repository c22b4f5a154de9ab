//! Loading quiz configuration (tolerance overrides + optional problem bank)
//! from TOML. See `QuizConfig` for the expected schema.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct QuizConfig {
  #[serde(default)]
  pub tolerances: ToleranceCfg,
  #[serde(default)]
  pub problems: Vec<ProblemCfg>,
}

/// Tolerance section: a default plus per-topic overrides. Both optional;
/// anything missing keeps the built-in values.
#[derive(Clone, Debug, Deserialize, Default)]
pub struct ToleranceCfg {
  #[serde(default)]
  pub default: Option<f64>,
  #[serde(default)]
  pub by_topic: HashMap<String, f64>,
}

/// Problem entry accepted in TOML configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct ProblemCfg {
  #[serde(default)] pub id: Option<String>,
  pub topic: String,
  pub exam: String,
  #[serde(default = "default_level")] pub level: String,
  pub text: String,
  pub answer: String,
  #[serde(default)] pub hint: String,
  #[serde(default = "default_complexity")] pub complexity: u8,
}

fn default_level() -> String {
  "basic".to_string()
}

fn default_complexity() -> u8 {
  1
}

/// Attempt to load `QuizConfig` from QUIZ_CONFIG_PATH. On any parsing/IO
/// error, returns None and the caller falls back to built-in defaults.
pub fn load_quiz_config_from_env() -> Option<QuizConfig> {
  let path = std::env::var("QUIZ_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<QuizConfig>(&s) {
      Ok(cfg) => {
        info!(target: "zadachnik_backend", %path, bank_size = cfg.problems.len(), "Loaded quiz config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "zadachnik_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "zadachnik_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_full_config() {
    let cfg: QuizConfig = toml::from_str(
      r#"
      [tolerances]
      default = 0.02
      [tolerances.by_topic]
      "Geometry" = 0.2

      [[problems]]
      topic = "Geometry"
      exam = "oge"
      text = "Find the area of a circle with radius 3."
      answer = "28.27"
      hint = "S = pi * r^2"
      complexity = 2
      "#,
    )
    .unwrap();
    assert_eq!(cfg.tolerances.default, Some(0.02));
    assert_eq!(cfg.tolerances.by_topic["Geometry"], 0.2);
    assert_eq!(cfg.problems.len(), 1);
    assert_eq!(cfg.problems[0].level, "basic");
    assert_eq!(cfg.problems[0].complexity, 2);
  }

  #[test]
  fn empty_config_is_valid() {
    let cfg: QuizConfig = toml::from_str("").unwrap();
    assert!(cfg.tolerances.default.is_none());
    assert!(cfg.problems.is_empty());
  }
}
