//! Small utility helpers used across modules.

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge submitted answers.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    s.to_string()
  } else {
    // Cut on a char boundary so multi-byte submissions can't split.
    let cut = s
      .char_indices()
      .map(|(i, _)| i)
      .take_while(|i| *i <= max)
      .last()
      .unwrap_or(0);
    format!("{}… ({} bytes total)", &s[..cut], s.len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn short_strings_pass_through() {
    assert_eq!(trunc_for_log("42", 64), "42");
  }

  #[test]
  fn long_strings_are_truncated_on_char_boundaries() {
    let s = "ответ".repeat(20);
    let out = trunc_for_log(&s, 16);
    assert!(out.contains("bytes total"));
  }
}
