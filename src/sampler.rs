//! Source-text normalization and sampling.
//!
//! Uploaded documents routinely exceed what we want to put in a prompt, and key
//! terms or conclusions often sit far from the start of the text. Instead of a
//! naive head truncation we take a head + middle + tail excerpt joined with an
//! explicit elision marker, so the model still sees the document's structure.

use once_cell::sync::Lazy;
use regex::Regex;

/// Marker inserted between excerpt parts. Counted by tests, shown to the model.
pub const ELISION_MARKER: &str = "...(中略)...";

static HORIZONTAL_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\u{3000}]+").unwrap());
static TRAILING_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r" +\n").unwrap());
static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Normalize line endings and whitespace:
/// runs of horizontal whitespace (incl. full-width space) become one space,
/// runs of blank lines collapse to a single blank line, ends are trimmed.
pub fn normalize(text: &str) -> String {
  let unified = text.replace("\r\n", "\n").replace('\r', "\n");
  let collapsed = HORIZONTAL_WS.replace_all(&unified, " ");
  let collapsed = TRAILING_WS.replace_all(&collapsed, "\n");
  let collapsed = BLANK_RUNS.replace_all(&collapsed, "\n\n");
  collapsed.trim().to_string()
}

/// Return normalized text bounded by `budget` chars (plus marker overhead).
///
/// Under budget the normalized text passes through unchanged. Over budget we
/// keep ~45% from the head, ~20% from around the midpoint, and the remaining
/// budget from the tail.
pub fn sample(text: &str, budget: usize) -> String {
  let normalized = normalize(text);
  let chars: Vec<char> = normalized.chars().collect();
  if chars.len() <= budget {
    return normalized;
  }

  let head_len = budget * 45 / 100;
  let mid_len = budget * 20 / 100;
  let tail_len = budget - head_len - mid_len;

  // Center the middle slice on the midpoint, but never overlap the head.
  let mid_start = (chars.len() / 2).saturating_sub(mid_len / 2).max(head_len);

  let head: String = chars[..head_len].iter().collect();
  let middle: String = chars[mid_start..mid_start + mid_len].iter().collect();
  let tail: String = chars[chars.len() - tail_len..].iter().collect();

  format!("{head}{ELISION_MARKER}{middle}{ELISION_MARKER}{tail}")
}

#[cfg(test)]
mod tests {
  use super::*;

  fn marker_count(s: &str) -> usize {
    s.matches(ELISION_MARKER).count()
  }

  #[test]
  fn normalize_collapses_whitespace() {
    let input = "第一行\t  です\r\n\r\n\r\n\r\n第二行　　です  \n";
    let out = normalize(input);
    assert_eq!(out, "第一行 です\n\n第二行 です");
  }

  #[test]
  fn under_budget_is_identity_after_normalization() {
    let input = "短いテキストです。サンプリングは不要です。";
    let out = sample(input, 1000);
    assert_eq!(out, normalize(input));
    assert_eq!(marker_count(&out), 0);
  }

  #[test]
  fn over_budget_has_exactly_two_markers_and_holds_bound() {
    let input: String = std::iter::repeat("あ").take(50_000).collect();
    let budget = 5500;
    let out = sample(&input, budget);
    assert_eq!(marker_count(&out), 2);
    let overhead = 2 * ELISION_MARKER.chars().count();
    assert!(out.chars().count() <= budget + overhead);
  }

  #[test]
  fn excerpt_keeps_head_middle_and_tail_signal() {
    let mut input = String::new();
    input.push_str("冒頭の目印。");
    input.push_str(&"中".repeat(20_000));
    input.push_str("中間の目印。");
    input.push_str(&"中".repeat(20_000));
    input.push_str("末尾の目印。");
    let out = sample(&input, 4000);
    assert!(out.starts_with("冒頭の目印。"));
    assert!(out.contains("中間の目印。"));
    assert!(out.ends_with("末尾の目印。"));
  }

  #[test]
  fn bound_holds_for_various_budgets() {
    let input: String = std::iter::repeat("字").take(9000).collect();
    for budget in [100, 1000, 5500, 8000] {
      let out = sample(&input, budget);
      let overhead = 2 * ELISION_MARKER.chars().count();
      assert!(out.chars().count() <= budget + overhead, "budget {budget}");
    }
  }
}
