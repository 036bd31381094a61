//! Response sanitization: strip English reasoning leaked by the model into its
//! otherwise-Japanese output, and enforce the title-heading invariant.
//!
//! Deterministic, no I/O, never fails; worst case the caller gets the default
//! heading with an empty body. Each heuristic is a named predicate so tests can
//! target it directly.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::util::contains_japanese;

/// Injected when nothing heading-like survives sanitization.
pub const DEFAULT_HEADING: &str = "# 教材";

/// A line containing this many Latin words (and no Japanese) is treated as
/// leaked reasoning rather than legitimate inline terminology.
pub const MAX_LATIN_WORDS: usize = 5;

/// Leading English meta-commentary paragraph: a known opener up to the first
/// blank line.
static LEADING_META_PARAGRAPH: Lazy<Regex> = Lazy::new(|| {
  Regex::new(
    r"(?s)^(We are|I am|You are|The user is asking|Let's see|I need to|I can|I'll|I will|Let me|Now, to|So, I need to|The text appears to be|The text is|The output should be).*?\n\s*\n",
  )
  .unwrap()
});

/// Words that mark a Latin line as meta-commentary about the task.
static META_COMMENTARY_WORDS: Lazy<Regex> = Lazy::new(|| {
  Regex::new(
    r"(?i)\b(I|we|let's|need|must|should|will|can|could|would|let me|now|so|the text|the user|the output)\b",
  )
  .unwrap()
});

static LATIN_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z]+").unwrap());

static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Number of Latin-alphabet words in a line.
pub fn latin_word_count(line: &str) -> usize {
  LATIN_WORD.find_iter(line).count()
}

/// True if the line reads like meta-commentary about the task.
pub fn is_meta_commentary(line: &str) -> bool {
  META_COMMENTARY_WORDS.is_match(line)
}

/// Line filter: keep blank lines, Japanese lines, and symbol/number-only lines;
/// drop meta-commentary and long Latin runs.
pub fn keep_line(line: &str) -> bool {
  let t = line.trim();
  if t.is_empty() {
    return true;
  }
  if contains_japanese(t) {
    return true;
  }
  if !t.chars().any(|c| c.is_ascii_alphabetic()) {
    return true;
  }
  if is_meta_commentary(t) {
    return false;
  }
  latin_word_count(t) < MAX_LATIN_WORDS
}

/// Sanitize raw provider output for display in the Japanese UI.
pub fn sanitize(raw: &str) -> String {
  let mut text = raw.replace("\r\n", "\n").replace('\r', "\n");

  // Strip leading meta-commentary paragraphs, one at a time.
  loop {
    let trimmed = text.trim_start();
    match LEADING_META_PARAGRAPH.find(trimmed) {
      Some(m) => text = trimmed[m.end()..].to_string(),
      None => {
        text = trimmed.to_string();
        break;
      }
    }
  }

  // Latin text before the first heading is leakage too.
  if let Some(idx) = text.find('#') {
    if text[..idx].chars().any(|c| c.is_ascii_alphabetic()) {
      text = text[idx..].to_string();
    }
  }

  let kept: Vec<&str> = text.lines().filter(|l| keep_line(l)).collect();
  let joined = kept.join("\n");
  let collapsed = BLANK_RUNS.replace_all(&joined, "\n\n");
  let out = collapsed.trim().to_string();

  if out.starts_with('#') {
    out
  } else {
    format!("{DEFAULT_HEADING}\n\n{out}")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn always_starts_with_a_heading() {
    for input in ["", "本文だけの出力です。", "no heading at all here", "\n\n\n"] {
      let out = sanitize(input);
      assert!(out.starts_with('#'), "input {:?} -> {:?}", input, out);
    }
  }

  #[test]
  fn clean_japanese_output_passes_through() {
    let input = "# 生物学 - まとめシート\n\n## 1. 細胞\n- 生命の基本単位である\n";
    assert_eq!(sanitize(input), input.trim());
  }

  #[test]
  fn leading_english_reasoning_paragraph_is_removed() {
    let input = "Let me think about the source text and what the user wants here.\n\n# 教材タイトル\n\n## 1. 内容\n- ポイント";
    let out = sanitize(input);
    assert!(out.starts_with("# 教材タイトル"));
    assert!(!out.contains("Let me"));
  }

  #[test]
  fn latin_text_before_first_heading_is_dropped() {
    let input = "Here is your material\n# まとめ\n\n- 要点";
    let out = sanitize(input);
    assert!(out.starts_with("# まとめ"));
  }

  #[test]
  fn latin_word_boundary_is_exactly_five() {
    let four = "alpha bravo charlie delta";
    let five = "alpha bravo charlie delta echo";
    assert!(keep_line(four));
    assert!(!keep_line(five));

    let input = format!("# 見出し\n\n{four}\n{five}\n結びの文です。");
    let out = sanitize(&input);
    assert!(out.contains(four));
    assert!(!out.contains(five));
  }

  #[test]
  fn meta_commentary_lines_are_dropped_even_when_short() {
    assert!(!keep_line("I will translate"));
    assert!(!keep_line("the output looks fine"));
    // Japanese lines with incidental Latin terms survive.
    assert!(keep_line("DNAは遺伝情報を担う。"));
  }

  #[test]
  fn symbol_and_number_lines_survive() {
    assert!(keep_line("1. （　　　　）（1）"));
    assert!(keep_line("-----"));
  }

  #[test]
  fn blank_runs_collapse() {
    let input = "# 見出し\n\n\n\n\n本文です。";
    assert_eq!(sanitize(input), "# 見出し\n\n本文です。");
  }

  #[test]
  fn empty_input_yields_default_heading_only() {
    let out = sanitize("");
    assert!(out.starts_with(DEFAULT_HEADING));
  }
}
