//! Structural validation of generated material.
//!
//! This is conformance checking against the requested material type's shape
//! (counts of blanks / questions / sections / cards), not a semantic review.
//! All deficiencies are accumulated so one pass surfaces everything; the
//! orchestrator feeds the reasons back to the model as a corrective prompt.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::{GenerationOptions, MaterialType};

/// Outcome of one validation pass. Consumed immediately, never persisted.
#[derive(Clone, Debug)]
pub struct ValidationResult {
  pub valid: bool,
  pub reasons: Vec<String>,
}

static TOP_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#\s").unwrap());
static SECTION_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^##\s").unwrap());
static QUIZ_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^##\s*問\s*\d+").unwrap());
static NUMBERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*\d+[.．、)）]").unwrap());
static FLASHCARD_ITEM: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"(?m)^\s*\d+[.．、].*[？?]").unwrap());

static BLANK_UNDERLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"_{3,}").unwrap());
static BLANK_BOX: Lazy<Regex> = Lazy::new(|| Regex::new(r"□{2,}").unwrap());
static BLANK_PARENTHESES: Lazy<Regex> = Lazy::new(|| Regex::new(r"（\u{3000}+）").unwrap());

/// Marker that must appear somewhere in quiz / fill-in-blank output.
pub const ANSWER_KEY_MARKER: &str = "解答";

pub fn has_top_heading(content: &str) -> bool {
  TOP_HEADING.is_match(content)
}

/// Total occurrences of the three recognized blank glyph patterns.
pub fn blank_count(content: &str) -> usize {
  BLANK_UNDERLINE.find_iter(content).count()
    + BLANK_BOX.find_iter(content).count()
    + BLANK_PARENTHESES.find_iter(content).count()
}

/// Lines that look like a numbered item or a `## 問N` question heading.
pub fn question_count(content: &str) -> usize {
  NUMBERED_ITEM.find_iter(content).count() + QUIZ_HEADING.find_iter(content).count()
}

pub fn section_count(content: &str) -> usize {
  SECTION_HEADING.find_iter(content).count()
}

/// Numbered items carrying a question marker, the flashcard "front" shape.
pub fn flashcard_count(content: &str) -> usize {
  FLASHCARD_ITEM.find_iter(content).count()
}

/// Check material-type-specific structural expectations against the clamped
/// options. Returns every accumulated reason, not just the first failure.
pub fn validate(
  material: &MaterialType,
  content: &str,
  opts: &GenerationOptions,
) -> ValidationResult {
  let mut reasons = Vec::new();

  if !has_top_heading(content) {
    reasons.push("先頭に「# 」で始まるタイトル見出しがありません".to_string());
  }

  match material {
    MaterialType::FillInBlank => {
      let found = blank_count(content);
      let min = (opts.question_count as usize / 2).max(3);
      if found < min {
        reasons.push(format!("空欄が不足しています（{found}箇所、最低{min}箇所必要です）"));
      }
    }
    MaterialType::Quiz => {
      let found = question_count(content);
      let min = (opts.question_count as usize / 2).max(3);
      if found < min {
        reasons.push(format!("問題数が不足しています（{found}問、最低{min}問必要です）"));
      }
      if !content.contains(ANSWER_KEY_MARKER) {
        reasons.push("解答セクション（「解答」）が見つかりません".to_string());
      }
    }
    MaterialType::Summary => {
      let found = section_count(content);
      let min = (opts.section_count as usize * 60 / 100).max(2);
      if found < min {
        reasons.push(format!(
          "セクション見出し（## ）が不足しています（{found}個、最低{min}個必要です）"
        ));
      }
    }
    MaterialType::Assignment => {
      let found = question_count(content);
      let min = (opts.assignment_count as usize * 60 / 100).max(1);
      if found < min {
        reasons.push(format!("課題の項目が不足しています（{found}個、最低{min}個必要です）"));
      }
    }
    MaterialType::Flashcards => {
      let found = flashcard_count(content);
      let min = (opts.card_count as usize / 2).max(5);
      if found < min {
        reasons.push(format!(
          "カード（質問付きの番号項目）が不足しています（{found}枚、最低{min}枚必要です）"
        ));
      }
    }
    MaterialType::Other(_) => {}
  }

  ValidationResult { valid: reasons.is_empty(), reasons }
}
