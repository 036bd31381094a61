//! Domain models: material types, difficulty, generation options and their
//! clamping rules.
//!
//! The wire format sends loosely-typed strings/numbers; everything here is the
//! typed form with defaults and documented ranges applied at construction.
//! Handlers and the pipeline only ever see already-clamped values.

use serde::Serialize;

/// Requested pedagogical output format. Unknown labels are carried through as
/// `Other` so the prompt builder can still interpolate them into the generic
/// template (the source label is shown to the model verbatim).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MaterialType {
  FillInBlank,
  Summary,
  Quiz,
  Assignment,
  Flashcards,
  Other(String),
}

impl MaterialType {
  pub fn parse(s: &str) -> Self {
    match s {
      "fill-in-blank" => MaterialType::FillInBlank,
      "summary" => MaterialType::Summary,
      "quiz" => MaterialType::Quiz,
      "assignment" => MaterialType::Assignment,
      "flashcards" => MaterialType::Flashcards,
      other => MaterialType::Other(other.to_string()),
    }
  }

  /// Japanese label shown in headings and fallback content.
  pub fn label_ja(&self) -> &str {
    match self {
      MaterialType::FillInBlank => "穴埋めプリント",
      MaterialType::Summary => "まとめシート",
      MaterialType::Quiz => "小テスト",
      MaterialType::Assignment => "課題",
      MaterialType::Flashcards => "フラッシュカード",
      MaterialType::Other(_) => "教材",
    }
  }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
  Beginner,
  #[default]
  Intermediate,
  Advanced,
}

impl Difficulty {
  /// Unknown strings silently fall back to the default.
  pub fn parse(s: &str) -> Self {
    match s {
      "beginner" => Difficulty::Beginner,
      "advanced" => Difficulty::Advanced,
      _ => Difficulty::Intermediate,
    }
  }

  pub fn label_ja(&self) -> &str {
    match self {
      Difficulty::Beginner => "初級",
      Difficulty::Intermediate => "中級",
      Difficulty::Advanced => "上級",
    }
  }
}

/// Which hosted backend the caller asked for. Gemini is the primary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
  #[default]
  Gemini,
  Deepseek,
}

impl ProviderKind {
  pub fn parse(s: &str) -> Self {
    match s {
      "deepseek" => ProviderKind::Deepseek,
      _ => ProviderKind::Gemini,
    }
  }

  /// The alternate backend, used by the credential-fallback policy.
  pub fn other(self) -> Self {
    match self {
      ProviderKind::Gemini => ProviderKind::Deepseek,
      ProviderKind::Deepseek => ProviderKind::Gemini,
    }
  }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlankStyle {
  #[default]
  Underline,
  Box,
  Parentheses,
}

impl BlankStyle {
  pub fn parse(s: &str) -> Self {
    match s {
      "box" => BlankStyle::Box,
      "parentheses" => BlankStyle::Parentheses,
      _ => BlankStyle::Underline,
    }
  }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlankNumberType {
  #[default]
  Numeric,
  Alphabetic,
  Roman,
  NoNumber,
}

impl BlankNumberType {
  pub fn parse(s: &str) -> Self {
    match s {
      "alphabetic" => BlankNumberType::Alphabetic,
      "roman" => BlankNumberType::Roman,
      "none" => BlankNumberType::NoNumber,
      _ => BlankNumberType::Numeric,
    }
  }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlankNumberPosition {
  #[default]
  After,
  Before,
  Above,
}

impl BlankNumberPosition {
  pub fn parse(s: &str) -> Self {
    match s {
      "before" => BlankNumberPosition::Before,
      "above" => BlankNumberPosition::Above,
      _ => BlankNumberPosition::After,
    }
  }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QuizType {
  Descriptive,
  MultipleChoice,
  #[default]
  Mixed,
}

impl QuizType {
  pub fn parse(s: &str) -> Self {
    match s {
      "descriptive" => QuizType::Descriptive,
      "multiple-choice" => QuizType::MultipleChoice,
      _ => QuizType::Mixed,
    }
  }
}

/// Documented range for a numeric option. Missing input takes the default,
/// out-of-range input is clamped, never rejected.
#[derive(Clone, Copy, Debug)]
pub struct Clamp {
  pub min: u32,
  pub max: u32,
  pub default: u32,
}

impl Clamp {
  pub fn apply(&self, v: Option<i64>) -> u32 {
    match v {
      None => self.default,
      Some(x) => x.clamp(self.min as i64, self.max as i64) as u32,
    }
  }
}

pub const QUESTION_COUNT: Clamp = Clamp { min: 1, max: 100, default: 10 };
pub const SECTION_COUNT: Clamp = Clamp { min: 2, max: 15, default: 5 };
pub const ASSIGNMENT_COUNT: Clamp = Clamp { min: 1, max: 20, default: 3 };
pub const CARD_COUNT: Clamp = Clamp { min: 5, max: 50, default: 15 };
pub const KEY_TERMS_MAX: usize = 20;

pub const DEFAULT_TITLE: &str = "教材";
pub const DEFAULT_SUBJECT_AREA: &str = "一般";

/// Fully-typed generation options. Every numeric field is already clamped.
#[derive(Clone, Debug)]
pub struct GenerationOptions {
  pub title: String,
  pub difficulty: Difficulty,
  pub subject_area: String,
  pub question_count: u32,
  pub section_count: u32,
  pub assignment_count: u32,
  pub card_count: u32,
  pub key_terms: Vec<String>,
  pub provider: ProviderKind,
  pub blank_style: BlankStyle,
  pub blank_number_type: BlankNumberType,
  pub blank_number_position: BlankNumberPosition,
  pub quiz_type: QuizType,
}

impl Default for GenerationOptions {
  fn default() -> Self {
    Self {
      title: DEFAULT_TITLE.into(),
      difficulty: Difficulty::default(),
      subject_area: DEFAULT_SUBJECT_AREA.into(),
      question_count: QUESTION_COUNT.default,
      section_count: SECTION_COUNT.default,
      assignment_count: ASSIGNMENT_COUNT.default,
      card_count: CARD_COUNT.default,
      key_terms: Vec::new(),
      provider: ProviderKind::default(),
      blank_style: BlankStyle::default(),
      blank_number_type: BlankNumberType::default(),
      blank_number_position: BlankNumberPosition::default(),
      quiz_type: QuizType::default(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn clamp_applies_range_and_default() {
    assert_eq!(QUESTION_COUNT.apply(None), 10);
    assert_eq!(QUESTION_COUNT.apply(Some(500)), 100);
    assert_eq!(QUESTION_COUNT.apply(Some(-5)), 1);
    assert_eq!(QUESTION_COUNT.apply(Some(42)), 42);
    assert_eq!(SECTION_COUNT.apply(Some(1)), 2);
    assert_eq!(CARD_COUNT.apply(Some(3)), 5);
  }

  #[test]
  fn unknown_material_type_is_carried_through() {
    match MaterialType::parse("poster") {
      MaterialType::Other(label) => assert_eq!(label, "poster"),
      other => panic!("unexpected: {:?}", other),
    }
    assert_eq!(MaterialType::parse("quiz"), MaterialType::Quiz);
  }

  #[test]
  fn unknown_enum_strings_fall_back_to_defaults() {
    assert_eq!(Difficulty::parse("extreme"), Difficulty::Intermediate);
    assert_eq!(ProviderKind::parse("mystral"), ProviderKind::Gemini);
    assert_eq!(QuizType::parse(""), QuizType::Mixed);
  }

  #[test]
  fn provider_other_flips() {
    assert_eq!(ProviderKind::Gemini.other(), ProviderKind::Deepseek);
    assert_eq!(ProviderKind::Deepseek.other(), ProviderKind::Gemini);
  }
}
