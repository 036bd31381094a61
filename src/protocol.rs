//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{
    self, BlankNumberPosition, BlankNumberType, BlankStyle, Difficulty, GenerationOptions,
    MaterialType, ProviderKind, QuizType,
};

/// Body of `POST /api/v1/generate`. Everything except `text` and
/// `materialType` is optional; numeric fields arrive as loose integers and are
/// clamped during normalization, never rejected.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateIn {
    pub text: Option<String>,
    #[serde(rename = "materialType")]
    pub material_type: Option<String>,
    #[serde(default)]
    pub options: OptionsIn,
}

#[derive(Debug, Default, Deserialize)]
pub struct OptionsIn {
    pub title: Option<String>,
    pub difficulty: Option<String>,
    #[serde(rename = "subjectArea")]
    pub subject_area: Option<String>,
    #[serde(rename = "questionCount")]
    pub question_count: Option<i64>,
    #[serde(rename = "sectionCount")]
    pub section_count: Option<i64>,
    #[serde(rename = "assignmentCount")]
    pub assignment_count: Option<i64>,
    #[serde(rename = "cardCount")]
    pub card_count: Option<i64>,
    #[serde(rename = "keyTerms")]
    pub key_terms: Option<Vec<String>>,
    pub provider: Option<String>,
    #[serde(rename = "blankStyle")]
    pub blank_style: Option<String>,
    #[serde(rename = "blankNumberType")]
    pub blank_number_type: Option<String>,
    #[serde(rename = "blankNumberPosition")]
    pub blank_number_position: Option<String>,
    #[serde(rename = "quizType")]
    pub quiz_type: Option<String>,
}

impl OptionsIn {
    /// Produce the fully-typed, fully-clamped options the pipeline runs on.
    pub fn normalized(&self) -> GenerationOptions {
        let title = self
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(domain::DEFAULT_TITLE)
            .to_string();
        let subject_area = self
            .subject_area
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(domain::DEFAULT_SUBJECT_AREA)
            .to_string();
        let key_terms: Vec<String> = self
            .key_terms
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .take(domain::KEY_TERMS_MAX)
            .collect();

        GenerationOptions {
            title,
            difficulty: self.difficulty.as_deref().map(Difficulty::parse).unwrap_or_default(),
            subject_area,
            question_count: domain::QUESTION_COUNT.apply(self.question_count),
            section_count: domain::SECTION_COUNT.apply(self.section_count),
            assignment_count: domain::ASSIGNMENT_COUNT.apply(self.assignment_count),
            card_count: domain::CARD_COUNT.apply(self.card_count),
            key_terms,
            provider: self.provider.as_deref().map(ProviderKind::parse).unwrap_or_default(),
            blank_style: self.blank_style.as_deref().map(BlankStyle::parse).unwrap_or_default(),
            blank_number_type: self
                .blank_number_type
                .as_deref()
                .map(BlankNumberType::parse)
                .unwrap_or_default(),
            blank_number_position: self
                .blank_number_position
                .as_deref()
                .map(BlankNumberPosition::parse)
                .unwrap_or_default(),
            quiz_type: self.quiz_type.as_deref().map(QuizType::parse).unwrap_or_default(),
        }
    }
}

impl GenerateIn {
    pub fn material(&self) -> Option<MaterialType> {
        self.material_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(MaterialType::parse)
    }
}

/// Response of `POST /api/v1/generate`. Handled generation failures still use
/// this shape with `success: false` and an `error` message, so the frontend
/// always has content to render.
#[derive(Debug, Serialize)]
pub struct GenerateOut {
    pub content: String,
    #[serde(rename = "materialId")]
    pub material_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Request-shape errors (missing `text` / `materialType`) get a plain error
/// body with HTTP 400 instead.
#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
