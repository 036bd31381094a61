//! Uniform interface over the hosted generation backends.
//!
//! Each adapter wraps one backend behind the same signature and returns typed
//! errors, so the orchestrator can branch on cause (credential-missing vs
//! transient failure) instead of string-matching messages.

use async_trait::async_trait;

pub mod deepseek;
pub mod gemini;

/// Stable error codes the orchestrator's fallback policy pattern-matches on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
  MissingCredentials,
  RequestFailed,
  EmptyResponse,
  AllCandidatesFailed,
  Unknown,
}

impl std::fmt::Display for ErrorCode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let s = match self {
      ErrorCode::MissingCredentials => "MISSING_CREDENTIALS",
      ErrorCode::RequestFailed => "REQUEST_FAILED",
      ErrorCode::EmptyResponse => "EMPTY_RESPONSE",
      ErrorCode::AllCandidatesFailed => "ALL_CANDIDATES_FAILED",
      ErrorCode::Unknown => "UNKNOWN",
    };
    f.write_str(s)
  }
}

#[derive(Clone, Debug, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ProviderError {
  pub code: ErrorCode,
  pub message: String,
}

impl ProviderError {
  pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
    Self { code, message: message.into() }
  }

  pub fn missing_credentials(provider: &str) -> Self {
    Self::new(
      ErrorCode::MissingCredentials,
      format!("{provider}: API key not configured"),
    )
  }
}

/// One hosted generation backend: prompt in, generated text or typed error out.
#[async_trait]
pub trait Provider: Send + Sync {
  fn name(&self) -> &'static str;
  async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Try to extract a clean error message from a provider error body
/// (both backends use the `{"error": {"message": ...}}` wrapper).
pub(crate) fn extract_api_error(body: &str) -> Option<String> {
  #[derive(serde::Deserialize)]
  struct EWrap {
    error: EObj,
  }
  #[derive(serde::Deserialize)]
  struct EObj {
    message: String,
  }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn error_codes_render_stable_names() {
    assert_eq!(ErrorCode::MissingCredentials.to_string(), "MISSING_CREDENTIALS");
    assert_eq!(ErrorCode::AllCandidatesFailed.to_string(), "ALL_CANDIDATES_FAILED");
  }

  #[test]
  fn api_error_extraction() {
    let body = r#"{"error": {"message": "quota exceeded", "code": 429}}"#;
    assert_eq!(extract_api_error(body).as_deref(), Some("quota exceeded"));
    assert_eq!(extract_api_error("not json"), None);
  }
}
