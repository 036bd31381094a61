//! Gemini adapter (primary backend).
//!
//! One `generateContent` call per invocation; no internal retry. Quota and
//! other HTTP failures surface as REQUEST_FAILED so the orchestrator's policy
//! stays in charge. We never log the API key; response logging is limited to
//! token counts and sizes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::GeminiCfg;
use crate::providers::{extract_api_error, ErrorCode, Provider, ProviderError};

const REQUEST_TIMEOUT_SECS: u64 = 45;

#[derive(Clone)]
pub struct Gemini {
  client: reqwest::Client,
  api_key: Option<String>,
  base_url: String,
  model: String,
}

impl Gemini {
  pub fn new(api_key: Option<String>, base_url: impl Into<String>, model: impl Into<String>) -> Self {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
      .build()
      .unwrap_or_else(|_| reqwest::Client::new());
    Self {
      client,
      api_key: api_key.filter(|k| !k.is_empty()),
      base_url: base_url.into(),
      model: model.into(),
    }
  }

  /// Read GEMINI_API_KEY / GEMINI_BASE_URL from the environment. A missing key
  /// still yields an adapter; it reports MISSING_CREDENTIALS on use.
  pub fn from_env(cfg: &GeminiCfg) -> Self {
    let api_key = std::env::var("GEMINI_API_KEY").ok();
    let base_url = std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| cfg.base_url.clone());
    Self::new(api_key, base_url, cfg.model.clone())
  }

  pub fn is_configured(&self) -> bool {
    self.api_key.is_some()
  }

  pub fn model(&self) -> &str {
    &self.model
  }
}

#[async_trait]
impl Provider for Gemini {
  fn name(&self) -> &'static str {
    "gemini"
  }

  #[instrument(level = "info", skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
  async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
    let Some(api_key) = &self.api_key else {
      return Err(ProviderError::missing_credentials("gemini"));
    };

    let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
    let req = GenerateContentRequest {
      contents: vec![Content {
        role: "user".into(),
        parts: vec![Part { text: prompt.into() }],
      }],
      generation_config: GenerationConfig {
        temperature: 0.7,
        top_k: 40,
        top_p: 0.95,
        max_output_tokens: 2048,
      },
    };

    let res = self
      .client
      .post(&url)
      .header(USER_AGENT, "kyozai-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header("x-goog-api-key", api_key)
      .json(&req)
      .send()
      .await
      .map_err(|e| ProviderError::new(ErrorCode::RequestFailed, e.to_string()))?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_api_error(&body).unwrap_or(body);
      return Err(ProviderError::new(
        ErrorCode::RequestFailed,
        format!("Gemini HTTP {}: {}", status, msg),
      ));
    }

    let body: GenerateContentResponse = res
      .json()
      .await
      .map_err(|e| ProviderError::new(ErrorCode::Unknown, format!("unexpected response shape: {e}")))?;

    if let Some(usage) = &body.usage_metadata {
      info!(
        prompt_tokens = ?usage.prompt_token_count,
        candidate_tokens = ?usage.candidates_token_count,
        total_tokens = ?usage.total_token_count,
        "Gemini usage"
      );
    }

    let text: String = body
      .candidates
      .first()
      .and_then(|c| c.content.as_ref())
      .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect::<Vec<_>>().join(""))
      .unwrap_or_default()
      .trim()
      .to_string();

    if text.is_empty() {
      return Err(ProviderError::new(
        ErrorCode::EmptyResponse,
        "Gemini returned no usable content",
      ));
    }
    Ok(text)
  }
}

// --- Wire DTOs ---

#[derive(Serialize)]
struct GenerateContentRequest {
  contents: Vec<Content>,
  #[serde(rename = "generationConfig")]
  generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
  role: String,
  parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
  text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
  temperature: f32,
  top_k: u32,
  top_p: f32,
  max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
  #[serde(default, rename = "usageMetadata")]
  usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
struct Candidate {
  #[serde(default)]
  content: Option<ContentResp>,
}

#[derive(Deserialize)]
struct ContentResp {
  #[serde(default)]
  parts: Vec<PartResp>,
}

#[derive(Deserialize)]
struct PartResp {
  #[serde(default)]
  text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
  #[serde(default)]
  prompt_token_count: Option<u32>,
  #[serde(default)]
  candidates_token_count: Option<u32>,
  #[serde(default)]
  total_token_count: Option<u32>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use wiremock::matchers::{method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  #[tokio::test]
  async fn missing_key_short_circuits_without_network() {
    let server = MockServer::start().await;
    let adapter = Gemini::new(None, server.uri(), "gemini-1.5-flash");
    let err = adapter.generate("テスト").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingCredentials);
    assert!(server.received_requests().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn happy_path_returns_candidate_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/models/gemini-1.5-flash:generateContent"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [
          { "content": { "parts": [ { "text": "# 教材\n\n本文です。" } ] } }
        ],
        "usageMetadata": { "promptTokenCount": 10, "candidatesTokenCount": 20, "totalTokenCount": 30 }
      })))
      .mount(&server)
      .await;

    let adapter = Gemini::new(Some("key".into()), server.uri(), "gemini-1.5-flash");
    let text = adapter.generate("テスト").await.unwrap();
    assert!(text.starts_with("# 教材"));
  }

  #[tokio::test]
  async fn http_failure_is_request_failed_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(429).set_body_json(json!({
        "error": { "message": "quota exceeded" }
      })))
      .mount(&server)
      .await;

    let adapter = Gemini::new(Some("key".into()), server.uri(), "gemini-1.5-flash");
    let err = adapter.generate("テスト").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::RequestFailed);
    assert!(err.message.contains("429"));
    assert!(err.message.contains("quota exceeded"));
  }

  #[tokio::test]
  async fn empty_candidates_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
      .mount(&server)
      .await;

    let adapter = Gemini::new(Some("key".into()), server.uri(), "gemini-1.5-flash");
    let err = adapter.generate("テスト").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::EmptyResponse);
  }
}
