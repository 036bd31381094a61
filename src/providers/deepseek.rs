//! DeepSeek adapter (secondary backend, OpenAI-compatible API).
//!
//! DeepSeek's model catalog shifts without notice, so this adapter walks an
//! ordered candidate-model list and returns the first success. It reports
//! ALL_CANDIDATES_FAILED only after every identifier has been tried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::config::DeepseekCfg;
use crate::providers::{extract_api_error, ErrorCode, Provider, ProviderError};

const REQUEST_TIMEOUT_SECS: u64 = 45;

/// Fixed system framing: the assistant is a domain-expert material author.
const EDUCATOR_SYSTEM: &str = "あなたは教育専門家です。教材作成のエキスパートとして、高品質な教育コンテンツを作成します。特に医学教育に精通しており、正確で学習効果の高い教材を提供します。";

#[derive(Clone)]
pub struct Deepseek {
  client: reqwest::Client,
  api_key: Option<String>,
  base_url: String,
  models: Vec<String>,
}

impl Deepseek {
  pub fn new(api_key: Option<String>, base_url: impl Into<String>, models: Vec<String>) -> Self {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
      .build()
      .unwrap_or_else(|_| reqwest::Client::new());
    Self {
      client,
      api_key: api_key.filter(|k| !k.is_empty()),
      base_url: base_url.into(),
      models,
    }
  }

  /// Read DEEPSEEK_API_KEY / DEEPSEEK_API_BASE_URL from the environment; the
  /// candidate-model list comes from configuration.
  pub fn from_env(cfg: &DeepseekCfg) -> Self {
    let api_key = std::env::var("DEEPSEEK_API_KEY").ok();
    let base_url = std::env::var("DEEPSEEK_API_BASE_URL").unwrap_or_else(|_| cfg.base_url.clone());
    Self::new(api_key, base_url, cfg.models.clone())
  }

  pub fn is_configured(&self) -> bool {
    self.api_key.is_some()
  }

  async fn try_model(&self, api_key: &str, model: &str, prompt: &str) -> Result<String, String> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: model.to_string(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: EDUCATOR_SYSTEM.into() },
        ChatMessageReq { role: "user".into(), content: prompt.into() },
      ],
      temperature: 0.7,
      max_tokens: 4096,
    };

    let res = self
      .client
      .post(&url)
      .header(USER_AGENT, "kyozai-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", api_key))
      .json(&req)
      .send()
      .await
      .map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_api_error(&body).unwrap_or(body);
      return Err(format!("DeepSeek HTTP {} (model {}): {}", status, model, msg));
    }

    let body: ChatCompletionResponse = res.json().await.map_err(|e| e.to_string())?;
    if let Some(usage) = &body.usage {
      info!(
        prompt_tokens = ?usage.prompt_tokens,
        completion_tokens = ?usage.completion_tokens,
        total_tokens = ?usage.total_tokens,
        "DeepSeek usage"
      );
    }
    let text = body
      .choices
      .first()
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default()
      .trim()
      .to_string();

    if text.is_empty() {
      return Err(format!("DeepSeek model {} returned no usable content", model));
    }
    Ok(text)
  }
}

#[async_trait]
impl Provider for Deepseek {
  fn name(&self) -> &'static str {
    "deepseek"
  }

  #[instrument(level = "info", skip(self, prompt), fields(candidates = self.models.len(), prompt_len = prompt.len()))]
  async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
    let Some(api_key) = &self.api_key else {
      return Err(ProviderError::missing_credentials("deepseek"));
    };

    let mut last_error = String::from("no candidate models configured");
    for model in &self.models {
      match self.try_model(api_key, model, prompt).await {
        Ok(text) => {
          info!(target: "generation", %model, "DeepSeek candidate succeeded");
          return Ok(text);
        }
        Err(e) => {
          warn!(target: "generation", %model, error = %e, "DeepSeek candidate failed, trying next");
          last_error = e;
        }
      }
    }

    Err(ProviderError::new(
      ErrorCode::AllCandidatesFailed,
      format!("all DeepSeek candidates failed; last error: {last_error}"),
    ))
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessageReq {
  role: String,
  content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
  #[serde(default)]
  choices: Vec<ChatChoice>,
  #[serde(default)]
  usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ChatChoice {
  message: ChatMessageResp,
}

#[derive(Deserialize)]
struct ChatMessageResp {
  content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
  #[serde(default)]
  prompt_tokens: Option<u32>,
  #[serde(default)]
  completion_tokens: Option<u32>,
  #[serde(default)]
  total_tokens: Option<u32>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use wiremock::matchers::{body_partial_json, method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn models(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
  }

  #[tokio::test]
  async fn missing_key_short_circuits_without_network() {
    let server = MockServer::start().await;
    let adapter = Deepseek::new(None, server.uri(), models(&["deepseek-chat"]));
    let err = adapter.generate("テスト").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingCredentials);
    assert!(server.received_requests().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn walks_candidates_until_one_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/chat/completions"))
      .and(body_partial_json(json!({ "model": "deepseek-v3-base" })))
      .respond_with(ResponseTemplate::new(404).set_body_json(json!({
        "error": { "message": "model not found" }
      })))
      .mount(&server)
      .await;
    Mock::given(method("POST"))
      .and(path("/chat/completions"))
      .and(body_partial_json(json!({ "model": "deepseek-chat" })))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "choices": [ { "message": { "role": "assistant", "content": "# 教材\n\n本文。" } } ]
      })))
      .mount(&server)
      .await;

    let adapter = Deepseek::new(
      Some("key".into()),
      server.uri(),
      models(&["deepseek-v3-base", "deepseek-chat"]),
    );
    let text = adapter.generate("テスト").await.unwrap();
    assert!(text.starts_with("# 教材"));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
  }

  #[tokio::test]
  async fn exhausting_candidates_reports_all_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(500).set_body_json(json!({
        "error": { "message": "backend exploded" }
      })))
      .mount(&server)
      .await;

    let adapter = Deepseek::new(Some("key".into()), server.uri(), models(&["m1", "m2", "m3"]));
    let err = adapter.generate("テスト").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::AllCandidatesFailed);
    assert!(err.message.contains("backend exploded"));
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
  }

  #[tokio::test]
  async fn empty_choices_count_as_candidate_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
      .mount(&server)
      .await;

    let adapter = Deepseek::new(Some("key".into()), server.uri(), models(&["m1"]));
    let err = adapter.generate("テスト").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::AllCandidatesFailed);
  }
}
