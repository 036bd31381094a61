//! HTTP endpoint handlers. Thin wrappers that forward to the orchestrator.
//!
//! Error contract: request-shape problems (missing `text` / `materialType`)
//! get HTTP 400; failures inside a well-formed generation run get HTTP 200
//! with `success: false` and renderable error content, so the frontend never
//! has to special-case transport errors for handled pipeline failures.

use std::sync::Arc;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::{error, info, instrument};

use crate::orchestrator::{self, Status};
use crate::protocol::*;
use crate::state::AppState;

/// Body served when generation fails outright; the id is fixed so the
/// frontend can recognize error materials.
pub const ERROR_MATERIAL_ID: &str = "error-id";
pub const ERROR_CONTENT: &str =
  "# エラーが発生しました\n\n申し訳ありませんが、教材の生成中にエラーが発生しました。もう一度お試しください。";

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state, body), fields(text_len = body.text.as_deref().map(str::len).unwrap_or(0), material = ?body.material_type))]
pub async fn http_post_generate(
  State(state): State<Arc<AppState>>,
  Json(body): Json<GenerateIn>,
) -> impl IntoResponse {
  let text = body.text.as_deref().map(str::trim).filter(|t| !t.is_empty());
  let (Some(text), Some(material)) = (text, body.material()) else {
    return (
      StatusCode::BAD_REQUEST,
      Json(ErrorOut { error: "テキストと教材タイプを指定してください".to_string() }),
    )
      .into_response();
  };

  let opts = body.options.normalized();
  match orchestrator::generate_material(&state.providers, &state.config, text, &material, &opts)
    .await
  {
    Ok(out) => {
      info!(target: "generation", id = %out.material_id, status = ?out.status, "HTTP generate served");
      let (success, error) = match out.status {
        Status::PlaceholderFallback => (
          false,
          Some("APIキーが設定されていないため、サンプル教材を表示しています".to_string()),
        ),
        _ => (true, None),
      };
      Json(GenerateOut {
        content: out.content,
        material_id: out.material_id,
        success,
        provider: out.provider,
        warnings: out.warnings,
        error,
      })
      .into_response()
    }
    Err(e) => {
      error!(target: "generation", error = %e, "HTTP generate failed");
      Json(GenerateOut {
        content: ERROR_CONTENT.to_string(),
        material_id: ERROR_MATERIAL_ID.to_string(),
        success: false,
        provider: None,
        warnings: Vec::new(),
        error: Some(e.to_string()),
      })
      .into_response()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::orchestrator::ProviderSet;
  use crate::providers::{ErrorCode, Provider, ProviderError};
  use crate::routes::build_router;
  use async_trait::async_trait;
  use axum::body::Body;
  use axum::http::Request;
  use tower::util::ServiceExt;

  struct FixedProvider(Result<String, ProviderError>);

  #[async_trait]
  impl Provider for FixedProvider {
    fn name(&self) -> &'static str {
      "fixed"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
      self.0.clone()
    }
  }

  fn app(gemini: Result<String, ProviderError>, deepseek: Result<String, ProviderError>) -> axum::Router {
    let providers = ProviderSet {
      gemini: Arc::new(FixedProvider(gemini)),
      deepseek: Arc::new(FixedProvider(deepseek)),
    };
    build_router(Arc::new(AppState::with_providers(providers)))
  }

  async fn post_json(app: axum::Router, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let res = app
      .oneshot(
        Request::builder()
          .method("POST")
          .uri("/api/v1/generate")
          .header("content-type", "application/json")
          .body(Body::from(body.to_string()))
          .unwrap(),
      )
      .await
      .unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  fn valid_summary() -> String {
    "# まとめ\n\n## 1. 概要\n- 要点\n\n## 2. 詳細\n- 要点\n\n## 3. 結論\n- 要点".to_string()
  }

  #[tokio::test]
  async fn health_reports_ok() {
    let app = app(Ok(valid_summary()), Ok(valid_summary()));
    let res = app
      .oneshot(Request::builder().uri("/api/v1/health").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["ok"], true);
  }

  #[tokio::test]
  async fn missing_text_is_bad_request() {
    let (status, body) = post_json(
      app(Ok(valid_summary()), Ok(valid_summary())),
      serde_json::json!({ "materialType": "summary" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("テキスト"));
  }

  #[tokio::test]
  async fn missing_material_type_is_bad_request() {
    let (status, _) = post_json(
      app(Ok(valid_summary()), Ok(valid_summary())),
      serde_json::json!({ "text": "本文" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn successful_generation_returns_content_and_id() {
    let (status, body) = post_json(
      app(Ok(valid_summary()), Ok(valid_summary())),
      serde_json::json!({ "text": "生物は細胞からできている。", "materialType": "summary" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["content"].as_str().unwrap().starts_with("# "));
    assert!(!body["materialId"].as_str().unwrap().is_empty());
    assert_ne!(body["materialId"], ERROR_MATERIAL_ID);
  }

  #[tokio::test]
  async fn provider_failure_is_http_200_with_error_body() {
    let fail = Err(ProviderError::new(ErrorCode::RequestFailed, "HTTP 500"));
    let (status, body) =
      post_json(app(fail.clone(), fail), serde_json::json!({ "text": "本文", "materialType": "summary" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["materialId"], ERROR_MATERIAL_ID);
    assert!(body["content"].as_str().unwrap().contains("エラーが発生しました"));
    assert!(body["error"].as_str().is_some());
  }

  #[tokio::test]
  async fn no_credentials_serves_placeholder_material() {
    let missing = Err(ProviderError::missing_credentials("test"));
    let (status, body) = post_json(
      app(missing.clone(), missing),
      serde_json::json!({ "text": "本文", "materialType": "summary" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body["content"].as_str().unwrap().contains("サンプル"));
    assert!(body["error"].as_str().unwrap().contains("APIキー"));
  }
}
