//! Generation orchestration: sample -> prompt -> provider call -> sanitize ->
//! validate, with a single corrective retry.
//!
//! Policy notes:
//! - Cross-provider fallback is asymmetric: only MISSING_CREDENTIALS on the
//!   selected provider triggers one substitution to the alternate backend.
//!   Transient/HTTP errors propagate, so real backend failures stay visible
//!   instead of being masked by a fallback that returns different content.
//! - Validation failure is not a hard error: the validator's reasons are fed
//!   back to the model once as a corrective prompt, and whatever the retry
//!   produces is returned with the residual reasons as warnings.
//! - When neither backend has credentials we return an explicit placeholder
//!   material rather than an error, so the editing workflow never blocks.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::domain::{GenerationOptions, MaterialType, ProviderKind};
use crate::providers::{ErrorCode, Provider, ProviderError};
use crate::util::trunc_for_log;
use crate::{prompt, sampler, sanitize, validate};

/// Both adapters, selectable by the request's provider option.
#[derive(Clone)]
pub struct ProviderSet {
  pub gemini: Arc<dyn Provider>,
  pub deepseek: Arc<dyn Provider>,
}

impl ProviderSet {
  fn select(&self, kind: ProviderKind) -> &Arc<dyn Provider> {
    match kind {
      ProviderKind::Gemini => &self.gemini,
      ProviderKind::Deepseek => &self.deepseek,
    }
  }
}

/// Terminal state of one orchestration run that produced content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
  /// First pass passed validation.
  Accepted,
  /// The corrective retry path was taken (regardless of its own validity).
  AcceptedWithWarnings,
  /// No backend had credentials; content is the offline placeholder.
  PlaceholderFallback,
}

#[derive(Clone, Debug)]
pub struct Generated {
  pub content: String,
  pub material_id: String,
  pub status: Status,
  pub warnings: Vec<String>,
  pub provider: Option<&'static str>,
}

/// Raised only when no content could be produced by any path.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
  #[error("教材の生成に失敗しました: {0}")]
  Provider(#[from] ProviderError),
}

enum CallError {
  NoCredentials,
  Provider(ProviderError),
}

/// One generation attempt with the asymmetric credential fallback applied.
async fn call_with_credential_fallback(
  providers: &ProviderSet,
  kind: ProviderKind,
  prompt: &str,
) -> Result<(String, &'static str), CallError> {
  let primary = providers.select(kind);
  match primary.generate(prompt).await {
    Ok(text) => Ok((text, primary.name())),
    Err(e) if e.code == ErrorCode::MissingCredentials => {
      let alternate = providers.select(kind.other());
      warn!(
        target: "generation",
        from = primary.name(),
        to = alternate.name(),
        "Provider has no credentials, falling back once to the alternate"
      );
      match alternate.generate(prompt).await {
        Ok(text) => Ok((text, alternate.name())),
        Err(e2) if e2.code == ErrorCode::MissingCredentials => Err(CallError::NoCredentials),
        Err(e2) => Err(CallError::Provider(e2)),
      }
    }
    Err(e) => Err(CallError::Provider(e)),
  }
}

/// Run the full pipeline for one request.
#[instrument(level = "info", skip(providers, cfg, text, opts), fields(material = material.label_ja(), text_len = text.len(), provider = ?opts.provider))]
pub async fn generate_material(
  providers: &ProviderSet,
  cfg: &AppConfig,
  text: &str,
  material: &MaterialType,
  opts: &GenerationOptions,
) -> Result<Generated, GenerateError> {
  let material_id = Uuid::new_v4().to_string();

  let sampled = sampler::sample(text, cfg.limits.max_source_chars);
  let base_prompt = prompt::build_prompt(&sampled, material, opts);

  let (raw, used) = match call_with_credential_fallback(providers, opts.provider, &base_prompt).await
  {
    Ok(pair) => pair,
    Err(CallError::NoCredentials) => {
      warn!(target: "generation", %material_id, "No backend configured; serving placeholder material");
      return Ok(Generated {
        content: placeholder_material(material, opts),
        material_id,
        status: Status::PlaceholderFallback,
        warnings: vec!["APIキーが設定されていないため、サンプル教材を表示しています".to_string()],
        provider: None,
      });
    }
    Err(CallError::Provider(e)) => {
      error!(target: "generation", %material_id, error = %e, "Generation failed");
      return Err(e.into());
    }
  };

  let clean = sanitize::sanitize(&raw);
  let verdict = validate::validate(material, &clean, opts);
  if verdict.valid {
    info!(
      target: "generation",
      %material_id,
      provider = used,
      content_preview = %trunc_for_log(&clean, 40),
      "Material accepted on first pass"
    );
    return Ok(Generated {
      content: clean,
      material_id,
      status: Status::Accepted,
      warnings: Vec::new(),
      provider: Some(used),
    });
  }

  // Exactly one corrective retry with the validator's findings appended.
  info!(
    target: "generation",
    %material_id,
    reasons = ?verdict.reasons,
    "Validation failed; retrying once with corrective prompt"
  );
  let retry_prompt = prompt::corrective_prompt(&base_prompt, &verdict.reasons);
  match call_with_credential_fallback(providers, opts.provider, &retry_prompt).await {
    Ok((raw2, used2)) => {
      let clean2 = sanitize::sanitize(&raw2);
      let verdict2 = validate::validate(material, &clean2, opts);
      if !verdict2.valid {
        warn!(
          target: "generation",
          %material_id,
          remaining = ?verdict2.reasons,
          "Retry still fails validation; returning best-effort content"
        );
      }
      Ok(Generated {
        content: clean2,
        material_id,
        status: Status::AcceptedWithWarnings,
        warnings: verdict2.reasons,
        provider: Some(used2),
      })
    }
    Err(_) => {
      // Retry call failed outright; keep the first pass rather than dropping
      // content we already have.
      warn!(
        target: "generation",
        %material_id,
        "Retry generation failed; keeping first-pass content"
      );
      Ok(Generated {
        content: clean,
        material_id,
        status: Status::AcceptedWithWarnings,
        warnings: verdict.reasons,
        provider: Some(used),
      })
    }
  }
}

/// Offline sample shown when no backend is configured. The editor workflow
/// treats it as a starting template.
pub fn placeholder_material(material: &MaterialType, opts: &GenerationOptions) -> String {
  format!(
    "# {title} - {label}\n\n\
     科目領域: {subject}\n\n\
     このコンテンツはサンプルです。APIの呼び出しができないため、元のテキストに基づいた教材は生成されていません。\n\n\
     ## 主要ポイント\n\
     - 環境変数（GEMINI_API_KEY / DEEPSEEK_API_KEY）が設定されているか確認してください\n\
     - APIキーが有効であることを確認してください\n\
     - クォータ制限に達していないか確認してください\n\n\
     ## オフラインモードでの使用方法\n\
     - エディタ機能でこのテンプレートを編集し、独自の教材を作成できます\n\
     - 保存ボタンで作成した教材を保存できます",
    title = opts.title,
    label = material.label_ja(),
    subject = opts.subject_area,
  )
}
