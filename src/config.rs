//! Runtime configuration (provider tuning + text limits) from TOML.
//!
//! Loaded from MATERIAL_CONFIG_PATH when set; every field has a default so the
//! server runs with no config file at all. API keys are NOT part of this file,
//! they come from the environment (see `state.rs`).

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub gemini: GeminiCfg,
  #[serde(default)]
  pub deepseek: DeepseekCfg,
  #[serde(default)]
  pub limits: Limits,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GeminiCfg {
  #[serde(default = "default_gemini_model")]
  pub model: String,
  #[serde(default = "default_gemini_base_url")]
  pub base_url: String,
}

impl Default for GeminiCfg {
  fn default() -> Self {
    Self { model: default_gemini_model(), base_url: default_gemini_base_url() }
  }
}

/// DeepSeek's model catalog changes without notice, so the adapter walks an
/// ordered candidate list instead of pinning a single identifier. The list is
/// configuration so deployments (and tests) can shorten or reorder it.
#[derive(Clone, Debug, Deserialize)]
pub struct DeepseekCfg {
  #[serde(default = "default_deepseek_models")]
  pub models: Vec<String>,
  #[serde(default = "default_deepseek_base_url")]
  pub base_url: String,
}

impl Default for DeepseekCfg {
  fn default() -> Self {
    Self { models: default_deepseek_models(), base_url: default_deepseek_base_url() }
  }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Limits {
  /// Source-text budget (chars) fed to the sampler before prompt building.
  #[serde(default = "default_max_source_chars")]
  pub max_source_chars: usize,
}

impl Default for Limits {
  fn default() -> Self {
    Self { max_source_chars: default_max_source_chars() }
  }
}

fn default_gemini_model() -> String {
  "gemini-1.5-flash".into()
}

fn default_gemini_base_url() -> String {
  "https://generativelanguage.googleapis.com/v1beta".into()
}

fn default_deepseek_base_url() -> String {
  "https://api.deepseek.com/v1".into()
}

fn default_deepseek_models() -> Vec<String> {
  [
    "deepseek-v3-base",
    "deepseek-v3",
    "deepseek-llm-7b-chat",
    "deepseek-chat-7b",
    "deepseek-llm",
    "deepseek-coder-6.7b-instruct",
    "deepseek-coder",
    "deepseek-chat",
    "deepseek-v2",
  ]
  .into_iter()
  .map(String::from)
  .collect()
}

fn default_max_source_chars() -> usize {
  8000
}

/// Attempt to load `AppConfig` from MATERIAL_CONFIG_PATH. On any parsing/IO
/// error, returns None and the caller falls back to defaults.
pub fn load_material_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("MATERIAL_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "kyozai_backend", %path, "Loaded material config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "kyozai_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "kyozai_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
