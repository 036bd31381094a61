//! Application state: runtime configuration plus the two provider adapters.
//!
//! This module owns:
//!   - the material config (from TOML or defaults)
//!   - the Gemini and DeepSeek adapters behind the common Provider trait
//!
//! API keys are read from the environment exactly once, at startup. A missing
//! key does not prevent startup; the affected adapter reports
//! MISSING_CREDENTIALS on use and the orchestrator's fallback policy decides
//! what happens next.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::config::{load_material_config_from_env, AppConfig};
use crate::orchestrator::ProviderSet;
use crate::providers::deepseek::Deepseek;
use crate::providers::gemini::Gemini;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub providers: ProviderSet,
}

impl AppState {
    /// Build state from env: load config, construct both adapters.
    #[instrument(level = "info", skip_all)]
    pub fn from_env() -> Self {
        let config = load_material_config_from_env().unwrap_or_default();

        let gemini = Gemini::from_env(&config.gemini);
        if gemini.is_configured() {
            info!(target: "kyozai_backend", model = %gemini.model(), "Gemini enabled.");
        } else {
            info!(target: "kyozai_backend", "Gemini disabled (no GEMINI_API_KEY).");
        }

        let deepseek = Deepseek::from_env(&config.deepseek);
        if deepseek.is_configured() {
            info!(target: "kyozai_backend", candidates = config.deepseek.models.len(), "DeepSeek enabled.");
        } else {
            info!(target: "kyozai_backend", "DeepSeek disabled (no DEEPSEEK_API_KEY).");
        }

        let providers = ProviderSet {
            gemini: Arc::new(gemini),
            deepseek: Arc::new(deepseek),
        };
        Self { config, providers }
    }

    /// State with injected providers, for router-level tests.
    #[cfg(test)]
    pub fn with_providers(providers: ProviderSet) -> Self {
        Self { config: AppConfig::default(), providers }
    }
}
