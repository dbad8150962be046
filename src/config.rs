//! Generation-service configuration resolved from the environment.
//!
//! Priority per setting: explicit CLI override, then `BITEBOT_*`
//! variables, then the `GEMINI_API_KEY` fallback for the key, then the
//! built-in defaults. A missing API key is the one startup precondition
//! of the whole program and is reported before any session starts.

use anyhow::{bail, Result};

/// Hosted API base. Endpoint paths are joined onto this.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model. The `models/` prefix is part of the REST resource name
/// and keeping it avoids a 404 on tenants that require the full path.
pub const DEFAULT_MODEL: &str = "models/gemini-3-flash";

#[derive(Debug, Clone)]
pub struct GenConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl GenConfig {
    /// Resolve configuration from the environment, with an optional model
    /// override from the CLI.
    pub fn from_env(model_override: Option<String>) -> Result<Self> {
        let api_key = read_var("BITEBOT_API_KEY")
            .or_else(|| read_var("GEMINI_API_KEY"));
        let Some(api_key) = api_key else {
            bail!(
                "Missing API key: set BITEBOT_API_KEY (or GEMINI_API_KEY) \
                 to use the hosted generation service."
            );
        };

        let base_url = read_var("BITEBOT_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = model_override
            .filter(|m| !m.trim().is_empty())
            .or_else(|| read_var("BITEBOT_MODEL"))
            .map(|m| normalize_model(&m))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self {
            api_key,
            base_url,
            model,
        })
    }
}

fn read_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Accept model names with or without the `models/` resource prefix.
pub fn normalize_model(model: &str) -> String {
    let model = model.trim();
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{}", model)
    }
}
