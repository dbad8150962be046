//! HTTP client for the hosted generation service.

use anyhow::{anyhow, bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::Rng;
use reqwest::{Client, StatusCode};
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error};
use url::Url;
use uuid::Uuid;

use super::types::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    InlineData, ListModelsResponse, ModelInfo, Part,
};
use crate::config::GenConfig;
use crate::error::Error;

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Timeout for generation requests. Multimodal generation with an image
/// attached can take well over a minute.
const GENERATE_TIMEOUT_SECS: u64 = 120;

/// Timeout for the models listing (short, for quick validation)
const LIST_MODELS_TIMEOUT_SECS: u64 = 10;

/// Retry schedule: 3 retries with exponential backoff from 1s, plus up
/// to 25% jitter.
const MAX_RETRIES: usize = 3;
const RETRY_BASE_DELAY_SECS: u64 = 1;
const RETRY_JITTER_DIVISOR: u128 = 4;

fn is_retriable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::REQUEST_TIMEOUT
            | StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

fn is_retriable_send_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

/// Backoff for the given attempt, jitter included.
fn backoff_delay(attempt: usize) -> Duration {
    let multiplier = 1u64.checked_shl(attempt as u32).unwrap_or(u64::MAX);
    let base = Duration::from_secs(RETRY_BASE_DELAY_SECS.saturating_mul(multiplier));

    let max_jitter_ms = base.as_millis() / RETRY_JITTER_DIVISOR;
    if max_jitter_ms == 0 {
        return base;
    }
    let max_jitter_ms = std::cmp::min(max_jitter_ms, u128::from(u64::MAX)) as u64;
    let jitter_ms = rand::thread_rng().gen_range(0..=max_jitter_ms);
    base + Duration::from_millis(jitter_ms)
}

async fn send_with_retry(
    mut make_request: impl FnMut() -> reqwest::RequestBuilder,
) -> Result<reqwest::Response> {
    let max_attempts = MAX_RETRIES + 1;

    for attempt in 0..max_attempts {
        match make_request().send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() || !is_retriable_status(status) || attempt == MAX_RETRIES {
                    return Ok(response);
                }

                let delay = backoff_delay(attempt);
                debug!(
                    "request failed with status {}; retrying in {:?} (attempt {}/{})",
                    status,
                    delay,
                    attempt + 1,
                    max_attempts
                );
                let _ = response.bytes().await;
                sleep(delay).await;
            }
            Err(err) => {
                if !is_retriable_send_error(&err) || attempt == MAX_RETRIES {
                    return Err(anyhow::Error::new(err)).with_context(|| {
                        format!("HTTP request failed after {} attempt(s)", attempt + 1)
                    });
                }

                let delay = backoff_delay(attempt);
                debug!(
                    "request error: {}; retrying in {:?} (attempt {}/{})",
                    err,
                    delay,
                    attempt + 1,
                    max_attempts
                );
                sleep(delay).await;
            }
        }
    }

    unreachable!("send_with_retry should have returned within max_attempts")
}

/// Client for the hosted generation API.
pub struct GenerationClient {
    client: Client,
    config: GenConfig,
    user_agent: String,
    session_id: String,
}

impl GenerationClient {
    pub fn new(config: GenConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            config,
            user_agent: format!("bitebot.cli/{}", env!("CARGO_PKG_VERSION")),
            session_id: Uuid::new_v4().to_string(),
        }
    }

    /// The model resource this client sends generations to.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Build a full endpoint URL with the API key attached as a query
    /// parameter, the way the hosted API authenticates.
    fn endpoint(&self, path: &str) -> Result<Url> {
        let base = Url::parse(&self.config.base_url)
            .with_context(|| format!("Invalid base URL: {}", self.config.base_url))?;
        let mut url = base
            .join(&format!("v1beta/{}", path))
            .with_context(|| format!("Failed to build URL for endpoint: {}", path))?;
        url.query_pairs_mut().append_pair("key", &self.config.api_key);
        Ok(url)
    }

    /// Send one generation request and return the raw response text.
    ///
    /// The returned string is the model's candidate text with any
    /// markdown code fences stripped — hosted models wrap JSON in fences
    /// even when asked not to. Interpreting the text is the batch
    /// parser's job, not ours.
    pub async fn generate(
        &self,
        prompt: &str,
        image: Option<InlineData>,
    ) -> Result<String, Error> {
        let mut parts = vec![Part::text(prompt)];
        if let Some(data) = image {
            parts.push(Part::image(data));
        }

        let body = GenerateContentRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        let url = self
            .endpoint(&format!("{}:generateContent", self.config.model))
            .map_err(Error::GenerationService)?;
        let request_id = Uuid::new_v4().to_string();

        debug!("=== Generation Request ===");
        debug!("Model: {}", self.config.model);
        debug!("Timeout: {}s", GENERATE_TIMEOUT_SECS);

        let response = send_with_retry(|| {
            self.client
                .post(url.clone())
                .timeout(Duration::from_secs(GENERATE_TIMEOUT_SECS))
                .header("User-Agent", &self.user_agent)
                .header("x-request-id", &request_id)
                .header("x-request-session-id", &self.session_id)
                .json(&body)
        })
        .await
        .map_err(Error::GenerationService)?;

        let status = response.status();
        debug!("=== Generation Response ===");
        debug!("Status: {}", status);

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Generation request failed with status {}", status);
            return Err(Error::GenerationService(anyhow!(
                "generation request failed with status {}: {}",
                status,
                error_text
            )));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| Error::GenerationService(anyhow!(e)))?;
        let parsed: GenerateContentResponse = serde_json::from_str(&response_text)
            .map_err(|e| Error::MalformedResponse(format!("invalid response envelope: {}", e)))?;

        let text = extract_text(parsed).ok_or_else(|| {
            Error::MalformedResponse("response contained no text candidates".to_string())
        })?;

        Ok(strip_code_fences(&text).to_string())
    }

    /// List available models. Used to validate the key and connectivity
    /// for `bitebot status`, never for model selection.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = self.endpoint("models")?;

        let response = send_with_retry(|| {
            self.client
                .get(url.clone())
                .timeout(Duration::from_secs(LIST_MODELS_TIMEOUT_SECS))
                .header("User-Agent", &self.user_agent)
                .header("x-request-session-id", &self.session_id)
        })
        .await
        .context("Failed to reach the generation service")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            bail!("models listing failed with status {}: {}", status, error_text);
        }

        let listing: ListModelsResponse = response
            .json()
            .await
            .context("Failed to parse models listing")?;
        Ok(listing.models)
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(response: GenerateContentResponse) -> Option<String> {
    let Candidate { content } = response.candidates.into_iter().next()?;
    let text: String = content?
        .parts
        .into_iter()
        .filter_map(|part| part.text)
        .collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Drop a surrounding markdown code fence (with optional info string),
/// leaving bare payload text.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    match rest.strip_suffix("```") {
        Some(inner) => inner.trim(),
        None => rest.trim(),
    }
}

/// Read an image file into an inline payload for the request body.
pub fn read_image(path: &Path) -> Result<InlineData> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let mime_type = match mime_for_extension(&extension) {
        Some(mime) => mime.to_string(),
        None => bail!(
            "Unsupported image type {:?} for {}: use jpg, jpeg or png",
            extension,
            path.display()
        ),
    };

    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read image file: {}", path.display()))?;

    Ok(InlineData {
        mime_type,
        data: STANDARD.encode(bytes),
    })
}

fn mime_for_extension(extension: &str) -> Option<&'static str> {
    match extension {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}
