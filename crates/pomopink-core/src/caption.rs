//! Motivational caption client.
//!
//! [`CaptionClient::request_caption`] always resolves to a display string:
//! - inside the cooldown window it returns a canned line without calling out
//! - HTTP 429 returns the rate-limit line immediately, no retries
//! - other failures retry with exponential backoff, then fall back
//!
//! The cooldown timestamp is persisted and only advanced by a successful
//! call, so it is shared by every process using the same store.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use thiserror::Error;

use crate::clock::Clock;
use crate::storage::{keys, load_json, save_json, CaptionConfig, PersistentStore};

/// Shown before the first caption arrives.
pub const INITIAL_CAPTION: &str = "Let's make today wonderful! ✨";
/// Used when the service answers without text.
pub const EMPTY_RESPONSE_CAPTION: &str = "You're doing amazing! Keep going! ✨";
pub const RATE_LIMITED_CAPTION: &str = "Taking a tiny breather... check back in a bit! ✨";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptionError {
    #[error("rate limited by caption service")]
    RateLimited,

    #[error("caption request failed: {0}")]
    Transient(String),

    #[error("no API key in ${0}")]
    MissingApiKey(String),
}

/// One text-generation round trip.
pub trait CaptionTransport: Send + Sync {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, CaptionError>> + Send;
}

/// Gemini `generateContent` over HTTPS.
pub struct GeminiTransport {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
    temperature: f64,
}

impl GeminiTransport {
    /// Build from configuration, reading the API key from the configured
    /// environment variable.
    pub fn from_config(config: &CaptionConfig) -> Result<Self, CaptionError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: &CaptionConfig, api_key: Option<String>) -> Result<Self, CaptionError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CaptionError::Transient(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            api_key_env: config.api_key_env.clone(),
            temperature: config.temperature,
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

impl CaptionTransport for GeminiTransport {
    async fn generate(&self, prompt: &str) -> Result<String, CaptionError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| CaptionError::MissingApiKey(self.api_key_env.clone()))?;

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": self.temperature },
        });

        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CaptionError::Transient(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CaptionError::RateLimited);
        }
        if !status.is_success() {
            return Err(CaptionError::Transient(format!("HTTP {status}")));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CaptionError::Transient(e.to_string()))?;
        Ok(response_text(&payload).unwrap_or_else(|| EMPTY_RESPONSE_CAPTION.to_string()))
    }
}

/// Concatenated text parts of the first candidate.
pub fn response_text(payload: &serde_json::Value) -> Option<String> {
    let parts = payload["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

pub struct CaptionClient<T> {
    transport: T,
    store: Arc<dyn PersistentStore>,
    clock: Arc<dyn Clock>,
    enabled: bool,
    cooldown_ms: u64,
    max_retries: u32,
    retry_base_ms: u64,
}

impl<T: CaptionTransport> CaptionClient<T> {
    pub fn new(
        transport: T,
        store: Arc<dyn PersistentStore>,
        clock: Arc<dyn Clock>,
        config: &CaptionConfig,
    ) -> Self {
        Self {
            transport,
            store,
            clock,
            enabled: config.enabled,
            cooldown_ms: config.cooldown_secs.saturating_mul(1000),
            max_retries: config.max_retries,
            retry_base_ms: config.retry_base_ms,
        }
    }

    /// Time until the next network call is allowed.
    pub fn cooldown_remaining_ms(&self) -> u64 {
        let Some(last) = self.last_success_ms() else {
            return 0;
        };
        let elapsed = self.clock.now_ms().saturating_sub(last);
        self.cooldown_ms.saturating_sub(elapsed)
    }

    /// Caption for someone with `pending_tasks` tasks left. Never fails.
    pub async fn request_caption(&self, pending_tasks: usize) -> String {
        if !self.enabled {
            return INITIAL_CAPTION.to_string();
        }
        if self.cooldown_remaining_ms() > 0 {
            tracing::debug!("caption request skipped: cooldown active");
            return cooldown_caption(pending_tasks).to_string();
        }

        let prompt = build_prompt(pending_tasks);
        let mut attempt: u32 = 0;
        loop {
            match self.transport.generate(&prompt).await {
                Ok(text) => {
                    let text = if pending_tasks == 0 {
                        strip_trailing_emoji(&text)
                    } else {
                        text
                    };
                    self.record_success();
                    return text;
                }
                Err(CaptionError::RateLimited) => {
                    tracing::warn!("caption service rate limit hit (429)");
                    return RATE_LIMITED_CAPTION.to_string();
                }
                Err(e @ CaptionError::MissingApiKey(_)) => {
                    tracing::warn!(error = %e, "caption service not configured");
                    return failure_caption(pending_tasks).to_string();
                }
                Err(e) if attempt < self.max_retries => {
                    let delay = self.retry_base_ms.saturating_mul(1u64 << attempt.min(16));
                    tracing::debug!(attempt, delay_ms = delay, error = %e, "retrying caption request");
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::warn!(error = %e, attempts = attempt + 1, "caption request failed after retries");
                    return failure_caption(pending_tasks).to_string();
                }
            }
        }
    }

    fn last_success_ms(&self) -> Option<u64> {
        load_json(self.store.as_ref(), keys::LAST_CAPTION_TS).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not read caption cooldown");
            None
        })
    }

    fn record_success(&self) {
        if let Err(e) = save_json(self.store.as_ref(), keys::LAST_CAPTION_TS, &self.clock.now_ms()) {
            tracing::warn!(error = %e, "could not persist caption cooldown");
        }
    }
}

pub fn build_prompt(pending_tasks: usize) -> String {
    let emoji_instruction = if pending_tasks == 0 {
        "Do NOT use any emojis at the end of the sentence."
    } else {
        "Use cute emojis like ✨, 💖, or 🍓 at the end."
    };
    format!(
        "Give me a very short, cute, and encouraging motivational message (under 12 words) \
         for someone using a Pomodoro timer. They have {pending_tasks} tasks left. {emoji_instruction}"
    )
}

pub fn cooldown_caption(pending_tasks: usize) -> &'static str {
    if pending_tasks == 0 {
        "You're all caught up! Enjoy the peace."
    } else {
        "Keep up the great momentum! 💖"
    }
}

pub fn failure_caption(pending_tasks: usize) -> &'static str {
    if pending_tasks == 0 {
        "Rest well, you've earned it."
    } else {
        "You've got this, superstar! 💖"
    }
}

/// Drop emoji (and the whitespace between them) from the end of `text`.
pub fn strip_trailing_emoji(text: &str) -> String {
    text.trim_end_matches(|c: char| is_emoji(c) || c.is_whitespace())
        .to_string()
}

fn is_emoji(c: char) -> bool {
    matches!(
        c as u32,
        0x1F600..=0x1F64F
            | 0x1F300..=0x1F5FF
            | 0x1F680..=0x1F6FF
            | 0x2600..=0x26FF
            | 0x2700..=0x27BF
            | 0x1F900..=0x1F9FF
            | 0x1F1E0..=0x1F1FF
            | 0xFE0F
            | 0x200D
    )
}
