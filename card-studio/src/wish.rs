//! Wish generation via the hosted Gemini `generateContent` endpoint.
//!
//! Every failure is absorbed: callers always receive a usable wish, the
//! fallback sentence when the service cannot provide one.

use std::time::Duration;

use async_trait::async_trait;
use card_core::{UserInfo, CAMPAIGN_YEAR, FALLBACK_WISH, FILENAME_PREFIX};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Default Gemini API host.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Default model name.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

const TEMPERATURE: f32 = 0.1;

/// Upper bound on one wish request, connection through body.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Errors that can occur when requesting a wish.
#[derive(Debug, Error)]
pub enum WishError {
    /// No API key was configured.
    #[error("no API key configured")]
    MissingApiKey,
    /// The endpoint URL is invalid.
    #[error("invalid wish endpoint URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed (connection, status, body).
    #[error("wish request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The service replied without any text.
    #[error("wish response contained no text")]
    EmptyResponse,
}

/// Source of wish text for a card.
#[async_trait]
pub trait WishProvider: Send + Sync {
    /// Produce a wish for `user`. Never fails; falls back to [`FALLBACK_WISH`].
    async fn generate_wish(&self, user: &UserInfo) -> String;
}

/// Provider that always returns the same text.
#[derive(Debug, Clone)]
pub struct StaticWish(pub String);

impl Default for StaticWish {
    fn default() -> Self {
        Self(FALLBACK_WISH.to_string())
    }
}

#[async_trait]
impl WishProvider for StaticWish {
    async fn generate_wish(&self, _user: &UserInfo) -> String {
        self.0.clone()
    }
}

/// Gemini REST client.
#[derive(Clone)]
pub struct GeminiWishProvider {
    http: Client,
    endpoint: Url,
    model: String,
    api_key: Option<String>,
}

impl GeminiWishProvider {
    /// Create a client for `endpoint` and `model`.
    ///
    /// Requests that take longer than 15 seconds are abandoned.
    ///
    /// # Errors
    ///
    /// Returns [`WishError::InvalidUrl`] if the endpoint is malformed.
    /// Returns [`WishError::Http`] if the HTTP client fails to build.
    pub fn new(
        endpoint: &str,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, WishError> {
        Self::with_timeout(endpoint, model, api_key, REQUEST_TIMEOUT)
    }

    fn with_timeout(
        endpoint: &str,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, WishError> {
        let endpoint = Url::parse(endpoint).map_err(|e| WishError::InvalidUrl(e.to_string()))?;
        let http = Client::builder()
            .user_agent(concat!("card-studio/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .no_proxy()
            .build()?;

        Ok(Self {
            http,
            endpoint,
            model: model.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    /// Request a wish, surfacing errors.
    ///
    /// # Errors
    ///
    /// Returns an error if no key is configured, the request fails, or the
    /// reply contains no text.
    pub async fn request_wish(&self, user: &UserInfo) -> Result<String, WishError> {
        let api_key = self.api_key.as_deref().ok_or(WishError::MissingApiKey)?;
        let url = self.generate_url()?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(build_prompt(&user.name)),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
            },
        };

        tracing::debug!(model = %self.model, "requesting wish");
        let response: GenerateContentResponse = self
            .http
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let text = response.text();
        if text.is_empty() {
            return Err(WishError::EmptyResponse);
        }
        Ok(text)
    }

    fn generate_url(&self) -> Result<Url, WishError> {
        let path = format!("v1beta/models/{}:generateContent", self.model);
        let mut base = self.endpoint.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(&path)
            .map_err(|e| WishError::InvalidUrl(e.to_string()))
    }
}

#[async_trait]
impl WishProvider for GeminiWishProvider {
    async fn generate_wish(&self, user: &UserInfo) -> String {
        match self.request_wish(user).await {
            Ok(wish) => wish,
            Err(e) => {
                tracing::warn!(error = %e, "wish generation failed, using fallback");
                FALLBACK_WISH.to_string()
            }
        }
    }
}

/// Prompt asking the model to return the campaign sentence verbatim.
#[must_use]
pub fn build_prompt(name: &str) -> String {
    format!(
        "Create a professional New Year {CAMPAIGN_YEAR} message for {name} at {FILENAME_PREFIX} AGENCY. \
         The message MUST be exactly: \"{FALLBACK_WISH}\" Return ONLY this text."
    )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, trimmed.
    fn text(&self) -> String {
        self.candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}
