use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Raw answer from the generation boundary: status code plus body text.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }
}

/// One request/response exchange with the text-generation service.
///
/// An `Err` means the exchange itself failed (connection, TLS, timeout);
/// every HTTP status, including errors, comes back as `Ok`.
#[async_trait]
pub trait GenerationTransport: Send + Sync {
    async fn send(&self, model: &str, api_key: &str, prompt: &str) -> Result<TransportResponse>;
}

/// Gemini `generateContent` request structures
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContent,
}

/// Success payload of a `generateContent` call.
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiResponseBody {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

impl GeminiResponseBody {
    pub fn parse(body: &str) -> Result<Self> {
        serde_json::from_str(body)
            .map_err(|e| anyhow::anyhow!("Failed to parse Gemini response: {}", e))
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// Text of the first part of the first candidate, `None` when there are no candidates.
    pub fn first_candidate_text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        Some(
            candidate
                .content
                .parts
                .first()
                .map(|part| part.text.clone())
                .unwrap_or_default(),
        )
    }
}

/// Gemini transport over reqwest
#[derive(Debug, Clone)]
pub struct GeminiTransport {
    client: Client,
    base_url: String,
}

impl GeminiTransport {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url
                .unwrap_or_else(|| "https://generativelanguage.googleapis.com/v1beta".to_string())
                .trim_end_matches('/')
                .to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl GenerationTransport for GeminiTransport {
    async fn send(&self, model: &str, api_key: &str, prompt: &str) -> Result<TransportResponse> {
        let request_body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        debug!(
            provider = "Gemini",
            model = %model,
            base_url = %self.base_url,
            prompt_length = prompt.len(),
            "Sending generation request"
        );

        // Key goes in a header so it never shows up in a request URL or its errors.
        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());

        Ok(TransportResponse { status, body })
    }
}
