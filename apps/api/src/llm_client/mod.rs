/// Gemini client — the single point of entry for all Google Generative Language
/// API calls (text generation and embeddings).
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// All model interactions MUST go through this module.
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The generative model used for career analysis.
/// Intentionally hardcoded to prevent accidental drift.
pub const GENERATION_MODEL: &str = "gemini-2.5-flash";
/// The embedding model backing knowledge retrieval.
pub const EMBEDDING_MODEL: &str = "text-embedding-004";
/// Dimensionality of `EMBEDDING_MODEL` vectors. The knowledge index is built
/// with this dimension; a mismatch means the wrong model was called.
pub const EMBEDDING_DIMENSIONS: usize = 768;
const MAX_OUTPUT_TOKENS: u32 = 4096;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} attempts")]
    RateLimited { retries: u32 },

    #[error("Model returned empty content")]
    EmptyContent,

    #[error("Embedding has wrong dimension: expected {expected}, got {actual}")]
    BadEmbeddingDimension { expected: usize, actual: usize },
}

// ── Wire types: generateContent ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}

// ── Wire types: embedContent ────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    content: Content<'a>,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// The single Gemini client shared by the generation and retrieval pipelines.
/// Wraps generateContent / embedContent with bounded retry and jittered backoff.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            base_url: API_BASE.to_string(),
        }
    }

    /// Points the client at a mock server.
    #[cfg(test)]
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let mut client = Self::new(api_key);
        client.base_url = base_url;
        client
    }

    /// Generates text from a user prompt plus a system instruction.
    /// Retries 429 / 5xx / transport errors with jittered exponential backoff,
    /// up to `MAX_RETRIES` attempts.
    pub async fn generate(&self, prompt: &str, system: &str) -> Result<String, GeminiError> {
        let url = format!(
            "{}/{GENERATION_MODEL}:generateContent?key={}",
            self.base_url, self.api_key
        );
        let request_body = GenerateRequest {
            system_instruction: Content {
                parts: vec![Part { text: system }],
            },
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let response: GenerateResponse = self.post_with_retry(&url, &request_body).await?;

        if let Some(usage) = &response.usage_metadata {
            debug!(
                "Gemini call succeeded: prompt_tokens={:?}, output_tokens={:?}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        let text = response
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(GeminiError::EmptyContent);
        }

        Ok(text)
    }

    /// Embeds a single query string, validating the vector dimension.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, GeminiError> {
        let url = format!(
            "{}/{EMBEDDING_MODEL}:embedContent?key={}",
            self.base_url, self.api_key
        );
        let request_body = EmbedRequest {
            content: Content {
                parts: vec![Part { text }],
            },
        };

        let response: EmbedResponse = self.post_with_retry(&url, &request_body).await?;
        let values = response.embedding.values;

        if values.len() != EMBEDDING_DIMENSIONS {
            return Err(GeminiError::BadEmbeddingDimension {
                expected: EMBEDDING_DIMENSIONS,
                actual: values.len(),
            });
        }

        Ok(values)
    }

    async fn post_with_retry<B, T>(&self, url: &str, body: &B) -> Result<T, GeminiError>
    where
        B: Serialize,
        T: serde::de::DeserializeOwned,
    {
        let mut last_error: Option<GeminiError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = backoff_delay(attempt);
                warn!(
                    "Gemini call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self.client.post(url).json(body).send().await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(GeminiError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Gemini API returned {}: {}", status, body);
                last_error = Some(GeminiError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(GeminiError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            return Ok(response.json::<T>().await?);
        }

        // Exhausted: a final 429 means the provider is throttling us, which
        // callers treat differently from an ordinary upstream failure.
        Err(match last_error {
            Some(GeminiError::Api { status: 429, .. }) | None => GeminiError::RateLimited {
                retries: MAX_RETRIES,
            },
            Some(other) => other,
        })
    }
}

/// Exponential backoff (1s, 2s, 4s...) with up to 250ms of uniform jitter so
/// concurrent sessions do not retry in lockstep.
fn backoff_delay(attempt: u32) -> std::time::Duration {
    let base_ms = 1000u64 * (1 << (attempt - 1));
    let jitter_ms = rand::thread_rng().gen_range(0..250);
    std::time::Duration::from_millis(base_ms + jitter_ms)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
