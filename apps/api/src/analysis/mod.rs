//! Career analysis generation — builds the recommendation prompt from
//! interests plus retrieved context and parses the model's JSON into a fixed
//! schema.
//!
//! Behind a trait (`Arc<dyn AnalysisGenerator>` in `AppState`) so the quiz
//! service can be exercised without a live model.

pub mod prompts;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analysis::prompts::{build_analysis_prompt, ANALYSIS_SYSTEM, JSON_ONLY_REMINDER};
use crate::errors::AppError;
use crate::llm_client::{strip_json_fences, GeminiClient, GeminiError};

// ── Data model (wire format is camelCase, matching the original client) ─────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerAnalysis {
    pub recommended_career: String,
    pub career_overview: String,
    pub skill_gap_analysis: SkillGapAnalysis,
    pub career_roadmap: CareerRoadmap,
    pub learning_resources: LearningResources,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillGapAnalysis {
    pub required_technical_skills: Vec<String>,
    pub required_soft_skills: Vec<String>,
    pub user_current_strengths: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerRoadmap {
    pub entry_level: RoadmapLevel,
    pub mid_level: RoadmapLevel,
    pub senior_level: RoadmapLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapLevel {
    pub title: String,
    pub description: String,
    pub skills_to_acquire: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningResources {
    pub courses: Vec<String>,
    pub certifications: Vec<String>,
    pub books_or_articles: Vec<String>,
}

// ── Generator seam ──────────────────────────────────────────────────────────

#[async_trait]
pub trait AnalysisGenerator: Send + Sync {
    /// Produces a career analysis from interests and retrieved context.
    /// Fails with `InsufficientContext` when `context_docs` is empty — the
    /// model is never invoked without grounding material.
    async fn generate(
        &self,
        interests: &[String],
        context_docs: &[String],
    ) -> Result<CareerAnalysis, AppError>;
}

/// Gemini-backed generator. Output is model-sampled and non-deterministic;
/// only the schema shape is guaranteed.
pub struct GeminiAnalysisGenerator {
    llm: GeminiClient,
}

impl GeminiAnalysisGenerator {
    pub fn new(llm: GeminiClient) -> Self {
        Self { llm }
    }

    async fn call_model(&self, prompt: &str) -> Result<String, AppError> {
        self.llm
            .generate(prompt, ANALYSIS_SYSTEM)
            .await
            .map_err(map_gemini_error)
    }
}

#[async_trait]
impl AnalysisGenerator for GeminiAnalysisGenerator {
    async fn generate(
        &self,
        interests: &[String],
        context_docs: &[String],
    ) -> Result<CareerAnalysis, AppError> {
        if context_docs.is_empty() {
            return Err(AppError::InsufficientContext);
        }

        let prompt = build_analysis_prompt(interests, context_docs);
        let text = self.call_model(&prompt).await?;

        match parse_analysis(&text) {
            Ok(analysis) => Ok(analysis),
            Err(first_raw) => {
                // One bounded retry with a JSON-only reminder. A misbehaving
                // model must not put us in a repair loop.
                warn!("Career analysis was not valid JSON, retrying once: {first_raw}");
                let retry_prompt = format!("{prompt}{JSON_ONLY_REMINDER}");
                let retry_text = self.call_model(&retry_prompt).await?;
                parse_analysis(&retry_text).map_err(AppError::MalformedResponse)
            }
        }
    }
}

fn parse_analysis(text: &str) -> Result<CareerAnalysis, String> {
    let stripped = strip_json_fences(text);
    match serde_json::from_str::<CareerAnalysis>(stripped) {
        Ok(analysis) => {
            info!(
                "Career analysis generated: {}",
                analysis.recommended_career
            );
            Ok(analysis)
        }
        Err(_) => Err(text.to_string()),
    }
}

fn map_gemini_error(e: GeminiError) -> AppError {
    match e {
        GeminiError::EmptyContent => AppError::EmptyGeneration,
        GeminiError::RateLimited { retries } => AppError::RateLimitExceeded { retries },
        other => AppError::ExternalService(other.to_string()),
    }
}
