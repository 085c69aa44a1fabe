//! Data model for quiz modules, sessions, and the public wire types.
//!
//! Wire field names mirror the original client contract (`quizSessionId`,
//! `isComplete`, `recommendedPath`, `jobPostings`), so the existing frontend
//! keeps working unchanged.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::CareerAnalysis;
use crate::jobs::Job;

/// Sentinel value in `next_question` marking the end of the graph walk.
pub const END_OF_QUIZ: &str = "END";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizOption {
    pub id: String,
    pub text: String,
}

/// A node in the question graph. `next_question` maps each option id to the
/// next question id or `"END"`; `interest_tags` maps each option id to the
/// interest tags that answer implies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: String,
    pub text: String,
    pub options: Vec<QuizOption>,
    pub next_question: BTreeMap<String, String>,
    pub interest_tags: BTreeMap<String, Vec<String>>,
}

/// A static question graph for one domain ("tech", "creative", "business").
/// Loaded once at startup, read-only at serving time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizModule {
    pub name: String,
    /// Keywords driving module selection from the user's stated interests.
    pub keywords: Vec<String>,
    pub start_question_id: String,
    pub questions: BTreeMap<String, QuizQuestion>,
}

impl QuizModule {
    pub fn question(&self, id: &str) -> Option<&QuizQuestion> {
        self.questions.get(id)
    }
}

/// Per-user progress through a module. Owned exclusively by the session store;
/// single-writer, last-write-wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSession {
    pub id: Uuid,
    pub module_id: String,
    pub current_question_id: String,
    pub interests: BTreeSet<String>,
    pub answers: BTreeMap<String, String>,
    pub last_activity: DateTime<Utc>,
}

impl QuizSession {
    pub fn new(module_id: &str, start_question_id: &str, interests: &[String]) -> Self {
        Self {
            id: Uuid::new_v4(),
            module_id: module_id.to_string(),
            current_question_id: start_question_id.to_string(),
            interests: interests.iter().cloned().collect(),
            answers: BTreeMap::new(),
            last_activity: Utc::now(),
        }
    }
}

// ── Wire types ──────────────────────────────────────────────────────────────

/// Body of POST /api/quiz/start.
#[derive(Debug, Deserialize)]
pub struct StartQuizRequest {
    pub interests: Option<Vec<String>>,
}

/// Body of POST /api/quiz/next. Fields are optional so missing keys surface
/// as a 400 validation error instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextQuestionRequest {
    pub quiz_session_id: Option<Uuid>,
    pub question_id: Option<String>,
    pub answer_id: Option<String>,
}

/// Response for both quiz endpoints: either the next question (continue) or
/// the final recommendation (complete).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResponse {
    pub quiz_session_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuizQuestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_complete: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_path: Option<CareerAnalysis>,
    pub job_postings: Vec<Job>,
}

impl QuizResponse {
    pub fn next_question(session_id: Uuid, question: QuizQuestion) -> Self {
        Self {
            quiz_session_id: session_id,
            question: Some(question),
            is_complete: None,
            recommended_path: None,
            job_postings: Vec::new(),
        }
    }

    pub fn complete(session_id: Uuid, analysis: CareerAnalysis, job_postings: Vec<Job>) -> Self {
        Self {
            quiz_session_id: session_id,
            question: None,
            is_complete: Some(true),
            recommended_path: Some(analysis),
            job_postings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiz_response_wire_field_names() {
        let session_id = Uuid::new_v4();
        let question = QuizQuestion {
            id: "q1".to_string(),
            text: "Pick one".to_string(),
            options: vec![QuizOption {
                id: "A".to_string(),
                text: "First".to_string(),
            }],
            next_question: BTreeMap::from([("A".to_string(), END_OF_QUIZ.to_string())]),
            interest_tags: BTreeMap::new(),
        };

        let value =
            serde_json::to_value(QuizResponse::next_question(session_id, question)).unwrap();
        assert!(value.get("quizSessionId").is_some());
        assert!(value.get("jobPostings").is_some());
        assert!(value.get("isComplete").is_none());
        assert!(value.get("recommendedPath").is_none());
    }

    #[test]
    fn test_next_request_accepts_missing_fields() {
        let request: NextQuestionRequest = serde_json::from_str("{}").unwrap();
        assert!(request.quiz_session_id.is_none());
        assert!(request.question_id.is_none());
        assert!(request.answer_id.is_none());
    }
}
