//! Axum route handlers for the quiz API.

use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::quiz::models::{NextQuestionRequest, QuizResponse, StartQuizRequest};
use crate::quiz::service;
use crate::state::AppState;

/// POST /api/quiz/start
///
/// Starts a session from the user's stated interests and returns the first
/// question of the best-matching module.
pub async fn handle_start_quiz(
    State(state): State<AppState>,
    Json(request): Json<StartQuizRequest>,
) -> Result<Json<QuizResponse>, AppError> {
    let interests = request.interests.unwrap_or_default();
    if interests.is_empty() {
        return Err(AppError::Validation(
            "Please provide a non-empty array of interests.".to_string(),
        ));
    }

    let response = service::start_quiz(state.sessions.as_ref(), &state.modules, interests).await?;
    Ok(Json(response))
}

/// POST /api/quiz/next
///
/// Records an answer and returns either the next question or, on reaching the
/// end of the graph, the final career analysis with matched job postings.
pub async fn handle_next_question(
    State(state): State<AppState>,
    Json(request): Json<NextQuestionRequest>,
) -> Result<Json<QuizResponse>, AppError> {
    let (Some(session_id), Some(question_id), Some(answer_id)) = (
        request.quiz_session_id,
        request.question_id,
        request.answer_id,
    ) else {
        return Err(AppError::Validation(
            "Please provide quizSessionId, questionId, and answerId.".to_string(),
        ));
    };

    let response = service::process_answer(
        state.sessions.as_ref(),
        &state.modules,
        state.retriever.as_ref(),
        state.generator.as_ref(),
        &state.jobs,
        session_id,
        &question_id,
        &answer_id,
    )
    .await?;

    Ok(Json(response))
}
