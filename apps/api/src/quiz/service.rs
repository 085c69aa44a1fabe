//! Quiz service — the session lifecycle driving the recommendation pipeline.
//!
//! Flow: start → answer (loops) → END → retrieve context → generate analysis →
//! match job postings → delete session → final response.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::analysis::AnalysisGenerator;
use crate::errors::AppError;
use crate::jobs::JobSearchClient;
use crate::quiz::interests::aggregate;
use crate::quiz::models::{QuizResponse, QuizSession};
use crate::quiz::registry::ModuleRegistry;
use crate::quiz::session::SessionStore;
use crate::quiz::walker::{advance, Step};
use crate::retrieval::ContextRetriever;

/// Starts a new quiz session pinned to the best-matching module and returns
/// its start question.
pub async fn start_quiz(
    store: &dyn SessionStore,
    registry: &ModuleRegistry,
    interests: Vec<String>,
) -> Result<QuizResponse, AppError> {
    let module = registry.select(&interests);
    let session = QuizSession::new(&module.name, &module.start_question_id, &interests);

    store.create(&session).await?;
    info!(
        "Started quiz session {} on module '{}'",
        session.id, module.name
    );

    let question = module
        .question(&module.start_question_id)
        .cloned()
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Start question '{}' not found in module '{}'",
                module.start_question_id, module.name
            ))
        })?;

    Ok(QuizResponse::next_question(session.id, question))
}

/// Records an answer and advances the session. Reaching `"END"` runs the
/// completion pipeline — context retrieval, analysis generation, job search,
/// each strictly after the last — then deletes the session.
pub async fn process_answer(
    store: &dyn SessionStore,
    registry: &ModuleRegistry,
    retriever: &dyn ContextRetriever,
    generator: &dyn AnalysisGenerator,
    jobs: &JobSearchClient,
    session_id: Uuid,
    question_id: &str,
    answer_id: &str,
) -> Result<QuizResponse, AppError> {
    let mut session = store.get(session_id).await?;

    let module = registry.get(&session.module_id).ok_or_else(|| {
        AppError::NotFound(format!("Module '{}' not found", session.module_id))
    })?;

    let question = module.question(question_id).ok_or_else(|| {
        AppError::NotFound(format!(
            "Question '{question_id}' not found in module '{}'",
            module.name
        ))
    })?;
    let step = advance(module, question_id, answer_id)?;

    session
        .answers
        .insert(question_id.to_string(), answer_id.to_string());
    if let Some(tags) = question.interest_tags.get(answer_id) {
        session.interests = aggregate(&session.interests, tags);
    }

    match step {
        Step::Next(next_question_id) => {
            let next_question = module
                .question(&next_question_id)
                .cloned()
                .ok_or_else(|| {
                    AppError::NotFound(format!("Question '{next_question_id}' not found"))
                })?;

            session.current_question_id = next_question_id;
            session.last_activity = Utc::now();
            store.save(&session).await?;

            Ok(QuizResponse::next_question(session.id, next_question))
        }
        Step::Terminal => {
            let interests: Vec<String> = session.interests.iter().cloned().collect();
            info!(
                "Session {} complete, generating analysis for interests: {}",
                session.id,
                interests.join(", ")
            );

            let context_docs = retriever.retrieve(&interests).await;
            let analysis = generator.generate(&interests, &context_docs).await?;
            let job_postings = jobs
                .find_jobs(
                    &analysis.recommended_career,
                    &analysis.skill_gap_analysis.required_technical_skills,
                )
                .await;

            store.delete(session.id).await?;

            Ok(QuizResponse::complete(session.id, analysis, job_postings))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::analysis::{
        CareerAnalysis, CareerRoadmap, LearningResources, RoadmapLevel, SkillGapAnalysis,
    };
    use crate::quiz::session::memory::InMemorySessionStore;

    struct StubRetriever {
        documents: Vec<String>,
    }

    #[async_trait]
    impl ContextRetriever for StubRetriever {
        async fn retrieve(&self, _tags: &[String]) -> Vec<String> {
            self.documents.clone()
        }
    }

    struct StubGenerator {
        seen_interests: Mutex<Vec<String>>,
    }

    impl StubGenerator {
        fn new() -> Self {
            Self {
                seen_interests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AnalysisGenerator for StubGenerator {
        async fn generate(
            &self,
            interests: &[String],
            context_docs: &[String],
        ) -> Result<CareerAnalysis, AppError> {
            if context_docs.is_empty() {
                return Err(AppError::InsufficientContext);
            }
            *self.seen_interests.lock().unwrap() = interests.to_vec();
            Ok(fixture_analysis())
        }
    }

    fn fixture_analysis() -> CareerAnalysis {
        let level = |title: &str| RoadmapLevel {
            title: title.to_string(),
            description: "d".to_string(),
            skills_to_acquire: vec!["skill".to_string()],
        };
        CareerAnalysis {
            recommended_career: "Data Scientist".to_string(),
            career_overview: "o".to_string(),
            skill_gap_analysis: SkillGapAnalysis {
                required_technical_skills: vec!["Python".to_string(), "SQL".to_string()],
                required_soft_skills: vec!["Communication".to_string()],
                user_current_strengths: vec!["Curiosity".to_string()],
            },
            career_roadmap: CareerRoadmap {
                entry_level: level("Junior"),
                mid_level: level("Mid"),
                senior_level: level("Senior"),
            },
            learning_resources: LearningResources {
                courses: vec!["c".to_string()],
                certifications: vec!["c".to_string()],
                books_or_articles: vec!["b".to_string()],
            },
        }
    }

    fn interests(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_start_returns_selected_module_start_question() {
        let store = InMemorySessionStore::default();
        let registry = ModuleRegistry::builtin().unwrap();

        let response = start_quiz(&store, &registry, interests(&["analytical", "data-driven"]))
            .await
            .unwrap();

        // "data-driven" overlaps tech keywords, so the tech module is picked.
        assert_eq!(response.question.as_ref().unwrap().id, "t1");
        assert!(response.job_postings.is_empty());
        assert!(response.is_complete.is_none());
    }

    #[tokio::test]
    async fn test_start_persists_session_pinned_to_module() {
        let store = InMemorySessionStore::default();
        let registry = ModuleRegistry::builtin().unwrap();

        let response = start_quiz(&store, &registry, interests(&["design"]))
            .await
            .unwrap();
        let session = store.get(response.quiz_session_id).await.unwrap();
        assert_eq!(session.module_id, "creative");
        assert_eq!(session.current_question_id, "c1");
    }

    #[tokio::test]
    async fn test_answer_advances_pointer_and_aggregates_interests() {
        let store = InMemorySessionStore::default();
        let registry = ModuleRegistry::builtin().unwrap();
        let retriever = StubRetriever { documents: vec![] };
        let generator = StubGenerator::new();
        let jobs = JobSearchClient::new(None);

        let started = start_quiz(&store, &registry, interests(&["programming"]))
            .await
            .unwrap();
        let response = process_answer(
            &store,
            &registry,
            &retriever,
            &generator,
            &jobs,
            started.quiz_session_id,
            "t1",
            "D",
        )
        .await
        .unwrap();

        assert_eq!(response.question.as_ref().unwrap().id, "t3");

        let session = store.get(started.quiz_session_id).await.unwrap();
        assert_eq!(session.current_question_id, "t3");
        assert!(session.interests.contains("data-driven"));
        assert_eq!(session.answers.get("t1"), Some(&"D".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let store = InMemorySessionStore::default();
        let registry = ModuleRegistry::builtin().unwrap();
        let retriever = StubRetriever { documents: vec![] };
        let generator = StubGenerator::new();
        let jobs = JobSearchClient::new(None);

        let err = process_answer(
            &store,
            &registry,
            &retriever,
            &generator,
            &jobs,
            Uuid::new_v4(),
            "t1",
            "A",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_completion_returns_analysis_and_deletes_session() {
        let store = InMemorySessionStore::default();
        let registry = ModuleRegistry::builtin().unwrap();
        let retriever = StubRetriever {
            documents: vec!["Careers in data.".to_string()],
        };
        let generator = StubGenerator::new();
        let jobs = JobSearchClient::new(None);

        let started = start_quiz(&store, &registry, interests(&["analytical", "data-driven"]))
            .await
            .unwrap();
        let session_id = started.quiz_session_id;

        // Walk the tech module to END: t1 -> t2 -> t3 -> t4 -> END.
        for (question, answer) in [("t1", "A"), ("t2", "C"), ("t3", "A"), ("t4", "B")] {
            let response = process_answer(
                &store, &registry, &retriever, &generator, &jobs, session_id, question, answer,
            )
            .await
            .unwrap();

            if question == "t4" {
                assert_eq!(response.is_complete, Some(true));
                let analysis = response.recommended_path.as_ref().unwrap();
                assert!(!analysis
                    .skill_gap_analysis
                    .required_technical_skills
                    .is_empty());
                assert!(!analysis
                    .career_roadmap
                    .entry_level
                    .skills_to_acquire
                    .is_empty());
                assert!(!analysis
                    .career_roadmap
                    .mid_level
                    .skills_to_acquire
                    .is_empty());
                assert!(!analysis
                    .career_roadmap
                    .senior_level
                    .skills_to_acquire
                    .is_empty());
            } else {
                assert!(response.question.is_some());
            }
        }

        // Interests accumulated along the walk reached the generator.
        let seen = generator.seen_interests.lock().unwrap().clone();
        assert!(seen.contains(&"machine-learning".to_string()));
        assert!(seen.contains(&"analytical".to_string()));

        // The session is gone: answering again is NotFound.
        let err = process_answer(
            &store, &registry, &retriever, &generator, &jobs, session_id, "t4", "B",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_completion_with_no_context_fails_and_keeps_session() {
        let store = InMemorySessionStore::default();
        let registry = ModuleRegistry::builtin().unwrap();
        let retriever = StubRetriever { documents: vec![] };
        let generator = StubGenerator::new();
        let jobs = JobSearchClient::new(None);

        let started = start_quiz(&store, &registry, interests(&["finance"]))
            .await
            .unwrap();
        let session_id = started.quiz_session_id;

        for (question, answer) in [("b1", "A"), ("b2", "B")] {
            process_answer(
                &store, &registry, &retriever, &generator, &jobs, session_id, question, answer,
            )
            .await
            .unwrap();
        }

        let err = process_answer(
            &store, &registry, &retriever, &generator, &jobs, session_id, "b3", "A",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::InsufficientContext));

        // Failure happened before deletion: the session can be retried.
        assert!(store.get(session_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_answer_with_unknown_option_is_not_found() {
        let store = InMemorySessionStore::default();
        let registry = ModuleRegistry::builtin().unwrap();
        let retriever = StubRetriever { documents: vec![] };
        let generator = StubGenerator::new();
        let jobs = JobSearchClient::new(None);

        let started = start_quiz(&store, &registry, interests(&["programming"]))
            .await
            .unwrap();
        let err = process_answer(
            &store,
            &registry,
            &retriever,
            &generator,
            &jobs,
            started.quiz_session_id,
            "t1",
            "Z",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
