//! Question graph walker — pure lookup of the next step for an answer.

use crate::errors::AppError;
use crate::quiz::models::{QuizModule, END_OF_QUIZ};

/// Outcome of answering one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Next(String),
    Terminal,
}

/// Looks up the transition for `answer_id` on `question_id`. A missing
/// question or a missing transition is a typed NotFound naming the id — a
/// malformed graph entry is fatal for the session, never retried.
pub fn advance(module: &QuizModule, question_id: &str, answer_id: &str) -> Result<Step, AppError> {
    let question = module.question(question_id).ok_or_else(|| {
        AppError::NotFound(format!(
            "Question '{question_id}' not found in module '{}'",
            module.name
        ))
    })?;

    let target = question.next_question.get(answer_id).ok_or_else(|| {
        AppError::NotFound(format!(
            "Answer '{answer_id}' has no transition on question '{question_id}'"
        ))
    })?;

    if target == END_OF_QUIZ {
        Ok(Step::Terminal)
    } else {
        Ok(Step::Next(target.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::registry::ModuleRegistry;

    #[test]
    fn test_advance_returns_next_question_id() {
        let registry = ModuleRegistry::builtin().unwrap();
        let module = registry.get("tech").unwrap();
        let step = advance(module, "t1", "A").unwrap();
        assert_eq!(step, Step::Next("t2".to_string()));
    }

    #[test]
    fn test_advance_signals_terminal_on_end() {
        let registry = ModuleRegistry::builtin().unwrap();
        let module = registry.get("tech").unwrap();
        let step = advance(module, "t4", "B").unwrap();
        assert_eq!(step, Step::Terminal);
    }

    #[test]
    fn test_missing_question_is_not_found() {
        let registry = ModuleRegistry::builtin().unwrap();
        let module = registry.get("tech").unwrap();
        let err = advance(module, "t99", "A").unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg.contains("t99")));
    }

    #[test]
    fn test_missing_transition_is_not_found() {
        let registry = ModuleRegistry::builtin().unwrap();
        let module = registry.get("tech").unwrap();
        let err = advance(module, "t1", "Z").unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg.contains('Z')));
    }
}
