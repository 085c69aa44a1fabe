//! Module registry — loads the builtin question graphs, validates them at
//! startup, and selects the best-matching module for a set of interests.

use anyhow::{bail, Context, Result};

use crate::quiz::models::{QuizModule, END_OF_QUIZ};

const TECH_MODULE: &str = include_str!("data/tech.json");
const CREATIVE_MODULE: &str = include_str!("data/creative.json");
const BUSINESS_MODULE: &str = include_str!("data/business.json");

/// Module used when no keyword scores above zero.
const DEFAULT_MODULE: &str = "tech";

/// All quiz modules, in declaration order. Declaration order is the tiebreak
/// for equal selection scores.
pub struct ModuleRegistry {
    modules: Vec<QuizModule>,
}

impl ModuleRegistry {
    /// Parses and validates the builtin modules. A malformed graph is a fatal
    /// configuration error: it aborts startup instead of failing a user
    /// mid-quiz at the broken transition.
    pub fn builtin() -> Result<Self> {
        let modules = [TECH_MODULE, CREATIVE_MODULE, BUSINESS_MODULE]
            .iter()
            .map(|raw| serde_json::from_str::<QuizModule>(raw).context("malformed module JSON"))
            .collect::<Result<Vec<_>>>()?;

        let registry = Self { modules };
        for module in &registry.modules {
            validate_module(module)
                .with_context(|| format!("quiz module '{}' failed validation", module.name))?;
        }
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<&QuizModule> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Keyword-overlap scorer: exact keyword match scores 2, substring
    /// containment in either direction scores 1 (at most once per interest).
    /// Only a strictly higher score replaces the current best, so ties
    /// resolve to declaration order. Zero overlap falls back to "tech".
    pub fn select(&self, interests: &[String]) -> &QuizModule {
        let normalized: Vec<String> = interests.iter().map(|i| i.to_lowercase()).collect();

        let mut best: Option<&QuizModule> = None;
        let mut highest = 0u32;

        for module in &self.modules {
            let score = module_score(module, &normalized);
            if score > highest {
                highest = score;
                best = Some(module);
            }
        }

        best.unwrap_or_else(|| {
            self.get(DEFAULT_MODULE)
                .expect("default module is always registered")
        })
    }
}

fn module_score(module: &QuizModule, interests: &[String]) -> u32 {
    let mut score = 0;
    for interest in interests {
        if module.keywords.iter().any(|k| k == interest) {
            score += 2;
            continue;
        }
        if module
            .keywords
            .iter()
            .any(|k| interest.contains(k.as_str()) || k.contains(interest.as_str()))
        {
            score += 1;
        }
    }
    score
}

/// Graph closure invariant: every non-"END" `next_question` target must exist
/// in the same module, every option must have a transition, and the start
/// question must exist.
fn validate_module(module: &QuizModule) -> Result<()> {
    if module.question(&module.start_question_id).is_none() {
        bail!(
            "start_question_id '{}' does not exist",
            module.start_question_id
        );
    }

    for question in module.questions.values() {
        for option in &question.options {
            let Some(target) = question.next_question.get(&option.id) else {
                bail!(
                    "question '{}' option '{}' has no next_question entry",
                    question.id,
                    option.id
                );
            };
            if target != END_OF_QUIZ && module.question(target).is_none() {
                bail!(
                    "question '{}' option '{}' points at missing question '{}'",
                    question.id,
                    option.id,
                    target
                );
            }
        }
    }

    Ok(())
}
