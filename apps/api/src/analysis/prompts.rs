// All model prompt constants for the career analysis module.

/// System prompt for career analysis — enforces JSON-only output.
pub const ANALYSIS_SYSTEM: &str =
    "You are an expert career advisor for students in India. \
    Analyze a student's interests against the provided knowledge base excerpts \
    and produce a career recommendation. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Fixed placeholder profile embedded in every analysis prompt. User skill and
/// background capture is a separate product surface; until it exists the model
/// is told to assume a generic student.
pub const PLACEHOLDER_PROFILE: &str =
    "An undergraduate student early in their career, with foundational academic \
    knowledge, no professional experience yet, and strong motivation to learn.";

/// Appended to the prompt on the single retry after an unparsable response.
pub const JSON_ONLY_REMINDER: &str = "\n\nREMINDER: Your previous response could not be \
    parsed. Return ONLY the JSON object described above — no prose, no markdown fences.";

/// Career analysis prompt template.
/// Replace: {interests}, {profile}, {context}
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Recommend a career path for the student below.

STUDENT INTERESTS:
{interests}

STUDENT PROFILE:
{profile}

KNOWLEDGE BASE CONTEXT (use these excerpts to ground your recommendation):
{context}

Return a JSON object with this EXACT schema (no extra fields):
{
  "recommendedCareer": "Data Scientist",
  "careerOverview": "One or two paragraphs describing the career and why it fits.",
  "skillGapAnalysis": {
    "requiredTechnicalSkills": ["Python", "SQL"],
    "requiredSoftSkills": ["Communication"],
    "userCurrentStrengths": ["Analytical thinking"]
  },
  "careerRoadmap": {
    "entryLevel": {
      "title": "Junior Data Analyst",
      "description": "What this stage involves.",
      "skillsToAcquire": ["Excel", "SQL"]
    },
    "midLevel": {
      "title": "Data Scientist",
      "description": "What this stage involves.",
      "skillsToAcquire": ["Machine Learning"]
    },
    "seniorLevel": {
      "title": "Senior Data Scientist",
      "description": "What this stage involves.",
      "skillsToAcquire": ["System Design"]
    }
  },
  "learningResources": {
    "courses": ["Course name"],
    "certifications": ["Certification name"],
    "booksOrArticles": ["Title"]
  }
}

Rules:
- Ground the recommendation in the knowledge base context wherever possible.
- Every list must contain at least one item.
- The roadmap must have exactly the three levels shown.
- Keep the tone encouraging and professional, focused on the Indian job market."#;

/// Builds the final analysis prompt from interests and retrieved context.
pub fn build_analysis_prompt(interests: &[String], context_docs: &[String]) -> String {
    let context = context_docs
        .iter()
        .enumerate()
        .map(|(i, doc)| format!("--- Document {} ---\n{}", i + 1, doc))
        .collect::<Vec<_>>()
        .join("\n\n");

    ANALYSIS_PROMPT_TEMPLATE
        .replace("{interests}", &interests.join(", "))
        .replace("{profile}", PLACEHOLDER_PROFILE)
        .replace("{context}", &context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_interests_and_context() {
        let interests = vec!["ai".to_string(), "data-driven".to_string()];
        let docs = vec!["Data science careers overview.".to_string()];
        let prompt = build_analysis_prompt(&interests, &docs);
        assert!(prompt.contains("ai, data-driven"));
        assert!(prompt.contains("--- Document 1 ---"));
        assert!(prompt.contains("Data science careers overview."));
        assert!(!prompt.contains("{interests}"));
        assert!(!prompt.contains("{context}"));
    }

    #[test]
    fn test_prompt_numbers_multiple_documents() {
        let docs = vec!["first".to_string(), "second".to_string()];
        let prompt = build_analysis_prompt(&["x".to_string()], &docs);
        assert!(prompt.contains("--- Document 1 ---\nfirst"));
        assert!(prompt.contains("--- Document 2 ---\nsecond"));
    }
}
