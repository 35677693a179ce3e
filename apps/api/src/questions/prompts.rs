// Prompt templates for interview question generation.

use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, LANGUAGE_INSTRUCTION};

pub const QUESTION_COUNT: usize = 10;

pub fn question_system() -> String {
    format!(
        "{JSON_ONLY_SYSTEM} You are an experienced technical interviewer preparing \
         a structured interview. {LANGUAGE_INSTRUCTION}"
    )
}

pub const QUESTION_PROMPT_TEMPLATE: &str = r#"
The attached document is a candidate's résumé. Prepare interview questions for the position below.

Position: {job_title}
Level: {level}

Write exactly {count} questions. Mix these categories:
- "experience": probe specific projects, roles and claims from the résumé
- "technical": test skills the position requires at this level
- "behavioral": teamwork, conflict, ownership
- "situational": realistic scenarios for the role

Tie questions to concrete details in the résumé wherever possible. Calibrate difficulty to the level.

Return JSON with this exact shape:
{
  "questions": [
    {"category": "experience", "question": "..."}
  ]
}
"#;

pub fn question_prompt(job_title: &str, level: &str) -> String {
    QUESTION_PROMPT_TEMPLATE
        .replace("{job_title}", job_title)
        .replace("{level}", level)
        .replace("{count}", &QUESTION_COUNT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_prompt_fills_placeholders() {
        let prompt = question_prompt("Backend Engineer", "Senior");
        assert!(prompt.contains("Position: Backend Engineer"));
        assert!(prompt.contains("Level: Senior"));
        assert!(prompt.contains("exactly 10 questions"));
        assert!(!prompt.contains("{job_title}"));
    }
}
