// Prompt templates for interview evaluation.

use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, LANGUAGE_INSTRUCTION};

pub fn evaluation_system() -> String {
    format!(
        "{JSON_ONLY_SYSTEM} You are a fair, rigorous hiring interviewer reviewing a \
         completed interview. Judge only what the candidate actually said. \
         {LANGUAGE_INSTRUCTION}"
    )
}

pub const EVALUATION_PROMPT_TEMPLATE: &str = r#"
Evaluate the interview transcript below. Each response holds the question and the candidate's answer.

Transcript:
{transcript}

Score every answer from 0 to 10 for relevance, depth and clarity. Empty or evasive answers score 0.

Return JSON with this exact shape:
{
  "overall_score": 0,
  "summary": "...",
  "strengths": ["..."],
  "weaknesses": ["..."],
  "per_question": [
    {"question": "...", "answer_summary": "...", "score": 0, "feedback": "..."}
  ],
  "recommendation": "hire | consider | reject"
}
"#;

pub fn evaluation_prompt(transcript_json: &str) -> String {
    EVALUATION_PROMPT_TEMPLATE.replace("{transcript}", transcript_json)
}
