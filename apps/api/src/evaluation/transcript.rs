//! Interview transcripts as submitted from the browser.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const ANONYMOUS: &str = "Anonymous";

/// Body of `POST /submit_interview`. Every field is optional; the id and the
/// responses are kept as whatever JSON the client sent.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitInterviewRequest {
    #[serde(default)]
    pub candidate_name: Option<String>,
    #[serde(default)]
    pub candidate_id: Option<Value>,
    #[serde(default)]
    pub responses: Option<Value>,
}

/// The persisted transcript. `id` and `responses` are stored exactly as sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub candidate_name: String,
    pub id: Value,
    pub interview_date: String,
    pub responses: Value,
}

impl Transcript {
    pub fn from_request(request: SubmitInterviewRequest, now: DateTime<Local>) -> Self {
        Self {
            candidate_name: request
                .candidate_name
                .unwrap_or_else(|| ANONYMOUS.to_string()),
            id: request
                .candidate_id
                .unwrap_or_else(|| Value::String(ANONYMOUS.to_string())),
            interview_date: now.format("%Y-%m-%d %H:%M:%S").to_string(),
            responses: request
                .responses
                .unwrap_or_else(|| Value::Array(Vec::new())),
        }
    }

    /// Number of answers when `responses` is a list, otherwise 1.
    pub fn response_count(&self) -> usize {
        match &self.responses {
            Value::Array(items) => items.len(),
            _ => 1,
        }
    }

    /// File name without extension: `responses_{name}_{YYYYmmdd_HHMMSS}`.
    pub fn file_base(&self, now: DateTime<Local>) -> String {
        format!(
            "responses_{}_{}",
            safe_candidate_name(&self.candidate_name),
            now.format("%Y%m%d_%H%M%S")
        )
    }
}

/// Candidate name reduced to something safe inside a file name.
///
/// Whitespace becomes `_`; letters (any script), digits, `_` and `-` are kept;
/// everything else, path separators included, is dropped.
pub fn safe_candidate_name(name: &str) -> String {
    let safe: String = name
        .trim()
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('_')
            } else if c.is_alphanumeric() || c == '_' || c == '-' {
                Some(c)
            } else {
                None
            }
        })
        .collect();
    if safe.is_empty() {
        ANONYMOUS.to_string()
    } else {
        safe
    }
}

/// Name of the evaluation written for a transcript file.
pub fn results_file_name(transcript_file: &str) -> String {
    let stem = transcript_file
        .strip_suffix(".json")
        .unwrap_or(transcript_file);
    format!("{stem}_results.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    #[test]
    fn test_defaults_to_anonymous() {
        let transcript = Transcript::from_request(SubmitInterviewRequest::default(), fixed_now());
        assert_eq!(transcript.candidate_name, "Anonymous");
        assert_eq!(transcript.id, "Anonymous");
        assert_eq!(transcript.responses, json!([]));
        assert_eq!(transcript.response_count(), 0);
        assert_eq!(transcript.interview_date, "2024-03-09 14:05:07");
    }

    #[test]
    fn test_null_fields_use_defaults() {
        let request: SubmitInterviewRequest =
            serde_json::from_value(json!({"candidate_name": null, "responses": null})).unwrap();
        let transcript = Transcript::from_request(request, fixed_now());
        assert_eq!(transcript.candidate_name, "Anonymous");
        assert_eq!(transcript.responses, json!([]));
    }

    #[test]
    fn test_file_base_replaces_spaces() {
        let request: SubmitInterviewRequest =
            serde_json::from_value(json!({"candidate_name": "Jane Doe"})).unwrap();
        let transcript = Transcript::from_request(request, fixed_now());
        assert_eq!(
            transcript.file_base(fixed_now()),
            "responses_Jane_Doe_20240309_140507"
        );
    }

    #[test]
    fn test_safe_candidate_name() {
        assert_eq!(safe_candidate_name("Jane Doe"), "Jane_Doe");
        assert_eq!(safe_candidate_name("李 小龙"), "李_小龙");
        assert_eq!(safe_candidate_name("../../etc/passwd"), "etcpasswd");
        assert_eq!(safe_candidate_name("   "), "Anonymous");
        assert_eq!(safe_candidate_name("a\\b:c"), "abc");
    }

    #[test]
    fn test_results_file_name() {
        assert_eq!(
            results_file_name("responses_Jane_Doe_20240309_140507.json"),
            "responses_Jane_Doe_20240309_140507_results.json"
        );
        assert_eq!(results_file_name("odd"), "odd_results.json");
    }

    #[test]
    fn test_responses_are_kept_verbatim() {
        let request: SubmitInterviewRequest = serde_json::from_value(json!({
            "candidate_name": "Jane Doe",
            "candidate_id": "c-42",
            "responses": [{"q": 1, "a": "x"}, "free text"]
        }))
        .unwrap();
        let transcript = Transcript::from_request(request, fixed_now());
        assert_eq!(transcript.id, "c-42");
        assert_eq!(transcript.responses, json!([{"q": 1, "a": "x"}, "free text"]));
        assert_eq!(transcript.response_count(), 2);
    }

    #[test]
    fn test_non_string_id_and_non_list_responses_are_kept() {
        let request: SubmitInterviewRequest = serde_json::from_value(json!({
            "candidate_id": 42,
            "responses": {"q1": "answer"}
        }))
        .unwrap();
        let transcript = Transcript::from_request(request, fixed_now());
        assert_eq!(transcript.id, json!(42));
        assert_eq!(transcript.responses, json!({"q1": "answer"}));
        assert_eq!(transcript.response_count(), 1);
    }
}
