//! Interview evaluation: a trait-based evaluator that reads a saved
//! transcript and writes an evaluation result next to the other results.
//!
//! `AppState` holds an `Arc<dyn InterviewEvaluator>`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Local;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::info;

use crate::evaluation::prompts::{evaluation_prompt, evaluation_system};
use crate::evaluation::transcript::{results_file_name, Transcript};
use crate::files::{JsonDir, StoreError};
use crate::llm_client::{InputBlock, LlmClient, LlmError};

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("could not read transcript {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("transcript {path} is malformed: {source}")]
    InvalidTranscript {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("could not save evaluation: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationOutcome {
    /// File name inside the results directory.
    pub results_file: String,
}

/// Implement this to swap backends without touching the submission handler.
#[async_trait]
pub trait InterviewEvaluator: Send + Sync {
    async fn evaluate(&self, transcript_path: &Path) -> Result<EvaluationOutcome, EvaluationError>;
}

/// Reads and parses a transcript file.
pub async fn load_transcript(path: &Path) -> Result<Transcript, EvaluationError> {
    let raw = tokio::fs::read(path)
        .await
        .map_err(|source| EvaluationError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    serde_json::from_slice(&raw).map_err(|source| EvaluationError::InvalidTranscript {
        path: path.to_path_buf(),
        source,
    })
}

/// Wraps the model's evaluation with the transcript's identifying fields.
/// Non-object evaluations are nested under `evaluation`.
pub fn build_result(transcript: &Transcript, transcript_file: &str, evaluation: Value) -> Value {
    let mut result = match evaluation {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("evaluation".to_string(), other);
            map
        }
    };
    result.insert("candidate_name".to_string(), json!(transcript.candidate_name));
    result.insert("id".to_string(), json!(transcript.id));
    result.insert("interview_date".to_string(), json!(transcript.interview_date));
    result.insert("transcript_file".to_string(), json!(transcript_file));
    result.insert(
        "evaluated_at".to_string(),
        json!(Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
    );
    Value::Object(result)
}

/// Claude-backed evaluator writing `{transcript stem}_results.json`.
pub struct LlmInterviewEvaluator {
    llm: LlmClient,
    results: JsonDir,
}

impl LlmInterviewEvaluator {
    pub fn new(llm: LlmClient, results: JsonDir) -> Self {
        Self { llm, results }
    }
}

#[async_trait]
impl InterviewEvaluator for LlmInterviewEvaluator {
    async fn evaluate(&self, transcript_path: &Path) -> Result<EvaluationOutcome, EvaluationError> {
        let transcript = load_transcript(transcript_path).await?;
        let transcript_file = transcript_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("transcript.json")
            .to_string();

        let transcript_json = serde_json::to_string_pretty(&transcript)
            .map_err(|source| EvaluationError::InvalidTranscript {
                path: transcript_path.to_path_buf(),
                source,
            })?;
        let blocks = [InputBlock::text(evaluation_prompt(&transcript_json))];
        let evaluation: Value = self.llm.call_json(&blocks, &evaluation_system()).await?;

        let result = build_result(&transcript, &transcript_file, evaluation);
        let results_file = results_file_name(&transcript_file);
        self.results.write(&results_file, &result).await?;

        info!(
            "Evaluated {} ({} responses) into {results_file}",
            transcript_file,
            transcript.response_count()
        );

        Ok(EvaluationOutcome { results_file })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript() -> Transcript {
        Transcript {
            candidate_name: "Jane Doe".to_string(),
            id: json!("c-1"),
            interview_date: "2024-03-09 14:05:07".to_string(),
            responses: json!([{"q": 1, "a": "x"}]),
        }
    }

    #[test]
    fn test_build_result_merges_identity_fields() {
        let result = build_result(
            &transcript(),
            "responses_Jane_Doe_1.json",
            json!({"overall_score": 7, "summary": "Solid"}),
        );
        assert_eq!(result["overall_score"], 7);
        assert_eq!(result["candidate_name"], "Jane Doe");
        assert_eq!(result["id"], "c-1");
        assert_eq!(result["transcript_file"], "responses_Jane_Doe_1.json");
        assert!(result["evaluated_at"].is_string());
    }

    #[test]
    fn test_build_result_nests_non_object_evaluations() {
        let result = build_result(&transcript(), "t.json", json!(["not", "an", "object"]));
        assert_eq!(result["evaluation"], json!(["not", "an", "object"]));
    }

    #[tokio::test]
    async fn test_load_transcript_reports_missing_file() {
        let err = load_transcript(Path::new("/nonexistent/t.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, EvaluationError::Read { .. }));
    }

    #[tokio::test]
    async fn test_load_transcript_reports_malformed_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("t.json");
        std::fs::write(&path, r#"{"candidate_name": 5}"#).unwrap();
        let err = load_transcript(&path).await.unwrap_err();
        assert!(matches!(err, EvaluationError::InvalidTranscript { .. }));
    }

    #[tokio::test]
    async fn test_load_transcript_parses_written_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = JsonDir::new(tmp.path());
        let name = dir.write_new("responses_Jane_Doe", &transcript()).await.unwrap();
        let loaded = load_transcript(&tmp.path().join(name)).await.unwrap();
        assert_eq!(loaded, transcript());
    }
}
