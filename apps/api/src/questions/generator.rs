//! Question generation: a trait-based generator that turns an
//! uploaded résumé into a question set file.
//!
//! `AppState` holds an `Arc<dyn QuestionGenerator>`. The generator reports the
//! exact file it wrote, so callers never have to guess the output name.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::files::{JsonDir, StoreError};
use crate::llm_client::{InputBlock, LlmClient, LlmError};
use crate::questions::document::resume_block;
use crate::questions::prompts::{question_prompt, question_system};
use crate::upload::validation::UploadRecord;

/// Suffix every question set file carries.
pub const QUESTIONS_SUFFIX: &str = ".questions.json";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} files cannot be sent to the question model, please upload a PDF, PNG or JPG")]
    UnsupportedDocument(String),

    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("the model returned no questions")]
    NoQuestions,

    #[error("could not save questions: {0}")]
    Store(#[from] StoreError),
}

/// Everything a generator needs for one upload.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub upload: UploadRecord,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedQuestions {
    /// File name inside `output_dir`.
    pub file_name: String,
}

/// Implement this to swap backends without touching the upload handler.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedQuestions, GenerationError>;
}

/// Question set file name for an upload: `{uuid}_{name}.questions.json`.
pub fn questions_file_name(upload: &UploadRecord) -> String {
    format!("{}{QUESTIONS_SUFFIX}", upload.stem())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    pub category: String,
    pub question: String,
}

/// The document written by `LlmQuestionGenerator`. Readers treat question
/// files as opaque JSON; this shape is only what this generator produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSet {
    pub job_title: String,
    pub level: String,
    pub source_file: String,
    pub generated_at: DateTime<Local>,
    pub questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
struct DraftQuestions {
    #[serde(default)]
    questions: Vec<DraftQuestion>,
}

#[derive(Debug, Deserialize)]
struct DraftQuestion {
    #[serde(default)]
    category: String,
    #[serde(default)]
    question: String,
}

impl DraftQuestions {
    /// Drops blank questions and numbers the rest from 1.
    fn into_questions(self) -> Vec<Question> {
        self.questions
            .into_iter()
            .filter(|q| !q.question.trim().is_empty())
            .enumerate()
            .map(|(i, q)| Question {
                id: i as u32 + 1,
                category: if q.category.trim().is_empty() {
                    "general".to_string()
                } else {
                    q.category.trim().to_lowercase()
                },
                question: q.question.trim().to_string(),
            })
            .collect()
    }
}

/// Claude-backed generator: reads the résumé, asks for a question list,
/// writes `{upload stem}.questions.json`.
pub struct LlmQuestionGenerator {
    llm: LlmClient,
}

impl LlmQuestionGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl QuestionGenerator for LlmQuestionGenerator {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedQuestions, GenerationError> {
        let upload = &request.upload;
        let bytes = tokio::fs::read(&upload.path)
            .await
            .map_err(|source| GenerationError::Read {
                path: upload.path.clone(),
                source,
            })?;

        let resume = resume_block(bytes, &upload.extension()).await?;
        let blocks = [
            resume,
            InputBlock::text(question_prompt(&upload.job_title, &upload.level)),
        ];

        let draft: DraftQuestions = self.llm.call_json(&blocks, &question_system()).await?;
        let questions = draft.into_questions();
        if questions.is_empty() {
            return Err(GenerationError::NoQuestions);
        }

        let set = QuestionSet {
            job_title: upload.job_title.clone(),
            level: upload.level.clone(),
            source_file: upload.stored_filename.clone(),
            generated_at: Local::now(),
            questions,
        };

        let file_name = questions_file_name(upload);
        JsonDir::new(&request.output_dir)
            .write(&file_name, &set)
            .await?;

        info!(
            "Generated {} questions for {} ({} - {})",
            set.questions.len(),
            upload.stored_filename,
            set.job_title,
            set.level
        );

        Ok(GeneratedQuestions { file_name })
    }
}
