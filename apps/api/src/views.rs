//! Askama page templates and the helpers that shape opaque JSON for them.

use askama::Template;
use serde_json::Value;

use crate::flash::Flash;
use crate::upload::validation::ALLOWED_EXTENSIONS;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub flashes: Vec<Flash>,
}

#[derive(Template)]
#[template(path = "upload_cv.html")]
pub struct UploadPage {
    pub flashes: Vec<Flash>,
    pub accept: String,
    pub max_upload_mib: usize,
}

impl UploadPage {
    pub fn new(flashes: Vec<Flash>, max_upload_bytes: usize) -> Self {
        Self {
            flashes,
            accept: ALLOWED_EXTENSIONS
                .iter()
                .map(|e| format!(".{e}"))
                .collect::<Vec<_>>()
                .join(","),
            max_upload_mib: max_upload_bytes / (1024 * 1024),
        }
    }
}

#[derive(Template)]
#[template(path = "interview.html")]
pub struct InterviewPage {
    pub flashes: Vec<Flash>,
    pub questions_file: String,
    /// Question texts for the no-script fallback list.
    pub questions: Vec<String>,
    /// The whole question set, safe to inline in a `<script>` element.
    pub questions_json: String,
}

impl InterviewPage {
    pub fn new(flashes: Vec<Flash>, questions_file: String, questions: &Value) -> Self {
        Self {
            flashes,
            questions_file,
            questions: question_texts(questions),
            questions_json: script_safe_json(questions),
        }
    }
}

#[derive(Template)]
#[template(path = "results.html")]
pub struct ResultsPage {
    pub flashes: Vec<Flash>,
    pub results_files: Vec<String>,
}

pub struct ResultField {
    pub key: String,
    pub value: String,
}

#[derive(Template)]
#[template(path = "view_result.html")]
pub struct ResultPage {
    pub flashes: Vec<Flash>,
    pub filename: String,
    pub fields: Vec<ResultField>,
}

impl ResultPage {
    pub fn new(flashes: Vec<Flash>, filename: String, result: &Value) -> Self {
        Self {
            flashes,
            filename,
            fields: result_fields(result),
        }
    }
}

/// Pulls displayable question texts out of a question set of unknown shape.
///
/// Accepts a top-level array or an object with a `questions` array; items may
/// be strings or objects carrying `question` or `text`.
pub fn question_texts(set: &Value) -> Vec<String> {
    let items = match set {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("questions") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Object(obj) => obj
                .get("question")
                .or_else(|| obj.get("text"))
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        })
        .collect()
}

/// Top-level entries of a result document, each value rendered as text.
/// Non-object documents become a single `result` entry.
pub fn result_fields(result: &Value) -> Vec<ResultField> {
    match result {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| ResultField {
                key: key.clone(),
                value: display_value(value),
            })
            .collect(),
        other => vec![ResultField {
            key: "result".to_string(),
            value: display_value(other),
        }],
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        _ => serde_json::to_string_pretty(value).unwrap_or_default(),
    }
}

/// JSON text that cannot close or confuse a surrounding `<script>` element.
pub fn script_safe_json(value: &Value) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}
