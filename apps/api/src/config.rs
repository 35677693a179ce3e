use std::path::PathBuf;

use anyhow::{Context, Result};

/// Default cap on request bodies (covers the résumé upload).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    /// Signs the flash cookie. Must be at least 64 bytes when set.
    pub secret_key: Option<String>,
    pub upload_dir: PathBuf,
    pub questions_dir: PathBuf,
    pub interview_logs_dir: PathBuf,
    pub results_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            secret_key: std::env::var("SECRET_KEY").ok().filter(|s| !s.is_empty()),
            upload_dir: dir_env("UPLOAD_DIR", "uploads"),
            questions_dir: dir_env("QUESTIONS_DIR", "interview_question"),
            interview_logs_dir: dir_env("INTERVIEW_LOGS_DIR", "outputs/interview_logs"),
            results_dir: dir_env("RESULTS_DIR", "outputs/evaluate_results"),
            max_upload_bytes: match std::env::var("MAX_UPLOAD_BYTES") {
                Ok(v) => v
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
            },
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Every directory the service reads from or writes to.
    pub fn data_dirs(&self) -> [&PathBuf; 4] {
        [
            &self.upload_dir,
            &self.questions_dir,
            &self.interview_logs_dir,
            &self.results_dir,
        ]
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn dir_env(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

/// Creates every data directory. Called once from `main` before the router is built.
pub async fn init_data_dirs(config: &Config) -> Result<()> {
    for dir in config.data_dirs() {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }
    Ok(())
}

#[cfg(test)]
pub fn test_config(root: &std::path::Path) -> Config {
    Config {
        anthropic_api_key: "test-key".to_string(),
        secret_key: None,
        upload_dir: root.join("uploads"),
        questions_dir: root.join("interview_question"),
        interview_logs_dir: root.join("outputs/interview_logs"),
        results_dir: root.join("outputs/evaluate_results"),
        max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        port: 5000,
        rust_log: "debug".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_data_dirs_creates_nested_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());

        init_data_dirs(&config).await.unwrap();

        for dir in config.data_dirs() {
            assert!(dir.is_dir(), "{} was not created", dir.display());
        }
    }

    #[tokio::test]
    async fn test_init_data_dirs_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());

        init_data_dirs(&config).await.unwrap();
        init_data_dirs(&config).await.unwrap();
    }
}
