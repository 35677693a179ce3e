//! JSON document directories.
//!
//! Every on-disk collection the service owns (question sets, transcripts,
//! evaluation results) is a `JsonDir`: a flat directory of `.json` files
//! addressed by file name. Names coming from requests are resolved strictly
//! inside the directory; anything that could escape it resolves to nothing.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

/// Upper bound on `_N` suffixes tried by `write_new` before giving up.
const MAX_NAME_SUFFIX: u32 = 1000;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{name} is not valid JSON: {source}")]
    InvalidJson {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    fn io(name: &str, source: std::io::Error) -> Self {
        if source.kind() == ErrorKind::NotFound {
            StoreError::NotFound(name.to_string())
        } else {
            StoreError::Io {
                name: name.to_string(),
                source,
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct JsonDir {
    root: PathBuf,
}

impl JsonDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a bare file name (no separators) inside the directory.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) {
            return None;
        }
        self.resolve_nested(name)
    }

    /// Resolves a relative path inside the directory. Only plain components are
    /// accepted: no `..`, `.`, root or drive prefixes.
    pub fn resolve_nested(&self, relative: &str) -> Option<PathBuf> {
        if relative.is_empty() || relative.contains('\\') {
            return None;
        }
        let rel = Path::new(relative);
        if !rel.components().all(|c| matches!(c, Component::Normal(_))) {
            return None;
        }
        Some(self.root.join(rel))
    }

    /// Reads and parses one document.
    pub async fn read(&self, name: &str) -> Result<Value, StoreError> {
        let path = self
            .resolve(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        let raw = tokio::fs::read(&path)
            .await
            .map_err(|e| StoreError::io(name, e))?;
        serde_json::from_slice(&raw).map_err(|source| StoreError::InvalidJson {
            name: name.to_string(),
            source,
        })
    }

    /// Opens a file at a relative path for streaming, with its size.
    pub async fn open(&self, relative: &str) -> Result<(tokio::fs::File, u64), StoreError> {
        let path = self
            .resolve_nested(relative)
            .ok_or_else(|| StoreError::NotFound(relative.to_string()))?;
        let file = tokio::fs::File::open(&path)
            .await
            .map_err(|e| StoreError::io(relative, e))?;
        let meta = file
            .metadata()
            .await
            .map_err(|e| StoreError::io(relative, e))?;
        if !meta.is_file() {
            return Err(StoreError::NotFound(relative.to_string()));
        }
        Ok((file, meta.len()))
    }

    /// Writes (or replaces) `name` with pretty-printed JSON.
    pub async fn write<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf, StoreError> {
        let path = self
            .resolve(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        let body = to_pretty_json(name, value)?;
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| StoreError::io(name, e))?;
        Ok(path)
    }

    /// Writes a new document named `{base}.json`, never replacing an existing
    /// file: on a clash it tries `{base}_2.json`, `{base}_3.json`, and so on.
    /// Returns the name actually used.
    pub async fn write_new<T: Serialize>(
        &self,
        base: &str,
        value: &T,
    ) -> Result<String, StoreError> {
        let first = format!("{base}.json");
        let body = to_pretty_json(&first, value)?;

        for n in 1..=MAX_NAME_SUFFIX {
            let name = if n == 1 {
                first.clone()
            } else {
                format!("{base}_{n}.json")
            };
            let path = self
                .resolve(&name)
                .ok_or_else(|| StoreError::NotFound(name.clone()))?;

            let file = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;
            let mut file = match file {
                Ok(f) => f,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(StoreError::io(&name, e)),
            };
            file.write_all(&body)
                .await
                .map_err(|e| StoreError::io(&name, e))?;
            file.flush().await.map_err(|e| StoreError::io(&name, e))?;
            return Ok(name);
        }

        Err(StoreError::Io {
            name: first,
            source: std::io::Error::new(ErrorKind::AlreadyExists, "no free file name"),
        })
    }

    pub fn exists(&self, name: &str) -> bool {
        self.resolve(name).is_some_and(|p| p.is_file())
    }

    /// Names of all `.json` files, sorted.
    pub async fn list_json(&self) -> Result<Vec<String>, StoreError> {
        self.list_matching(|name| name.ends_with(".json")).await
    }

    /// First (by name) file whose name ends with `suffix` and starts with `prefix`.
    pub async fn find_by_prefix(
        &self,
        prefix: &str,
        suffix: &str,
    ) -> Result<Option<String>, StoreError> {
        let mut names = self
            .list_matching(|name| name.ends_with(suffix) && name.starts_with(prefix))
            .await?;
        Ok(if names.is_empty() {
            None
        } else {
            Some(names.swap_remove(0))
        })
    }

    async fn list_matching<F>(&self, keep: F) -> Result<Vec<String>, StoreError>
    where
        F: Fn(&str) -> bool,
    {
        let label = self.root.display().to_string();
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&label, e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(&label, e))?
        {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if keep(&name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Four-space indented JSON with non-ASCII characters written as-is.
fn to_pretty_json<T: Serialize>(name: &str, value: &T) -> Result<Vec<u8>, StoreError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .map_err(|source| StoreError::InvalidJson {
            name: name.to_string(),
            source,
        })?;
    Ok(buf)
}
