//! Upload validation: extension whitelist, filename sanitization and the
//! persisted `UploadRecord`.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

/// Résumé formats accepted by the upload form.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff", "tif", "pdf"];

/// Fallback stem when sanitizing strips the whole name.
const FALLBACK_STEM: &str = "cv";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file selected")]
    NoFile,

    #[error("Unsupported file type. Please choose a PNG, JPG, BMP, TIFF or PDF file")]
    UnsupportedType,

    #[error("Please fill in both the job title and the level")]
    MissingJobInfo,

    #[error("The file is larger than the {limit_mib} MiB upload limit")]
    TooLarge { limit_mib: usize },

    #[error("Could not read the upload: {0}")]
    Multipart(String),
}

/// Raw fields pulled out of the multipart form.
#[derive(Debug, Default)]
pub struct UploadForm {
    /// `None` when the form had no `cv_file` field at all.
    pub file_name: Option<String>,
    pub data: Bytes,
    pub job_title: String,
    pub level: String,
}

/// A form that passed validation.
#[derive(Debug)]
pub struct ValidUpload {
    pub original_filename: String,
    pub extension: String,
    pub data: Bytes,
    pub job_title: String,
    pub level: String,
}

/// An upload written to disk.
#[derive(Debug, Clone, Serialize)]
pub struct UploadRecord {
    pub id: Uuid,
    pub original_filename: String,
    pub sanitized_filename: String,
    pub stored_filename: String,
    pub path: PathBuf,
    pub job_title: String,
    pub level: String,
}

impl UploadRecord {
    /// Stored file name without its extension (`{id}_{name}`).
    pub fn stem(&self) -> &str {
        Path::new(&self.stored_filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.stored_filename)
    }

    /// Lowercased extension of the stored file.
    pub fn extension(&self) -> String {
        extension_of(&self.stored_filename).unwrap_or_default()
    }
}

/// Lowercased text after the last `.`, if any.
pub fn extension_of(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

pub fn allowed_file(filename: &str) -> bool {
    extension_of(filename).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Reduces a client-supplied filename to `[A-Za-z0-9_.-]`.
///
/// The name is NFKD-normalized first so accented letters keep their base
/// letter (`Nguyễn` becomes `Nguyen`). Path separators become spaces, runs of
/// whitespace collapse to `_`, remaining non-ASCII and other characters are
/// dropped, and leading/trailing `.`/`_` are trimmed. The result can be empty.
pub fn secure_filename(filename: &str) -> String {
    let spaced: String = filename
        .nfkd()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .filter(|c| c.is_ascii())
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// Sanitized name that still carries the validated extension.
pub fn sanitized_upload_name(original: &str, extension: &str) -> String {
    let sanitized = secure_filename(original);
    if extension_of(&sanitized).as_deref() == Some(extension) {
        return sanitized;
    }
    let stem = if sanitized.is_empty() {
        FALLBACK_STEM
    } else {
        sanitized.as_str()
    };
    format!("{stem}.{extension}")
}

/// Checks a parsed form in the order the user sees problems: file first,
/// then job information.
pub fn validate(form: UploadForm) -> Result<ValidUpload, UploadError> {
    let original_filename = form.file_name.ok_or(UploadError::NoFile)?;
    if original_filename.is_empty() {
        return Err(UploadError::NoFile);
    }
    if !allowed_file(&original_filename) {
        return Err(UploadError::UnsupportedType);
    }
    let extension = extension_of(&original_filename).unwrap_or_default();

    let job_title = form.job_title.trim().to_string();
    let level = form.level.trim().to_string();
    if job_title.is_empty() || level.is_empty() {
        return Err(UploadError::MissingJobInfo);
    }

    Ok(ValidUpload {
        original_filename,
        extension,
        data: form.data,
        job_title,
        level,
    })
}

/// Writes the upload as `{uuid}_{sanitized}` inside `upload_dir`.
pub async fn save_upload(upload_dir: &Path, upload: ValidUpload) -> std::io::Result<UploadRecord> {
    let id = Uuid::new_v4();
    let sanitized_filename = sanitized_upload_name(&upload.original_filename, &upload.extension);
    let stored_filename = format!("{id}_{sanitized_filename}");
    let path = upload_dir.join(&stored_filename);

    tokio::fs::write(&path, &upload.data).await?;

    Ok(UploadRecord {
        id,
        original_filename: upload.original_filename,
        sanitized_filename,
        stored_filename,
        path,
        job_title: upload.job_title,
        level: upload.level,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(file_name: Option<&str>, job_title: &str, level: &str) -> UploadForm {
        UploadForm {
            file_name: file_name.map(str::to_string),
            data: Bytes::from_static(b"%PDF-1.4"),
            job_title: job_title.to_string(),
            level: level.to_string(),
        }
    }

    #[test]
    fn test_allowed_file_is_case_insensitive() {
        assert!(allowed_file("cv.PDF"));
        assert!(allowed_file("scan.tif"));
        assert!(allowed_file("photo.JPeG"));
        assert!(!allowed_file("cv.docx"));
        assert!(!allowed_file("pdf"));
        assert!(!allowed_file("archive.pdf.exe"));
    }

    #[test]
    fn test_secure_filename_matches_werkzeug_behaviour() {
        assert_eq!(secure_filename("My cool movie.mov"), "My_cool_movie.mov");
        assert_eq!(secure_filename("../../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("  .hidden_file.pdf  "), "hidden_file.pdf");
        assert_eq!(secure_filename("简历 v2.pdf"), "v2.pdf");
        assert_eq!(secure_filename("简历"), "");
        assert_eq!(secure_filename("!!!"), "");
    }

    #[test]
    fn test_secure_filename_transliterates_accents() {
        assert_eq!(
            secure_filename("Nguy\u{1ec5}n V\u{103}n A.pdf"),
            "Nguyen_Van_A.pdf"
        );
        assert_eq!(
            secure_filename("Nguye\u{302}\u{303}n V\u{103}n A.pdf"),
            "Nguyen_Van_A.pdf"
        );
        assert_eq!(secure_filename("\u{ff43}\u{ff56}.pdf"), "cv.pdf");
    }

    #[test]
    fn test_sanitized_upload_name_keeps_extension() {
        assert_eq!(sanitized_upload_name("My CV.pdf", "pdf"), "My_CV.pdf");
        assert_eq!(sanitized_upload_name("Scan 01.PNG", "png"), "Scan_01.PNG");
        assert_eq!(sanitized_upload_name("简历.pdf", "pdf"), "pdf.pdf");
        assert_eq!(sanitized_upload_name("简历", "pdf"), "cv.pdf");
    }

    #[test]
    fn test_validate_requires_file_field() {
        let err = validate(form(None, "Engineer", "Senior")).unwrap_err();
        assert!(matches!(err, UploadError::NoFile));
    }

    #[test]
    fn test_validate_rejects_empty_filename() {
        let err = validate(form(Some(""), "Engineer", "Senior")).unwrap_err();
        assert!(matches!(err, UploadError::NoFile));
    }

    #[test]
    fn test_validate_rejects_disallowed_extension() {
        let err = validate(form(Some("cv.docx"), "Engineer", "Senior")).unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedType));
    }

    #[test]
    fn test_validate_rejects_blank_job_fields() {
        let err = validate(form(Some("cv.pdf"), "   ", "Senior")).unwrap_err();
        assert!(matches!(err, UploadError::MissingJobInfo));
        let err = validate(form(Some("cv.pdf"), "Engineer", "")).unwrap_err();
        assert!(matches!(err, UploadError::MissingJobInfo));
    }

    #[test]
    fn test_validate_trims_job_fields() {
        let ok = validate(form(Some("cv.PDF"), "  Backend Engineer ", " Junior")).unwrap();
        assert_eq!(ok.job_title, "Backend Engineer");
        assert_eq!(ok.level, "Junior");
        assert_eq!(ok.extension, "pdf");
    }

    #[tokio::test]
    async fn test_save_upload_prefixes_uuid() {
        let tmp = tempfile::tempdir().unwrap();
        let valid = validate(form(Some("My CV.pdf"), "Engineer", "Senior")).unwrap();

        let record = save_upload(tmp.path(), valid).await.unwrap();

        assert_eq!(record.stored_filename, format!("{}_My_CV.pdf", record.id));
        assert_eq!(record.stem(), format!("{}_My_CV", record.id));
        assert_eq!(record.extension(), "pdf");
        assert_eq!(std::fs::read(&record.path).unwrap(), b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_save_upload_names_never_collide() {
        let tmp = tempfile::tempdir().unwrap();
        let a = save_upload(tmp.path(), validate(form(Some("cv.pdf"), "E", "S")).unwrap())
            .await
            .unwrap();
        let b = save_upload(tmp.path(), validate(form(Some("cv.pdf"), "E", "S")).unwrap())
            .await
            .unwrap();
        assert_ne!(a.stored_filename, b.stored_filename);
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 2);
    }
}
