//! Turns an uploaded résumé into LLM input blocks.

use tracing::{debug, warn};

use crate::llm_client::InputBlock;
use crate::questions::generator::GenerationError;

/// Extracted text beyond this many characters is cut off before prompting.
const MAX_RESUME_CHARS: usize = 60_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Image { media_type: &'static str },
    /// Accepted by the upload form but not by the model (BMP, TIFF).
    Unsupported,
}

impl DocumentKind {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => DocumentKind::Pdf,
            "png" => DocumentKind::Image {
                media_type: "image/png",
            },
            "jpg" | "jpeg" => DocumentKind::Image {
                media_type: "image/jpeg",
            },
            _ => DocumentKind::Unsupported,
        }
    }
}

/// Builds the résumé block for a stored upload.
///
/// PDFs are sent as extracted text when they carry any; scanned PDFs (or
/// ones the extractor chokes on) go to the model as a document attachment.
pub async fn resume_block(bytes: Vec<u8>, extension: &str) -> Result<InputBlock, GenerationError> {
    match DocumentKind::from_extension(extension) {
        DocumentKind::Image { media_type } => Ok(InputBlock::image(media_type, &bytes)),
        DocumentKind::Unsupported => Err(GenerationError::UnsupportedDocument(
            extension.to_ascii_uppercase(),
        )),
        DocumentKind::Pdf => {
            let text = extract_pdf_text(bytes.clone()).await;
            match text {
                Ok(text) if !text.trim().is_empty() => {
                    debug!("Extracted {} characters of résumé text", text.len());
                    Ok(InputBlock::text(format!(
                        "Résumé text:\n\n{}",
                        truncate_chars(&text, MAX_RESUME_CHARS)
                    )))
                }
                Ok(_) => {
                    debug!("PDF has no text layer, sending it as a document");
                    Ok(InputBlock::pdf(&bytes))
                }
                Err(e) => {
                    warn!("PDF text extraction failed ({e}), sending it as a document");
                    Ok(InputBlock::pdf(&bytes))
                }
            }
        }
    }
}

async fn extract_pdf_text(bytes: Vec<u8>) -> Result<String, String> {
    tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem(&bytes).map_err(|e| e.to_string())
    })
    .await
    .map_err(|e| e.to_string())?
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_kind_from_extension() {
        assert_eq!(DocumentKind::from_extension("PDF"), DocumentKind::Pdf);
        assert_eq!(
            DocumentKind::from_extension("jpeg"),
            DocumentKind::Image {
                media_type: "image/jpeg"
            }
        );
        assert_eq!(
            DocumentKind::from_extension("png"),
            DocumentKind::Image {
                media_type: "image/png"
            }
        );
        assert_eq!(DocumentKind::from_extension("tiff"), DocumentKind::Unsupported);
        assert_eq!(DocumentKind::from_extension("bmp"), DocumentKind::Unsupported);
    }

    #[tokio::test]
    async fn test_resume_block_rejects_bmp() {
        let err = resume_block(vec![0x42, 0x4d], "bmp").await.unwrap_err();
        assert!(matches!(err, GenerationError::UnsupportedDocument(ref e) if e == "BMP"));
    }

    #[tokio::test]
    async fn test_resume_block_sends_images_inline() {
        let block = resume_block(vec![1, 2, 3], "jpg").await.unwrap();
        assert!(matches!(block, InputBlock::Image { .. }));
    }

    #[tokio::test]
    async fn test_unparseable_pdf_falls_back_to_document() {
        let block = resume_block(b"not really a pdf".to_vec(), "pdf").await.unwrap();
        assert!(matches!(block, InputBlock::Document { .. }));
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
