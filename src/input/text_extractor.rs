//! Text extraction from CV files

use crate::error::{CvParserError, Result};
use std::path::Path;
use tokio::fs;

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let content = fs::read_to_string(path).await.map_err(CvParserError::Io)?;
        Ok(content)
    }
}

/// Recognized, but text has to be extracted upstream for now.
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    async fn extract(&self, _path: &Path) -> Result<String> {
        Err(CvParserError::NotImplemented(
            "PDF parsing not yet implemented. Please provide extracted text.".to_string(),
        ))
    }
}

/// Recognized, but text has to be extracted upstream for now.
pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    async fn extract(&self, _path: &Path) -> Result<String> {
        Err(CvParserError::NotImplemented(
            "DOCX parsing not yet implemented. Please provide extracted text.".to_string(),
        ))
    }
}
