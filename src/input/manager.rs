//! Input manager for reading CV files

use crate::error::{CvParserError, Result};
use crate::input::file_detector::{dotted_extension, FileType};
use crate::input::text_extractor::{DocxExtractor, PdfExtractor, PlainTextExtractor, TextExtractor};
use log::{debug, info};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub struct InputManager {
    cache: HashMap<PathBuf, String>,
    enable_cache: bool,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            enable_cache: true,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    /// Read the text of a CV file.
    ///
    /// Plain text is read as is. PDF and Word files are recognized but
    /// rejected with [`CvParserError::NotImplemented`].
    pub async fn read_text(&mut self, path: &Path) -> Result<String> {
        if self.enable_cache {
            if let Some(cached_text) = self.cache.get(path) {
                debug!("Using cached text for: {}", path.display());
                return Ok(cached_text.clone());
            }
        }

        if !path.exists() {
            return Err(CvParserError::FileNotFound(path.to_path_buf()));
        }

        let text = match FileType::from_path(path) {
            FileType::Text => {
                info!("Reading plain text file: {}", path.display());
                PlainTextExtractor.extract(path).await?
            }
            FileType::Pdf => PdfExtractor.extract(path).await?,
            FileType::Docx => DocxExtractor.extract(path).await?,
            FileType::Unknown => {
                return Err(CvParserError::UnsupportedFormat(dotted_extension(path)));
            }
        };

        if self.enable_cache {
            self.cache.insert(path.to_path_buf(), text.clone());
        }

        Ok(text)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_reads_and_caches_text_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cv.txt");
        std::fs::write(&path, "Jane Mary Doe").unwrap();

        let mut input = InputManager::new();
        assert_eq!(input.read_text(&path).await.unwrap(), "Jane Mary Doe");
        assert_eq!(input.cache_size(), 1);

        std::fs::write(&path, "changed").unwrap();
        assert_eq!(input.read_text(&path).await.unwrap(), "Jane Mary Doe");

        input.clear_cache();
        assert_eq!(input.read_text(&path).await.unwrap(), "changed");
    }

    #[tokio::test]
    async fn test_placeholder_and_unsupported_formats() {
        let dir = tempdir().unwrap();
        let mut input = InputManager::new().with_cache(false);

        let pdf = dir.path().join("cv.pdf");
        std::fs::write(&pdf, b"%PDF-1.4").unwrap();
        let err = input.read_text(&pdf).await.unwrap_err();
        assert!(matches!(err, CvParserError::NotImplemented(_)));
        assert_eq!(err.to_string(), "PDF parsing not yet implemented. Please provide extracted text.");

        let rtf = dir.path().join("cv.rtf");
        std::fs::write(&rtf, "{\\rtf1}").unwrap();
        let err = input.read_text(&rtf).await.unwrap_err();
        assert_eq!(err.to_string(), "Unsupported file format: .rtf");

        let missing = dir.path().join("missing.txt");
        let err = input.read_text(&missing).await.unwrap_err();
        assert!(matches!(err, CvParserError::FileNotFound(_)));
        assert_eq!(input.cache_size(), 0);
    }
}
