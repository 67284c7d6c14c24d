//! Error handling for the CV parser

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CvParserError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Skill taxonomy error: {0}")]
    Taxonomy(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error(transparent)]
    Stage(#[from] ParsingStageError),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Formats the parser recognizes but deliberately does not extract yet.
    #[error("{0}")]
    NotImplemented(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

pub type Result<T> = std::result::Result<T, CvParserError>;

impl From<serde_yaml::Error> for CvParserError {
    fn from(err: serde_yaml::Error) -> Self {
        CvParserError::Taxonomy(err.to_string())
    }
}

/// Failure of a single pipeline stage, tagged with the stage that raised it.
///
/// Stages return this directly for failures they understand (for example empty
/// input to the text cleaner). Anything else a stage returns, or a panic inside
/// it, is wrapped by the pipeline with the stage name and kept as `cause`.
#[derive(Error, Debug)]
#[error("[{stage}] {message}{}", caused_by(.cause))]
pub struct ParsingStageError {
    pub stage: String,
    pub message: String,
    cause: Option<anyhow::Error>,
}

impl ParsingStageError {
    pub fn new(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(
        stage: impl Into<String>,
        message: impl Into<String>,
        cause: anyhow::Error,
    ) -> Self {
        Self {
            stage: stage.into(),
            message: message.into(),
            cause: Some(cause),
        }
    }

    /// The error originally raised inside the stage, if this one wraps it.
    pub fn cause(&self) -> Option<&anyhow::Error> {
        self.cause.as_ref()
    }
}

fn caused_by(cause: &Option<anyhow::Error>) -> String {
    match cause {
        Some(err) => format!(" (caused by: {})", err),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_error_display() {
        let err = ParsingStageError::new("TextCleaner", "Empty or whitespace-only input text");
        assert_eq!(err.to_string(), "[TextCleaner] Empty or whitespace-only input text");
        assert!(err.cause().is_none());
    }

    #[test]
    fn test_stage_error_keeps_cause() {
        let err = ParsingStageError::with_cause(
            "SkillNormalizer",
            "Unexpected error: boom",
            anyhow::anyhow!("boom"),
        );
        assert_eq!(err.stage, "SkillNormalizer");
        assert!(err.to_string().ends_with("(caused by: boom)"));
        assert_eq!(err.cause().map(|c| c.to_string()), Some("boom".to_string()));
    }

    #[test]
    fn test_file_errors_read_as_warnings() {
        let err = CvParserError::FileNotFound(PathBuf::from("missing.txt"));
        assert_eq!(err.to_string(), "File not found: missing.txt");

        let err = CvParserError::UnsupportedFormat(".xyz".to_string());
        assert_eq!(err.to_string(), "Unsupported file format: .xyz");
    }
}
