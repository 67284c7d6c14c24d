//! Report structures wrapping a parse result with run metadata

use crate::parser::models::ParsedCV;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// One parsed CV plus what the formatters need to present it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseReport {
    pub metadata: ReportMetadata,
    pub summary: ReportSummary,
    pub cv: ParsedCV,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: SystemTime,
    pub processing_time_ms: u64,
    /// File the CV was read from; `None` for text passed in directly.
    pub source_file: Option<String>,
    pub version: String,
}

/// Headline counts, so consumers don't have to walk the CV.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub confidence_percentage: u8,
    pub confidence_level: ConfidenceLevel,
    pub skill_count: usize,
    pub experience_count: usize,
    pub education_count: usize,
    pub warning_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.7 {
            ConfidenceLevel::High
        } else if confidence >= 0.4 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "HIGH",
            ConfidenceLevel::Medium => "MEDIUM",
            ConfidenceLevel::Low => "LOW",
        }
    }
}

impl ParseReport {
    pub fn new(cv: ParsedCV, source_file: Option<String>, processing_time_ms: u64) -> Self {
        let summary = ReportSummary {
            confidence_percentage: (cv.extraction_confidence * 100.0).round().clamp(0.0, 100.0) as u8,
            confidence_level: ConfidenceLevel::from_confidence(cv.extraction_confidence),
            skill_count: cv.skills.len(),
            experience_count: cv.experience.len(),
            education_count: cv.education.len(),
            warning_count: cv.parsing_warnings.len(),
        };

        Self {
            metadata: ReportMetadata {
                generated_at: SystemTime::now(),
                processing_time_ms,
                source_file,
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            summary,
            cv,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let mut cv = ParsedCV::new("text");
        cv.extraction_confidence = 0.64;
        cv.parsing_warnings.push("[EducationExtractor] No education section found".to_string());

        let report = ParseReport::new(cv, Some("cv.txt".to_string()), 3);
        assert_eq!(report.summary.confidence_percentage, 64);
        assert_eq!(report.summary.confidence_level, ConfidenceLevel::Medium);
        assert_eq!(report.summary.warning_count, 1);
        assert_eq!(report.metadata.source_file.as_deref(), Some("cv.txt"));
    }

    #[test]
    fn test_confidence_levels() {
        assert_eq!(ConfidenceLevel::from_confidence(0.9), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_confidence(0.4), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_confidence(0.0), ConfidenceLevel::Low);
    }
}
