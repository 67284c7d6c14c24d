//! Configuration management for the CV parser

use crate::error::{CvParserError, Result};
use crate::parser::patterns::Heuristics;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub taxonomy: TaxonomyConfig,
    #[serde(default)]
    pub embeddings: EmbeddingConfig,
    #[serde(default)]
    pub segmentation: SegmentationConfig,
    #[serde(default)]
    pub heuristics: Heuristics,
    #[serde(default)]
    pub confidence: ConfidenceWeights,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyConfig {
    /// YAML taxonomy to use instead of the built-in one.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub enabled: bool,
    /// Local model directory or HuggingFace repo id.
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Lines at least this many characters long are never section headers.
    pub header_max_len: usize,
    /// Minimum confidence for a header to open a new section.
    pub similarity_threshold: f32,
}

/// Point weights of the extraction-confidence checklist.
///
/// The maximum score is the sum of the flat weights and the three caps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceWeights {
    pub name: f64,
    pub email: f64,
    pub phone: f64,
    pub per_skill: f64,
    pub skills_cap: f64,
    pub per_experience: f64,
    pub experience_cap: f64,
    pub per_education: f64,
    pub education_cap: f64,
    pub summary: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "minishlab/potion-base-8M".to_string(),
        }
    }
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            header_max_len: 50,
            similarity_threshold: 0.6,
        }
    }
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            name: 15.0,
            email: 10.0,
            phone: 5.0,
            per_skill: 3.0,
            skills_cap: 25.0,
            per_experience: 8.0,
            experience_cap: 25.0,
            per_education: 8.0,
            education_cap: 15.0,
            summary: 5.0,
        }
    }
}

impl ConfidenceWeights {
    pub fn max_score(&self) -> f64 {
        self.name
            + self.email
            + self.phone
            + self.skills_cap
            + self.experience_cap
            + self.education_cap
            + self.summary
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Console,
            detailed: false,
            color_output: true,
        }
    }
}

impl Config {
    /// Load from the user config directory, writing defaults on first use.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| CvParserError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| CvParserError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("cv-parser")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        let threshold = self.segmentation.similarity_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(CvParserError::Configuration(format!(
                "segmentation.similarity_threshold must be within [0, 1], got {}",
                threshold
            )));
        }
        if self.segmentation.header_max_len == 0 {
            return Err(CvParserError::Configuration(
                "segmentation.header_max_len must be positive".to_string(),
            ));
        }
        if self.confidence.max_score() <= 0.0 {
            return Err(CvParserError::Configuration(
                "confidence weights must add up to a positive score".to_string(),
            ));
        }
        Ok(())
    }
}
