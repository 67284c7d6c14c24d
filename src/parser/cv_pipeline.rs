//! The CV parser: six stages in a fixed order plus post-processing

use crate::config::{ConfidenceWeights, Config, SegmentationConfig};
use crate::error::{ParsingStageError, Result};
use crate::input::InputManager;
use crate::parser::education_extractor::EducationExtractor;
use crate::parser::embeddings::{resolve_encoder, TextEncoder};
use crate::parser::entity_extractor::EntityExtractor;
use crate::parser::experience_extractor::ExperienceExtractor;
use crate::parser::models::{ParsedCV, ParsedExperience, SectionKind};
use crate::parser::patterns::{strip_bullet, title_case, Heuristics, KNOWN_LANGUAGES};
use crate::parser::pipeline::{Pipeline, ParsingContext};
use crate::parser::section_segmenter::SectionSegmenter;
use crate::parser::skill_normalizer::SkillNormalizer;
use crate::parser::taxonomy::SkillTaxonomy;
use crate::parser::text_cleaner::TextCleaner;
use chrono::NaiveDate;
use log::{debug, warn};
use std::path::Path;
use std::sync::Arc;

/// Turns CV text into a [`ParsedCV`].
///
/// Stage order: TextCleaner → SectionSegmenter → EntityExtractor →
/// SkillNormalizer → ExperienceExtractor → EducationExtractor.
///
/// ```
/// use cv_parser::CvParsingPipeline;
///
/// let parser = CvParsingPipeline::new();
/// let cv = parser.parse("Jane Mary Doe\njane@example.com\n\nSKILLS\nPython, SQL");
/// assert_eq!(cv.name.as_deref(), Some("Jane Mary Doe"));
/// assert!(cv.extraction_confidence > 0.0);
/// ```
pub struct CvParsingPipeline {
    pipeline: Pipeline,
    weights: ConfidenceWeights,
}

/// Dependencies for a [`CvParsingPipeline`]; anything left unset uses its default.
#[derive(Default)]
pub struct CvParsingPipelineBuilder {
    taxonomy: Option<Arc<SkillTaxonomy>>,
    encoder: Option<Arc<dyn TextEncoder>>,
    heuristics: Heuristics,
    weights: ConfidenceWeights,
    segmentation: SegmentationConfig,
    today: Option<NaiveDate>,
}

impl CvParsingPipelineBuilder {
    pub fn taxonomy(mut self, taxonomy: Arc<SkillTaxonomy>) -> Self {
        self.taxonomy = Some(taxonomy);
        self
    }

    pub fn encoder(mut self, encoder: Option<Arc<dyn TextEncoder>>) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn heuristics(mut self, heuristics: Heuristics) -> Self {
        self.heuristics = heuristics;
        self
    }

    pub fn confidence(mut self, weights: ConfidenceWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn segmentation(mut self, segmentation: SegmentationConfig) -> Self {
        self.segmentation = segmentation;
        self
    }

    /// Date that "Present" resolves to; defaults to the local date at parse time.
    pub fn today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn build(self) -> CvParsingPipeline {
        let taxonomy = self.taxonomy.unwrap_or_else(SkillTaxonomy::shared);

        let mut experience = ExperienceExtractor::new(self.heuristics);
        if let Some(today) = self.today {
            experience = experience.with_today(today);
        }

        let mut pipeline = Pipeline::new();
        pipeline
            .add_stage(TextCleaner)
            .add_stage(SectionSegmenter::new(self.encoder, &self.segmentation))
            .add_stage(EntityExtractor)
            .add_stage(SkillNormalizer::new(taxonomy))
            .add_stage(experience)
            .add_stage(EducationExtractor);

        CvParsingPipeline {
            pipeline,
            weights: self.weights,
        }
    }
}

impl Default for CvParsingPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl CvParsingPipeline {
    /// Keyword-only section detection with the built-in taxonomy.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> CvParsingPipelineBuilder {
        CvParsingPipelineBuilder::default()
    }

    /// Build from configuration, loading the taxonomy file and embedding model it names.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::builder()
            .taxonomy(SkillTaxonomy::from_config(&config.taxonomy)?)
            .encoder(resolve_encoder(&config.embeddings))
            .heuristics(config.heuristics.clone())
            .confidence(config.confidence.clone())
            .segmentation(config.segmentation.clone())
            .build())
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Run the stages without post-processing, for inspecting intermediate state.
    pub fn execute(&self, text: &str) -> std::result::Result<ParsingContext, ParsingStageError> {
        self.pipeline.execute(text)
    }

    /// Parse CV text. Never fails: problems are reported through
    /// `parsing_warnings`, and a failed run has zero confidence.
    pub fn parse(&self, text: &str) -> ParsedCV {
        match self.pipeline.execute(text) {
            Ok(context) => self.finish(context),
            Err(e) => {
                warn!("CV parsing failed: {}", e);
                ParsedCV::failed(text, format!("Parsing error: {}", e))
            }
        }
    }

    /// Read and parse a CV file. Missing files and formats without text
    /// extraction come back as a warning on an empty result.
    pub async fn parse_file(&self, path: &Path) -> ParsedCV {
        let mut input = InputManager::new().with_cache(false);
        self.parse_file_with(&mut input, path).await
    }

    pub async fn parse_file_with(&self, input: &mut InputManager, path: &Path) -> ParsedCV {
        match input.read_text(path).await {
            Ok(text) => self.parse(&text),
            Err(e) => {
                debug!("Could not read {}: {}", path.display(), e);
                ParsedCV::failed("", e.to_string())
            }
        }
    }

    fn finish(&self, mut context: ParsingContext) -> ParsedCV {
        if let Some(text) = context.sections.get(SectionKind::Languages) {
            context.languages = extract_languages(text);
        }
        if let Some(text) = context.sections.get(SectionKind::Certifications) {
            context.certifications = extract_certifications(text);
        }

        let mut cv = ParsedCV::new(context.raw_text());
        cv.contact = context.entities.contact.unwrap_or_default();
        cv.name = context.entities.name;
        cv.summary = context.entities.summary;
        cv.skills = context.skills;
        cv.total_experience_years = total_experience_years(&context.experiences);
        cv.experience = context.experiences;
        cv.education = context.education;
        cv.languages = context.languages;
        cv.certifications = context.certifications;
        cv.parsing_warnings = context.warnings;
        cv.extraction_confidence = extraction_confidence(&cv, &self.weights);
        cv
    }
}

/// Sum of known job durations in years, to one decimal.
pub fn total_experience_years(experiences: &[ParsedExperience]) -> Option<f64> {
    let total_months: i64 = experiences.iter().filter_map(|e| e.duration_months).sum();
    (total_months > 0).then(|| round_to(total_months as f64 / 12.0, 1))
}

/// Known language names mentioned in `text`, title-cased, in vocabulary order.
pub fn extract_languages(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    KNOWN_LANGUAGES
        .iter()
        .filter(|lang| lower.contains(*lang))
        .map(|lang| title_case(lang))
        .collect()
}

/// One entry per non-empty line, bullets stripped.
pub fn extract_certifications(text: &str) -> Vec<String> {
    text.lines()
        .map(strip_bullet)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Share of the weighted checklist a result fills, in `[0, 1]`, to two decimals.
pub fn extraction_confidence(cv: &ParsedCV, weights: &ConfidenceWeights) -> f64 {
    let max_score = weights.max_score();
    if max_score <= 0.0 {
        return 0.0;
    }

    let mut score = 0.0;
    if cv.name.is_some() {
        score += weights.name;
    }
    if cv.contact.email.is_some() {
        score += weights.email;
    }
    if cv.contact.phone.is_some() {
        score += weights.phone;
    }
    score += (cv.skills.len() as f64 * weights.per_skill).min(weights.skills_cap);
    score += (cv.experience.len() as f64 * weights.per_experience).min(weights.experience_cap);
    score += (cv.education.len() as f64 * weights.per_education).min(weights.education_cap);
    if cv.summary.as_deref().is_some_and(|text| !text.trim().is_empty()) {
        score += weights.summary;
    }

    round_to((score / max_score).clamp(0.0, 1.0), 2)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
