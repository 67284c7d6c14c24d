//! CV parsing: a linear pipeline of stages over a shared context

pub mod cv_pipeline;
pub mod education_extractor;
pub mod embeddings;
pub mod entity_extractor;
pub mod experience_extractor;
pub mod models;
pub mod patterns;
pub mod pipeline;
pub mod section_segmenter;
pub mod skill_normalizer;
pub mod taxonomy;
pub mod text_cleaner;

pub use cv_pipeline::{CvParsingPipeline, CvParsingPipelineBuilder};
pub use embeddings::TextEncoder;
pub use models::{
    ContactInfo, DegreeLevel, ParsedCV, ParsedEducation, ParsedExperience, SectionKind, Sections,
    SkillExtraction,
};
pub use pipeline::{ParserStage, ParsingContext, Pipeline};
pub use taxonomy::SkillTaxonomy;
