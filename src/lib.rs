//! CV parser library

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod parser;

pub use config::Config;
pub use error::{CvParserError, ParsingStageError, Result};
pub use parser::{CvParsingPipeline, ParsedCV, SkillTaxonomy};
