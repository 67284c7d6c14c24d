//! Stage-sequencing engine shared by every parsing stage.
//!
//! A [`Pipeline`] owns an ordered list of [`ParserStage`]s and threads one
//! [`ParsingContext`] through them. Stages talk to each other only through
//! the context.

use crate::error::ParsingStageError;
use crate::parser::models::{ContactInfo, ParsedEducation, ParsedExperience, Sections, SkillExtraction};
use log::debug;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// Entities pulled from the header and summary sections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entities {
    pub contact: Option<ContactInfo>,
    pub name: Option<String>,
    pub summary: Option<String>,
}

/// State accumulated while a CV moves through the pipeline.
///
/// The raw input is only reachable through [`ParsingContext::raw_text`], so no
/// stage can rewrite it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsingContext {
    raw_text: String,
    pub cleaned_text: Option<String>,
    pub sections: Sections,
    pub entities: Entities,
    pub experiences: Vec<ParsedExperience>,
    pub education: Vec<ParsedEducation>,
    pub skills: Vec<SkillExtraction>,
    pub certifications: Vec<String>,
    pub languages: Vec<String>,
    pub metadata: BTreeMap<String, BTreeMap<String, Value>>,
    pub warnings: Vec<String>,
}

impl ParsingContext {
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            ..Self::default()
        }
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn add_warning(&mut self, stage_name: &str, message: impl fmt::Display) {
        self.warnings.push(format!("[{}] {}", stage_name, message));
    }

    pub fn set_metadata(&mut self, stage_name: &str, key: &str, value: impl Into<Value>) {
        self.metadata
            .entry(stage_name.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }

    pub fn metadata_value(&self, stage_name: &str, key: &str) -> Option<&Value> {
        self.metadata.get(stage_name).and_then(|entries| entries.get(key))
    }
}

/// One parsing step.
///
/// `process` mutates the context in place and must leave `raw_text` alone.
/// Return a [`ParsingStageError`] for failures the stage understands; any
/// other error is tagged with [`ParserStage::name`] by the pipeline.
pub trait ParserStage: Send + Sync {
    fn name(&self) -> &'static str;

    fn process(&self, context: &mut ParsingContext) -> anyhow::Result<()>;
}

#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn ParserStage>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage; stages run in the order they were added.
    pub fn add_stage(&mut self, stage: impl ParserStage + 'static) -> &mut Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn stages(&self) -> impl Iterator<Item = &dyn ParserStage> {
        self.stages.iter().map(|s| s.as_ref())
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage over a fresh context built from `raw_text`.
    ///
    /// The first failing stage stops the run.
    pub fn execute(&self, raw_text: &str) -> Result<ParsingContext, ParsingStageError> {
        let mut context = ParsingContext::new(raw_text);

        for stage in &self.stages {
            let started = Instant::now();
            run_stage(stage.as_ref(), &mut context)?;
            debug!("{} finished in {:.2?}", stage.name(), started.elapsed());
        }

        Ok(context)
    }
}

fn run_stage(stage: &dyn ParserStage, context: &mut ParsingContext) -> Result<(), ParsingStageError> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| stage.process(context)));

    match outcome {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => match err.downcast::<ParsingStageError>() {
            Ok(tagged) => Err(tagged),
            Err(other) => Err(ParsingStageError::with_cause(
                stage.name(),
                format!("Unexpected error: {}", other),
                other,
            )),
        },
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(ParsingStageError::new(
                stage.name(),
                format!("Unexpected error: stage panicked: {}", reason),
            ))
        }
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pipeline: {}", self.stage_names().join(" → "))
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline").field("stages", &self.stage_names()).finish()
    }
}
