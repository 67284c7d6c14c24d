use crate::error::ParsingStageError;
use crate::parser::pipeline::{ParserStage, ParsingContext};

/// Normalizes line endings. Anything more would shift what later stages see.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextCleaner;

impl ParserStage for TextCleaner {
    fn name(&self) -> &'static str {
        "TextCleaner"
    }

    fn process(&self, context: &mut ParsingContext) -> anyhow::Result<()> {
        let raw = context.raw_text();
        if raw.trim().is_empty() {
            return Err(ParsingStageError::new(self.name(), "Empty or whitespace-only input text").into());
        }

        let cleaned = raw.replace("\r\n", "\n").replace('\r', "\n");
        let original_length = raw.chars().count();

        context.set_metadata(self.name(), "original_length", original_length);
        context.set_metadata(self.name(), "cleaned_length", cleaned.chars().count());
        context.cleaned_text = Some(cleaned);
        Ok(())
    }
}
