use crate::config::SegmentationConfig;
use crate::error::ParsingStageError;
use crate::parser::embeddings::{dot, TextEncoder};
use crate::parser::models::{SectionKind, Sections};
use crate::parser::patterns::{contains_word_start, SECTION_KEYWORDS};
use crate::parser::pipeline::{ParserStage, ParsingContext};
use log::debug;
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::sync::Arc;

type KeywordEmbeddings = Vec<(SectionKind, Vec<f32>)>;

/// Shortest header that may match as the start of a longer keyword.
const MIN_PARTIAL_HEADER_LEN: usize = 4;

/// Splits the cleaned text into named sections.
///
/// Short lines are header candidates. A candidate is matched against the
/// section keyword table first and, when an encoder is present, by embedding
/// similarity against the same keywords.
pub struct SectionSegmenter {
    encoder: Option<Arc<dyn TextEncoder>>,
    header_max_len: usize,
    similarity_threshold: f32,
    keyword_embeddings: OnceCell<Option<KeywordEmbeddings>>,
}

impl Default for SectionSegmenter {
    fn default() -> Self {
        Self::new(None, &SegmentationConfig::default())
    }
}

impl SectionSegmenter {
    pub fn new(encoder: Option<Arc<dyn TextEncoder>>, config: &SegmentationConfig) -> Self {
        Self {
            encoder,
            header_max_len: config.header_max_len,
            similarity_threshold: config.similarity_threshold,
            keyword_embeddings: OnceCell::new(),
        }
    }

    pub fn has_encoder(&self) -> bool {
        self.encoder.is_some()
    }

    /// Section a header line names, with a confidence in `[0, 1]`.
    pub fn detect_section(&self, header: &str) -> Option<(SectionKind, f32)> {
        let header_clean = header.trim().to_lowercase();
        if header_clean.is_empty() {
            return None;
        }

        let partial_ok = header_clean.chars().count() >= MIN_PARTIAL_HEADER_LEN;
        for (kind, keywords) in SECTION_KEYWORDS {
            let hit = keywords.iter().any(|kw| {
                contains_word_start(&header_clean, kw) || (partial_ok && contains_word_start(kw, &header_clean))
            });
            if hit {
                return Some((*kind, 1.0));
            }
        }

        self.detect_by_similarity(header.trim())
    }

    fn detect_by_similarity(&self, header: &str) -> Option<(SectionKind, f32)> {
        let encoder = self.encoder.as_ref()?;
        let keywords = self.keyword_embeddings(encoder.as_ref())?;

        let header_embedding = match encoder.encode(&[header.to_string()]) {
            Ok(mut vectors) if !vectors.is_empty() => vectors.swap_remove(0),
            Ok(_) => return None,
            Err(e) => {
                debug!("Header embedding failed, skipping similarity match: {}", e);
                return None;
            }
        };

        let mut best: Option<SectionKind> = None;
        let mut best_score = 0.0_f32;
        for (kind, embedding) in keywords {
            let similarity = dot(&header_embedding, embedding);
            if similarity > best_score {
                best_score = similarity;
                best = Some(*kind);
            }
        }

        best.filter(|_| best_score >= self.similarity_threshold)
            .map(|kind| (kind, best_score))
    }

    /// Keyword vectors, computed on first use and kept for the segmenter's lifetime.
    fn keyword_embeddings(&self, encoder: &dyn TextEncoder) -> Option<&KeywordEmbeddings> {
        self.keyword_embeddings
            .get_or_init(|| {
                let (kinds, keywords): (Vec<SectionKind>, Vec<String>) = SECTION_KEYWORDS
                    .iter()
                    .flat_map(|(kind, kws)| kws.iter().map(move |kw| (*kind, kw.to_string())))
                    .unzip();

                match encoder.encode(&keywords) {
                    Ok(vectors) if vectors.len() == kinds.len() => {
                        Some(kinds.into_iter().zip(vectors).collect())
                    }
                    Ok(vectors) => {
                        debug!(
                            "Encoder returned {} vectors for {} keywords; similarity matching off",
                            vectors.len(),
                            kinds.len()
                        );
                        None
                    }
                    Err(e) => {
                        debug!("Keyword embedding failed; similarity matching off: {}", e);
                        None
                    }
                }
            })
            .as_ref()
    }

    /// Partition `text` into sections in the order their headers appear.
    ///
    /// Returns the sections and whether any header was recognized.
    pub fn segment(&self, text: &str) -> (Sections, bool) {
        let mut sections = Sections::new();
        let mut current = SectionKind::Header;
        let mut buffer: Vec<&str> = Vec::new();
        let mut found_header = false;

        for line in text.split('\n') {
            let stripped = line.trim();

            if !stripped.is_empty() && stripped.chars().count() < self.header_max_len {
                if let Some((kind, confidence)) = self.detect_section(stripped) {
                    if confidence >= self.similarity_threshold {
                        if !buffer.is_empty() {
                            sections.insert(current, buffer.join("\n").trim().to_string());
                        }
                        current = kind;
                        buffer.clear();
                        found_header = true;
                        continue;
                    }
                }
            }

            buffer.push(line);
        }

        if !buffer.is_empty() {
            sections.insert(current, buffer.join("\n").trim().to_string());
        }

        (sections, found_header)
    }
}

impl ParserStage for SectionSegmenter {
    fn name(&self) -> &'static str {
        "SectionSegmenter"
    }

    fn process(&self, context: &mut ParsingContext) -> anyhow::Result<()> {
        let text = match context.cleaned_text.as_deref() {
            Some(text) if !text.is_empty() => text,
            _ => {
                return Err(ParsingStageError::new(self.name(), "No cleaned text available for segmentation").into())
            }
        };

        let (sections, found_header) = self.segment(text);

        if sections.is_empty() || !found_header {
            context.add_warning(self.name(), "No sections detected in CV");
        }

        let names: Vec<Value> = sections.names().into_iter().map(Value::from).collect();
        context.set_metadata(self.name(), "section_count", sections.len());
        context.set_metadata(self.name(), "section_names", names);
        context.sections = sections;
        Ok(())
    }
}
