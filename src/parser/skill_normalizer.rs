use crate::parser::models::{SectionKind, SkillExtraction};
use crate::parser::patterns::{SKILL_LIST_RE, SKILL_SPLIT_RE};
use crate::parser::pipeline::{ParserStage, ParsingContext};
use crate::parser::taxonomy::SkillTaxonomy;
use std::collections::HashSet;
use std::sync::Arc;

/// Sections searched for skills, in attribution order.
const SKILL_SECTIONS: [SectionKind; 4] = [
    SectionKind::Skills,
    SectionKind::Experience,
    SectionKind::Summary,
    SectionKind::Header,
];

const DIRECT_CONFIDENCE: f32 = 1.0;
const PATTERN_CONFIDENCE: f32 = 0.9;

/// Finds skills and maps them onto the taxonomy's canonical names.
pub struct SkillNormalizer {
    taxonomy: Arc<SkillTaxonomy>,
}

impl Default for SkillNormalizer {
    fn default() -> Self {
        Self::new(SkillTaxonomy::shared())
    }
}

impl SkillNormalizer {
    pub fn new(taxonomy: Arc<SkillTaxonomy>) -> Self {
        Self { taxonomy }
    }

    pub fn taxonomy(&self) -> &SkillTaxonomy {
        &self.taxonomy
    }

    /// Skills in one block of text, at most one per canonical name.
    ///
    /// Taxonomy terms found as whole words come first, in text order. Bullet
    /// items and "Skills:"-style lists then add what the direct pass missed.
    pub fn extract_skills(&self, text: &str, section: &str) -> Vec<SkillExtraction> {
        let mut extracted = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for found in self.taxonomy.find_direct_matches(text) {
            if seen.insert(found.canonical.to_string()) {
                extracted.push(SkillExtraction {
                    skill: found.text.to_string(),
                    normalized_skill: found.canonical.to_string(),
                    confidence: DIRECT_CONFIDENCE,
                    source_section: section.to_string(),
                });
            }
        }

        for caps in SKILL_LIST_RE.captures_iter(text) {
            let Some(listed) = caps.get(1).or_else(|| caps.get(2)) else {
                continue;
            };

            for candidate in SKILL_SPLIT_RE.split(listed.as_str()) {
                let candidate = candidate.trim();
                if !(2..=50).contains(&candidate.chars().count()) {
                    continue;
                }
                let Some(canonical) = self.taxonomy.match_candidate(candidate) else {
                    continue;
                };
                if seen.insert(canonical.to_string()) {
                    extracted.push(SkillExtraction {
                        skill: candidate.to_string(),
                        normalized_skill: canonical.to_string(),
                        confidence: PATTERN_CONFIDENCE,
                        source_section: section.to_string(),
                    });
                }
            }
        }

        extracted
    }
}

impl ParserStage for SkillNormalizer {
    fn name(&self) -> &'static str {
        "SkillNormalizer"
    }

    fn process(&self, context: &mut ParsingContext) -> anyhow::Result<()> {
        if context.sections.is_empty() {
            context.add_warning(self.name(), "No sections available for skill extraction");
            return Ok(());
        }

        let mut skills: Vec<SkillExtraction> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for kind in SKILL_SECTIONS {
            let Some(text) = context.sections.get(kind) else {
                continue;
            };
            for skill in self.extract_skills(text, kind.as_str()) {
                if seen.insert(skill.normalized_skill.clone()) {
                    skills.push(skill);
                }
            }
        }

        context.set_metadata(self.name(), "skill_count", skills.len());
        context.set_metadata(self.name(), "unique_skills", seen.len());
        context.skills = skills;
        Ok(())
    }
}
