//! Skill taxonomy: canonical skills, their aliases and categories

use crate::config::TaxonomyConfig;
use crate::error::{CvParserError, Result};
use crate::parser::patterns::{contains_word, is_whole_word};
use aho_corasick::AhoCorasick;
use log::{info, warn};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

const BUILTIN_TAXONOMY: &str = include_str!("../../config/skills_taxonomy.yaml");

static SHARED: OnceCell<Arc<SkillTaxonomy>> = OnceCell::new();

#[derive(Debug, Default, Deserialize)]
struct TaxonomyFile {
    #[serde(default)]
    synonyms: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    categories: BTreeMap<String, Vec<String>>,
}

/// A known skill term found in text.
#[derive(Debug, Clone, PartialEq)]
pub struct TermMatch<'t> {
    pub start: usize,
    pub end: usize,
    /// The text as written.
    pub text: &'t str,
    /// Canonical skill the term normalizes to.
    pub canonical: &'t str,
}

/// Read-only skill vocabulary.
///
/// Every canonical skill and alias is indexed lowercased. Lookups never fail:
/// unknown terms normalize to their own lowercased form.
pub struct SkillTaxonomy {
    synonyms: BTreeMap<String, Vec<String>>,
    categories: BTreeMap<String, Vec<String>>,
    lookup: HashMap<String, String>,
    /// Lowercased terms, longest first.
    terms: Vec<String>,
    matcher: Option<AhoCorasick>,
}

impl SkillTaxonomy {
    pub fn empty() -> Self {
        Self {
            synonyms: BTreeMap::new(),
            categories: BTreeMap::new(),
            lookup: HashMap::new(),
            terms: Vec::new(),
            matcher: None,
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: TaxonomyFile = serde_yaml::from_str(yaml)?;
        Self::from_parts(file.synonyms, file.categories)
    }

    pub fn from_parts(
        synonyms: BTreeMap<String, Vec<String>>,
        categories: BTreeMap<String, Vec<String>>,
    ) -> Result<Self> {
        let mut lookup = HashMap::new();

        // Canonical names first so an alias can never shadow another canonical.
        for canonical in synonyms.keys() {
            lookup.insert(canonical.trim().to_lowercase(), canonical.clone());
        }
        for (canonical, aliases) in &synonyms {
            for alias in aliases {
                let key = alias.trim().to_lowercase();
                if !key.is_empty() {
                    lookup.entry(key).or_insert_with(|| canonical.clone());
                }
            }
        }

        let mut terms: Vec<String> = lookup.keys().filter(|t| !t.is_empty()).cloned().collect();
        terms.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then_with(|| a.cmp(b)));

        let matcher = if terms.is_empty() {
            None
        } else {
            let matcher = AhoCorasick::builder()
                .ascii_case_insensitive(true)
                .build(&terms)
                .map_err(|e| CvParserError::Taxonomy(format!("Failed to build skill matcher: {}", e)))?;
            Some(matcher)
        };

        Ok(Self {
            synonyms,
            categories,
            lookup,
            terms,
            matcher,
        })
    }

    /// Load a taxonomy file. A missing file yields an empty taxonomy.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Skill taxonomy not found at {}; skill matching disabled", path.display());
            return Ok(Self::empty());
        }

        let content = std::fs::read_to_string(path)?;
        let taxonomy = Self::from_yaml_str(&content)?;
        info!(
            "Loaded skill taxonomy from {} ({} skills, {} terms)",
            path.display(),
            taxonomy.synonyms.len(),
            taxonomy.terms.len()
        );
        Ok(taxonomy)
    }

    /// The taxonomy bundled with the crate.
    pub fn builtin() -> Self {
        match Self::from_yaml_str(BUILTIN_TAXONOMY) {
            Ok(taxonomy) => taxonomy,
            Err(e) => {
                warn!("Built-in skill taxonomy is invalid: {}", e);
                Self::empty()
            }
        }
    }

    /// Process-wide built-in taxonomy, loaded on first use.
    pub fn shared() -> Arc<SkillTaxonomy> {
        SHARED.get_or_init(|| Arc::new(Self::builtin())).clone()
    }

    /// The configured taxonomy file, or the shared built-in one.
    pub fn from_config(config: &TaxonomyConfig) -> Result<Arc<SkillTaxonomy>> {
        match &config.path {
            Some(path) => Ok(Arc::new(Self::load(path)?)),
            None => Ok(Self::shared()),
        }
    }

    /// Canonical form of `term`, or the lowercased term when it is unknown.
    pub fn normalize(&self, term: &str) -> String {
        let key = term.trim().to_lowercase();
        match self.lookup.get(&key) {
            Some(canonical) => canonical.clone(),
            None => key,
        }
    }

    pub fn canonical(&self, term: &str) -> Option<&str> {
        self.lookup.get(&term.trim().to_lowercase()).map(|c| c.as_str())
    }

    /// Every canonical skill and alias, lowercased, longest first.
    pub fn all_skills(&self) -> &[String] {
        &self.terms
    }

    pub fn synonyms(&self) -> &BTreeMap<String, Vec<String>> {
        &self.synonyms
    }

    pub fn categories(&self) -> &BTreeMap<String, Vec<String>> {
        &self.categories
    }

    pub fn category_of(&self, canonical: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|(_, skills)| skills.iter().any(|s| s.eq_ignore_ascii_case(canonical)))
            .map(|(name, _)| name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.synonyms.len()
    }

    /// Whole-word, case-insensitive occurrences of known terms, by position.
    ///
    /// Overlapping terms are all reported ("machine learning" and "learning"
    /// when both are known). Word boundaries are only enforced on a term edge
    /// that is itself a word character, so "C++" and "CI/CD" still match.
    pub fn find_direct_matches<'t>(&'t self, text: &'t str) -> Vec<TermMatch<'t>> {
        let Some(matcher) = &self.matcher else {
            return Vec::new();
        };

        let mut matches: Vec<TermMatch<'t>> = matcher
            .find_overlapping_iter(text)
            .filter(|m| is_whole_word(text, m.start(), m.end()))
            .filter_map(|m| {
                let term = &self.terms[m.pattern().as_usize()];
                self.lookup.get(term).map(|canonical| TermMatch {
                    start: m.start(),
                    end: m.end(),
                    text: &text[m.start()..m.end()],
                    canonical: canonical.as_str(),
                })
            })
            .collect();

        matches.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
        matches
    }

    /// Match a free-form candidate ("Spring", "Advanced SQL queries") to a
    /// known term: first a term equal to the candidate, then the longest term
    /// contained in it, then the shortest term containing it. Containment is
    /// on word boundaries.
    pub fn match_candidate(&self, candidate: &str) -> Option<&str> {
        let lower = candidate.trim().to_lowercase();
        if lower.is_empty() {
            return None;
        }
        if let Some(canonical) = self.lookup.get(&lower) {
            return Some(canonical.as_str());
        }

        let contained = self.terms.iter().find(|term| contains_word(&lower, term));
        let containing = || self.terms.iter().rev().find(|term| contains_word(term, &lower));

        contained
            .or_else(containing)
            .and_then(|term| self.lookup.get(term))
            .map(|c| c.as_str())
    }
}

impl std::fmt::Debug for SkillTaxonomy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkillTaxonomy")
            .field("skills", &self.synonyms.len())
            .field("terms", &self.terms.len())
            .field("categories", &self.categories.len())
            .finish()
    }
}
