//! Records produced by the parser

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named CV section. `Header` holds everything before the first detected
/// section heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Header,
    Summary,
    Experience,
    Education,
    Skills,
    Certifications,
    Languages,
    Projects,
    Achievements,
}

impl SectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Header => "header",
            SectionKind::Summary => "summary",
            SectionKind::Experience => "experience",
            SectionKind::Education => "education",
            SectionKind::Skills => "skills",
            SectionKind::Certifications => "certifications",
            SectionKind::Languages => "languages",
            SectionKind::Projects => "projects",
            SectionKind::Achievements => "achievements",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Section texts in detection order.
///
/// Inserting a section that already exists replaces its text but keeps its
/// original position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sections(Vec<(SectionKind, String)>);

impl Sections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: SectionKind, text: String) {
        match self.0.iter_mut().find(|(k, _)| *k == kind) {
            Some(entry) => entry.1 = text,
            None => self.0.push((kind, text)),
        }
    }

    pub fn get(&self, kind: SectionKind) -> Option<&str> {
        self.0.iter().find(|(k, _)| *k == kind).map(|(_, text)| text.as_str())
    }

    pub fn contains(&self, kind: SectionKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.0.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SectionKind, &str)> {
        self.0.iter().map(|(k, text)| (*k, text.as_str()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub alternative_phone: Option<String>,
    pub linkedin_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedExperience {
    pub job_title: Option<String>,
    pub company_name: Option<String>,
    pub start_date: Option<String>,
    /// `"Present"` for an ongoing role.
    pub end_date: Option<String>,
    pub is_current: bool,
    /// Whole months between the dates. `None` when a date cannot be read or
    /// the range runs backwards.
    pub duration_months: Option<i64>,
    pub responsibilities: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegreeLevel {
    Phd,
    Masters,
    Bachelors,
    Diploma,
}

impl DegreeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DegreeLevel::Phd => "phd",
            DegreeLevel::Masters => "masters",
            DegreeLevel::Bachelors => "bachelors",
            DegreeLevel::Diploma => "diploma",
        }
    }
}

impl fmt::Display for DegreeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedEducation {
    pub degree: DegreeLevel,
    pub field_of_study: Option<String>,
    pub institution: Option<String>,
    pub graduation_year: Option<i32>,
}

impl ParsedEducation {
    pub fn new(degree: DegreeLevel) -> Self {
        Self {
            degree,
            field_of_study: None,
            institution: None,
            graduation_year: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillExtraction {
    /// The skill as written in the CV.
    pub skill: String,
    /// Canonical taxonomy form.
    pub normalized_skill: String,
    pub confidence: f32,
    pub source_section: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedCV {
    pub raw_text: String,
    pub name: Option<String>,
    pub contact: ContactInfo,
    pub summary: Option<String>,
    pub skills: Vec<SkillExtraction>,
    pub experience: Vec<ParsedExperience>,
    pub education: Vec<ParsedEducation>,
    pub total_experience_years: Option<f64>,
    pub languages: Vec<String>,
    pub certifications: Vec<String>,
    pub extraction_confidence: f64,
    pub parsing_warnings: Vec<String>,
}

impl ParsedCV {
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            ..Self::default()
        }
    }

    /// A result that carries only a warning, for inputs that never reached the pipeline.
    pub fn failed(raw_text: impl Into<String>, warning: impl Into<String>) -> Self {
        let mut cv = Self::new(raw_text);
        cv.parsing_warnings.push(warning.into());
        cv
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_keep_first_position_on_replace() {
        let mut sections = Sections::new();
        sections.insert(SectionKind::Header, "Jane".to_string());
        sections.insert(SectionKind::Skills, "Rust".to_string());
        sections.insert(SectionKind::Header, "Jane Doe".to_string());

        assert_eq!(sections.names(), vec!["header", "skills"]);
        assert_eq!(sections.get(SectionKind::Header), Some("Jane Doe"));
        assert!(!sections.contains(SectionKind::Education));
    }

    #[test]
    fn test_degree_serializes_lowercase() {
        let edu = ParsedEducation::new(DegreeLevel::Bachelors);
        let json = serde_json::to_value(&edu).unwrap();
        assert_eq!(json["degree"], "bachelors");
    }
}
