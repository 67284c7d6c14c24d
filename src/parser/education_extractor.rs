use crate::parser::models::{ParsedEducation, SectionKind};
use crate::parser::patterns::{
    contains_word, detect_degree_level, first_year, title_case, FIELDS_OF_STUDY, UNIVERSITY_KEYWORDS,
};
use crate::parser::pipeline::{ParserStage, ParsingContext};

/// Reads degrees out of the education section.
///
/// Each line naming a degree opens a record; the lines after it fill in the
/// institution and graduation year until the next degree line.
#[derive(Debug, Default, Clone, Copy)]
pub struct EducationExtractor;

impl EducationExtractor {
    pub fn extract_education(&self, text: &str) -> Vec<ParsedEducation> {
        let mut education = Vec::new();
        let mut current: Option<ParsedEducation> = None;

        for line in text.split('\n') {
            let stripped = line.trim();
            if stripped.is_empty() {
                continue;
            }
            let lower = stripped.to_lowercase();

            if let Some(degree) = detect_degree_level(stripped) {
                education.extend(current.take());

                let mut record = ParsedEducation::new(degree);
                record.field_of_study = FIELDS_OF_STUDY
                    .iter()
                    .find(|field| contains_word(&lower, field))
                    .map(|field| title_case(field));
                record.graduation_year = first_year(stripped);
                current = Some(record);
                continue;
            }

            let Some(record) = current.as_mut() else {
                continue;
            };

            if record.institution.is_none() && UNIVERSITY_KEYWORDS.iter().any(|kw| contains_word(&lower, kw)) {
                record.institution = Some(stripped.to_string());
            }
            if record.graduation_year.is_none() {
                record.graduation_year = first_year(stripped);
            }
        }

        education.extend(current);
        education
    }
}

impl ParserStage for EducationExtractor {
    fn name(&self) -> &'static str {
        "EducationExtractor"
    }

    fn process(&self, context: &mut ParsingContext) -> anyhow::Result<()> {
        if context.sections.is_empty() {
            context.add_warning(self.name(), "No sections available for education extraction");
            return Ok(());
        }

        let education = match context.sections.get(SectionKind::Education) {
            Some(text) => self.extract_education(text),
            None => {
                context.add_warning(self.name(), "No education section found");
                Vec::new()
            }
        };

        context.set_metadata(self.name(), "education_count", education.len());
        context.education = education;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::models::DegreeLevel;

    #[test]
    fn test_degree_with_following_lines() {
        let records = EducationExtractor.extract_education("Bachelor of Science, Computer Science\nState University\n2019");

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.degree, DegreeLevel::Bachelors);
        assert_eq!(record.field_of_study.as_deref(), Some("Computer Science"));
        assert_eq!(record.institution.as_deref(), Some("State University"));
        assert_eq!(record.graduation_year, Some(2019));
    }

    #[test]
    fn test_multiple_degrees() {
        let text = "MBA in Supply Chain, 2018\nInstitute of Logistics\n\nB.Tech Mechanical\nRiverside College\nGraduated 2012\nDean's list 2011";
        let records = EducationExtractor.extract_education(text);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].degree, DegreeLevel::Masters);
        assert_eq!(records[0].field_of_study.as_deref(), Some("Supply Chain"));
        assert_eq!(records[0].graduation_year, Some(2018));
        assert_eq!(records[0].institution.as_deref(), Some("Institute of Logistics"));

        assert_eq!(records[1].degree, DegreeLevel::Bachelors);
        assert_eq!(records[1].field_of_study.as_deref(), Some("Mechanical"));
        assert_eq!(records[1].institution.as_deref(), Some("Riverside College"));
        assert_eq!(records[1].graduation_year, Some(2012));
    }

    #[test]
    fn test_lines_before_first_degree_are_ignored() {
        let records = EducationExtractor.extract_education("Harvard University\n2010\nPhD in Physics");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].degree, DegreeLevel::Phd);
        assert_eq!(records[0].institution, None);
        assert_eq!(records[0].graduation_year, None);
    }

    #[test]
    fn test_missing_section_warns() {
        let mut context = ParsingContext::new("x");
        context.sections.insert(SectionKind::Skills, "Rust".to_string());
        EducationExtractor.process(&mut context).unwrap();

        assert!(context.education.is_empty());
        assert_eq!(context.warnings, vec!["[EducationExtractor] No education section found"]);
    }
}
