use crate::parser::models::{ParsedExperience, SectionKind};
use crate::parser::patterns::{
    extract_date_ranges, is_present_token, months_between, strip_bullet, DateRange, Heuristics,
    AT_SEPARATOR_RE,
};
use crate::parser::pipeline::{ParserStage, ParsingContext};
use chrono::{Local, NaiveDate};

const FALLBACK_LIMIT: usize = 5;
const FALLBACK_MAX_LINE: usize = 100;

/// Builds one [`ParsedExperience`] per job block of the experience section.
#[derive(Debug, Clone, Default)]
pub struct ExperienceExtractor {
    heuristics: Heuristics,
    today: Option<NaiveDate>,
}

/// A job block being assembled line by line.
#[derive(Default)]
struct OpenBlock {
    experience: ParsedExperience,
    responsibilities: Vec<String>,
}

impl OpenBlock {
    fn has_dates(&self) -> bool {
        self.experience.start_date.is_some()
    }

    fn has_header(&self) -> bool {
        self.experience.job_title.is_some() || self.experience.company_name.is_some()
    }

    fn finish(mut self) -> ParsedExperience {
        if !self.responsibilities.is_empty() {
            self.experience.responsibilities = Some(self.responsibilities.join("\n"));
        }
        self.experience
    }
}

impl ExperienceExtractor {
    pub fn new(heuristics: Heuristics) -> Self {
        Self { heuristics, today: None }
    }

    /// Fix the date that "Present" resolves to.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn extract_experiences(&self, text: &str) -> Vec<ParsedExperience> {
        let ranges = extract_date_ranges(text);
        if ranges.is_empty() {
            return self.extract_unstructured(text);
        }

        let today = self.today();
        let mut experiences = Vec::new();
        let mut open: Option<OpenBlock> = None;

        for line in text.split('\n') {
            let stripped = line.trim();
            if stripped.is_empty() {
                continue;
            }

            let is_bullet = stripped.starts_with('-') || stripped.starts_with('•');
            let range = ranges.iter().find(|r| stripped.contains(r.raw.as_str()));

            if let Some(range) = range {
                let header = strip_range(stripped, range);

                // A date line directly under a title belongs to that title.
                if header.is_empty() {
                    if let Some(block) = open.as_mut().filter(|b| !b.has_dates()) {
                        apply_range(&mut block.experience, range, today);
                        continue;
                    }
                }

                experiences.extend(open.take().map(OpenBlock::finish));
                let mut block = OpenBlock::default();
                self.parse_header(header, &mut block.experience);
                apply_range(&mut block.experience, range, today);
                open = Some(block);
            } else if !is_bullet && self.heuristics.is_likely_job_title(stripped) {
                // A title line under a bare date line completes that block.
                if let Some(block) = open
                    .as_mut()
                    .filter(|b| b.has_dates() && !b.has_header() && b.responsibilities.is_empty())
                {
                    self.parse_header(stripped, &mut block.experience);
                    continue;
                }

                experiences.extend(open.take().map(OpenBlock::finish));
                let mut block = OpenBlock::default();
                self.parse_header(stripped, &mut block.experience);
                open = Some(block);
            } else if let Some(block) = open.as_mut() {
                if is_bullet {
                    block.responsibilities.push(strip_bullet(stripped).to_string());
                } else if block.experience.company_name.is_none()
                    && block.responsibilities.is_empty()
                    && self.heuristics.is_likely_company_name(stripped)
                {
                    block.experience.company_name = Some(stripped.to_string());
                }
            }
        }

        experiences.extend(open.map(OpenBlock::finish));
        experiences
    }

    /// Title-only records for sections without any date range.
    fn extract_unstructured(&self, text: &str) -> Vec<ParsedExperience> {
        text.split('\n')
            .map(strip_bullet)
            .filter(|line| line.chars().count() < FALLBACK_MAX_LINE && self.heuristics.is_likely_job_title(line))
            .take(FALLBACK_LIMIT)
            .map(|line| ParsedExperience {
                job_title: Some(line.to_string()),
                ..ParsedExperience::default()
            })
            .collect()
    }

    /// Split a job header line into title and company.
    ///
    /// Tried in order: "Title at Company", "A | B" with each side classified,
    /// "Title, Company", and finally the whole line as a title.
    pub fn parse_header(&self, text: &str, experience: &mut ParsedExperience) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        let mut at_parts = AT_SEPARATOR_RE.split(text);
        if let (Some(title), Some(company)) = (at_parts.next(), at_parts.next()) {
            experience.job_title = non_empty(title);
            experience.company_name = non_empty(company);
            return;
        }

        if text.contains('|') {
            for part in text.split('|').map(str::trim) {
                if self.heuristics.is_likely_job_title(part) {
                    experience.job_title = non_empty(part);
                } else if self.heuristics.mentions_company_suffix(part) {
                    experience.company_name = non_empty(part);
                }
            }
            return;
        }

        let mut comma_parts = text.split(',');
        if let (Some(title), Some(company)) = (comma_parts.next(), comma_parts.next()) {
            experience.job_title = non_empty(title);
            experience.company_name = non_empty(company);
            return;
        }

        if self.heuristics.is_likely_job_title(text) {
            experience.job_title = Some(text.to_string());
        }
    }
}

impl ParserStage for ExperienceExtractor {
    fn name(&self) -> &'static str {
        "ExperienceExtractor"
    }

    fn process(&self, context: &mut ParsingContext) -> anyhow::Result<()> {
        if context.sections.is_empty() {
            context.add_warning(self.name(), "No sections available for experience extraction");
            return Ok(());
        }

        let experiences = match context.sections.get(SectionKind::Experience) {
            Some(text) => self.extract_experiences(text),
            None => {
                context.add_warning(self.name(), "No experience section found");
                Vec::new()
            }
        };

        context.set_metadata(self.name(), "experience_count", experiences.len());
        context.experiences = experiences;
        Ok(())
    }
}

fn apply_range(experience: &mut ParsedExperience, range: &DateRange, today: NaiveDate) {
    experience.start_date = non_empty(&range.start);
    if is_present_token(&range.end) {
        experience.is_current = true;
        experience.end_date = Some("Present".to_string());
    } else {
        experience.end_date = non_empty(&range.end);
    }
    experience.duration_months = months_between(&range.start, &range.end, today);
}

/// The line with its date range cut out, minus leftover separators.
fn strip_range<'a>(line: &'a str, range: &DateRange) -> &'a str {
    let Some(at) = line.find(range.raw.as_str()) else {
        return line;
    };
    let is_separator = |c: char| c.is_whitespace() || matches!(c, ',' | '|' | '-' | '–' | '—' | '(' | ')' | '[' | ']' | ':');
    let before = line[..at].trim_end_matches(is_separator);
    let after = line[at + range.raw.len()..].trim_matches(is_separator);
    if before.is_empty() {
        after
    } else {
        before
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> ExperienceExtractor {
        ExperienceExtractor::default().with_today(NaiveDate::from_ymd_opt(2026, 10, 15).unwrap())
    }

    #[test]
    fn test_title_then_date_line_is_one_job() {
        let text = "Software Engineer at Acme Corp\nJan 2020 - Dec 2022\n- Built APIs\n- Led migrations";
        let jobs = extractor().extract_experiences(text);

        assert_eq!(jobs.len(), 1);
        let job = &jobs[0];
        assert_eq!(job.job_title.as_deref(), Some("Software Engineer"));
        assert_eq!(job.company_name.as_deref(), Some("Acme Corp"));
        assert_eq!(job.start_date.as_deref(), Some("Jan 2020"));
        assert_eq!(job.end_date.as_deref(), Some("Dec 2022"));
        assert!(!job.is_current);
        assert_eq!(job.duration_months, Some(35));
        assert_eq!(job.responsibilities.as_deref(), Some("Built APIs\nLed migrations"));
    }

    #[test]
    fn test_ongoing_job() {
        let jobs = extractor().extract_experiences("DevOps Lead at Beta Inc\n2021 - Present");

        assert_eq!(jobs.len(), 1);
        assert!(jobs[0].is_current);
        assert_eq!(jobs[0].end_date.as_deref(), Some("Present"));
        assert_eq!(jobs[0].duration_months, Some(69));
    }

    #[test]
    fn test_date_first_layout() {
        let text = "Mar 2018 - Mar 2020\nLogistics Coordinator | Oceanic Ltd\n- Planned routes\n\
                    Apr 2020 - Present\nWarehouse Manager, Northwind\n- Ran night shift";
        let jobs = extractor().extract_experiences(text);

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].job_title.as_deref(), Some("Logistics Coordinator"));
        assert_eq!(jobs[0].company_name.as_deref(), Some("Oceanic Ltd"));
        assert_eq!(jobs[0].duration_months, Some(24));
        assert_eq!(jobs[0].responsibilities.as_deref(), Some("Planned routes"));
        assert_eq!(jobs[1].job_title.as_deref(), Some("Warehouse Manager"));
        assert_eq!(jobs[1].company_name.as_deref(), Some("Northwind"));
        assert!(jobs[1].is_current);
    }

    #[test]
    fn test_dates_on_the_header_line() {
        let jobs = extractor().extract_experiences("Data Analyst, Initech (03/2015 – 06/2017)");

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].job_title.as_deref(), Some("Data Analyst"));
        assert_eq!(jobs[0].company_name.as_deref(), Some("Initech"));
        assert_eq!(jobs[0].start_date.as_deref(), Some("03/2015"));
        assert_eq!(jobs[0].duration_months, Some(27));
    }

    #[test]
    fn test_same_month_ranges_are_whole_years() {
        for (start, end) in [(2015, 2015), (2015, 2016), (2010, 2022)] {
            let text = format!("Engineer at Acme\nJun {} - Jun {}", start, end);
            let jobs = extractor().extract_experiences(&text);
            assert_eq!(jobs[0].duration_months, Some(i64::from(end - start) * 12));
        }
    }

    #[test]
    fn test_bullets_with_title_words_stay_responsibilities() {
        let text = "Operations Manager at Contoso\n2019 - 2021\n- Managed logistics team of 12\n- Supervised warehouse staff";
        let jobs = extractor().extract_experiences(text);

        assert_eq!(jobs.len(), 1);
        assert_eq!(
            jobs[0].responsibilities.as_deref(),
            Some("Managed logistics team of 12\nSupervised warehouse staff")
        );
    }

    #[test]
    fn test_unstructured_fallback() {
        let text = "Senior Developer\nSome description\nProject Manager\nConsultant\nAnalyst\nArchitect\nDesigner";
        let jobs = extractor().extract_experiences(text);

        assert_eq!(jobs.len(), 5);
        assert_eq!(jobs[0].job_title.as_deref(), Some("Senior Developer"));
        assert!(jobs.iter().all(|j| j.start_date.is_none() && j.duration_months.is_none()));
    }

    #[test]
    fn test_unstructured_fallback_reads_bullets() {
        let text = "- Logistics Manager
• Warehouse Supervisor
- Loaded trucks";
        let titles: Vec<_> = extractor()
            .extract_experiences(text)
            .into_iter()
            .filter_map(|j| j.job_title)
            .collect();

        assert_eq!(titles, vec!["Logistics Manager", "Warehouse Supervisor"]);
    }

    #[test]
    fn test_header_separators() {
        let extractor = extractor();
        let parse = |line: &str| {
            let mut exp = ParsedExperience::default();
            extractor.parse_header(line, &mut exp);
            (exp.job_title, exp.company_name)
        };

        assert_eq!(parse("Engineer AT Globex"), (Some("Engineer".into()), Some("Globex".into())));
        assert_eq!(parse("Acme Corp | Senior Analyst"), (Some("Senior Analyst".into()), Some("Acme Corp".into())));
        assert_eq!(parse("Freelance, Remote"), (Some("Freelance".into()), Some("Remote".into())));
        assert_eq!(parse("Shift Supervisor"), (Some("Shift Supervisor".into()), None));
        assert_eq!(parse("Gap year"), (None, None));
    }

    #[test]
    fn test_missing_section_warns() {
        let mut context = ParsingContext::new("x");
        context.sections.insert(SectionKind::Header, "Jane".to_string());
        extractor().process(&mut context).unwrap();

        assert!(context.experiences.is_empty());
        assert_eq!(context.warnings, vec!["[ExperienceExtractor] No experience section found"]);
        assert_eq!(
            context.metadata_value("ExperienceExtractor", "experience_count"),
            Some(&serde_json::Value::from(0))
        );
    }
}
