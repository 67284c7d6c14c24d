//! Output formatters for parse reports

use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::report::{ConfidenceLevel, ParseReport};
use crate::parser::models::{ParsedCV, ParsedExperience};
use colored::{Color, Colorize};
use std::path::Path;

/// Trait for formatting parse reports
pub trait OutputFormatter {
    fn format_report(&self, report: &ParseReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Console formatter with colors
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

/// JSON formatter for downstream tooling
pub struct JsonFormatter {
    pretty: bool,
}

/// Markdown formatter for sharing results
pub struct MarkdownFormatter {
    include_metadata: bool,
    detailed: bool,
}

/// Picks the formatter for a requested output format
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

fn experience_heading(exp: &ParsedExperience) -> String {
    match (exp.job_title.as_deref(), exp.company_name.as_deref()) {
        (Some(title), Some(company)) => format!("{} at {}", title, company),
        (Some(title), None) => title.to_string(),
        (None, Some(company)) => company.to_string(),
        (None, None) => "Untitled role".to_string(),
    }
}

fn experience_period(exp: &ParsedExperience) -> Option<String> {
    let start = exp.start_date.as_deref()?;
    let mut period = format!("{} - {}", start, or_dash(exp.end_date.as_deref()));
    if let Some(months) = exp.duration_months {
        period.push_str(&format!(", {} months", months));
    }
    Some(period)
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };
        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_confidence_badge(&self, level: ConfidenceLevel) -> String {
        let color = match level {
            ConfidenceLevel::High => Color::Green,
            ConfidenceLevel::Medium => Color::Yellow,
            ConfidenceLevel::Low => Color::Red,
        };
        if self.use_colors {
            format!("[{}]", level.label().color(color).bold())
        } else {
            format!("[{}]", level.label())
        }
    }

    fn format_candidate(&self, cv: &ParsedCV, output: &mut String) {
        output.push_str(&self.format_header("Candidate", 2));
        output.push_str(&format!("Name: {}\n", or_dash(cv.name.as_deref())));
        output.push_str(&format!("Email: {}\n", or_dash(cv.contact.email.as_deref())));
        output.push_str(&format!("Phone: {}\n", or_dash(cv.contact.phone.as_deref())));
        if let Some(alt) = &cv.contact.alternative_phone {
            output.push_str(&format!("Alternative phone: {}\n", alt));
        }
        if let Some(linkedin) = &cv.contact.linkedin_url {
            output.push_str(&format!("LinkedIn: {}\n", linkedin));
        }
        if let Some(summary) = &cv.summary {
            output.push_str(&format!("\n{}\n", summary));
        }
    }

    fn format_skills(&self, cv: &ParsedCV, output: &mut String) {
        output.push_str(&self.format_header(&format!("Skills ({})", cv.skills.len()), 2));
        if cv.skills.is_empty() {
            output.push_str("No skills found\n");
        } else if self.detailed {
            for skill in &cv.skills {
                output.push_str(&format!(
                    "  • {} {}\n",
                    self.colorize(&skill.normalized_skill, Color::Cyan),
                    self.colorize(
                        &format!("(\"{}\" in {}, {:.0}%)", skill.skill, skill.source_section, skill.confidence * 100.0),
                        Color::BrightBlack,
                    )
                ));
            }
        } else {
            let names: Vec<&str> = cv.skills.iter().map(|s| s.normalized_skill.as_str()).collect();
            output.push_str(&format!("{}\n", names.join(", ")));
        }
    }

    fn format_experience(&self, cv: &ParsedCV, output: &mut String) {
        let title = match cv.total_experience_years {
            Some(years) => format!("Experience ({}, {:.1} years)", cv.experience.len(), years),
            None => format!("Experience ({})", cv.experience.len()),
        };
        output.push_str(&self.format_header(&title, 2));

        for exp in &cv.experience {
            let heading = experience_heading(exp);
            output.push_str(&format!("  • {}", self.colorize(&heading, Color::Cyan)));
            if let Some(period) = experience_period(exp) {
                output.push_str(&format!(" ({})", period));
            }
            if exp.is_current {
                output.push_str(&format!(" {}", self.colorize("current", Color::Green)));
            }
            output.push('\n');

            if self.detailed {
                if let Some(responsibilities) = &exp.responsibilities {
                    for line in responsibilities.lines() {
                        output.push_str(&format!("      {}\n", line));
                    }
                }
            }
        }
    }

    fn format_education(&self, cv: &ParsedCV, output: &mut String) {
        output.push_str(&self.format_header(&format!("Education ({})", cv.education.len()), 2));
        for edu in &cv.education {
            let mut line = format!("  • {}", self.colorize(edu.degree.as_str(), Color::Cyan));
            if let Some(field) = &edu.field_of_study {
                line.push_str(&format!(", {}", field));
            }
            if let Some(institution) = &edu.institution {
                line.push_str(&format!(" | {}", institution));
            }
            if let Some(year) = edu.graduation_year {
                line.push_str(&format!(" ({})", year));
            }
            output.push_str(&line);
            output.push('\n');
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &ParseReport) -> Result<String> {
        let cv = &report.cv;
        let mut output = String::new();

        output.push_str(&self.format_header("📄 CV PARSE RESULT", 1));
        if let Some(source) = &report.metadata.source_file {
            output.push_str(&format!("Source: {}\n", source));
        }
        output.push_str(&format!(
            "Extraction confidence: {}% {} | Processing time: {}ms\n",
            report.summary.confidence_percentage,
            self.format_confidence_badge(report.summary.confidence_level),
            report.metadata.processing_time_ms
        ));

        self.format_candidate(cv, &mut output);
        self.format_skills(cv, &mut output);
        self.format_experience(cv, &mut output);
        self.format_education(cv, &mut output);

        if !cv.languages.is_empty() {
            output.push_str(&self.format_header("Languages", 3));
            output.push_str(&format!("{}\n", cv.languages.join(", ")));
        }
        if !cv.certifications.is_empty() {
            output.push_str(&self.format_header("Certifications", 3));
            for cert in &cv.certifications {
                output.push_str(&format!("  • {}\n", cert));
            }
        }

        if !cv.parsing_warnings.is_empty() {
            output.push_str(&self.format_header(&format!("Warnings ({})", cv.parsing_warnings.len()), 3));
            for warning in &cv.parsing_warnings {
                output.push_str(&format!("  ⚠️  {}\n", self.colorize(warning, Color::Yellow)));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &ParseReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool, detailed: bool) -> Self {
        Self {
            include_metadata,
            detailed,
        }
    }

    fn escape_cell(text: &str) -> String {
        text.replace('|', "\\|").replace('\n', " ")
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &ParseReport) -> Result<String> {
        let cv = &report.cv;
        let mut output = String::new();

        output.push_str(&format!("# 📄 {}\n\n", cv.name.as_deref().unwrap_or("CV Parse Result")));

        if self.include_metadata {
            output.push_str(&format!(
                "**Generated:** {} | **Processing Time:** {}ms\n",
                chrono::DateTime::<chrono::Utc>::from(report.metadata.generated_at).format("%Y-%m-%d %H:%M:%S UTC"),
                report.metadata.processing_time_ms
            ));
            if let Some(source) = &report.metadata.source_file {
                let file_name = Path::new(source)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| source.clone());
                output.push_str(&format!("**Source:** `{}`\n", file_name));
            }
            output.push('\n');
        }

        output.push_str(&format!(
            "**Extraction confidence:** {}% ({})\n\n",
            report.summary.confidence_percentage,
            report.summary.confidence_level.label()
        ));

        output.push_str("## Contact\n\n");
        output.push_str(&format!("- **Email:** {}\n", or_dash(cv.contact.email.as_deref())));
        output.push_str(&format!("- **Phone:** {}\n", or_dash(cv.contact.phone.as_deref())));
        if let Some(alt) = &cv.contact.alternative_phone {
            output.push_str(&format!("- **Alternative phone:** {}\n", alt));
        }
        if let Some(linkedin) = &cv.contact.linkedin_url {
            output.push_str(&format!("- **LinkedIn:** {}\n", linkedin));
        }
        output.push('\n');

        if let Some(summary) = &cv.summary {
            output.push_str("## Summary\n\n");
            output.push_str(&format!("{}\n\n", summary));
        }

        if !cv.skills.is_empty() {
            output.push_str("## Skills\n\n");
            if self.detailed {
                output.push_str("| Skill | As written | Section | Confidence |\n");
                output.push_str("|-------|------------|---------|------------|\n");
                for skill in &cv.skills {
                    output.push_str(&format!(
                        "| {} | {} | {} | {:.0}% |\n",
                        Self::escape_cell(&skill.normalized_skill),
                        Self::escape_cell(&skill.skill),
                        skill.source_section,
                        skill.confidence * 100.0
                    ));
                }
            } else {
                let names: Vec<&str> = cv.skills.iter().map(|s| s.normalized_skill.as_str()).collect();
                output.push_str(&names.join(", "));
                output.push('\n');
            }
            output.push('\n');
        }

        if !cv.experience.is_empty() {
            output.push_str("## Experience\n\n");
            if let Some(years) = cv.total_experience_years {
                output.push_str(&format!("**Total:** {:.1} years\n\n", years));
            }
            for exp in &cv.experience {
                output.push_str(&format!("### {}\n\n", experience_heading(exp)));
                if let Some(period) = experience_period(exp) {
                    output.push_str(&format!("*{}*\n\n", period));
                }
                if self.detailed {
                    if let Some(responsibilities) = &exp.responsibilities {
                        for line in responsibilities.lines() {
                            output.push_str(&format!("- {}\n", line));
                        }
                        output.push('\n');
                    }
                }
            }
        }

        if !cv.education.is_empty() {
            output.push_str("## Education\n\n");
            output.push_str("| Degree | Field | Institution | Year |\n");
            output.push_str("|--------|-------|-------------|------|\n");
            for edu in &cv.education {
                output.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    edu.degree,
                    Self::escape_cell(or_dash(edu.field_of_study.as_deref())),
                    Self::escape_cell(or_dash(edu.institution.as_deref())),
                    edu.graduation_year.map(|y| y.to_string()).unwrap_or_else(|| "-".to_string())
                ));
            }
            output.push('\n');
        }

        if !cv.languages.is_empty() {
            output.push_str("## Languages\n\n");
            output.push_str(&format!("{}\n\n", cv.languages.join(", ")));
        }

        if !cv.certifications.is_empty() {
            output.push_str("## Certifications\n\n");
            for cert in &cv.certifications {
                output.push_str(&format!("- {}\n", cert));
            }
            output.push('\n');
        }

        if !cv.parsing_warnings.is_empty() {
            output.push_str("## Warnings\n\n");
            for warning in &cv.parsing_warnings {
                output.push_str(&format!("- ⚠️ {}\n", warning));
            }
            output.push('\n');
        }

        output.push_str(&format!("---\n*cv-parser v{}*\n", report.metadata.version));
        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false, true, true)
    }

    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool, include_metadata: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata, detailed),
        }
    }

    pub fn generate_report(&self, report: &ParseReport, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: &OutputFormat, source_name: &str, timestamp: bool) -> String {
    let base_name = Path::new(source_name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    match format {
        OutputFormat::Console => format!("{}_parsed{}.txt", base_name, timestamp_suffix),
        OutputFormat::Json => format!("{}_parsed{}.json", base_name, timestamp_suffix),
        OutputFormat::Markdown => format!("{}_parsed{}.md", base_name, timestamp_suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::models::{DegreeLevel, ParsedEducation, SkillExtraction};

    fn sample_report() -> ParseReport {
        let mut cv = ParsedCV::new("raw");
        cv.name = Some("Jane Mary Doe".to_string());
        cv.contact.email = Some("jane@example.com".to_string());
        cv.skills.push(SkillExtraction {
            skill: "Python3".to_string(),
            normalized_skill: "python".to_string(),
            confidence: 1.0,
            source_section: "skills".to_string(),
        });
        cv.experience.push(ParsedExperience {
            job_title: Some("Logistics Manager".to_string()),
            company_name: Some("ABC Corp".to_string()),
            start_date: Some("Jan 2020".to_string()),
            end_date: Some("Dec 2022".to_string()),
            duration_months: Some(35),
            responsibilities: Some("Ran the warehouse".to_string()),
            ..ParsedExperience::default()
        });
        cv.education.push(ParsedEducation {
            field_of_study: Some("Computer Science".to_string()),
            graduation_year: Some(2019),
            ..ParsedEducation::new(DegreeLevel::Bachelors)
        });
        cv.extraction_confidence = 0.52;
        ParseReport::new(cv, Some("/tmp/jane.txt".to_string()), 2)
    }

    #[test]
    fn test_console_without_colors() {
        let output = ConsoleFormatter::new(false, true).format_report(&sample_report()).unwrap();

        assert!(output.contains("Name: Jane Mary Doe"));
        assert!(output.contains("Extraction confidence: 52% [MEDIUM]"));
        assert!(output.contains("python (\"Python3\" in skills, 100%)"));
        assert!(output.contains("Logistics Manager at ABC Corp (Jan 2020 - Dec 2022, 35 months)"));
        assert!(output.contains("Ran the warehouse"));
        assert!(!output.contains("Warnings"));
    }

    #[test]
    fn test_json_is_parseable() {
        let output = JsonFormatter::new(false).format_report(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["cv"]["skills"][0]["normalized_skill"], "python");
        assert_eq!(value["cv"]["education"][0]["degree"], "bachelors");
        assert_eq!(value["summary"]["experience_count"], 1);
    }

    #[test]
    fn test_markdown_sections() {
        let output = MarkdownFormatter::new(true, false).format_report(&sample_report()).unwrap();

        assert!(output.starts_with("# 📄 Jane Mary Doe"));
        assert!(output.contains("**Source:** `jane.txt`"));
        assert!(output.contains("| bachelors | Computer Science | - | 2019 |"));
        assert!(!output.contains("Ran the warehouse"));
    }

    #[test]
    fn test_generator_dispatch() {
        let generator = ReportGenerator::with_options(false, false, true, false);
        let json = generator.generate_report(&sample_report(), &OutputFormat::Json).unwrap();
        assert!(json.trim_start().starts_with('{'));
        assert_eq!(ConsoleFormatter::new(false, false).supports_format(), OutputFormat::Console);
        assert_eq!(MarkdownFormatter::new(false, false).supports_format(), OutputFormat::Markdown);
    }

    #[test]
    fn test_suggest_filename() {
        assert_eq!(suggest_filename(&OutputFormat::Json, "cvs/jane.txt", false), "jane_parsed.json");
        assert_eq!(suggest_filename(&OutputFormat::Markdown, "jane", false), "jane_parsed.md");
    }
}
