//! Integration tests for the CV parser

use chrono::{Datelike, Local, NaiveDate};
use cv_parser::config::Config;
use cv_parser::input::InputManager;
use cv_parser::parser::{DegreeLevel, SectionKind};
use cv_parser::{CvParsingPipeline, ParsedCV};
use std::collections::HashSet;
use std::path::Path;
use tempfile::tempdir;

const JANE_CV: &str = "Jane Mary Doe\njane.doe@example.com\n+1-555-123-4567\n\nSKILLS\nPython, SQL, AWS\n\nEXPERIENCE\nSoftware Engineer at Acme Corp\nJan 2020 - Dec 2022\n- Built APIs\n\nEDUCATION\nBachelor of Science, Computer Science\nState University\n2019";

fn fixed_parser() -> CvParsingPipeline {
    CvParsingPipeline::builder()
        .today(NaiveDate::from_ymd_opt(2026, 10, 15).unwrap())
        .build()
}

fn skill_names(cv: &ParsedCV) -> Vec<&str> {
    cv.skills.iter().map(|s| s.normalized_skill.as_str()).collect()
}

#[test]
fn test_complete_cv() {
    let cv = fixed_parser().parse(JANE_CV);

    assert_eq!(cv.name.as_deref(), Some("Jane Mary Doe"));
    assert_eq!(cv.contact.email.as_deref(), Some("jane.doe@example.com"));
    assert_eq!(cv.contact.phone.as_deref(), Some("+1-555-123-4567"));
    assert_eq!(skill_names(&cv), vec!["python", "sql", "aws"]);

    assert_eq!(cv.experience.len(), 1);
    let job = &cv.experience[0];
    assert_eq!(job.job_title.as_deref(), Some("Software Engineer"));
    assert_eq!(job.company_name.as_deref(), Some("Acme Corp"));
    assert_eq!(job.duration_months, Some(35));
    assert!(!job.is_current);
    assert_eq!(job.responsibilities.as_deref(), Some("Built APIs"));
    assert_eq!(cv.total_experience_years, Some(2.9));

    assert_eq!(cv.education.len(), 1);
    assert_eq!(cv.education[0].degree, DegreeLevel::Bachelors);
    assert_eq!(cv.education[0].institution.as_deref(), Some("State University"));
    assert_eq!(cv.education[0].graduation_year, Some(2019));

    // 15 + 10 + 5 + 9 + 8 + 8
    assert_eq!(cv.extraction_confidence, 0.55);
    assert!(cv.parsing_warnings.is_empty(), "{:?}", cv.parsing_warnings);
}

#[test]
fn test_ongoing_job() {
    let cv = fixed_parser().parse("EXPERIENCE\nDevOps Lead at Beta Inc\n2021 - Present");

    let job = &cv.experience[0];
    assert_eq!(job.job_title.as_deref(), Some("DevOps Lead"));
    assert_eq!(job.company_name.as_deref(), Some("Beta Inc"));
    assert!(job.is_current);
    assert_eq!(job.start_date.as_deref(), Some("2021"));
    assert_eq!(job.end_date.as_deref(), Some("Present"));
    assert_eq!(job.duration_months, Some(69));
}

#[test]
fn test_ongoing_job_resolves_against_local_date() {
    let cv = CvParsingPipeline::new().parse("EXPERIENCE\nDevOps Lead at Beta Inc\n2021 - Present");

    let today = Local::now().date_naive();
    let expected = i64::from(today.year() - 2021) * 12 + i64::from(today.month()) - 1;
    assert_eq!(cv.experience[0].duration_months, Some(expected));
}

#[test]
fn test_empty_input() {
    for text in ["", "   \n\t  "] {
        let cv = CvParsingPipeline::new().parse(text);

        assert_eq!(cv.extraction_confidence, 0.0);
        assert_eq!(cv.raw_text, text);
        assert!(!cv.parsing_warnings.is_empty());
        assert!(cv.parsing_warnings[0].starts_with("Parsing error: [TextCleaner]"));
    }
}

#[test]
fn test_no_sections_detected() {
    let text = "Lorem ipsum dolor sit amet consectetur";
    let parser = CvParsingPipeline::new();

    let context = parser.execute(text).unwrap();
    assert_eq!(context.sections.len(), 1);
    assert_eq!(context.sections.get(SectionKind::Header), Some(text));
    assert!(context
        .warnings
        .contains(&"[SectionSegmenter] No sections detected in CV".to_string()));

    let cv = parser.parse(text);
    assert!(cv.skills.is_empty());
    assert!(cv.experience.is_empty());
    assert!(cv
        .parsing_warnings
        .contains(&"[ExperienceExtractor] No experience section found".to_string()));
}

#[test]
fn test_empty_summary_earns_no_confidence() {
    let cv = fixed_parser().parse("Jane Mary Doe\n\nSUMMARY\n\nSKILLS\nPython");

    assert_eq!(cv.summary, None);
    assert_eq!(skill_names(&cv), vec!["python"]);
    // 15 + 3
    assert_eq!(cv.extraction_confidence, 0.18);
}

#[test]
fn test_bulleted_roles_without_dates() {
    let cv = fixed_parser().parse("EXPERIENCE\n- Logistics Manager\n- Warehouse Supervisor");

    let titles: Vec<_> = cv.experience.iter().map(|e| e.job_title.as_deref()).collect();
    assert_eq!(titles, vec![Some("Logistics Manager"), Some("Warehouse Supervisor")]);
    assert!(cv.experience.iter().all(|e| e.duration_months.is_none()));
}

#[test]
fn test_parse_is_idempotent() {
    let parser = fixed_parser();
    assert_eq!(parser.parse(JANE_CV), parser.parse(JANE_CV));
}

#[test]
fn test_confidence_stays_in_range() {
    let parser = fixed_parser();
    let inputs = [
        JANE_CV,
        "",
        "just one line",
        "SKILLS\nPython, Java, Rust, Go lang, SQL, AWS, Docker, Kubernetes, Terraform, Redis, Kafka",
        include_str!("fixtures/sample_cv.txt"),
    ];

    for text in inputs {
        let confidence = parser.parse(text).extraction_confidence;
        assert!((0.0..=1.0).contains(&confidence), "{} for {:?}", confidence, text);
    }
}

#[test]
fn test_skills_are_unique() {
    let text = "Jane Doe\nPython developer\n\nSUMMARY\nPython and SQL\n\nSKILLS\nPython, python3, SQL\n- Python\n\nEXPERIENCE\nEngineer at Acme Corp\n2019 - 2021\n- Wrote Python and SQL daily";
    let cv = fixed_parser().parse(text);

    let names = skill_names(&cv);
    let unique: HashSet<&str> = names.iter().copied().collect();
    assert_eq!(names.len(), unique.len());
    assert_eq!(cv.skills[0].normalized_skill, "python");
    assert_eq!(cv.skills[0].source_section, "skills");
}

#[test]
fn test_raw_text_is_kept_verbatim() {
    let text = "Jane Doe\r\nSKILLS\r\nRust\r\n";
    let cv = fixed_parser().parse(text);

    assert_eq!(cv.raw_text, text);
    assert_eq!(skill_names(&cv), vec!["rust"]);
}

#[test]
fn test_same_month_range_has_zero_duration() {
    let cv = fixed_parser().parse("EXPERIENCE\nWarehouse Supervisor, Delta Ltd\nMar 2020 - Mar 2020");

    assert_eq!(cv.experience[0].duration_months, Some(0));
    assert_eq!(cv.total_experience_years, None);
}

#[tokio::test]
async fn test_parse_fixture_file() {
    let cv = fixed_parser().parse_file(Path::new("tests/fixtures/sample_cv.txt")).await;

    assert_eq!(cv.name.as_deref(), Some("Priya Raman"));
    assert_eq!(cv.contact.email.as_deref(), Some("priya.raman@example.com"));
    assert_eq!(cv.contact.phone.as_deref(), Some("+91 98765 43210"));
    assert_eq!(cv.contact.linkedin_url.as_deref(), Some("linkedin.com/in/priyaraman"));
    assert!(cv.summary.as_deref().unwrap().starts_with("Logistics manager"));

    assert_eq!(cv.experience.len(), 2);
    assert_eq!(cv.experience[0].job_title.as_deref(), Some("Senior Logistics Manager"));
    assert_eq!(cv.experience[0].company_name.as_deref(), Some("Oceanic Marine Ltd"));
    assert!(cv.experience[0].is_current);
    assert_eq!(cv.experience[0].duration_months, Some(91));
    assert_eq!(cv.experience[1].company_name.as_deref(), Some("Northwind Traders"));
    assert_eq!(cv.experience[1].duration_months, Some(44));
    assert_eq!(cv.total_experience_years, Some(11.3));

    assert_eq!(cv.education[0].degree, DegreeLevel::Masters);
    assert_eq!(cv.education[0].field_of_study.as_deref(), Some("Supply Chain"));
    assert_eq!(cv.education[0].institution.as_deref(), Some("Institute of Logistics"));
    assert_eq!(cv.education[0].graduation_year, Some(2015));

    assert_eq!(cv.languages, vec!["English", "Hindi", "Tamil"]);
    assert_eq!(cv.certifications, vec!["APICS CSCP", "Lean Six Sigma Green Belt"]);

    let names = skill_names(&cv);
    for expected in ["excel", "power bi", "sql", "team leadership", "logistics", "sap", "freight forwarding"] {
        assert!(names.contains(&expected), "missing {} in {:?}", expected, names);
    }
    assert_eq!(cv.extraction_confidence, 0.84);
    assert!(cv.parsing_warnings.is_empty(), "{:?}", cv.parsing_warnings);
}

#[tokio::test]
async fn test_parse_file_placeholders() {
    let dir = tempdir().unwrap();
    let parser = CvParsingPipeline::new();

    let cases = [
        ("cv.pdf", "PDF parsing not yet implemented. Please provide extracted text."),
        ("cv.docx", "DOCX parsing not yet implemented. Please provide extracted text."),
        ("cv.doc", "DOCX parsing not yet implemented. Please provide extracted text."),
        ("cv.rtf", "Unsupported file format: .rtf"),
    ];
    for (name, warning) in cases {
        let path = dir.path().join(name);
        std::fs::write(&path, "binary").unwrap();

        let cv = parser.parse_file(&path).await;
        assert_eq!(cv.parsing_warnings, vec![warning.to_string()], "{}", name);
        assert_eq!(cv.extraction_confidence, 0.0);
        assert!(cv.raw_text.is_empty());
    }
}

#[tokio::test]
async fn test_parse_missing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.txt");

    let cv = CvParsingPipeline::new().parse_file(&path).await;
    assert_eq!(
        cv.parsing_warnings,
        vec![format!("File not found: {}", path.display())]
    );
}

#[tokio::test]
async fn test_parse_text_file_with_cache() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cv.txt");
    std::fs::write(&path, JANE_CV).unwrap();

    let parser = fixed_parser();
    let mut input = InputManager::new();
    let first = parser.parse_file_with(&mut input, &path).await;
    std::fs::remove_file(&path).unwrap();
    let second = parser.parse_file_with(&mut input, &path).await;

    assert_eq!(input.cache_size(), 1);
    assert_eq!(first, second);
    assert_eq!(first.name.as_deref(), Some("Jane Mary Doe"));
}

#[test]
fn test_pipeline_from_config_with_custom_taxonomy() {
    let dir = tempdir().unwrap();
    let taxonomy_path = dir.path().join("taxonomy.yaml");
    std::fs::write(&taxonomy_path, "synonyms:\n  forklift operation: [forklift]\n").unwrap();

    let mut config = Config::default();
    config.embeddings.enabled = false;
    config.taxonomy.path = Some(taxonomy_path);

    let parser = CvParsingPipeline::from_config(&config).unwrap();
    let cv = parser.parse("Sam Lee\n\nSKILLS\nForklift, Python");

    assert_eq!(skill_names(&cv), vec!["forklift operation"]);
    assert_eq!(cv.skills[0].skill, "Forklift");
}

#[test]
fn test_pipeline_is_shareable_across_threads() {
    let parser = std::sync::Arc::new(fixed_parser());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let parser = parser.clone();
            std::thread::spawn(move || parser.parse(JANE_CV))
        })
        .collect();

    let results: Vec<ParsedCV> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
}
