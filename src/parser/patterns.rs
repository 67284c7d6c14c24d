//! Regex patterns, keyword vocabularies and pure extraction helpers.
//!
//! Stage logic never compiles its own regexes; everything it matches against
//! lives here.

use crate::parser::models::{DegreeLevel, SectionKind};
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

// --- Contact information ---

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("Invalid email regex")
});

static PHONE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\+?\d{1,3}[-. \t]?\(?\d{1,4}\)?[-. \t]?\d{1,4}[-. \t]?\d{1,9}",
        r"\b\d{3}[-. \t]?\d{3}[-. \t]?\d{4}\b",
        r"\b\d{10,12}\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid phone regex"))
    .collect()
});

static LINKEDIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:https?://)?(?:www\.)?linkedin\.com/in/[\w-]+/?").expect("Invalid LinkedIn regex")
});

/// Lines made only of digits and phone punctuation.
pub static PHONE_ONLY_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\d+\-()\s]+$").expect("Invalid phone line regex"));

// --- Dates ---

const MONTH: &str = r"(?:Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|Jun(?:e)?|Jul(?:y)?|Aug(?:ust)?|Sep(?:t(?:ember)?)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?)";
const RANGE_SEP: &str = r"[ \t]*(?:[-–—]+|to)[ \t]*";

/// Date range forms, most specific first. Separators never cross a line.
static DATE_RANGE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    let month_year = format!(r"{MONTH}\.?[ \t]*\d{{4}}");
    [
        format!(r"(?i)\b(?P<start>{month_year}){RANGE_SEP}(?P<end>{month_year})"),
        format!(r"(?i)\b(?P<start>{month_year}){RANGE_SEP}(?P<end>present|current)\b"),
        format!(r"(?i)\b(?P<start>\d{{1,2}}/\d{{4}}){RANGE_SEP}(?P<end>\d{{1,2}}/\d{{4}}|present|current)\b"),
        format!(r"(?i)\b(?P<start>\d{{4}}){RANGE_SEP}(?P<end>\d{{4}}|present|current)\b"),
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid date range regex"))
    .collect()
});

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").expect("Invalid year regex"));
static FOUR_DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}").expect("Invalid year regex"));
static MONTH_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)").expect("Invalid month regex")
});
static NUMERIC_MONTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})/\d{4}$").expect("Invalid numeric month regex"));

/// " at " between a job title and a company.
pub static AT_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+at\s+").expect("Invalid separator regex"));

// --- Education ---

/// Degree levels in detection order. Only the bare two-letter abbreviations
/// are case-sensitive so that words like "me" or "be" are not read as degrees.
static DEGREE_RES: Lazy<Vec<(DegreeLevel, Regex)>> = Lazy::new(|| {
    [
        (DegreeLevel::Phd, r"(?i)\b(?:ph\.?d\.?|d\.phil|doctor(?:ate)?)\b"),
        (
            DegreeLevel::Masters,
            r"\b(?:M\.?S\.?|M\.?A\.?|M\.?E\.?|(?i:m\.?sc\.?|mba|m\.?tech|master(?:'?s)?))\b",
        ),
        (
            DegreeLevel::Bachelors,
            r"\b(?:B\.?S\.?|B\.?A\.?|B\.?E\.?|(?i:b\.?sc\.?|b\.?tech|b\.?com|bba|bachelor(?:'?s)?|undergraduate))\b",
        ),
        (DegreeLevel::Diploma, r"(?i)\b(?:diploma|associate|certificate)\b"),
    ]
    .into_iter()
    .map(|(level, p)| (level, Regex::new(p).expect("Invalid degree regex")))
    .collect()
});

// --- Skill lists ---

/// Bullet lines, or whatever follows a "skills:"/"technologies:"/"tools:" label.
pub static SKILL_LIST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[ \t]*[-•*][ \t]*([^:\n]+?)[ \t]*$|(?:skills?|technolog(?:y|ies)|tools?)[ \t:]+([^.\n]+)")
        .expect("Invalid skill list regex")
});

pub static SKILL_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,;|/]").expect("Invalid skill split regex"));

// --- Vocabularies ---

pub const JOB_TITLE_KEYWORDS: &[&str] = &[
    "engineer", "developer", "manager", "director", "analyst", "consultant",
    "coordinator", "specialist", "executive", "officer", "lead", "head",
    "supervisor", "administrator", "assistant", "associate", "senior",
    "junior", "principal", "architect", "designer", "scientist", "intern",
    // logistics
    "logistics", "supply chain", "warehouse", "transportation", "procurement",
    "operations", "freight", "shipping", "inventory", "distribution",
];

pub const COMPANY_SUFFIXES: &[&str] = &[
    "inc", "inc.", "corp", "corp.", "corporation", "llc", "ltd", "ltd.",
    "limited", "pvt", "private", "co", "co.", "company", "group",
    "technologies", "solutions", "services", "consulting", "systems",
];

pub const SECTION_KEYWORDS: &[(SectionKind, &[&str])] = &[
    (
        SectionKind::Summary,
        &["summary", "profile", "objective", "about", "overview", "professional summary", "career objective", "about me"],
    ),
    (
        SectionKind::Experience,
        &["experience", "work history", "employment", "professional experience", "work experience", "career history", "positions held"],
    ),
    (
        SectionKind::Education,
        &["education", "academic", "qualifications", "educational background", "academic background", "degrees", "schooling"],
    ),
    (
        SectionKind::Skills,
        &["skills", "technical skills", "competencies", "expertise", "core competencies", "key skills", "proficiencies", "technologies"],
    ),
    (
        SectionKind::Certifications,
        &["certifications", "certificates", "licenses", "credentials", "professional certifications", "training"],
    ),
    (SectionKind::Languages, &["languages", "language skills", "linguistic abilities"]),
    (SectionKind::Projects, &["projects", "key projects", "notable projects", "portfolio"]),
    (
        SectionKind::Achievements,
        &["achievements", "awards", "honors", "accomplishments", "recognition", "publications"],
    ),
];

pub const KNOWN_LANGUAGES: &[&str] = &[
    "english", "arabic", "hindi", "urdu", "french", "spanish",
    "german", "mandarin", "chinese", "japanese", "korean",
    "portuguese", "russian", "italian", "dutch", "tamil",
    "telugu", "malayalam", "bengali", "punjabi", "marathi",
    "gujarati", "kannada", "tagalog", "thai", "vietnamese",
];

pub const UNIVERSITY_KEYWORDS: &[&str] = &[
    "university", "college", "institute", "school", "academy",
    "polytechnic", "iit", "mit", "stanford", "harvard", "oxford",
];

pub const FIELDS_OF_STUDY: &[&str] = &[
    "computer science", "information technology", "engineering",
    "business administration", "management", "economics", "finance",
    "mathematics", "physics", "chemistry", "biology", "commerce",
    "logistics", "supply chain", "operations", "data science",
    "artificial intelligence", "machine learning", "electrical",
    "mechanical", "civil", "chemical", "software",
];

const MONTHS: [&str; 12] = ["jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec"];

/// Keyword lists that decide what looks like a job title or a company.
///
/// Both lists are tuned for one CV corpus and are meant to be overridden from
/// configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heuristics {
    pub job_title_keywords: Vec<String>,
    pub company_suffixes: Vec<String>,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            job_title_keywords: JOB_TITLE_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            company_suffixes: COMPANY_SUFFIXES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Heuristics {
    pub fn is_likely_job_title(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.job_title_keywords.iter().any(|kw| lower.contains(kw.as_str()))
    }

    /// True when a whole word of `text` is a company suffix ("Acme Corp.").
    pub fn is_likely_company_name(&self, text: &str) -> bool {
        text.to_lowercase()
            .split_whitespace()
            .map(|w| w.trim_end_matches(|c| c == '.' || c == ','))
            .any(|w| self.company_suffixes.iter().any(|s| s.trim_end_matches('.') == w))
    }

    /// Looser check used when splitting "Title | Company" headers.
    pub fn mentions_company_suffix(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.company_suffixes.iter().any(|s| lower.contains(s.as_str()))
    }
}

/// A date range found in text. `start`/`end` are the raw endpoint tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct DateRange {
    pub raw: String,
    pub start: String,
    pub end: String,
}

impl DateRange {
    pub fn is_ongoing(&self) -> bool {
        is_present_token(&self.end)
    }
}

pub fn is_present_token(token: &str) -> bool {
    matches!(token.trim().to_lowercase().as_str(), "present" | "current")
}

// --- Extraction functions ---

/// Distinct email addresses in order of appearance.
pub fn extract_emails(text: &str) -> Vec<String> {
    let mut emails: Vec<String> = Vec::new();
    for m in EMAIL_RE.find_iter(text) {
        if !emails.iter().any(|e| e == m.as_str()) {
            emails.push(m.as_str().to_string());
        }
    }
    emails
}

/// Up to two phone numbers in order of appearance.
///
/// A candidate must hold 7 to 15 digits (a leading `+` counts). Candidates
/// overlapping one already accepted are skipped so one number is not reported
/// twice by different patterns.
pub fn extract_phones(text: &str) -> Vec<String> {
    let mut candidates: Vec<(usize, usize, &str)> = PHONE_RES
        .iter()
        .flat_map(|re| re.find_iter(text).map(|m| (m.start(), m.end(), m.as_str())))
        .filter(|(_, _, s)| {
            let significant = s.chars().filter(|c| c.is_ascii_digit() || *c == '+').count();
            (7..=15).contains(&significant)
        })
        .collect();
    candidates.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

    let mut accepted: Vec<(usize, usize, String)> = Vec::new();
    for (start, end, raw) in candidates {
        let phone = raw.trim().to_string();
        let overlaps = accepted.iter().any(|(s, e, _)| start < *e && *s < end);
        if overlaps || accepted.iter().any(|(_, _, p)| *p == phone) {
            continue;
        }
        accepted.push((start, end, phone));
        if accepted.len() == 2 {
            break;
        }
    }
    accepted.into_iter().map(|(_, _, p)| p).collect()
}

pub fn extract_linkedin(text: &str) -> Option<String> {
    LINKEDIN_RE.find(text).map(|m| m.as_str().to_string())
}

/// All date ranges in `text`, in order of appearance.
///
/// Each form is tried in turn; a match overlapping a range found by an earlier
/// (more specific) form is dropped.
pub fn extract_date_ranges(text: &str) -> Vec<DateRange> {
    let mut found: Vec<(usize, usize, DateRange)> = Vec::new();
    for re in DATE_RANGE_RES.iter() {
        for caps in re.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            if found.iter().any(|(s, e, _)| whole.start() < *e && *s < whole.end()) {
                continue;
            }
            found.push((
                whole.start(),
                whole.end(),
                DateRange {
                    raw: whole.as_str().to_string(),
                    start: caps.name("start").map(|m| m.as_str().to_string()).unwrap_or_default(),
                    end: caps.name("end").map(|m| m.as_str().to_string()).unwrap_or_default(),
                },
            ));
        }
    }
    found.sort_by_key(|(start, _, _)| *start);
    found.into_iter().map(|(_, _, range)| range).collect()
}

/// All 19xx/20xx years, ascending.
pub fn extract_years(text: &str) -> Vec<i32> {
    let mut years: Vec<i32> = YEAR_RE.find_iter(text).filter_map(|m| m.as_str().parse().ok()).collect();
    years.sort_unstable();
    years
}

pub fn first_year(text: &str) -> Option<i32> {
    YEAR_RE.find(text).and_then(|m| m.as_str().parse().ok())
}

/// First matching degree level, checked from highest to lowest.
pub fn detect_degree_level(text: &str) -> Option<DegreeLevel> {
    DEGREE_RES.iter().find(|(_, re)| re.is_match(text)).map(|(level, _)| *level)
}

pub fn is_likely_job_title(text: &str) -> bool {
    let lower = text.to_lowercase();
    JOB_TITLE_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

pub fn is_likely_company_name(text: &str) -> bool {
    text.to_lowercase()
        .split_whitespace()
        .map(|w| w.trim_end_matches(|c| c == '.' || c == ','))
        .any(|w| COMPANY_SUFFIXES.iter().any(|s| s.trim_end_matches('.') == w))
}

/// Resolve a date token to (year, month).
///
/// Present/current resolve to `today`. Otherwise a four-digit year is
/// required; the month comes from a month name or an `MM/YYYY` prefix and
/// defaults to `default_month`.
fn resolve_month_year(token: &str, default_month: u32, today: NaiveDate) -> Option<(i32, u32)> {
    if is_present_token(token) {
        return Some((today.year(), today.month()));
    }
    let year: i32 = FOUR_DIGITS_RE.find(token)?.as_str().parse().ok()?;
    let month = if let Some(m) = MONTH_NAME_RE.find(token) {
        let abbrev = m.as_str().to_lowercase();
        MONTHS.iter().position(|name| *name == abbrev)? as u32 + 1
    } else if let Some(caps) = NUMERIC_MONTH_RE.captures(token.trim()) {
        let month: u32 = caps[1].parse().ok()?;
        if !(1..=12).contains(&month) {
            return None;
        }
        month
    } else {
        default_month
    };
    Some((year, month))
}

/// Months between two date tokens, or `None` when either side can't be read
/// or the range runs backwards. An empty end counts as ongoing.
pub fn months_between(start: &str, end: &str, today: NaiveDate) -> Option<i64> {
    if start.trim().is_empty() {
        return None;
    }
    let (start_year, start_month) = resolve_month_year(start, 1, today)?;
    let (end_year, end_month) = if end.trim().is_empty() {
        (today.year(), today.month())
    } else {
        resolve_month_year(end, 12, today)?
    };
    let months = i64::from(end_year - start_year) * 12 + i64::from(end_month) - i64::from(start_month);
    (months >= 0).then_some(months)
}

// --- Text utilities ---

/// First `max` grapheme clusters of `text`.
pub fn truncate_graphemes(text: &str, max: usize) -> String {
    text.graphemes(true).take(max).collect()
}

/// Uppercase the first letter of every word, lowercase the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// True when `text[start..end]` is not glued to a neighbouring word.
///
/// A boundary is only required on an edge that is itself a word character,
/// so terms like "C++" or ".NET" still count as whole words.
pub fn is_whole_word(text: &str, start: usize, end: usize) -> bool {
    let term = &text[start..end];
    let starts_with_word = term.chars().next().map_or(false, is_word_char);
    let ends_with_word = term.chars().next_back().map_or(false, is_word_char);

    let before_ok = !starts_with_word || text[..start].chars().next_back().map_or(true, |c| !is_word_char(c));
    let after_ok = !ends_with_word || text[end..].chars().next().map_or(true, |c| !is_word_char(c));
    before_ok && after_ok
}

/// True when `needle` occurs in `haystack` as whole words.
pub fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack
        .match_indices(needle)
        .any(|(start, matched)| is_whole_word(haystack, start, start + matched.len()))
}

/// True when `needle` occurs in `haystack` starting at a word boundary.
///
/// The match may end inside a word, so "experience" is found in
/// "work experiences" while "about" is not found in "roundabout".
pub fn contains_word_start(haystack: &str, needle: &str) -> bool {
    let Some(first) = needle.chars().next() else {
        return false;
    };
    haystack.match_indices(needle).any(|(start, _)| {
        !is_word_char(first) || haystack[..start].chars().next_back().map_or(true, |c| !is_word_char(c))
    })
}

/// Strip leading bullet characters and surrounding whitespace.
pub fn strip_bullet(line: &str) -> &str {
    line.trim().trim_start_matches(|c: char| matches!(c, '-' | '•' | '*') || c.is_whitespace())
}
