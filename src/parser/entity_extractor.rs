use crate::parser::models::{ContactInfo, SectionKind};
use crate::parser::patterns::{
    extract_emails, extract_linkedin, extract_phones, truncate_graphemes, PHONE_ONLY_LINE_RE,
};
use crate::parser::pipeline::{ParserStage, ParsingContext};

/// Text scanned for contact details when no header section exists.
const CONTACT_FALLBACK_LEN: usize = 500;
const SUMMARY_MAX_LEN: usize = 500;
const NAME_SCAN_LINES: usize = 5;

/// Pulls contact details, the candidate's name and the summary.
#[derive(Debug, Default, Clone, Copy)]
pub struct EntityExtractor;

impl EntityExtractor {
    pub fn extract_contact(&self, text: &str) -> ContactInfo {
        let mut phones = extract_phones(text).into_iter();
        ContactInfo {
            email: extract_emails(text).into_iter().next(),
            phone: phones.next(),
            alternative_phone: phones.next(),
            linkedin_url: extract_linkedin(text),
        }
    }

    /// First of the opening lines that reads like a name: two to four
    /// capitalized words and no digits.
    pub fn extract_name(&self, text: &str) -> Option<String> {
        text.split('\n')
            .take(NAME_SCAN_LINES)
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.contains('@') && !PHONE_ONLY_LINE_RE.is_match(line))
            .find(|line| looks_like_name(line))
            .map(str::to_string)
    }
}

fn looks_like_name(line: &str) -> bool {
    let words: Vec<&str> = line.split_whitespace().collect();
    (2..=4).contains(&words.len())
        && words.iter().all(|w| w.chars().next().map_or(false, char::is_uppercase))
        && !line.chars().any(char::is_numeric)
}

impl ParserStage for EntityExtractor {
    fn name(&self) -> &'static str {
        "EntityExtractor"
    }

    fn process(&self, context: &mut ParsingContext) -> anyhow::Result<()> {
        if context.sections.is_empty() {
            context.add_warning(self.name(), "No sections available for entity extraction");
            return Ok(());
        }

        let header_text = match context.sections.get(SectionKind::Header) {
            Some(text) => text.to_string(),
            None => truncate_graphemes(context.cleaned_text.as_deref().unwrap_or_default(), CONTACT_FALLBACK_LEN),
        };

        let contact = self.extract_contact(&header_text);
        let name = self.extract_name(&header_text);
        let summary = context
            .sections
            .get(SectionKind::Summary)
            .filter(|text| !text.trim().is_empty())
            .map(|text| truncate_graphemes(text, SUMMARY_MAX_LEN));

        if name.is_none() {
            context.add_warning(self.name(), "Could not extract candidate name");
        }

        context.set_metadata(self.name(), "has_email", contact.email.is_some());
        context.set_metadata(self.name(), "has_phone", contact.phone.is_some());
        context.set_metadata(self.name(), "has_linkedin", contact.linkedin_url.is_some());
        context.set_metadata(self.name(), "has_name", name.is_some());
        context.set_metadata(self.name(), "has_summary", summary.is_some());

        context.entities.contact = Some(contact);
        context.entities.name = name;
        context.entities.summary = summary;
        Ok(())
    }
}
