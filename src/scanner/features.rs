//! Feature analysis over candidate text
//!
//! Pure functions: type classification by keyword priority, Korean/Latin
//! script ratio, legal-structure and content flags, word count.

use std::sync::OnceLock;

use regex::Regex;

use crate::scanner::candidate::{Features, Language, TermsType};

fn legal_structure_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)제[0-9]+조|article [0-9]+").expect("static regex"))
}

fn privacy_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)개인정보|privacy").expect("static regex"))
}

fn marketing_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)마케팅|marketing").expect("static regex"))
}

/// Type keywords in priority order; first type with any hit wins
const TYPE_RULES: &[(TermsType, &[&str])] = &[
    (TermsType::Privacy, &["개인정보", "privacy"]),
    (TermsType::Terms, &["이용약관", "terms of service"]),
    (TermsType::Marketing, &["마케팅", "marketing"]),
    (TermsType::ThirdParty, &["제3자", "third party"]),
];

pub fn classify_type(text: &str) -> TermsType {
    let lower = text.to_lowercase();
    TYPE_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| lower.contains(kw)))
        .map(|(kind, _)| *kind)
        .unwrap_or(TermsType::Unknown)
}

/// Hangul-syllable share among Hangul + ASCII letters
pub fn detect_language(text: &str) -> Language {
    let (korean, latin) = text.chars().fold((0usize, 0usize), |(ko, en), c| {
        if ('가'..='힣').contains(&c) {
            (ko + 1, en)
        } else if c.is_ascii_alphabetic() {
            (ko, en + 1)
        } else {
            (ko, en)
        }
    });

    let total = korean + latin;
    if total == 0 {
        return Language::Unknown;
    }

    let ratio = korean as f64 / total as f64;
    if ratio > 0.3 {
        Language::Ko
    } else if ratio < 0.1 {
        Language::En
    } else {
        Language::Mixed
    }
}

pub fn analyze_features(text: &str) -> Features {
    Features {
        kind: classify_type(text),
        has_legal_structure: legal_structure_re().is_match(text),
        has_privacy_content: privacy_re().is_match(text),
        has_marketing_content: marketing_re().is_match(text),
        language: detect_language(text),
        word_count: text.split_whitespace().count(),
    }
}
