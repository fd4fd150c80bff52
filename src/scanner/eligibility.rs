//! EligibilityFilter: Cheap Page Pre-Filter
//!
//! Decides from URL, path, title and a bounded body prefix whether the full
//! extraction is worth running. Never walks the document tree.
//!
//! Decision order (first match wins):
//! 1. denylisted domain → ineligible
//! 2. terms pattern in URL / path / title → eligible
//! 3. high-confidence phrase in the body prefix → eligible
//! 4. otherwise → ineligible

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::DocumentAccessor;
use crate::scanner::keywords::quick_page;

/// Domains that never host consent text
pub const EXCLUDED_DOMAINS: &[&str] = &[
    "youtube.com",
    "youtu.be",
    "google.com",
    "gmail.com",
    "drive.google.com",
    "maps.google.com",
    "netflix.com",
    "spotify.com",
    "instagram.com",
    "facebook.com",
    "twitter.com",
    "x.com",
];

fn terms_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)terms|privacy|policy|agreement|약관|개인정보|이용동의|signup|register|join|회원가입|가입",
        )
        .expect("static regex")
    })
}

// =============================================================================
// Types
// =============================================================================

/// The page signals the filter reads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSnapshot {
    pub url: String,
    pub path: String,
    pub title: String,
    pub body_prefix: String,
}

impl PageSnapshot {
    /// Title + bounded body prefix; O(1) document reads
    pub fn capture<D: DocumentAccessor>(doc: &D, body_prefix_chars: usize) -> Self {
        Self {
            url: doc.url(),
            path: doc.path(),
            title: doc.title(),
            body_prefix: doc.body_text_prefix(body_prefix_chars),
        }
    }
}

/// Filter decision with the rule that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum Eligibility {
    ExcludedDomain { domain: String },
    UrlMatch,
    TitleMatch,
    BodyKeyword,
    NoSignal,
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::UrlMatch | Self::TitleMatch | Self::BodyKeyword)
    }
}

// =============================================================================
// Filter
// =============================================================================

pub fn check_eligibility(page: &PageSnapshot) -> Eligibility {
    let url = page.url.to_lowercase();

    let decision = if let Some(domain) = EXCLUDED_DOMAINS.iter().find(|d| url.contains(*d)) {
        Eligibility::ExcludedDomain { domain: domain.to_string() }
    } else if terms_pattern().is_match(&url) || terms_pattern().is_match(&page.path) {
        Eligibility::UrlMatch
    } else if terms_pattern().is_match(&page.title) {
        Eligibility::TitleMatch
    } else if quick_page().any(&page.body_prefix.to_lowercase()) {
        Eligibility::BodyKeyword
    } else {
        Eligibility::NoSignal
    };

    debug!(url = %page.url, ?decision, "eligibility checked");
    decision
}

/// Capture and check in one step
pub fn is_page_eligible<D: DocumentAccessor>(doc: &D, body_prefix_chars: usize) -> Eligibility {
    check_eligibility(&PageSnapshot::capture(doc, body_prefix_chars))
}
