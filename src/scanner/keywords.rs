//! Lexicons + Cheap Keyword Gate
//!
//! All keyword sets the scanner uses, compiled once into Aho-Corasick
//! automata so each text is scanned in a single O(n) pass.
//!
//! The gate must never reject a text the scorer would reward lexically, so
//! its automaton is the union of the essential set and both scoring sets,
//! plus the numbered-clause marker.

use std::sync::OnceLock;

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use regex::Regex;

// =============================================================================
// Lexicons
// =============================================================================

/// Essential terms vocabulary (Korean + English)
pub const ESSENTIAL_KEYWORDS: &[&str] = &[
    "개인정보", "이용약관", "동의", "수집", "제공",
    "privacy", "terms", "agreement", "consent", "personal",
];

/// Phrases that strongly indicate terms content (8 points each, capped)
pub const HIGH_VALUE_KEYWORDS: &[&str] = &[
    "개인정보", "수집", "이용약관", "서비스 이용", "동의", "제3자 제공",
    "privacy policy", "terms of service", "terms and conditions",
    "agreement", "consent", "personal information",
];

/// Words common in terms content (2 points each, capped)
pub const MEDIUM_VALUE_KEYWORDS: &[&str] = &[
    "제공", "목적", "이용자", "회원", "정보", "처리", "마케팅",
    "user", "personal", "data", "collect", "process",
];

/// Page-level phrases the eligibility filter looks for in the body prefix
pub const QUICK_PAGE_KEYWORDS: &[&str] = &[
    "개인정보 처리방침",
    "이용약관",
    "서비스 이용약관",
    "privacy policy",
    "terms of service",
    "terms and conditions",
];

// =============================================================================
// Compiled Matchers
// =============================================================================

/// Distinct-keyword counter over one lexicon
pub struct KeywordSet {
    automaton: AhoCorasick,
    len: usize,
}

impl KeywordSet {
    fn build(patterns: &[&str]) -> Self {
        let automaton = AhoCorasickBuilder::new()
            .match_kind(MatchKind::Standard)
            .build(patterns)
            .expect("static keyword automaton");
        Self {
            automaton,
            len: patterns.len(),
        }
    }

    /// True if any keyword occurs in `lower`
    pub fn any(&self, lower: &str) -> bool {
        self.automaton.is_match(lower)
    }

    /// Number of distinct keywords occurring in `lower`
    pub fn count_distinct(&self, lower: &str) -> usize {
        let mut seen = vec![false; self.len];
        let mut distinct = 0;
        for m in self.automaton.find_overlapping_iter(lower) {
            let idx = m.pattern().as_usize();
            if !seen[idx] {
                seen[idx] = true;
                distinct += 1;
                if distinct == self.len {
                    break;
                }
            }
        }
        distinct
    }
}

pub fn high_value() -> &'static KeywordSet {
    static SET: OnceLock<KeywordSet> = OnceLock::new();
    SET.get_or_init(|| KeywordSet::build(HIGH_VALUE_KEYWORDS))
}

pub fn medium_value() -> &'static KeywordSet {
    static SET: OnceLock<KeywordSet> = OnceLock::new();
    SET.get_or_init(|| KeywordSet::build(MEDIUM_VALUE_KEYWORDS))
}

pub fn quick_page() -> &'static KeywordSet {
    static SET: OnceLock<KeywordSet> = OnceLock::new();
    SET.get_or_init(|| KeywordSet::build(QUICK_PAGE_KEYWORDS))
}

fn gate() -> &'static KeywordSet {
    static SET: OnceLock<KeywordSet> = OnceLock::new();
    SET.get_or_init(|| {
        let mut union: Vec<&str> = Vec::new();
        for kw in ESSENTIAL_KEYWORDS
            .iter()
            .chain(HIGH_VALUE_KEYWORDS)
            .chain(MEDIUM_VALUE_KEYWORDS)
        {
            if !union.contains(kw) {
                union.push(*kw);
            }
        }
        KeywordSet::build(&union)
    })
}

/// Numbered-clause marker: 제N조, 제 N 조, Article N, § N
pub fn legal_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)제[0-9]+조|제 [0-9]+ 조|article [0-9]+|§ ?[0-9]+").expect("static regex")
    })
}

/// Cheap pre-score filter. Lower-cases once, then one automaton pass.
pub fn passes_keyword_gate(text: &str) -> bool {
    let lower = text.to_lowercase();
    gate().any(&lower) || legal_marker().is_match(&lower)
}
