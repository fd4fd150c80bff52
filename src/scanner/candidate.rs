//! Candidate + Features: the scanner's output records

use serde::{Deserialize, Serialize};

/// What kind of terms content a block most likely is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TermsType {
    Privacy,
    Terms,
    Marketing,
    ThirdParty,
    Unknown,
}

impl TermsType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Privacy => "privacy",
            Self::Terms => "terms",
            Self::Marketing => "marketing",
            Self::ThirdParty => "third-party",
            Self::Unknown => "unknown",
        }
    }
}

/// Dominant script of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ko,
    En,
    Mixed,
    Unknown,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ko => "ko",
            Self::En => "en",
            Self::Mixed => "mixed",
            Self::Unknown => "unknown",
        }
    }
}

/// Text-derived features of a candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    #[serde(rename = "type")]
    pub kind: TermsType,
    pub has_legal_structure: bool,
    pub has_privacy_content: bool,
    pub has_marketing_content: bool,
    pub language: Language,
    pub word_count: usize,
}

/// A scored element considered a likely terms/consent block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub text: String,
    pub element_tag: String,
    pub is_required: bool,
    /// 0..=100
    pub score: u8,
    pub features: Features,
}

/// Stable sort by descending score, then keep the first `k`
pub fn rank_top_k(mut candidates: Vec<Candidate>, k: usize) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates.truncate(k);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(tag: &str, score: u8) -> Candidate {
        Candidate {
            text: String::new(),
            element_tag: tag.to_string(),
            is_required: false,
            score,
            features: Features {
                kind: TermsType::Unknown,
                has_legal_structure: false,
                has_privacy_content: false,
                has_marketing_content: false,
                language: Language::Unknown,
                word_count: 0,
            },
        }
    }

    #[test]
    fn test_rank_keeps_discovery_order_on_ties() {
        let ranked = rank_top_k(
            vec![
                candidate("A", 70),
                candidate("B", 90),
                candidate("C", 70),
                candidate("D", 90),
            ],
            5,
        );
        let tags: Vec<_> = ranked.iter().map(|c| c.element_tag.as_str()).collect();
        assert_eq!(tags, vec!["B", "D", "A", "C"]);
    }

    #[test]
    fn test_rank_truncates() {
        let ranked = rank_top_k((0..8).map(|i| candidate("X", 60 + i)).collect(), 5);
        assert_eq!(ranked.len(), 5);
        assert_eq!(ranked[0].score, 67);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_serialized_shape() {
        let mut c = candidate("DIV", 88);
        c.features.kind = TermsType::ThirdParty;
        c.features.language = Language::Ko;
        let json = serde_json::to_value(&c).unwrap();

        assert_eq!(json["elementTag"], "DIV");
        assert_eq!(json["isRequired"], false);
        assert_eq!(json["features"]["type"], "third-party");
        assert_eq!(json["features"]["language"], "ko");
        assert_eq!(json["features"]["wordCount"], 0);
    }
}
