//! Configuration types and defaults for the terms detector
//!
//! Every threshold and weight used by the scanner and session lives here so a
//! host can tune the heuristics without touching the algorithms.

use serde::{Deserialize, Serialize};

use crate::error::DetectorError;

/// Hard upper bound on candidates kept per page (and per cache entry).
pub const MAX_CANDIDATES: usize = 5;

// =============================================================================
// Score Weights
// =============================================================================

/// Additive weights for each scoring signal category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoreWeights {
    /// Length tiers as (exclusive lower bound, points). Cumulative.
    pub length_tiers: Vec<(usize, i32)>,

    /// Points per distinct high-value phrase. Default: 8
    pub high_keyword: i32,
    /// Cap on the high-value phrase contribution. Default: 20
    pub high_keyword_cap: i32,
    /// Points per distinct medium-value word. Default: 2
    pub medium_keyword: i32,
    /// Cap on the medium-value word contribution. Default: 10
    pub medium_keyword_cap: i32,
    /// Bonus for a numbered-clause marker (Article N, 제N조, §N). Default: 10
    pub legal_marker: i32,

    /// Computed overflow is `auto` or `scroll`. Default: 10
    pub scrollable_overflow: i32,
    /// scrollHeight must exceed offsetHeight by this factor. Default: 1.2
    pub scroll_overflow_ratio: f64,
    /// Points when the scroll ratio is exceeded. Default: 8
    pub scroll_overflow: i32,
    /// Non-zero border width. Default: 5
    pub border: i32,

    /// Checkbox inside the element or its parent. Default: 10
    pub nearby_checkbox: i32,

    /// Text/markup ratio above which the high density bonus applies. Default: 0.7
    pub density_high_ratio: f64,
    /// Default: 15
    pub density_high: i32,
    /// Text/markup ratio above which the medium density bonus applies. Default: 0.5
    pub density_medium_ratio: f64,
    /// Default: 5
    pub density_medium: i32,

    /// Non-checkbox interactive descendants tolerated before the penalty. Default: 2
    pub interactive_limit: usize,
    /// Default: 15
    pub interactive_penalty: i32,
    /// Links tolerated (with zero other interactive elements). Default: 10
    pub link_limit: usize,
    /// Default: 10
    pub link_penalty: i32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            length_tiers: vec![(500, 10), (1000, 5), (2000, 5)],
            high_keyword: 8,
            high_keyword_cap: 20,
            medium_keyword: 2,
            medium_keyword_cap: 10,
            legal_marker: 10,
            scrollable_overflow: 10,
            scroll_overflow_ratio: 1.2,
            scroll_overflow: 8,
            border: 5,
            nearby_checkbox: 10,
            density_high_ratio: 0.7,
            density_high: 15,
            density_medium_ratio: 0.5,
            density_medium: 5,
            interactive_limit: 2,
            interactive_penalty: 15,
            link_limit: 10,
            link_penalty: 10,
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Detector configuration (extraction limits, session timing, cache sizing)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DetectorConfig {
    /// Debounce window for re-triggering. Default: 500
    pub debounce_ms: u64,
    /// Maximum cached pages before FIFO eviction. Default: 50
    pub cache_capacity: usize,
    /// Candidates returned per extraction. Default: 5
    pub top_k: usize,
    /// Minimum candidate text length (chars). Default: 200
    pub min_text_len: usize,
    /// Maximum candidate text length (chars). Default: 50000
    pub max_text_len: usize,
    /// Minimum score for a candidate to be emitted. Default: 60
    pub score_threshold: u8,
    /// Generic containers examined by the fallback scan. Default: 100
    pub fallback_scan_limit: usize,
    /// Containers with more direct children are treated as layout. Default: 15
    pub max_direct_children: usize,
    /// Fallback early exit: candidates required. Default: 3
    pub early_exit_min_candidates: usize,
    /// Fallback early exit: at least one candidate at this score. Default: 85
    pub early_exit_score: u8,
    /// Leading body characters read by the eligibility filter. Default: 1000
    pub body_prefix_chars: usize,
    /// Added-subtree text length needed to re-trigger on mutation. Default: 200
    pub mutation_min_text_len: usize,
    /// Scoring weights
    pub weights: ScoreWeights,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            cache_capacity: 50,
            top_k: MAX_CANDIDATES,
            min_text_len: 200,
            max_text_len: 50_000,
            score_threshold: 60,
            fallback_scan_limit: 100,
            max_direct_children: 15,
            early_exit_min_candidates: 3,
            early_exit_score: 85,
            body_prefix_chars: 1000,
            mutation_min_text_len: 200,
            weights: ScoreWeights::default(),
        }
    }
}

impl DetectorConfig {
    /// Parse a (possibly partial) JSON configuration and validate it
    pub fn from_json(json: &str) -> Result<Self, DetectorError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the extractor or cache cannot honour
    pub fn validate(&self) -> Result<(), DetectorError> {
        if self.min_text_len > self.max_text_len {
            return Err(DetectorError::InvalidConfig(format!(
                "minTextLen ({}) exceeds maxTextLen ({})",
                self.min_text_len, self.max_text_len
            )));
        }
        if self.top_k == 0 || self.top_k > MAX_CANDIDATES {
            return Err(DetectorError::InvalidConfig(format!(
                "topK must be within 1..={}, got {}",
                MAX_CANDIDATES, self.top_k
            )));
        }
        if self.cache_capacity == 0 {
            return Err(DetectorError::InvalidConfig("cacheCapacity must be positive".into()));
        }
        if self.score_threshold > 100 || self.early_exit_score > 100 {
            return Err(DetectorError::InvalidConfig("scores are bounded by 100".into()));
        }
        if self.fallback_scan_limit == 0 {
            return Err(DetectorError::InvalidConfig(
                "fallbackScanLimit must be positive".into(),
            ));
        }
        Ok(())
    }
}
