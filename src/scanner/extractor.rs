//! CandidateExtractor: Targeted + Fallback Scans
//!
//! Strategy A (targeted) collects elements matching known terms selectors,
//! deduplicated in discovery order, and evaluates each one.
//!
//! Strategy B (fallback) runs only when A matched nothing. It walks generic
//! containers, capped at the first `fallback_scan_limit`, skips layout
//! containers with many direct children, and stops early once enough good
//! candidates are in hand.
//!
//! Per-element pipeline: length bounds → keyword gate → score → threshold.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::DetectorConfig;
use crate::document::{DocumentAccessor, ElementView};
use crate::scanner::candidate::{rank_top_k, Candidate};
use crate::scanner::features::analyze_features;
use crate::scanner::keywords::passes_keyword_gate;
use crate::scanner::required::is_required;
use crate::scanner::scorer::Scorer;
use crate::session::sinks::ProgressSink;

/// Selectors for Strategy A
pub const TARGET_SELECTORS: &[&str] = &[
    // Terms containers
    r#"[class*="terms"]"#,
    r#"[class*="privacy"]"#,
    r#"[class*="policy"]"#,
    r#"[class*="agreement"]"#,
    r#"[id*="terms"]"#,
    r#"[id*="privacy"]"#,
    r#"[id*="policy"]"#,
    r#"[id*="agreement"]"#,
    // Korean
    r#"[class*="약관"]"#,
    r#"[class*="개인정보"]"#,
    r#"[id*="약관"]"#,
    r#"[id*="개인정보"]"#,
    // Common modal structures
    ".modal-body",
    ".terms-content",
    ".privacy-content",
    ".agreement-content",
    "dialog",
    r#"[role="dialog"]"#,
];

/// Generic containers for Strategy B
pub const FALLBACK_SELECTOR: &str = "section, article, div, main, dialog";

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Strategy {
    Targeted,
    Fallback,
}

/// Outcome of one extraction pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionReport {
    /// At most `top_k`, descending score, ties in discovery order
    pub candidates: Vec<Candidate>,
    pub strategy: Strategy,
    pub elements_examined: usize,
    pub early_exit: bool,
}

/// Why an element did not become a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    OutOfBounds,
    Layout,
    NoKeywords,
    BelowThreshold(u8),
}

// =============================================================================
// CandidateExtractor
// =============================================================================

pub struct CandidateExtractor {
    config: DetectorConfig,
    scorer: Scorer,
}

impl CandidateExtractor {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            config: config.clone(),
            scorer: Scorer::new(config.weights.clone()),
        }
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub fn extract<D: DocumentAccessor>(&self, doc: &D, progress: &dyn ProgressSink) -> ExtractionReport {
        progress.progress(10, "Searching target elements...");

        let targets = self.collect_targets(doc);
        info!(count = targets.len(), "target elements found");
        progress.progress(30, &format!("{} elements found", targets.len()));

        if targets.is_empty() {
            return self.fallback_scan(doc, progress);
        }

        let total = targets.len();
        let step = (total / 10).max(1);
        let mut candidates = Vec::new();

        for (i, el) in targets.iter().enumerate() {
            match self.evaluate(el, false) {
                Ok(candidate) => candidates.push(candidate),
                Err(verdict) => debug!(?verdict, tag = %el.tag_name(), "target skipped"),
            }

            let processed = i + 1;
            if processed % step == 0 {
                let percent = 30 + (processed * 60 / total) as u8;
                progress.progress(percent, &format!("Analyzing elements... ({}/{})", processed, total));
            }
        }

        progress.progress(90, "Organizing results...");
        ExtractionReport {
            candidates: rank_top_k(candidates, self.config.top_k),
            strategy: Strategy::Targeted,
            elements_examined: total,
            early_exit: false,
        }
    }

    fn fallback_scan<D: DocumentAccessor>(&self, doc: &D, progress: &dyn ProgressSink) -> ExtractionReport {
        info!("no target elements, switching to fallback scan");
        progress.progress(35, "Scanning whole page...");

        let containers = match doc.query_all(FALLBACK_SELECTOR) {
            Ok(found) => found,
            Err(e) => {
                debug!(error = %e, "fallback selector rejected");
                Vec::new()
            }
        };
        let limit = containers.len().min(self.config.fallback_scan_limit);
        let step = (limit / 10).max(1);

        let mut candidates: Vec<Candidate> = Vec::new();
        let mut examined = 0;
        let mut early_exit = false;

        for (i, el) in containers.iter().take(limit).enumerate() {
            examined += 1;
            match self.evaluate(el, true) {
                Ok(candidate) => candidates.push(candidate),
                Err(verdict) => debug!(?verdict, tag = %el.tag_name(), "container skipped"),
            }

            if i % step == 0 {
                let percent = 35 + (i * 55 / limit) as u8;
                progress.progress(percent, &format!("Scanning page... ({}/{})", i, limit));
            }

            if self.enough_found(&candidates) {
                info!(examined, "high-scoring terms found, stopping fallback scan early");
                progress.progress(85, "High-scoring terms found!");
                early_exit = true;
                break;
            }
        }

        progress.progress(90, "Organizing results...");
        ExtractionReport {
            candidates: rank_top_k(candidates, self.config.top_k),
            strategy: Strategy::Fallback,
            elements_examined: examined,
            early_exit,
        }
    }

    /// Union of every target selector's matches, first-seen order.
    /// Invalid selectors contribute nothing.
    fn collect_targets<'a, D: DocumentAccessor>(&self, doc: &'a D) -> Vec<D::Element<'a>> {
        let mut targets: Vec<D::Element<'a>> = Vec::new();
        let mut seen: HashSet<usize> = HashSet::new();
        for selector in TARGET_SELECTORS {
            match doc.query_all(selector) {
                Ok(found) => {
                    for el in found {
                        let fresh = match el.identity() {
                            Some(key) => seen.insert(key),
                            None => !targets.contains(&el),
                        };
                        if fresh {
                            targets.push(el);
                        }
                    }
                }
                Err(e) => debug!(error = %e, "target selector skipped"),
            }
        }
        targets
    }

    fn enough_found(&self, candidates: &[Candidate]) -> bool {
        candidates.len() >= self.config.early_exit_min_candidates
            && candidates.iter().any(|c| c.score >= self.config.early_exit_score)
    }

    fn evaluate<E: ElementView>(&self, el: &E, check_layout: bool) -> Result<Candidate, Verdict> {
        let text = el.text();
        let len = text.chars().count();
        if len < self.config.min_text_len || len > self.config.max_text_len {
            return Err(Verdict::OutOfBounds);
        }
        if check_layout && el.child_count() > self.config.max_direct_children {
            return Err(Verdict::Layout);
        }
        if !passes_keyword_gate(&text) {
            return Err(Verdict::NoKeywords);
        }

        let score = self.scorer.score(el, &text);
        if score < self.config.score_threshold {
            return Err(Verdict::BelowThreshold(score));
        }

        Ok(Candidate {
            is_required: is_required(el, &text),
            element_tag: el.tag_name(),
            score,
            features: analyze_features(&text),
            text,
        })
    }
}
