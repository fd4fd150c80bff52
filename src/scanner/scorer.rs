//! Scorer: Weighted Terms Confidence
//!
//! Additive score over six signal categories, clamped to [0, 100]:
//!
//! | Category     | Max  | Signal                                              |
//! |--------------|------|-----------------------------------------------------|
//! | length       | 20   | cumulative tiers at 500 / 1000 / 2000 chars         |
//! | keywords     | 40   | high-value (cap 20) + medium (cap 10) + clause mark |
//! | structure    | 23   | scrollable overflow, scroll ratio, border           |
//! | position     | 10   | checkbox in element or parent                       |
//! | density      | 15   | text length / markup length                         |
//! | interaction  | -25  | interactive descendants, link-only footers          |
//!
//! Structural signals the document cannot provide are recorded as `None` in
//! the [`ScoreBreakdown`] and contribute nothing.

use serde::{Deserialize, Serialize};

use crate::config::ScoreWeights;
use crate::document::ElementView;
use crate::scanner::keywords::{high_value, legal_marker, medium_value};

/// Per-category contributions for one element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub length: i32,
    pub high_keywords: i32,
    pub medium_keywords: i32,
    pub legal_marker: i32,
    /// `None` if computed style was unavailable
    pub overflow: Option<i32>,
    /// `None` if layout metrics were unavailable
    pub scroll_ratio: Option<i32>,
    /// `None` if computed style was unavailable
    pub border: Option<i32>,
    pub checkbox: i32,
    pub density: i32,
    /// Zero or negative
    pub penalty: i32,
}

impl ScoreBreakdown {
    pub fn raw_total(&self) -> i32 {
        self.length
            + self.high_keywords
            + self.medium_keywords
            + self.legal_marker
            + self.overflow.unwrap_or(0)
            + self.scroll_ratio.unwrap_or(0)
            + self.border.unwrap_or(0)
            + self.checkbox
            + self.density
            + self.penalty
    }

    /// Clamped to 0..=100
    pub fn total(&self) -> u8 {
        self.raw_total().clamp(0, 100) as u8
    }
}

/// Element scorer
#[derive(Debug, Clone, Default)]
pub struct Scorer {
    weights: ScoreWeights,
}

impl Scorer {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    pub fn score<E: ElementView>(&self, element: &E, text: &str) -> u8 {
        self.breakdown(element, text).total()
    }

    pub fn breakdown<E: ElementView>(&self, element: &E, text: &str) -> ScoreBreakdown {
        let w = &self.weights;
        let length = text.chars().count();
        let lower = text.to_lowercase();

        let mut b = ScoreBreakdown {
            length: w
                .length_tiers
                .iter()
                .filter(|(bound, _)| length > *bound)
                .map(|(_, points)| points)
                .sum(),
            ..ScoreBreakdown::default()
        };

        // Lexical
        let high = high_value().count_distinct(&lower) as i32;
        let medium = medium_value().count_distinct(&lower) as i32;
        b.high_keywords = (high * w.high_keyword).min(w.high_keyword_cap);
        b.medium_keywords = (medium * w.medium_keyword).min(w.medium_keyword_cap);
        if legal_marker().is_match(text) {
            b.legal_marker = w.legal_marker;
        }

        // Structural
        if let Some(style) = element.computed_style() {
            b.overflow = Some(if style.is_scrollable() { w.scrollable_overflow } else { 0 });
            b.border = Some(if style.has_border() { w.border } else { 0 });
        }
        if let Some(metrics) = element.box_metrics() {
            let overflowing = metrics.scroll_height > metrics.offset_height * w.scroll_overflow_ratio;
            b.scroll_ratio = Some(if overflowing { w.scroll_overflow } else { 0 });
        }

        // Positional
        if element.nearby_checkbox().is_some() {
            b.checkbox = w.nearby_checkbox;
        }

        // Density
        let ratio = length as f64 / (element.markup_len() + 1) as f64;
        if ratio > w.density_high_ratio {
            b.density = w.density_high;
        } else if ratio > w.density_medium_ratio {
            b.density = w.density_medium;
        }

        // Interactivity
        let interactive = element.interactive_count();
        if interactive > w.interactive_limit {
            b.penalty -= w.interactive_penalty;
        }
        if interactive == 0 && element.link_count() > w.link_limit {
            b.penalty -= w.link_penalty;
        }

        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{BoxMetrics, Checkbox, ComputedStyle};

    /// Hand-built element so every signal can be set directly
    #[derive(Debug, Clone, PartialEq, Default)]
    struct FakeElement {
        markup_len: usize,
        style: Option<ComputedStyle>,
        metrics: Option<BoxMetrics>,
        checkbox: Option<Checkbox>,
        interactive: usize,
        links: usize,
    }

    impl ElementView for FakeElement {
        fn tag_name(&self) -> String {
            "DIV".into()
        }
        fn text(&self) -> String {
            String::new()
        }
        fn markup_len(&self) -> usize {
            self.markup_len
        }
        fn child_count(&self) -> usize {
            0
        }
        fn parent(&self) -> Option<Self> {
            None
        }
        fn computed_style(&self) -> Option<ComputedStyle> {
            self.style.clone()
        }
        fn box_metrics(&self) -> Option<BoxMetrics> {
            self.metrics
        }
        fn checkbox(&self) -> Option<Checkbox> {
            self.checkbox
        }
        fn interactive_count(&self) -> usize {
            self.interactive
        }
        fn link_count(&self) -> usize {
            self.links
        }
    }

    fn filler(len: usize) -> String {
        "x".repeat(len)
    }

    // -------------------------------------------------------------------------
    // Length
    // -------------------------------------------------------------------------

    #[test]
    fn test_length_tiers_are_cumulative() {
        let scorer = Scorer::default();
        let el = FakeElement { markup_len: 1_000_000, ..Default::default() };

        assert_eq!(scorer.breakdown(&el, &filler(500)).length, 0);
        assert_eq!(scorer.breakdown(&el, &filler(501)).length, 10);
        assert_eq!(scorer.breakdown(&el, &filler(1001)).length, 15);
        assert_eq!(scorer.breakdown(&el, &filler(2001)).length, 20);
    }

    // -------------------------------------------------------------------------
    // Keywords
    // -------------------------------------------------------------------------

    #[test]
    fn test_keyword_caps() {
        let scorer = Scorer::default();
        let el = FakeElement { markup_len: 1_000_000, ..Default::default() };
        let text = "privacy policy, terms of service, consent, agreement; \
                    user data we collect and process for personal reasons";
        let b = scorer.breakdown(&el, text);

        assert_eq!(b.high_keywords, 20); // 4 × 8 capped
        assert_eq!(b.medium_keywords, 10); // 5 × 2
        assert_eq!(b.legal_marker, 0);
    }

    #[test]
    fn test_legal_marker_forms() {
        let scorer = Scorer::default();
        let el = FakeElement { markup_len: 1_000_000, ..Default::default() };
        for text in ["제1조 목적", "제 2 조", "ARTICLE 7", "§5", "§ 12"] {
            assert_eq!(scorer.breakdown(&el, text).legal_marker, 10, "{text}");
        }
    }

    // -------------------------------------------------------------------------
    // Structure + position
    // -------------------------------------------------------------------------

    #[test]
    fn test_structural_signals() {
        let scorer = Scorer::default();
        let el = FakeElement {
            markup_len: 1_000_000,
            style: Some(ComputedStyle {
                overflow: Some("scroll".into()),
                overflow_y: None,
                border_width: Some(1.0),
            }),
            metrics: Some(BoxMetrics { scroll_height: 1300.0, offset_height: 1000.0 }),
            checkbox: Some(Checkbox { required: false }),
            ..Default::default()
        };
        let b = scorer.breakdown(&el, "short");

        assert_eq!(b.overflow, Some(10));
        assert_eq!(b.scroll_ratio, Some(8));
        assert_eq!(b.border, Some(5));
        assert_eq!(b.checkbox, 10);
    }

    #[test]
    fn test_missing_style_contributes_nothing() {
        let scorer = Scorer::default();
        let el = FakeElement { markup_len: 1_000_000, ..Default::default() };
        let b = scorer.breakdown(&el, "short");

        assert_eq!(b.overflow, None);
        assert_eq!(b.scroll_ratio, None);
        assert_eq!(b.border, None);
        assert_eq!(b.raw_total(), 0);
    }

    #[test]
    fn test_scroll_ratio_needs_twenty_percent() {
        let scorer = Scorer::default();
        let el = FakeElement {
            markup_len: 1_000_000,
            metrics: Some(BoxMetrics { scroll_height: 1200.0, offset_height: 1000.0 }),
            ..Default::default()
        };
        assert_eq!(scorer.breakdown(&el, "x").scroll_ratio, Some(0));
    }

    // -------------------------------------------------------------------------
    // Density + penalties
    // -------------------------------------------------------------------------

    #[test]
    fn test_density_bands() {
        let scorer = Scorer::default();
        let text = filler(100);

        let dense = FakeElement { markup_len: 110, ..Default::default() };
        assert_eq!(scorer.breakdown(&dense, &text).density, 15);

        let medium = FakeElement { markup_len: 160, ..Default::default() };
        assert_eq!(scorer.breakdown(&medium, &text).density, 5);

        let sparse = FakeElement { markup_len: 400, ..Default::default() };
        assert_eq!(scorer.breakdown(&sparse, &text).density, 0);
    }

    #[test]
    fn test_interactive_and_link_penalties() {
        let scorer = Scorer::default();

        let widget = FakeElement { markup_len: 1_000_000, interactive: 3, ..Default::default() };
        assert_eq!(scorer.breakdown(&widget, "x").penalty, -15);

        let footer = FakeElement { markup_len: 1_000_000, links: 11, ..Default::default() };
        assert_eq!(scorer.breakdown(&footer, "x").penalty, -10);

        // Links alongside other interactive elements are not a footer.
        let mixed = FakeElement {
            markup_len: 1_000_000,
            interactive: 1,
            links: 40,
            ..Default::default()
        };
        assert_eq!(scorer.breakdown(&mixed, "x").penalty, 0);
    }

    #[test]
    fn test_score_never_negative() {
        let scorer = Scorer::default();
        let el = FakeElement {
            markup_len: 1_000_000,
            interactive: 9,
            ..Default::default()
        };
        assert_eq!(scorer.score(&el, "x"), 0);
    }

    #[test]
    fn test_score_clamped_to_hundred() {
        let weights = ScoreWeights { legal_marker: 500, ..ScoreWeights::default() };
        let scorer = Scorer::new(weights);
        let el = FakeElement { markup_len: 1_000_000, ..Default::default() };
        assert_eq!(scorer.score(&el, "Article 1"), 100);
    }
}
