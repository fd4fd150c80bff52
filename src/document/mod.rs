//! Document accessor: the read-only view of a rendered page the scanner needs.
//!
//! Two implementations ship with the crate:
//! - [`HtmlDocument`] - a parsed static HTML snapshot (native hosts, tests)
//! - [`BrowserDocument`] - the live DOM through `web-sys`
//!
//! Signals that a document cannot provide (computed style on a detached node,
//! layout metrics on a static snapshot) are `None`, never an error.

pub mod browser;
pub mod html;

pub use browser::{BrowserDocument, BrowserElement};
pub use html::{HtmlDocument, HtmlNode};

use crate::error::DetectorError;

/// Checkbox lookup used for the consent-acceptance signals
pub const CHECKBOX_SELECTOR: &str = r#"input[type="checkbox"]"#;

/// Interactive descendants that count against a text block (checkboxes excluded)
pub const INTERACTIVE_SELECTOR: &str =
    r#"button, input:not([type="checkbox"]), textarea, select, img, video, iframe, canvas"#;

/// Link descendants
pub const LINK_SELECTOR: &str = "a";

// =============================================================================
// Element Signals
// =============================================================================

/// The computed-style properties the scorer reads
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComputedStyle {
    pub overflow: Option<String>,
    pub overflow_y: Option<String>,
    /// Border width in px (first value of the shorthand)
    pub border_width: Option<f64>,
}

impl ComputedStyle {
    /// `overflow`, falling back to `overflow-y` when the shorthand is empty
    pub fn effective_overflow(&self) -> Option<&str> {
        self.overflow
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .or(self.overflow_y.as_deref())
            .map(str::trim)
    }

    pub fn is_scrollable(&self) -> bool {
        matches!(self.effective_overflow(), Some("auto") | Some("scroll"))
    }

    pub fn has_border(&self) -> bool {
        self.border_width.map_or(false, |w| w > 0.0)
    }
}

/// Layout metrics (only available on a rendered document)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxMetrics {
    pub scroll_height: f64,
    pub offset_height: f64,
}

/// A checkbox found inside (or next to) an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkbox {
    pub required: bool,
}

// =============================================================================
// Traits
// =============================================================================

/// Per-element queries
pub trait ElementView: Clone + PartialEq {
    /// Upper-case tag name (`DIV`, `SECTION`, ...)
    fn tag_name(&self) -> String;

    /// Visible text, trimmed
    fn text(&self) -> String;

    /// Length of the element's raw inner markup, in chars
    fn markup_len(&self) -> usize;

    /// Cheap per-node key for deduplication. Backends without one compare
    /// with `==` instead.
    fn identity(&self) -> Option<usize> {
        None
    }

    /// Number of direct element children
    fn child_count(&self) -> usize;

    fn parent(&self) -> Option<Self>;

    /// `None` when style cannot be read (detached or foreign element)
    fn computed_style(&self) -> Option<ComputedStyle>;

    /// `None` when the document has no layout
    fn box_metrics(&self) -> Option<BoxMetrics>;

    /// First checkbox descendant
    fn checkbox(&self) -> Option<Checkbox>;

    /// Count of [`INTERACTIVE_SELECTOR`] descendants
    fn interactive_count(&self) -> usize;

    /// Count of [`LINK_SELECTOR`] descendants
    fn link_count(&self) -> usize;

    /// Checkbox inside the element, or else inside its parent
    fn nearby_checkbox(&self) -> Option<Checkbox> {
        self.checkbox()
            .or_else(|| self.parent().and_then(|p| p.checkbox()))
    }
}

/// Document-level queries
pub trait DocumentAccessor {
    type Element<'a>: ElementView
    where
        Self: 'a;

    fn url(&self) -> String;

    fn path(&self) -> String;

    fn title(&self) -> String;

    /// At most `max_chars` leading characters of the body's visible text
    fn body_text_prefix(&self, max_chars: usize) -> String;

    /// Length of the body's raw markup, in chars
    fn markup_len(&self) -> usize;

    /// All elements matching `selector`, in document order
    fn query_all<'a>(&'a self, selector: &str) -> Result<Vec<Self::Element<'a>>, DetectorError>;
}

/// Parse the leading numeric part of a CSS length (`"1.5px solid"` → 1.5)
pub(crate) fn parse_css_length(value: &str) -> Option<f64> {
    let value = value.trim();
    match value {
        "thin" => return Some(1.0),
        "medium" => return Some(3.0),
        "thick" => return Some(5.0),
        _ => {}
    }
    let end = value
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(value.len());
    value[..end].parse().ok()
}
