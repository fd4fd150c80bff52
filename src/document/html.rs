//! HtmlDocument: static HTML snapshot accessor
//!
//! Parses markup once with `scraper` and answers the scanner's queries from
//! the tree. A snapshot has no layout engine, so computed style is read from
//! inline `style` declarations and box metrics are always absent.

use std::sync::OnceLock;

use scraper::node::Element;
use scraper::{ElementRef, Html, Selector};

use crate::document::{
    parse_css_length, BoxMetrics, Checkbox, ComputedStyle, DocumentAccessor, ElementView,
    CHECKBOX_SELECTOR, INTERACTIVE_SELECTOR, LINK_SELECTOR,
};
use crate::error::DetectorError;

fn static_selector(cell: &'static OnceLock<Selector>, source: &str) -> &'static Selector {
    cell.get_or_init(|| Selector::parse(source).expect("static selector"))
}

fn checkbox_selector() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    static_selector(&CELL, CHECKBOX_SELECTOR)
}

fn interactive_selector() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    static_selector(&CELL, INTERACTIVE_SELECTOR)
}

fn link_selector() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    static_selector(&CELL, LINK_SELECTOR)
}

// =============================================================================
// Visible text
// =============================================================================

/// Elements whose content is never rendered
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Elements that start on their own line when rendered
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "details", "dialog", "div", "dl",
    "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hr", "legend", "li", "main", "nav", "ol", "p", "pre", "section",
    "summary", "table", "td", "th", "tr", "ul",
];

/// Text as a reader would see it: unrendered subtrees skipped, block
/// boundaries kept as a single space.
fn visible_text(root: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_visible(root, &mut out);
    out
}

fn collect_visible(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            let name = child.value().name();
            if HIDDEN_ELEMENTS.contains(&name) {
                continue;
            }
            let block = BLOCK_ELEMENTS.contains(&name);
            if block {
                block_break(out);
            }
            collect_visible(child, out);
            if block {
                block_break(out);
            }
        }
    }
}

fn block_break(out: &mut String) {
    if !out.is_empty() && !out.ends_with(char::is_whitespace) {
        out.push(' ');
    }
}

// =============================================================================
// HtmlDocument
// =============================================================================

/// A parsed HTML page plus the address it was loaded from
pub struct HtmlDocument {
    url: String,
    path: String,
    html: Html,
}

impl HtmlDocument {
    pub fn parse(url: &str, markup: &str) -> Self {
        let path = url::Url::parse(url)
            .map(|u| u.path().to_string())
            .unwrap_or_default();

        Self {
            url: url.to_string(),
            path,
            html: Html::parse_document(markup),
        }
    }

    fn body(&self) -> Option<ElementRef<'_>> {
        static CELL: OnceLock<Selector> = OnceLock::new();
        self.html.select(static_selector(&CELL, "body")).next()
    }
}

impl DocumentAccessor for HtmlDocument {
    type Element<'a> = HtmlNode<'a>;

    fn url(&self) -> String {
        self.url.clone()
    }

    fn path(&self) -> String {
        self.path.clone()
    }

    fn title(&self) -> String {
        static CELL: OnceLock<Selector> = OnceLock::new();
        self.html
            .select(static_selector(&CELL, "title"))
            .next()
            .map(|t| t.text().collect::<Vec<_>>().join(" "))
            .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_default()
    }

    fn body_text_prefix(&self, max_chars: usize) -> String {
        self.body()
            .map(|b| visible_text(b).trim_start().chars().take(max_chars).collect())
            .unwrap_or_default()
    }

    fn markup_len(&self) -> usize {
        self.body().map(|b| b.inner_html().chars().count()).unwrap_or(0)
    }

    fn query_all<'a>(&'a self, selector: &str) -> Result<Vec<HtmlNode<'a>>, DetectorError> {
        let parsed = Selector::parse(selector).map_err(|e| DetectorError::InvalidSelector {
            selector: selector.to_string(),
            reason: format!("{e:?}"),
        })?;
        Ok(self.html.select(&parsed).map(HtmlNode).collect())
    }
}

// =============================================================================
// HtmlNode
// =============================================================================

/// Element handle borrowed from an [`HtmlDocument`]
#[derive(Debug, Clone, Copy)]
pub struct HtmlNode<'a>(ElementRef<'a>);

impl PartialEq for HtmlNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.0.id() == other.0.id()
    }
}

impl HtmlNode<'_> {
    fn inline_declaration(&self, property: &str) -> Option<String> {
        let style = self.0.value().attr("style")?;
        style
            .split(';')
            .filter_map(|decl| decl.split_once(':'))
            .filter(|(name, _)| name.trim().eq_ignore_ascii_case(property))
            .map(|(_, value)| value.trim().trim_end_matches("!important").trim().to_string())
            .last()
    }
}

impl ElementView for HtmlNode<'_> {
    fn tag_name(&self) -> String {
        self.0.value().name().to_ascii_uppercase()
    }

    fn text(&self) -> String {
        visible_text(self.0).trim().to_string()
    }

    fn markup_len(&self) -> usize {
        self.0.inner_html().chars().count()
    }

    /// Address of the node inside the parsed tree, stable for the document's lifetime
    fn identity(&self) -> Option<usize> {
        Some(self.0.value() as *const Element as usize)
    }

    fn child_count(&self) -> usize {
        self.0.children().filter(|c| c.value().is_element()).count()
    }

    fn parent(&self) -> Option<Self> {
        self.0.parent().and_then(ElementRef::wrap).map(HtmlNode)
    }

    fn computed_style(&self) -> Option<ComputedStyle> {
        let border_width = self
            .inline_declaration("border-width")
            .or_else(|| self.inline_declaration("border"))
            .and_then(|v| v.split_whitespace().find_map(parse_css_length));

        Some(ComputedStyle {
            overflow: self.inline_declaration("overflow"),
            overflow_y: self.inline_declaration("overflow-y"),
            border_width,
        })
    }

    fn box_metrics(&self) -> Option<BoxMetrics> {
        None
    }

    fn checkbox(&self) -> Option<Checkbox> {
        self.0.select(checkbox_selector()).next().map(|cb| Checkbox {
            required: cb.value().attr("required").is_some(),
        })
    }

    fn interactive_count(&self) -> usize {
        self.0.select(interactive_selector()).count()
    }

    fn link_count(&self) -> usize {
        self.0.select(link_selector()).count()
    }
}
