//! BrowserDocument: live DOM accessor over `web-sys`
//!
//! Only usable inside a browser (WASM). Every DOM call that can throw is
//! mapped to `None`/zero, except selector parsing which surfaces as
//! [`DetectorError::InvalidSelector`].

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, NodeList, Window};

use crate::document::{
    parse_css_length, BoxMetrics, Checkbox, ComputedStyle, DocumentAccessor, ElementView,
    CHECKBOX_SELECTOR, INTERACTIVE_SELECTOR, LINK_SELECTOR,
};
use crate::error::DetectorError;

fn elements(list: NodeList) -> impl Iterator<Item = Element> {
    (0..list.length())
        .filter_map(move |i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
}

// =============================================================================
// BrowserDocument
// =============================================================================

/// The page the WASM module is running in
pub struct BrowserDocument {
    window: Window,
    document: Document,
}

impl BrowserDocument {
    /// Bind to the global `window.document`
    pub fn from_window() -> Result<Self, DetectorError> {
        let window = web_sys::window()
            .ok_or_else(|| DetectorError::DocumentUnavailable("no global window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| DetectorError::DocumentUnavailable("window has no document".into()))?;
        Ok(Self { window, document })
    }

    fn body(&self) -> Option<HtmlElement> {
        self.document.body()
    }
}

impl DocumentAccessor for BrowserDocument {
    type Element<'a> = BrowserElement;

    fn url(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    fn path(&self) -> String {
        self.window.location().pathname().unwrap_or_default()
    }

    fn title(&self) -> String {
        self.document.title()
    }

    fn body_text_prefix(&self, max_chars: usize) -> String {
        self.body()
            .map(|b| b.inner_text().chars().take(max_chars).collect())
            .unwrap_or_default()
    }

    fn markup_len(&self) -> usize {
        self.body().map(|b| b.inner_html().chars().count()).unwrap_or(0)
    }

    fn query_all<'a>(&'a self, selector: &str) -> Result<Vec<BrowserElement>, DetectorError> {
        let list = self
            .document
            .query_selector_all(selector)
            .map_err(|e| DetectorError::InvalidSelector {
                selector: selector.to_string(),
                reason: format!("{:?}", e),
            })?;

        Ok(elements(list)
            .map(|element| BrowserElement {
                element,
                window: self.window.clone(),
            })
            .collect())
    }
}

// =============================================================================
// BrowserElement
// =============================================================================

/// A live DOM element
#[derive(Debug, Clone)]
pub struct BrowserElement {
    element: Element,
    window: Window,
}

impl PartialEq for BrowserElement {
    fn eq(&self, other: &Self) -> bool {
        self.element == other.element
    }
}

impl BrowserElement {
    fn count(&self, selector: &str) -> usize {
        self.element
            .query_selector_all(selector)
            .map(|list| list.length() as usize)
            .unwrap_or(0)
    }
}

impl ElementView for BrowserElement {
    fn tag_name(&self) -> String {
        self.element.tag_name()
    }

    fn text(&self) -> String {
        self.element
            .dyn_ref::<HtmlElement>()
            .map(|h| h.inner_text())
            .filter(|t| !t.is_empty())
            .or_else(|| self.element.text_content())
            .unwrap_or_default()
            .trim()
            .to_string()
    }

    fn markup_len(&self) -> usize {
        self.element.inner_html().chars().count()
    }

    fn child_count(&self) -> usize {
        self.element.child_element_count() as usize
    }

    fn parent(&self) -> Option<Self> {
        self.element.parent_element().map(|element| BrowserElement {
            element,
            window: self.window.clone(),
        })
    }

    fn computed_style(&self) -> Option<ComputedStyle> {
        let decl = self.window.get_computed_style(&self.element).ok().flatten()?;
        let read = |property: &str| decl.get_property_value(property).ok();

        Some(ComputedStyle {
            overflow: read("overflow"),
            overflow_y: read("overflow-y"),
            border_width: read("border-width").and_then(|v| parse_css_length(&v)),
        })
    }

    fn box_metrics(&self) -> Option<BoxMetrics> {
        let html = self.element.dyn_ref::<HtmlElement>()?;
        Some(BoxMetrics {
            scroll_height: f64::from(self.element.scroll_height()),
            offset_height: f64::from(html.offset_height()),
        })
    }

    fn checkbox(&self) -> Option<Checkbox> {
        let found = self.element.query_selector(CHECKBOX_SELECTOR).ok().flatten()?;
        let required = found.has_attribute("required")
            || found
                .dyn_ref::<HtmlInputElement>()
                .map_or(false, |input| input.required());
        Some(Checkbox { required })
    }

    fn interactive_count(&self) -> usize {
        self.count(INTERACTIVE_SELECTOR)
    }

    fn link_count(&self) -> usize {
        self.count(LINK_SELECTOR)
    }
}
