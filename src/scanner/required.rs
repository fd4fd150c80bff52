//! Required-consent detection
//!
//! "Required" labels are often attached near the consent text rather than
//! inside it, so detection falls back through three tiers:
//! 1. explicit marker in the text itself
//! 2. loose marker in an ancestor's text (up to two levels)
//! 3. a `required` checkbox in the element or its parent

use std::sync::OnceLock;

use regex::Regex;

use crate::document::ElementView;

const ANCESTOR_DEPTH: usize = 2;

fn explicit_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\(필수\)|\[필수\]|필수 동의|required|mandatory").expect("static regex")
    })
}

fn ancestor_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)필수|required|mandatory").expect("static regex"))
}

pub fn is_required<E: ElementView>(element: &E, text: &str) -> bool {
    if explicit_marker().is_match(text) {
        return true;
    }

    let mut ancestor = element.parent();
    for _ in 0..ANCESTOR_DEPTH {
        let Some(current) = ancestor else { break };
        if ancestor_marker().is_match(&current.text()) {
            return true;
        }
        ancestor = current.parent();
    }

    element.nearby_checkbox().map_or(false, |cb| cb.required)
}
