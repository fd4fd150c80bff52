//! Terms Detector: Consent/Terms Block Detection + Ranking
//!
//! A Rust/WASM implementation of the terms detection pipeline that runs
//! against a rendered document.
//!
//! # Architecture
//!
//! ## Scanner Components
//! - `eligibility.rs` - EligibilityFilter: URL/title/body-prefix pre-filter
//! - `keywords.rs` - Lexicons + cheap keyword gate (Aho-Corasick)
//! - `features.rs` - Feature analysis (type, language, legal structure)
//! - `scorer.rs` - Scorer: weighted structural/lexical confidence score
//! - `required.rs` - Required-consent detection
//! - `extractor.rs` - CandidateExtractor: targeted + fallback scans
//!
//! ## Session Components
//! - `cache.rs` - ResultCache: FIFO page-identity cache
//! - `scheduler.rs` - Debounce timer abstraction
//! - `sinks.rs` - Progress / presentation / result sinks
//! - `controller.rs` - SessionController: debounce + re-entrancy state machine
//!
//! ## Documents
//! - `document/html.rs` - Static HTML snapshots via `scraper`
//! - `document/browser.rs` - Live DOM via `web-sys`
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { TermsDetector } from 'terms-detector';
//!
//! await init();
//!
//! const detector = new TermsDetector(
//!   undefined,                                              // default config
//!   (id, ms) => setTimeout(() => detector.fire(id), ms),    // debounce timer
//!   (notice) => overlay.render(notice),                     // progress + status
//!   (message) => chrome.runtime.sendMessage(message),       // results
//! );
//!
//! detector.trigger('pageReady');
//! ```
//!
//! # Usage (Rust)
//! ```rust,ignore
//! let doc = HtmlDocument::parse("https://example.com/signup", &html);
//! let report = CandidateExtractor::new(&DetectorConfig::default())
//!     .extract(&doc, &NoopProgress);
//! for candidate in report.candidates {
//!     println!("{} {:?}", candidate.score, candidate.features.kind);
//! }
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod scanner;
pub mod session;
pub mod wasm;

pub use config::*;
pub use document::*;
pub use error::*;
pub use scanner::*;
pub use session::*;

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("terms-detector v{}", env!("CARGO_PKG_VERSION"))
}
