//! Outbound interfaces: progress, presentation, results
//!
//! The scanner only knows [`ProgressSink`]; the session controller also
//! drives a [`PresentationSink`] (status overlay) and a [`ResultSink`]
//! (downstream analysis service).

use serde::{Deserialize, Serialize};

use crate::error::DetectorError;
use crate::scanner::candidate::Candidate;

/// Receives `(percent, status)` during extraction. Must tolerate repeats.
pub trait ProgressSink {
    fn progress(&self, percent: u8, status: &str);
}

/// Discards progress
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn progress(&self, _percent: u8, _status: &str) {}
}

// =============================================================================
// Presentation
// =============================================================================

/// Status changes for the presentation overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Notice {
    Show,
    Indeterminate {
        status: String,
    },
    Progress {
        percent: u8,
        status: String,
    },
    #[serde(rename_all = "camelCase")]
    Success {
        found: usize,
        elapsed_ms: f64,
        cached: bool,
    },
    #[serde(rename_all = "camelCase")]
    Stats {
        scanned: usize,
        found: usize,
        elapsed_ms: f64,
    },
    NoTerms,
    Error {
        message: String,
    },
}

pub trait PresentationSink: ProgressSink {
    fn notice(&self, notice: Notice);
}

/// Headless hosts
pub struct NoopPresentation;

impl ProgressSink for NoopPresentation {
    fn progress(&self, _percent: u8, _status: &str) {}
}

impl PresentationSink for NoopPresentation {
    fn notice(&self, _notice: Notice) {}
}

// =============================================================================
// Results
// =============================================================================

/// Messages for the downstream analysis service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum OutboundMessage {
    AnalyzeTerms { terms: Vec<Candidate>, url: String },
    UpdateBadge { text: String },
}

/// Fire-and-forget delivery; an `Err` is only reported, never retried
pub trait ResultSink {
    fn deliver(&self, message: &OutboundMessage) -> Result<(), DetectorError>;
}

pub struct NoopResults;

impl ResultSink for NoopResults {
    fn deliver(&self, _message: &OutboundMessage) -> Result<(), DetectorError> {
        Ok(())
    }
}
