//! SessionController: debounced, non-overlapping detection runs
//!
//! # States
//! `Idle → Debouncing → Analyzing → Idle`
//!
//! - Every trigger (page ready, mutation, manual) replaces the pending debounce
//!   timer, so a burst of triggers collapses into one run.
//! - A fired timer whose id is not the pending one is stale and ignored.
//! - While a run is in flight, triggers and timers are dropped, not queued.
//!
//! Public methods take `&self` so sinks and host callbacks may re-enter the
//! controller mid-run; the `is_analyzing` guard turns those calls into no-ops.

use std::cell::{Cell, RefCell};
use std::time::Duration;

use instant::Instant;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::DetectorConfig;
use crate::document::DocumentAccessor;
use crate::scanner::candidate::Candidate;
use crate::scanner::eligibility::{check_eligibility, PageSnapshot};
use crate::scanner::extractor::CandidateExtractor;
use crate::scanner::keywords::passes_keyword_gate;
use crate::session::cache::{cache_key, ResultCache};
use crate::session::scheduler::{Scheduler, TimerId};
use crate::session::sinks::{Notice, OutboundMessage, PresentationSink, ProgressSink, ResultSink};

const DEFAULT_FAILURE_MESSAGE: &str = "An error occurred during analysis.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TriggerSource {
    PageReady,
    Mutation,
    Manual,
}

/// What a fired timer amounted to
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum RunOutcome {
    /// Timer id was superseded or cancelled
    Stale,
    /// Another run was already in flight
    Skipped,
    Ineligible,
    Cached {
        found: usize,
    },
    #[serde(rename_all = "camelCase")]
    Completed {
        found: usize,
        elapsed_ms: f64,
    },
    NoTerms,
}

/// Holds `is_analyzing` for the lifetime of one run
struct AnalyzingGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> AnalyzingGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self { flag }
    }
}

impl Drop for AnalyzingGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// Lets the extractor report into the presentation sink
struct ProgressRelay<'a>(&'a dyn PresentationSink);

impl ProgressSink for ProgressRelay<'_> {
    fn progress(&self, percent: u8, status: &str) {
        self.0.progress(percent, status);
    }
}

// =============================================================================
// SessionController
// =============================================================================

pub struct SessionController<D: DocumentAccessor, S: Scheduler> {
    config: DetectorConfig,
    document: D,
    scheduler: S,
    extractor: CandidateExtractor,
    cache: RefCell<ResultCache>,
    is_analyzing: Cell<bool>,
    has_analyzed: Cell<bool>,
    pending: Cell<Option<TimerId>>,
    passes: Cell<usize>,
    presentation: Box<dyn PresentationSink>,
    results: Box<dyn ResultSink>,
}

impl<D: DocumentAccessor, S: Scheduler> SessionController<D, S> {
    pub fn new(
        config: DetectorConfig,
        document: D,
        scheduler: S,
        presentation: Box<dyn PresentationSink>,
        results: Box<dyn ResultSink>,
    ) -> Self {
        Self {
            extractor: CandidateExtractor::new(&config),
            cache: RefCell::new(ResultCache::new(config.cache_capacity)),
            config,
            document,
            scheduler,
            is_analyzing: Cell::new(false),
            has_analyzed: Cell::new(false),
            pending: Cell::new(None),
            passes: Cell::new(0),
            presentation,
            results,
        }
    }

    // -------------------------------------------------------------------------
    // Triggers
    // -------------------------------------------------------------------------

    /// (Re)start the debounce window. Returns the new timer, or `None` if a
    /// run is in flight and the trigger was dropped.
    pub fn trigger(&self, source: TriggerSource) -> Option<TimerId> {
        if self.is_analyzing.get() {
            debug!(?source, "analysis in progress, trigger dropped");
            return None;
        }

        if let Some(previous) = self.pending.take() {
            self.scheduler.cancel(previous);
        }
        let id = self.scheduler.schedule(Duration::from_millis(self.config.debounce_ms));
        self.pending.set(Some(id));
        debug!(?source, timer = id.0, "debounce scheduled");
        Some(id)
    }

    /// Added-subtree texts from a mutation batch. Re-triggers only before the
    /// first completed run and only for substantial, terms-like content.
    pub fn on_mutation<T: AsRef<str>>(&self, added_texts: &[T]) -> Option<TimerId> {
        if self.has_analyzed.get() {
            return None;
        }

        let relevant = added_texts.iter().any(|text| {
            let text = text.as_ref().trim();
            text.chars().count() > self.config.mutation_min_text_len && passes_keyword_gate(text)
        });
        if !relevant {
            return None;
        }

        info!("new terms-like content appeared");
        self.trigger(TriggerSource::Mutation)
    }

    /// Forget previous results and scan again
    pub fn manual_analyze(&self) -> Option<TimerId> {
        if self.is_analyzing.get() {
            debug!("analysis in progress, manual request dropped");
            return None;
        }

        info!("manual analysis requested");
        self.has_analyzed.set(false);
        self.cache.borrow_mut().clear();
        self.trigger(TriggerSource::Manual)
    }

    /// Host callback for a fired debounce timer
    pub fn on_timer(&self, id: TimerId) -> RunOutcome {
        if self.pending.get() != Some(id) {
            debug!(timer = id.0, "stale timer ignored");
            return RunOutcome::Stale;
        }
        self.pending.set(None);

        if self.is_analyzing.get() {
            debug!("analysis already running, skipping");
            return RunOutcome::Skipped;
        }
        self.run()
    }

    // -------------------------------------------------------------------------
    // Run
    // -------------------------------------------------------------------------

    fn run(&self) -> RunOutcome {
        let _guard = AnalyzingGuard::enter(&self.is_analyzing);

        let page = PageSnapshot::capture(&self.document, self.config.body_prefix_chars);
        let eligibility = check_eligibility(&page);
        if !eligibility.is_eligible() {
            info!(?eligibility, "page skipped");
            return RunOutcome::Ineligible;
        }

        let key = cache_key(&page.url, self.document.markup_len());
        let cached = self.cache.borrow().get(&key).map(|entry| entry.candidates.clone());
        if let Some(candidates) = cached {
            info!(key = %key, "using cached result");
            let found = candidates.len();
            self.presentation.notice(Notice::Show);
            self.presentation.notice(Notice::Progress {
                percent: 100,
                status: "Using cached result".to_string(),
            });
            self.presentation.notice(Notice::Success { found, elapsed_ms: 0.0, cached: true });
            self.deliver(candidates, &page.url);
            return RunOutcome::Cached { found };
        }

        self.presentation.notice(Notice::Show);
        self.presentation.notice(Notice::Indeterminate {
            status: "Preparing page analysis...".to_string(),
        });

        let started = Instant::now();
        self.passes.set(self.passes.get() + 1);
        let report = self.extractor.extract(&self.document, &ProgressRelay(self.presentation.as_ref()));
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        info!(elapsed_ms, strategy = ?report.strategy, "extraction finished");

        self.has_analyzed.set(true);

        if report.candidates.is_empty() {
            info!("no terms found");
            self.presentation.notice(Notice::NoTerms);
            return RunOutcome::NoTerms;
        }

        let found = report.candidates.len();
        for (rank, candidate) in report.candidates.iter().enumerate() {
            info!(
                rank = rank + 1,
                score = candidate.score,
                kind = candidate.features.kind.as_str(),
                language = candidate.features.language.as_str(),
                required = candidate.is_required,
                "terms candidate"
            );
        }

        self.cache.borrow_mut().put(&key, report.candidates.clone());

        self.presentation.notice(Notice::Progress {
            percent: 100,
            status: format!("{} terms found!", found),
        });
        self.presentation.notice(Notice::Success { found, elapsed_ms, cached: false });
        self.presentation.notice(Notice::Stats {
            scanned: report.elements_examined,
            found,
            elapsed_ms,
        });

        self.deliver(report.candidates, &page.url);
        RunOutcome::Completed { found, elapsed_ms }
    }

    /// Hand results downstream. A failure is surfaced, never retried.
    fn deliver(&self, terms: Vec<Candidate>, url: &str) {
        let messages = [
            OutboundMessage::AnalyzeTerms { terms, url: url.to_string() },
            OutboundMessage::UpdateBadge { text: "analyzing".to_string() },
        ];

        for message in &messages {
            if let Err(e) = self.results.deliver(message) {
                warn!(error = %e, "result delivery failed");
                self.presentation.notice(Notice::Error { message: e.to_string() });
                return;
            }
        }
    }

    // -------------------------------------------------------------------------
    // Host notifications / queries
    // -------------------------------------------------------------------------

    /// Downstream analysis finished
    pub fn on_analysis_complete(&self, success: bool, error: Option<&str>) {
        if success {
            info!("downstream analysis succeeded");
            return;
        }

        let message = error
            .filter(|e| !e.is_empty())
            .unwrap_or(DEFAULT_FAILURE_MESSAGE)
            .to_string();
        warn!(error = %message, "downstream analysis failed");
        self.presentation.notice(Notice::Error { message });
    }

    /// Whether the host should bother installing a mutation observer
    pub fn should_observe_mutations(&self) -> bool {
        let page = PageSnapshot::capture(&self.document, self.config.body_prefix_chars);
        check_eligibility(&page).is_eligible()
    }

    pub fn is_analyzing(&self) -> bool {
        self.is_analyzing.get()
    }

    pub fn has_analyzed(&self) -> bool {
        self.has_analyzed.get()
    }

    pub fn pending_timer(&self) -> Option<TimerId> {
        self.pending.get()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Number of extractor invocations so far
    pub fn extraction_passes(&self) -> usize {
        self.passes.get()
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
}
