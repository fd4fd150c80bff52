//! Controller scenarios driven through a virtual clock

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::*;
use crate::config::DetectorConfig;
use crate::document::HtmlDocument;
use crate::error::DetectorError;

type Controller = SessionController<HtmlDocument, TimerQueue>;

// =============================================================================
// Recording sinks
// =============================================================================

/// Re-enters the controller from inside progress callbacks when wired up
#[derive(Default)]
struct Reentry {
    target: RefCell<Option<Weak<Controller>>>,
    triggers: RefCell<Vec<Option<TimerId>>>,
    manual: RefCell<Vec<Option<TimerId>>>,
}

struct RecordingPresentation {
    notices: Rc<RefCell<Vec<Notice>>>,
    progress: Rc<RefCell<Vec<u8>>>,
    reentry: Rc<Reentry>,
}

impl ProgressSink for RecordingPresentation {
    fn progress(&self, percent: u8, _status: &str) {
        self.progress.borrow_mut().push(percent);

        let target = self.reentry.target.borrow().as_ref().and_then(Weak::upgrade);
        if let Some(controller) = target {
            self.reentry.triggers.borrow_mut().push(controller.trigger(TriggerSource::Mutation));
            self.reentry.manual.borrow_mut().push(controller.manual_analyze());
        }
    }
}

impl PresentationSink for RecordingPresentation {
    fn notice(&self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }
}

struct RecordingResults {
    delivered: Rc<RefCell<Vec<OutboundMessage>>>,
    fail: bool,
}

impl ResultSink for RecordingResults {
    fn deliver(&self, message: &OutboundMessage) -> Result<(), DetectorError> {
        if self.fail {
            return Err(DetectorError::Delivery("extension context invalidated".to_string()));
        }
        self.delivered.borrow_mut().push(message.clone());
        Ok(())
    }
}

struct Harness {
    controller: Rc<Controller>,
    notices: Rc<RefCell<Vec<Notice>>>,
    progress: Rc<RefCell<Vec<u8>>>,
    delivered: Rc<RefCell<Vec<OutboundMessage>>>,
    reentry: Rc<Reentry>,
}

impl Harness {
    fn new(url: &str, body: &str) -> Self {
        Self::build(url, body, false)
    }

    fn failing_delivery(url: &str, body: &str) -> Self {
        Self::build(url, body, true)
    }

    fn build(url: &str, body: &str, fail: bool) -> Self {
        let notices = Rc::new(RefCell::new(Vec::new()));
        let progress = Rc::new(RefCell::new(Vec::new()));
        let delivered = Rc::new(RefCell::new(Vec::new()));
        let reentry = Rc::new(Reentry::default());

        let document = HtmlDocument::parse(
            url,
            &format!("<html><head><title>Create account</title></head><body>{}</body></html>", body),
        );
        let controller = Rc::new(SessionController::new(
            DetectorConfig::default(),
            document,
            TimerQueue::new(),
            Box::new(RecordingPresentation {
                notices: Rc::clone(&notices),
                progress: Rc::clone(&progress),
                reentry: Rc::clone(&reentry),
            }),
            Box::new(RecordingResults { delivered: Rc::clone(&delivered), fail }),
        ));

        Self { controller, notices, progress, delivered, reentry }
    }

    /// Advance the clock and hand every due timer to the controller
    fn advance(&self, ms: u64) -> Vec<RunOutcome> {
        let due = self.controller.scheduler().advance(ms);
        due.into_iter().map(|id| self.controller.on_timer(id)).collect()
    }

    fn trigger_and_settle(&self) -> RunOutcome {
        self.controller.trigger(TriggerSource::PageReady);
        let mut outcomes = self.advance(500);
        assert_eq!(outcomes.len(), 1);
        outcomes.remove(0)
    }

    fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.borrow_mut())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

const SIGNUP_URL: &str = "https://shop.test/signup";

fn korean_terms(min_chars: usize) -> String {
    let clause = "제1조 (목적) 본 이용약관은 회원의 개인정보 수집 및 이용 목적과 \
                  처리 방법에 대한 동의 사항을 규정합니다. ";
    let mut text = String::new();
    while text.chars().count() < min_chars {
        text.push_str(clause);
    }
    text
}

fn consent_form() -> String {
    format!(
        r#"<div class="signup-form">
             <label><input type="checkbox" required> 동의합니다</label>
             <div class="terms-box" style="overflow: auto; border: 1px solid #ddd"><p>{}</p></div>
           </div>"#,
        korean_terms(1200)
    )
}

// =============================================================================
// Debounce
// =============================================================================

#[test]
fn test_burst_of_triggers_runs_once() {
    let h = Harness::new(SIGNUP_URL, &consent_form());

    for _ in 0..5 {
        assert!(h.controller.trigger(TriggerSource::Mutation).is_some());
        assert!(h.advance(100).is_empty());
    }
    assert_eq!(h.controller.scheduler().pending_count(), 1);

    let outcomes = h.advance(500);
    assert_eq!(outcomes.len(), 1);
    assert!(matches!(outcomes[0], RunOutcome::Completed { found: 1, .. }));
    assert_eq!(h.controller.extraction_passes(), 1);
}

#[test]
fn test_superseded_timer_is_stale() {
    let h = Harness::new(SIGNUP_URL, &consent_form());

    let first = h.controller.trigger(TriggerSource::PageReady).unwrap();
    let second = h.controller.trigger(TriggerSource::PageReady).unwrap();
    assert_ne!(first, second);

    // A host that could not cancel still delivers the old id.
    assert_eq!(h.controller.on_timer(first), RunOutcome::Stale);
    assert_eq!(h.controller.extraction_passes(), 0);

    assert!(matches!(h.controller.on_timer(second), RunOutcome::Completed { .. }));
    assert_eq!(h.controller.on_timer(second), RunOutcome::Stale);
    assert_eq!(h.controller.pending_timer(), None);
}

// =============================================================================
// Runs
// =============================================================================

#[test]
fn test_fresh_run_notices_and_delivery() {
    let h = Harness::new(SIGNUP_URL, &consent_form());

    let outcome = h.trigger_and_settle();
    assert!(matches!(outcome, RunOutcome::Completed { found: 1, .. }));
    assert!(h.controller.has_analyzed());
    assert!(!h.controller.is_analyzing());
    assert_eq!(h.controller.cache_len(), 1);

    let notices = h.take_notices();
    assert_eq!(notices[0], Notice::Show);
    assert!(matches!(notices[1], Notice::Indeterminate { .. }));
    assert!(matches!(notices[2], Notice::Progress { percent: 100, .. }));
    assert!(matches!(notices[3], Notice::Success { found: 1, cached: false, .. }));
    assert!(matches!(notices[4], Notice::Stats { found: 1, .. }));

    let progress = h.progress.borrow();
    assert_eq!(progress.first(), Some(&10));
    assert_eq!(progress.last(), Some(&90));

    let delivered = h.delivered.borrow();
    assert_eq!(delivered.len(), 2);
    match &delivered[0] {
        OutboundMessage::AnalyzeTerms { terms, url } => {
            assert_eq!(url, SIGNUP_URL);
            assert_eq!(terms.len(), 1);
            assert!(terms[0].is_required);
        }
        other => panic!("unexpected first message: {:?}", other),
    }
    assert_eq!(delivered[1], OutboundMessage::UpdateBadge { text: "analyzing".into() });
}

#[test]
fn test_unchanged_page_served_from_cache() {
    let h = Harness::new(SIGNUP_URL, &consent_form());
    h.trigger_and_settle();
    h.take_notices();

    let outcome = h.trigger_and_settle();

    assert_eq!(outcome, RunOutcome::Cached { found: 1 });
    assert_eq!(h.controller.extraction_passes(), 1);
    let notices = h.take_notices();
    assert_eq!(notices.len(), 3);
    assert_eq!(notices[0], Notice::Show);
    assert!(matches!(notices[1], Notice::Progress { percent: 100, .. }));
    assert!(matches!(notices[2], Notice::Success { found: 1, cached: true, .. }));
    assert_eq!(h.delivered.borrow().len(), 4);
}

#[test]
fn test_empty_result_is_not_cached() {
    let h = Harness::new(SIGNUP_URL, "<p>Welcome back.</p>");

    assert_eq!(h.trigger_and_settle(), RunOutcome::NoTerms);
    assert!(h.controller.has_analyzed());
    assert_eq!(h.controller.cache_len(), 0);
    assert!(h.take_notices().contains(&Notice::NoTerms));
    assert!(h.delivered.borrow().is_empty());

    assert_eq!(h.trigger_and_settle(), RunOutcome::NoTerms);
    assert_eq!(h.controller.extraction_passes(), 2);
}

#[test]
fn test_excluded_domain_does_nothing() {
    let h = Harness::new("https://www.youtube.com/watch?v=abc", &consent_form());

    assert!(!h.controller.should_observe_mutations());
    assert_eq!(h.trigger_and_settle(), RunOutcome::Ineligible);
    assert_eq!(h.controller.extraction_passes(), 0);
    assert!(h.take_notices().is_empty());
    assert!(h.delivered.borrow().is_empty());
    assert!(!h.controller.has_analyzed());
}

#[test]
fn test_eligible_page_observes_mutations() {
    let h = Harness::new(SIGNUP_URL, "<p>Loading...</p>");
    assert!(h.controller.should_observe_mutations());
}

// =============================================================================
// Re-entrancy
// =============================================================================

#[test]
fn test_triggers_during_run_are_dropped() {
    let h = Harness::new(SIGNUP_URL, &consent_form());
    *h.reentry.target.borrow_mut() = Some(Rc::downgrade(&h.controller));

    let outcome = h.trigger_and_settle();
    assert!(matches!(outcome, RunOutcome::Completed { .. }));

    let triggers = h.reentry.triggers.borrow();
    assert!(!triggers.is_empty());
    assert!(triggers.iter().all(Option::is_none));
    assert!(h.reentry.manual.borrow().iter().all(Option::is_none));

    assert_eq!(h.controller.pending_timer(), None);
    assert_eq!(h.controller.scheduler().pending_count(), 0);
    assert!(h.advance(10_000).is_empty());
    assert_eq!(h.controller.extraction_passes(), 1);
    assert!(!h.controller.is_analyzing());
}

// =============================================================================
// Manual re-trigger
// =============================================================================

#[test]
fn test_manual_analyze_forces_rescan() {
    let h = Harness::new(SIGNUP_URL, &consent_form());
    h.trigger_and_settle();
    assert!(h.controller.has_analyzed());
    assert_eq!(h.controller.cache_len(), 1);

    assert!(h.controller.manual_analyze().is_some());
    assert!(!h.controller.has_analyzed());
    assert_eq!(h.controller.cache_len(), 0);

    let outcomes = h.advance(500);
    assert!(matches!(outcomes[..], [RunOutcome::Completed { found: 1, .. }]));
    assert_eq!(h.controller.extraction_passes(), 2);
    assert!(h.controller.has_analyzed());
}

// =============================================================================
// Mutations
// =============================================================================

#[test]
fn test_mutation_gating() {
    let h = Harness::new(SIGNUP_URL, "<p>Loading...</p>");

    let short = korean_terms(50);
    assert!(h.controller.on_mutation(&[short.as_str()]).is_none());

    let unrelated = "Our new spring range is here with bright colours, soft fabrics \
                     and relaxed fits for every day of the week. Browse the lookbook, pick \
                     your favourites and enjoy free shipping on orders over fifty dollars. \
                     Sizes run true, returns are easy and gift wrapping is always available.";
    assert!(h.controller.on_mutation(&[unrelated]).is_none());

    let terms = korean_terms(250);
    assert!(h.controller.on_mutation(&[unrelated, terms.as_str()]).is_some());
}

#[test]
fn test_mutations_ignored_after_first_run() {
    let h = Harness::new(SIGNUP_URL, &consent_form());
    h.trigger_and_settle();

    let terms = korean_terms(250);
    assert!(h.controller.on_mutation(&[terms]).is_none());
    assert_eq!(h.controller.pending_timer(), None);
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_delivery_failure_surfaces_error() {
    let h = Harness::failing_delivery(SIGNUP_URL, &consent_form());

    let outcome = h.trigger_and_settle();

    assert!(matches!(outcome, RunOutcome::Completed { found: 1, .. }));
    assert_eq!(h.controller.cache_len(), 1);
    assert!(h.controller.has_analyzed());
    assert!(!h.controller.is_analyzing());

    let notices = h.take_notices();
    match notices.last() {
        Some(Notice::Error { message }) => assert!(message.contains("extension context invalidated")),
        other => panic!("expected error notice, got {:?}", other),
    }
}

#[test]
fn test_analysis_complete_notifications() {
    let h = Harness::new(SIGNUP_URL, "<p>Loading...</p>");

    h.controller.on_analysis_complete(true, None);
    assert!(h.take_notices().is_empty());

    h.controller.on_analysis_complete(false, Some("quota exceeded"));
    assert_eq!(h.take_notices(), vec![Notice::Error { message: "quota exceeded".into() }]);

    h.controller.on_analysis_complete(false, None);
    match h.take_notices().as_slice() {
        [Notice::Error { message }] => assert!(!message.is_empty()),
        other => panic!("unexpected notices: {:?}", other),
    }
}
