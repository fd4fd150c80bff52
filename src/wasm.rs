//! JavaScript bindings
//!
//! The host supplies three callbacks: a timer scheduler, a presentation
//! renderer and a result sender. All payloads cross the boundary as plain
//! objects via serde-wasm-bindgen.

use std::cell::{Cell, RefCell};
use std::time::Duration;

use js_sys::Function;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::DetectorConfig;
use crate::document::BrowserDocument;
use crate::error::DetectorError;
use crate::scanner::eligibility::is_page_eligible;
use crate::session::controller::{SessionController, TriggerSource};
use crate::session::scheduler::{Scheduler, TimerId};
use crate::session::sinks::{Notice, OutboundMessage, PresentationSink, ProgressSink, ResultSink};

fn to_js_error(e: DetectorError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_js<T: Serialize>(value: &T) -> Option<JsValue> {
    match serde_wasm_bindgen::to_value(value) {
        Ok(js) => Some(js),
        Err(e) => {
            web_sys::console::error_1(&format!("[TermsDetector] Serialization failed: {:?}", e).into());
            None
        }
    }
}

fn describe(e: &JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{:?}", e))
}

// =============================================================================
// Host adapters
// =============================================================================

/// `schedule(id, delayMs)` is expected to call `TermsDetector.fire(id)` later.
/// `cancel(id)` is optional since stale ids are ignored anyway.
pub struct JsScheduler {
    schedule: Function,
    cancel: RefCell<Option<Function>>,
    next_id: Cell<u64>,
}

impl JsScheduler {
    pub fn new(schedule: Function) -> Self {
        Self { schedule, cancel: RefCell::new(None), next_id: Cell::new(1) }
    }

    pub fn set_cancel(&self, cancel: Function) {
        *self.cancel.borrow_mut() = Some(cancel);
    }
}

impl Scheduler for JsScheduler {
    fn schedule(&self, delay: Duration) -> TimerId {
        let id = TimerId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        let delay_ms = JsValue::from_f64(delay.as_millis() as f64);
        if let Err(e) = self.schedule.call2(&JsValue::NULL, &JsValue::from_f64(id.0 as f64), &delay_ms) {
            web_sys::console::error_1(&format!("[TermsDetector] schedule callback threw: {}", describe(&e)).into());
        }
        id
    }

    fn cancel(&self, id: TimerId) {
        if let Some(cancel) = self.cancel.borrow().as_ref() {
            let _ = cancel.call1(&JsValue::NULL, &JsValue::from_f64(id.0 as f64));
        }
    }
}

struct JsPresentation {
    render: Function,
}

impl ProgressSink for JsPresentation {
    fn progress(&self, percent: u8, status: &str) {
        self.notice(Notice::Progress { percent, status: status.to_string() });
    }
}

impl PresentationSink for JsPresentation {
    fn notice(&self, notice: Notice) {
        if let Some(js) = to_js(&notice) {
            // Overlay exceptions are ignored.
            let _ = self.render.call1(&JsValue::NULL, &js);
        }
    }
}

struct JsResultSink {
    send: Function,
}

impl ResultSink for JsResultSink {
    fn deliver(&self, message: &OutboundMessage) -> Result<(), DetectorError> {
        let js = serde_wasm_bindgen::to_value(message)
            .map_err(|e| DetectorError::Delivery(e.to_string()))?;
        self.send
            .call1(&JsValue::NULL, &js)
            .map(|_| ())
            .map_err(|e| DetectorError::Delivery(describe(&e)))
    }
}

fn parse_config(config: JsValue) -> Result<DetectorConfig, JsValue> {
    let config = if config.is_undefined() || config.is_null() {
        DetectorConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&e.to_string()))?
    };
    config.validate().map_err(to_js_error)?;
    Ok(config)
}

// =============================================================================
// TermsDetector
// =============================================================================

/// Detection session bound to the current window
#[wasm_bindgen]
pub struct TermsDetector {
    inner: SessionController<BrowserDocument, JsScheduler>,
}

#[wasm_bindgen]
impl TermsDetector {
    #[wasm_bindgen(constructor)]
    pub fn new(
        config: JsValue,
        schedule: Function,
        render: Function,
        send: Function,
    ) -> Result<TermsDetector, JsValue> {
        let config = parse_config(config)?;
        let document = BrowserDocument::from_window().map_err(to_js_error)?;

        Ok(TermsDetector {
            inner: SessionController::new(
                config,
                document,
                JsScheduler::new(schedule),
                Box::new(JsPresentation { render }),
                Box::new(JsResultSink { send }),
            ),
        })
    }

    /// Optional `clearTimeout`-style hook
    #[wasm_bindgen(js_name = setCancelHandler)]
    pub fn set_cancel_handler(&self, cancel: Function) {
        self.inner.scheduler().set_cancel(cancel);
    }

    /// `source` is one of `pageReady`, `mutation`, `manual`.
    /// Returns the scheduled timer id, or undefined if the trigger was dropped.
    #[wasm_bindgen]
    pub fn trigger(&self, source: &str) -> Result<Option<f64>, JsValue> {
        let source = match source {
            "pageReady" => TriggerSource::PageReady,
            "mutation" => TriggerSource::Mutation,
            "manual" => TriggerSource::Manual,
            other => return Err(JsValue::from_str(&format!("unknown trigger source: {}", other))),
        };
        Ok(self.inner.trigger(source).map(|id| id.0 as f64))
    }

    /// Timer callback. Returns the run outcome.
    #[wasm_bindgen]
    pub fn fire(&self, id: f64) -> JsValue {
        let outcome = self.inner.on_timer(TimerId(id as u64));
        to_js(&outcome).unwrap_or(JsValue::UNDEFINED)
    }

    #[wasm_bindgen(js_name = manualAnalyze)]
    pub fn manual_analyze(&self) -> Option<f64> {
        self.inner.manual_analyze().map(|id| id.0 as f64)
    }

    /// `texts`: text content of each added subtree in a mutation batch
    #[wasm_bindgen(js_name = onMutation)]
    pub fn on_mutation(&self, texts: JsValue) -> Result<Option<f64>, JsValue> {
        let texts: Vec<String> = serde_wasm_bindgen::from_value(texts)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(self.inner.on_mutation(&texts).map(|id| id.0 as f64))
    }

    #[wasm_bindgen(js_name = analysisComplete)]
    pub fn analysis_complete(&self, success: bool, error: Option<String>) {
        self.inner.on_analysis_complete(success, error.as_deref());
    }

    #[wasm_bindgen(js_name = shouldObserveMutations)]
    pub fn should_observe_mutations(&self) -> bool {
        self.inner.should_observe_mutations()
    }

    #[wasm_bindgen(js_name = isAnalyzing)]
    pub fn is_analyzing(&self) -> bool {
        self.inner.is_analyzing()
    }

    #[wasm_bindgen(js_name = hasAnalyzed)]
    pub fn has_analyzed(&self) -> bool {
        self.inner.has_analyzed()
    }
}

/// Eligibility of the current page, with the deciding reason
#[wasm_bindgen(js_name = isEligible)]
pub fn is_eligible(config: JsValue) -> Result<JsValue, JsValue> {
    let config = parse_config(config)?;
    let document = BrowserDocument::from_window().map_err(to_js_error)?;
    let eligibility = is_page_eligible(&document, config.body_prefix_chars);
    serde_wasm_bindgen::to_value(&eligibility).map_err(|e| JsValue::from_str(&e.to_string()))
}
