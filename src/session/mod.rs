pub mod cache;
pub mod controller;
pub mod scheduler;
pub mod sinks;

#[cfg(test)]
mod tests;

pub use cache::{cache_key, CacheEntry, ResultCache};
pub use controller::{RunOutcome, SessionController, TriggerSource};
pub use scheduler::{Scheduler, TimerId, TimerQueue};
pub use sinks::{
    NoopPresentation, NoopProgress, NoopResults, Notice, OutboundMessage, PresentationSink,
    ProgressSink, ResultSink,
};
