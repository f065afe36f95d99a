use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("chatbox.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("chatbox.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("chatbox.client.request_duration_seconds");

pub(crate) static DISPATCH_SENDS: Counter = Counter::new("chatbox.dispatch.sends");
pub(crate) static DISPATCH_IGNORED: Counter = Counter::new("chatbox.dispatch.ignored");
pub(crate) static DISPATCH_REPLIES: Counter = Counter::new("chatbox.dispatch.replies");
pub(crate) static DISPATCH_FAILURES: Counter = Counter::new("chatbox.dispatch.failures");
pub(crate) static DISPATCH_DURATION: Moments =
    Moments::new("chatbox.dispatch.pending_duration_seconds");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&DISPATCH_SENDS);
    collector.register_counter(&DISPATCH_IGNORED);
    collector.register_counter(&DISPATCH_REPLIES);
    collector.register_counter(&DISPATCH_FAILURES);
    collector.register_moments(&DISPATCH_DURATION);
}
