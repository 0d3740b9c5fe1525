//! Store-level metrics.
//!
//! Recorded through the `metrics` facade; whichever recorder the host
//! application installs receives them. Without a recorder they are no-ops.
//!
//! ## Counters
//! - `store_actions_total{action}` - Actions reduced (including feedback dispatches)
//! - `store_persist_failures_total` - Persistence attempts that failed
//!
//! ## Histograms
//! - `store_reduce_duration_seconds` - Time spent in one `send` (reduce + effects)

use metrics::{describe_counter, describe_histogram};
use std::time::Duration;

/// Register metric descriptions.
///
/// Call once at startup after installing a recorder.
pub fn register_metrics() {
    describe_counter!(
        "store_actions_total",
        "Total number of actions reduced by the store"
    );
    describe_counter!(
        "store_persist_failures_total",
        "Total number of failed persistence attempts"
    );
    describe_histogram!(
        "store_reduce_duration_seconds",
        "Time spent reducing an action and executing its effects"
    );
}

/// Record one reduced action.
pub fn record_action(kind: &'static str) {
    metrics::counter!("store_actions_total", "action" => kind).increment(1);
}

/// Record the wall time of one `send`.
pub fn record_send_duration(elapsed: Duration) {
    metrics::histogram!("store_reduce_duration_seconds").record(elapsed.as_secs_f64());
}

/// Record a failed persistence attempt.
pub fn record_persist_failure() {
    metrics::counter!("store_persist_failures_total").increment(1);
}
