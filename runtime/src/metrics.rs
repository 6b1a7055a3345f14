//! Metric descriptions for the Store runtime.
//!
//! The runtime records through the [`metrics`] facade; whichever recorder the
//! application installs receives them. Call [`describe_metrics`] once after
//! installing a recorder so exporters can attach help text.
//!
//! # Example
//!
//! ```rust,ignore
//! install_my_recorder();
//! composable_mvi_runtime::metrics::describe_metrics();
//! ```

use metrics::{describe_counter, describe_histogram, Unit};

/// Actions reduced by any store.
pub const ACTIONS_TOTAL: &str = "store.actions.total";
/// Effects executed, labelled by `type`.
pub const EFFECTS_EXECUTED: &str = "store.effects.executed";
/// Tasks aborted because their scope was superseded or cancelled.
pub const EFFECTS_CANCELLED: &str = "store.effects.cancelled";
/// Feedback actions dropped because their scope generation was stale.
pub const FEEDBACK_STALE: &str = "store.feedback.stale";
/// State snapshots published to the state sink.
pub const STATE_EMITTED: &str = "store.state.emitted";
/// Reductions that left state structurally unchanged.
pub const STATE_SUPPRESSED: &str = "store.state.suppressed";
/// One-shot signals published.
pub const SIGNALS_EMITTED: &str = "store.signals.emitted";
/// Stores disposed.
pub const DISPOSED: &str = "store.dispose";
/// Reducer execution time.
pub const REDUCER_DURATION: &str = "store.reducer.duration_seconds";

/// Register all metric descriptions.
pub fn describe_metrics() {
    describe_counter!(ACTIONS_TOTAL, "Total number of actions reduced");
    describe_counter!(EFFECTS_EXECUTED, "Total number of effects executed by type");
    describe_counter!(
        EFFECTS_CANCELLED,
        "Effect tasks aborted by cancellation or supersession"
    );
    describe_counter!(
        FEEDBACK_STALE,
        "Feedback actions discarded because their scope was superseded"
    );
    describe_counter!(STATE_EMITTED, "State snapshots published to observers");
    describe_counter!(
        STATE_SUPPRESSED,
        "Reductions suppressed because state did not change"
    );
    describe_counter!(SIGNALS_EMITTED, "One-shot signals published");
    describe_counter!(DISPOSED, "Stores disposed");
    describe_histogram!(REDUCER_DURATION, Unit::Seconds, "Reducer execution time");
}
