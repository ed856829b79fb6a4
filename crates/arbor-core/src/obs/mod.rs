//! Observability: invariant-check telemetry (metrics) and sink abstractions.
//!
//! Invariants stay pure. Callers that chain them route each call through
//! [`check`], which records the outcome and traces rejections.

pub(crate) mod metrics;
pub(crate) mod sink;

use crate::{error::GuardError, invariant::Invariant};

// re-exports
pub use metrics::{EventOps, EventReport, InvariantCounters};
pub use sink::{
    EditKind, MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, record,
    with_metrics_sink,
};

/// Run one invariant, recording its outcome.
pub fn check<T>(
    invariant: Invariant,
    f: impl FnOnce() -> Result<T, GuardError>,
) -> Result<T, GuardError> {
    let outcome = f();

    record(MetricsEvent::InvariantChecked {
        invariant,
        passed: outcome.is_ok(),
    });

    if let Err(err) = &outcome {
        debug_assert_eq!(err.kind, invariant.raises());
        tracing::debug!(
            invariant = invariant.name(),
            code = err.code(),
            message = err.message.as_deref().unwrap_or_default(),
            "invariant rejected mutation"
        );
    }

    outcome
}

///
/// TESTS
///
