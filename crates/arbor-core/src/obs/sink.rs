//! Metrics sink boundary.
//!
//! Invariants MUST NOT depend on obs::metrics directly; they stay pure.
//! Instrumentation flows through MetricsEvent and MetricsSink, recorded by
//! the callers that chain invariants.
use crate::{invariant::Invariant, obs::metrics};
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = RefCell::new(None);
}

///
/// EditKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EditKind {
    Add,
    Remove,
    Rebind,
    Build,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    InvariantChecked { invariant: Invariant, passed: bool },
    EditStart { kind: EditKind },
    EditApplied { kind: EditKind },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default thread-local sink that writes into global metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::InvariantChecked { invariant, passed } => {
                metrics::with_state_mut(|m| {
                    m.ops.checks = m.ops.checks.saturating_add(1);
                    if !passed {
                        m.ops.rejections = m.ops.rejections.saturating_add(1);
                    }

                    let entry = m
                        .invariants
                        .entry(invariant.name().to_string())
                        .or_default();
                    entry.checks = entry.checks.saturating_add(1);
                    if !passed {
                        entry.rejections = entry.rejections.saturating_add(1);
                    }
                });
            }

            MetricsEvent::EditStart { kind } => {
                metrics::with_state_mut(|m| {
                    let counter = match kind {
                        EditKind::Add => &mut m.ops.add_calls,
                        EditKind::Remove => &mut m.ops.remove_calls,
                        EditKind::Rebind => &mut m.ops.rebind_calls,
                        EditKind::Build => &mut m.ops.build_calls,
                    };
                    *counter = counter.saturating_add(1);
                });
            }

            MetricsEvent::EditApplied { .. } => {
                metrics::with_state_mut(|m| {
                    m.ops.mutations_applied = m.ops.mutations_applied.saturating_add(1);
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub fn record(event: MetricsEvent) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current metrics state for test and host plumbing.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}
