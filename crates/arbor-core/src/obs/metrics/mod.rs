use crate::invariant::Invariant;
use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

///
/// Metrics
/// Ephemeral, in-memory counters for invariant checks.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub(crate) struct EventState {
    pub(crate) ops: EventOps,
    pub(crate) invariants: BTreeMap<String, InvariantCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventOps {
    // Invariant checks
    pub checks: u64,
    pub rejections: u64,

    // Editor entrypoints
    pub add_calls: u64,
    pub remove_calls: u64,
    pub rebind_calls: u64,
    pub build_calls: u64,

    // Mutations actually applied
    pub mutations_applied: u64,
}

///
/// InvariantCounters
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct InvariantCounters {
    pub checks: u64,
    pub rejections: u64,
}

///
/// EventReport
/// Point-in-time snapshot handed to callers.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventReport {
    pub ops: EventOps,
    pub invariants: BTreeMap<String, InvariantCounters>,
}

impl EventReport {
    #[must_use]
    pub fn invariant(&self, invariant: Invariant) -> InvariantCounters {
        self.invariants
            .get(invariant.name())
            .cloned()
            .unwrap_or_default()
    }
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters (useful in tests).
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

/// Snapshot the current metrics state.
#[must_use]
pub(crate) fn report() -> EventReport {
    with_state(|m| EventReport {
        ops: m.ops.clone(),
        invariants: m.invariants.clone(),
    })
}
