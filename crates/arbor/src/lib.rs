//! ## Crate layout
//! - `core`: predicate model, structural rules, invariants, and observability.
//! - `draft`: builds checked predicate trees from tagged JSON drafts.
//! - `editor`: `PredicateTree`, the invariant-guarded tree-editing service.
//!
//! The `prelude` module mirrors the surface a host application edits with.

pub use arbor_core as core;

pub mod draft;
pub mod editor;

pub use arbor_core::{GuardError, GuardErrorKind};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        GuardError, GuardErrorKind,
        core::prelude::*,
        draft::{DraftError, PredicateDraft},
        editor::{EditorError, PredicateTree},
    };
}
