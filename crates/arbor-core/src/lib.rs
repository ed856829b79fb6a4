//! Core of Arbor: the predicate tree model, structural rules, and the
//! invariant layer every tree mutation must pass through.
#![warn(unreachable_pub)]

pub mod catalog;
pub mod error;
pub mod invariant;
pub mod model;
pub mod obs;
pub mod rules;
pub mod schema;

pub use error::{GuardError, GuardErrorKind};

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No invariants, rules, or observability helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        catalog::{Catalog, MemoryCatalog},
        model::{
            Combinator, ComparisonPredicate, CompoundPredicate, NodePath, Operator, OperatorId,
            Predicate, PredicateKind, Target, TargetId, Type, TypeId, Value,
        },
        schema::PredicateSchema,
    };
}
