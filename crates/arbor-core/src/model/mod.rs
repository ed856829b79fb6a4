mod predicate;
mod reference;

pub use predicate::{
    Combinator, ComparisonPredicate, CompoundPredicate, InsertPosition, NodePath, Predicate,
    PredicateKind, Value,
};
pub use reference::{Operator, OperatorId, Target, TargetId, Type, TypeId};
