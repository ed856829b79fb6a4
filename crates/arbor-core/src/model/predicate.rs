use crate::model::reference::{OperatorId, TargetId, TypeId};
use derive_more::Deref;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    ops::{BitAnd, BitOr},
};

///
/// Predicate tree
///
/// Shape-only representation of a filter expression: boolean groups over
/// leaf comparisons. Nothing here evaluates a predicate against data, and
/// nothing here enforces well-formedness; that is the job of `invariant`.
///

///
/// Combinator
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    #[default]
    And,
    Or,
}

///
/// Value
///
/// Literal side of a comparison. Variants decode in declaration order, so a
/// JSON integer lands in `Int` (or `Uint` past `i64::MAX`) and only numbers
/// with a fraction or exponent become `Float`.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Text(String),
    List(Vec<Self>),
}

///
/// ComparisonPredicate
///
/// Leaf node. `type_id` is implied by the target and stays absent until the
/// target has been resolved against a catalog.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ComparisonPredicate {
    pub target_id: TargetId,
    pub operator_id: OperatorId,
    #[serde(default)]
    pub type_id: Option<TypeId>,
    #[serde(default)]
    pub value: Value,
}

impl ComparisonPredicate {
    #[must_use]
    pub fn new(
        target_id: impl Into<TargetId>,
        operator_id: impl Into<OperatorId>,
        value: Value,
    ) -> Self {
        Self {
            target_id: target_id.into(),
            operator_id: operator_id.into(),
            type_id: None,
            value,
        }
    }

    #[must_use]
    pub fn typed(mut self, type_id: impl Into<TypeId>) -> Self {
        self.type_id = Some(type_id.into());
        self
    }
}

///
/// CompoundPredicate
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CompoundPredicate {
    pub combinator: Combinator,
    pub predicates: Vec<Predicate>,
}

impl CompoundPredicate {
    #[must_use]
    pub const fn new(combinator: Combinator, predicates: Vec<Predicate>) -> Self {
        Self {
            combinator,
            predicates,
        }
    }
}

///
/// Predicate
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Predicate {
    Compound(CompoundPredicate),
    Comparison(ComparisonPredicate),
}

impl Predicate {
    #[must_use]
    pub const fn and(predicates: Vec<Self>) -> Self {
        Self::Compound(CompoundPredicate::new(Combinator::And, predicates))
    }

    #[must_use]
    pub const fn or(predicates: Vec<Self>) -> Self {
        Self::Compound(CompoundPredicate::new(Combinator::Or, predicates))
    }

    #[must_use]
    pub fn compare(
        target_id: impl Into<TargetId>,
        operator_id: impl Into<OperatorId>,
        value: Value,
    ) -> Self {
        Self::Comparison(ComparisonPredicate::new(target_id, operator_id, value))
    }

    #[must_use]
    pub const fn kind(&self) -> PredicateKind {
        match self {
            Self::Compound(_) => PredicateKind::Compound,
            Self::Comparison(_) => PredicateKind::Comparison,
        }
    }

    #[must_use]
    pub const fn is_compound(&self) -> bool {
        matches!(self, Self::Compound(_))
    }

    #[must_use]
    pub const fn is_comparison(&self) -> bool {
        matches!(self, Self::Comparison(_))
    }

    /// Direct children; empty for leaves.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        match self {
            Self::Compound(compound) => &compound.predicates,
            Self::Comparison(_) => &[],
        }
    }
}

impl From<CompoundPredicate> for Predicate {
    fn from(compound: CompoundPredicate) -> Self {
        Self::Compound(compound)
    }
}

impl From<ComparisonPredicate> for Predicate {
    fn from(comparison: ComparisonPredicate) -> Self {
        Self::Comparison(comparison)
    }
}

impl BitAnd for Predicate {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::and(vec![self, rhs])
    }
}

impl BitOr for Predicate {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::or(vec![self, rhs])
    }
}

///
/// PredicateKind
///
/// Variant discriminant with a stable text tag.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PredicateKind {
    Compound,
    Comparison,
}

impl PredicateKind {
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Compound => "compound",
            Self::Comparison => "comparison",
        }
    }
}

impl fmt::Display for PredicateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

///
/// InsertPosition
///
/// Where an added predicate lands relative to its reference sibling.
/// Only `After` exists today.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InsertPosition {
    After,
}

impl InsertPosition {
    pub const AFTER_TAG: &str = "after";

    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::After => Self::AFTER_TAG,
        }
    }
}

///
/// NodePath
///
/// Child indexes from the root; the empty path addresses the root itself.
///

#[derive(Clone, Debug, Default, Deref, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Split into the parent path and the last child index.
    #[must_use]
    pub fn split_last(&self) -> Option<(Self, usize)> {
        let (last, parent) = self.0.split_last()?;

        Some((Self(parent.to_vec()), *last))
    }

    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(index);

        Self(segments)
    }
}

impl<const N: usize> From<[usize; N]> for NodePath {
    fn from(segments: [usize; N]) -> Self {
        Self(segments.to_vec())
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(segments: Vec<usize>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }

        Ok(())
    }
}
