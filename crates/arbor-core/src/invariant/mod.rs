//! Invariants: the validation surface that gates every tree mutation.
//!
//! Each function checks one rule, raises exactly one `GuardErrorKind`, and
//! never touches the tree. Mutating callers chain the invariants relevant to
//! their operation with `?`, so the first failure aborts the whole mutation.


use crate::{
    error::{GuardError, GuardErrorKind},
    model::{ComparisonPredicate, InsertPosition, Predicate, PredicateKind, Target},
    rules,
    schema::PredicateSchema,
};
use std::fmt;

///
/// Invariant
///
/// Stable identifier for each check; used for metrics and tracing.
///

#[remain::sorted]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Invariant {
    AddOnlySupportsAfter,
    CompoundPredicateMustHaveAtLeastOneSubPredicate,
    OperatorIdMustReferToADefinedOperator,
    PredicateMustBeAComparisonPredicate,
    PredicateTypeMustBeValid,
    RemovePredicateCannotBeTheLastComparisonPredicate,
    RemovePredicateMustDifferFromRootPredicate,
    RootPredicateMustBeACompoundPredicate,
    TargetIdMustReferToADefinedTarget,
    TargetMustReferToADefinedType,
}

impl Invariant {
    pub const ALL: [Self; 10] = [
        Self::AddOnlySupportsAfter,
        Self::CompoundPredicateMustHaveAtLeastOneSubPredicate,
        Self::OperatorIdMustReferToADefinedOperator,
        Self::PredicateMustBeAComparisonPredicate,
        Self::PredicateTypeMustBeValid,
        Self::RemovePredicateCannotBeTheLastComparisonPredicate,
        Self::RemovePredicateMustDifferFromRootPredicate,
        Self::RootPredicateMustBeACompoundPredicate,
        Self::TargetIdMustReferToADefinedTarget,
        Self::TargetMustReferToADefinedType,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AddOnlySupportsAfter => "AddOnlySupportsAfter",
            Self::CompoundPredicateMustHaveAtLeastOneSubPredicate => {
                "CompoundPredicateMustHaveAtLeastOneSubPredicate"
            }
            Self::OperatorIdMustReferToADefinedOperator => "Operator_idMustReferToADefinedOperator",
            Self::PredicateMustBeAComparisonPredicate => "PredicateMustBeAComparisonPredicate",
            Self::PredicateTypeMustBeValid => "PredicateTypeMustBeValid",
            Self::RemovePredicateCannotBeTheLastComparisonPredicate => {
                "RemovePredicateCannotBeTheLastComparisonPredicate"
            }
            Self::RemovePredicateMustDifferFromRootPredicate => {
                "RemovePredicateMustDifferFromRootPredicate"
            }
            Self::RootPredicateMustBeACompoundPredicate => "RootPredicateMustBeACompoundPredicate",
            Self::TargetIdMustReferToADefinedTarget => "Target_idMustReferToADefinedTarget",
            Self::TargetMustReferToADefinedType => "TargetMustReferToADefinedType",
        }
    }

    /// The single failure kind this invariant can raise.
    #[must_use]
    pub const fn raises(self) -> GuardErrorKind {
        match self {
            Self::AddOnlySupportsAfter => GuardErrorKind::AddCurrentlyOnlySupportAfterInsertion,
            Self::CompoundPredicateMustHaveAtLeastOneSubPredicate => {
                GuardErrorKind::CompoundPredicateMustHaveAtLeastOneSubPredicate
            }
            Self::OperatorIdMustReferToADefinedOperator => {
                GuardErrorKind::OperatorIdMustReferToADefinedOperator
            }
            Self::PredicateMustBeAComparisonPredicate => {
                GuardErrorKind::PredicateMustBeAComparisonPredicate
            }
            Self::PredicateTypeMustBeValid => GuardErrorKind::InvalidPredicateType,
            Self::RemovePredicateCannotBeTheLastComparisonPredicate => {
                GuardErrorKind::ForbiddenCannotRemoveLastComparisonPredicate
            }
            Self::RemovePredicateMustDifferFromRootPredicate => {
                GuardErrorKind::ForbiddenCannotRemoveRootCompoundPredicate
            }
            Self::RootPredicateMustBeACompoundPredicate => {
                GuardErrorKind::RootPredicateMustBeACompoundPredicate
            }
            Self::TargetIdMustReferToADefinedTarget => {
                GuardErrorKind::TargetIdMustReferToADefinedTarget
            }
            Self::TargetMustReferToADefinedType => GuardErrorKind::TargetMustReferToADefinedType,
        }
    }
}

impl fmt::Display for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// A compound's child list must be non-empty.
pub fn compound_predicate_must_have_at_least_one_sub_predicate<T>(
    predicates: &[T],
) -> Result<(), GuardError> {
    if predicates.is_empty() {
        return Err(GuardError::new(
            GuardErrorKind::CompoundPredicateMustHaveAtLeastOneSubPredicate,
        ));
    }

    Ok(())
}

/// The type tag must be a key of the accepted-types mapping.
pub fn predicate_type_must_be_valid(
    tag: &str,
    schema: &PredicateSchema,
) -> Result<PredicateKind, GuardError> {
    schema.kind(tag).ok_or_else(|| {
        GuardError::with_message(
            GuardErrorKind::InvalidPredicateType,
            format!("unknown predicate type '{tag}'"),
        )
    })
}

/// The root must be a compound; yields the root unchanged.
pub fn root_predicate_must_be_a_compound_predicate(
    root: &Predicate,
) -> Result<&Predicate, GuardError> {
    match root {
        Predicate::Compound(_) => Ok(root),
        Predicate::Comparison(_) => Err(GuardError::new(
            GuardErrorKind::RootPredicateMustBeACompoundPredicate,
        )),
    }
}

/// The node must be a comparison leaf; yields it narrowed to that variant.
pub fn predicate_must_be_a_comparison_predicate(
    predicate: &Predicate,
) -> Result<&ComparisonPredicate, GuardError> {
    match predicate {
        Predicate::Comparison(comparison) => Ok(comparison),
        Predicate::Compound(_) => Err(GuardError::new(
            GuardErrorKind::PredicateMustBeAComparisonPredicate,
        )),
    }
}

/// Mutable counterpart of [`predicate_must_be_a_comparison_predicate`].
pub fn predicate_must_be_a_comparison_predicate_mut(
    predicate: &mut Predicate,
) -> Result<&mut ComparisonPredicate, GuardError> {
    match predicate {
        Predicate::Comparison(comparison) => Ok(comparison),
        Predicate::Compound(_) => Err(GuardError::new(
            GuardErrorKind::PredicateMustBeAComparisonPredicate,
        )),
    }
}

// ---------------------------------------------------------------------------
// Add
// ---------------------------------------------------------------------------

/// Insertion mode must be exactly `"after"`.
pub fn add_only_supports_after(insertion: &str) -> Result<InsertPosition, GuardError> {
    if insertion == InsertPosition::AFTER_TAG {
        return Ok(InsertPosition::After);
    }

    Err(GuardError::with_message(
        GuardErrorKind::AddCurrentlyOnlySupportAfterInsertion,
        format!("unsupported insertion '{insertion}'"),
    ))
}

// ---------------------------------------------------------------------------
// Reference resolution
// ---------------------------------------------------------------------------

/// The type implied by `target` must resolve; yields the unwrapped type.
pub fn target_must_refer_to_a_defined_type<T>(
    resolved: Option<T>,
    target: &Target,
) -> Result<T, GuardError> {
    resolved.ok_or_else(|| {
        let type_id = target
            .type_id
            .as_ref()
            .map_or_else(|| "<none>".to_string(), ToString::to_string);

        GuardError::with_message(
            GuardErrorKind::TargetMustReferToADefinedType,
            format!("target_id '{}' refers to type_id '{type_id}'", target.id),
        )
    })
}

/// The target lookup must have resolved; yields the unwrapped target.
pub fn target_id_must_refer_to_a_defined_target<T>(target: Option<T>) -> Result<T, GuardError> {
    target.ok_or(GuardError::new(
        GuardErrorKind::TargetIdMustReferToADefinedTarget,
    ))
}

/// The operator lookup must have resolved; yields the unwrapped operator.
pub fn operator_id_must_refer_to_a_defined_operator<T>(
    operator: Option<T>,
) -> Result<T, GuardError> {
    operator.ok_or(GuardError::new(
        GuardErrorKind::OperatorIdMustReferToADefinedOperator,
    ))
}

// ---------------------------------------------------------------------------
// Remove
// ---------------------------------------------------------------------------

/// The root itself can never be removed; yields the candidate unchanged.
pub fn remove_predicate_must_differ_from_root_predicate<'a>(
    root: &Predicate,
    candidate: &'a Predicate,
) -> Result<&'a Predicate, GuardError> {
    if rules::predicate_to_remove_is_root_predicate(root, candidate) {
        return Err(GuardError::new(
            GuardErrorKind::ForbiddenCannotRemoveRootCompoundPredicate,
        ));
    }

    Ok(candidate)
}

/// A comparison leaf may not be removed when it is the last one reachable
/// from `root`. Compound candidates always pass here; a well-formed sibling
/// compound always holds at least one leaf of its own.
pub fn remove_predicate_cannot_be_the_last_comparison_predicate(
    root: &Predicate,
    candidate: &Predicate,
) -> Result<(), GuardError> {
    match candidate {
        Predicate::Compound(_) => Ok(()),
        Predicate::Comparison(_) => {
            if rules::predicate_to_remove_is_the_last_comparison_predicate(root, candidate) {
                Err(GuardError::new(
                    GuardErrorKind::ForbiddenCannotRemoveLastComparisonPredicate,
                ))
            } else {
                Ok(())
            }
        }
    }
}
