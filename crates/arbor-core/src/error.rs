use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error as ThisError;

///
/// GuardError
///
/// Typed rejection produced by an invariant.
/// Callers branch on `kind`; `message` is diagnostic text for humans only.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub struct GuardError {
    pub kind: GuardErrorKind,
    pub message: Option<String>,
}

impl GuardError {
    #[must_use]
    pub const fn new(kind: GuardErrorKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(kind: GuardErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Some(message.into()),
        }
    }

    #[must_use]
    pub fn is(&self, kind: GuardErrorKind) -> bool {
        self.kind == kind
    }

    /// Stable taxonomy code of the underlying kind.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl fmt::Display for GuardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {message}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl From<GuardErrorKind> for GuardError {
    fn from(kind: GuardErrorKind) -> Self {
        Self::new(kind)
    }
}

///
/// GuardErrorKind
///
/// Closed failure vocabulary; each invariant raises exactly one kind.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum GuardErrorKind {
    CompoundPredicateMustHaveAtLeastOneSubPredicate,
    InvalidPredicateType,
    RootPredicateMustBeACompoundPredicate,
    PredicateMustBeAComparisonPredicate,
    AddCurrentlyOnlySupportAfterInsertion,
    TargetMustReferToADefinedType,
    TargetIdMustReferToADefinedTarget,
    OperatorIdMustReferToADefinedOperator,
    ForbiddenCannotRemoveRootCompoundPredicate,
    ForbiddenCannotRemoveLastComparisonPredicate,
}

impl GuardErrorKind {
    pub const ALL: [Self; 10] = [
        Self::CompoundPredicateMustHaveAtLeastOneSubPredicate,
        Self::InvalidPredicateType,
        Self::RootPredicateMustBeACompoundPredicate,
        Self::PredicateMustBeAComparisonPredicate,
        Self::AddCurrentlyOnlySupportAfterInsertion,
        Self::TargetMustReferToADefinedType,
        Self::TargetIdMustReferToADefinedTarget,
        Self::OperatorIdMustReferToADefinedOperator,
        Self::ForbiddenCannotRemoveRootCompoundPredicate,
        Self::ForbiddenCannotRemoveLastComparisonPredicate,
    ];

    /// Stable external code.
    ///
    /// Host applications already match on these exact strings, including
    /// the underscored `Target_id` / `Operator_id` spellings.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::CompoundPredicateMustHaveAtLeastOneSubPredicate => {
                "CompoundPredicateMustHaveAtLeastOneSubPredicate"
            }
            Self::InvalidPredicateType => "InvalidPredicateType",
            Self::RootPredicateMustBeACompoundPredicate => "RootPredicateMustBeACompoundPredicate",
            Self::PredicateMustBeAComparisonPredicate => "PredicateMustBeAComparisonPredicate",
            Self::AddCurrentlyOnlySupportAfterInsertion => "AddCurrentlyOnlySupportAfterInsertion",
            Self::TargetMustReferToADefinedType => "TargetMustReferToADefinedType",
            Self::TargetIdMustReferToADefinedTarget => "Target_idMustReferToADefinedTarget",
            Self::OperatorIdMustReferToADefinedOperator => "Operator_idMustReferToADefinedOperator",
            Self::ForbiddenCannotRemoveRootCompoundPredicate => {
                "ForbiddenCannotRemoveRootCompoundPredicate"
            }
            Self::ForbiddenCannotRemoveLastComparisonPredicate => {
                "ForbiddenCannotRemoveLastComparisonPredicate"
            }
        }
    }

    /// Parse a stable code back into its kind.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    const fn describe(self) -> &'static str {
        match self {
            Self::CompoundPredicateMustHaveAtLeastOneSubPredicate => {
                "compound predicate must have at least one sub-predicate"
            }
            Self::InvalidPredicateType => "invalid predicate type",
            Self::RootPredicateMustBeACompoundPredicate => {
                "root predicate must be a compound predicate"
            }
            Self::PredicateMustBeAComparisonPredicate => "predicate must be a comparison predicate",
            Self::AddCurrentlyOnlySupportAfterInsertion => {
                "add currently only supports 'after' insertion"
            }
            Self::TargetMustReferToADefinedType => "target must refer to a defined type",
            Self::TargetIdMustReferToADefinedTarget => "target_id must refer to a defined target",
            Self::OperatorIdMustReferToADefinedOperator => {
                "operator_id must refer to a defined operator"
            }
            Self::ForbiddenCannotRemoveRootCompoundPredicate => {
                "forbidden: cannot remove the root compound predicate"
            }
            Self::ForbiddenCannotRemoveLastComparisonPredicate => {
                "forbidden: cannot remove the last comparison predicate"
            }
        }
    }
}

impl fmt::Display for GuardErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn codes_are_unique_and_round_trip() {
        let codes: BTreeSet<_> = GuardErrorKind::ALL.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), GuardErrorKind::ALL.len());

        for kind in GuardErrorKind::ALL {
            assert_eq!(GuardErrorKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(GuardErrorKind::from_code("TargetIdMustReferToADefinedTarget"), None);
    }

    #[test]
    fn display_appends_diagnostic_message() {
        let bare = GuardError::new(GuardErrorKind::InvalidPredicateType);
        assert_eq!(bare.to_string(), "invalid predicate type");

        let detailed = GuardError::with_message(
            GuardErrorKind::TargetMustReferToADefinedType,
            "target 'age' has no type",
        );
        assert_eq!(
            detailed.to_string(),
            "target must refer to a defined type: target 'age' has no type"
        );
        assert!(detailed.is(GuardErrorKind::TargetMustReferToADefinedType));
        assert_eq!(detailed.code(), "TargetMustReferToADefinedType");
    }
}
