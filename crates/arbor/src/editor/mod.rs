//! Tree-editing service.
//!
//! `PredicateTree` owns a root that is always a non-empty compound whose
//! comparisons all resolve against a catalog. Every mutation chains the
//! invariants relevant to it before touching the tree; the first rejection
//! aborts the edit and leaves the tree unchanged.


use crate::draft::{self, DraftError, PredicateDraft};
use arbor_core::{
    GuardError, GuardErrorKind,
    catalog::Catalog,
    invariant::{self, Invariant},
    model::{ComparisonPredicate, InsertPosition, NodePath, OperatorId, Predicate, TargetId},
    obs::{self, EditKind, MetricsEvent},
    rules,
    schema::PredicateSchema,
};
use thiserror::Error as ThisError;

///
/// EditorError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum EditorError {
    #[error(transparent)]
    Guard(#[from] GuardError),

    #[error("the root predicate has no siblings to insert after")]
    RootHasNoSiblings,

    #[error("no predicate at path '{path}'")]
    UnknownPath { path: NodePath },
}

impl EditorError {
    /// Invariant failure kind, if this error came from an invariant.
    #[must_use]
    pub const fn guard_kind(&self) -> Option<GuardErrorKind> {
        match self {
            Self::Guard(err) => Some(err.kind),
            Self::RootHasNoSiblings | Self::UnknownPath { .. } => None,
        }
    }

    fn unknown_path(path: &NodePath) -> Self {
        Self::UnknownPath { path: path.clone() }
    }
}

///
/// PredicateTree
///

#[derive(Clone, Debug, PartialEq)]
pub struct PredicateTree {
    root: Predicate,
}

impl PredicateTree {
    /// Adopt an existing tree. The root must be a compound, every compound
    /// in the tree must hold at least one child, and every comparison must
    /// resolve against `catalog`. Implied types are written back.
    pub fn new<C>(mut root: Predicate, catalog: &C) -> Result<Self, EditorError>
    where
        C: Catalog + ?Sized,
    {
        obs::check(Invariant::RootPredicateMustBeACompoundPredicate, || {
            invariant::root_predicate_must_be_a_compound_predicate(&root).map(|_| ())
        })?;
        ensure_well_formed(&root)?;
        bind_references(&mut root, catalog)?;

        Ok(Self { root })
    }

    /// Build and adopt a tree from a draft.
    pub fn from_draft<C>(
        draft: &PredicateDraft,
        schema: &PredicateSchema,
        catalog: &C,
    ) -> Result<Self, DraftError>
    where
        C: Catalog + ?Sized,
    {
        let root = draft::build_root(draft, schema, catalog)?;

        Ok(Self { root })
    }

    #[must_use]
    pub const fn root(&self) -> &Predicate {
        &self.root
    }

    #[must_use]
    pub fn into_root(self) -> Predicate {
        self.root
    }

    #[must_use]
    pub fn get(&self, path: &NodePath) -> Option<&Predicate> {
        rules::resolve(&self.root, path)
    }

    #[must_use]
    pub fn comparison_count(&self) -> usize {
        rules::count_comparison_predicates(&self.root)
    }

    /// Insert `predicate` as the next sibling of the node at `after`.
    /// Every comparison in `predicate` must resolve against `catalog`.
    /// Returns the path of the inserted node.
    pub fn add<C>(
        &mut self,
        after: &NodePath,
        insertion: &str,
        mut predicate: Predicate,
        catalog: &C,
    ) -> Result<NodePath, EditorError>
    where
        C: Catalog + ?Sized,
    {
        obs::record(MetricsEvent::EditStart {
            kind: EditKind::Add,
        });

        let InsertPosition::After = obs::check(Invariant::AddOnlySupportsAfter, || {
            invariant::add_only_supports_after(insertion)
        })?;
        self.node(after)?;
        let (parent_path, index) = after.split_last().ok_or(EditorError::RootHasNoSiblings)?;
        ensure_well_formed(&predicate)?;
        bind_references(&mut predicate, catalog)?;

        let Predicate::Compound(parent) = self.node_mut(&parent_path)? else {
            return Err(EditorError::unknown_path(&parent_path));
        };
        parent.predicates.insert(index + 1, predicate);

        let inserted = parent_path.child(index + 1);
        tracing::debug!(path = %inserted, "added predicate");
        obs::record(MetricsEvent::EditApplied {
            kind: EditKind::Add,
        });

        Ok(inserted)
    }

    /// Remove the node at `path` with its whole subtree and return it.
    pub fn remove(&mut self, path: &NodePath) -> Result<Predicate, EditorError> {
        obs::record(MetricsEvent::EditStart {
            kind: EditKind::Remove,
        });

        let candidate = self.node(path)?;
        obs::check(Invariant::RemovePredicateMustDifferFromRootPredicate, || {
            invariant::remove_predicate_must_differ_from_root_predicate(&self.root, candidate)
        })?;
        obs::check(
            Invariant::RemovePredicateCannotBeTheLastComparisonPredicate,
            || {
                invariant::remove_predicate_cannot_be_the_last_comparison_predicate(
                    &self.root, candidate,
                )
            },
        )?;

        let (parent_path, index) = path.split_last().ok_or(EditorError::RootHasNoSiblings)?;
        let remaining: Vec<&Predicate> = self
            .node(&parent_path)?
            .children()
            .iter()
            .enumerate()
            .filter_map(|(i, child)| (i != index).then_some(child))
            .collect();
        obs::check(
            Invariant::CompoundPredicateMustHaveAtLeastOneSubPredicate,
            || invariant::compound_predicate_must_have_at_least_one_sub_predicate(&remaining),
        )?;

        let Predicate::Compound(parent) = self.node_mut(&parent_path)? else {
            return Err(EditorError::unknown_path(&parent_path));
        };
        let removed = parent.predicates.remove(index);

        tracing::debug!(path = %path, "removed predicate");
        obs::record(MetricsEvent::EditApplied {
            kind: EditKind::Remove,
        });

        Ok(removed)
    }

    /// Point the comparison at `path` to another target; its type follows.
    pub fn rebind_target<C>(
        &mut self,
        path: &NodePath,
        target_id: &TargetId,
        catalog: &C,
    ) -> Result<(), EditorError>
    where
        C: Catalog + ?Sized,
    {
        obs::record(MetricsEvent::EditStart {
            kind: EditKind::Rebind,
        });

        let node = self.node(path)?;
        obs::check(Invariant::PredicateMustBeAComparisonPredicate, || {
            invariant::predicate_must_be_a_comparison_predicate(node)
        })?;
        let target = obs::check(Invariant::TargetIdMustReferToADefinedTarget, || {
            invariant::target_id_must_refer_to_a_defined_target(catalog.target(target_id))
        })?;
        let ty = obs::check(Invariant::TargetMustReferToADefinedType, || {
            invariant::target_must_refer_to_a_defined_type(catalog.target_type(target), target)
        })?;

        let comparison = self.comparison_mut(path)?;
        comparison.target_id = target.id.clone();
        comparison.type_id = Some(ty.id.clone());

        tracing::debug!(path = %path, target_id = %target.id, type_id = %ty.id, "rebound target");
        obs::record(MetricsEvent::EditApplied {
            kind: EditKind::Rebind,
        });

        Ok(())
    }

    /// Point the comparison at `path` to another operator.
    pub fn rebind_operator<C>(
        &mut self,
        path: &NodePath,
        operator_id: &OperatorId,
        catalog: &C,
    ) -> Result<(), EditorError>
    where
        C: Catalog + ?Sized,
    {
        obs::record(MetricsEvent::EditStart {
            kind: EditKind::Rebind,
        });

        let node = self.node(path)?;
        obs::check(Invariant::PredicateMustBeAComparisonPredicate, || {
            invariant::predicate_must_be_a_comparison_predicate(node)
        })?;
        let operator = obs::check(Invariant::OperatorIdMustReferToADefinedOperator, || {
            invariant::operator_id_must_refer_to_a_defined_operator(catalog.operator(operator_id))
        })?;

        self.comparison_mut(path)?.operator_id = operator.id.clone();

        tracing::debug!(path = %path, operator_id = %operator.id, "rebound operator");
        obs::record(MetricsEvent::EditApplied {
            kind: EditKind::Rebind,
        });

        Ok(())
    }

    fn node(&self, path: &NodePath) -> Result<&Predicate, EditorError> {
        rules::resolve(&self.root, path).ok_or_else(|| EditorError::unknown_path(path))
    }

    fn node_mut(&mut self, path: &NodePath) -> Result<&mut Predicate, EditorError> {
        rules::resolve_mut(&mut self.root, path).ok_or_else(|| EditorError::unknown_path(path))
    }

    fn comparison_mut(&mut self, path: &NodePath) -> Result<&mut ComparisonPredicate, EditorError> {
        let node = self.node_mut(path)?;

        Ok(invariant::predicate_must_be_a_comparison_predicate_mut(node)?)
    }
}

// Every compound reachable from `predicate` must hold at least one child.
fn ensure_well_formed(predicate: &Predicate) -> Result<(), GuardError> {
    for node in rules::compound_predicates(predicate) {
        obs::check(
            Invariant::CompoundPredicateMustHaveAtLeastOneSubPredicate,
            || invariant::compound_predicate_must_have_at_least_one_sub_predicate(node.children()),
        )?;
    }

    Ok(())
}

// Every comparison reachable from `predicate` must name a defined target with
// a defined type and a defined operator. The implied type is written back.
fn bind_references<C>(predicate: &mut Predicate, catalog: &C) -> Result<(), GuardError>
where
    C: Catalog + ?Sized,
{
    match predicate {
        Predicate::Compound(compound) => compound
            .predicates
            .iter_mut()
            .try_for_each(|child| bind_references(child, catalog)),
        Predicate::Comparison(comparison) => {
            let target = obs::check(Invariant::TargetIdMustReferToADefinedTarget, || {
                invariant::target_id_must_refer_to_a_defined_target(
                    catalog.target(&comparison.target_id),
                )
            })?;
            let ty = obs::check(Invariant::TargetMustReferToADefinedType, || {
                invariant::target_must_refer_to_a_defined_type(catalog.target_type(target), target)
            })?;
            obs::check(Invariant::OperatorIdMustReferToADefinedOperator, || {
                invariant::operator_id_must_refer_to_a_defined_operator(
                    catalog.operator(&comparison.operator_id),
                )
            })?;

            comparison.type_id = Some(ty.id.clone());

            Ok(())
        }
    }
}
