//! Structural rules: pure boolean queries over a predicate tree.
//!
//! Rules never fail and never mutate. Node identity is reference identity,
//! so `candidate` must be borrowed from the same tree as `root` for a rule to
//! recognise it.

use crate::model::{NodePath, Predicate};
use std::ptr;

/// True iff `candidate` is the root node itself.
#[must_use]
pub fn predicate_to_remove_is_root_predicate(root: &Predicate, candidate: &Predicate) -> bool {
    ptr::eq(root, candidate)
}

/// True iff removing `candidate` (with its whole subtree) would leave no
/// comparison leaf reachable from `root`.
#[must_use]
pub fn predicate_to_remove_is_the_last_comparison_predicate(
    root: &Predicate,
    candidate: &Predicate,
) -> bool {
    count_comparison_predicates_excluding(root, candidate) == 0
}

/// Number of comparison leaves reachable from `root`.
#[must_use]
pub fn count_comparison_predicates(root: &Predicate) -> usize {
    match root {
        Predicate::Comparison(_) => 1,
        Predicate::Compound(compound) => compound
            .predicates
            .iter()
            .map(count_comparison_predicates)
            .sum(),
    }
}

/// Number of comparison leaves reachable from `root`, skipping the subtree
/// rooted at `excluded`.
#[must_use]
pub fn count_comparison_predicates_excluding(root: &Predicate, excluded: &Predicate) -> usize {
    if ptr::eq(root, excluded) {
        return 0;
    }

    match root {
        Predicate::Comparison(_) => 1,
        Predicate::Compound(compound) => compound
            .predicates
            .iter()
            .map(|child| count_comparison_predicates_excluding(child, excluded))
            .sum(),
    }
}

/// Borrow the node at `path`, if every segment exists.
#[must_use]
pub fn resolve<'a>(root: &'a Predicate, path: &NodePath) -> Option<&'a Predicate> {
    path.iter()
        .try_fold(root, |node, &index| node.children().get(index))
}

/// Mutable counterpart of [`resolve`].
pub fn resolve_mut<'a>(root: &'a mut Predicate, path: &NodePath) -> Option<&'a mut Predicate> {
    let mut node = root;
    for &index in path.iter() {
        node = match node {
            Predicate::Compound(compound) => compound.predicates.get_mut(index)?,
            Predicate::Comparison(_) => return None,
        };
    }

    Some(node)
}

/// Every compound node in the tree, depth first, root included.
pub fn compound_predicates(root: &Predicate) -> impl Iterator<Item = &Predicate> {
    let mut stack = vec![root];

    std::iter::from_fn(move || {
        while let Some(node) = stack.pop() {
            if let Predicate::Compound(compound) = node {
                stack.extend(compound.predicates.iter().rev());
                return Some(node);
            }
        }

        None
    })
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;

    fn leaf(target: &str) -> Predicate {
        Predicate::compare(target, "eq", Value::Int(1))
    }

    #[test]
    fn root_identity_is_by_reference_not_by_value() {
        let root = Predicate::and(vec![leaf("a")]);
        let twin = root.clone();

        assert!(predicate_to_remove_is_root_predicate(&root, &root));
        assert!(!predicate_to_remove_is_root_predicate(&root, &twin));
        assert!(!predicate_to_remove_is_root_predicate(&root, &root.children()[0]));
    }

    #[test]
    fn single_leaf_is_the_last_comparison() {
        let root = Predicate::and(vec![leaf("a")]);
        let only = &root.children()[0];

        assert!(predicate_to_remove_is_the_last_comparison_predicate(&root, only));
    }

    #[test]
    fn nested_leaves_are_counted_through_compounds() {
        let root = Predicate::and(vec![
            leaf("a"),
            Predicate::or(vec![leaf("b"), Predicate::and(vec![leaf("c")])]),
        ]);

        assert_eq!(count_comparison_predicates(&root), 3);

        let group = &root.children()[1];
        assert_eq!(count_comparison_predicates_excluding(&root, group), 1);
        assert!(!predicate_to_remove_is_the_last_comparison_predicate(&root, group));

        let first = &root.children()[0];
        assert!(!predicate_to_remove_is_the_last_comparison_predicate(&root, first));
    }

    #[test]
    fn excluding_a_subtree_that_holds_every_leaf_leaves_none() {
        let root = Predicate::and(vec![Predicate::or(vec![leaf("a"), leaf("b")])]);
        let group = &root.children()[0];

        assert!(predicate_to_remove_is_the_last_comparison_predicate(&root, group));
    }

    #[test]
    fn resolve_walks_child_indexes() {
        let root = Predicate::and(vec![leaf("a"), Predicate::or(vec![leaf("b"), leaf("c")])]);

        assert_eq!(resolve(&root, &NodePath::root()), Some(&root));
        assert_eq!(resolve(&root, &NodePath::from([1, 0])), Some(&leaf("b")));
        assert_eq!(resolve(&root, &NodePath::from([1, 2])), None);
        assert_eq!(resolve(&root, &NodePath::from([0, 0])), None);
    }

    #[test]
    fn compound_iterator_visits_groups_in_preorder() {
        let root = Predicate::and(vec![
            Predicate::or(vec![leaf("a")]),
            leaf("b"),
            Predicate::and(vec![leaf("c")]),
        ]);

        let groups: Vec<_> = compound_predicates(&root).collect();

        assert_eq!(groups.len(), 3);
        assert!(ptr::eq(groups[0], &root));
        assert!(ptr::eq(groups[1], &root.children()[0]));
        assert!(ptr::eq(groups[2], &root.children()[2]));
    }
}
