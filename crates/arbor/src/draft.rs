//! Draft builder: turns tagged, loosely-typed node descriptions into checked
//! predicate trees.
//!
//! Drafts arrive from hosts as JSON. Every node passes the same invariants a
//! live mutation would, so a built tree is well-formed by construction.

use arbor_core::{
    GuardError,
    catalog::Catalog,
    invariant::{self, Invariant},
    model::{
        Combinator, ComparisonPredicate, CompoundPredicate, OperatorId, Predicate, PredicateKind,
        TargetId, Value,
    },
    obs::{self, EditKind, MetricsEvent},
    schema::PredicateSchema,
};
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use thiserror::Error as ThisError;

///
/// PredicateDraft
///
/// `type` selects the node variant through a `PredicateSchema`. Fields that
/// do not apply to the selected variant are ignored.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct PredicateDraft {
    #[serde(rename = "type")]
    pub type_tag: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combinator: Option<Combinator>,

    #[serde(
        default,
        deserialize_with = "sequence_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub predicates: Option<Vec<Self>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<TargetId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_id: Option<OperatorId>,

    #[serde(default)]
    pub value: Value,
}

impl PredicateDraft {
    pub fn from_json_str(json: &str) -> Result<Self, DraftError> {
        serde_json::from_str(json).map_err(DraftError::from)
    }

    #[must_use]
    pub fn compound(combinator: Combinator, predicates: Vec<Self>) -> Self {
        Self {
            type_tag: PredicateKind::Compound.tag().to_string(),
            combinator: Some(combinator),
            predicates: Some(predicates),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn comparison(
        target_id: impl Into<TargetId>,
        operator_id: impl Into<OperatorId>,
        value: Value,
    ) -> Self {
        Self {
            type_tag: PredicateKind::Comparison.tag().to_string(),
            target_id: Some(target_id.into()),
            operator_id: Some(operator_id.into()),
            value,
            ..Self::default()
        }
    }
}

// Anything other than a JSON array counts as an absent child list, which the
// non-empty invariant then rejects.
fn sequence_or_none<'de, D>(deserializer: D) -> Result<Option<Vec<PredicateDraft>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    if !raw.is_array() {
        return Ok(None);
    }

    serde_json::from_value(raw).map(Some).map_err(D::Error::custom)
}

///
/// DraftError
///

#[derive(Debug, ThisError)]
pub enum DraftError {
    #[error(transparent)]
    Guard(#[from] GuardError),

    #[error("invalid predicate draft: {0}")]
    Json(#[from] serde_json::Error),
}

impl DraftError {
    #[must_use]
    pub const fn guard(&self) -> Option<&GuardError> {
        match self {
            Self::Guard(err) => Some(err),
            Self::Json(_) => None,
        }
    }
}

/// Build any predicate node from a draft.
pub fn build<C>(
    draft: &PredicateDraft,
    schema: &PredicateSchema,
    catalog: &C,
) -> Result<Predicate, DraftError>
where
    C: Catalog + ?Sized,
{
    obs::record(MetricsEvent::EditStart {
        kind: EditKind::Build,
    });

    let predicate = build_node(draft, schema, catalog)?;

    obs::record(MetricsEvent::EditApplied {
        kind: EditKind::Build,
    });

    Ok(predicate)
}

/// Build a tree root; the root must be a compound.
pub fn build_root<C>(
    draft: &PredicateDraft,
    schema: &PredicateSchema,
    catalog: &C,
) -> Result<Predicate, DraftError>
where
    C: Catalog + ?Sized,
{
    let root = build(draft, schema, catalog)?;
    obs::check(Invariant::RootPredicateMustBeACompoundPredicate, || {
        invariant::root_predicate_must_be_a_compound_predicate(&root).map(|_| ())
    })?;

    Ok(root)
}

fn build_node<C>(
    draft: &PredicateDraft,
    schema: &PredicateSchema,
    catalog: &C,
) -> Result<Predicate, GuardError>
where
    C: Catalog + ?Sized,
{
    let kind = obs::check(Invariant::PredicateTypeMustBeValid, || {
        invariant::predicate_type_must_be_valid(&draft.type_tag, schema)
    })?;

    match kind {
        PredicateKind::Compound => build_compound(draft, schema, catalog),
        PredicateKind::Comparison => build_comparison(draft, catalog),
    }
}

fn build_compound<C>(
    draft: &PredicateDraft,
    schema: &PredicateSchema,
    catalog: &C,
) -> Result<Predicate, GuardError>
where
    C: Catalog + ?Sized,
{
    let children = draft.predicates.as_deref().unwrap_or_default();
    obs::check(
        Invariant::CompoundPredicateMustHaveAtLeastOneSubPredicate,
        || invariant::compound_predicate_must_have_at_least_one_sub_predicate(children),
    )?;

    let predicates = children
        .iter()
        .map(|child| build_node(child, schema, catalog))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CompoundPredicate::new(draft.combinator.unwrap_or_default(), predicates).into())
}

fn build_comparison<C>(draft: &PredicateDraft, catalog: &C) -> Result<Predicate, GuardError>
where
    C: Catalog + ?Sized,
{
    // a missing id resolves to nothing, same as an unknown one
    let target = obs::check(Invariant::TargetIdMustReferToADefinedTarget, || {
        invariant::target_id_must_refer_to_a_defined_target(
            draft.target_id.as_ref().and_then(|id| catalog.target(id)),
        )
    })?;
    let ty = obs::check(Invariant::TargetMustReferToADefinedType, || {
        invariant::target_must_refer_to_a_defined_type(catalog.target_type(target), target)
    })?;
    let operator = obs::check(Invariant::OperatorIdMustReferToADefinedOperator, || {
        invariant::operator_id_must_refer_to_a_defined_operator(
            draft.operator_id.as_ref().and_then(|id| catalog.operator(id)),
        )
    })?;

    Ok(ComparisonPredicate {
        target_id: target.id.clone(),
        operator_id: operator.id.clone(),
        type_id: Some(ty.id.clone()),
        value: draft.value.clone(),
    }
    .into())
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_core::{
        GuardErrorKind,
        catalog::MemoryCatalog,
        model::{Operator, Target, Type},
    };

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new()
            .with_type(Type::new("int"))
            .with_type(Type::new("text"))
            .with_target(Target::new("age", Some("int".into())))
            .with_target(Target::new("name", Some("text".into())))
            .with_target(Target::new("notes", None))
            .with_operator(Operator::new("eq"))
            .with_operator(Operator::new("gt"))
    }

    fn guard_kind(result: Result<Predicate, DraftError>) -> GuardErrorKind {
        result
            .expect_err("draft should be rejected")
            .guard()
            .expect("guard failure")
            .kind
    }

    #[test]
    fn json_draft_builds_typed_tree() {
        let draft = PredicateDraft::from_json_str(
            r#"{
                "type": "compound",
                "combinator": "or",
                "predicates": [
                    { "type": "comparison", "target_id": "age", "operator_id": "gt", "value": 18 },
                    { "type": "comparison", "target_id": "name", "operator_id": "eq", "value": "ann" }
                ]
            }"#,
        )
        .expect("draft json");

        let root = build_root(&draft, &PredicateSchema::default(), &catalog()).expect("valid draft");

        assert_eq!(
            root,
            Predicate::or(vec![
                ComparisonPredicate::new("age", "gt", Value::Int(18))
                    .typed("int")
                    .into(),
                ComparisonPredicate::new("name", "eq", Value::Text("ann".into()))
                    .typed("text")
                    .into(),
            ])
        );
    }

    #[test]
    fn unknown_type_tag_is_rejected() {
        let draft = PredicateDraft {
            type_tag: "negation".into(),
            ..PredicateDraft::default()
        };

        assert_eq!(
            guard_kind(build(&draft, &PredicateSchema::default(), &catalog())),
            GuardErrorKind::InvalidPredicateType
        );
    }

    #[test]
    fn compound_without_sequence_children_is_rejected() {
        let schema = PredicateSchema::default();
        for json in [
            r#"{"type": "compound"}"#,
            r#"{"type": "compound", "predicates": []}"#,
            r#"{"type": "compound", "predicates": 3}"#,
            r#"{"type": "compound", "predicates": {"type": "comparison"}}"#,
        ] {
            let draft = PredicateDraft::from_json_str(json).expect("draft json");

            assert_eq!(
                guard_kind(build(&draft, &schema, &catalog())),
                GuardErrorKind::CompoundPredicateMustHaveAtLeastOneSubPredicate,
                "{json}"
            );
        }
    }

    #[test]
    fn comparison_references_resolve_in_order() {
        let schema = PredicateSchema::default();
        let cases = [
            (
                PredicateDraft::comparison("height", "nope", Value::Null),
                GuardErrorKind::TargetIdMustReferToADefinedTarget,
            ),
            (
                PredicateDraft::comparison("notes", "nope", Value::Null),
                GuardErrorKind::TargetMustReferToADefinedType,
            ),
            (
                PredicateDraft::comparison("age", "nope", Value::Null),
                GuardErrorKind::OperatorIdMustReferToADefinedOperator,
            ),
        ];

        for (draft, expected) in cases {
            assert_eq!(guard_kind(build(&draft, &schema, &catalog())), expected);
        }
    }

    #[test]
    fn missing_target_id_counts_as_undefined_target() {
        let draft = PredicateDraft {
            type_tag: "comparison".into(),
            operator_id: Some("eq".into()),
            ..PredicateDraft::default()
        };

        assert_eq!(
            guard_kind(build(&draft, &PredicateSchema::default(), &catalog())),
            GuardErrorKind::TargetIdMustReferToADefinedTarget
        );
    }

    #[test]
    fn leaf_draft_cannot_be_a_root() {
        let draft = PredicateDraft::comparison("age", "eq", Value::Int(1));

        assert!(build(&draft, &PredicateSchema::default(), &catalog()).is_ok());
        assert_eq!(
            guard_kind(build_root(&draft, &PredicateSchema::default(), &catalog())),
            GuardErrorKind::RootPredicateMustBeACompoundPredicate
        );
    }

    #[test]
    fn schema_aliases_select_variants() {
        let schema = PredicateSchema::empty()
            .with_type("group", PredicateKind::Compound)
            .with_type("rule", PredicateKind::Comparison);
        let draft = PredicateDraft::from_json_str(
            r#"{"type": "group", "predicates": [{"type": "rule", "target_id": "age", "operator_id": "eq", "value": 3}]}"#,
        )
        .expect("draft json");

        let root = build_root(&draft, &schema, &catalog()).expect("aliases accepted");
        assert_eq!(root.children().len(), 1);

        let canonical = PredicateDraft::compound(
            Combinator::And,
            vec![PredicateDraft::comparison("age", "eq", Value::Int(3))],
        );
        assert_eq!(
            guard_kind(build_root(&canonical, &schema, &catalog())),
            GuardErrorKind::InvalidPredicateType
        );
    }

    #[test]
    fn numeric_values_keep_their_precision() {
        let draft = PredicateDraft::from_json_str(
            r#"{
                "type": "compound",
                "predicates": [
                    { "type": "comparison", "target_id": "age", "operator_id": "gt", "value": 1.5 },
                    { "type": "comparison", "target_id": "age", "operator_id": "lt", "value": -2 }
                ]
            }"#,
        )
        .expect("draft json");

        let values: Vec<_> = draft
            .predicates
            .iter()
            .flatten()
            .map(|child| child.value.clone())
            .collect();
        assert_eq!(values, [Value::Float(1.5), Value::Int(-2)]);
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let err = PredicateDraft::from_json_str("{").expect_err("truncated json");

        assert!(err.guard().is_none());
        assert!(err.to_string().starts_with("invalid predicate draft"));
    }
}
