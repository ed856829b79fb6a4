//! Reference-table lookups for targets, operators, and types.
//!
//! The tree stores ids only. Resolution always yields `Option`, so an
//! unresolved reference stays distinguishable from a resolved one.

use crate::model::{Operator, OperatorId, Target, TargetId, Type, TypeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// Catalog
///

pub trait Catalog {
    fn target(&self, id: &TargetId) -> Option<&Target>;

    fn operator(&self, id: &OperatorId) -> Option<&Operator>;

    fn type_(&self, id: &TypeId) -> Option<&Type>;

    /// Data type implied by a target.
    /// Absent when the target carries no type id or the id does not resolve.
    fn target_type(&self, target: &Target) -> Option<&Type> {
        target.type_id.as_ref().and_then(|id| self.type_(id))
    }
}

///
/// MemoryCatalog
///
/// In-memory reference tables. Serialized as three arrays of entries; the
/// map key is always the entry's own id.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "RawCatalog", into = "RawCatalog")]
pub struct MemoryCatalog {
    targets: BTreeMap<TargetId, Target>,
    operators: BTreeMap<OperatorId, Operator>,
    types: BTreeMap<TypeId, Type>,
}

impl MemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from JSON with `targets`, `operators` and `types`
    /// arrays. Duplicate ids are rejected.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalog = serde_json::from_str(json)?;

        Self::try_from(raw)
    }

    #[must_use]
    pub fn with_target(mut self, target: Target) -> Self {
        self.targets.insert(target.id.clone(), target);
        self
    }

    #[must_use]
    pub fn with_operator(mut self, operator: Operator) -> Self {
        self.operators.insert(operator.id.clone(), operator);
        self
    }

    #[must_use]
    pub fn with_type(mut self, ty: Type) -> Self {
        self.types.insert(ty.id.clone(), ty);
        self
    }
}

impl Catalog for MemoryCatalog {
    fn target(&self, id: &TargetId) -> Option<&Target> {
        self.targets.get(id)
    }

    fn operator(&self, id: &OperatorId) -> Option<&Operator> {
        self.operators.get(id)
    }

    fn type_(&self, id: &TypeId) -> Option<&Type> {
        self.types.get(id)
    }
}

///
/// RawCatalog
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
struct RawCatalog {
    #[serde(default)]
    targets: Vec<Target>,
    #[serde(default)]
    operators: Vec<Operator>,
    #[serde(default)]
    types: Vec<Type>,
}

impl TryFrom<RawCatalog> for MemoryCatalog {
    type Error = CatalogError;

    fn try_from(raw: RawCatalog) -> Result<Self, Self::Error> {
        let mut catalog = Self::new();

        for target in raw.targets {
            if catalog.targets.contains_key(&target.id) {
                return Err(CatalogError::DuplicateTarget { id: target.id });
            }
            catalog.targets.insert(target.id.clone(), target);
        }
        for operator in raw.operators {
            if catalog.operators.contains_key(&operator.id) {
                return Err(CatalogError::DuplicateOperator { id: operator.id });
            }
            catalog.operators.insert(operator.id.clone(), operator);
        }
        for ty in raw.types {
            if catalog.types.contains_key(&ty.id) {
                return Err(CatalogError::DuplicateType { id: ty.id });
            }
            catalog.types.insert(ty.id.clone(), ty);
        }

        Ok(catalog)
    }
}

impl From<MemoryCatalog> for RawCatalog {
    fn from(catalog: MemoryCatalog) -> Self {
        Self {
            targets: catalog.targets.into_values().collect(),
            operators: catalog.operators.into_values().collect(),
            types: catalog.types.into_values().collect(),
        }
    }
}

///
/// CatalogError
///

#[derive(Debug, ThisError)]
pub enum CatalogError {
    #[error("duplicate operator '{id}'")]
    DuplicateOperator { id: OperatorId },

    #[error("duplicate target '{id}'")]
    DuplicateTarget { id: TargetId },

    #[error("duplicate type '{id}'")]
    DuplicateType { id: TypeId },

    #[error("invalid catalog: {0}")]
    Json(#[from] serde_json::Error),
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG_JSON: &str = r#"{
        "targets": [
            { "id": "age", "type_id": "int", "label": "Age" },
            { "id": "nickname" },
            { "id": "legacy", "type_id": "dropped" }
        ],
        "operators": [{ "id": "eq" }, { "id": "gt" }],
        "types": [{ "id": "int" }]
    }"#;

    #[test]
    fn json_catalog_resolves_references() {
        let catalog = MemoryCatalog::from_json_str(CATALOG_JSON).expect("catalog should parse");

        let age = catalog.target(&"age".into()).expect("age target");
        assert_eq!(age.label, "Age");
        assert_eq!(catalog.target_type(age).map(|t| t.id.as_str()), Some("int"));
        assert!(catalog.operator(&"gt".into()).is_some());
        assert!(catalog.operator(&"lt".into()).is_none());
    }

    #[test]
    fn target_type_is_absent_for_untyped_or_dangling_targets() {
        let catalog = MemoryCatalog::from_json_str(CATALOG_JSON).expect("catalog should parse");

        let untyped = catalog.target(&"nickname".into()).expect("nickname target");
        let dangling = catalog.target(&"legacy".into()).expect("legacy target");

        assert!(catalog.target_type(untyped).is_none());
        assert!(catalog.target_type(dangling).is_none());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = MemoryCatalog::from_json_str(r#"{"operators": [{"id": "eq"}, {"id": "eq"}]}"#)
            .expect_err("duplicate operator must fail");

        assert!(matches!(err, CatalogError::DuplicateOperator { id } if id.as_str() == "eq"));
    }

    #[test]
    fn serialized_catalog_reloads_identically() {
        let catalog = MemoryCatalog::new()
            .with_type(Type::new("text"))
            .with_target(Target::new("name", Some("text".into())))
            .with_operator(Operator::new("starts_with"));

        let json = serde_json::to_string(&catalog).expect("catalog should serialize");
        let reloaded = MemoryCatalog::from_json_str(&json).expect("catalog should reload");

        assert_eq!(reloaded, catalog);
    }
}
