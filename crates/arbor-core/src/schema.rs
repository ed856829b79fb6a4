use crate::model::PredicateKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// PredicateSchema
///
/// Mapping of accepted predicate-type tags onto the node variant each tag
/// builds. Hosts may register aliases (e.g. `"group"` for compounds) through
/// configuration; the default accepts the canonical tags only.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PredicateSchema {
    types: BTreeMap<String, PredicateKind>,
}

impl PredicateSchema {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            types: BTreeMap::new(),
        }
    }

    /// Load a schema from JSON of the form `{"types": {"tag": "compound"}}`.
    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(json).map_err(SchemaError::from)
    }

    #[must_use]
    pub fn with_type(mut self, tag: impl Into<String>, kind: PredicateKind) -> Self {
        self.types.insert(tag.into(), kind);
        self
    }

    #[must_use]
    pub fn kind(&self, tag: &str) -> Option<PredicateKind> {
        self.types.get(tag).copied()
    }

    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.types.contains_key(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}

impl Default for PredicateSchema {
    fn default() -> Self {
        [PredicateKind::Compound, PredicateKind::Comparison]
            .into_iter()
            .fold(Self::empty(), |schema, kind| schema.with_type(kind.tag(), kind))
    }
}

///
/// SchemaError
///

#[derive(Debug, ThisError)]
pub enum SchemaError {
    #[error("invalid predicate schema: {0}")]
    Json(#[from] serde_json::Error),
}

///
/// TESTS
///
