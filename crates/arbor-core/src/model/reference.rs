use derive_more::{Deref, Display, From};
use serde::{Deserialize, Serialize};

///
/// Reference ids
///
/// Opaque identifiers into the target / operator / type reference tables.
/// Resolution is owned by a `Catalog`; the tree only stores ids.
///

#[derive(
    Clone, Debug, Deref, Deserialize, Display, Eq, From, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl From<&str> for TargetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(
    Clone, Debug, Deref, Deserialize, Display, Eq, From, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct OperatorId(String);

impl OperatorId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl From<&str> for OperatorId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(
    Clone, Debug, Deref, Deserialize, Display, Eq, From, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct TypeId(String);

impl TypeId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl From<&str> for TypeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

///
/// Target
///
/// A comparable field or value source. `type_id` is absent when the source
/// has not been bound to a data type yet.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Target {
    pub id: TargetId,
    #[serde(default)]
    pub type_id: Option<TypeId>,
    #[serde(default)]
    pub label: String,
}

impl Target {
    #[must_use]
    pub fn new(id: impl Into<TargetId>, type_id: Option<TypeId>) -> Self {
        Self {
            id: id.into(),
            type_id,
            label: String::new(),
        }
    }

    #[must_use]
    pub fn labelled(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

///
/// Operator
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Operator {
    pub id: OperatorId,
    #[serde(default)]
    pub label: String,
}

impl Operator {
    #[must_use]
    pub fn new(id: impl Into<OperatorId>) -> Self {
        Self {
            id: id.into(),
            label: String::new(),
        }
    }
}

///
/// Type
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Type {
    pub id: TypeId,
    #[serde(default)]
    pub label: String,
}

impl Type {
    #[must_use]
    pub fn new(id: impl Into<TypeId>) -> Self {
        Self {
            id: id.into(),
            label: String::new(),
        }
    }
}
