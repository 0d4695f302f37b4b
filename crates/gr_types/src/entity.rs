use std::sync::Arc;

// ----------------------------------------------------------------------------

/// The canonical, human-readable name of an entity ("United States", "World").
///
/// Names are the primary key for selection and cross-variable joins; ids and
/// codes are secondary lookups. Cheap to clone.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct EntityName(Arc<str>);

impl EntityName {
    #[inline]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityName {
    #[inline]
    fn from(name: &str) -> Self {
        Self(name.into())
    }
}

impl From<String> for EntityName {
    #[inline]
    fn from(name: String) -> Self {
        Self(name.into())
    }
}

impl AsRef<str> for EntityName {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for EntityName {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntityName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// ----------------------------------------------------------------------------

/// A short stable code for an entity: the ISO alpha-3 code of a country
/// ("USA"), or a made-up stable code for aggregates ("WORLD").
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct EntityCode(Arc<str>);

impl EntityCode {
    #[inline]
    pub fn new(code: impl Into<Arc<str>>) -> Self {
        Self(code.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityCode {
    #[inline]
    fn from(code: &str) -> Self {
        Self(code.into())
    }
}

impl std::fmt::Display for EntityCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// ----------------------------------------------------------------------------

/// The database id of an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct EntityId(pub i32);

impl nohash_hasher::IsEnabled for EntityId {}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// ----------------------------------------------------------------------------

/// An entity as known to the engine: a name, plus whatever secondary
/// identifiers the data source provided.
#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct Entity {
    pub name: EntityName,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<EntityCode>,
}

impl Entity {
    /// An entity known only by name.
    #[inline]
    pub fn named(name: impl Into<EntityName>) -> Self {
        Self {
            name: name.into(),
            id: None,
            code: None,
        }
    }
}
