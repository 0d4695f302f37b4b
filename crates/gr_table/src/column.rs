use std::sync::Arc;

use gr_types::{TimeInt, Value};

// ----------------------------------------------------------------------------

/// The unique key of a column within a table.
///
/// Cheap to clone; compares by string content.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnSlug(Arc<str>);

impl ColumnSlug {
    #[inline]
    pub fn new(slug: impl Into<Arc<str>>) -> Self {
        Self(slug.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ColumnSlug {
    #[inline]
    fn from(slug: &str) -> Self {
        Self(slug.into())
    }
}

impl From<String> for ColumnSlug {
    #[inline]
    fn from(slug: String) -> Self {
        Self(slug.into())
    }
}

impl std::borrow::Borrow<str> for ColumnSlug {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ColumnSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// ----------------------------------------------------------------------------

/// The semantic type of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Number,
    Text,
    Time,
    Categorical,
}

/// What to do about entities that have no value at a requested time
/// (after tolerance matching has already been given its chance).
///
/// Applied uniformly per column when a chart state is derived, and recorded
/// on the derived column's [`ColumnDef`] so that downstream consumers can
/// tell which policy produced the data they are looking at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingDataStrategy {
    /// Leave the gap visible (line breaks, absent bar).
    ShowGap,

    /// Remove the entity from the whole chart, not just the affected series.
    DropEntity,

    /// Carry the last valid value forward.
    HoldLast,

    /// Resolve to one of the above based on the chart type.
    #[default]
    Auto,
}

// ----------------------------------------------------------------------------

/// Display and matching metadata attached to a column.
///
/// Everything is optional; a fresh column has an all-empty def. Per-dimension
/// overrides from the chart config take precedence over these values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColumnDef {
    pub display_name: Option<String>,
    pub unit: Option<String>,
    pub short_unit: Option<String>,

    /// Maximum time distance when substituting a nearby value for a missing
    /// exact-time value. `None` means exact matches only.
    pub tolerance: Option<u64>,

    /// Multiplied into every value once, at column-derivation time.
    pub conversion_factor: Option<f64>,

    pub strategy: Option<MissingDataStrategy>,

    /// Free-text source attributions, in the order the data source gave them.
    pub origins: Vec<String>,
}

impl ColumnDef {
    #[inline]
    pub fn tolerance(&self) -> u64 {
        self.tolerance.unwrap_or(0)
    }

    #[inline]
    pub fn conversion_factor(&self) -> f64 {
        self.conversion_factor.unwrap_or(1.0)
    }
}

// ----------------------------------------------------------------------------

/// The backing storage of a column: one typed vector, with per-row validity
/// expressed through `Option`.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnData {
    Number(Vec<Option<f64>>),
    Text(Vec<Option<Arc<str>>>),
    Time(Vec<Option<TimeInt>>),

    /// Dictionary-encoded strings, for low-cardinality columns like entity
    /// names: rows store indices into a shared dictionary.
    Categorical {
        indices: Vec<Option<u32>>,
        dict: Arc<Vec<Arc<str>>>,
    },
}

impl ColumnData {
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Self::Number(v) => v.len(),
            Self::Text(v) => v.len(),
            Self::Time(v) => v.len(),
            Self::Categorical { indices, .. } => indices.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn typ(&self) -> ColumnType {
        match self {
            Self::Number(_) => ColumnType::Number,
            Self::Text(_) => ColumnType::Text,
            Self::Time(_) => ColumnType::Time,
            Self::Categorical { .. } => ColumnType::Categorical,
        }
    }

    /// The value at `row`, or `None` if the cell is invalid or out of bounds.
    pub fn value(&self, row: usize) -> Option<Value> {
        match self {
            Self::Number(v) => v.get(row).copied().flatten().map(Value::Number),
            Self::Text(v) => v.get(row).cloned().flatten().map(Value::Text),
            Self::Time(v) => v.get(row).copied().flatten().map(Value::Time),
            Self::Categorical { indices, dict } => indices
                .get(row)
                .copied()
                .flatten()
                .and_then(|i| dict.get(i as usize))
                .map(|s| Value::Text(s.clone())),
        }
    }

    #[inline]
    pub fn is_valid(&self, row: usize) -> bool {
        match self {
            Self::Number(v) => matches!(v.get(row), Some(Some(_))),
            Self::Text(v) => matches!(v.get(row), Some(Some(_))),
            Self::Time(v) => matches!(v.get(row), Some(Some(_))),
            Self::Categorical { indices, .. } => matches!(indices.get(row), Some(Some(_))),
        }
    }

    pub fn num_valid(&self) -> usize {
        match self {
            Self::Number(v) => v.iter().filter(|x| x.is_some()).count(),
            Self::Text(v) => v.iter().filter(|x| x.is_some()).count(),
            Self::Time(v) => v.iter().filter(|x| x.is_some()).count(),
            Self::Categorical { indices, .. } => indices.iter().filter(|x| x.is_some()).count(),
        }
    }

    /// Gather the given rows into a new `ColumnData` (used by filter/sort/join).
    ///
    /// `None` entries in `rows` produce invalid cells, which is how the
    /// non-matching side of an outer join comes out.
    pub fn take_rows(&self, rows: &[Option<usize>]) -> Self {
        match self {
            Self::Number(v) => Self::Number(
                rows.iter()
                    .map(|row| row.and_then(|row| v.get(row).copied().flatten()))
                    .collect(),
            ),
            Self::Text(v) => Self::Text(
                rows.iter()
                    .map(|row| row.and_then(|row| v.get(row).cloned().flatten()))
                    .collect(),
            ),
            Self::Time(v) => Self::Time(
                rows.iter()
                    .map(|row| row.and_then(|row| v.get(row).copied().flatten()))
                    .collect(),
            ),
            Self::Categorical { indices, dict } => Self::Categorical {
                indices: rows
                    .iter()
                    .map(|row| row.and_then(|row| indices.get(row).copied().flatten()))
                    .collect(),
                dict: dict.clone(),
            },
        }
    }

    /// Dictionary-encode the given strings.
    pub fn categorical_from_values<'a>(values: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        let mut dict: Vec<Arc<str>> = Vec::new();
        let mut lookup: ahash::HashMap<Arc<str>, u32> = Default::default();
        let indices = values
            .into_iter()
            .map(|s| {
                s.map(|s| match lookup.get(s) {
                    Some(&i) => i,
                    None => {
                        let i = dict.len() as u32;
                        let s: Arc<str> = s.into();
                        lookup.insert(s.clone(), i);
                        dict.push(s);
                        i
                    }
                })
            })
            .collect();
        Self::Categorical {
            indices,
            dict: Arc::new(dict),
        }
    }
}

// ----------------------------------------------------------------------------

/// A single named, typed series. Immutable once constructed; transforms
/// produce new columns rather than mutating in place.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    slug: ColumnSlug,
    def: ColumnDef,
    data: ColumnData,
}

impl Column {
    #[inline]
    pub fn new(slug: impl Into<ColumnSlug>, data: ColumnData) -> Self {
        Self {
            slug: slug.into(),
            def: ColumnDef::default(),
            data,
        }
    }

    #[inline]
    pub fn with_def(mut self, def: ColumnDef) -> Self {
        self.def = def;
        self
    }

    #[inline]
    pub fn slug(&self) -> &ColumnSlug {
        &self.slug
    }

    #[inline]
    pub fn def(&self) -> &ColumnDef {
        &self.def
    }

    #[inline]
    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    #[inline]
    pub fn typ(&self) -> ColumnType {
        self.data.typ()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// A column with zero valid rows must be treated as absent by consumers,
    /// not as an error.
    #[inline]
    pub fn is_missing(&self) -> bool {
        self.data.num_valid() == 0
    }

    /// The display name to use absent any per-dimension override:
    /// the def's display name if set, otherwise the slug.
    #[inline]
    pub fn display_name(&self) -> &str {
        self.def.display_name.as_deref().unwrap_or(self.slug.as_str())
    }

    #[inline]
    pub fn value(&self, row: usize) -> Option<Value> {
        self.data.value(row)
    }

    #[inline]
    pub fn number_at(&self, row: usize) -> Option<f64> {
        match &self.data {
            ColumnData::Number(v) => v.get(row).copied().flatten(),
            _ => None,
        }
    }

    #[inline]
    pub fn time_at(&self, row: usize) -> Option<TimeInt> {
        match &self.data {
            ColumnData::Time(v) => v.get(row).copied().flatten(),
            _ => None,
        }
    }

    pub fn text_at(&self, row: usize) -> Option<Arc<str>> {
        match &self.data {
            ColumnData::Text(v) => v.get(row).cloned().flatten(),
            ColumnData::Categorical { indices, dict } => indices
                .get(row)
                .copied()
                .flatten()
                .and_then(|i| dict.get(i as usize).cloned()),
            _ => None,
        }
    }

    /// A new column with every valid number mapped through `f`, keeping
    /// slug and def. Non-number columns are returned unchanged.
    pub fn map_numbers(&self, f: impl Fn(f64) -> f64) -> Self {
        let data = match &self.data {
            ColumnData::Number(v) => {
                ColumnData::Number(v.iter().map(|x| x.map(&f)).collect())
            }
            other => other.clone(),
        };
        Self {
            slug: self.slug.clone(),
            def: self.def.clone(),
            data,
        }
    }

    /// Same column under a different slug.
    pub fn renamed(&self, slug: impl Into<ColumnSlug>) -> Self {
        Self {
            slug: slug.into(),
            def: self.def.clone(),
            data: self.data.clone(),
        }
    }
}
