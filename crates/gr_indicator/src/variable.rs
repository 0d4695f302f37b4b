use gr_types::{Entity, TimeInt};

pub use gr_types::VariableId;

// ----------------------------------------------------------------------------

/// One raw data point: an entity had a value at a time.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct VariableRow {
    pub entity: Entity,
    pub time: TimeInt,
    pub value: f64,
}

// ----------------------------------------------------------------------------

/// Author-editable display overrides attached to a variable.
///
/// Everything is optional: the fetch collaborator may deliver partial or no
/// display metadata at all, and the engine falls back to the raw
/// name/unit in that case.
#[derive(Clone, Debug, Default, PartialEq)]
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VariableDisplay {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub short_unit: Option<String>,

    /// Multiplied into every value once when the column is derived.
    pub conversion_factor: Option<f64>,

    /// Maximum time distance for tolerance matching.
    pub tolerance: Option<u64>,
}

/// Per-variable metadata, as delivered by the data-fetch collaborator.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableMeta {
    pub id: VariableId,

    /// The raw catalog name of the variable.
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_unit: Option<String>,

    #[serde(default)]
    pub display: VariableDisplay,

    /// Free-text source attributions, in catalog order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub origins: Vec<String>,
}

impl VariableMeta {
    /// Minimal metadata: just an id and a name. What the engine falls back
    /// to when the fetch delivered no metadata for a variable.
    pub fn bare(id: VariableId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            unit: None,
            short_unit: None,
            display: VariableDisplay::default(),
            origins: Vec::new(),
        }
    }

    /// The effective unit: display override first, then the raw unit.
    #[inline]
    pub fn effective_unit(&self) -> Option<&str> {
        self.display.unit.as_deref().or(self.unit.as_deref())
    }

    #[inline]
    pub fn effective_short_unit(&self) -> Option<&str> {
        self.display
            .short_unit
            .as_deref()
            .or(self.short_unit.as_deref())
    }
}

// ----------------------------------------------------------------------------

/// Everything the fetch collaborator returns for one variable.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct VariableData {
    pub meta: VariableMeta,
    pub rows: Vec<VariableRow>,
}
