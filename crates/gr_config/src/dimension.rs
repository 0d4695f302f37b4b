use gr_types::{TimeBound, VariableId};

/// The chart role a variable is bound to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[derive(serde::Deserialize, serde::Serialize)]
#[derive(strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DimensionProperty {
    #[default]
    Y,
    X,
    Size,
    Color,
}

/// Per-dimension display overrides.
///
/// These win over the variable's own display metadata, which in turn wins
/// over the raw catalog fields.
#[derive(Clone, Debug, Default, PartialEq)]
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DimensionDisplay {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_unit: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<u64>,

    /// Pin this dimension to a fixed time instead of the chart's time range
    /// (scatter plots comparing "x in 2000" against "y in 2020").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_time: Option<TimeBound>,
}

impl DimensionDisplay {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Binds one variable to one chart property.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionConfig {
    pub property: DimensionProperty,
    pub variable_id: VariableId,

    #[serde(default, skip_serializing_if = "DimensionDisplay::is_empty")]
    pub display: DimensionDisplay,
}

impl DimensionConfig {
    pub fn new(property: DimensionProperty, variable_id: VariableId) -> Self {
        Self {
            property,
            variable_id,
            display: DimensionDisplay::default(),
        }
    }
}
