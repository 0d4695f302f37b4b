use gr_types::{EntityName, TimeBound, TimeBounds};

use crate::{migrations, ConfigError, DimensionConfig, Result};

// ----------------------------------------------------------------------------

/// The chart type: which transform strategy turns the indicator table into
/// renderable series.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[derive(serde::Deserialize, serde::Serialize)]
#[derive(strum::Display, strum::EnumIter, strum::EnumString)]
pub enum ChartType {
    #[default]
    LineChart,
    SlopeChart,
    ScatterPlot,
    DiscreteBar,
    StackedBar,
    StackedArea,
    StackedDiscreteBar,
    Marimekko,
    WorldMap,
}

/// The active view of a chart page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[derive(serde::Deserialize, serde::Serialize)]
#[derive(strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Tab {
    #[default]
    Chart,
    Map,
    Table,
}

/// Absolute values, or the relative ("percentage change" / share-of-total)
/// rendition of them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[derive(serde::Deserialize, serde::Serialize)]
#[derive(strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StackMode {
    #[default]
    Absolute,
    Relative,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[derive(serde::Deserialize, serde::Serialize)]
#[derive(strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScaleType {
    #[default]
    Linear,
    Log,
}

/// Whether (and how) to split the chart into small multiples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[derive(serde::Deserialize, serde::Serialize)]
#[derive(strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FacetStrategy {
    #[default]
    None,
    Entity,
    Metric,
}

/// Which part of the world the map is zoomed to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[derive(serde::Deserialize, serde::Serialize)]
#[derive(strum::Display, strum::EnumString)]
pub enum MapRegion {
    #[default]
    World,
    Africa,
    Asia,
    Europe,
    NorthAmerica,
    SouthAmerica,
    Oceania,
}

// ----------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AxisConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    pub scale_type: ScaleType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Map-tab settings.
#[derive(Clone, Debug, Default, PartialEq)]
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapConfig {
    /// Which column to paint. When unset, the first y dimension is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_slug: Option<String>,

    /// The time to show. Defaults to the latest time with data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<TimeBound>,

    /// Time tolerance for the map, overriding the column's own.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<u64>,

    pub region: MapRegion,
}

/// How numeric values map onto color bins.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[derive(serde::Deserialize, serde::Serialize)]
#[derive(strum::Display, strum::EnumString)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum BinningStrategy {
    #[default]
    EqualInterval,
    Quantiles,
    Manual,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColorScaleConfig {
    pub binning_strategy: BinningStrategy,

    /// Requested number of bins (ignored by `Manual`).
    pub num_bins: usize,

    /// Bin edges for [`BinningStrategy::Manual`], ascending.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_bin_edges: Vec<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_color_scheme: Option<String>,
}

impl Default for ColorScaleConfig {
    fn default() -> Self {
        Self {
            binning_strategy: BinningStrategy::default(),
            num_bins: 5,
            custom_bin_edges: Vec::new(),
            base_color_scheme: None,
        }
    }
}

// ----------------------------------------------------------------------------

/// The full, migrated chart configuration.
///
/// This typed model deliberately ignores JSON keys it doesn't know about;
/// forward-compatible handling of those happens at the [`migrations`] layer,
/// which works on the raw tree.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GrapherConfig {
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(rename = "type")]
    pub chart_type: ChartType,

    pub tab: Tab,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    pub time_range: TimeBounds,

    pub stack_mode: StackMode,

    pub facet: FacetStrategy,

    pub x_axis: AxisConfig,
    pub y_axis: AxisConfig,

    pub map: MapConfig,

    pub color_scale: ColorScaleConfig,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub selected_entity_names: Vec<EntityName>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<DimensionConfig>,

    pub hide_legend: bool,
}

impl Default for GrapherConfig {
    fn default() -> Self {
        Self {
            schema: Some(migrations::schema_url(migrations::LATEST_SCHEMA_VERSION)),
            chart_type: ChartType::default(),
            tab: Tab::default(),
            title: None,
            subtitle: None,
            note: None,
            time_range: TimeBounds::everything(),
            stack_mode: StackMode::default(),
            facet: FacetStrategy::default(),
            x_axis: AxisConfig::default(),
            y_axis: AxisConfig::default(),
            map: MapConfig::default(),
            color_scale: ColorScaleConfig::default(),
            selected_entity_names: Vec::new(),
            dimensions: Vec::new(),
            hide_legend: false,
        }
    }
}

impl GrapherConfig {
    /// Parse and migrate a persisted config.
    ///
    /// The JSON may be at any supported schema version; it is migrated to
    /// the latest before deserialization. A version newer than this engine
    /// fails with [`ConfigError::SchemaTooNew`].
    pub fn from_json(json: &str) -> Result<Self> {
        let mut value: serde_json::Value = serde_json::from_str(json)?;
        migrations::migrate(&mut value)?;
        Self::from_migrated_value(value)
    }

    /// Deserialize a JSON tree that has already been migrated.
    pub fn from_migrated_value(value: serde_json::Value) -> Result<Self> {
        if !value.is_object() {
            return Err(ConfigError::NotAnObject);
        }
        Ok(serde_json::from_value(value)?)
    }

    /// The variable ids this config needs data for, in dimension order,
    /// de-duplicated.
    pub fn variable_ids(&self) -> Vec<gr_types::VariableId> {
        use itertools::Itertools as _;
        self.dimensions.iter().map(|d| d.variable_id).unique().collect()
    }

    /// The y dimensions, in configured order (the stacking order).
    pub fn y_dimensions(&self) -> impl Iterator<Item = &DimensionConfig> {
        self.dimensions
            .iter()
            .filter(|d| d.property == crate::DimensionProperty::Y)
    }

    pub fn dimension_for(
        &self,
        property: crate::DimensionProperty,
    ) -> Option<&DimensionConfig> {
        self.dimensions.iter().find(|d| d.property == property)
    }
}
