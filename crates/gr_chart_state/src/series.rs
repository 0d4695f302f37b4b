use gr_table::ColumnSlug;
use gr_types::{EntityName, TimeInt};

/// One renderable time series: an entity's values of one column, in time
/// order.
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    pub entity: EntityName,
    pub column: ColumnSlug,

    /// Fully resolved (dimension override → variable display → raw name).
    pub display_name: String,

    pub unit: Option<String>,

    pub points: Vec<(TimeInt, f64)>,
}

// ----------------------------------------------------------------------------

/// One segment of a stack at one time: the value, plus the cumulative base
/// it sits on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StackedPoint {
    pub time: TimeInt,
    pub value: f64,
    pub base: f64,
}

/// One layer of a stacked chart, in stacking order.
#[derive(Clone, Debug, PartialEq)]
pub struct StackedSeries {
    /// What this layer is: an entity name or a dimension display name,
    /// depending on what the chart stacks.
    pub label: String,

    pub points: Vec<StackedPoint>,
}

/// One segment of a single stacked bar (no time axis).
#[derive(Clone, Debug, PartialEq)]
pub struct StackedBarSegment {
    pub label: String,
    pub value: f64,

    /// The cumulative total of the segments below this one.
    pub base: f64,
}
