use ahash::HashSet;

use gr_config::{ChartType, DimensionConfig, GrapherConfig};
use gr_indicator::{IndicatorTable, MissingDataStrategy};
use gr_table::{ColumnSlug, Result as TableResult, Table};
use gr_types::{EntityName, TimeInt, TimeRange};

/// Everything a chart-state derivation reads. Borrowed: derivation never
/// takes ownership of shared state.
#[derive(Clone, Copy)]
pub struct DeriveCtx<'a> {
    pub table: &'a IndicatorTable,
    pub config: &'a GrapherConfig,

    /// The current selection, in selection order. Owned by the selection
    /// manager — chart states read it, they never hold their own copy.
    pub selection: &'a [EntityName],
}

impl DeriveCtx<'_> {
    /// The chart's time window, resolved against the data actually loaded.
    pub fn resolved_time_range(&self) -> TimeRange {
        self.config.time_range.resolve(self.table.time_extent())
    }

    /// The column slug a dimension binds to, if its variable was loaded.
    pub fn slug_for(&self, dimension: &DimensionConfig) -> Option<ColumnSlug> {
        self.table.column_slug_for(dimension.variable_id).cloned()
    }

    /// The effective tolerance of a dimension: dimension override first,
    /// then the column's own def.
    pub fn tolerance_for(&self, dimension: &DimensionConfig) -> u64 {
        dimension.display.tolerance.unwrap_or_else(|| {
            self.slug_for(dimension)
                .and_then(|slug| self.table.table().try_column(slug.as_str()))
                .map_or(0, |column| column.def().tolerance())
        })
    }

    /// The display name of a dimension's series, fully resolved.
    pub fn display_name_for(&self, dimension: &DimensionConfig) -> String {
        let column = self
            .slug_for(dimension)
            .and_then(|slug| self.table.table().try_column(slug.as_str()).cloned());
        match &column {
            Some(column) => {
                gr_indicator::resolve_display_name(dimension.display.name.as_deref(), column)
                    .to_owned()
            }
            None => dimension
                .display
                .name
                .clone()
                .unwrap_or_else(|| dimension.variable_id.to_string()),
        }
    }

    pub fn unit_for(&self, dimension: &DimensionConfig) -> Option<String> {
        dimension.display.unit.clone().or_else(|| {
            self.slug_for(dimension)
                .and_then(|slug| self.table.table().try_column(slug.as_str()))
                .and_then(|column| column.def().unit.clone())
        })
    }
}

// ----------------------------------------------------------------------------

/// Resolve [`MissingDataStrategy::Auto`] for a chart type.
///
/// Stacked charts can't tolerate silent gaps (a gap would read as zero), so
/// they drop the entity; everything else shows the gap.
pub fn resolve_strategy(requested: MissingDataStrategy, chart_type: ChartType) -> MissingDataStrategy {
    match requested {
        MissingDataStrategy::Auto => match chart_type {
            ChartType::StackedBar
            | ChartType::StackedArea
            | ChartType::StackedDiscreteBar
            | ChartType::Marimekko => MissingDataStrategy::DropEntity,
            ChartType::LineChart
            | ChartType::SlopeChart
            | ChartType::ScatterPlot
            | ChartType::DiscreteBar
            | ChartType::WorldMap => MissingDataStrategy::ShowGap,
        },
        explicit => explicit,
    }
}

/// Restrict a table to the selected entities (in their table order) and the
/// resolved time window. An empty selection yields an empty table: charts
/// that plot selections plot nothing until something is selected.
pub fn filter_to_selection_and_range(
    table: &Table,
    selection: &[EntityName],
    range: TimeRange,
) -> Table {
    let selected: HashSet<&EntityName> = selection.iter().collect();
    table.filter(|row| {
        row.entity_name().is_some_and(|name| selected.contains(&name))
            && row.time().is_some_and(|time| range.contains(time))
    })
}

/// Apply the resolved missing-data strategy to `slug`, stamping the strategy
/// into the derived column's def (even when the strategy changes nothing, so
/// the policy is always explicit in the output).
pub fn apply_strategy(
    table: &Table,
    slug: &str,
    strategy: MissingDataStrategy,
    required_times: &[TimeInt],
) -> TableResult<Table> {
    match strategy {
        MissingDataStrategy::HoldLast => gr_indicator::hold_last(table, slug),
        MissingDataStrategy::DropEntity => {
            gr_indicator::drop_entities_with_gaps(table, slug, required_times)
        }
        MissingDataStrategy::ShowGap | MissingDataStrategy::Auto => {
            let column = table.column(slug)?;
            let mut def = column.def().clone();
            def.strategy = Some(MissingDataStrategy::ShowGap);
            let column = column.as_ref().clone().with_def(def);
            table.with_columns([column])
        }
    }
}

/// The distinct times with any data in the window, ascending. This is the
/// grid stacked charts stack on.
pub fn times_in_range(table: &Table, range: TimeRange) -> Vec<TimeInt> {
    use itertools::Itertools as _;
    table
        .rows()
        .filter_map(|row| row.time())
        .filter(|&time| range.contains(time))
        .sorted_unstable()
        .dedup()
        .collect()
}
