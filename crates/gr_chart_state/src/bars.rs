use ahash::HashSet;

use gr_config::{ScaleType, StackMode};
use gr_table::{MissingDataStrategy, Table};
use gr_types::{EntityName, TimeInt};

use crate::relative::share_of_total;
use crate::scale::clip_for_log_scale;
use crate::series::StackedBarSegment;
use crate::transform::{resolve_strategy, DeriveCtx};
use crate::Result;

// ----------------------------------------------------------------------------

/// One bar of a discrete bar chart.
#[derive(Clone, Debug, PartialEq)]
pub struct BarValue {
    pub entity: EntityName,
    pub value: f64,

    /// The time the value was actually observed at (within tolerance of the
    /// chart's target time).
    pub original_time: TimeInt,
}

/// A discrete bar chart: one value per selected entity at the window's end
/// time, largest first.
#[derive(Clone, Debug, PartialEq)]
pub struct DiscreteBarChartState {
    pub transformed_table: Table,
    pub bars: Vec<BarValue>,
    pub num_points_excluded_by_log_scale: usize,
}

impl DiscreteBarChartState {
    pub(crate) fn derive(ctx: &DeriveCtx<'_>) -> Result<Self> {
        let range = ctx.resolved_time_range();
        let target = range.max;

        let Some(dim) = ctx.config.y_dimensions().next() else {
            return Ok(Self {
                transformed_table: empty_matched_table(ctx)?,
                bars: Vec::new(),
                num_points_excluded_by_log_scale: 0,
            });
        };
        let tolerance = ctx.tolerance_for(dim);

        let matched = ctx
            .table
            .with_tolerance_matched(dim.variable_id, target, tolerance)?;
        let selected: HashSet<&EntityName> = ctx.selection.iter().collect();
        let matched =
            matched.filter(|row| row.entity_name().is_some_and(|name| selected.contains(&name)));

        let mut bars = Vec::new();
        if let Some(slug) = ctx.slug_for(dim) {
            for row in matched.rows() {
                let (Some(entity), Some(value)) = (row.entity_name(), row.number(slug.as_str()))
                else {
                    continue;
                };
                let original_time = row
                    .value(gr_indicator::ORIGINAL_TIME_COLUMN)
                    .and_then(|v| v.as_time())
                    .unwrap_or(target);
                bars.push(BarValue {
                    entity,
                    value,
                    original_time,
                });
            }
        }

        if ctx.config.stack_mode == StackMode::Relative {
            let total: f64 = bars.iter().map(|bar| bar.value).sum();
            for bar in &mut bars {
                bar.value = share_of_total(bar.value, total);
            }
        }

        let mut num_points_excluded_by_log_scale = 0;
        if ctx.config.y_axis.scale_type == ScaleType::Log {
            let (kept, excluded) = clip_for_log_scale(bars, |bar| bar.value);
            bars = kept;
            num_points_excluded_by_log_scale = excluded;
        }

        // Largest first; ties keep entity order stable via the total sort.
        bars.sort_by(|a, b| b.value.total_cmp(&a.value));

        Ok(Self {
            transformed_table: matched,
            bars,
            num_points_excluded_by_log_scale,
        })
    }
}

// ----------------------------------------------------------------------------

/// One entity's stacked bar.
#[derive(Clone, Debug, PartialEq)]
pub struct StackedEntityBar {
    pub entity: EntityName,
    pub segments: Vec<StackedBarSegment>,
}

/// A stacked discrete bar chart: per selected entity, the y dimensions
/// stacked at the window's end time, segments in dimension order.
#[derive(Clone, Debug, PartialEq)]
pub struct StackedDiscreteBarChartState {
    pub transformed_table: Table,
    pub bars: Vec<StackedEntityBar>,
}

impl StackedDiscreteBarChartState {
    pub(crate) fn derive(ctx: &DeriveCtx<'_>) -> Result<Self> {
        let range = ctx.resolved_time_range();
        let target = range.max;
        let chart_type = gr_config::ChartType::StackedDiscreteBar;

        let dims: Vec<_> = ctx.config.y_dimensions().cloned().collect();
        let relative = ctx.config.stack_mode == StackMode::Relative;

        let mut bars = Vec::new();
        for entity in ctx.selection {
            let mut values: Vec<(String, Option<f64>)> = Vec::with_capacity(dims.len());
            for dim in &dims {
                let tolerance = ctx.tolerance_for(dim);
                let value = ctx
                    .table
                    .value_at(dim.variable_id, entity, target, tolerance)
                    .map(|m| m.value);
                values.push((ctx.display_name_for(dim), value));
            }

            let strategy = resolve_strategy(MissingDataStrategy::Auto, chart_type);
            let has_gap = values.iter().any(|(_, value)| value.is_none());
            if has_gap && strategy == MissingDataStrategy::DropEntity {
                // The whole entity leaves the chart — a gap in one dimension
                // must not quietly become a zero-height segment.
                continue;
            }

            let total: f64 = values.iter().filter_map(|(_, value)| *value).sum();
            let mut segments = Vec::with_capacity(values.len());
            let mut base = 0.0;
            for (label, value) in values {
                let Some(value) = value else {
                    continue;
                };
                let value = if relative {
                    share_of_total(value, total)
                } else {
                    value
                };
                segments.push(StackedBarSegment { label, value, base });
                base += value;
            }

            if !segments.is_empty() {
                bars.push(StackedEntityBar {
                    entity: entity.clone(),
                    segments,
                });
            }
        }

        let transformed_table = match dims.first() {
            Some(dim) => {
                let tolerance = ctx.tolerance_for(dim);
                ctx.table
                    .with_tolerance_matched(dim.variable_id, target, tolerance)?
            }
            None => empty_matched_table(ctx)?,
        };

        Ok(Self {
            transformed_table,
            bars,
        })
    }
}

// ----------------------------------------------------------------------------

/// A valid, zero-row table for chart states with nothing to show.
fn empty_matched_table(ctx: &DeriveCtx<'_>) -> Result<Table> {
    Ok(ctx.table.table().filter(|_| false))
}
