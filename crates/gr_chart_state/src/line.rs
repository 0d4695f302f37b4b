use gr_config::{ScaleType, StackMode};
use gr_table::{MissingDataStrategy, Table};
use gr_types::{EntityName, TimeInt};

use crate::relative::relative_change_from_start;
use crate::scale::clip_for_log_scale;
use crate::series::Series;
use crate::transform::{
    apply_strategy, filter_to_selection_and_range, resolve_strategy, times_in_range, DeriveCtx,
};
use crate::Result;

// ----------------------------------------------------------------------------

/// A line chart: one series per selected entity and y dimension.
#[derive(Clone, Debug, PartialEq)]
pub struct LineChartState {
    pub transformed_table: Table,
    pub series: Vec<Series>,

    /// Points clipped away because a log axis cannot draw them.
    pub num_points_excluded_by_log_scale: usize,
}

impl LineChartState {
    pub(crate) fn derive(ctx: &DeriveCtx<'_>) -> Result<Self> {
        let range = ctx.resolved_time_range();
        let chart_type = gr_config::ChartType::LineChart;

        let mut table = filter_to_selection_and_range(ctx.table.table(), ctx.selection, range);
        let times = times_in_range(&table, range);

        let dims: Vec<_> = ctx.config.y_dimensions().cloned().collect();
        for dim in &dims {
            let Some(slug) = ctx.slug_for(dim) else {
                continue;
            };
            let requested = table
                .column(slug.as_str())?
                .def()
                .strategy
                .unwrap_or(MissingDataStrategy::Auto);
            table = apply_strategy(
                &table,
                slug.as_str(),
                resolve_strategy(requested, chart_type),
                &times,
            )?;
        }

        // Relative mode needs a start and an end; a single-time window makes
        // it an identity transform.
        let relative =
            ctx.config.stack_mode == StackMode::Relative && !range.is_point();
        let log_scale = ctx.config.y_axis.scale_type == ScaleType::Log;

        let mut series = Vec::new();
        let mut num_points_excluded_by_log_scale = 0;
        let index = table.entity_time_index();

        for dim in &dims {
            let Some(slug) = ctx.slug_for(dim) else {
                continue;
            };
            let Some(column) = table.try_column(slug.as_str()).cloned() else {
                continue;
            };
            let display_name = ctx.display_name_for(dim);
            let unit = ctx.unit_for(dim);

            for entity in ctx.selection {
                let mut points: Vec<(TimeInt, f64)> = index
                    .times_for(entity)
                    .iter()
                    .filter_map(|&(time, row)| column.number_at(row).map(|value| (time, value)))
                    .collect();

                if relative {
                    match relative_change_from_start(&points) {
                        Some(changed) => points = changed,
                        // No usable start value: the entity sits this one out.
                        None => continue,
                    }
                }

                if log_scale {
                    let (kept, excluded) = clip_for_log_scale(points, |&(_, value)| value);
                    points = kept;
                    num_points_excluded_by_log_scale += excluded;
                }

                if points.is_empty() {
                    continue;
                }

                series.push(Series {
                    entity: entity.clone(),
                    column: slug.clone(),
                    display_name: display_name.clone(),
                    unit: unit.clone(),
                    points,
                });
            }
        }

        Ok(Self {
            transformed_table: table,
            series,
            num_points_excluded_by_log_scale,
        })
    }
}

// ----------------------------------------------------------------------------

/// One line of a slope chart: an entity's value at the window's two ends.
#[derive(Clone, Debug, PartialEq)]
pub struct SlopeSeries {
    pub entity: EntityName,
    pub display_name: String,
    pub start: (TimeInt, f64),
    pub end: (TimeInt, f64),
}

/// A slope chart: the time window collapsed to its two endpoint times.
#[derive(Clone, Debug, PartialEq)]
pub struct SlopeChartState {
    pub transformed_table: Table,
    pub series: Vec<SlopeSeries>,
}

impl SlopeChartState {
    pub(crate) fn derive(ctx: &DeriveCtx<'_>) -> Result<Self> {
        let range = ctx.resolved_time_range();
        let table = filter_to_selection_and_range(ctx.table.table(), ctx.selection, range);

        let mut series = Vec::new();
        if let Some(dim) = ctx.config.y_dimensions().next() {
            let tolerance = ctx.tolerance_for(dim);
            let display_name = ctx.display_name_for(dim);

            for entity in ctx.selection {
                let start = ctx.table.value_at(dim.variable_id, entity, range.min, tolerance);
                let end = ctx.table.value_at(dim.variable_id, entity, range.max, tolerance);
                let (Some(start), Some(end)) = (start, end) else {
                    continue;
                };
                // Both endpoints resolving to the same observation draws no
                // slope.
                if start.time == end.time {
                    continue;
                }
                series.push(SlopeSeries {
                    entity: entity.clone(),
                    display_name: display_name.clone(),
                    start: (start.time, start.value),
                    end: (end.time, end.value),
                });
            }
        }

        Ok(Self {
            transformed_table: table,
            series,
        })
    }
}
