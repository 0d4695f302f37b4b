use gr_config::{DimensionProperty, ScaleType};
use gr_table::Table;
use gr_types::{EntityName, TimeInt};

use crate::scale::clip_for_log_scale;
use crate::transform::DeriveCtx;
use crate::Result;

/// One entity's position on the scatter plot.
#[derive(Clone, Debug, PartialEq)]
pub struct ScatterPoint {
    pub entity: EntityName,
    pub x: f64,
    pub y: f64,

    /// Value of the size dimension, when configured.
    pub size: Option<f64>,

    /// Value of the color dimension, when configured.
    pub color: Option<f64>,

    /// The times the x and y values were actually observed at. They can
    /// differ: each dimension tolerance-matches independently.
    pub time_x: TimeInt,
    pub time_y: TimeInt,
}

/// A scatter plot: x and y paired per entity at matched times.
///
/// Unlike the line family, a scatter plot shows *all* entities; the
/// selection only highlights.
#[derive(Clone, Debug, PartialEq)]
pub struct ScatterChartState {
    pub transformed_table: Table,
    pub points: Vec<ScatterPoint>,
    pub num_points_excluded_by_log_scale: usize,
}

impl ScatterChartState {
    pub(crate) fn derive(ctx: &DeriveCtx<'_>) -> Result<Self> {
        let range = ctx.resolved_time_range();
        let extent = ctx.table.time_extent();

        let x_dim = ctx.config.dimension_for(DimensionProperty::X);
        let y_dim = ctx.config.dimension_for(DimensionProperty::Y);
        let size_dim = ctx.config.dimension_for(DimensionProperty::Size);
        let color_dim = ctx.config.dimension_for(DimensionProperty::Color);

        let transformed_table = ctx
            .table
            .table()
            .filter(|row| row.time().is_some_and(|time| range.contains(time)));

        let (Some(x_dim), Some(y_dim)) = (x_dim, y_dim) else {
            // Scatter needs both axes bound; anything less plots nothing.
            return Ok(Self {
                transformed_table,
                points: Vec::new(),
                num_points_excluded_by_log_scale: 0,
            });
        };

        // Each dimension may pin its own target time; default is the end of
        // the window.
        let target_of = |dim: &gr_config::DimensionConfig| -> TimeInt {
            dim.display
                .target_time
                .map_or(range.max, |bound| bound.resolve(extent))
        };
        let x_target = target_of(x_dim);
        let y_target = target_of(y_dim);

        let mut points = Vec::new();
        for entity in ctx.table.table().entity_time_index().entity_names() {
            let x = ctx
                .table
                .value_at(x_dim.variable_id, entity, x_target, ctx.tolerance_for(x_dim));
            let y = ctx
                .table
                .value_at(y_dim.variable_id, entity, y_target, ctx.tolerance_for(y_dim));
            let (Some(x), Some(y)) = (x, y) else {
                continue;
            };

            let aux = |dim: Option<&gr_config::DimensionConfig>, target: TimeInt| {
                dim.and_then(|dim| {
                    ctx.table
                        .value_at(dim.variable_id, entity, target, ctx.tolerance_for(dim))
                })
                .map(|m| m.value)
            };

            points.push(ScatterPoint {
                entity: entity.clone(),
                x: x.value,
                y: y.value,
                size: aux(size_dim, y_target),
                color: aux(color_dim, y_target),
                time_x: x.time,
                time_y: y.time,
            });
        }

        // Log axes clip, independently per axis.
        let mut num_points_excluded_by_log_scale = 0;
        if ctx.config.x_axis.scale_type == ScaleType::Log {
            let (kept, excluded) = clip_for_log_scale(points, |p: &ScatterPoint| p.x);
            points = kept;
            num_points_excluded_by_log_scale += excluded;
        }
        if ctx.config.y_axis.scale_type == ScaleType::Log {
            let (kept, excluded) = clip_for_log_scale(points, |p: &ScatterPoint| p.y);
            points = kept;
            num_points_excluded_by_log_scale += excluded;
        }

        Ok(Self {
            transformed_table,
            points,
            num_points_excluded_by_log_scale,
        })
    }
}
