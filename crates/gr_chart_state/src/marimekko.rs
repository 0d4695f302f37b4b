use gr_config::{DimensionProperty, StackMode};
use gr_table::Table;
use gr_types::EntityName;

use crate::relative::share_of_total;
use crate::series::StackedBarSegment;
use crate::transform::DeriveCtx;
use crate::Result;

/// One marimekko bar: an entity, its horizontal share, and its stacked
/// segments.
#[derive(Clone, Debug, PartialEq)]
pub struct MarimekkoBar {
    pub entity: EntityName,

    /// Fraction of the total chart width (shares over all bars sum to 1).
    pub width_share: f64,

    pub segments: Vec<StackedBarSegment>,
}

/// A marimekko chart: bars sized horizontally by the x dimension (say,
/// population) and stacked vertically by the y dimensions, at the window's
/// end time. Shows all entities with complete data, widest bar first.
#[derive(Clone, Debug, PartialEq)]
pub struct MarimekkoChartState {
    pub transformed_table: Table,
    pub bars: Vec<MarimekkoBar>,
}

impl MarimekkoChartState {
    pub(crate) fn derive(ctx: &DeriveCtx<'_>) -> Result<Self> {
        let range = ctx.resolved_time_range();
        let target = range.max;

        let x_dim = ctx.config.dimension_for(DimensionProperty::X);
        let dims: Vec<_> = ctx.config.y_dimensions().cloned().collect();
        let relative = ctx.config.stack_mode == StackMode::Relative;

        let transformed_table = match x_dim {
            Some(x_dim) => ctx.table.with_tolerance_matched(
                x_dim.variable_id,
                target,
                ctx.tolerance_for(x_dim),
            )?,
            None => ctx.table.table().filter(|_| false),
        };

        let (Some(x_dim), false) = (x_dim, dims.is_empty()) else {
            return Ok(Self {
                transformed_table,
                bars: Vec::new(),
            });
        };

        let mut bars = Vec::new();
        for entity in ctx.table.table().entity_time_index().entity_names() {
            let Some(width) = ctx.table.value_at(
                x_dim.variable_id,
                entity,
                target,
                ctx.tolerance_for(x_dim),
            ) else {
                // No width, no bar.
                continue;
            };
            if width.value <= 0.0 {
                continue;
            }

            let values: Vec<(String, Option<f64>)> = dims
                .iter()
                .map(|dim| {
                    let value = ctx
                        .table
                        .value_at(dim.variable_id, entity, target, ctx.tolerance_for(dim))
                        .map(|m| m.value);
                    (ctx.display_name_for(dim), value)
                })
                .collect();

            // Marimekko stacks: an entity with a gap in any layer leaves the
            // chart whole, it never contributes a half-stack.
            if values.iter().any(|(_, value)| value.is_none()) {
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

            bars.push(MarimekkoBar {
                entity: entity.clone(),
                width_share: width.value,
                segments,
            });
        }

        // Normalize widths to shares and order widest-first.
        let total_width: f64 = bars.iter().map(|bar| bar.width_share).sum();
        if total_width > 0.0 {
            for bar in &mut bars {
                bar.width_share /= total_width;
            }
        }
        bars.sort_by(|a, b| b.width_share.total_cmp(&a.width_share));

        Ok(Self {
            transformed_table,
            bars,
        })
    }
}
