use gr_table::{ColumnSlug, Table};
use gr_types::{EntityName, TimeBound, TimeInt};

use crate::scale::{bin_for, compute_bin_edges};
use crate::transform::DeriveCtx;
use crate::Result;

/// One entity's value on the map.
#[derive(Clone, Debug, PartialEq)]
pub struct MapEntityValue {
    pub entity: EntityName,
    pub value: f64,

    /// Index into the color-scale bins, `None` when no bins could be built.
    pub bin: Option<usize>,

    /// The time the value was actually observed at; renderers annotate
    /// entities where this differs from the target time.
    pub original_time: TimeInt,
}

/// The world map: one column painted across all entities at a target time,
/// values binned for the color scale. The selection plays no role here.
#[derive(Clone, Debug, PartialEq)]
pub struct MapChartState {
    pub transformed_table: Table,

    /// Ascending color-scale bin edges (`n + 1` edges for `n` bins).
    pub bin_edges: Vec<f64>,

    pub values: Vec<MapEntityValue>,

    pub target_time: TimeInt,
}

impl MapChartState {
    pub(crate) fn derive(ctx: &DeriveCtx<'_>) -> Result<Self> {
        let extent = ctx.table.time_extent();
        let target = ctx
            .config
            .map
            .time
            .unwrap_or(TimeBound::Latest)
            .resolve(extent);

        // The map paints its configured column, falling back to the first y
        // dimension.
        let slug: Option<ColumnSlug> = ctx
            .config
            .map
            .column_slug
            .as_deref()
            .map(ColumnSlug::from)
            .or_else(|| ctx.config.y_dimensions().next().and_then(|dim| ctx.slug_for(dim)));

        let variable = slug
            .as_ref()
            .and_then(|slug| ctx.table.variable_for_slug(slug.as_str()));

        let Some(variable) = variable else {
            return Ok(Self {
                transformed_table: ctx.table.table().filter(|_| false),
                bin_edges: Vec::new(),
                values: Vec::new(),
                target_time: target,
            });
        };

        let tolerance = ctx.config.map.tolerance.unwrap_or_else(|| {
            ctx.table
                .column_slug_for(variable)
                .and_then(|slug| ctx.table.table().try_column(slug.as_str()))
                .map_or(0, |column| column.def().tolerance())
        });

        let matched = ctx.table.with_tolerance_matched(variable, target, tolerance)?;

        let mut values = Vec::new();
        let value_slug = ctx.table.column_slug_for(variable).cloned();
        if let Some(value_slug) = &value_slug {
            for row in matched.rows() {
                let (Some(entity), Some(value)) =
                    (row.entity_name(), row.number(value_slug.as_str()))
                else {
                    continue;
                };
                let original_time = row
                    .value(gr_indicator::ORIGINAL_TIME_COLUMN)
                    .and_then(|v| v.as_time())
                    .unwrap_or(target);
                values.push(MapEntityValue {
                    entity,
                    value,
                    bin: None,
                    original_time,
                });
            }
        }

        let numbers: Vec<f64> = values.iter().map(|v| v.value).collect();
        let bin_edges = compute_bin_edges(&ctx.config.color_scale, &numbers);
        for value in &mut values {
            value.bin = bin_for(value.value, &bin_edges);
        }

        Ok(Self {
            transformed_table: matched,
            bin_edges,
            values,
            target_time: target,
        })
    }
}
