use gr_config::{ChartType, StackMode};
use gr_table::{MissingDataStrategy, Table};
use gr_types::{EntityName, TimeInt};

use crate::relative::share_of_total;
use crate::series::{StackedPoint, StackedSeries};
use crate::transform::{
    apply_strategy, filter_to_selection_and_range, resolve_strategy, times_in_range, DeriveCtx,
};
use crate::Result;

/// A stacked bar or stacked area chart.
///
/// What gets stacked depends on the dimensions: with several y dimensions
/// the layers are the dimensions (for the first selected entity); with a
/// single y dimension the layers are the selected entities. Either way the
/// stacking order is the *configured* order — dimension order or selection
/// order — never the incidental order of the raw data.
#[derive(Clone, Debug, PartialEq)]
pub struct StackedChartState {
    pub transformed_table: Table,

    /// Layers in stacking order, bottom first.
    pub series: Vec<StackedSeries>,

    /// The time grid the stack is built on.
    pub times: Vec<TimeInt>,
}

impl StackedChartState {
    pub(crate) fn derive(ctx: &DeriveCtx<'_>, chart_type: ChartType) -> Result<Self> {
        let range = ctx.resolved_time_range();
        let mut table = filter_to_selection_and_range(ctx.table.table(), ctx.selection, range);
        let times = times_in_range(&table, range);

        let dims: Vec<_> = ctx.config.y_dimensions().cloned().collect();

        // Missing data is resolved *before* stacking: a dropped entity
        // vanishes from every layer rather than reading as zero.
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

        // Layer definitions, in stacking order.
        let layers: Vec<(String, usize, EntityName)> = if dims.len() > 1 {
            // Dimensions stack; they all plot the first selected entity.
            match ctx.selection.first() {
                Some(entity) => dims
                    .iter()
                    .enumerate()
                    .map(|(dim_idx, dim)| {
                        (ctx.display_name_for(dim), dim_idx, entity.clone())
                    })
                    .collect(),
                None => Vec::new(),
            }
        } else {
            // Entities stack, in selection order.
            ctx.selection
                .iter()
                .map(|entity| (entity.to_string(), 0, entity.clone()))
                .collect()
        };

        let relative = ctx.config.stack_mode == StackMode::Relative;
        let index = table.entity_time_index();

        // Raw (unstacked) value per layer per time.
        let mut raw: Vec<Vec<Option<f64>>> = Vec::with_capacity(layers.len());
        for (_, dim_idx, entity) in &layers {
            let column = dims
                .get(*dim_idx)
                .and_then(|dim| ctx.slug_for(dim))
                .and_then(|slug| table.try_column(slug.as_str()).cloned());
            let values = times
                .iter()
                .map(|&time| {
                    let column = column.as_ref()?;
                    let row = index.row_at(entity, time)?;
                    column.number_at(row)
                })
                .collect();
            raw.push(values);
        }

        // Stack: per time, accumulate bases bottom-up in layer order.
        let mut series: Vec<StackedSeries> = layers
            .iter()
            .map(|(label, _, _)| StackedSeries {
                label: label.clone(),
                points: Vec::new(),
            })
            .collect();

        for (time_idx, &time) in times.iter().enumerate() {
            let total: f64 = raw
                .iter()
                .filter_map(|values| values[time_idx])
                .sum();

            let mut base = 0.0;
            for (layer_idx, values) in raw.iter().enumerate() {
                // A gap contributes nothing — visible as a hole in the
                // layer, never as a silent zero.
                let Some(value) = values[time_idx] else {
                    continue;
                };
                let value = if relative {
                    share_of_total(value, total)
                } else {
                    value
                };
                series[layer_idx].points.push(StackedPoint {
                    time,
                    value,
                    base,
                });
                base += value;
            }
        }

        series.retain(|layer| !layer.points.is_empty());

        Ok(Self {
            transformed_table: table,
            series,
            times,
        })
    }
}
