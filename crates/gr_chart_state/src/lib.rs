//! Per-chart-type transform strategies.
//!
//! A [`ChartState`] is the derived, render-ready form of one chart type:
//! the transformed table plus whatever chart-specific series the renderer
//! needs. It is a tagged union over chart kinds, dispatched by exhaustive
//! match — switching chart type re-derives from the already-loaded
//! indicator table and never refetches anything.
//!
//! Derivation is a pure function of its inputs. The backing columns of the
//! input table are shared read-only with every other simultaneously active
//! chart state; nothing here mutates them.

mod bars;
mod line;
mod map;
mod marimekko;
mod relative;
mod scale;
mod scatter;
mod series;
mod stacked;
mod transform;

pub use self::bars::{
    BarValue, DiscreteBarChartState, StackedDiscreteBarChartState, StackedEntityBar,
};
pub use self::line::{LineChartState, SlopeChartState, SlopeSeries};
pub use self::map::{MapChartState, MapEntityValue};
pub use self::marimekko::{MarimekkoBar, MarimekkoChartState};
pub use self::scale::{bin_for, compute_bin_edges};
pub use self::scatter::{ScatterChartState, ScatterPoint};
pub use self::series::{Series, StackedBarSegment, StackedPoint, StackedSeries};
pub use self::stacked::StackedChartState;
pub use self::transform::{resolve_strategy, DeriveCtx};

use gr_config::ChartType;
use gr_table::Table;

// ----------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum ChartError {
    #[error(transparent)]
    Table(#[from] gr_table::TableError),
}

pub type Result<T> = std::result::Result<T, ChartError>;

// ----------------------------------------------------------------------------

/// The derived state of one chart type. Never persisted; recomputed from
/// (config, table, selection, time range) whenever one of those changes.
#[derive(Clone, Debug, PartialEq)]
pub enum ChartState {
    Line(LineChartState),
    Slope(SlopeChartState),
    Scatter(ScatterChartState),
    DiscreteBar(DiscreteBarChartState),
    StackedBar(StackedChartState),
    StackedArea(StackedChartState),
    StackedDiscreteBar(StackedDiscreteBarChartState),
    Marimekko(MarimekkoChartState),
    Map(MapChartState),
}

impl ChartState {
    /// Derive the state for `chart_type` from the given inputs.
    ///
    /// Pure: no I/O, no caches that outlive the call. Data gaps never error
    /// here; they come out as absent series/points.
    pub fn derive(chart_type: ChartType, ctx: &DeriveCtx<'_>) -> Result<Self> {
        gr_log::trace!(
            "deriving {chart_type} state over {} rows",
            ctx.table.row_count()
        );
        match chart_type {
            ChartType::LineChart => LineChartState::derive(ctx).map(Self::Line),
            ChartType::SlopeChart => SlopeChartState::derive(ctx).map(Self::Slope),
            ChartType::ScatterPlot => ScatterChartState::derive(ctx).map(Self::Scatter),
            ChartType::DiscreteBar => DiscreteBarChartState::derive(ctx).map(Self::DiscreteBar),
            ChartType::StackedBar => {
                StackedChartState::derive(ctx, ChartType::StackedBar).map(Self::StackedBar)
            }
            ChartType::StackedArea => {
                StackedChartState::derive(ctx, ChartType::StackedArea).map(Self::StackedArea)
            }
            ChartType::StackedDiscreteBar => {
                StackedDiscreteBarChartState::derive(ctx).map(Self::StackedDiscreteBar)
            }
            ChartType::Marimekko => MarimekkoChartState::derive(ctx).map(Self::Marimekko),
            ChartType::WorldMap => MapChartState::derive(ctx).map(Self::Map),
        }
    }

    pub fn chart_type(&self) -> ChartType {
        match self {
            Self::Line(_) => ChartType::LineChart,
            Self::Slope(_) => ChartType::SlopeChart,
            Self::Scatter(_) => ChartType::ScatterPlot,
            Self::DiscreteBar(_) => ChartType::DiscreteBar,
            Self::StackedBar(_) => ChartType::StackedBar,
            Self::StackedArea(_) => ChartType::StackedArea,
            Self::StackedDiscreteBar(_) => ChartType::StackedDiscreteBar,
            Self::Marimekko(_) => ChartType::Marimekko,
            Self::Map(_) => ChartType::WorldMap,
        }
    }

    /// The chart-ready table this state derived.
    pub fn transformed_table(&self) -> &Table {
        match self {
            Self::Line(state) => &state.transformed_table,
            Self::Slope(state) => &state.transformed_table,
            Self::Scatter(state) => &state.transformed_table,
            Self::DiscreteBar(state) => &state.transformed_table,
            Self::StackedBar(state) | Self::StackedArea(state) => &state.transformed_table,
            Self::StackedDiscreteBar(state) => &state.transformed_table,
            Self::Marimekko(state) => &state.transformed_table,
            Self::Map(state) => &state.transformed_table,
        }
    }
}
