//! The grapher data engine: from raw, sparsely-populated indicator rows to
//! the exact series a chart needs to render.
//!
//! This umbrella crate re-exports the public surface of the engine:
//!
//! * [`table`] — the immutable columnar table and its entity/time index;
//! * [`indicator`] — indicator semantics (unit conversion, tolerance
//!   matching, missing-data strategies) on top of it;
//! * [`config`] — the versioned chart configuration, its migration chain
//!   and the URL query codec;
//! * [`chart_state`] — the per-chart-type transform strategies;
//! * [`grapher_state`] — the top-level reactive state object tying it all
//!   together.
//!
//! The usual flow: fetch a persisted config JSON, feed it to a
//! [`GrapherState`], fetch the variables it asks for, deliver them, and
//! read chart states back out. See `examples/minimal.rs`.

pub use gr_chart_state as chart_state;
pub use gr_config as config;
pub use gr_grapher as grapher_state;
pub use gr_indicator as indicator;
pub use gr_log as log;
pub use gr_table as table;
pub use gr_types as types;

pub use gr_chart_state::{ChartState, DeriveCtx};
pub use gr_config::{ChartType, GrapherConfig, GrapherQueryParams, Tab};
pub use gr_grapher::{FetchToken, GrapherError, GrapherState, LoadState, SelectionManager};
pub use gr_indicator::{
    IndicatorTable, MissingDataStrategy, VariableData, VariableDisplay, VariableMeta, VariableRow,
};
pub use gr_table::{Column, ColumnData, ColumnDef, ColumnSlug, Table};
pub use gr_types::{
    Entity, EntityCode, EntityId, EntityName, TimeBound, TimeBounds, TimeInt, TimeRange, Value,
    VariableId,
};
