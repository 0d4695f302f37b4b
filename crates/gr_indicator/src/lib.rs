//! Indicator semantics on top of [`gr_table`].
//!
//! An *indicator* (or *variable*) is one named, sourced time series across
//! entities. This crate turns raw per-variable rows — as delivered by the
//! (external) data-fetch collaborator — into an [`IndicatorTable`]: a single
//! columnar table with one value column per variable, unit conversion
//! applied, display metadata resolved, and tolerance-based time matching on
//! top of the entity/time index.
//!
//! Data gaps are part of the data model here: an entity/time pair outside
//! the tolerance window is a `None`, a variable with zero valid rows is a
//! column with `is_missing()`, and neither is ever an error.

mod indicator_table;
mod strategy;
mod tolerance;
mod variable;

pub use self::indicator_table::IndicatorTable;
pub use self::strategy::{drop_entities_with_gaps, hold_last, resolve_display_name};
pub use self::tolerance::ToleranceMatch;
pub use self::variable::{VariableData, VariableDisplay, VariableId, VariableMeta, VariableRow};

pub use gr_table::MissingDataStrategy;

/// The slug of the derived column recording which time a tolerance-matched
/// value was actually observed at.
pub const ORIGINAL_TIME_COLUMN: &str = "originalTime";
