//! The top-level reactive chart state.
//!
//! [`GrapherState`] owns the full (migrated) configuration, the loaded
//! indicator table, the entity selection, the current time window and tab,
//! and the derived per-chart-type states. Everything downstream of the two
//! I/O boundaries — config fetch and data fetch — is synchronous, pure
//! derivation over a single consistent snapshot of this state.
//!
//! Derivations are memoized through explicit revision counters (see
//! [`memo`]): a value is recomputed only when one of its declared inputs
//! has actually changed, never on mere re-read, and there is no hidden
//! observer registry anywhere.

pub mod memo;

mod selection;
mod state;

pub use self::selection::SelectionManager;
pub use self::state::{FetchToken, GrapherState, GrapherSummary, LoadState};

// ----------------------------------------------------------------------------

/// Structural failures, surfaced to the caller at this boundary.
///
/// Per-row data gaps are *not* errors anywhere in the engine; they are part
/// of the data model (missing cells, absent series).
#[derive(thiserror::Error, Debug)]
pub enum GrapherError {
    #[error(transparent)]
    Config(#[from] gr_config::ConfigError),

    #[error(transparent)]
    Chart(#[from] gr_chart_state::ChartError),

    #[error(transparent)]
    Table(#[from] gr_table::TableError),
}

pub type Result<T> = std::result::Result<T, GrapherError>;
