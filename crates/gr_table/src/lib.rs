//! An immutable in-memory columnar table, specialized for sparse panel data
//! (one row per entity and time).
//!
//! Tables are value types: every transform returns a new [`Table`], sharing
//! unchanged columns by reference. This is what makes it safe for several
//! chart views to read the same backing data at once.
//!
//! The [`EntityTimeIndex`] maps `(entity, time)` to row positions and keeps
//! per-entity time-sorted row lists, so point lookups and windowed lookups
//! never scan the whole table. It is built lazily and memoized per table.

mod column;
mod index;
mod table;

pub use self::column::{
    Column, ColumnData, ColumnDef, ColumnSlug, ColumnType, MissingDataStrategy,
};
pub use self::index::EntityTimeIndex;
pub use self::table::{RowRef, Table, ENTITY_COLUMN, TIME_COLUMN};

// ----------------------------------------------------------------------------

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("column {0:?} not found")]
    ColumnNotFound(ColumnSlug),

    #[error("column {slug:?} has {len} rows, expected {expected}")]
    ColumnLengthMismatch {
        slug: ColumnSlug,
        len: usize,
        expected: usize,
    },

    #[error("duplicate column {0:?}")]
    DuplicateColumn(ColumnSlug),

    #[error("table is missing the required {0:?} column")]
    MissingRequiredColumn(&'static str),

    #[error("column {slug:?} is a {actual:?} column, expected {expected:?}")]
    TypeMismatch {
        slug: ColumnSlug,
        actual: ColumnType,
        expected: ColumnType,
    },
}

pub type Result<T> = std::result::Result<T, TableError>;
