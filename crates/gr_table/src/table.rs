use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;
use smallvec::SmallVec;

use gr_types::{EntityName, TimeInt, Value};

use crate::{
    Column, ColumnData, ColumnSlug, ColumnType, EntityTimeIndex, Result, TableError,
};

/// The slug of the entity-name column every table carries.
pub const ENTITY_COLUMN: &str = "entityName";

/// The slug of the time column every table carries.
pub const TIME_COLUMN: &str = "time";

// ----------------------------------------------------------------------------

/// An ordered set of unique-keyed columns sharing a common row count.
///
/// Immutable: every transform returns a new table, sharing unchanged columns
/// by reference. The entity and time columns are always present (checked at
/// construction).
#[derive(Clone, Debug)]
pub struct Table {
    columns: IndexMap<ColumnSlug, Arc<Column>>,
    row_count: usize,

    /// Lazily-built `(entity, time) → row` index. Derived tables that keep
    /// the same rows inherit it instead of rebuilding.
    index: OnceLock<Arc<EntityTimeIndex>>,
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.row_count == other.row_count && self.columns == other.columns
    }
}

impl Table {
    /// Build a table from columns, validating the table invariants:
    /// unique slugs, equal lengths, entity and time columns present.
    pub fn new(columns: impl IntoIterator<Item = Column>) -> Result<Self> {
        let mut map = IndexMap::default();
        let mut row_count: Option<usize> = None;

        for column in columns {
            let expected = *row_count.get_or_insert(column.len());
            if column.len() != expected {
                return Err(TableError::ColumnLengthMismatch {
                    slug: column.slug().clone(),
                    len: column.len(),
                    expected,
                });
            }
            let slug = column.slug().clone();
            if map.insert(slug.clone(), Arc::new(column)).is_some() {
                return Err(TableError::DuplicateColumn(slug));
            }
        }

        let table = Self {
            columns: map,
            row_count: row_count.unwrap_or(0),
            index: OnceLock::new(),
        };
        table.check_required_columns()?;
        Ok(table)
    }

    fn check_required_columns(&self) -> Result<()> {
        let entity = self
            .columns
            .get(ENTITY_COLUMN)
            .ok_or(TableError::MissingRequiredColumn(ENTITY_COLUMN))?;
        if !matches!(entity.typ(), ColumnType::Text | ColumnType::Categorical) {
            return Err(TableError::TypeMismatch {
                slug: entity.slug().clone(),
                actual: entity.typ(),
                expected: ColumnType::Categorical,
            });
        }

        let time = self
            .columns
            .get(TIME_COLUMN)
            .ok_or(TableError::MissingRequiredColumn(TIME_COLUMN))?;
        if time.typ() != ColumnType::Time {
            return Err(TableError::TypeMismatch {
                slug: time.slug().clone(),
                actual: time.typ(),
                expected: ColumnType::Time,
            });
        }

        Ok(())
    }

    /// A derived table over the same rows: the entity/time index carries over.
    fn derived_same_rows(&self, columns: IndexMap<ColumnSlug, Arc<Column>>) -> Self {
        let index = OnceLock::new();
        if let Some(cached) = self.index.get() {
            index.set(cached.clone()).ok();
        }
        Self {
            columns,
            row_count: self.row_count,
            index,
        }
    }

    // --- Accessors ---

    #[inline]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    #[inline]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// The column with the given slug, or [`TableError::ColumnNotFound`].
    pub fn column(&self, slug: &str) -> Result<&Arc<Column>> {
        self.columns
            .get(slug)
            .ok_or_else(|| TableError::ColumnNotFound(slug.into()))
    }

    #[inline]
    pub fn try_column(&self, slug: &str) -> Option<&Arc<Column>> {
        self.columns.get(slug)
    }

    #[inline]
    pub fn has_column(&self, slug: &str) -> bool {
        self.columns.contains_key(slug)
    }

    #[inline]
    pub fn column_slugs(&self) -> impl Iterator<Item = &ColumnSlug> {
        self.columns.keys()
    }

    #[inline]
    pub fn columns(&self) -> impl Iterator<Item = &Arc<Column>> {
        self.columns.values()
    }

    #[inline]
    pub fn entity_col(&self) -> &Arc<Column> {
        self.columns
            .get(ENTITY_COLUMN)
            .expect("entity column is checked at construction")
    }

    #[inline]
    pub fn time_col(&self) -> &Arc<Column> {
        self.columns
            .get(TIME_COLUMN)
            .expect("time column is checked at construction")
    }

    #[inline]
    pub fn entity_name_at(&self, row: usize) -> Option<EntityName> {
        self.entity_col().text_at(row).map(EntityName::new)
    }

    #[inline]
    pub fn time_at(&self, row: usize) -> Option<TimeInt> {
        self.time_col().time_at(row)
    }

    #[inline]
    pub fn row(&self, row: usize) -> RowRef<'_> {
        RowRef { table: self, row }
    }

    #[inline]
    pub fn rows(&self) -> impl Iterator<Item = RowRef<'_>> {
        (0..self.row_count).map(|row| RowRef { table: self, row })
    }

    /// The `(entity, time) → row` index, built on first use.
    pub fn entity_time_index(&self) -> &EntityTimeIndex {
        self.index
            .get_or_init(|| Arc::new(EntityTimeIndex::build(self)))
    }

    // --- Transforms ---

    /// Keep only the rows for which `predicate` returns true.
    pub fn filter(&self, predicate: impl Fn(RowRef<'_>) -> bool) -> Self {
        let rows: Vec<Option<usize>> = (0..self.row_count)
            .filter(|&row| predicate(RowRef { table: self, row }))
            .map(Some)
            .collect();
        self.take_rows(&rows)
    }

    /// Gather the given rows (in order) into a new table.
    ///
    /// `None` entries produce rows of all-invalid cells; this is how the
    /// non-matching side of a join comes out.
    pub fn take_rows(&self, rows: &[Option<usize>]) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|(slug, col)| {
                let data = col.data().take_rows(rows);
                let new = Column::new(slug.clone(), data).with_def(col.def().clone());
                (slug.clone(), Arc::new(new))
            })
            .collect();
        Self {
            columns,
            row_count: rows.len(),
            index: OnceLock::new(),
        }
    }

    /// A new table with the given columns added, or replaced if a column
    /// with the same slug already exists.
    pub fn with_columns(&self, new_columns: impl IntoIterator<Item = Column>) -> Result<Self> {
        let mut columns = self.columns.clone();
        let mut touched_indexed_column = false;

        for column in new_columns {
            if column.len() != self.row_count {
                return Err(TableError::ColumnLengthMismatch {
                    slug: column.slug().clone(),
                    len: column.len(),
                    expected: self.row_count,
                });
            }
            let slug = column.slug().clone();
            touched_indexed_column |=
                slug.as_str() == ENTITY_COLUMN || slug.as_str() == TIME_COLUMN;
            columns.insert(slug, Arc::new(column));
        }

        let table = if touched_indexed_column {
            Self {
                columns,
                row_count: self.row_count,
                index: OnceLock::new(),
            }
        } else {
            self.derived_same_rows(columns)
        };
        table.check_required_columns()?;
        Ok(table)
    }

    /// A new table with only the requested columns.
    ///
    /// The entity and time columns are always carried along, whether or not
    /// they are listed.
    pub fn select(&self, slugs: &[&str]) -> Result<Self> {
        let mut columns = IndexMap::default();
        for required in [ENTITY_COLUMN, TIME_COLUMN] {
            let col = self.column(required)?;
            columns.insert(col.slug().clone(), col.clone());
        }
        for &slug in slugs {
            let col = self.column(slug)?;
            columns.insert(col.slug().clone(), col.clone());
        }
        Ok(self.derived_same_rows(columns))
    }

    /// A new table with one column renamed.
    ///
    /// The entity and time columns cannot be renamed away (the invariant
    /// that they exist is checked after the rename).
    pub fn rename_column(&self, old: &str, new: impl Into<ColumnSlug>) -> Result<Self> {
        let new = new.into();
        if !self.columns.contains_key(old) {
            return Err(TableError::ColumnNotFound(old.into()));
        }
        if self.columns.contains_key(new.as_str()) && new.as_str() != old {
            return Err(TableError::DuplicateColumn(new));
        }

        let mut columns = IndexMap::default();
        for (slug, col) in &self.columns {
            if slug.as_str() == old {
                columns.insert(new.clone(), Arc::new(col.renamed(new.clone())));
            } else {
                columns.insert(slug.clone(), col.clone());
            }
        }

        let table = self.derived_same_rows(columns);
        table.check_required_columns()?;
        Ok(table)
    }

    /// Stable sort of the rows by the given column (invalid cells last).
    pub fn sort_by(&self, slug: &str) -> Result<Self> {
        let column = self.column(slug)?.clone();
        let mut rows: Vec<usize> = (0..self.row_count).collect();
        rows.sort_by(|&a, &b| cmp_cells(&column.value(a), &column.value(b)));
        let rows: Vec<Option<usize>> = rows.into_iter().map(Some).collect();
        Ok(self.take_rows(&rows))
    }

    /// Split the table into per-key sub-tables, keys in first-seen row order.
    ///
    /// Rows with an invalid key cell form their own `None` group.
    pub fn group_by(&self, slug: &str) -> Result<Vec<(Option<Value>, Self)>> {
        let column = self.column(slug)?.clone();

        let mut group_of: ahash::HashMap<CellKey, usize> = Default::default();
        let mut groups: Vec<(Option<Value>, Vec<Option<usize>>)> = Vec::new();

        for row in 0..self.row_count {
            let value = column.value(row);
            let key = cell_key(&value);
            let group = *group_of.entry(key).or_insert_with(|| {
                groups.push((value.clone(), Vec::new()));
                groups.len() - 1
            });
            groups[group].1.push(Some(row));
        }

        Ok(groups
            .into_iter()
            .map(|(key, rows)| (key, self.take_rows(&rows)))
            .collect())
    }

    /// Left join: every row of `self`, matched against `right` on the given
    /// key columns.
    ///
    /// Duplicate keys on the right fan out: a left row matching several
    /// right rows is repeated once per match, right rows in their original
    /// (first-seen) order. Left rows with no match keep all right columns
    /// invalid. Non-key column slug collisions are an error.
    pub fn join(&self, right: &Self, on: &[&str]) -> Result<Self> {
        let left_keys: Vec<&Arc<Column>> =
            on.iter().map(|&slug| self.column(slug)).collect::<Result<_>>()?;
        let right_keys: Vec<&Arc<Column>> =
            on.iter().map(|&slug| right.column(slug)).collect::<Result<_>>()?;

        for (slug, _) in &right.columns {
            if !on.contains(&slug.as_str()) && self.columns.contains_key(slug.as_str()) {
                return Err(TableError::DuplicateColumn(slug.clone()));
            }
        }

        // Key → right row positions, in first-seen order.
        let mut right_rows: ahash::HashMap<RowKey, Vec<usize>> = Default::default();
        for row in 0..right.row_count {
            let key: RowKey = right_keys.iter().map(|col| cell_key(&col.value(row))).collect();
            right_rows.entry(key).or_default().push(row);
        }

        let mut left_take: Vec<Option<usize>> = Vec::with_capacity(self.row_count);
        let mut right_take: Vec<Option<usize>> = Vec::with_capacity(self.row_count);
        for row in 0..self.row_count {
            let key: RowKey = left_keys.iter().map(|col| cell_key(&col.value(row))).collect();
            match right_rows.get(&key) {
                Some(matches) => {
                    for &right_row in matches {
                        left_take.push(Some(row));
                        right_take.push(Some(right_row));
                    }
                }
                None => {
                    left_take.push(Some(row));
                    right_take.push(None);
                }
            }
        }

        let mut columns: IndexMap<ColumnSlug, Arc<Column>> = self
            .columns
            .iter()
            .map(|(slug, col)| {
                let data = col.data().take_rows(&left_take);
                let new = Column::new(slug.clone(), data).with_def(col.def().clone());
                (slug.clone(), Arc::new(new))
            })
            .collect();
        for (slug, col) in &right.columns {
            if on.contains(&slug.as_str()) {
                continue;
            }
            let data = col.data().take_rows(&right_take);
            let new = Column::new(slug.clone(), data).with_def(col.def().clone());
            columns.insert(slug.clone(), Arc::new(new));
        }

        Ok(Self {
            columns,
            row_count: left_take.len(),
            index: OnceLock::new(),
        })
    }
}

// ----------------------------------------------------------------------------

/// A borrowed view of one table row, handed to [`Table::filter`] predicates.
#[derive(Clone, Copy)]
pub struct RowRef<'a> {
    table: &'a Table,
    row: usize,
}

impl RowRef<'_> {
    #[inline]
    pub fn index(&self) -> usize {
        self.row
    }

    #[inline]
    pub fn entity_name(&self) -> Option<EntityName> {
        self.table.entity_name_at(self.row)
    }

    #[inline]
    pub fn time(&self) -> Option<TimeInt> {
        self.table.time_at(self.row)
    }

    /// The cell value in the given column; `None` for invalid cells and for
    /// columns the table does not have.
    #[inline]
    pub fn value(&self, slug: &str) -> Option<Value> {
        self.table.try_column(slug).and_then(|col| col.value(self.row))
    }

    #[inline]
    pub fn number(&self, slug: &str) -> Option<f64> {
        self.table.try_column(slug).and_then(|col| col.number_at(self.row))
    }
}

// ----------------------------------------------------------------------------

/// Hashable stand-in for a cell value, for join/group keys.
///
/// Numbers key by bit pattern, which is fine for values that came out of the
/// same column (we never manufacture keys by arithmetic).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum CellKey {
    Missing,
    Number(u64),
    Text(Arc<str>),
    Time(i64),
}

type RowKey = SmallVec<[CellKey; 2]>;

fn cell_key(value: &Option<Value>) -> CellKey {
    match value {
        None => CellKey::Missing,
        Some(Value::Number(x)) => CellKey::Number(x.to_bits()),
        Some(Value::Text(s)) => CellKey::Text(s.clone()),
        Some(Value::Time(t)) => CellKey::Time(t.as_i64()),
    }
}

/// Total order over cells: invalid last, otherwise by value
/// (`f64::total_cmp` for numbers).
fn cmp_cells(a: &Option<Value>, b: &Option<Value>) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match (a, b) {
            (Value::Number(a), Value::Number(b)) => a.total_cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Time(a), Value::Time(b)) => a.cmp(b),
            // Mixed-type columns don't happen in practice; order by type tag
            // so the sort is still total.
            _ => type_rank(a).cmp(&type_rank(b)),
        },
    }
}

fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Number(_) => 0,
        Value::Text(_) => 1,
        Value::Time(_) => 2,
    }
}
