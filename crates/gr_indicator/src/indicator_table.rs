use std::sync::Arc;

use indexmap::IndexMap;

use gr_table::{
    Column, ColumnData, ColumnDef, ColumnSlug, Result, Table, ENTITY_COLUMN, TIME_COLUMN,
};
use gr_types::{Entity, EntityName, TimeInt, TimeRange};

use crate::{ToleranceMatch, VariableData, VariableId, ORIGINAL_TIME_COLUMN};

/// The indicator table: one row per `(entity, time)` pair observed anywhere
/// in the input, one value column per variable.
///
/// Construction applies each variable's unit conversion factor exactly once;
/// reads never convert again. The table is immutable and cheap to clone
/// (columns are shared by reference), so every chart state can hold a view
/// of it without copying data.
#[derive(Clone, Debug, PartialEq)]
pub struct IndicatorTable {
    table: Table,

    /// Which column belongs to which variable, in input order.
    variable_columns: IndexMap<VariableId, ColumnSlug>,

    /// Entities seen while ingesting, with ids/codes when provided.
    entities: Vec<Entity>,
}

impl Default for IndicatorTable {
    fn default() -> Self {
        Self::empty()
    }
}

impl IndicatorTable {
    /// Build from raw per-variable rows and metadata.
    ///
    /// Row order is normalized to (entity first-seen, time). Variables with
    /// zero valid rows still get a column; it will report
    /// [`Column::is_missing`] and consumers treat it as absent.
    pub fn from_variables(variables: &[VariableData]) -> Result<Self> {
        // Assign one output row to every distinct (entity, time) pair.
        let mut entity_order: IndexMap<EntityName, usize> = Default::default();
        let mut entities: Vec<Entity> = Vec::new();
        let mut pairs: IndexMap<(usize, TimeInt), usize> = Default::default();

        for variable in variables {
            for row in &variable.rows {
                let next_entity = entity_order.len();
                let entity_idx = *entity_order
                    .entry(row.entity.name.clone())
                    .or_insert(next_entity);
                if entity_idx == entities.len() {
                    entities.push(row.entity.clone());
                } else {
                    // Backfill id/code if an earlier variable didn't have them.
                    let known = &mut entities[entity_idx];
                    if known.id.is_none() {
                        known.id = row.entity.id;
                    }
                    if known.code.is_none() {
                        known.code = row.entity.code.clone();
                    }
                }
                let next_row = pairs.len();
                pairs.entry((entity_idx, row.time)).or_insert(next_row);
            }
        }

        // Normalize to (entity first-seen, time) order.
        let mut ordered: Vec<(usize, TimeInt)> = pairs.keys().copied().collect();
        ordered.sort_unstable();
        let row_of: ahash::HashMap<(usize, TimeInt), usize> = ordered
            .iter()
            .enumerate()
            .map(|(row, &pair)| (pair, row))
            .collect();
        let num_rows = ordered.len();

        let entity_column = Column::new(
            ENTITY_COLUMN,
            ColumnData::categorical_from_values(
                ordered
                    .iter()
                    .map(|&(entity_idx, _)| Some(entities[entity_idx].name.as_str())),
            ),
        );
        let time_column = Column::new(
            TIME_COLUMN,
            ColumnData::Time(ordered.iter().map(|&(_, time)| Some(time)).collect()),
        );

        let mut columns = vec![entity_column, time_column];
        let mut variable_columns = IndexMap::default();

        for variable in variables {
            let meta = &variable.meta;
            let slug = ColumnSlug::new(format!("indicator-{}", meta.id));
            let factor = meta.display.conversion_factor.unwrap_or(1.0);

            let mut values: Vec<Option<f64>> = vec![None; num_rows];
            for row in &variable.rows {
                let Some(&entity_idx) = entity_order.get(&row.entity.name) else {
                    continue;
                };
                if let Some(&out) = row_of.get(&(entity_idx, row.time)) {
                    // Unit conversion happens here, once, and never on read.
                    values[out] = Some(row.value * factor);
                }
            }

            let def = ColumnDef {
                display_name: meta.display.name.clone().or_else(|| Some(meta.name.clone())),
                unit: meta.effective_unit().map(str::to_owned),
                short_unit: meta.effective_short_unit().map(str::to_owned),
                tolerance: meta.display.tolerance,
                conversion_factor: meta.display.conversion_factor,
                strategy: None,
                origins: meta.origins.clone(),
            };

            columns.push(Column::new(slug.clone(), ColumnData::Number(values)).with_def(def));
            variable_columns.insert(meta.id, slug);
        }

        gr_log::debug!(
            "ingested {} variables into {} rows across {} entities",
            variables.len(),
            num_rows,
            entities.len()
        );

        Ok(Self {
            table: Table::new(columns)?,
            variable_columns,
            entities,
        })
    }

    /// An indicator table with no variables and no rows.
    pub fn empty() -> Self {
        Self {
            table: Table::new([
                Column::new(ENTITY_COLUMN, ColumnData::categorical_from_values(std::iter::empty::<Option<&str>>())),
                Column::new(TIME_COLUMN, ColumnData::Time(Vec::new())),
            ])
            .expect("the empty table carries its required columns"),
            variable_columns: IndexMap::default(),
            entities: Vec::new(),
        }
    }

    // --- Accessors ---

    #[inline]
    pub fn table(&self) -> &Table {
        &self.table
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }

    /// Entities seen while ingesting, in first-seen order.
    #[inline]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// The column slug of a variable, if it was ingested.
    #[inline]
    pub fn column_slug_for(&self, variable: VariableId) -> Option<&ColumnSlug> {
        self.variable_columns.get(&variable)
    }

    /// The reverse lookup: which variable a column slug belongs to.
    pub fn variable_for_slug(&self, slug: &str) -> Option<VariableId> {
        self.variable_columns
            .iter()
            .find_map(|(&id, s)| (s.as_str() == slug).then_some(id))
    }

    /// The variable columns, in input order.
    pub fn variable_ids(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.variable_columns.keys().copied()
    }

    /// The backing column of a variable.
    ///
    /// `None` both for unknown variables and for variables whose column has
    /// zero valid rows — consumers treat those identically (as absent).
    pub fn column_for(&self, variable: VariableId) -> Option<&Arc<Column>> {
        let slug = self.variable_columns.get(&variable)?;
        let column = self.table.try_column(slug.as_str())?;
        (!column.is_missing()).then_some(column)
    }

    /// The observed time extent over all rows.
    #[inline]
    pub fn time_extent(&self) -> TimeRange {
        self.table.entity_time_index().time_extent()
    }

    // --- Tolerance matching ---

    /// The value of `variable` for `entity` at `target`, accepting the
    /// closest time within `tolerance` when the exact time has no value.
    ///
    /// Equidistant candidates resolve to the earlier time. Returns `None`
    /// when nothing valid falls inside the window — a data gap, not an
    /// error.
    pub fn value_at(
        &self,
        variable: VariableId,
        entity: &EntityName,
        target: TimeInt,
        tolerance: u64,
    ) -> Option<ToleranceMatch> {
        let column = self.column_for(variable)?;
        crate::tolerance::closest_in_window(&self.table, column, entity, target, tolerance)
    }

    /// A derived table with exactly one row per entity: each entity's value
    /// of `variable` tolerance-matched around `target`, plus an
    /// [`ORIGINAL_TIME_COLUMN`] recording the time the value was actually
    /// observed at. Entities with nothing in the window are left out.
    pub fn with_tolerance_matched(
        &self,
        variable: VariableId,
        target: TimeInt,
        tolerance: u64,
    ) -> Result<Table> {
        let slug = match self.column_slug_for(variable) {
            Some(slug) => slug.clone(),
            None => {
                // No such variable: an empty derivation, not an error.
                return Table::new([
                    Column::new(ENTITY_COLUMN, ColumnData::categorical_from_values(std::iter::empty::<Option<&str>>())),
                    Column::new(TIME_COLUMN, ColumnData::Time(Vec::new())),
                ]);
            }
        };
        let def = self.table.column(slug.as_str())?.def().clone();

        let index = self.table.entity_time_index();
        let mut names: Vec<EntityName> = Vec::new();
        let mut values: Vec<Option<f64>> = Vec::new();
        let mut original_times: Vec<Option<TimeInt>> = Vec::new();

        for entity in index.entity_names() {
            if let Some(m) = self.value_at(variable, entity, target, tolerance) {
                names.push(entity.clone());
                values.push(Some(m.value));
                original_times.push(Some(m.time));
            }
        }

        let num_rows = names.len();
        Table::new([
            Column::new(
                ENTITY_COLUMN,
                ColumnData::categorical_from_values(names.iter().map(|n| Some(n.as_str()))),
            ),
            Column::new(TIME_COLUMN, ColumnData::Time(vec![Some(target); num_rows])),
            Column::new(slug, ColumnData::Number(values)).with_def(def),
            Column::new(ORIGINAL_TIME_COLUMN, ColumnData::Time(original_times)),
        ])
    }
}
