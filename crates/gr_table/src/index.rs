use gr_types::{EntityName, TimeInt, TimeRange};

use crate::Table;

/// Maps `(entity, time)` pairs to row positions.
///
/// Built once per table (lazily, see [`Table::entity_time_index`]) and then
/// shared; a derived table whose rows are unchanged inherits it.
///
/// Rows whose entity or time cell is invalid are not indexed. If the same
/// `(entity, time)` pair occurs on several rows, the first-seen row wins for
/// point lookups; the per-entity lists keep every row.
#[derive(Debug)]
pub struct EntityTimeIndex {
    point: ahash::HashMap<(EntityName, TimeInt), usize>,

    /// Per entity: `(time, row)`, sorted by time then row.
    by_entity: ahash::HashMap<EntityName, Vec<(TimeInt, usize)>>,

    /// Every indexed entity, in first-seen row order.
    entities: Vec<EntityName>,

    time_extent: TimeRange,
}

impl EntityTimeIndex {
    pub(crate) fn build(table: &Table) -> Self {
        let mut point: ahash::HashMap<(EntityName, TimeInt), usize> = Default::default();
        let mut by_entity: ahash::HashMap<EntityName, Vec<(TimeInt, usize)>> = Default::default();
        let mut entities = Vec::new();
        let mut time_extent = TimeRange::EMPTY;

        for row in 0..table.row_count() {
            let (Some(entity), Some(time)) = (table.entity_name_at(row), table.time_at(row))
            else {
                continue;
            };

            point.entry((entity.clone(), time)).or_insert(row);

            match by_entity.entry(entity) {
                std::collections::hash_map::Entry::Occupied(mut rows) => {
                    rows.get_mut().push((time, row));
                }
                std::collections::hash_map::Entry::Vacant(vacant) => {
                    entities.push(vacant.key().clone());
                    vacant.insert(vec![(time, row)]);
                }
            }

            time_extent = time_extent.union(TimeRange::point(time));
        }

        for rows in by_entity.values_mut() {
            rows.sort_unstable();
        }

        gr_log::trace!(
            "indexed {} (entity, time) pairs across {} entities",
            point.len(),
            entities.len()
        );

        Self {
            point,
            by_entity,
            entities,
            time_extent,
        }
    }

    /// O(1) point lookup.
    #[inline]
    pub fn row_at(&self, entity: &EntityName, time: TimeInt) -> Option<usize> {
        self.point.get(&(entity.clone(), time)).copied()
    }

    /// All `(time, row)` pairs of an entity, sorted by time.
    #[inline]
    pub fn times_for(&self, entity: &EntityName) -> &[(TimeInt, usize)] {
        self.by_entity.get(entity).map_or(&[], Vec::as_slice)
    }

    /// The `(time, row)` pairs of an entity falling inside `[min, max]`
    /// (inclusive), via binary search — no table scan.
    pub fn rows_in_window(&self, entity: &EntityName, min: TimeInt, max: TimeInt) -> &[(TimeInt, usize)] {
        let rows = self.times_for(entity);
        let lo = rows.partition_point(|&(t, _)| t < min);
        let hi = rows.partition_point(|&(t, _)| t <= max);
        &rows[lo..hi]
    }

    /// Every indexed entity, in first-seen row order.
    #[inline]
    pub fn entity_names(&self) -> &[EntityName] {
        &self.entities
    }

    #[inline]
    pub fn contains_entity(&self, entity: &EntityName) -> bool {
        self.by_entity.contains_key(entity)
    }

    /// The observed time extent over all indexed rows
    /// ([`TimeRange::EMPTY`] if nothing was indexed).
    #[inline]
    pub fn time_extent(&self) -> TimeRange {
        self.time_extent
    }
}
