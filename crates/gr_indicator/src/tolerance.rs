use gr_table::{Column, Table};
use gr_types::{EntityName, TimeInt};

/// The result of a tolerance lookup: a value, and the time it was actually
/// observed at (which may differ from the requested time by up to the
/// tolerance).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToleranceMatch {
    pub value: f64,
    pub time: TimeInt,
    pub row: usize,
}

/// Find the valid value of `column` for `entity` closest to `target` within
/// `[target − tolerance, target + tolerance]`.
///
/// Tie-break: when two candidates are equidistant, the *earlier* time wins.
/// This is a deliberate, pinned policy (see the tests), not an accident of
/// iteration order.
pub(crate) fn closest_in_window(
    table: &Table,
    column: &Column,
    entity: &EntityName,
    target: TimeInt,
    tolerance: u64,
) -> Option<ToleranceMatch> {
    let index = table.entity_time_index();

    // Fast path: an exact hit needs no window walk.
    if let Some(row) = index.row_at(entity, target) {
        if let Some(value) = column.number_at(row) {
            return Some(ToleranceMatch {
                value,
                time: target,
                row,
            });
        }
    }

    if tolerance == 0 {
        return None;
    }

    let min = target.saturating_sub(tolerance as i64);
    let max = target.saturating_add(tolerance as i64);

    index
        .rows_in_window(entity, min, max)
        .iter()
        .filter_map(|&(time, row)| {
            column.number_at(row).map(|value| ToleranceMatch { value, time, row })
        })
        .min_by_key(|m| (m.time.abs_diff(target), m.time.as_i64()))
}

#[cfg(test)]
mod tests {
    use gr_table::{Column, ColumnData, Table, ENTITY_COLUMN, TIME_COLUMN};
    use gr_types::TimeInt;

    use super::*;

    fn table(times: &[i64], values: &[Option<f64>]) -> Table {
        Table::new([
            Column::new(
                ENTITY_COLUMN,
                ColumnData::categorical_from_values(times.iter().map(|_| Some("USA"))),
            ),
            Column::new(
                TIME_COLUMN,
                ColumnData::Time(times.iter().map(|&t| Some(TimeInt::new(t))).collect()),
            ),
            Column::new("value", ColumnData::Number(values.to_vec())),
        ])
        .unwrap()
    }

    fn lookup(table: &Table, target: i64, tolerance: u64) -> Option<(f64, i64)> {
        let column = table.column("value").unwrap().clone();
        closest_in_window(
            table,
            &column,
            &"USA".into(),
            TimeInt::new(target),
            tolerance,
        )
        .map(|m| (m.value, m.time.as_i64()))
    }

    #[test]
    fn exact_match_wins_over_neighbors() {
        let table = table(&[2000, 2001, 2002], &[Some(1.0), Some(2.0), Some(3.0)]);
        assert_eq!(lookup(&table, 2001, 5), Some((2.0, 2001)));
    }

    #[test]
    fn equidistant_tie_prefers_earlier_time() {
        // 2001 has no value; 2000 and 2002 are both 1 away.
        let table = table(&[2000, 2001, 2002], &[Some(10.0), None, Some(12.0)]);
        assert_eq!(lookup(&table, 2001, 1), Some((10.0, 2000)));
    }

    #[test]
    fn nearer_later_value_beats_farther_earlier_one() {
        let table = table(&[1998, 2002], &[Some(1.0), Some(2.0)]);
        assert_eq!(lookup(&table, 2001, 4), Some((2.0, 2002)));
    }

    #[test]
    fn outside_window_is_missing() {
        let table = table(&[2000, 2002], &[Some(1.0), Some(2.0)]);
        assert_eq!(lookup(&table, 2010, 3), None);
        assert_eq!(lookup(&table, 2001, 0), None);
    }

    #[test]
    fn invalid_cells_inside_window_are_skipped() {
        let table = table(&[2000, 2001, 2002], &[None, None, Some(3.0)]);
        assert_eq!(lookup(&table, 2000, 2), Some((3.0, 2002)));
    }
}
