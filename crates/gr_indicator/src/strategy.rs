use ahash::HashSet;

use gr_table::{Column, ColumnData, MissingDataStrategy, Result, Table};
use gr_types::TimeInt;

/// Resolve the display name of a column, highest priority first:
/// per-dimension override, then the column's own def (which already folds
/// the per-variable display override over the raw variable name), then the
/// slug.
pub fn resolve_display_name<'a>(dimension_override: Option<&'a str>, column: &'a Column) -> &'a str {
    dimension_override.unwrap_or_else(|| column.display_name())
}

/// Forward-fill gaps in `slug`: within each entity's time-sorted series,
/// a missing value takes the last valid value before it. Rows before an
/// entity's first valid value stay missing.
///
/// The returned table's column records
/// [`MissingDataStrategy::HoldLast`] in its def.
pub fn hold_last(table: &Table, slug: &str) -> Result<Table> {
    let column = table.column(slug)?.clone();
    let index = table.entity_time_index();

    let mut values: Vec<Option<f64>> = (0..table.row_count())
        .map(|row| column.number_at(row))
        .collect();

    for entity in index.entity_names() {
        let mut last: Option<f64> = None;
        // times_for is sorted by time, which is exactly fill order.
        for &(_, row) in index.times_for(entity) {
            match values[row] {
                Some(value) => last = Some(value),
                None => values[row] = last,
            }
        }
    }

    let mut def = column.def().clone();
    def.strategy = Some(MissingDataStrategy::HoldLast);
    table.with_columns([
        Column::new(column.slug().clone(), ColumnData::Number(values)).with_def(def)
    ])
}

/// Drop every entity that is missing a valid value of `slug` at any of
/// `required_times` — the whole entity disappears from the table, not just
/// its gap rows, so a stacked chart never silently treats the gap as zero.
///
/// The returned table's column records
/// [`MissingDataStrategy::DropEntity`] in its def.
pub fn drop_entities_with_gaps(
    table: &Table,
    slug: &str,
    required_times: &[TimeInt],
) -> Result<Table> {
    let column = table.column(slug)?.clone();
    let index = table.entity_time_index();

    let keep: HashSet<_> = index
        .entity_names()
        .iter()
        .filter(|entity| {
            required_times.iter().all(|&time| {
                index
                    .row_at(entity, time)
                    .is_some_and(|row| column.number_at(row).is_some())
            })
        })
        .cloned()
        .collect();

    let filtered = table.filter(|row| row.entity_name().is_some_and(|name| keep.contains(&name)));

    let kept_column = filtered.column(slug)?;
    let mut def = kept_column.def().clone();
    def.strategy = Some(MissingDataStrategy::DropEntity);
    let kept_column = kept_column.as_ref().clone().with_def(def);
    filtered.with_columns([kept_column])
}

#[cfg(test)]
mod tests {
    use gr_table::{Column, ColumnData, ColumnDef, Table, ENTITY_COLUMN, TIME_COLUMN};
    use gr_types::EntityName;

    use super::*;

    fn table() -> Table {
        Table::new([
            Column::new(
                ENTITY_COLUMN,
                ColumnData::categorical_from_values(
                    ["USA", "USA", "USA", "Canada", "Canada", "Canada"]
                        .into_iter()
                        .map(Some),
                ),
            ),
            Column::new(
                TIME_COLUMN,
                ColumnData::Time(
                    [2000, 2001, 2002, 2000, 2001, 2002]
                        .into_iter()
                        .map(|t| Some(TimeInt::new(t)))
                        .collect(),
                ),
            ),
            Column::new(
                "value",
                ColumnData::Number(vec![
                    Some(10.0),
                    None,
                    Some(12.0),
                    Some(20.0),
                    Some(21.0),
                    Some(22.0),
                ]),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn hold_last_fills_forward_per_entity() {
        let filled = hold_last(&table(), "value").unwrap();
        let values: Vec<Option<f64>> = filled.rows().map(|row| row.number("value")).collect();
        assert_eq!(
            values,
            vec![Some(10.0), Some(10.0), Some(12.0), Some(20.0), Some(21.0), Some(22.0)]
        );
        assert_eq!(
            filled.column("value").unwrap().def().strategy,
            Some(MissingDataStrategy::HoldLast)
        );
    }

    #[test]
    fn hold_last_leaves_leading_gaps() {
        let table = Table::new([
            Column::new(
                ENTITY_COLUMN,
                ColumnData::categorical_from_values(["USA", "USA"].into_iter().map(Some)),
            ),
            Column::new(
                TIME_COLUMN,
                ColumnData::Time(vec![Some(TimeInt::new(2000)), Some(TimeInt::new(2001))]),
            ),
            Column::new("value", ColumnData::Number(vec![None, Some(1.0)])),
        ])
        .unwrap();

        let filled = hold_last(&table, "value").unwrap();
        assert_eq!(filled.column("value").unwrap().number_at(0), None);
    }

    #[test]
    fn drop_entity_removes_the_whole_entity() {
        let times: Vec<TimeInt> = [2000, 2001, 2002].into_iter().map(TimeInt::new).collect();
        let dropped = drop_entities_with_gaps(&table(), "value", &times).unwrap();

        // USA has a gap at 2001 and is gone entirely; Canada survives whole.
        assert_eq!(dropped.row_count(), 3);
        let entities: Vec<_> = dropped.rows().filter_map(|row| row.entity_name()).collect();
        assert_eq!(entities, vec![EntityName::from("Canada"); 3]);
    }

    #[test]
    fn display_name_precedence() {
        let column = Column::new("indicator-1", ColumnData::Number(vec![Some(1.0)])).with_def(
            ColumnDef {
                display_name: Some("Display override".to_owned()),
                ..Default::default()
            },
        );

        assert_eq!(resolve_display_name(None, &column), "Display override");
        assert_eq!(
            resolve_display_name(Some("Dimension override"), &column),
            "Dimension override"
        );

        let bare = Column::new("indicator-1", ColumnData::Number(vec![Some(1.0)]));
        assert_eq!(resolve_display_name(None, &bare), "indicator-1");
    }
}
