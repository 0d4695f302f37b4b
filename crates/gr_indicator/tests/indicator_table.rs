use similar_asserts::assert_eq;

use gr_indicator::{
    IndicatorTable, VariableData, VariableDisplay, VariableId, VariableMeta, VariableRow,
    ORIGINAL_TIME_COLUMN,
};
use gr_types::{Entity, EntityCode, EntityId, EntityName, TimeInt};

fn rows(entity: &str, points: &[(i64, f64)]) -> Vec<VariableRow> {
    points
        .iter()
        .map(|&(time, value)| VariableRow {
            entity: Entity::named(entity),
            time: TimeInt::new(time),
            value,
        })
        .collect()
}

fn gdp() -> VariableData {
    let mut all = rows("USA", &[(2000, 10.0), (2002, 12.0)]);
    all.extend(rows("Canada", &[(2000, 20.0), (2001, 21.0), (2002, 22.0)]));
    VariableData {
        meta: VariableMeta::bare(VariableId(1), "GDP"),
        rows: all,
    }
}

#[test]
fn builds_one_row_per_entity_time_pair() {
    let table = IndicatorTable::from_variables(&[gdp()]).unwrap();

    // USA has no 2001 row of its own, Canada does; the union is 5 pairs.
    assert_eq!(table.row_count(), 5);
    assert_eq!(
        table.entities().iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
        vec!["USA", "Canada"]
    );

    let slug = table.column_slug_for(VariableId(1)).unwrap().clone();
    assert_eq!(slug.as_str(), "indicator-1");
    assert!(table.column_for(VariableId(1)).is_some());
    assert!(table.column_for(VariableId(999)).is_none());
}

#[test]
fn tolerance_scenario_prefers_earlier_on_tie() {
    // The canonical scenario: USA has 10 at 2000, nothing at 2001, 12 at
    // 2002. Requesting 2001 with tolerance 1 must resolve to the 2000 value.
    let table = IndicatorTable::from_variables(&[gdp()]).unwrap();

    let m = table
        .value_at(VariableId(1), &EntityName::from("USA"), TimeInt::new(2001), 1)
        .unwrap();
    assert_eq!((m.value, m.time), (10.0, TimeInt::new(2000)));

    // Outside the window: missing, not an error.
    assert_eq!(
        table.value_at(VariableId(1), &EntityName::from("USA"), TimeInt::new(2010), 1),
        None
    );
}

#[test]
fn conversion_factor_is_applied_once_at_construction() {
    let variable = VariableData {
        meta: VariableMeta {
            display: VariableDisplay {
                conversion_factor: Some(1000.0),
                ..Default::default()
            },
            ..VariableMeta::bare(VariableId(7), "Population")
        },
        rows: rows("USA", &[(2000, 1.5)]),
    };
    let table = IndicatorTable::from_variables(&[variable]).unwrap();

    let read = |table: &IndicatorTable| {
        table
            .value_at(VariableId(7), &EntityName::from("USA"), TimeInt::new(2000), 0)
            .unwrap()
            .value
    };

    // Converted once; repeated reads see the same value.
    assert_eq!(read(&table), 1500.0);
    assert_eq!(read(&table), 1500.0);
}

#[test]
fn partial_metadata_falls_back_to_raw_fields() {
    let variable = VariableData {
        meta: VariableMeta {
            unit: Some("tonnes".to_owned()),
            ..VariableMeta::bare(VariableId(3), "Emissions")
        },
        rows: rows("USA", &[(2000, 1.0)]),
    };
    let table = IndicatorTable::from_variables(&[variable]).unwrap();

    let column = table.column_for(VariableId(3)).unwrap();
    assert_eq!(column.def().unit.as_deref(), Some("tonnes"));
    assert_eq!(column.display_name(), "Emissions");
}

#[test]
fn display_override_beats_raw_name_and_unit() {
    let variable = VariableData {
        meta: VariableMeta {
            unit: Some("tonnes".to_owned()),
            display: VariableDisplay {
                name: Some("CO₂ emissions".to_owned()),
                unit: Some("t".to_owned()),
                ..Default::default()
            },
            ..VariableMeta::bare(VariableId(3), "co2_emissions_raw")
        },
        rows: rows("USA", &[(2000, 1.0)]),
    };
    let table = IndicatorTable::from_variables(&[variable]).unwrap();

    let column = table.column_for(VariableId(3)).unwrap();
    assert_eq!(column.display_name(), "CO₂ emissions");
    assert_eq!(column.def().unit.as_deref(), Some("t"));
}

#[test]
fn all_missing_variable_is_absent_not_an_error() {
    let empty = VariableData {
        meta: VariableMeta::bare(VariableId(2), "Nothing here"),
        rows: Vec::new(),
    };
    let table = IndicatorTable::from_variables(&[gdp(), empty]).unwrap();

    // The column exists but is reported missing, so consumers skip it.
    assert!(table.column_slug_for(VariableId(2)).is_some());
    assert!(table.column_for(VariableId(2)).is_none());
}

#[test]
fn entity_ids_and_codes_are_kept_and_backfilled() {
    let with_ids = VariableData {
        meta: VariableMeta::bare(VariableId(1), "GDP"),
        rows: vec![VariableRow {
            entity: Entity {
                name: EntityName::from("USA"),
                id: Some(EntityId(840)),
                code: Some(EntityCode::from("USA")),
            },
            time: TimeInt::new(2000),
            value: 1.0,
        }],
    };
    let name_only = VariableData {
        meta: VariableMeta::bare(VariableId(2), "Population"),
        rows: rows("USA", &[(2001, 2.0)]),
    };

    // The first variable to mention an entity wins; later variables backfill
    // what is still unknown.
    let table = IndicatorTable::from_variables(&[name_only, with_ids]).unwrap();
    let usa = &table.entities()[0];
    assert_eq!(usa.id, Some(EntityId(840)));
    assert_eq!(usa.code, Some(EntityCode::from("USA")));
}

#[test]
fn metadata_deserializes_from_the_fetch_wire_format() {
    // The minimum a fetch response may carry: id and name only.
    let meta: VariableMeta =
        serde_json::from_str(r#"{ "id": 5, "name": "Population" }"#).unwrap();
    assert_eq!(meta, VariableMeta::bare(VariableId(5), "Population"));

    // Display overrides come through when present.
    let meta: VariableMeta = serde_json::from_str(
        r#"{
            "id": 5,
            "name": "Population",
            "unit": "people",
            "display": { "shortUnit": "ppl", "conversionFactor": 1000.0 }
        }"#,
    )
    .unwrap();
    assert_eq!(meta.effective_short_unit(), Some("ppl"));
    assert_eq!(meta.display.conversion_factor, Some(1000.0));
}

#[test]
fn tolerance_matched_table_records_original_times() {
    let table = IndicatorTable::from_variables(&[gdp()]).unwrap();
    let matched = table
        .with_tolerance_matched(VariableId(1), TimeInt::new(2001), 1)
        .unwrap();

    // One row per entity that had something in the window.
    assert_eq!(matched.row_count(), 2);

    let usa = matched.rows().find(|row| {
        row.entity_name().is_some_and(|name| name.as_str() == "USA")
    });
    let usa = usa.unwrap();
    assert_eq!(usa.number("indicator-1"), Some(10.0));
    assert_eq!(usa.time(), Some(TimeInt::new(2001)));
    assert_eq!(
        usa.value(ORIGINAL_TIME_COLUMN),
        Some(gr_types::Value::Time(TimeInt::new(2000)))
    );
}
