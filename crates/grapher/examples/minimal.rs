//! End-to-end walk through the engine: load a legacy config, deliver data,
//! read series back out, round-trip the URL state.
//!
//! Run with: `cargo run -p grapher --example minimal`

use anyhow::Result;

use grapher::{
    ChartState, Entity, EntityName, GrapherState, TimeInt, VariableData, VariableMeta, VariableRow,
};

fn main() -> Result<()> {
    grapher::log::setup_logging();

    // A config as an old CMS might have persisted it: no $schema, pre-enum
    // stack mode, old-style selection. The migration chain upgrades it.
    let legacy_config = serde_json::json!({
        "type": "LineChart",
        "title": "Widget output",
        "selectedData": [{ "name": "USA" }, { "name": "Canada" }],
        "stackMode": false,
        "minTime": 2000,
        "maxTime": "latest",
        "dimensions": [{ "property": "y", "variableId": 1 }],
    })
    .to_string();

    let mut state = GrapherState::new();
    let token = state.apply_config_json(&legacy_config)?;

    // The engine tells us what to fetch; the fetch itself is the host
    // application's business. Here, some made-up rows stand in for it.
    println!("fetching variables: {:?}", state.required_variable_ids());
    let table = grapher::IndicatorTable::from_variables(&[VariableData {
        meta: VariableMeta::bare(grapher::VariableId(1), "Widget output"),
        rows: [
            ("USA", 2000, 10.0),
            ("USA", 2001, 12.5),
            ("USA", 2002, 14.0),
            ("Canada", 2000, 4.0),
            ("Canada", 2002, 5.5),
        ]
        .into_iter()
        .map(|(entity, time, value)| VariableRow {
            entity: Entity::named(entity),
            time: TimeInt::new(time),
            value,
        })
        .collect(),
    }])?;
    state.complete_data_load(token, table);

    if let ChartState::Line(line) = state.chart_state()? {
        for series in &line.series {
            println!("{} ({}):", series.entity, series.display_name);
            for (time, value) in &series.points {
                println!("  {time}: {value}");
            }
        }
    }

    // State ↔ URL: narrow the window, switch an entity, serialize.
    state.set_time_range("2001..latest".parse()?);
    state
        .selection_mut()
        .set_selected_entities([EntityName::from("Canada")]);
    println!("share this: ?{}", state.to_query_string());

    Ok(())
}
