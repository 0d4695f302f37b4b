use similar_asserts::assert_eq;

use gr_chart_state::ChartState;
use gr_config::{ChartType, DimensionConfig, DimensionProperty, GrapherConfig, StackMode, Tab};
use gr_grapher::{GrapherState, LoadState};
use gr_indicator::{IndicatorTable, VariableData, VariableMeta, VariableRow};
use gr_types::{Entity, EntityName, TimeInt, VariableId};

fn sample_table() -> IndicatorTable {
    IndicatorTable::from_variables(&[VariableData {
        meta: VariableMeta::bare(VariableId(1), "GDP"),
        rows: [
            ("USA", 2000, 10.0),
            ("USA", 2001, 11.0),
            ("Canada", 2000, 20.0),
            ("Canada", 2001, 21.0),
        ]
        .into_iter()
        .map(|(entity, time, value)| VariableRow {
            entity: Entity::named(entity),
            time: TimeInt::new(time),
            value,
        })
        .collect(),
    }])
    .unwrap()
}

fn sample_config() -> GrapherConfig {
    GrapherConfig {
        title: Some("GDP over time".to_owned()),
        dimensions: vec![DimensionConfig::new(DimensionProperty::Y, VariableId(1))],
        selected_entity_names: vec![EntityName::from("USA")],
        ..Default::default()
    }
}

fn ready_state() -> GrapherState {
    let mut state = GrapherState::new();
    let token = state.apply_config(sample_config());
    assert!(state.complete_data_load(token, sample_table()));
    state
}

// ----------------------------------------------------------------------------

#[test]
fn lifecycle_walks_the_state_machine() {
    let mut state = GrapherState::new();
    assert_eq!(state.load_state(), LoadState::Uninitialized);

    state.begin_config_load();
    assert_eq!(state.load_state(), LoadState::ConfigLoading);

    let token = state.apply_config(sample_config());
    assert_eq!(state.load_state(), LoadState::DataLoading);
    assert_eq!(state.required_variable_ids(), vec![VariableId(1)]);

    assert!(state.complete_data_load(token, sample_table()));
    assert_eq!(state.load_state(), LoadState::Ready);

    // Ready cycles back to DataLoading on a re-fetch, config intact.
    let token = state.begin_data_load();
    assert_eq!(state.load_state(), LoadState::DataLoading);
    assert!(state.complete_data_load(token, sample_table()));
    assert_eq!(state.load_state(), LoadState::Ready);
}

#[test]
fn config_json_is_migrated_on_the_way_in() {
    let legacy = serde_json::json!({
        "type": "LineChart",
        "title": "GDP over time",
        "selectedData": [{ "name": "USA" }],
        "minTime": 2000,
        "maxTime": 2001,
        "dimensions": [{ "property": "y", "variableId": 1 }],
    })
    .to_string();

    let mut state = GrapherState::new();
    let token = state.apply_config_json(&legacy).unwrap();
    assert_eq!(state.load_state(), LoadState::DataLoading);
    assert_eq!(
        state.selection().selected_entity_names(),
        &[EntityName::from("USA")]
    );
    assert_eq!(state.time_range(), "2000..2001".parse().unwrap());

    assert!(state.complete_data_load(token, sample_table()));

    // A config from the future is a typed failure, not a silent skip.
    let future = format!(
        r#"{{ "$schema": "https://schemas.grapher.dev/grapher-schema.{:03}.json" }}"#,
        999
    );
    assert!(state.apply_config_json(&future).is_err());
}

#[test]
fn stale_fetch_results_are_discarded() {
    let mut state = GrapherState::new();
    let stale = state.apply_config(sample_config());

    // A newer fetch supersedes the first before it lands.
    let fresh = state.begin_data_load();

    assert!(!state.complete_data_load(stale, sample_table()));
    assert_eq!(state.load_state(), LoadState::DataLoading); // unchanged

    assert!(state.complete_data_load(fresh, sample_table()));
    assert_eq!(state.load_state(), LoadState::Ready);
}

#[test]
fn config_seeds_selection_time_and_tab() {
    let state = ready_state();
    assert_eq!(
        state.selection().selected_entity_names(),
        &[EntityName::from("USA")]
    );
    assert_eq!(state.tab(), Tab::Chart);

    // Data arrival registered the availability superset.
    assert_eq!(state.selection().num_available_entities(), 2);
}

#[test]
fn switching_chart_type_rederives_without_refetch() {
    let mut state = ready_state();

    let ChartState::Line(_) = state.chart_state().unwrap() else {
        panic!("expected the configured line chart");
    };

    state.set_chart_type(ChartType::DiscreteBar);
    let ChartState::DiscreteBar(_) = state.chart_state().unwrap() else {
        panic!("expected a discrete bar chart after the switch");
    };

    // No fetch happened: still Ready, same table.
    assert_eq!(state.load_state(), LoadState::Ready);

    // And the map tab derives from the same loaded table too.
    state.set_tab(Tab::Map);
    let ChartState::Map(_) = state.chart_state().unwrap() else {
        panic!("expected a map state on the map tab");
    };
    assert_eq!(state.load_state(), LoadState::Ready);
}

#[test]
fn every_chart_type_derives_from_the_same_loaded_table() {
    use strum::IntoEnumIterator as _;

    let mut state = ready_state();
    for chart_type in ChartType::iter() {
        state.set_chart_type(chart_type);
        let derived = state.chart_state().unwrap();
        assert_eq!(derived.chart_type(), chart_type);
    }
    // All nine types derived; never anything but pure CPU work.
    assert_eq!(state.load_state(), LoadState::Ready);
}

#[test]
fn chart_state_reflects_selection_changes() {
    let mut state = ready_state();

    let ChartState::Line(line) = state.chart_state().unwrap() else {
        panic!("expected a line state");
    };
    assert_eq!(line.series.len(), 1);

    state
        .selection_mut()
        .select_entity(EntityName::from("Canada"));

    let ChartState::Line(line) = state.chart_state().unwrap() else {
        panic!("expected a line state");
    };
    assert_eq!(
        line.series.iter().map(|s| s.entity.as_str()).collect::<Vec<_>>(),
        vec!["USA", "Canada"]
    );
}

// ----------------------------------------------------------------------------

#[test]
fn query_string_round_trips() {
    let mut state = ready_state();
    state.set_tab(Tab::Map);
    state.set_time_range("2000..2001".parse().unwrap());
    state
        .selection_mut()
        .set_selected_entities([EntityName::from("Canada"), EntityName::from("USA")]);

    let query = state.to_query_string();
    assert_eq!(query, "time=2000..2001&tab=map&country=Canada~USA");

    // A fresh state with the same config, populated from the query string,
    // lands on the same selection, time window and tab.
    let mut fresh = GrapherState::new();
    let token = fresh.apply_config(sample_config());
    fresh.complete_data_load(token, sample_table());
    fresh.apply_query_string(&query);

    assert_eq!(fresh.tab(), state.tab());
    assert_eq!(fresh.time_range(), state.time_range());
    assert_eq!(
        fresh.selection().selected_entity_names(),
        state.selection().selected_entity_names()
    );
}

#[test]
fn unchanged_state_serializes_to_an_empty_query() {
    let state = ready_state();
    assert_eq!(state.to_query_string(), "");
}

#[test]
fn unrecognized_query_params_are_ignored() {
    let mut state = ready_state();
    state.apply_query_string("tab=map&newFangledToggle=yes&stackMode=relative");

    assert_eq!(state.tab(), Tab::Map);
    assert_eq!(state.config().stack_mode, StackMode::Relative);
    // And the round trip reflects what was applied.
    assert_eq!(state.to_query_string(), "tab=map&stackMode=relative");
}

#[test]
fn summary_exposes_only_derived_fields() {
    let state = ready_state();
    let summary = state.summary();

    assert_eq!(summary.title.as_deref(), Some("GDP over time"));
    assert_eq!(
        summary.available_entities,
        vec![EntityName::from("USA"), EntityName::from("Canada")]
    );
}
