use serde_json::json;
use similar_asserts::assert_eq;

use gr_config::{
    migrate, schema_url, ChartType, ConfigError, GrapherConfig, ScaleType, StackMode,
    LATEST_SCHEMA_VERSION,
};
use gr_types::{TimeBound, TimeBounds, TimeInt};

/// A config the way it would have been persisted before any schema existed.
fn legacy_v0_config() -> serde_json::Value {
    json!({
        "type": "StackedArea",
        "title": "Energy mix",
        "selectedData": [
            { "name": "USA", "color": "#aa0000" },
            { "name": "Canada" },
        ],
        "stackMode": true,
        "yScaleType": "log",
        "map": { "variableId": 42, "region": "Europe" },
        "minTime": 1990,
        "maxTime": "latest",
    })
}

#[test]
fn full_chain_upgrades_a_v0_config() {
    let mut config = legacy_v0_config();
    migrate(&mut config).unwrap();

    assert_eq!(
        config,
        json!({
            "$schema": schema_url(LATEST_SCHEMA_VERSION),
            "type": "StackedArea",
            "title": "Energy mix",
            "selectedEntityNames": ["USA", "Canada"],
            "stackMode": "relative",
            "yAxis": { "scaleType": "log" },
            "map": { "columnSlug": "indicator-42", "region": "Europe" },
            "timeRange": "1990..latest",
        })
    );
}

#[test]
fn migration_is_idempotent_when_chained() {
    let mut once = legacy_v0_config();
    migrate(&mut once).unwrap();

    let mut twice = once.clone();
    migrate(&mut twice).unwrap();

    assert_eq!(once, twice);
}

#[test]
fn unknown_keys_survive_migration() {
    let mut config = json!({
        "title": "A chart",
        "someFutureKey": { "nested": [1, 2, 3] },
    });
    migrate(&mut config).unwrap();

    assert_eq!(config["someFutureKey"], json!({ "nested": [1, 2, 3] }));
}

#[test]
fn future_schema_version_fails_loudly() {
    let mut config = json!({ "$schema": schema_url(LATEST_SCHEMA_VERSION + 1) });
    let err = migrate(&mut config).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::SchemaTooNew { found, latest }
            if found == LATEST_SCHEMA_VERSION + 1 && latest == LATEST_SCHEMA_VERSION
    ));
}

#[test]
fn garbled_schema_url_is_an_error() {
    let mut config = json!({ "$schema": "not a schema url" });
    assert!(matches!(
        migrate(&mut config),
        Err(ConfigError::InvalidSchemaUrl(_))
    ));
}

#[test]
fn migrate_serialize_migrate_round_trips() {
    let mut config = legacy_v0_config();
    migrate(&mut config).unwrap();

    let serialized = serde_json::to_string(&config).unwrap();
    let mut reparsed: serde_json::Value = serde_json::from_str(&serialized).unwrap();
    migrate(&mut reparsed).unwrap();

    assert_eq!(config, reparsed);
}

#[test]
fn typed_model_loads_a_legacy_config() {
    let json = legacy_v0_config().to_string();
    let config = GrapherConfig::from_json(&json).unwrap();

    assert_eq!(config.chart_type, ChartType::StackedArea);
    assert_eq!(config.stack_mode, StackMode::Relative);
    assert_eq!(config.y_axis.scale_type, ScaleType::Log);
    assert_eq!(config.map.column_slug.as_deref(), Some("indicator-42"));
    assert_eq!(
        config.time_range,
        TimeBounds {
            min: TimeBound::At(TimeInt::new(1990)),
            max: TimeBound::Latest,
        }
    );
    assert_eq!(
        config
            .selected_entity_names
            .iter()
            .map(|name| name.as_str())
            .collect::<Vec<_>>(),
        vec!["USA", "Canada"]
    );
}

#[test]
fn partially_migrated_config_only_runs_later_steps() {
    // A v2 config: selectedData and boolean stackMode are already gone, but
    // scale types and times are still in their old shape.
    let mut config = json!({
        "$schema": schema_url(2),
        "selectedEntityNames": ["USA"],
        "stackMode": "absolute",
        "xScaleType": "log",
        "minTime": "earliest",
        "maxTime": 2000,
    });
    migrate(&mut config).unwrap();

    assert_eq!(
        config,
        json!({
            "$schema": schema_url(LATEST_SCHEMA_VERSION),
            "selectedEntityNames": ["USA"],
            "stackMode": "absolute",
            "xAxis": { "scaleType": "log" },
            "timeRange": "earliest..2000",
        })
    );
}

#[test]
fn default_config_serializes_compactly() {
    let config = GrapherConfig::default();
    let value = serde_json::to_value(&config).unwrap();

    // Nothing optional is emitted for an untouched config.
    assert_eq!(
        value,
        json!({
            "$schema": schema_url(LATEST_SCHEMA_VERSION),
            "type": "LineChart",
            "tab": "chart",
            "timeRange": "earliest..latest",
            "stackMode": "absolute",
            "facet": "none",
            "xAxis": { "scaleType": "linear" },
            "yAxis": { "scaleType": "linear" },
            "map": { "region": "World" },
            "colorScale": { "binningStrategy": "equalInterval", "numBins": 5 },
            "hideLegend": false,
        })
    );
}
