//! The config schema migration chain.
//!
//! Every schema change ships exactly one migration step. The runner applies
//! every step above the config's declared version, in ascending order, then
//! stamps the result with the latest version — so any config ever persisted
//! keeps loading, and running the chain on an already-latest config is a
//! byte-for-byte no-op.
//!
//! Migrations work on the raw `serde_json` tree, not the typed model: keys
//! a migration doesn't touch pass through untouched, including keys this
//! engine has never heard of.

use serde_json::{Map, Value};

use crate::{ConfigError, Result};

/// The schema version newly-authored configs are stamped with.
pub const LATEST_SCHEMA_VERSION: u32 = 5;

/// The `$schema` URL for a given version.
pub fn schema_url(version: u32) -> String {
    format!("https://schemas.grapher.dev/grapher-schema.{version:03}.json")
}

/// Extract the version from a `$schema` URL.
pub fn parse_schema_url(url: &str) -> Result<u32> {
    url.strip_suffix(".json")
        .and_then(|rest| rest.rsplit('.').next())
        .and_then(|digits| digits.parse::<u32>().ok())
        .ok_or_else(|| ConfigError::InvalidSchemaUrl(url.to_owned()))
}

/// Migrate a config tree to [`LATEST_SCHEMA_VERSION`], in place.
///
/// A config without a `$schema` key is treated as version 0 (the oldest).
/// A version newer than this engine fails with
/// [`ConfigError::SchemaTooNew`]: schemas are never downgraded.
pub fn migrate(config: &mut Value) -> Result<()> {
    let obj = config.as_object_mut().ok_or(ConfigError::NotAnObject)?;

    let version = match obj.get("$schema") {
        None => 0,
        Some(Value::String(url)) => parse_schema_url(url)?,
        Some(other) => return Err(ConfigError::InvalidSchemaUrl(other.to_string())),
    };

    if version > LATEST_SCHEMA_VERSION {
        return Err(ConfigError::SchemaTooNew {
            found: version,
            latest: LATEST_SCHEMA_VERSION,
        });
    }

    if version < LATEST_SCHEMA_VERSION {
        gr_log::debug!(
            "migrating config from schema version {version} to {LATEST_SCHEMA_VERSION}"
        );
    }

    for step in (version + 1)..=LATEST_SCHEMA_VERSION {
        match step {
            1 => migrate_to_v1(obj),
            2 => migrate_to_v2(obj),
            3 => migrate_to_v3(obj),
            4 => migrate_to_v4(obj),
            5 => migrate_to_v5(obj),
            _ => unreachable!("no migration registered for schema version {step}"),
        }
    }

    obj.insert(
        "$schema".to_owned(),
        Value::String(schema_url(LATEST_SCHEMA_VERSION)),
    );
    Ok(())
}

// ----------------------------------------------------------------------------

/// v1: the `selectedData` array of entity objects becomes the plain
/// `selectedEntityNames` name list.
fn migrate_to_v1(config: &mut Map<String, Value>) {
    if let Some(Value::Array(selected)) = config.remove("selectedData") {
        let names: Vec<Value> = selected
            .iter()
            .filter_map(|entry| entry.get("name"))
            .filter(|name| name.is_string())
            .cloned()
            .collect();
        config
            .entry("selectedEntityNames")
            .or_insert(Value::Array(names));
    }
}

/// v2: `stackMode` was once a boolean ("is relative?"); it is now an enum
/// string.
fn migrate_to_v2(config: &mut Map<String, Value>) {
    if let Some(Value::Bool(relative)) = config.get("stackMode") {
        let mode = if *relative { "relative" } else { "absolute" };
        config.insert("stackMode".to_owned(), Value::String(mode.to_owned()));
    }
}

/// v3: the top-level `xScaleType`/`yScaleType` keys moved into the axis
/// objects.
fn migrate_to_v3(config: &mut Map<String, Value>) {
    for (old_key, axis_key) in [("xScaleType", "xAxis"), ("yScaleType", "yAxis")] {
        let Some(scale) = config.remove(old_key) else {
            continue;
        };
        let axis = config
            .entry(axis_key)
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(axis) = axis {
            axis.entry("scaleType").or_insert(scale);
        }
    }
}

/// v4: the map referenced its variable by raw id; it now references the
/// derived column slug.
fn migrate_to_v4(config: &mut Map<String, Value>) {
    if let Some(Value::Object(map)) = config.get_mut("map") {
        if let Some(id) = map.remove("variableId") {
            if let Some(id) = id.as_i64() {
                map.entry("columnSlug")
                    .or_insert(Value::String(format!("indicator-{id}")));
            }
        }
    }
}

/// v5: the `minTime`/`maxTime` pair becomes the single `timeRange` string
/// (`1990..latest` encoding).
fn migrate_to_v5(config: &mut Map<String, Value>) {
    let min = config.remove("minTime");
    let max = config.remove("maxTime");
    if min.is_none() && max.is_none() {
        return;
    }

    fn bound(value: Option<Value>, default: &str) -> String {
        match value {
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) => s,
            _ => default.to_owned(),
        }
    }

    let min = bound(min, "earliest");
    let max = bound(max, "latest");
    let range = if min == max {
        min
    } else {
        format!("{min}..{max}")
    };
    config.entry("timeRange").or_insert(Value::String(range));
}
