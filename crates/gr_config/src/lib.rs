//! The chart configuration model.
//!
//! A configuration is persisted as versioned JSON (the `$schema` URL encodes
//! the version). Old configs keep working: the [`migrations`] chain upgrades
//! any supported version to the latest before the typed [`GrapherConfig`]
//! model ever sees it. Migrations run on the raw JSON tree so that keys this
//! version of the engine doesn't know about survive untouched.
//!
//! The other direction of persistence is the URL: [`GrapherQueryParams`]
//! maps a whitelisted set of query-string keys onto config overrides,
//! ignoring anything it doesn't recognize.

mod config;
mod dimension;
mod patch;
mod url;

pub mod migrations;

pub use self::config::{
    AxisConfig, BinningStrategy, ChartType, ColorScaleConfig, FacetStrategy, GrapherConfig,
    MapConfig, MapRegion, ScaleType, StackMode, Tab,
};
pub use self::dimension::{DimensionConfig, DimensionDisplay, DimensionProperty};
pub use self::migrations::{migrate, schema_url, LATEST_SCHEMA_VERSION};
pub use self::patch::merge_patch;
pub use self::url::GrapherQueryParams;

// ----------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The config was written by a newer engine; downgrading schemas is not
    /// supported, so this must fail loudly rather than skip migrations.
    #[error("config schema version {found} is newer than the latest supported ({latest})")]
    SchemaTooNew { found: u32, latest: u32 },

    #[error("invalid $schema URL: {0:?}")]
    InvalidSchemaUrl(String),

    #[error("config must be a JSON object")]
    NotAnObject,

    #[error("malformed config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
