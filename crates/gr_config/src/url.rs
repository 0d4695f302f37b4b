use std::borrow::Cow;
use std::str::FromStr;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use gr_types::{EntityName, TimeBounds};

use crate::{FacetStrategy, MapRegion, ScaleType, StackMode, Tab};

/// Everything but unreserved characters gets percent-encoded. In particular
/// `~` is encoded, because it is our separator inside the `country` value.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.');

/// The separator between entity names in the `country` parameter.
const ENTITY_SEPARATOR: char = '~';

// ----------------------------------------------------------------------------

/// The whitelisted URL query parameters of a chart.
///
/// Each field is `None` when the parameter is absent; the encoder only emits
/// parameters that are set. The decoder ignores unrecognized keys entirely
/// (a URL written by a future engine must keep working here) and ignores
/// recognized keys with unparseable values, logging either way.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GrapherQueryParams {
    /// `time=2001` / `time=1990..latest`
    pub time: Option<TimeBounds>,

    /// `tab=chart|map|table`
    pub tab: Option<Tab>,

    /// `country=USA~Canada` — entity names or codes, `~`-separated.
    pub selection: Option<Vec<EntityName>>,

    /// `stackMode=absolute|relative`
    pub stack_mode: Option<StackMode>,

    /// `xScale=linear|log`
    pub x_scale: Option<ScaleType>,

    /// `yScale=linear|log`
    pub y_scale: Option<ScaleType>,

    /// `facet=none|entity|metric`
    pub facet: Option<FacetStrategy>,

    /// `region=World|Europe|…` (map tab)
    pub region: Option<MapRegion>,

    /// `endpointsOnly=1` — line charts: show only the first and last point.
    pub endpoints_only: Option<bool>,
}

impl GrapherQueryParams {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Parse a query string (with or without the leading `?`). Never fails:
    /// unknown keys and malformed values are skipped.
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = Self::default();

        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode(key);
            let value = decode(value);

            match key.as_ref() {
                "time" => match value.parse::<TimeBounds>() {
                    Ok(time) => params.time = Some(time),
                    Err(err) => gr_log::warn!("ignoring time={value:?}: {err}"),
                },
                "tab" => parse_into(&mut params.tab, "tab", &value),
                "country" => {
                    // Split on the separator *before* decoding each name, so
                    // names containing an encoded `~` survive.
                    let names: Vec<EntityName> = pair
                        .split_once('=')
                        .map(|(_, raw)| raw)
                        .unwrap_or("")
                        .split(ENTITY_SEPARATOR)
                        .filter(|name| !name.is_empty())
                        .map(|name| EntityName::new(decode(name).into_owned()))
                        .collect();
                    params.selection = Some(names);
                }
                "stackMode" => parse_into(&mut params.stack_mode, "stackMode", &value),
                "xScale" => parse_into(&mut params.x_scale, "xScale", &value),
                "yScale" => parse_into(&mut params.y_scale, "yScale", &value),
                "facet" => parse_into(&mut params.facet, "facet", &value),
                "region" => parse_into(&mut params.region, "region", &value),
                "endpointsOnly" => {
                    params.endpoints_only = Some(matches!(value.as_ref(), "1" | "true"));
                }
                _ => {
                    // Forward compatibility: not an error.
                    gr_log::warn_once!("ignoring unrecognized query param {:?}", key.as_ref());
                }
            }
        }

        params
    }

    /// Serialize the set parameters, in a stable order, without a leading
    /// `?`. Empty when nothing is set.
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<String> = Vec::new();

        if let Some(time) = &self.time {
            pairs.push(format!("time={}", encode(&time.to_string())));
        }
        if let Some(tab) = &self.tab {
            pairs.push(format!("tab={tab}"));
        }
        if let Some(selection) = &self.selection {
            let countries: Vec<String> = selection
                .iter()
                .map(|name| encode(name.as_str()).into_owned())
                .collect();
            pairs.push(format!("country={}", countries.join("~")));
        }
        if let Some(stack_mode) = &self.stack_mode {
            pairs.push(format!("stackMode={stack_mode}"));
        }
        if let Some(scale) = &self.x_scale {
            pairs.push(format!("xScale={scale}"));
        }
        if let Some(scale) = &self.y_scale {
            pairs.push(format!("yScale={scale}"));
        }
        if let Some(facet) = &self.facet {
            pairs.push(format!("facet={facet}"));
        }
        if let Some(region) = &self.region {
            pairs.push(format!("region={region}"));
        }
        if let Some(endpoints_only) = self.endpoints_only {
            pairs.push(format!(
                "endpointsOnly={}",
                if endpoints_only { "1" } else { "0" }
            ));
        }

        pairs.join("&")
    }
}

// ----------------------------------------------------------------------------

fn decode(s: &str) -> Cow<'_, str> {
    percent_decode_str(s).decode_utf8_lossy()
}

fn encode(s: &str) -> Cow<'_, str> {
    utf8_percent_encode(s, COMPONENT).into()
}

fn parse_into<T: FromStr>(slot: &mut Option<T>, key: &str, value: &str)
where
    T::Err: std::fmt::Display,
{
    match value.parse::<T>() {
        Ok(parsed) => *slot = Some(parsed),
        Err(err) => gr_log::warn!("ignoring {key}={value:?}: {err}"),
    }
}

// ----------------------------------------------------------------------------
