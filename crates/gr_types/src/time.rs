use std::str::FromStr;

// ----------------------------------------------------------------------------

/// A point in time along the dataset's time axis.
///
/// Usually a calendar year (`2005`), sometimes a day offset for daily data.
/// The engine never interprets the value beyond ordering and distance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct TimeInt(i64);

impl TimeInt {
    pub const MIN: Self = Self(i64::MIN);
    pub const MAX: Self = Self(i64::MAX);
    pub const ZERO: Self = Self(0);

    #[inline]
    pub const fn new(t: i64) -> Self {
        Self(t)
    }

    #[inline]
    pub const fn as_i64(self) -> i64 {
        self.0
    }

    /// Absolute distance to another time.
    #[inline]
    pub const fn abs_diff(self, other: Self) -> u64 {
        self.0.abs_diff(other.0)
    }

    #[inline]
    pub fn saturating_add(self, d: i64) -> Self {
        Self(self.0.saturating_add(d))
    }

    #[inline]
    pub fn saturating_sub(self, d: i64) -> Self {
        Self(self.0.saturating_sub(d))
    }
}

impl From<i64> for TimeInt {
    #[inline]
    fn from(t: i64) -> Self {
        Self(t)
    }
}

impl std::fmt::Display for TimeInt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// ----------------------------------------------------------------------------

/// An inclusive range of [`TimeInt`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct TimeRange {
    pub min: TimeInt,
    pub max: TimeInt,
}

impl TimeRange {
    /// Contains no time at all.
    pub const EMPTY: Self = Self {
        min: TimeInt::MAX,
        max: TimeInt::MIN,
    };

    /// Contains all time.
    pub const EVERYTHING: Self = Self {
        min: TimeInt::MIN,
        max: TimeInt::MAX,
    };

    #[inline]
    pub fn new(min: impl Into<TimeInt>, max: impl Into<TimeInt>) -> Self {
        Self {
            min: min.into(),
            max: max.into(),
        }
    }

    #[inline]
    pub fn point(time: impl Into<TimeInt>) -> Self {
        let time = time.into();
        Self {
            min: time,
            max: time,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.max < self.min
    }

    #[inline]
    pub fn is_point(&self) -> bool {
        self.min == self.max
    }

    #[inline]
    pub fn contains(&self, time: TimeInt) -> bool {
        self.min <= time && time <= self.max
    }

    #[inline]
    pub fn intersects(&self, other: Self) -> bool {
        self.min <= other.max && self.max >= other.min
    }

    #[inline]
    pub fn intersection(&self, other: Self) -> Option<Self> {
        self.intersects(other).then(|| Self {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        })
    }

    #[inline]
    pub fn union(&self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

// ----------------------------------------------------------------------------

/// One end of a user-requested time window.
///
/// `Earliest`/`Latest` resolve against the data actually loaded, so a saved
/// config keeps meaning "newest available" as new data arrives.
///
/// String encoding (used both in configs and in URLs):
/// `earliest` | `latest` | `<int>`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TimeBound {
    Earliest,
    #[default]
    Latest,
    At(TimeInt),
}

impl TimeBound {
    /// Resolve against the observed time extent of the data.
    #[inline]
    pub fn resolve(self, extent: TimeRange) -> TimeInt {
        match self {
            Self::Earliest => extent.min,
            Self::Latest => extent.max,
            Self::At(t) => t,
        }
    }
}

impl std::fmt::Display for TimeBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Earliest => "earliest".fmt(f),
            Self::Latest => "latest".fmt(f),
            Self::At(t) => t.fmt(f),
        }
    }
}

impl FromStr for TimeBound {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "earliest" => Ok(Self::Earliest),
            "latest" => Ok(Self::Latest),
            _ => s
                .parse::<i64>()
                .map(|t| Self::At(TimeInt::new(t)))
                .map_err(|_| TimeParseError::InvalidBound(s.to_owned())),
        }
    }
}

impl serde::Serialize for TimeBound {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Plain times serialize as numbers so configs stay natural to write.
        match self {
            Self::At(t) => t.serialize(serializer),
            Self::Earliest | Self::Latest => serializer.collect_str(self),
        }
    }
}

impl<'de> serde::Deserialize<'de> for TimeBound {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Int(i64),
            Str(String),
        }
        match Repr::deserialize(deserializer)? {
            Repr::Int(t) => Ok(Self::At(TimeInt::new(t))),
            Repr::Str(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

// ----------------------------------------------------------------------------

/// The user-requested time window of a chart: a pair of [`TimeBound`]s.
///
/// String encoding: a single bound (`2005`, `latest`) for a point in time,
/// or `<bound>..<bound>` (`1990..latest`) for a range. The default is the
/// whole extent of the data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimeBounds {
    pub min: TimeBound,
    pub max: TimeBound,
}

impl Default for TimeBounds {
    #[inline]
    fn default() -> Self {
        Self::everything()
    }
}

impl TimeBounds {
    /// Both bounds at the single given point.
    #[inline]
    pub fn point(bound: TimeBound) -> Self {
        Self {
            min: bound,
            max: bound,
        }
    }

    /// The whole extent of whatever data is loaded.
    #[inline]
    pub fn everything() -> Self {
        Self {
            min: TimeBound::Earliest,
            max: TimeBound::Latest,
        }
    }

    #[inline]
    pub fn is_point(&self) -> bool {
        self.min == self.max
    }

    /// Resolve both bounds against the observed time extent of the data.
    ///
    /// The result is normalized: if the bounds end up inverted (say,
    /// `2020..earliest` on data reaching only to 2010) they are swapped, so
    /// the returned range is never empty for a non-empty extent.
    pub fn resolve(self, extent: TimeRange) -> TimeRange {
        let mut min = self.min.resolve(extent);
        let mut max = self.max.resolve(extent);
        if max < min {
            std::mem::swap(&mut min, &mut max);
        }
        TimeRange { min, max }
    }
}

impl std::fmt::Display for TimeBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_point() {
            self.min.fmt(f)
        } else {
            write!(f, "{}..{}", self.min, self.max)
        }
    }
}

impl FromStr for TimeBounds {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((min, max)) = s.split_once("..") {
            Ok(Self {
                min: min.parse()?,
                max: max.parse()?,
            })
        } else {
            Ok(Self::point(s.parse()?))
        }
    }
}

impl serde::Serialize for TimeBounds {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for TimeBounds {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ----------------------------------------------------------------------------

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("expected `earliest`, `latest` or an integer, got {0:?}")]
    InvalidBound(String),
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn time_bounds_encoding() {
        for (s, bounds) in [
            ("2005", TimeBounds::point(TimeBound::At(TimeInt::new(2005)))),
            ("latest", TimeBounds::point(TimeBound::Latest)),
            (
                "1990..latest",
                TimeBounds {
                    min: TimeBound::At(TimeInt::new(1990)),
                    max: TimeBound::Latest,
                },
            ),
            (
                "earliest..2010",
                TimeBounds {
                    min: TimeBound::Earliest,
                    max: TimeBound::At(TimeInt::new(2010)),
                },
            ),
        ] {
            assert_eq!(s.parse::<TimeBounds>().unwrap(), bounds);
            assert_eq!(bounds.to_string(), s);
        }

        assert!("sometime".parse::<TimeBounds>().is_err());
        assert!("1990..sometime".parse::<TimeBounds>().is_err());
    }

    #[test]
    fn time_bound_serde() {
        let json = serde_json::to_value([
            TimeBound::Earliest,
            TimeBound::Latest,
            TimeBound::At(TimeInt::new(2000)),
        ])
        .unwrap();
        assert_eq!(json, serde_json::json!(["earliest", "latest", 2000]));

        let parsed: Vec<TimeBound> = serde_json::from_value(json).unwrap();
        assert_eq!(
            parsed,
            vec![
                TimeBound::Earliest,
                TimeBound::Latest,
                TimeBound::At(TimeInt::new(2000)),
            ]
        );
    }

    #[test]
    fn time_bounds_resolution() {
        let extent = TimeRange::new(1960, 2022);

        let bounds: TimeBounds = "1990..latest".parse().unwrap();
        assert_eq!(bounds.resolve(extent), TimeRange::new(1990, 2022));

        let bounds: TimeBounds = "earliest..earliest".parse().unwrap();
        assert_eq!(bounds.resolve(extent), TimeRange::point(1960));

        // Inverted bounds normalize instead of producing an empty range.
        let bounds: TimeBounds = "2040..earliest".parse().unwrap();
        assert_eq!(bounds.resolve(extent), TimeRange::new(1960, 2040));
    }
}
