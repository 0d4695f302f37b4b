use std::sync::Arc;

use crate::TimeInt;

/// A single cell value.
///
/// Absent cells are `Option<Value>::None` — there is deliberately no `Null`
/// variant, so missingness is always visible in the type.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    Text(Arc<str>),
    Time(TimeInt),
}

impl Value {
    #[inline]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(x) => Some(*x),
            Self::Text(_) | Self::Time(_) => None,
        }
    }

    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) | Self::Time(_) => None,
        }
    }

    #[inline]
    pub fn as_time(&self) -> Option<TimeInt> {
        match self {
            Self::Time(t) => Some(*t),
            Self::Number(_) | Self::Text(_) => None,
        }
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(x: f64) -> Self {
        Self::Number(x)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(s: &str) -> Self {
        Self::Text(s.into())
    }
}

impl From<TimeInt> for Value {
    #[inline]
    fn from(t: TimeInt) -> Self {
        Self::Time(t)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(x) => x.fmt(f),
            Self::Text(s) => s.fmt(f),
            Self::Time(t) => t.fmt(f),
        }
    }
}
