//! Latitude / longitude validation.

use crate::error::{Error, GeoField, Result};
use regex::Regex;
use std::sync::OnceLock;

pub const LAT_MIN: f64 = -90.0;
pub const LAT_MAX: f64 = 90.0;
pub const LNG_MIN: f64 = -180.0;
pub const LNG_MAX: f64 = 180.0;

fn strict_decimal_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?$").expect("valid regex")
    })
}

/// Decimal numbers only: no surrounding whitespace, no hex (`0x1A`), no `inf`/`nan`.
pub fn is_numeric_strict(value: &str) -> bool {
    !value.is_empty() && strict_decimal_regex().is_match(value)
}

fn parse_strict(value: &str) -> Option<f64> {
    if !is_numeric_strict(value) {
        return None;
    }
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn is_valid_latitude(value: &str) -> bool {
    parse_strict(value).is_some_and(|v| (LAT_MIN..=LAT_MAX).contains(&v))
}

pub fn is_valid_longitude(value: &str) -> bool {
    parse_strict(value).is_some_and(|v| (LNG_MIN..=LNG_MAX).contains(&v))
}

pub fn is_valid_coordinate(field: GeoField, value: &str) -> bool {
    match field {
        GeoField::Lat => is_valid_latitude(value),
        GeoField::Lng => is_valid_longitude(value),
    }
}

/// A validated coordinate. The author's spelling is kept alongside the numeric value so that
/// regenerated markup does not pick up binary rounding noise (`55.7500` stays `55.7500`).
#[derive(Debug, Clone, PartialEq)]
pub struct GeoCoordinate {
    field: GeoField,
    raw: String,
    value: f64,
}

impl GeoCoordinate {
    pub fn parse(field: GeoField, raw: &str) -> Result<Self> {
        if !is_valid_coordinate(field, raw) {
            return Err(Error::geo(field, raw));
        }
        let value = parse_strict(raw).ok_or_else(|| Error::geo(field, raw))?;
        Ok(Self {
            field,
            raw: raw.to_string(),
            value,
        })
    }

    pub fn latitude(raw: &str) -> Result<Self> {
        Self::parse(GeoField::Lat, raw)
    }

    pub fn longitude(raw: &str) -> Result<Self> {
        Self::parse(GeoField::Lng, raw)
    }

    /// Builds a coordinate from a widget-reported value (e.g. a dragged marker position).
    pub fn from_degrees(field: GeoField, value: f64) -> Result<Self> {
        let raw = format_js_number(value);
        Self::parse(field, &raw)
    }

    pub fn field(&self) -> GeoField {
        self.field
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

impl std::fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Formats a number the way a browser's `Number#toString` does.
pub fn format_js_number(value: f64) -> String {
    let mut buf = ryu_js::Buffer::new();
    buf.format(value).to_string()
}

/// Formats a marker coordinate so that it is accepted again by the marker grammar, which
/// requires a decimal point (`10` becomes `10.0`) and does not allow exponents.
pub fn format_marker_coordinate(value: f64) -> String {
    let mut out = format!("{value}");
    if !out.contains('.') {
        out.push_str(".0");
    }
    out
}
