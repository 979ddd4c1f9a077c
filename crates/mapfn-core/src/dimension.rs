//! Map width / height with unit-aware bounds.
//!
//! Server-side parsing and the client-side editor share the same bounds table, so a value the
//! editor accepts always survives the next page render unchanged.

use crate::error::{Error, Result};
use crate::geo::{format_js_number, is_numeric_strict};
use crate::outcome::FieldOutcome;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

pub const PX_PER_EM: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Width,
    Height,
}

impl Axis {
    pub const ALL: [Axis; 2] = [Axis::Width, Axis::Height];

    pub fn as_str(self) -> &'static str {
        match self {
            Axis::Width => "width",
            Axis::Height => "height",
        }
    }

    pub fn default_dimension(self) -> Dimension {
        match self {
            Axis::Width => Dimension {
                axis: self,
                magnitude: 800.0,
                unit: Unit::Px,
            },
            Axis::Height => Dimension {
                axis: self,
                magnitude: 600.0,
                unit: Unit::Px,
            },
        }
    }

    /// Units in editor button order. Percentage heights depend on the parent having an explicit
    /// height, which wiki page content never has.
    pub fn units(self) -> &'static [Unit] {
        match self {
            Axis::Width => &[Unit::Px, Unit::Em, Unit::Percent],
            Axis::Height => &[Unit::Px, Unit::Em],
        }
    }

    pub fn bounds(self, unit: Unit) -> Option<Bounds> {
        let (min, max) = match (self, unit) {
            (Axis::Width, Unit::Px) => (12.0, 1920.0),
            (Axis::Width, Unit::Em) => (1.0, 1920.0 / PX_PER_EM),
            (Axis::Width, Unit::Percent) => (1.0, 100.0),
            (Axis::Height, Unit::Px) => (12.0, 1200.0),
            (Axis::Height, Unit::Em) => (1.0, 1200.0 / PX_PER_EM),
            (Axis::Height, Unit::Percent) => return None,
        };
        Some(Bounds { min, max })
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "px")]
    Px,
    #[serde(rename = "em")]
    Em,
    #[serde(rename = "%")]
    Percent,
}

impl Unit {
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Px => "px",
            Unit::Em => "em",
            Unit::Percent => "%",
        }
    }

    /// Case-sensitive: `PX` is not a unit.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "" | "px" => Some(Unit::Px),
            "em" => Some(Unit::Em),
            "%" => Some(Unit::Percent),
            _ => None,
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub fn contains(self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn clamp(self, value: f64) -> f64 {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }
}

fn dimension_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,4})(%|[A-Za-z]+|)$").expect("valid regex"))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimension {
    axis: Axis,
    magnitude: f64,
    unit: Unit,
}

impl Dimension {
    /// Builds a bounded dimension. Fails only when `unit` is not defined for `axis`.
    pub fn new(axis: Axis, magnitude: f64, unit: Unit) -> Result<Self> {
        let bounds = axis.bounds(unit).ok_or_else(|| {
            Error::state_desync(format!("no bounds for {axis} in unit {unit}"))
        })?;
        Ok(Self {
            axis,
            magnitude: bounds.clamp(magnitude),
            unit,
        })
    }

    /// Parses a tag attribute value. Malformed values fall back to the axis default, while a
    /// well-formed value in a unit the axis does not support is rejected.
    pub fn parse_outcome(axis: Axis, raw: Option<&str>) -> FieldOutcome<Dimension> {
        let Some(raw) = raw else {
            return FieldOutcome::Defaulted(axis.default_dimension());
        };
        let Some(caps) = dimension_regex().captures(raw) else {
            return FieldOutcome::Defaulted(axis.default_dimension());
        };
        let digits = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let suffix = caps.get(2).map(|m| m.as_str()).unwrap_or("");

        let Some(unit) = Unit::from_suffix(suffix) else {
            return FieldOutcome::Rejected(Error::UnsupportedUnit {
                axis,
                raw_value: raw.to_string(),
            });
        };
        let Some(bounds) = axis.bounds(unit) else {
            return FieldOutcome::Rejected(Error::UnsupportedUnit {
                axis,
                raw_value: raw.to_string(),
            });
        };
        let Ok(magnitude) = digits.parse::<f64>() else {
            return FieldOutcome::Defaulted(axis.default_dimension());
        };

        let clamped = bounds.clamp(magnitude);
        let dim = Dimension {
            axis,
            magnitude: clamped,
            unit,
        };
        if clamped != magnitude {
            FieldOutcome::Clamped(dim)
        } else {
            FieldOutcome::Valid(dim)
        }
    }

    pub fn parse(axis: Axis, raw: Option<&str>) -> Result<Dimension> {
        Self::parse_outcome(axis, raw).into_result()
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn bounds(&self) -> Bounds {
        // Construction guarantees the (axis, unit) pair has bounds.
        self.axis.bounds(self.unit).unwrap_or(Bounds {
            min: self.magnitude,
            max: self.magnitude,
        })
    }

    /// Same magnitude in `unit`, re-bounded. `px`/`em` convert at 12 px per em; anything
    /// involving `%` is carried over unchanged because the container size is unknown.
    pub fn convert(&self, unit: Unit) -> Result<Dimension> {
        if unit == self.unit {
            return Ok(*self);
        }
        let magnitude = match (self.unit, unit) {
            (Unit::Px, Unit::Em) => self.magnitude / PX_PER_EM,
            (Unit::Em, Unit::Px) => self.magnitude * PX_PER_EM,
            _ => self.magnitude,
        };
        Dimension::new(self.axis, magnitude, unit)
    }

    /// Switches units in place. Returns `false` when the unit was already current.
    pub fn set_unit(&mut self, unit: Unit) -> Result<bool> {
        if unit == self.unit {
            return Ok(false);
        }
        *self = self.convert(unit)?;
        Ok(true)
    }

    /// Whether `raw` is a number within the bounds of the current unit.
    pub fn is_valid_value(&self, raw: &str) -> bool {
        if !is_numeric_strict(raw) {
            return false;
        }
        raw.parse::<f64>()
            .is_ok_and(|v| v.is_finite() && self.bounds().contains(v))
    }

    /// Accepts `raw` as the new magnitude. Returns `true` only when the value was valid and
    /// differed from the current one.
    pub fn set_value(&mut self, raw: &str) -> bool {
        if !self.is_valid_value(raw) {
            return false;
        }
        let Ok(v) = raw.parse::<f64>() else {
            return false;
        };
        if v == self.magnitude {
            return false;
        }
        self.magnitude = v;
        true
    }

    /// Converts a rendered pixel size back into this dimension's unit. Percentages cannot be
    /// derived from a pixel size, so they become pixels.
    pub fn from_pixels(&self, px: f64) -> Dimension {
        let (magnitude, unit) = match self.unit {
            Unit::Px | Unit::Percent => (px, Unit::Px),
            Unit::Em => (px / PX_PER_EM, Unit::Em),
        };
        let bounds = self.axis.bounds(unit).unwrap_or(Bounds {
            min: magnitude,
            max: magnitude,
        });
        Dimension {
            axis: self.axis,
            magnitude: bounds.clamp(magnitude),
            unit,
        }
    }

    /// Rendered size in pixels, when it can be known without a container.
    pub fn to_pixels(&self) -> Option<f64> {
        match self.unit {
            Unit::Px => Some(self.magnitude),
            Unit::Em => Some(self.magnitude * PX_PER_EM),
            Unit::Percent => None,
        }
    }

    pub fn magnitude_string(&self) -> String {
        format_js_number(self.magnitude)
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.magnitude_string(), self.unit)
    }
}
