//! Validated map model and its embedded payload.

use crate::attrs::{MapAttributes, TagInvocation, parse_tag_args};
use crate::dimension::{Axis, Dimension};
use crate::error::{Error, GeoField, Result};
use crate::geo::{GeoCoordinate, is_numeric_strict};
use crate::html::{CaptionSlot, Shell};
use crate::markers::{MarkerData, MarkerStore};
use crate::outcome::FieldOutcome;
use crate::wikitext::WikitextRenderer;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const ZOOM_MIN: u8 = 0;
pub const ZOOM_MAX: u8 = 21;
pub const ZOOM_DEFAULT: u8 = 15;

/// Placeholder reported for a missing coordinate.
const OMITTED: &str = "?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    #[default]
    Right,
}

impl Align {
    /// Only an absent value or exactly `right` floats right, like wiki image thumbnails.
    pub fn from_attr(raw: Option<&str>) -> Self {
        match raw {
            None | Some("right") => Align::Right,
            Some(_) => Align::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Right => "right",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Align::Left => "tleft",
            Align::Right => "tright",
        }
    }

    pub fn from_css_class(class: &str) -> Option<Self> {
        match class {
            "tleft" => Some(Align::Left),
            "tright" => Some(Align::Right),
            _ => None,
        }
    }
}

/// `0..=21`, defaulting to 15. Fractions are truncated after clamping.
pub fn parse_zoom(raw: Option<&str>) -> FieldOutcome<u8> {
    let Some(raw) = raw else {
        return FieldOutcome::Defaulted(ZOOM_DEFAULT);
    };
    let trimmed = raw.trim();
    if !is_numeric_strict(trimmed) {
        return FieldOutcome::Defaulted(ZOOM_DEFAULT);
    }
    // Overflowing exponents parse to +/-inf and are clamped below like any other big value.
    let Ok(value) = trimmed.parse::<f64>() else {
        return FieldOutcome::Defaulted(ZOOM_DEFAULT);
    };
    if value < f64::from(ZOOM_MIN) {
        FieldOutcome::Clamped(ZOOM_MIN)
    } else if value > f64::from(ZOOM_MAX) {
        FieldOutcome::Clamped(ZOOM_MAX)
    } else {
        FieldOutcome::Valid(value.trunc() as u8)
    }
}

/// A flag attribute is set unless it is absent, empty or `0`.
pub fn is_truthy_flag(raw: Option<&str>) -> bool {
    matches!(raw, Some(v) if !v.is_empty() && v != "0")
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapModel {
    index: usize,
    lat: GeoCoordinate,
    lng: GeoCoordinate,
    zoom: u8,
    width: Dimension,
    height: Dimension,
    align: Align,
    caption: String,
    edit_mode: bool,
    has_search_box: bool,
    markers: MarkerStore,
}

impl MapModel {
    pub fn from_args<I, S>(args: I, index: usize) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_invocation(&parse_tag_args(args), index)
    }

    /// Validates one tag. Stops at the first error in the order lat, lng, markers, width,
    /// height; the remaining attributes cannot fail.
    pub fn from_invocation(invocation: &TagInvocation, index: usize) -> Result<Self> {
        let attrs: MapAttributes = invocation.record();

        let lat = GeoCoordinate::parse(GeoField::Lat, attrs.lat.as_deref().unwrap_or(OMITTED))?;
        let lng = GeoCoordinate::parse(GeoField::Lng, attrs.lng.as_deref().unwrap_or(OMITTED))?;

        let mut markers = MarkerStore::new();
        for block in &invocation.marker_blocks {
            markers.add(block)?;
        }

        let width = resolve_dimension(Axis::Width, attrs.width.as_deref())?;
        let height = resolve_dimension(Axis::Height, attrs.height.as_deref())?;

        let zoom = match parse_zoom(attrs.zoom.as_deref()) {
            FieldOutcome::Clamped(z) => {
                tracing::debug!(raw = ?attrs.zoom, zoom = z, "zoom clamped");
                z
            }
            other => other.into_result()?,
        };

        if !attrs.extra.is_empty() {
            tracing::trace!(keys = ?attrs.extra.keys().collect::<Vec<_>>(), "ignoring unknown attributes");
        }

        Ok(Self {
            index,
            lat,
            lng,
            zoom,
            width,
            height,
            align: Align::from_attr(attrs.align.as_deref()),
            caption: attrs.caption.unwrap_or_default(),
            edit_mode: is_truthy_flag(attrs.edit.as_deref()),
            has_search_box: is_truthy_flag(attrs.searchbox.as_deref()),
            markers,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn lat(&self) -> &GeoCoordinate {
        &self.lat
    }

    pub fn lng(&self) -> &GeoCoordinate {
        &self.lng
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn width(&self) -> Dimension {
        self.width
    }

    pub fn height(&self) -> Dimension {
        self.height
    }

    pub fn align(&self) -> Align {
        self.align
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn has_search_box(&self) -> bool {
        self.has_search_box
    }

    pub fn markers(&self) -> &MarkerStore {
        &self.markers
    }

    /// Payload embedded into the page for the client controller.
    pub fn state(&self, renderer: &dyn WikitextRenderer, page: &str) -> MapState {
        let markers = self.markers.export_data(self.edit_mode, renderer, page);
        MapState {
            lat: self.lat.raw().to_string(),
            lng: self.lng.raw().to_string(),
            zoom: self.zoom,
            searchbox: self.has_search_box.then_some(1),
            edit: self.edit_mode.then_some(1),
            caption: self
                .edit_mode
                .then(|| htmlize::escape_attribute(self.caption.as_str()).into_owned()),
            markers: (!markers.is_empty()).then_some(markers),
        }
    }

    pub fn to_html(&self, renderer: &dyn WikitextRenderer, page: &str) -> Result<String> {
        let payload = self.state(renderer, page).to_json()?;
        let caption = if self.edit_mode {
            CaptionSlot::Editor
        } else if self.caption.is_empty() {
            CaptionSlot::None
        } else {
            CaptionSlot::Text(&self.caption)
        };
        let shell = Shell {
            index: self.index,
            align_class: self.align.css_class(),
            width: self.width.to_string(),
            height: self.height.to_string(),
            payload_json: &payload,
            edit: self.edit_mode,
            caption,
        };
        Ok(shell.render())
    }
}

fn resolve_dimension(axis: Axis, raw: Option<&str>) -> Result<Dimension> {
    match Dimension::parse_outcome(axis, raw) {
        FieldOutcome::Clamped(dim) => {
            tracing::debug!(%axis, raw = ?raw, value = %dim, "dimension clamped");
            Ok(dim)
        }
        FieldOutcome::Defaulted(dim) if raw.is_some() => {
            tracing::debug!(%axis, raw = ?raw, value = %dim, "malformed dimension, using default");
            Ok(dim)
        }
        other => other.into_result(),
    }
}

/// Map state as embedded in `data-gmfn`.
///
/// The center keeps the author's spelling, so it is carried as a string; flags are `1` when
/// set and omitted otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapState {
    #[serde(deserialize_with = "string_or_number")]
    pub lat: String,
    #[serde(deserialize_with = "string_or_number")]
    pub lng: String,
    #[serde(deserialize_with = "zoom_level")]
    pub zoom: u8,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "flag"
    )]
    pub searchbox: Option<u8>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "flag"
    )]
    pub edit: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markers: Option<Vec<MarkerData>>,
}

impl MapState {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::InvalidPayload {
            message: e.to_string(),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::InvalidPayload {
            message: e.to_string(),
        })
    }

    pub fn is_edit(&self) -> bool {
        self.edit.is_some()
    }

    pub fn has_search_box(&self) -> bool {
        self.searchbox.is_some()
    }

    pub fn markers(&self) -> &[MarkerData] {
        self.markers.as_deref().unwrap_or(&[])
    }

    /// Caption as typed by the author (payload captions are HTML-escaped).
    pub fn caption_text(&self) -> String {
        match &self.caption {
            Some(c) => htmlize::unescape(c.as_str()).into_owned(),
            None => String::new(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected a coordinate string or number, got {other}"
        ))),
    }
}

fn zoom_level<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let raw = match &value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => return Err(de::Error::custom(format!("expected a zoom level, got {other}"))),
    };
    parse_zoom(Some(&raw))
        .into_result()
        .map_err(de::Error::custom)
}

fn flag<'de, D>(deserializer: D) -> std::result::Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let set = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(Value::String(s)) => is_truthy_flag(Some(&s)),
        Some(_) => true,
    };
    Ok(set.then_some(1))
}
