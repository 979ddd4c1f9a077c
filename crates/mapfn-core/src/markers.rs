//! Marker blocks: `<lat>, <lng> <description>`.

use crate::error::{Error, GeoField, Result};
use crate::geo::{format_marker_coordinate, is_valid_latitude, is_valid_longitude};
use crate::wikitext::WikitextRenderer;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn marker_block_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^\s*(-?\d+\.\d+)[ \t]*,[ \t]*(-?\d+\.\d+)\s+(.+?)\s*$")
            .expect("valid regex")
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerRecord {
    pub lat: f64,
    pub lng: f64,
    pub text: String,
}

impl MarkerRecord {
    /// The block form accepted by [`parse_marker_block`].
    pub fn to_block(&self) -> String {
        format!(
            "{}, {} {}",
            format_marker_coordinate(self.lat),
            format_marker_coordinate(self.lng),
            self.text
        )
    }
}

/// Parses one unnamed tag argument into a marker.
///
/// Blocks without two decimal coordinates followed by non-blank text are reported as an empty
/// description, since that is what the author most likely forgot.
pub fn parse_marker_block(raw: &str) -> Result<MarkerRecord> {
    let caps = marker_block_regex()
        .captures(raw)
        .ok_or(Error::EmptyMarkerDescription)?;
    let lat_raw = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    let lng_raw = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
    let text = caps.get(3).map(|m| m.as_str()).unwrap_or_default();

    if !is_valid_latitude(lat_raw) {
        return Err(Error::geo(GeoField::Lat, lat_raw));
    }
    if !is_valid_longitude(lng_raw) {
        return Err(Error::geo(GeoField::Lng, lng_raw));
    }
    if text.trim().is_empty() {
        return Err(Error::EmptyMarkerDescription);
    }

    let lat = lat_raw
        .parse::<f64>()
        .map_err(|_| Error::geo(GeoField::Lat, lat_raw))?;
    let lng = lng_raw
        .parse::<f64>()
        .map_err(|_| Error::geo(GeoField::Lng, lng_raw))?;
    Ok(MarkerRecord {
        lat,
        lng,
        text: text.to_string(),
    })
}

/// One marker as embedded in the page payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerData {
    pub lat: f64,
    pub lng: f64,
    pub content: String,
}

/// Markers of a single map, in encounter order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerStore {
    markers: Vec<MarkerRecord>,
}

impl MarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and appends a marker block. The store is left unchanged on error.
    pub fn add(&mut self, raw: &str) -> Result<&MarkerRecord> {
        let record = parse_marker_block(raw)?;
        self.markers.push(record);
        Ok(&self.markers[self.markers.len() - 1])
    }

    pub fn push(&mut self, record: MarkerRecord) {
        self.markers.push(record);
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MarkerRecord> {
        self.markers.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MarkerRecord> {
        self.markers.iter()
    }

    /// Payload form of every marker. In edit mode the description is kept as wikitext so the
    /// editor can regenerate the tag; otherwise it is rendered to HTML for display.
    pub fn export_data(
        &self,
        edit_mode: bool,
        renderer: &dyn WikitextRenderer,
        page: &str,
    ) -> Vec<MarkerData> {
        self.markers
            .iter()
            .map(|m| MarkerData {
                lat: m.lat,
                lng: m.lng,
                content: if edit_mode {
                    m.text.clone()
                } else {
                    renderer.render_wikitext(&m.text, page)
                },
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a MarkerStore {
    type Item = &'a MarkerRecord;
    type IntoIter = std::slice::Iter<'a, MarkerRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.markers.iter()
    }
}
