//! The interactive map widget the controller drives.
//!
//! The widget itself (tiles, gestures, geocoding) lives outside this crate. Events flow back in
//! through [`WidgetEvent`](crate::controller::WidgetEvent).

use mapfn_core::dimension::{Axis, Dimension, Unit};
use mapfn_core::map::Align;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn from_point(p: LatLng) -> Self {
        Self {
            south_west: p,
            north_east: p,
        }
    }

    pub fn extend(&mut self, p: LatLng) {
        self.south_west.lat = self.south_west.lat.min(p.lat);
        self.south_west.lng = self.south_west.lng.min(p.lng);
        self.north_east.lat = self.north_east.lat.max(p.lat);
        self.north_east.lng = self.north_east.lng.max(p.lng);
    }

    pub fn contains(&self, p: LatLng) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&p.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&p.lng)
    }
}

/// Opaque widget-side marker id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MarkerHandle(pub u64);

/// A forward-geocoding search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    pub name: String,
    pub location: LatLng,
}

/// What a marker popup shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum InfoContent {
    /// Rendered description (view mode).
    Html { html: String },
    /// Editable description (edit mode).
    Editor { textarea_id: String, text: String },
}

pub trait MapWidget {
    fn mount(&mut self, center: LatLng, zoom: u8);

    fn center(&self) -> LatLng;
    fn set_center(&mut self, center: LatLng);
    fn zoom(&self) -> u8;
    fn set_zoom(&mut self, zoom: u8);

    fn add_marker(&mut self, position: LatLng) -> MarkerHandle;
    fn remove_marker(&mut self, marker: MarkerHandle);
    fn marker_position(&self, marker: MarkerHandle) -> Option<LatLng>;
    fn set_marker_position(&mut self, marker: MarkerHandle, position: LatLng);
    fn set_marker_draggable(&mut self, marker: MarkerHandle, draggable: bool);
    fn open_info_window(&mut self, marker: MarkerHandle, content: InfoContent);
    fn close_info_window(&mut self, marker: MarkerHandle);

    fn set_canvas_dimension(&mut self, dimension: Dimension);
    /// Rendered canvas width in pixels.
    fn canvas_width_px(&self) -> f64;
    /// Widths of the built-in top-right controls, when they can be measured.
    fn top_right_control_widths(&self) -> Vec<f64>;
    /// Tells the widget its container changed size.
    fn trigger_resize(&mut self);
    fn set_resizable(&mut self, resizable: bool);

    fn set_align(&mut self, align: Align);
    fn set_caption(&mut self, caption: &str);

    fn show_search_box(&mut self, width_px: f64);
    fn hide_search_box(&mut self);
    /// Replaces the pins of the previous search.
    fn show_place_pins(&mut self, places: &[Place]);
    fn fit_bounds(&mut self, bounds: LatLngBounds);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadlessMarker {
    pub position: LatLng,
    pub draggable: bool,
    pub info: Option<InfoContent>,
}

/// Deterministic in-memory widget. Records every call so tests and tooling can inspect the
/// resulting widget state.
#[derive(Debug, Clone, Serialize)]
pub struct HeadlessWidget {
    pub mounted: bool,
    pub center: LatLng,
    pub zoom: u8,
    pub markers: BTreeMap<MarkerHandle, HeadlessMarker>,
    #[serde(skip)]
    pub width: Dimension,
    #[serde(skip)]
    pub height: Dimension,
    /// Container width used to resolve percentage widths.
    pub container_width_px: f64,
    pub control_widths: Vec<f64>,
    pub resize_count: usize,
    pub resizable: bool,
    pub align: Align,
    pub caption: String,
    pub search_box_width: Option<f64>,
    pub place_pins: Vec<Place>,
    pub fitted_bounds: Option<LatLngBounds>,
    next_marker: u64,
}

impl Default for HeadlessWidget {
    fn default() -> Self {
        Self {
            mounted: false,
            center: LatLng::new(0.0, 0.0),
            zoom: 0,
            markers: BTreeMap::new(),
            width: Axis::Width.default_dimension(),
            height: Axis::Height.default_dimension(),
            container_width_px: 1000.0,
            control_widths: Vec::new(),
            resize_count: 0,
            resizable: false,
            align: Align::default(),
            caption: String::new(),
            search_box_width: None,
            place_pins: Vec::new(),
            fitted_bounds: None,
            next_marker: 0,
        }
    }
}

impl HeadlessWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_control_widths(mut self, widths: Vec<f64>) -> Self {
        self.control_widths = widths;
        self
    }

    pub fn marker(&self, handle: MarkerHandle) -> Option<&HeadlessMarker> {
        self.markers.get(&handle)
    }

    /// Markers with an open popup.
    pub fn open_info_windows(&self) -> Vec<MarkerHandle> {
        self.markers
            .iter()
            .filter(|(_, m)| m.info.is_some())
            .map(|(h, _)| *h)
            .collect()
    }

    pub fn width(&self) -> Dimension {
        self.width
    }

    pub fn height(&self) -> Dimension {
        self.height
    }
}

impl MapWidget for HeadlessWidget {
    fn mount(&mut self, center: LatLng, zoom: u8) {
        self.mounted = true;
        self.center = center;
        self.zoom = zoom;
    }

    fn center(&self) -> LatLng {
        self.center
    }

    fn set_center(&mut self, center: LatLng) {
        self.center = center;
    }

    fn zoom(&self) -> u8 {
        self.zoom
    }

    fn set_zoom(&mut self, zoom: u8) {
        self.zoom = zoom;
    }

    fn add_marker(&mut self, position: LatLng) -> MarkerHandle {
        let handle = MarkerHandle(self.next_marker);
        self.next_marker += 1;
        self.markers.insert(
            handle,
            HeadlessMarker {
                position,
                draggable: false,
                info: None,
            },
        );
        handle
    }

    fn remove_marker(&mut self, marker: MarkerHandle) {
        self.markers.remove(&marker);
    }

    fn marker_position(&self, marker: MarkerHandle) -> Option<LatLng> {
        self.markers.get(&marker).map(|m| m.position)
    }

    fn set_marker_position(&mut self, marker: MarkerHandle, position: LatLng) {
        if let Some(m) = self.markers.get_mut(&marker) {
            m.position = position;
        }
    }

    fn set_marker_draggable(&mut self, marker: MarkerHandle, draggable: bool) {
        if let Some(m) = self.markers.get_mut(&marker) {
            m.draggable = draggable;
        }
    }

    fn open_info_window(&mut self, marker: MarkerHandle, content: InfoContent) {
        if let Some(m) = self.markers.get_mut(&marker) {
            m.info = Some(content);
        }
    }

    fn close_info_window(&mut self, marker: MarkerHandle) {
        if let Some(m) = self.markers.get_mut(&marker) {
            m.info = None;
        }
    }

    fn set_canvas_dimension(&mut self, dimension: Dimension) {
        match dimension.axis() {
            Axis::Width => self.width = dimension,
            Axis::Height => self.height = dimension,
        }
    }

    fn canvas_width_px(&self) -> f64 {
        match self.width.unit() {
            Unit::Percent => self.container_width_px * self.width.magnitude() / 100.0,
            _ => self.width.to_pixels().unwrap_or(self.container_width_px),
        }
    }

    fn top_right_control_widths(&self) -> Vec<f64> {
        self.control_widths.clone()
    }

    fn trigger_resize(&mut self) {
        self.resize_count += 1;
    }

    fn set_resizable(&mut self, resizable: bool) {
        self.resizable = resizable;
    }

    fn set_align(&mut self, align: Align) {
        self.align = align;
    }

    fn set_caption(&mut self, caption: &str) {
        self.caption = caption.to_string();
    }

    fn show_search_box(&mut self, width_px: f64) {
        self.search_box_width = Some(width_px);
    }

    fn hide_search_box(&mut self) {
        self.search_box_width = None;
        self.place_pins.clear();
    }

    fn show_place_pins(&mut self, places: &[Place]) {
        self.place_pins = places.to_vec();
    }

    fn fit_bounds(&mut self, bounds: LatLngBounds) {
        self.fitted_bounds = Some(bounds);
    }
}
