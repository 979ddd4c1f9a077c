//! Forward-geocoding search box.

use crate::widget::{LatLngBounds, MapWidget, Place};

pub const SEARCH_BOX_MIN_WIDTH: f64 = 200.0;
pub const SEARCH_BOX_MAX_WIDTH: f64 = 600.0;

/// Width reserved for the top-right controls when they cannot be measured.
const UNMEASURED_CONTROLS_WIDTH: f64 = 178.0;
const CONTROLS_MARGIN: f64 = 100.0;

/// Canvas width minus the two built-in top-right controls, clamped to
/// `[SEARCH_BOX_MIN_WIDTH, SEARCH_BOX_MAX_WIDTH]`.
pub fn search_box_width(canvas_px: f64, controls: &[f64]) -> f64 {
    let width = match controls {
        [a, b] => canvas_px - (a + b + CONTROLS_MARGIN),
        _ => canvas_px - UNMEASURED_CONTROLS_WIDTH,
    };
    width.clamp(SEARCH_BOX_MIN_WIDTH, SEARCH_BOX_MAX_WIDTH)
}

/// Smallest box holding every place, or `None` for an empty result.
pub fn places_bounds(places: &[Place]) -> Option<LatLngBounds> {
    let (first, rest) = places.split_first()?;
    let mut bounds = LatLngBounds::from_point(first.location);
    for place in rest {
        bounds.extend(place.location);
    }
    Some(bounds)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchBox {
    active: bool,
}

impl SearchBox {
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns `false` when the box already exists.
    pub fn create(&mut self, widget: &mut dyn MapWidget) -> bool {
        if self.active {
            return false;
        }
        self.active = true;
        let width = Self::width_for(widget);
        widget.show_search_box(width);
        true
    }

    pub fn remove(&mut self, widget: &mut dyn MapWidget) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        widget.hide_search_box();
        true
    }

    pub fn resize(&self, widget: &mut dyn MapWidget) {
        if self.active {
            let width = Self::width_for(widget);
            widget.show_search_box(width);
        }
    }

    /// Replaces the pins of the previous search and fits the map to the new ones.
    pub fn show_places(&self, widget: &mut dyn MapWidget, places: &[Place]) -> bool {
        if !self.active {
            return false;
        }
        widget.show_place_pins(places);
        if let Some(bounds) = places_bounds(places) {
            widget.fit_bounds(bounds);
        }
        true
    }

    fn width_for(widget: &dyn MapWidget) -> f64 {
        search_box_width(widget.canvas_width_px(), &widget.top_right_control_widths())
    }
}
