//! Per-marker editor state.

use crate::preview::marker_line;
use crate::widget::{LatLng, MarkerHandle};
use mapfn_core::geo::format_js_number;
use mapfn_core::markers::MarkerData;
use mapfn_core::sanitize::escape_parameter_pipes;
use serde::Serialize;

/// Part of a marker line the author clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineTarget {
    #[default]
    Text,
    Lat,
    Lng,
}

/// Selection inside the description textarea, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum Caret {
    /// Not captured yet; placed after the last character when the popup opens.
    #[default]
    End,
    Range { start: usize, end: usize },
}

impl Caret {
    pub fn at(pos: usize) -> Self {
        Caret::Range {
            start: pos,
            end: pos,
        }
    }

    /// Concrete range for a textarea holding `len` characters.
    pub fn resolve(self, len: usize) -> (usize, usize) {
        match self {
            Caret::End => (len, len),
            Caret::Range { start, end } => (start.min(len), end.min(len)),
        }
    }
}

/// DOM id of the description textarea. Depends on position only, so it stays unique per map.
pub fn textarea_id(position: LatLng) -> String {
    let raw = format!(
        "gmfn_text_{}_{}",
        format_js_number(position.lat),
        format_js_number(position.lng)
    );
    let mut out = String::with_capacity(raw.len() + 8);
    for ch in raw.chars() {
        match ch {
            '+' => out.push_str("plus"),
            '-' => out.push_str("minus"),
            '.' => out.push_str("dot"),
            _ => out.push(ch),
        }
    }
    out
}

/// Result of typing into the description textarea.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    pub changed: bool,
    pub error: Option<String>,
    pub scroll_to_end: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerEditor {
    index: usize,
    handle: MarkerHandle,
    lat: f64,
    lng: f64,
    text: String,
    editing: bool,
    caret: Caret,
    focus: LineTarget,
    textarea_id: String,
}

impl MarkerEditor {
    pub fn new(index: usize, handle: MarkerHandle, data: &MarkerData) -> Self {
        let position = LatLng::new(data.lat, data.lng);
        Self {
            index,
            handle,
            lat: data.lat,
            lng: data.lng,
            text: data.content.clone(),
            editing: false,
            caret: Caret::End,
            focus: LineTarget::Text,
            textarea_id: textarea_id(position),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Called when a marker with a lower index was removed.
    pub fn reindex(&mut self, index: usize) {
        self.index = index;
    }

    pub fn handle(&self) -> MarkerHandle {
        self.handle
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    pub fn set_position(&mut self, position: LatLng) {
        self.lat = position.lat;
        self.lng = position.lng;
        self.textarea_id = textarea_id(position);
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Returns `false` when the marker already was in the requested mode.
    pub fn set_editing(&mut self, editing: bool) -> bool {
        if self.editing == editing {
            return false;
        }
        self.editing = editing;
        true
    }

    pub fn caret(&self) -> Caret {
        self.caret
    }

    pub fn focus(&self) -> LineTarget {
        self.focus
    }

    pub fn set_focus(&mut self, focus: LineTarget) {
        self.focus = focus;
    }

    pub fn textarea_id(&self) -> &str {
        &self.textarea_id
    }

    /// Preview line of this marker.
    pub fn line(&self) -> String {
        marker_line(self.lat, self.lng, &self.text)
    }

    pub fn data(&self) -> MarkerData {
        MarkerData {
            lat: self.lat,
            lng: self.lng,
            content: self.text.clone(),
        }
    }

    /// Stores typed text with top-level pipes escaped. `caret` is the selection inside the
    /// textarea as typed, before escaping.
    pub fn set_text(&mut self, typed: &str, caret: Caret) -> TextChange {
        self.caret = caret;
        let typed_len = typed.chars().count();
        let sanitized = escape_parameter_pipes(typed);
        let changed = self.text != sanitized.text;
        if changed {
            self.text = sanitized.text;
        }
        let (_, end) = caret.resolve(typed_len);
        TextChange {
            changed,
            error: if changed { sanitized.error } else { None },
            scroll_to_end: end == typed_len,
        }
    }
}
