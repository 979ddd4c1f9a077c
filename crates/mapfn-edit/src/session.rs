//! Editor dialog state of one map.

use crate::preview::TagPreview;
use mapfn_core::attrs::AttrKey;
use mapfn_core::dimension::{Axis, Dimension};
use mapfn_core::error::GeoField;
use mapfn_core::map::Align;
use mapfn_core::page::EmbeddedMap;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorState {
    #[default]
    Viewing,
    EditorOpen,
}

/// Input a transient hint is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum HintTarget {
    Center { field: GeoField },
    Dimension { axis: Axis },
    MarkerCoordinate { index: usize, field: GeoField },
    MarkerLine { index: usize },
}

impl HintTarget {
    pub fn marker_index(self) -> Option<usize> {
        match self {
            HintTarget::MarkerCoordinate { index, .. } | HintTarget::MarkerLine { index } => {
                Some(index)
            }
            HintTarget::Center { .. } | HintTarget::Dimension { .. } => None,
        }
    }

    fn with_marker_index(self, index: usize) -> Self {
        match self {
            HintTarget::MarkerCoordinate { field, .. } => {
                HintTarget::MarkerCoordinate { index, field }
            }
            HintTarget::MarkerLine { .. } => HintTarget::MarkerLine { index },
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hint {
    pub target: HintTarget,
    pub message: String,
}

/// Requested scroll position of the marker lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "to", content = "index")]
pub enum LinesScroll {
    Begin(usize),
    End(usize),
}

/// Dialog inputs, switches and the tag preview of an edit-mode map.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    state: EditorState,
    preview: TagPreview,
    lat: String,
    lng: String,
    width: Dimension,
    height: Dimension,
    align: Option<Align>,
    caption: String,
    edit_switch: bool,
    center_tracking: bool,
    resizable: bool,
    hints: BTreeMap<HintTarget, String>,
    scroll: Option<LinesScroll>,
}

impl EditSession {
    pub fn new(map: &EmbeddedMap) -> Self {
        let state = &map.state;
        let caption = state.caption_text();
        let mut preview = TagPreview::new();
        preview.update([
            (AttrKey::Lat, Some(state.lat.clone())),
            (AttrKey::Lng, Some(state.lng.clone())),
            (AttrKey::Zoom, Some(state.zoom.to_string())),
            (AttrKey::Align, Some(map.align.as_str().to_string())),
            (AttrKey::Width, Some(map.width.to_string())),
            (AttrKey::Height, Some(map.height.to_string())),
            (
                AttrKey::SearchBox,
                state.has_search_box().then(|| "1".to_string()),
            ),
            (AttrKey::Caption, Some(caption.clone())),
        ]);
        Self {
            state: EditorState::Viewing,
            preview,
            lat: state.lat.clone(),
            lng: state.lng.clone(),
            width: map.width,
            height: map.height,
            align: Some(map.align),
            caption,
            edit_switch: true,
            center_tracking: false,
            resizable: false,
            hints: BTreeMap::new(),
            scroll: None,
        }
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == EditorState::EditorOpen
    }

    pub(crate) fn set_state(&mut self, state: EditorState) -> bool {
        if self.state == state {
            return false;
        }
        self.state = state;
        true
    }

    pub fn preview(&self) -> &TagPreview {
        &self.preview
    }

    pub(crate) fn preview_mut(&mut self) -> &mut TagPreview {
        &mut self.preview
    }

    /// Center inputs as shown in the dialog.
    pub fn center_input(&self, field: GeoField) -> &str {
        match field {
            GeoField::Lat => &self.lat,
            GeoField::Lng => &self.lng,
        }
    }

    pub(crate) fn set_center_input(&mut self, field: GeoField, value: String) {
        match field {
            GeoField::Lat => self.lat = value,
            GeoField::Lng => self.lng = value,
        }
    }

    pub fn dimension(&self, axis: Axis) -> Dimension {
        match axis {
            Axis::Width => self.width,
            Axis::Height => self.height,
        }
    }

    pub(crate) fn dimension_mut(&mut self, axis: Axis) -> &mut Dimension {
        match axis {
            Axis::Width => &mut self.width,
            Axis::Height => &mut self.height,
        }
    }

    /// `None` is the "default" align button.
    pub fn align(&self) -> Option<Align> {
        self.align
    }

    pub(crate) fn set_align(&mut self, align: Option<Align>) {
        self.align = align;
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub(crate) fn set_caption(&mut self, caption: &str) {
        self.caption = caption.to_string();
    }

    pub fn edit_switch(&self) -> bool {
        self.edit_switch
    }

    pub(crate) fn set_edit_switch(&mut self, on: bool) {
        self.edit_switch = on;
    }

    pub fn center_tracking(&self) -> bool {
        self.center_tracking
    }

    pub(crate) fn set_center_tracking(&mut self, on: bool) {
        self.center_tracking = on;
    }

    pub fn resizable(&self) -> bool {
        self.resizable
    }

    pub(crate) fn set_resizable(&mut self, on: bool) {
        self.resizable = on;
    }

    pub fn hint(&self, target: HintTarget) -> Option<&str> {
        self.hints.get(&target).map(String::as_str)
    }

    pub fn hints(&self) -> impl Iterator<Item = Hint> + '_ {
        self.hints.iter().map(|(target, message)| Hint {
            target: *target,
            message: message.clone(),
        })
    }

    pub(crate) fn show_hint(&mut self, hint: &Hint) {
        self.hints.insert(hint.target, hint.message.clone());
    }

    pub(crate) fn clear_hint(&mut self, target: HintTarget) {
        self.hints.remove(&target);
    }

    /// Drops the hints of a removed marker and moves the hints of later markers down by one.
    pub(crate) fn reindex_marker_hints(&mut self, removed: usize) {
        let hints = std::mem::take(&mut self.hints);
        for (target, message) in hints {
            match target.marker_index() {
                Some(i) if i == removed => {}
                Some(i) if i > removed => {
                    self.hints.insert(target.with_marker_index(i - 1), message);
                }
                _ => {
                    self.hints.insert(target, message);
                }
            }
        }
    }

    pub fn scroll(&self) -> Option<LinesScroll> {
        self.scroll
    }

    pub(crate) fn set_scroll(&mut self, scroll: LinesScroll) {
        self.scroll = Some(scroll);
    }
}
