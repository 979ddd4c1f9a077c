//! Keeps one hydrated map, its widget and (in edit mode) its editor dialog in sync.

use crate::behavior::{MarkerBehavior, MarkerClick, MarkerMode};
use crate::marker::{Caret, LineTarget, MarkerEditor};
use crate::search::SearchBox;
use crate::session::{EditSession, EditorState, Hint, HintTarget, LinesScroll};
use crate::widget::{LatLng, MapWidget, MarkerHandle, Place};
use crate::{Error, Result, state_desync};
use mapfn_core::attrs::AttrKey;
use mapfn_core::dimension::{Axis, Unit};
use mapfn_core::error::GeoField;
use mapfn_core::geo::{GeoCoordinate, format_js_number, is_valid_coordinate};
use mapfn_core::map::{Align, ZOOM_MAX, ZOOM_MIN};
use mapfn_core::markers::MarkerData;
use mapfn_core::messages::{MessageKey, Messages};
use mapfn_core::page::EmbeddedMap;
use serde::Serialize;

/// Events raised by the map widget.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    Idle,
    CenterChanged(LatLng),
    ZoomChanged(u8),
    /// Click on the map itself, outside any marker.
    Click(LatLng),
    MarkerClick(MarkerHandle),
    MarkerDrag {
        marker: MarkerHandle,
        position: LatLng,
    },
    MarkerDragEnd {
        marker: MarkerHandle,
        position: LatLng,
    },
    /// The author closed a popup with its close button.
    InfoWindowClosed(MarkerHandle),
    Resize {
        width_px: f64,
        height_px: f64,
    },
    ResizeStop {
        width_px: f64,
        height_px: f64,
    },
    PlacesChanged(Vec<Place>),
}

/// Events raised by the editor dialog and the tag preview.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// "Show code" switch.
    ToggleDialog(bool),
    DialogClosed,
    ToggleEdit(bool),
    ToggleSearchBox(bool),
    ToggleCenterTracking(bool),
    ToggleResizable(bool),
    SetCenter {
        field: GeoField,
        raw: String,
    },
    SetZoom(u8),
    /// `None` is the "default" button, which leaves `align` out of the tag.
    SetAlign(Option<Align>),
    SetDimensionValue {
        axis: Axis,
        raw: String,
    },
    SetDimensionUnit {
        axis: Axis,
        unit: Unit,
    },
    SetCaption(String),
    MarkerLineClick {
        index: usize,
        target: LineTarget,
    },
    RemoveMarker {
        index: usize,
    },
    MarkerText {
        index: usize,
        text: String,
        caret: Caret,
    },
    MarkerCoordinate {
        index: usize,
        field: GeoField,
        raw: String,
    },
    CopyPreview,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Unchanged,
    /// Input was refused; the prior value is kept and the hint is shown next to the input.
    Rejected(Hint),
}

impl Outcome {
    fn changed(changed: bool) -> Self {
        if changed {
            Outcome::Applied
        } else {
            Outcome::Unchanged
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }
}

/// Serializable view of a controller, for tooling and tests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerSnapshot {
    pub index: usize,
    pub mode: MarkerMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor: Option<EditorState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    pub markers: Vec<MarkerData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editing_marker: Option<usize>,
    pub search_box: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<Hint>,
}

fn preview_key(field: GeoField) -> AttrKey {
    match field {
        GeoField::Lat => AttrKey::Lat,
        GeoField::Lng => AttrKey::Lng,
    }
}

fn dimension_key(axis: Axis) -> AttrKey {
    match axis {
        Axis::Width => AttrKey::Width,
        Axis::Height => AttrKey::Height,
    }
}

fn coordinate_error(field: GeoField) -> MessageKey {
    match field {
        GeoField::Lat => MessageKey::ErrorLat,
        GeoField::Lng => MessageKey::ErrorLng,
    }
}

fn dimension_error(axis: Axis) -> MessageKey {
    match axis {
        Axis::Width => MessageKey::ErrorWidth,
        Axis::Height => MessageKey::ErrorHeight,
    }
}

fn with_field(position: LatLng, field: GeoField, value: f64) -> LatLng {
    match field {
        GeoField::Lat => LatLng::new(value, position.lng),
        GeoField::Lng => LatLng::new(position.lat, value),
    }
}

#[derive(Debug)]
pub struct MapController<W> {
    index: usize,
    widget: W,
    behavior: Box<dyn MarkerBehavior>,
    messages: Messages,
    markers: Vec<MarkerEditor>,
    search: SearchBox,
    session: Option<EditSession>,
}

impl<W: MapWidget> MapController<W> {
    /// Brings an embedded map to life on `widget`.
    pub fn hydrate(map: &EmbeddedMap, mut widget: W, messages: Messages) -> Result<Self> {
        let lat = GeoCoordinate::latitude(&map.state.lat)?;
        let lng = GeoCoordinate::longitude(&map.state.lng)?;
        widget.mount(LatLng::new(lat.value(), lng.value()), map.state.zoom);
        widget.set_canvas_dimension(map.width);
        widget.set_canvas_dimension(map.height);
        widget.set_align(map.align);

        let behavior = MarkerMode::for_map(map).behavior();
        let session = behavior.bind_editor(map);
        if let Some(session) = &session {
            widget.set_caption(session.caption());
        }

        let mut markers = Vec::with_capacity(map.state.markers().len());
        for (index, data) in map.state.markers().iter().enumerate() {
            let handle = widget.add_marker(LatLng::new(data.lat, data.lng));
            let mut marker = MarkerEditor::new(index, handle, data);
            behavior.init(&mut marker);
            markers.push(marker);
        }

        let mut search = SearchBox::default();
        if map.state.has_search_box() {
            search.create(&mut widget);
        }

        tracing::debug!(
            map = map.index,
            mode = ?behavior.mode(),
            markers = markers.len(),
            "map hydrated"
        );
        Ok(Self {
            index: map.index,
            widget,
            behavior,
            messages,
            markers,
            search,
            session,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn mode(&self) -> MarkerMode {
        self.behavior.mode()
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }

    pub fn into_widget(self) -> W {
        self.widget
    }

    pub fn markers(&self) -> &[MarkerEditor] {
        &self.markers
    }

    pub fn marker(&self, index: usize) -> Option<&MarkerEditor> {
        self.markers.get(index)
    }

    pub fn editing_marker(&self) -> Option<usize> {
        self.markers.iter().position(MarkerEditor::is_editing)
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn has_search_box(&self) -> bool {
        self.search.is_active()
    }

    /// Full tag text as currently shown in the editor dialog.
    pub fn preview_text(&self) -> Option<String> {
        self.session
            .as_ref()
            .map(|s| s.preview().text(self.markers.iter().map(MarkerEditor::line)))
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            index: self.index,
            mode: self.mode(),
            editor: self.session.as_ref().map(EditSession::state),
            preview: self.preview_text(),
            markers: self.markers.iter().map(MarkerEditor::data).collect(),
            editing_marker: self.editing_marker(),
            search_box: self.search.is_active(),
            hints: self
                .session
                .as_ref()
                .map(|s| s.hints().collect())
                .unwrap_or_default(),
        }
    }

    pub fn handle_widget_event(&mut self, event: WidgetEvent) -> Result<Outcome> {
        tracing::trace!(map = self.index, ?event, "widget event");
        match event {
            WidgetEvent::Idle => {
                self.search.resize(&mut self.widget);
                Ok(Outcome::changed(self.search.is_active()))
            }
            WidgetEvent::PlacesChanged(places) => Ok(Outcome::changed(
                self.search.show_places(&mut self.widget, &places),
            )),
            WidgetEvent::MarkerClick(handle) => {
                let index = self.marker_index(handle)?;
                self.click_marker(index)
            }
            event if self.session.is_none() => self.view_widget_event(event),
            WidgetEvent::CenterChanged(center) => {
                let tracking = self.session.as_ref().is_some_and(EditSession::center_tracking);
                if !tracking {
                    return Ok(Outcome::Unchanged);
                }
                Ok(Outcome::changed(self.view_center(center)))
            }
            WidgetEvent::ZoomChanged(zoom) => Ok(Outcome::changed(self.set_preview(
                AttrKey::Zoom,
                Some(zoom.to_string()),
            ))),
            WidgetEvent::Click(position) => self.add_marker(position),
            WidgetEvent::MarkerDrag { marker, position }
            | WidgetEvent::MarkerDragEnd { marker, position } => {
                let index = self.marker_index(marker)?;
                self.markers[index].set_position(position);
                Ok(Outcome::Applied)
            }
            WidgetEvent::InfoWindowClosed(handle) => {
                let index = self.marker_index(handle)?;
                // The popup is already closing.
                Ok(Outcome::changed(self.set_marker_editing(index, false, false)))
            }
            WidgetEvent::Resize {
                width_px,
                height_px,
            } => Ok(Outcome::changed(self.update_size(width_px, height_px))),
            WidgetEvent::ResizeStop {
                width_px,
                height_px,
            } => {
                let changed = self.update_size(width_px, height_px);
                self.widget.trigger_resize();
                self.search.resize(&mut self.widget);
                Ok(Outcome::changed(changed))
            }
        }
    }

    fn view_widget_event(&mut self, event: WidgetEvent) -> Result<Outcome> {
        match event {
            WidgetEvent::MarkerDrag { .. } | WidgetEvent::MarkerDragEnd { .. } => Err(
                state_desync(self.index, "marker dragged on a view-mode map"),
            ),
            _ => Ok(Outcome::Unchanged),
        }
    }

    pub fn handle_ui_event(&mut self, event: UiEvent) -> Result<Outcome> {
        tracing::trace!(map = self.index, ?event, "ui event");
        if self.session.is_none() {
            return Err(state_desync(self.index, "editor event on a view-mode map"));
        }
        match event {
            UiEvent::ToggleDialog(open) => Ok(Outcome::changed(self.display_dialog(open))),
            UiEvent::DialogClosed => Ok(Outcome::changed(self.display_dialog(false))),
            UiEvent::ToggleEdit(on) => {
                if let Some(session) = self.session.as_mut() {
                    session.set_edit_switch(on);
                }
                let mut changed = self.set_preview(AttrKey::Edit, on.then(|| "1".to_string()));
                changed |= self.display_dialog(on);
                Ok(Outcome::changed(changed))
            }
            UiEvent::ToggleSearchBox(on) => {
                if on {
                    self.search.create(&mut self.widget);
                } else {
                    self.search.remove(&mut self.widget);
                }
                Ok(Outcome::changed(
                    self.set_preview(AttrKey::SearchBox, on.then(|| "1".to_string())),
                ))
            }
            UiEvent::ToggleCenterTracking(on) => {
                if let Some(session) = self.session.as_mut() {
                    session.set_center_tracking(on);
                }
                if !on {
                    return Ok(Outcome::Unchanged);
                }
                let center = self.widget.center();
                Ok(Outcome::changed(self.view_center(center)))
            }
            UiEvent::ToggleResizable(on) => {
                if let Some(session) = self.session.as_mut() {
                    session.set_resizable(on);
                }
                self.widget.set_resizable(on);
                Ok(Outcome::Unchanged)
            }
            UiEvent::SetCenter { field, raw } => self.set_center_input(field, raw),
            UiEvent::SetZoom(zoom) => {
                let zoom = zoom.clamp(ZOOM_MIN, ZOOM_MAX);
                self.widget.set_zoom(zoom);
                Ok(Outcome::changed(
                    self.set_preview(AttrKey::Zoom, Some(zoom.to_string())),
                ))
            }
            UiEvent::SetAlign(align) => {
                if let Some(session) = self.session.as_mut() {
                    session.set_align(align);
                }
                self.widget.set_align(align.unwrap_or_default());
                Ok(Outcome::changed(self.set_preview(
                    AttrKey::Align,
                    align.map(|a| a.as_str().to_string()),
                )))
            }
            UiEvent::SetDimensionValue { axis, raw } => self.set_dimension_value(axis, &raw),
            UiEvent::SetDimensionUnit { axis, unit } => self.set_dimension_unit(axis, unit),
            UiEvent::SetCaption(caption) => {
                if let Some(session) = self.session.as_mut() {
                    session.set_caption(&caption);
                }
                self.widget.set_caption(&caption);
                Ok(Outcome::changed(
                    self.set_preview(AttrKey::Caption, Some(caption)),
                ))
            }
            UiEvent::MarkerLineClick { index, target } => {
                self.check_marker(index)?;
                self.markers[index].set_focus(target);
                self.click_marker(index)
            }
            UiEvent::RemoveMarker { index } => {
                self.check_marker(index)?;
                self.remove_marker(index);
                Ok(Outcome::Applied)
            }
            UiEvent::MarkerText { index, text, caret } => self.set_marker_text(index, &text, caret),
            UiEvent::MarkerCoordinate { index, field, raw } => {
                self.set_marker_coordinate(index, field, &raw)
            }
            UiEvent::CopyPreview => Ok(Outcome::changed(self.markers_edit_mode(None))),
        }
    }

    fn marker_index(&self, handle: MarkerHandle) -> Result<usize> {
        self.markers
            .iter()
            .position(|m| m.handle() == handle)
            .ok_or(Error::UnknownHandle { handle })
    }

    fn check_marker(&self, index: usize) -> Result<()> {
        if index < self.markers.len() {
            Ok(())
        } else {
            Err(Error::UnknownMarker { index })
        }
    }

    fn check_editing(&self, index: usize) -> Result<()> {
        self.check_marker(index)?;
        if self.markers[index].is_editing() {
            Ok(())
        } else {
            Err(state_desync(
                self.index,
                format!("marker {index} edited while not in edit mode"),
            ))
        }
    }

    fn set_preview(&mut self, key: AttrKey, value: Option<String>) -> bool {
        self.session
            .as_mut()
            .is_some_and(|s| s.preview_mut().set(key, value))
    }

    fn reject(&mut self, target: HintTarget, key: MessageKey, raw: &str) -> Outcome {
        let hint = Hint {
            target,
            message: self.messages.format(key, [raw]),
        };
        tracing::debug!(map = self.index, ?target, raw, "input rejected");
        if let Some(session) = self.session.as_mut() {
            session.show_hint(&hint);
        }
        Outcome::Rejected(hint)
    }

    fn clear_hint(&mut self, target: HintTarget) {
        if let Some(session) = self.session.as_mut() {
            session.clear_hint(target);
        }
    }

    /// Opens or closes the dialog. Closing first forces every marker back to viewing.
    fn display_dialog(&mut self, open: bool) -> bool {
        let mut changed = false;
        if !open {
            changed |= self.markers_edit_mode(None);
        }
        let state = if open {
            EditorState::EditorOpen
        } else {
            EditorState::Viewing
        };
        changed |= self
            .session
            .as_mut()
            .is_some_and(|s| s.set_state(state));
        changed
    }

    /// Moves the map center without touching the preview.
    fn set_map_center(&mut self, center: LatLng) {
        if let Some(session) = self.session.as_mut() {
            session.set_center_input(GeoField::Lat, format_js_number(center.lat));
            session.set_center_input(GeoField::Lng, format_js_number(center.lng));
        }
        self.widget.set_center(center);
    }

    /// Copies a widget-reported center into the inputs and the preview.
    fn view_center(&mut self, center: LatLng) -> bool {
        let lat = format_js_number(center.lat);
        let lng = format_js_number(center.lng);
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        session.set_center_input(GeoField::Lat, lat.clone());
        session.set_center_input(GeoField::Lng, lng.clone());
        session
            .preview_mut()
            .update([(AttrKey::Lat, Some(lat)), (AttrKey::Lng, Some(lng))])
    }

    fn set_center_input(&mut self, field: GeoField, raw: String) -> Result<Outcome> {
        let target = HintTarget::Center { field };
        if !is_valid_coordinate(field, &raw) {
            return Ok(self.reject(target, coordinate_error(field), &raw));
        }
        let value = GeoCoordinate::parse(field, &raw)?.value();
        self.clear_hint(target);
        let center = with_field(self.widget.center(), field, value);
        self.widget.set_center(center);
        if let Some(session) = self.session.as_mut() {
            session.set_center_input(field, raw.clone());
        }
        Ok(Outcome::changed(self.set_preview(preview_key(field), Some(raw))))
    }

    fn set_dimension_value(&mut self, axis: Axis, raw: &str) -> Result<Outcome> {
        let target = HintTarget::Dimension { axis };
        let Some(session) = self.session.as_mut() else {
            return Ok(Outcome::Unchanged);
        };
        if !session.dimension(axis).is_valid_value(raw) {
            return Ok(self.reject(target, dimension_error(axis), raw));
        }
        session.clear_hint(target);
        if !session.dimension_mut(axis).set_value(raw) {
            return Ok(Outcome::Unchanged);
        }
        self.update_dimension(axis);
        Ok(Outcome::Applied)
    }

    fn set_dimension_unit(&mut self, axis: Axis, unit: Unit) -> Result<Outcome> {
        let index = self.index;
        let Some(session) = self.session.as_mut() else {
            return Ok(Outcome::Unchanged);
        };
        let changed = session.dimension_mut(axis).set_unit(unit).map_err(|e| {
            tracing::warn!(map = index, %axis, %unit, "unit switch refused");
            Error::from(e)
        })?;
        if changed {
            self.update_dimension(axis);
        }
        Ok(Outcome::changed(changed))
    }

    /// Pushes the session dimension of `axis` to the preview and the widget.
    fn update_dimension(&mut self, axis: Axis) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let dimension = session.dimension(axis);
        session
            .preview_mut()
            .set(dimension_key(axis), Some(dimension.to_string()));
        self.widget.set_canvas_dimension(dimension);
        self.widget.trigger_resize();
    }

    /// Applies a finished or ongoing border drag. Units are taken from the current dimensions.
    fn update_size(&mut self, width_px: f64, height_px: f64) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let width = session.dimension(Axis::Width).from_pixels(width_px);
        let height = session.dimension(Axis::Height).from_pixels(height_px);
        *session.dimension_mut(Axis::Width) = width;
        *session.dimension_mut(Axis::Height) = height;
        let changed = session.preview_mut().update([
            (AttrKey::Width, Some(width.to_string())),
            (AttrKey::Height, Some(height.to_string())),
        ]);
        self.widget.set_canvas_dimension(width);
        self.widget.set_canvas_dimension(height);
        changed
    }

    fn click_marker(&mut self, index: usize) -> Result<Outcome> {
        match self.behavior.click(&self.markers[index]) {
            MarkerClick::ShowContent => {
                self.behavior
                    .open_window(&self.markers[index], &mut self.widget);
                Ok(Outcome::Applied)
            }
            MarkerClick::ToggleEditing => {
                let editing = !self.markers[index].is_editing();
                Ok(Outcome::changed(self.set_marker_editing(index, editing, true)))
            }
        }
    }

    /// Switches one marker between viewing and editing. With `set_window`, its popup follows.
    fn set_marker_editing(&mut self, index: usize, editing: bool, set_window: bool) -> bool {
        if !self.markers[index].set_editing(editing) {
            return false;
        }
        let handle = self.markers[index].handle();
        self.widget.set_marker_draggable(handle, editing);
        if !editing {
            for field in [GeoField::Lat, GeoField::Lng] {
                self.clear_hint(HintTarget::MarkerCoordinate { index, field });
            }
        }
        if set_window {
            if editing {
                self.open_marker_editor(index);
            } else {
                self.widget.close_info_window(handle);
            }
        }
        true
    }

    /// Opens the popup of marker `index`; every other marker goes back to viewing.
    fn open_marker_editor(&mut self, index: usize) {
        self.markers_edit_mode(Some(index));
        if let Some(session) = self.session.as_mut() {
            session.set_scroll(LinesScroll::Begin(index));
        }
        let handle = self.markers[index].handle();
        if let Some(position) = self.widget.marker_position(handle) {
            self.markers[index].set_position(position);
        }
        self.behavior
            .open_window(&self.markers[index], &mut self.widget);
        self.display_dialog(true);
    }

    /// Every marker except `keep` goes back to viewing. Returns whether any marker changed.
    fn markers_edit_mode(&mut self, keep: Option<usize>) -> bool {
        let mut changed = false;
        for index in 0..self.markers.len() {
            if Some(index) != keep {
                changed |= self.set_marker_editing(index, false, true);
            }
        }
        changed
    }

    fn add_marker(&mut self, position: LatLng) -> Result<Outcome> {
        self.set_map_center(position);
        let index = self.markers.len();
        let data = MarkerData {
            lat: position.lat,
            lng: position.lng,
            content: String::new(),
        };
        let handle = self.widget.add_marker(position);
        let mut marker = MarkerEditor::new(index, handle, &data);
        self.behavior.init(&mut marker);
        marker.set_focus(LineTarget::Text);
        self.markers.push(marker);
        tracing::debug!(map = self.index, marker = index, "marker added");
        self.click_marker(index)
    }

    fn remove_marker(&mut self, index: usize) {
        self.set_marker_editing(index, false, true);
        let removed = self.markers.remove(index);
        self.widget.remove_marker(removed.handle());
        for (i, marker) in self.markers.iter_mut().enumerate().skip(index) {
            marker.reindex(i);
        }
        if let Some(session) = self.session.as_mut() {
            session.reindex_marker_hints(index);
        }
        tracing::debug!(map = self.index, marker = index, "marker removed");
    }

    fn set_marker_text(&mut self, index: usize, text: &str, caret: Caret) -> Result<Outcome> {
        self.check_editing(index)?;
        let change = self.markers[index].set_text(text, caret);
        let target = HintTarget::MarkerLine { index };
        if let Some(session) = self.session.as_mut() {
            match &change.error {
                Some(message) => session.show_hint(&Hint {
                    target,
                    message: message.clone(),
                }),
                None if change.changed => session.clear_hint(target),
                None => {}
            }
            if change.scroll_to_end {
                session.set_scroll(LinesScroll::End(index));
            }
        }
        Ok(Outcome::changed(change.changed))
    }

    fn set_marker_coordinate(
        &mut self,
        index: usize,
        field: GeoField,
        raw: &str,
    ) -> Result<Outcome> {
        self.check_editing(index)?;
        let target = HintTarget::MarkerCoordinate { index, field };
        if !is_valid_coordinate(field, raw) {
            return Ok(self.reject(target, coordinate_error(field), raw));
        }
        let value = GeoCoordinate::parse(field, raw)?.value();
        self.clear_hint(target);
        let position = with_field(self.markers[index].position(), field, value);
        self.markers[index].set_position(position);
        self.widget
            .set_marker_position(self.markers[index].handle(), position);
        Ok(Outcome::Applied)
    }
}
