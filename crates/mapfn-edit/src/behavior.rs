//! View and edit behavior of map markers.
//!
//! A map picks its behavior once, from the `edit` flag of its payload, and keeps it for its
//! whole lifetime.

use crate::marker::{LineTarget, MarkerEditor};
use crate::session::EditSession;
use crate::widget::{InfoContent, MapWidget};
use mapfn_core::page::EmbeddedMap;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerMode {
    View,
    Edit,
}

impl MarkerMode {
    pub fn for_map(map: &EmbeddedMap) -> Self {
        if map.state.is_edit() {
            MarkerMode::Edit
        } else {
            MarkerMode::View
        }
    }

    pub fn behavior(self) -> Box<dyn MarkerBehavior> {
        match self {
            MarkerMode::View => Box::new(ViewBehavior),
            MarkerMode::Edit => Box::new(EditBehavior),
        }
    }
}

/// What a click on a marker should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerClick {
    /// Show the description popup.
    ShowContent,
    /// Flip the marker between viewing and editing, opening or closing its popup.
    ToggleEditing,
}

pub trait MarkerBehavior: std::fmt::Debug {
    fn mode(&self) -> MarkerMode;

    /// Editor state of the map, if this behavior has one.
    fn bind_editor(&self, map: &EmbeddedMap) -> Option<EditSession>;

    /// Per-marker setup right after the marker was placed on the widget.
    fn init(&self, marker: &mut MarkerEditor);

    fn click(&self, marker: &MarkerEditor) -> MarkerClick;

    /// Opens the marker popup with content appropriate for this behavior.
    fn open_window(&self, marker: &MarkerEditor, widget: &mut dyn MapWidget);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ViewBehavior;

impl MarkerBehavior for ViewBehavior {
    fn mode(&self) -> MarkerMode {
        MarkerMode::View
    }

    fn bind_editor(&self, _map: &EmbeddedMap) -> Option<EditSession> {
        None
    }

    fn init(&self, _marker: &mut MarkerEditor) {}

    fn click(&self, _marker: &MarkerEditor) -> MarkerClick {
        MarkerClick::ShowContent
    }

    fn open_window(&self, marker: &MarkerEditor, widget: &mut dyn MapWidget) {
        widget.open_info_window(
            marker.handle(),
            InfoContent::Html {
                html: marker.text().to_string(),
            },
        );
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EditBehavior;

impl MarkerBehavior for EditBehavior {
    fn mode(&self) -> MarkerMode {
        MarkerMode::Edit
    }

    fn bind_editor(&self, map: &EmbeddedMap) -> Option<EditSession> {
        Some(EditSession::new(map))
    }

    fn init(&self, marker: &mut MarkerEditor) {
        marker.set_editing(false);
        marker.set_focus(LineTarget::Text);
    }

    fn click(&self, _marker: &MarkerEditor) -> MarkerClick {
        MarkerClick::ToggleEditing
    }

    fn open_window(&self, marker: &MarkerEditor, widget: &mut dyn MapWidget) {
        widget.open_info_window(
            marker.handle(),
            InfoContent::Editor {
                textarea_id: marker.textarea_id().to_string(),
                text: marker.text().to_string(),
            },
        );
    }
}
