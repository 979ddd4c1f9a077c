#![forbid(unsafe_code)]

//! Client-side synchronization for `{{#googlemap}}` maps (headless).
//!
//! A [`MapController`] owns one hydrated map and its widget. Widget and dialog events are fed
//! in one at a time; in edit mode every accepted change is reflected in the live tag preview.
//! The widget is abstract ([`MapWidget`]); [`HeadlessWidget`] records calls deterministically.

pub mod behavior;
pub mod controller;
pub mod marker;
pub mod preview;
pub mod search;
pub mod session;
pub mod widget;

pub use behavior::{EditBehavior, MarkerBehavior, MarkerClick, MarkerMode, ViewBehavior};
pub use controller::{ControllerSnapshot, MapController, Outcome, UiEvent, WidgetEvent};
pub use marker::{Caret, LineTarget, MarkerEditor};
pub use preview::TagPreview;
pub use session::{EditSession, EditorState, Hint, HintTarget, LinesScroll};
pub use widget::{
    HeadlessWidget, InfoContent, LatLng, LatLngBounds, MapWidget, MarkerHandle, Place,
};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] mapfn_core::Error),

    #[error("No marker at index {index}")]
    UnknownMarker { index: usize },

    #[error("No marker with handle {}", handle.0)]
    UnknownHandle { handle: MarkerHandle },
}

/// Contract violations between the widget, the dialog and the controller. These halt the
/// current operation only.
pub(crate) fn state_desync(map: usize, message: impl Into<String>) -> Error {
    let message = message.into();
    tracing::warn!(map, %message, "map state desync");
    Error::Core(mapfn_core::Error::state_desync(message))
}

#[cfg(test)]
mod tests;
