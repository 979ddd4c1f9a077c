#![forbid(unsafe_code)]

//! `mapfn` is a headless implementation of the `{{#googlemap}}` wiki map tag in Rust.
//!
//! Rendering, validation and page scanning live in `mapfn-core` and are re-exported here.
//!
//! # Features
//!
//! - `edit`: client-side map controllers (`mapfn::edit`), including the edit-mode dialog and
//!   tag preview

pub use mapfn_core::*;

#[cfg(feature = "edit")]
pub mod edit {
    pub use mapfn_edit::{
        Caret, ControllerSnapshot, EditBehavior, EditSession, EditorState, HeadlessWidget, Hint,
        HintTarget, InfoContent, LatLng, LatLngBounds, LineTarget, LinesScroll, MapController,
        MapWidget, MarkerBehavior, MarkerClick, MarkerEditor, MarkerHandle, MarkerMode, Outcome,
        Place, TagPreview, UiEvent, ViewBehavior, WidgetEvent,
    };
    pub use mapfn_edit::Error as EditError;
    pub use mapfn_edit::{behavior, controller, marker, preview, search, session, widget};

    use mapfn_core::{EmbeddedMap, Engine, Messages, PageScan};

    #[derive(Debug, thiserror::Error)]
    pub enum HydrateError {
        #[error(transparent)]
        Scan(#[from] mapfn_core::Error),
        #[error("map {index} could not be hydrated: {source}")]
        Map {
            index: usize,
            #[source]
            source: EditError,
        },
    }

    pub type Result<T> = std::result::Result<T, HydrateError>;

    /// Hydrates every map of an already scanned page, in index order.
    ///
    /// `make_widget` is called once per map, before the map is mounted on it.
    pub fn hydrate_scan<W, F>(
        scan: &PageScan,
        messages: &Messages,
        mut make_widget: F,
    ) -> Result<Vec<MapController<W>>>
    where
        W: MapWidget,
        F: FnMut(&EmbeddedMap) -> W,
    {
        let mut controllers = Vec::with_capacity(scan.maps.len());
        for map in &scan.maps {
            let widget = make_widget(map);
            let controller = MapController::hydrate(map, widget, messages.clone())
                .map_err(|source| HydrateError::Map {
                    index: map.index,
                    source,
                })?;
            controllers.push(controller);
        }
        tracing::debug!(maps = controllers.len(), bundle = ?scan.bundle, "page hydrated");
        Ok(controllers)
    }

    /// Scans rendered page HTML and hydrates every map found on it.
    pub fn hydrate_page_sync<W, F>(
        engine: &Engine,
        html: &str,
        make_widget: F,
    ) -> Result<Vec<MapController<W>>>
    where
        W: MapWidget,
        F: FnMut(&EmbeddedMap) -> W,
    {
        let scan = engine.scan_page_sync(html)?;
        hydrate_scan(&scan, &engine.messages(), make_widget)
    }

    pub async fn hydrate_page<W, F>(
        engine: &Engine,
        html: &str,
        make_widget: F,
    ) -> Result<Vec<MapController<W>>>
    where
        W: MapWidget,
        F: FnMut(&EmbeddedMap) -> W,
    {
        hydrate_page_sync(engine, html, make_widget)
    }

    /// Same as [`hydrate_page_sync`], on fresh [`HeadlessWidget`]s.
    pub fn hydrate_page_headless_sync(
        engine: &Engine,
        html: &str,
    ) -> Result<Vec<MapController<HeadlessWidget>>> {
        hydrate_page_sync(engine, html, |_| HeadlessWidget::new())
    }
}
