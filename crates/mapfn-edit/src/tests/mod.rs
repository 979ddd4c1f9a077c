use crate::{HeadlessWidget, MapController};
use mapfn_core::{
    EmbeddedMap, Engine, EscapeRenderer, Messages, PageContext, RenderContext, RenderOptions,
};

mod controller;

/// Renders one tag and reads it back the way a client would.
pub(crate) fn embedded(args: &[&str]) -> EmbeddedMap {
    let engine = Engine::new();
    let mut ctx = RenderContext::new(PageContext::new("Test page"));
    let out = engine
        .render_tag_sync(&mut ctx, args, &EscapeRenderer, RenderOptions::strict())
        .unwrap();
    let scan = engine.scan_page_sync(&out.html).unwrap();
    scan.maps.into_iter().next().unwrap()
}

pub(crate) fn hydrate(args: &[&str]) -> MapController<HeadlessWidget> {
    hydrate_on(args, HeadlessWidget::new())
}

pub(crate) fn hydrate_on(args: &[&str], widget: HeadlessWidget) -> MapController<HeadlessWidget> {
    MapController::hydrate(&embedded(args), widget, Messages::default()).unwrap()
}
