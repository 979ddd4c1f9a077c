use super::{embedded, hydrate, hydrate_on};
use crate::*;
use mapfn_core::attrs::AttrKey;
use mapfn_core::dimension::{Axis, Unit};
use mapfn_core::error::GeoField;
use mapfn_core::map::{Align, MapState};
use mapfn_core::page::EmbeddedMap;
use mapfn_core::{MapfnConfig, Messages};
use serde_json::json;

const THREE_MARKERS: [&str; 6] = [
    "lat=10",
    "lng=20",
    "edit=1",
    "10.0, 20.0 A",
    "30.0, 40.0 B",
    "50.0, 60.0 C",
];

fn handles(map: &MapController<HeadlessWidget>) -> Vec<MarkerHandle> {
    map.markers().iter().map(|m| m.handle()).collect()
}

fn preview_attr(map: &MapController<HeadlessWidget>, key: AttrKey) -> Option<String> {
    map.session()
        .unwrap()
        .preview()
        .get(key)
        .map(str::to_string)
}

fn is_desync(err: &Error) -> bool {
    matches!(err, Error::Core(mapfn_core::Error::StateDesync { .. }))
}

#[test]
fn edit_map_preview_starts_from_the_payload() {
    let map = hydrate(&THREE_MARKERS);
    assert_eq!(map.mode(), MarkerMode::Edit);
    assert_eq!(
        map.preview_text().unwrap(),
        concat!(
            "{{#googlemap:lat=10|lng=20|zoom=15|align=right|width=800px|height=600px|edit=1\n",
            "|caption=\n",
            "|10.0, 20.0 A\n",
            "|30.0, 40.0 B\n",
            "|50.0, 60.0 C\n",
            "}}"
        )
    );
    assert_eq!(map.session().unwrap().state(), EditorState::Viewing);
    assert_eq!(map.widget().markers.len(), 3);
    assert!(map.markers().iter().all(|m| !m.is_editing()));
}

#[test]
fn hydration_restores_center_size_caption_and_search_box() {
    let map = hydrate(&[
        "lat=55.7500",
        "lng=37.62",
        "zoom=4",
        "width=50%",
        "height=30em",
        "align=left",
        "searchbox=1",
        "edit=1",
        "caption=A & B",
    ]);
    let widget = map.widget();
    assert!(widget.mounted);
    assert_eq!(widget.center, LatLng::new(55.75, 37.62));
    assert_eq!(widget.zoom, 4);
    assert_eq!(widget.width().to_string(), "50%");
    assert_eq!(widget.height().to_string(), "30em");
    assert_eq!(widget.align, Align::Left);
    assert_eq!(widget.caption, "A & B");
    assert_eq!(widget.search_box_width, Some(322.0));
    assert_eq!(
        map.session().unwrap().preview().header(),
        "{{#googlemap:lat=55.7500|lng=37.62|zoom=4|align=left|width=50%|height=30em|searchbox=1|edit=1\n|caption=A & B"
    );
}

#[test]
fn unreadable_center_fails_hydration() {
    let map = EmbeddedMap {
        index: 0,
        state: MapState::from_json(r#"{"lat":"north","lng":"2","zoom":3}"#).unwrap(),
        width: Axis::Width.default_dimension(),
        height: Axis::Height.default_dimension(),
        align: Align::Right,
    };
    let err = MapController::hydrate(&map, HeadlessWidget::new(), Messages::default())
        .unwrap_err();
    assert_eq!(
        err,
        Error::Core(mapfn_core::Error::GeoValidation {
            field: GeoField::Lat,
            raw_value: "north".to_string()
        })
    );
}

#[test]
fn view_map_shows_rendered_content_and_refuses_editor_events() {
    let mut map = hydrate(&["lat=1", "lng=2", "1.0, 2.0 <b>x</b>"]);
    assert_eq!(map.mode(), MarkerMode::View);
    assert!(map.session().is_none());
    assert_eq!(map.preview_text(), None);

    let h = handles(&map)[0];
    let out = map.handle_widget_event(WidgetEvent::MarkerClick(h)).unwrap();
    assert_eq!(out, Outcome::Applied);
    assert_eq!(
        map.widget().marker(h).unwrap().info,
        Some(InfoContent::Html {
            html: "&lt;b&gt;x&lt;/b&gt;".to_string()
        })
    );

    let out = map
        .handle_widget_event(WidgetEvent::Click(LatLng::new(3.0, 4.0)))
        .unwrap();
    assert_eq!(out, Outcome::Unchanged);
    assert_eq!(map.markers().len(), 1);

    let err = map.handle_ui_event(UiEvent::CopyPreview).unwrap_err();
    assert!(is_desync(&err));
    let err = map
        .handle_widget_event(WidgetEvent::MarkerDrag {
            marker: h,
            position: LatLng::new(0.0, 0.0),
        })
        .unwrap_err();
    assert!(is_desync(&err));
}

#[test]
fn only_one_marker_is_edited_at_a_time() {
    let mut map = hydrate(&THREE_MARKERS);
    let h = handles(&map);

    map.handle_widget_event(WidgetEvent::MarkerClick(h[0]))
        .unwrap();
    assert_eq!(map.editing_marker(), Some(0));
    assert!(map.session().unwrap().is_open());
    assert_eq!(map.widget().open_info_windows(), vec![h[0]]);
    assert!(map.widget().marker(h[0]).unwrap().draggable);

    map.handle_widget_event(WidgetEvent::MarkerClick(h[2]))
        .unwrap();
    assert_eq!(map.editing_marker(), Some(2));
    assert_eq!(map.widget().open_info_windows(), vec![h[2]]);
    assert!(!map.widget().marker(h[0]).unwrap().draggable);
    assert_eq!(
        map.widget().marker(h[2]).unwrap().info,
        Some(InfoContent::Editor {
            textarea_id: "gmfn_text_50_60".to_string(),
            text: "C".to_string()
        })
    );
    assert_eq!(
        map.session().unwrap().scroll(),
        Some(LinesScroll::Begin(2))
    );

    // A second click on the edited marker puts it back to viewing.
    map.handle_widget_event(WidgetEvent::MarkerClick(h[2]))
        .unwrap();
    assert_eq!(map.editing_marker(), None);
    assert!(map.widget().open_info_windows().is_empty());
}

#[test]
fn closing_a_popup_stops_editing_its_marker() {
    let mut map = hydrate(&THREE_MARKERS);
    let h = handles(&map);
    map.handle_widget_event(WidgetEvent::MarkerClick(h[1]))
        .unwrap();
    let out = map
        .handle_widget_event(WidgetEvent::InfoWindowClosed(h[1]))
        .unwrap();
    assert_eq!(out, Outcome::Applied);
    assert_eq!(map.editing_marker(), None);
    assert!(!map.widget().marker(h[1]).unwrap().draggable);
}

#[test]
fn removing_a_marker_reindexes_the_later_ones() {
    let mut map = hydrate(&THREE_MARKERS);
    let h = handles(&map);

    map.handle_ui_event(UiEvent::MarkerLineClick {
        index: 1,
        target: LineTarget::Text,
    })
    .unwrap();
    assert_eq!(map.editing_marker(), Some(1));

    let out = map
        .handle_ui_event(UiEvent::RemoveMarker { index: 1 })
        .unwrap();
    assert_eq!(out, Outcome::Applied);
    assert_eq!(map.markers().len(), 2);
    assert_eq!(map.editing_marker(), None);
    assert!(map.widget().marker(h[1]).is_none());
    assert!(map.widget().open_info_windows().is_empty());

    // Former marker 2 now answers to index 1; index 2 is vacant.
    let moved = &map.markers()[1];
    assert_eq!(moved.index(), 1);
    assert_eq!(moved.handle(), h[2]);
    assert_eq!(moved.text(), "C");
    assert_eq!(map.markers()[0].index(), 0);
    assert_eq!(
        map.handle_ui_event(UiEvent::RemoveMarker { index: 2 }),
        Err(Error::UnknownMarker { index: 2 })
    );

    map.handle_ui_event(UiEvent::MarkerLineClick {
        index: 1,
        target: LineTarget::Lat,
    })
    .unwrap();
    assert_eq!(map.markers()[1].focus(), LineTarget::Lat);
    map.handle_ui_event(UiEvent::MarkerCoordinate {
        index: 1,
        field: GeoField::Lat,
        raw: "12.5".to_string(),
    })
    .unwrap();
    assert_eq!(
        map.widget().marker(h[2]).unwrap().position,
        LatLng::new(12.5, 60.0)
    );
    assert_eq!(map.markers()[0].position(), LatLng::new(10.0, 20.0));

    map.handle_widget_event(WidgetEvent::MarkerDragEnd {
        marker: h[0],
        position: LatLng::new(11.0, 21.0),
    })
    .unwrap();
    assert!(
        map.preview_text()
            .unwrap()
            .ends_with("\n|11.0, 21.0 A\n|12.5, 60.0 C\n}}")
    );
}

#[test]
fn hints_follow_their_marker_when_an_earlier_one_is_removed() {
    let mut map = hydrate(&THREE_MARKERS);
    let h = handles(&map);
    map.handle_widget_event(WidgetEvent::MarkerClick(h[2]))
        .unwrap();
    map.handle_ui_event(UiEvent::MarkerText {
        index: 2,
        text: "[[C|".to_string(),
        caret: Caret::End,
    })
    .unwrap();
    assert!(
        map.session()
            .unwrap()
            .hint(HintTarget::MarkerLine { index: 2 })
            .is_some()
    );

    map.handle_ui_event(UiEvent::RemoveMarker { index: 0 })
        .unwrap();
    let session = map.session().unwrap();
    assert!(session.hint(HintTarget::MarkerLine { index: 1 }).is_some());
    assert!(session.hint(HintTarget::MarkerLine { index: 2 }).is_none());
    assert_eq!(map.editing_marker(), Some(1));
}

#[test]
fn marker_text_is_sanitized_and_scrolls_to_the_end() {
    let mut map = hydrate(&THREE_MARKERS);
    let h = handles(&map);

    let err = map
        .handle_ui_event(UiEvent::MarkerText {
            index: 0,
            text: "x".to_string(),
            caret: Caret::End,
        })
        .unwrap_err();
    assert!(is_desync(&err));

    map.handle_widget_event(WidgetEvent::MarkerClick(h[0]))
        .unwrap();
    let out = map
        .handle_ui_event(UiEvent::MarkerText {
            index: 0,
            text: "A | b".to_string(),
            caret: Caret::End,
        })
        .unwrap();
    assert_eq!(out, Outcome::Applied);
    assert_eq!(map.markers()[0].text(), "A &#124; b");
    assert_eq!(map.markers()[0].line(), "|10.0, 20.0 A &#124; b");
    assert_eq!(map.session().unwrap().scroll(), Some(LinesScroll::End(0)));

    let out = map
        .handle_ui_event(UiEvent::MarkerText {
            index: 0,
            text: "A | b".to_string(),
            caret: Caret::at(1),
        })
        .unwrap();
    assert_eq!(out, Outcome::Unchanged);
}

#[test]
fn invalid_marker_coordinate_keeps_the_old_position() {
    let mut map = hydrate(&THREE_MARKERS);
    let h = handles(&map);
    map.handle_widget_event(WidgetEvent::MarkerClick(h[0]))
        .unwrap();

    let out = map
        .handle_ui_event(UiEvent::MarkerCoordinate {
            index: 0,
            field: GeoField::Lng,
            raw: "181".to_string(),
        })
        .unwrap();
    let Outcome::Rejected(hint) = out else {
        panic!("expected a rejection, got {out:?}");
    };
    assert_eq!(hint.message, "Invalid or omitted value of longitude: 181");
    assert_eq!(
        hint.target,
        HintTarget::MarkerCoordinate {
            index: 0,
            field: GeoField::Lng
        }
    );
    assert_eq!(map.markers()[0].position(), LatLng::new(10.0, 20.0));

    map.handle_ui_event(UiEvent::MarkerCoordinate {
        index: 0,
        field: GeoField::Lat,
        raw: "-45.125".to_string(),
    })
    .unwrap();
    assert_eq!(map.markers()[0].textarea_id(), "gmfn_text_minus45dot125_20");
    assert_eq!(
        map.widget().marker(h[0]).unwrap().position,
        LatLng::new(-45.125, 20.0)
    );
    // Leaving edit mode drops the hint of the coordinate inputs.
    map.handle_widget_event(WidgetEvent::MarkerClick(h[0]))
        .unwrap();
    assert_eq!(map.session().unwrap().hints().count(), 0);
}

#[test]
fn closing_the_dialog_or_copying_forces_markers_back_to_viewing() {
    let mut map = hydrate(&THREE_MARKERS);
    let h = handles(&map);

    map.handle_widget_event(WidgetEvent::MarkerClick(h[1]))
        .unwrap();
    let out = map.handle_ui_event(UiEvent::CopyPreview).unwrap();
    assert_eq!(out, Outcome::Applied);
    assert_eq!(map.editing_marker(), None);
    assert_eq!(
        map.handle_ui_event(UiEvent::CopyPreview).unwrap(),
        Outcome::Unchanged
    );

    map.handle_widget_event(WidgetEvent::MarkerClick(h[2]))
        .unwrap();
    map.handle_ui_event(UiEvent::DialogClosed).unwrap();
    assert_eq!(map.editing_marker(), None);
    assert!(map.widget().open_info_windows().is_empty());
    assert_eq!(map.session().unwrap().state(), EditorState::Viewing);
}

#[test]
fn map_click_adds_a_marker_and_opens_it() {
    let mut map = hydrate(&["lat=1", "lng=2", "edit=1"]);
    let out = map
        .handle_widget_event(WidgetEvent::Click(LatLng::new(1.5, 2.5)))
        .unwrap();
    assert_eq!(out, Outcome::Applied);
    assert_eq!(map.markers().len(), 1);
    assert_eq!(map.editing_marker(), Some(0));
    assert_eq!(map.widget().center, LatLng::new(1.5, 2.5));

    let session = map.session().unwrap();
    assert!(session.is_open());
    assert_eq!(session.center_input(GeoField::Lat), "1.5");
    // Recentering alone does not touch the preview.
    assert_eq!(session.preview().get(AttrKey::Lat), Some("1"));

    let h = map.markers()[0].handle();
    assert_eq!(
        map.widget().marker(h).unwrap().info,
        Some(InfoContent::Editor {
            textarea_id: "gmfn_text_1dot5_2dot5".to_string(),
            text: String::new()
        })
    );
    assert!(map.preview_text().unwrap().ends_with("\n|1.5, 2.5 \n}}"));
}

#[test]
fn invalid_center_input_is_rejected_without_touching_the_preview() {
    let mut map = hydrate(&["lat=10", "lng=20", "edit=1"]);
    let revision = map.session().unwrap().preview().revision();

    let out = map
        .handle_ui_event(UiEvent::SetCenter {
            field: GeoField::Lat,
            raw: "91".to_string(),
        })
        .unwrap();
    let Outcome::Rejected(hint) = out else {
        panic!("expected a rejection, got {out:?}");
    };
    assert_eq!(hint.message, "Invalid or omitted value of latitude: 91");
    let session = map.session().unwrap();
    assert_eq!(session.preview().revision(), revision);
    assert_eq!(session.center_input(GeoField::Lat), "10");
    assert!(
        session
            .hint(HintTarget::Center {
                field: GeoField::Lat
            })
            .is_some()
    );

    let out = map
        .handle_ui_event(UiEvent::SetCenter {
            field: GeoField::Lat,
            raw: "45.5".to_string(),
        })
        .unwrap();
    assert_eq!(out, Outcome::Applied);
    assert_eq!(preview_attr(&map, AttrKey::Lat).as_deref(), Some("45.5"));
    assert_eq!(map.widget().center, LatLng::new(45.5, 20.0));
    assert_eq!(map.session().unwrap().hints().count(), 0);
}

#[test]
fn hints_use_site_messages() {
    let messages = Messages::new(&MapfnConfig::from_value(json!({
        "messages": { "gmfn-error-height": "Bad height: $1" }
    })));
    let mut map = MapController::hydrate(
        &embedded(&["lat=1", "lng=2", "edit=1"]),
        HeadlessWidget::new(),
        messages,
    )
    .unwrap();
    let out = map
        .handle_ui_event(UiEvent::SetDimensionValue {
            axis: Axis::Height,
            raw: "5000".to_string(),
        })
        .unwrap();
    let Outcome::Rejected(hint) = out else {
        panic!("expected a rejection, got {out:?}");
    };
    assert_eq!(hint.message, "Bad height: 5000");
}

#[test]
fn unit_switch_converts_and_values_are_checked_against_the_new_bounds() {
    let mut map = hydrate(&["lat=1", "lng=2", "edit=1"]);

    let out = map
        .handle_ui_event(UiEvent::SetDimensionUnit {
            axis: Axis::Width,
            unit: Unit::Em,
        })
        .unwrap();
    assert_eq!(out, Outcome::Applied);
    assert_eq!(
        preview_attr(&map, AttrKey::Width).as_deref(),
        Some("66.66666666666667em")
    );
    assert_eq!(map.widget().width().to_string(), "66.66666666666667em");
    assert_eq!(map.widget().resize_count, 1);

    let out = map
        .handle_ui_event(UiEvent::SetDimensionValue {
            axis: Axis::Width,
            raw: "500".to_string(),
        })
        .unwrap();
    assert!(out.is_rejected());
    assert_eq!(
        map.session().unwrap().dimension(Axis::Width).to_string(),
        "66.66666666666667em"
    );

    let out = map
        .handle_ui_event(UiEvent::SetDimensionValue {
            axis: Axis::Width,
            raw: "100".to_string(),
        })
        .unwrap();
    assert_eq!(out, Outcome::Applied);
    assert_eq!(preview_attr(&map, AttrKey::Width).as_deref(), Some("100em"));
    assert_eq!(
        map.handle_ui_event(UiEvent::SetDimensionValue {
            axis: Axis::Width,
            raw: "100".to_string(),
        })
        .unwrap(),
        Outcome::Unchanged
    );

    let err = map
        .handle_ui_event(UiEvent::SetDimensionUnit {
            axis: Axis::Height,
            unit: Unit::Percent,
        })
        .unwrap_err();
    assert!(is_desync(&err));
    assert_eq!(preview_attr(&map, AttrKey::Height).as_deref(), Some("600px"));
}

#[test]
fn border_resize_keeps_the_units_current_when_it_fires() {
    let mut map = hydrate(&["lat=1", "lng=2", "edit=1", "width=50%"]);
    map.handle_ui_event(UiEvent::ToggleResizable(true)).unwrap();
    assert!(map.widget().resizable);
    map.handle_ui_event(UiEvent::SetDimensionUnit {
        axis: Axis::Height,
        unit: Unit::Em,
    })
    .unwrap();
    assert_eq!(preview_attr(&map, AttrKey::Height).as_deref(), Some("50em"));

    let out = map
        .handle_widget_event(WidgetEvent::ResizeStop {
            width_px: 640.0,
            height_px: 240.0,
        })
        .unwrap();
    assert_eq!(out, Outcome::Applied);
    assert_eq!(preview_attr(&map, AttrKey::Width).as_deref(), Some("640px"));
    assert_eq!(preview_attr(&map, AttrKey::Height).as_deref(), Some("20em"));
    assert_eq!(map.widget().height().to_string(), "20em");
    assert_eq!(map.widget().resize_count, 2);
}

#[test]
fn center_changes_reach_the_preview_only_while_tracking() {
    let mut map = hydrate(&["lat=1", "lng=2", "edit=1"]);
    let moved = LatLng::new(10.25, -3.5);

    let out = map
        .handle_widget_event(WidgetEvent::CenterChanged(moved))
        .unwrap();
    assert_eq!(out, Outcome::Unchanged);
    assert_eq!(preview_attr(&map, AttrKey::Lat).as_deref(), Some("1"));

    map.handle_ui_event(UiEvent::ToggleCenterTracking(true))
        .unwrap();
    let out = map
        .handle_widget_event(WidgetEvent::CenterChanged(moved))
        .unwrap();
    assert_eq!(out, Outcome::Applied);
    assert_eq!(preview_attr(&map, AttrKey::Lat).as_deref(), Some("10.25"));
    assert_eq!(preview_attr(&map, AttrKey::Lng).as_deref(), Some("-3.5"));
    assert_eq!(
        map.session().unwrap().center_input(GeoField::Lng),
        "-3.5"
    );
}

#[test]
fn search_box_toggle_and_places() {
    let mut map = hydrate_on(
        &["lat=1", "lng=2", "edit=1", "width=500px"],
        HeadlessWidget::new().with_control_widths(vec![80.0, 100.0]),
    );
    assert!(!map.has_search_box());
    assert_eq!(
        map.handle_widget_event(WidgetEvent::PlacesChanged(Vec::new()))
            .unwrap(),
        Outcome::Unchanged
    );

    map.handle_ui_event(UiEvent::ToggleSearchBox(true)).unwrap();
    assert!(map.has_search_box());
    assert_eq!(map.widget().search_box_width, Some(220.0));
    assert_eq!(preview_attr(&map, AttrKey::SearchBox).as_deref(), Some("1"));

    let places = vec![
        Place {
            name: "Pier".to_string(),
            location: LatLng::new(10.0, 20.0),
        },
        Place {
            name: "Bridge".to_string(),
            location: LatLng::new(-5.0, 30.0),
        },
    ];
    let out = map
        .handle_widget_event(WidgetEvent::PlacesChanged(places))
        .unwrap();
    assert_eq!(out, Outcome::Applied);
    assert_eq!(map.widget().place_pins.len(), 2);
    assert_eq!(
        map.widget().fitted_bounds,
        Some(LatLngBounds {
            south_west: LatLng::new(-5.0, 20.0),
            north_east: LatLng::new(10.0, 30.0),
        })
    );

    map.handle_ui_event(UiEvent::ToggleSearchBox(false)).unwrap();
    assert!(!map.has_search_box());
    assert_eq!(map.widget().search_box_width, None);
    assert!(map.widget().place_pins.is_empty());
    assert_eq!(preview_attr(&map, AttrKey::SearchBox), None);
}

#[test]
fn view_map_search_box_is_sized_on_idle() {
    let mut map = hydrate(&["lat=1", "lng=2", "searchbox=1"]);
    assert!(map.has_search_box());
    assert_eq!(map.widget().search_box_width, Some(600.0));
    map.widget_mut().container_width_px = 300.0;
    map.widget_mut().width = mapfn_core::Dimension::parse(Axis::Width, Some("50%")).unwrap();
    let out = map.handle_widget_event(WidgetEvent::Idle).unwrap();
    assert_eq!(out, Outcome::Applied);
    assert_eq!(map.widget().search_box_width, Some(200.0));
}

#[test]
fn align_buttons_include_a_default_that_leaves_align_out() {
    let mut map = hydrate(&["lat=1", "lng=2", "edit=1", "align=left"]);
    assert_eq!(preview_attr(&map, AttrKey::Align).as_deref(), Some("left"));

    map.handle_ui_event(UiEvent::SetAlign(None)).unwrap();
    assert_eq!(preview_attr(&map, AttrKey::Align), None);
    assert_eq!(map.widget().align, Align::Right);
    assert_eq!(map.session().unwrap().align(), None);

    map.handle_ui_event(UiEvent::SetAlign(Some(Align::Left)))
        .unwrap();
    assert_eq!(preview_attr(&map, AttrKey::Align).as_deref(), Some("left"));
    assert_eq!(map.widget().align, Align::Left);
}

#[test]
fn edit_switch_controls_the_edit_attribute_and_the_dialog() {
    let mut map = hydrate(&THREE_MARKERS);
    map.handle_widget_event(WidgetEvent::MarkerClick(handles(&map)[0]))
        .unwrap();

    let out = map.handle_ui_event(UiEvent::ToggleEdit(false)).unwrap();
    assert_eq!(out, Outcome::Applied);
    assert_eq!(preview_attr(&map, AttrKey::Edit), None);
    assert!(!map.preview_text().unwrap().contains("edit=1"));
    assert!(!map.session().unwrap().edit_switch());
    assert!(!map.session().unwrap().is_open());
    assert_eq!(map.editing_marker(), None);

    map.handle_ui_event(UiEvent::ToggleEdit(true)).unwrap();
    assert_eq!(preview_attr(&map, AttrKey::Edit).as_deref(), Some("1"));
    assert!(map.session().unwrap().is_open());
}

#[test]
fn zoom_and_caption_updates() {
    let mut map = hydrate(&["lat=1", "lng=2", "edit=1"]);

    map.handle_ui_event(UiEvent::SetZoom(40)).unwrap();
    assert_eq!(map.widget().zoom, 21);
    assert_eq!(preview_attr(&map, AttrKey::Zoom).as_deref(), Some("21"));

    map.handle_widget_event(WidgetEvent::ZoomChanged(5))
        .unwrap();
    assert_eq!(preview_attr(&map, AttrKey::Zoom).as_deref(), Some("5"));

    map.handle_ui_event(UiEvent::SetCaption("Hello\nworld".to_string()))
        .unwrap();
    assert_eq!(map.widget().caption, "Hello\nworld");
    assert!(
        map.session()
            .unwrap()
            .preview()
            .header()
            .ends_with("|edit=1\n|caption=Hello\nworld")
    );
}

#[test]
fn unknown_marker_handles_are_reported() {
    let mut map = hydrate(&["lat=1", "lng=2", "edit=1"]);
    assert_eq!(
        map.handle_widget_event(WidgetEvent::MarkerClick(MarkerHandle(99))),
        Err(Error::UnknownHandle {
            handle: MarkerHandle(99)
        })
    );
}

#[test]
fn snapshot_serializes_editor_state() {
    let mut map = hydrate(&THREE_MARKERS);
    map.handle_widget_event(WidgetEvent::MarkerClick(handles(&map)[1]))
        .unwrap();
    let value = serde_json::to_value(map.snapshot()).unwrap();
    assert_eq!(value["mode"], json!("edit"));
    assert_eq!(value["editor"], json!("editor_open"));
    assert_eq!(value["editing_marker"], json!(1));
    assert_eq!(value["markers"][2], json!({ "lat": 50.0, "lng": 60.0, "content": "C" }));
    assert!(value.get("hints").is_none());
}
