use crate::markers::parse_marker_block;
use crate::*;

#[test]
fn marker_parsing_preserves_order() {
    let mut store = MarkerStore::new();
    store.add("10.0,20.0 A").unwrap();
    store.add("30.0,40.0 B").unwrap();
    assert_eq!(
        store.iter().cloned().collect::<Vec<_>>(),
        vec![
            MarkerRecord {
                lat: 10.0,
                lng: 20.0,
                text: "A".to_string()
            },
            MarkerRecord {
                lat: 30.0,
                lng: 40.0,
                text: "B".to_string()
            },
        ]
    );
}

#[test]
fn description_may_span_lines_and_is_trimmed() {
    let m = parse_marker_block("  55.75 , 37.62\nRed Square\nand more  \n").unwrap();
    assert_eq!(m.lat, 55.75);
    assert_eq!(m.lng, 37.62);
    assert_eq!(m.text, "Red Square\nand more");
}

#[test]
fn missing_description_is_reported() {
    for raw in ["10.0, 20.0", "10.0, 20.0   ", "just text", "10, 20 integer coordinates"] {
        assert_eq!(
            parse_marker_block(raw),
            Err(Error::EmptyMarkerDescription),
            "{raw:?}"
        );
    }
}

#[test]
fn out_of_range_marker_coordinates_name_the_field() {
    assert_eq!(
        parse_marker_block("95.0, 20.0 north of the pole"),
        Err(Error::GeoValidation {
            field: GeoField::Lat,
            raw_value: "95.0".to_string()
        })
    );
    assert_eq!(
        parse_marker_block("10.0, -181.5 west"),
        Err(Error::GeoValidation {
            field: GeoField::Lng,
            raw_value: "-181.5".to_string()
        })
    );
}

#[test]
fn failed_add_leaves_store_unchanged() {
    let mut store = MarkerStore::new();
    store.add("1.0, 2.0 ok").unwrap();
    assert!(store.add("bad").is_err());
    assert_eq!(store.len(), 1);
}

#[test]
fn export_renders_descriptions_only_in_view_mode() {
    let mut store = MarkerStore::new();
    store.add("1.5, 2.5 ''bold'' <b>").unwrap();
    let renderer = |text: &str, page: &str| format!("<p>{page}: {text}</p>");

    let edit = store.export_data(true, &renderer, "Main");
    assert_eq!(edit[0].content, "''bold'' <b>");

    let view = store.export_data(false, &renderer, "Main");
    assert_eq!(view[0].content, "<p>Main: ''bold'' <b></p>");
    assert_eq!((view[0].lat, view[0].lng), (1.5, 2.5));

    let escaped = store.export_data(false, &EscapeRenderer, "Main");
    assert_eq!(escaped[0].content, "''bold'' &lt;b&gt;");
}

#[test]
fn block_form_parses_back() {
    let record = MarkerRecord {
        lat: 10.0,
        lng: -3.25,
        text: "Somewhere".to_string(),
    };
    assert_eq!(record.to_block(), "10.0, -3.25 Somewhere");
    assert_eq!(parse_marker_block(&record.to_block()).unwrap(), record);
}
