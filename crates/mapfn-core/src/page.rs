//! Scanning rendered page HTML for embedded maps.

use crate::dimension::{Axis, Dimension};
use crate::error::{Error, Result};
use crate::html::{CANVAS_CLASS, CANVAS_ID_PREFIX, EDIT_ATTR, PAYLOAD_ATTR};
use crate::map::{Align, MapState};
use lol_html::{RewriteStrSettings, element, rewrite_str};
use regex::Regex;
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::sync::OnceLock;

fn canvas_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"^{CANVAS_ID_PREFIX}(\d+)$")).expect("valid regex")
    })
}

/// Client code a page needs to bring its maps to life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientBundle {
    View,
    Edit,
}

impl ClientBundle {
    pub fn module_name(self) -> &'static str {
        match self {
            ClientBundle::View => "ext.gmfn.view",
            ClientBundle::Edit => "ext.gmfn.edit",
        }
    }
}

fn style_regex(axis: Axis) -> &'static Regex {
    static WIDTH: OnceLock<Regex> = OnceLock::new();
    static HEIGHT: OnceLock<Regex> = OnceLock::new();
    let (cell, name) = match axis {
        Axis::Width => (&WIDTH, "width"),
        Axis::Height => (&HEIGHT, "height"),
    };
    cell.get_or_init(|| {
        Regex::new(&format!(r"(?:^|[;\s]){name}:\s*([^;\s]+)")).expect("valid regex")
    })
}

/// Canvas size as written in its inline style. Anything unreadable falls back to the default.
pub fn style_dimension(style: Option<&str>, axis: Axis) -> Dimension {
    style
        .and_then(|s| style_regex(axis).captures(s))
        .and_then(|caps| caps.get(1))
        .and_then(|m| Dimension::parse(axis, Some(m.as_str())).ok())
        .unwrap_or_else(|| axis.default_dimension())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbeddedMap {
    pub index: usize,
    pub state: MapState,
    #[serde(serialize_with = "serialize_display")]
    pub width: Dimension,
    #[serde(serialize_with = "serialize_display")]
    pub height: Dimension,
    pub align: Align,
}

fn serialize_display<S: serde::Serializer>(
    value: &Dimension,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageScan {
    /// Maps ordered by index. A repeated index keeps the last element seen.
    pub maps: Vec<EmbeddedMap>,
    pub bundle: Option<ClientBundle>,
}

impl PageScan {
    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&EmbeddedMap> {
        self.maps.iter().find(|m| m.index == index)
    }
}

/// Cheap textual check used before a full scan.
pub fn has_map_tag(html: &str) -> bool {
    html.contains(&format!("<div class=\"{CANVAS_CLASS}\""))
}

struct RawCanvas {
    id: Option<String>,
    payload: Option<String>,
    style: Option<String>,
    edit: bool,
    align: Align,
}

/// Collects every `div.gmfn_canvas` of a rendered page and decodes its payload.
///
/// Elements whose id is not `gmfn_canvas<N>` are skipped. A missing or malformed payload on a
/// well-formed canvas is an error.
pub fn scan_page(html: &str) -> Result<PageScan> {
    if !html.contains(CANVAS_CLASS) {
        return Ok(PageScan::default());
    }

    let raw: RefCell<Vec<RawCanvas>> = RefCell::new(Vec::new());
    // The `thumb` wrapper opens before its canvas and is consumed by it; a bare canvas gets the default.
    let wrapper_align: Cell<Align> = Cell::new(Align::default());
    let selector = format!("div.{CANVAS_CLASS}");
    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("div.thumb", |el| {
                    let align = el
                        .get_attribute("class")
                        .and_then(|c| c.split_whitespace().find_map(Align::from_css_class))
                        .unwrap_or_default();
                    wrapper_align.set(align);
                    Ok(())
                }),
                element!(selector, |el| {
                    raw.borrow_mut().push(RawCanvas {
                        id: el.get_attribute("id"),
                        payload: el.get_attribute(PAYLOAD_ATTR),
                        style: el.get_attribute("style"),
                        edit: el.has_attribute(EDIT_ATTR),
                        align: wrapper_align.replace(Align::default()),
                    });
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|e| Error::PageScan {
        message: e.to_string(),
    })?;

    let mut by_index: BTreeMap<usize, EmbeddedMap> = BTreeMap::new();
    let mut any_edit = false;
    for canvas in raw.into_inner() {
        let Some(index) = canvas
            .id
            .as_deref()
            .and_then(|id| canvas_id_regex().captures(id))
            .and_then(|caps| caps.get(1)?.as_str().parse::<usize>().ok())
        else {
            tracing::trace!(id = ?canvas.id, "skipping map canvas without an index");
            continue;
        };
        let payload = canvas.payload.ok_or_else(|| Error::InvalidPayload {
            message: format!("map {index} has no `{PAYLOAD_ATTR}` attribute"),
        })?;
        let state = MapState::from_json(&htmlize::unescape(payload.as_str()))?;
        any_edit |= canvas.edit;
        by_index.insert(
            index,
            EmbeddedMap {
                index,
                state,
                width: style_dimension(canvas.style.as_deref(), Axis::Width),
                height: style_dimension(canvas.style.as_deref(), Axis::Height),
                align: canvas.align,
            },
        );
    }

    let bundle = match (by_index.is_empty(), any_edit) {
        (true, _) => None,
        (false, true) => Some(ClientBundle::Edit),
        (false, false) => Some(ClientBundle::View),
    };
    tracing::debug!(maps = by_index.len(), ?bundle, "page scanned");
    Ok(PageScan {
        maps: by_index.into_values().collect(),
        bundle,
    })
}
