//! Message lookup keyed by fixed identifiers.
//!
//! Only the built-in English catalog ships with the crate; hosts supply translations through
//! `messages.<id>` entries of the site configuration.

use crate::MapfnConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    Desc,
    EditMarker,
    ViewMarker,
    RemoveMarker,
    EditLat,
    EditLng,
    EditZoom,
    EditWidth,
    EditHeight,
    EditAlign,
    EditCaption,
    EditSearchBox,
    SwitchSearchBox,
    SearchBoxPlaceholder,
    AlignDefault,
    AlignLeft,
    AlignRight,
    ShowCode,
    ChangeCenter,
    ResizeMap,
    ErrorLat,
    ErrorLng,
    ErrorWidth,
    ErrorHeight,
    ErrorEmptyMarkerDescription,
}

impl MessageKey {
    pub const ALL: &'static [MessageKey] = &[
        MessageKey::Desc,
        MessageKey::EditMarker,
        MessageKey::ViewMarker,
        MessageKey::RemoveMarker,
        MessageKey::EditLat,
        MessageKey::EditLng,
        MessageKey::EditZoom,
        MessageKey::EditWidth,
        MessageKey::EditHeight,
        MessageKey::EditAlign,
        MessageKey::EditCaption,
        MessageKey::EditSearchBox,
        MessageKey::SwitchSearchBox,
        MessageKey::SearchBoxPlaceholder,
        MessageKey::AlignDefault,
        MessageKey::AlignLeft,
        MessageKey::AlignRight,
        MessageKey::ShowCode,
        MessageKey::ChangeCenter,
        MessageKey::ResizeMap,
        MessageKey::ErrorLat,
        MessageKey::ErrorLng,
        MessageKey::ErrorWidth,
        MessageKey::ErrorHeight,
        MessageKey::ErrorEmptyMarkerDescription,
    ];

    pub fn id(self) -> &'static str {
        match self {
            MessageKey::Desc => "gmfn-desc",
            MessageKey::EditMarker => "gmfn-edit-marker",
            MessageKey::ViewMarker => "gmfn-view-marker",
            MessageKey::RemoveMarker => "gmfn-remove-marker",
            MessageKey::EditLat => "gmfn-edit-lat",
            MessageKey::EditLng => "gmfn-edit-lng",
            MessageKey::EditZoom => "gmfn-edit-zoom",
            MessageKey::EditWidth => "gmfn-edit-width",
            MessageKey::EditHeight => "gmfn-edit-height",
            MessageKey::EditAlign => "gmfn-edit-align",
            MessageKey::EditCaption => "gmfn-edit-caption",
            MessageKey::EditSearchBox => "gmfn-edit-searchbox",
            MessageKey::SwitchSearchBox => "gmfn-switch-searchbox",
            MessageKey::SearchBoxPlaceholder => "gmfn-searchbox-placeholder",
            MessageKey::AlignDefault => "gmfn-align-default",
            MessageKey::AlignLeft => "gmfn-align-left",
            MessageKey::AlignRight => "gmfn-align-right",
            MessageKey::ShowCode => "gmfn-show-code",
            MessageKey::ChangeCenter => "gmfn-change-center",
            MessageKey::ResizeMap => "gmfn-resize-map",
            MessageKey::ErrorLat => "gmfn-error-lat",
            MessageKey::ErrorLng => "gmfn-error-lng",
            MessageKey::ErrorWidth => "gmfn-error-width",
            MessageKey::ErrorHeight => "gmfn-error-height",
            MessageKey::ErrorEmptyMarkerDescription => "gmfn-error-empty-marker-description",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.id() == id)
    }

    fn default_text(self) -> &'static str {
        match self {
            MessageKey::Desc => "Defines parser function used to control interactive maps",
            MessageKey::EditMarker => "Click to edit current marker",
            MessageKey::ViewMarker => "Click to view current marker",
            MessageKey::RemoveMarker => "Click to remove current marker",
            MessageKey::EditLat => "Latitude",
            MessageKey::EditLng => "Longitude",
            MessageKey::EditZoom => "Zoom",
            MessageKey::EditWidth => "Width",
            MessageKey::EditHeight => "Height",
            MessageKey::EditAlign => "Align",
            MessageKey::EditCaption => "Caption",
            MessageKey::EditSearchBox => "SearchBox",
            MessageKey::SwitchSearchBox => "Use SearchBox",
            MessageKey::SearchBoxPlaceholder => "Search locations",
            MessageKey::AlignDefault => "Default",
            MessageKey::AlignLeft => "Left",
            MessageKey::AlignRight => "Right",
            MessageKey::ShowCode => "Show code",
            MessageKey::ChangeCenter => "Drag map content to change center",
            MessageKey::ResizeMap => "Drag map borders to resize",
            MessageKey::ErrorLat => "Invalid or omitted value of latitude: $1",
            MessageKey::ErrorLng => "Invalid or omitted value of longitude: $1",
            MessageKey::ErrorWidth => "Invalid or unsupported unit of width: $1",
            MessageKey::ErrorHeight => "Invalid or unsupported unit of height: $1",
            MessageKey::ErrorEmptyMarkerDescription => "Map marker description cannot be empty",
        }
    }
}

impl std::fmt::Display for MessageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Resolves message identifiers against the site configuration, then the built-in catalog.
#[derive(Debug, Clone, Default)]
pub struct Messages {
    config: MapfnConfig,
}

impl Messages {
    pub fn new(config: &MapfnConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn get(&self, key: MessageKey) -> String {
        match self.config.message_override(key.id()) {
            Some(text) => text.to_string(),
            None => key.default_text().to_string(),
        }
    }

    /// Looks up `key` and substitutes `$1`, `$2`, ... with `params` in order.
    pub fn format<'a>(&self, key: MessageKey, params: impl IntoIterator<Item = &'a str>) -> String {
        substitute_params(&self.get(key), &params.into_iter().collect::<Vec<_>>())
    }
}

/// `$N` placeholders without a matching parameter are left as-is.
pub fn substitute_params(template: &str, params: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();
    while let Some((_, ch)) = chars.next() {
        if ch != '$' {
            out.push(ch);
            continue;
        }
        let mut digits = String::new();
        while let Some(&(_, d)) = chars.peek() {
            if !d.is_ascii_digit() {
                break;
            }
            digits.push(d);
            chars.next();
        }
        let param = digits
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| params.get(i));
        match param {
            Some(p) => out.push_str(p),
            None => {
                out.push('$');
                out.push_str(&digits);
            }
        }
    }
    out
}
