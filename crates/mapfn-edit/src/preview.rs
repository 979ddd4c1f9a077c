//! Live tag preview shown in the editor dialog.

use mapfn_core::attrs::{AttrKey, TAG_NAME};
use mapfn_core::geo::format_marker_coordinate;

const SLOTS: usize = AttrKey::ALL.len();

fn slot(key: AttrKey) -> usize {
    match key {
        AttrKey::Lat => 0,
        AttrKey::Lng => 1,
        AttrKey::Zoom => 2,
        AttrKey::Align => 3,
        AttrKey::Width => 4,
        AttrKey::Height => 5,
        AttrKey::SearchBox => 6,
        AttrKey::Edit => 7,
        AttrKey::Caption => 8,
    }
}

/// Caption goes on its own line so multi-line captions stay readable.
fn starts_new_line(key: AttrKey) -> bool {
    matches!(key, AttrKey::Caption)
}

/// Attribute values of the tag header. `None` means the attribute is left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPreview {
    values: [Option<String>; SLOTS],
    revision: u64,
}

impl Default for TagPreview {
    fn default() -> Self {
        let mut values: [Option<String>; SLOTS] = Default::default();
        values[slot(AttrKey::Edit)] = Some("1".to_string());
        Self {
            values,
            revision: 0,
        }
    }
}

impl TagPreview {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: AttrKey) -> Option<&str> {
        self.values[slot(key)].as_deref()
    }

    /// Sets or clears one attribute. Returns whether the header text changed.
    pub fn set(&mut self, key: AttrKey, value: Option<String>) -> bool {
        let cell = &mut self.values[slot(key)];
        if *cell == value {
            return false;
        }
        *cell = value;
        self.revision += 1;
        true
    }

    /// Applies several attributes at once, counting a single revision.
    pub fn update<I>(&mut self, values: I) -> bool
    where
        I: IntoIterator<Item = (AttrKey, Option<String>)>,
    {
        let before = self.revision;
        for (key, value) in values {
            let cell = &mut self.values[slot(key)];
            if *cell != value {
                *cell = value;
                self.revision = before + 1;
            }
        }
        self.revision != before
    }

    /// Number of accepted changes so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// `{{#googlemap:` followed by every set attribute in fixed order.
    pub fn header(&self) -> String {
        let mut out = String::new();
        for key in AttrKey::ALL {
            let Some(value) = self.get(key) else {
                continue;
            };
            if starts_new_line(key) {
                out.push('\n');
            }
            if !out.is_empty() && out != "\n" {
                out.push('|');
            }
            out.push_str(key.as_str());
            out.push('=');
            out.push_str(value);
        }
        format!("{{{{{TAG_NAME}:{out}")
    }

    /// The complete tag: header, one line per marker, closing braces.
    pub fn text<I, S>(&self, lines: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = self.header();
        for line in lines {
            out.push('\n');
            out.push_str(line.as_ref());
        }
        out.push_str("\n}}");
        out
    }
}

/// One marker line of the preview, `|<lat>, <lng> <text>`.
pub fn marker_line(lat: f64, lng: f64, text: &str) -> String {
    format!(
        "|{}, {} {}",
        format_marker_coordinate(lat),
        format_marker_coordinate(lng),
        text
    )
}
