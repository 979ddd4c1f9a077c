//! Splits a `{{#googlemap:...}}` invocation into named attributes and marker blocks.

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Parser function name as written in wikitext.
pub const TAG_NAME: &str = "#googlemap";

fn assignment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?si)^([a-z.]+)\s*=\s*(.*)$").expect("valid regex"))
}

/// Attributes the renderer knows about, in tag preview order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrKey {
    Lat,
    Lng,
    Zoom,
    Align,
    Width,
    Height,
    SearchBox,
    Edit,
    Caption,
}

impl AttrKey {
    pub const ALL: [AttrKey; 9] = [
        AttrKey::Lat,
        AttrKey::Lng,
        AttrKey::Zoom,
        AttrKey::Align,
        AttrKey::Width,
        AttrKey::Height,
        AttrKey::SearchBox,
        AttrKey::Edit,
        AttrKey::Caption,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AttrKey::Lat => "lat",
            AttrKey::Lng => "lng",
            AttrKey::Zoom => "zoom",
            AttrKey::Align => "align",
            AttrKey::Width => "width",
            AttrKey::Height => "height",
            AttrKey::SearchBox => "searchbox",
            AttrKey::Edit => "edit",
            AttrKey::Caption => "caption",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == name)
    }
}

/// Raw attribute values keyed by name, as written by the author. Values are untrimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagAttributes(IndexMap<String, String>);

impl TagAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn get_attr(&self, key: AttrKey) -> Option<&str> {
        self.get(key.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Last write wins; the key keeps its first position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Renames the legacy `lon` key to `lng` when `lng` itself is absent. `lon` is removed in
    /// that case only; an explicit `lng` always wins.
    pub fn normalize_legacy(&mut self) {
        if self.contains_key("lng") {
            return;
        }
        if let Some(lon) = self.remove("lon") {
            tracing::debug!(value = %lon, "renaming legacy `lon` attribute to `lng`");
            self.insert("lng", lon);
        }
    }

    /// Closed view over the known attributes. Unknown keys stay in `extra`.
    pub fn to_record(&self) -> MapAttributes {
        let mut normalized = self.clone();
        normalized.normalize_legacy();

        let mut record = MapAttributes::default();
        for (key, value) in normalized.iter() {
            let value = Some(value.to_string());
            match AttrKey::from_name(key) {
                Some(AttrKey::Lat) => record.lat = value,
                Some(AttrKey::Lng) => record.lng = value,
                Some(AttrKey::Zoom) => record.zoom = value,
                Some(AttrKey::Align) => record.align = value,
                Some(AttrKey::Width) => record.width = value,
                Some(AttrKey::Height) => record.height = value,
                Some(AttrKey::SearchBox) => record.searchbox = value,
                Some(AttrKey::Edit) => record.edit = value,
                Some(AttrKey::Caption) => record.caption = value,
                None => {
                    record.extra.insert(key.to_string(), value.unwrap_or_default());
                }
            }
        }
        record
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TagAttributes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut attrs = Self::new();
        for (k, v) in iter {
            attrs.insert(k, v);
        }
        attrs
    }
}

/// Known attributes of one tag, still unvalidated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapAttributes {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub zoom: Option<String>,
    pub align: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub searchbox: Option<String>,
    pub edit: Option<String>,
    pub caption: Option<String>,
    pub extra: IndexMap<String, String>,
}

/// One tag occurrence after argument classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagInvocation {
    pub attrs: TagAttributes,
    pub marker_blocks: Vec<String>,
}

impl TagInvocation {
    pub fn record(&self) -> MapAttributes {
        self.attrs.to_record()
    }
}

/// Classifies already-expanded parser function arguments. `key=value` arguments become
/// attributes, everything else is a marker block, in order.
pub fn parse_tag_args<I, S>(args: I) -> TagInvocation
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut invocation = TagInvocation::default();
    for arg in args {
        let arg = arg.as_ref();
        match assignment_regex().captures(arg) {
            Some(caps) => {
                let key = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                let value = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
                invocation.attrs.insert(key, value);
            }
            None => invocation.marker_blocks.push(arg.to_string()),
        }
    }
    invocation
}

/// Splits invocation source text (`{{#googlemap:lat=1|lng=2|...}}`) into trimmed arguments.
///
/// Pipes nested inside `[[...]]` links or `{{...}}` templates do not split. Empty arguments
/// are dropped. Returns `None` when `text` is not a map invocation.
pub fn split_invocation(text: &str) -> Option<Vec<String>> {
    let body = text.trim();
    let body = body.strip_prefix("{{")?.trim_start();
    let rest = strip_prefix_ignore_ascii_case(body, TAG_NAME)?;
    let rest = rest.trim_start().strip_prefix(':')?;
    let rest = rest.strip_suffix("}}")?;

    let mut args = Vec::new();
    let mut current = String::new();
    let mut link_depth = 0usize;
    let mut template_depth = 0usize;
    let mut chars = rest.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '[' if chars.peek() == Some(&'[') => {
                chars.next();
                link_depth += 1;
                current.push_str("[[");
            }
            ']' if chars.peek() == Some(&']') && link_depth > 0 => {
                chars.next();
                link_depth -= 1;
                current.push_str("]]");
            }
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                template_depth += 1;
                current.push_str("{{");
            }
            '}' if chars.peek() == Some(&'}') && template_depth > 0 => {
                chars.next();
                template_depth -= 1;
                current.push_str("}}");
            }
            '|' if link_depth == 0 && template_depth == 0 => {
                push_arg(&mut args, &current);
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    push_arg(&mut args, &current);
    Some(args)
}

fn push_arg(args: &mut Vec<String>, raw: &str) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        args.push(trimmed.to_string());
    }
}

fn strip_prefix_ignore_ascii_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &s[prefix.len()..])
}

/// Finds every map invocation in a page's wikitext, returning their source spans in order.
/// Braces are balanced so that nested templates inside captions or markers are included.
pub fn find_invocations(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let bytes = text.as_bytes();
    let mut i = 0usize;
    while i + 1 < bytes.len() {
        if bytes[i] != b'{' || bytes[i + 1] != b'{' {
            i += 1;
            continue;
        }
        let after = text[i + 2..].trim_start();
        if strip_prefix_ignore_ascii_case(after, TAG_NAME).is_none() {
            i += 2;
            continue;
        }

        let start = i;
        let mut depth = 0usize;
        let mut j = i;
        let mut end = None;
        while j + 1 < bytes.len() {
            if bytes[j] == b'{' && bytes[j + 1] == b'{' {
                depth += 1;
                j += 2;
                continue;
            }
            if bytes[j] == b'}' && bytes[j + 1] == b'}' {
                depth -= 1;
                j += 2;
                if depth == 0 {
                    end = Some(j);
                    break;
                }
                continue;
            }
            j += 1;
        }
        match end {
            Some(end) => {
                out.push(&text[start..end]);
                i = end;
            }
            None => break,
        }
    }
    out
}
