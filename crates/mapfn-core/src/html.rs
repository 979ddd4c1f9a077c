//! Markup emitted around an embedded map.

pub const CANVAS_CLASS: &str = "gmfn_canvas";
pub const CANVAS_ID_PREFIX: &str = "gmfn_canvas";
pub const PAYLOAD_ATTR: &str = "data-gmfn";
pub const EDIT_ATTR: &str = "data-gmfn-edit";
pub const CAPTION_CLASS: &str = "thumbcaption";

/// Inline replacement for a tag that failed validation. `message` must already be HTML-safe.
pub fn error_markup(message: &str) -> String {
    format!(r#"<strong class="error">{message}</strong>"#)
}

pub fn canvas_id(index: usize) -> String {
    format!("{CANVAS_ID_PREFIX}{index}")
}

/// Caption slot below the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptionSlot<'a> {
    /// Empty wrapper filled in by the client editor.
    Editor,
    /// Caption wikitext left for the host parser.
    Text(&'a str),
    None,
}

#[derive(Debug, Clone)]
pub struct Shell<'a> {
    pub index: usize,
    pub align_class: &'static str,
    pub width: String,
    pub height: String,
    /// Serialized state, not yet attribute-escaped.
    pub payload_json: &'a str,
    pub edit: bool,
    pub caption: CaptionSlot<'a>,
}

impl Shell<'_> {
    pub fn render(&self) -> String {
        let outer_style = format!("width:{}; height:auto; ", self.width);
        let inner_style = format!("width:{}; height:{}; ", self.width, self.height);
        let edit_attr = if self.edit {
            format!(r#" {EDIT_ATTR}="""#)
        } else {
            String::new()
        };
        let payload = htmlize::escape_attribute(self.payload_json);
        let caption = match self.caption {
            CaptionSlot::Editor => format!("<div class=\"{CAPTION_CLASS}\"></div>\n"),
            CaptionSlot::Text(text) => format!("<div class=\"{CAPTION_CLASS}\">{text}</div>\n"),
            CaptionSlot::None => String::new(),
        };

        let mut out = String::new();
        out.push_str(&format!(
            "<div class=\"thumb {}\" style=\"{outer_style}\">\n",
            self.align_class
        ));
        out.push_str(&format!(
            "<div class=\"thumbinner\" style=\"{outer_style}\">\n"
        ));
        out.push_str(&format!(
            "<div class=\"{CANVAS_CLASS}\"{edit_attr} {PAYLOAD_ATTR}=\"{payload}\" id=\"{}\" style=\"{inner_style}\"></div>\n",
            canvas_id(self.index)
        ));
        out.push_str(&caption);
        out.push_str("</div>\n</div>");
        out
    }
}
