//! Host-side wikitext rendering used for view-mode captions and marker descriptions.

/// Renders a wikitext fragment to HTML in the context of `page`.
///
/// Implementations must be synchronous and idempotent: the same input may be rendered more
/// than once per page.
pub trait WikitextRenderer {
    fn render_wikitext(&self, text: &str, page: &str) -> String;
}

impl<F> WikitextRenderer for F
where
    F: Fn(&str, &str) -> String,
{
    fn render_wikitext(&self, text: &str, page: &str) -> String {
        self(text, page)
    }
}

/// Headless renderer: HTML-escapes the text and leaves markup uninterpreted.
#[derive(Debug, Clone, Copy, Default)]
pub struct EscapeRenderer;

impl WikitextRenderer for EscapeRenderer {
    fn render_wikitext(&self, text: &str, _page: &str) -> String {
        htmlize::escape_text(text).into_owned()
    }
}
