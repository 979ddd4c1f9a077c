//! Pipe escaping for text that ends up inside an unnamed tag argument.
//!
//! A literal `|` in a marker description would split the argument when the page is parsed
//! again, so top-level pipes are written as `&#124;`. Pipes that belong to wiki links
//! (`[[Page|label]]`) or template calls (`{{name|arg}}`) are kept.

pub const ESCAPED_PIPE: &str = "&#124;";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedText {
    pub text: String,
    /// Set when the brackets of the input do not balance. Every pipe is escaped in that case.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bracket {
    Link,
    Template,
}

impl Bracket {
    fn open(self) -> &'static str {
        match self {
            Bracket::Link => "[[",
            Bracket::Template => "{{",
        }
    }
}

pub fn escape_all_pipes(text: &str) -> String {
    text.replace('|', ESCAPED_PIPE)
}

pub fn escape_parameter_pipes(text: &str) -> SanitizedText {
    match escape_top_level(text) {
        Ok(text) => SanitizedText { text, error: None },
        Err(error) => {
            tracing::debug!(%error, "unbalanced wikitext, escaping every pipe");
            SanitizedText {
                text: escape_all_pipes(text),
                error: Some(error),
            }
        }
    }
}

fn escape_top_level(text: &str) -> std::result::Result<String, String> {
    let mut out = String::with_capacity(text.len());
    let mut stack: Vec<Bracket> = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '[' if chars.peek() == Some(&'[') => {
                chars.next();
                stack.push(Bracket::Link);
                out.push_str("[[");
            }
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                stack.push(Bracket::Template);
                out.push_str("{{");
            }
            ']' if chars.peek() == Some(&']') => {
                chars.next();
                close(&mut stack, Bracket::Link)?;
                out.push_str("]]");
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                close(&mut stack, Bracket::Template)?;
                out.push_str("}}");
            }
            '|' if stack.is_empty() => out.push_str(ESCAPED_PIPE),
            _ => out.push(ch),
        }
    }
    match stack.last() {
        Some(open) => Err(format!("unclosed `{}`", open.open())),
        None => Ok(out),
    }
}

fn close(stack: &mut Vec<Bracket>, kind: Bracket) -> std::result::Result<(), String> {
    match stack.pop() {
        Some(open) if open == kind => Ok(()),
        Some(open) => Err(format!("`{}` closed by the wrong bracket", open.open())),
        None => Err(format!("unexpected close of `{}`", kind.open())),
    }
}
