use crate::page::{ClientBundle, PageScan};

/// Page whose wikitext is being rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContext {
    pub title: String,
}

impl PageContext {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

/// State shared by all map tags of one page render.
///
/// Create one per page; map indices start at 0 and are never reused within the page, even for
/// tags that render as an error.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    page: PageContext,
    next_index: usize,
    scan: Option<PageScan>,
}

impl RenderContext {
    pub fn new(page: PageContext) -> Self {
        Self {
            page,
            next_index: 0,
            scan: None,
        }
    }

    pub fn page(&self) -> &PageContext {
        &self.page
    }

    /// Hands out the DOM index for the next tag.
    pub fn next_map_index(&mut self) -> usize {
        let index = self.next_index;
        self.next_index += 1;
        index
    }

    pub fn maps_rendered(&self) -> usize {
        self.next_index
    }

    /// Scans the rendered page once and remembers the result. Later calls return the cached
    /// scan without looking at `html` again.
    pub fn check_page(&mut self, html: &str) -> crate::Result<&PageScan> {
        if self.scan.is_none() {
            self.scan = Some(crate::page::scan_page(html)?);
        }
        self.scan
            .as_ref()
            .ok_or_else(|| crate::Error::state_desync("page scan missing after check"))
    }

    /// Client bundle the page needs, if it has been checked.
    pub fn required_bundle(&self) -> Option<ClientBundle> {
        self.scan.as_ref().and_then(|s| s.bundle)
    }
}
