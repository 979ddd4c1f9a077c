#![forbid(unsafe_code)]

//! `{{#googlemap}}` tag engine (headless).
//!
//! Turns the raw arguments of a map tag into a validated map model and the markup shell that
//! embeds it, and reads that markup back for client-side controllers.
//!
//! Design goals:
//! - one inline error per broken tag, never a failed page
//! - deterministic output (fixture-friendly)
//! - runtime-agnostic async APIs (no specific executor required)

pub mod attrs;
pub mod config;
pub mod context;
pub mod dimension;
pub mod error;
pub mod geo;
pub mod html;
pub mod map;
pub mod markers;
pub mod messages;
pub mod outcome;
pub mod page;
pub mod sanitize;
pub mod wikitext;

pub use attrs::{
    AttrKey, MapAttributes, TagAttributes, TagInvocation, find_invocations, parse_tag_args,
    split_invocation,
};
pub use config::MapfnConfig;
pub use context::{PageContext, RenderContext};
pub use dimension::{Axis, Bounds, Dimension, Unit};
pub use error::{Error, GeoField, Result};
pub use geo::GeoCoordinate;
pub use map::{Align, MapModel, MapState};
pub use markers::{MarkerData, MarkerRecord, MarkerStore};
pub use messages::{MessageKey, Messages};
pub use outcome::FieldOutcome;
pub use page::{ClientBundle, EmbeddedMap, PageScan};
pub use wikitext::{EscapeRenderer, WikitextRenderer};

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub suppress_errors: bool,
}

impl RenderOptions {
    /// Strict rendering (validation errors are returned).
    pub fn strict() -> Self {
        Self {
            suppress_errors: false,
        }
    }

    /// Lenient rendering: a tag that fails validation renders as an inline error instead.
    /// This is how tags behave on a wiki page.
    pub fn lenient() -> Self {
        Self {
            suppress_errors: true,
        }
    }
}

/// Output of one tag.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTag {
    pub index: usize,
    pub html: String,
    /// The validation error shown inline, for lenient renders.
    pub error: Option<Error>,
}

impl RenderedTag {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Engine {
    site_config: MapfnConfig,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_site_config(mut self, site_config: MapfnConfig) -> Self {
        self.site_config.merge(&site_config);
        self
    }

    pub fn site_config(&self) -> &MapfnConfig {
        &self.site_config
    }

    pub fn messages(&self) -> Messages {
        Messages::new(&self.site_config)
    }

    /// Validates tag arguments into a model without rendering it.
    pub fn build_map_sync<S: AsRef<str>>(&self, args: &[S], index: usize) -> Result<MapModel> {
        MapModel::from_args(args, index)
    }

    /// Renders one tag occurrence.
    ///
    /// The tag takes the next index from `ctx` whether or not it validates, so the DOM ids of
    /// the following maps do not depend on earlier errors.
    pub fn render_tag_sync<S: AsRef<str>>(
        &self,
        ctx: &mut RenderContext,
        args: &[S],
        renderer: &dyn WikitextRenderer,
        options: RenderOptions,
    ) -> Result<RenderedTag> {
        let index = ctx.next_map_index();
        let built = MapModel::from_args(args, index)
            .and_then(|model| model.to_html(renderer, &ctx.page().title));
        match built {
            Ok(html) => Ok(RenderedTag {
                index,
                html,
                error: None,
            }),
            Err(err) if options.suppress_errors && err.is_recoverable() => {
                tracing::debug!(index, error = %err, "map tag rejected");
                Ok(RenderedTag {
                    index,
                    html: html::error_markup(&err.user_message(&self.messages())),
                    error: Some(err),
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Replaces every map invocation in `wikitext` with its rendered output.
    pub fn render_page_sync(
        &self,
        ctx: &mut RenderContext,
        wikitext: &str,
        renderer: &dyn WikitextRenderer,
        options: RenderOptions,
    ) -> Result<String> {
        let mut out = String::with_capacity(wikitext.len());
        let mut rest = wikitext;
        for invocation in find_invocations(wikitext) {
            let Some(offset) = rest.find(invocation) else {
                continue;
            };
            out.push_str(&rest[..offset]);
            match split_invocation(invocation) {
                Some(args) => {
                    let rendered = self.render_tag_sync(ctx, &args, renderer, options)?;
                    out.push_str(&rendered.html);
                }
                None => out.push_str(invocation),
            }
            rest = &rest[offset + invocation.len()..];
        }
        out.push_str(rest);
        Ok(out)
    }

    /// Payload a tag would embed, for inspection and tooling.
    pub fn map_state_sync<S: AsRef<str>>(
        &self,
        args: &[S],
        renderer: &dyn WikitextRenderer,
        page: &str,
    ) -> Result<MapState> {
        Ok(MapModel::from_args(args, 0)?.state(renderer, page))
    }

    pub fn scan_page_sync(&self, html: &str) -> Result<PageScan> {
        page::scan_page(html)
    }

    pub async fn build_map<S: AsRef<str>>(&self, args: &[S], index: usize) -> Result<MapModel> {
        self.build_map_sync(args, index)
    }

    pub async fn render_tag<S: AsRef<str>>(
        &self,
        ctx: &mut RenderContext,
        args: &[S],
        renderer: &dyn WikitextRenderer,
        options: RenderOptions,
    ) -> Result<RenderedTag> {
        self.render_tag_sync(ctx, args, renderer, options)
    }

    pub async fn render_page(
        &self,
        ctx: &mut RenderContext,
        wikitext: &str,
        renderer: &dyn WikitextRenderer,
        options: RenderOptions,
    ) -> Result<String> {
        self.render_page_sync(ctx, wikitext, renderer, options)
    }

    pub async fn scan_page(&self, html: &str) -> Result<PageScan> {
        self.scan_page_sync(html)
    }
}

#[cfg(test)]
mod tests;
