//! OGCard Render Pipeline
//!
//! Renders a declarative, style-annotated node tree (or an equivalent HTML
//! string) into an SVG image, suitable for serving as an HTTP response from a
//! request-handling edge process. There is no platform graphics stack
//! underneath: layout and painting run through a portable, precompiled layout
//! module that is loaded once per process and shared by every render call.
//!
//! # Features
//!
//! - **Pluggable collaborators**: layout module loading, markup parsing,
//!   painting, and the remote font/glyph fetchers all sit behind traits
//! - **One-shot bootstrap**: concurrent first renders collapse into a single
//!   layout-module load; the outcome is shared process-wide
//! - **Edge-friendly responses**: rendered markup is packaged with content
//!   type and cache-control headers derived from the call options
//!
//! # Example
//!
//! ```no_run
//! use futures::future::BoxFuture;
//! use ogcard::{
//!     AssetLoader, DimensionDirective, EngineHandle, FontDescriptor, LayoutModuleLoader,
//!     NodeTree, Pipeline, RenderOptions, Result, VectorRenderer,
//! };
//! use std::sync::Arc;
//!
//! struct WasmLoader;
//!
//! impl LayoutModuleLoader for WasmLoader {
//!     fn load<'a>(&'a self, module: &'a [u8]) -> BoxFuture<'a, Result<EngineHandle>> {
//!         Box::pin(async move { Ok(EngineHandle::new(module.len())) })
//!     }
//! }
//!
//! struct Painter;
//!
//! impl VectorRenderer for Painter {
//!     fn register_engine(&self, _handle: EngineHandle) -> Result<()> {
//!         Ok(())
//!     }
//!
//!     fn render<'a>(
//!         &'a self,
//!         _tree: &'a NodeTree,
//!         _dimensions: &'a DimensionDirective,
//!         _fonts: &'a [FontDescriptor],
//!         _assets: Option<AssetLoader>,
//!     ) -> BoxFuture<'a, Result<String>> {
//!         Box::pin(async { Ok(r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#.to_string()) })
//!     }
//! }
//!
//! # async fn run() -> Result<()> {
//! let module = std::fs::read("layout.wasm").unwrap();
//! let pipeline = Pipeline::new(Arc::new(WasmLoader), Arc::new(Painter), module);
//!
//! let response = pipeline
//!     .respond(
//!         r#"<div style="display:flex"><h1>Hello World</h1></div>"#,
//!         &RenderOptions::default(),
//!     )
//!     .await?;
//! assert_eq!(response.status(), 200);
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;

pub mod error;
pub use error::{Error, Result};

pub mod engine;
pub use engine::{EngineGate, EngineHandle, EngineState, LayoutModuleLoader};

// Canonical tree + markup normalization
pub mod markup;
#[cfg(feature = "html")]
pub use markup::HtmlParser;
pub use markup::{normalize, Element, ElementNode, MarkupParser, Node, NodeTree, StyleValue};

// Render-time dependency resolution
pub mod assets;
pub mod dimensions;
pub mod fonts;
#[cfg(feature = "remote")]
pub use assets::CdnEmojiFetcher;
pub use assets::{
    codepoint_sequence, make_asset_loader, AssetFetcher, AssetLoader, AssetReply, EmojiSource,
};
pub use dimensions::{resolve_dimensions, DimensionDirective, DEFAULT_HEIGHT, DEFAULT_WIDTH};
#[cfg(feature = "remote")]
pub use fonts::GoogleFontFetcher;
pub use fonts::{
    resolve_fonts, FontDescriptor, FontFetcher, FontStyle, DEFAULT_FONT_FAMILY,
    DEFAULT_FONT_FETCH_WEIGHT, DEFAULT_FONT_WEIGHT,
};

// Orchestration + packaging
pub mod pipeline;
pub mod response;
pub use pipeline::{Pipeline, VectorRenderer};
pub use response::{ImageResponse, SVG_CONTENT_TYPE};

/// Options for one render call.
///
/// Everything here is per-call; nothing is cached across calls. The
/// response-shaping fields (`debug`, `headers`, `status`, `status_text`) only
/// matter when the call goes through [`Pipeline::respond`] or
/// [`ImageResponse::new`].
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Target width in pixels; when both axes are unset the render defaults
    /// to 1200×630
    pub width: Option<u32>,
    /// Target height in pixels
    pub height: Option<u32>,
    /// Fonts to shape and paint text with. Non-empty sequences are used
    /// verbatim and disable the built-in default; empty means the default
    /// face is fetched remotely for this call.
    pub fonts: Vec<FontDescriptor>,
    /// Enables inline glyph substitution from the selected image set
    pub emoji: Option<EmojiSource>,
    /// Switches the response cache-control to a no-store directive
    pub debug: bool,
    /// Extra response headers; they override the defaults on key collision
    pub headers: HashMap<String, String>,
    /// HTTP status of the packaged response (default 200)
    pub status: Option<u16>,
    /// HTTP status text (default: the canonical reason phrase)
    pub status_text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_leave_everything_unset() {
        let options = RenderOptions::default();
        assert_eq!(options.width, None);
        assert_eq!(options.height, None);
        assert!(options.fonts.is_empty());
        assert!(options.emoji.is_none());
        assert!(!options.debug);
        assert!(options.headers.is_empty());
        assert_eq!(options.status, None);
        assert_eq!(options.status_text, None);
    }
}
