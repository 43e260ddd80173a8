//! Render orchestration: the fixed sequence from input to vector markup.

use crate::assets::{make_asset_loader, AssetFetcher, AssetLoader};
use crate::dimensions::{resolve_dimensions, DimensionDirective};
use crate::engine::{EngineGate, EngineHandle, LayoutModuleLoader};
use crate::fonts::{resolve_fonts, FontDescriptor, FontFetcher};
use crate::markup::{normalize, Element, MarkupParser, NodeTree};
use crate::response::ImageResponse;
use crate::{Error, RenderOptions, Result};
use futures::future::BoxFuture;
use std::sync::Arc;

/// External rendering algorithm boundary.
pub trait VectorRenderer: Send + Sync {
    /// Receives the loaded layout module. Called exactly once per engine
    /// gate, before the first render goes through it.
    fn register_engine(&self, handle: EngineHandle) -> Result<()>;

    /// Paint the tree into vector-image markup.
    fn render<'a>(
        &'a self,
        tree: &'a NodeTree,
        dimensions: &'a DimensionDirective,
        fonts: &'a [FontDescriptor],
        assets: Option<AssetLoader>,
    ) -> BoxFuture<'a, Result<String>>;
}

/// Owns the collaborator set and sequences one render call.
///
/// Any number of renders may be in flight on one pipeline; they share only
/// the engine gate. Everything resolved for a call (tree, fonts, asset
/// loader) lives and dies with that call.
pub struct Pipeline {
    loader: Arc<dyn LayoutModuleLoader>,
    renderer: Arc<dyn VectorRenderer>,
    module: Arc<Vec<u8>>,
    gate: Arc<EngineGate>,
    parser: Option<Arc<dyn MarkupParser>>,
    font_fetcher: Option<Arc<dyn FontFetcher>>,
    asset_fetcher: Option<Arc<dyn AssetFetcher>>,
}

impl Pipeline {
    /// Build a pipeline around a layout module and the renderer consuming it.
    ///
    /// The markup parser and the remote fetchers default to the stock
    /// backends when the `html`/`remote` features are enabled; `with_*`
    /// swaps any of them. The process-wide [`EngineGate`] is used unless
    /// [`Pipeline::with_gate`] installs a private one.
    pub fn new(
        loader: Arc<dyn LayoutModuleLoader>,
        renderer: Arc<dyn VectorRenderer>,
        module: Vec<u8>,
    ) -> Self {
        Self {
            loader,
            renderer,
            module: Arc::new(module),
            gate: EngineGate::global(),
            #[cfg(feature = "html")]
            parser: Some(Arc::new(crate::markup::HtmlParser)),
            #[cfg(not(feature = "html"))]
            parser: None,
            #[cfg(feature = "remote")]
            font_fetcher: Some(Arc::new(crate::fonts::GoogleFontFetcher::new())),
            #[cfg(not(feature = "remote"))]
            font_fetcher: None,
            #[cfg(feature = "remote")]
            asset_fetcher: Some(Arc::new(crate::assets::CdnEmojiFetcher::new())),
            #[cfg(not(feature = "remote"))]
            asset_fetcher: None,
        }
    }

    pub fn with_gate(mut self, gate: Arc<EngineGate>) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_parser(mut self, parser: Arc<dyn MarkupParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn with_font_fetcher(mut self, fetcher: Arc<dyn FontFetcher>) -> Self {
        self.font_fetcher = Some(fetcher);
        self
    }

    pub fn with_asset_fetcher(mut self, fetcher: Arc<dyn AssetFetcher>) -> Self {
        self.asset_fetcher = Some(fetcher);
        self
    }

    /// Render `element` into vector-image markup.
    ///
    /// The steps run in a fixed order; each depends on the previous being
    /// settled. Errors propagate to the caller untouched, keeping the
    /// originating component's diagnostic intact. No retries.
    pub async fn render(
        &self,
        element: impl Into<Element>,
        options: &RenderOptions,
    ) -> Result<String> {
        let element = element.into();

        // 1. The layout engine must be loaded and registered first.
        let loader = self.loader.clone();
        let renderer = self.renderer.clone();
        let module = self.module.clone();
        self.gate
            .ensure_ready(|| async move {
                let handle = loader.load(&module).await?;
                renderer.register_engine(handle.clone())?;
                Ok(handle)
            })
            .await?;

        // 2. One canonical tree, whatever the input form.
        let tree = match element {
            Element::Tree(tree) => tree,
            markup => {
                let parser = self.parser.as_deref().ok_or_else(|| {
                    Error::MarkupParse(
                        "no markup parser configured (enable the `html` feature or supply one)"
                            .to_string(),
                    )
                })?;
                normalize(markup, parser)?
            }
        };

        // 3. Sizing precedence.
        let dimensions = resolve_dimensions(options.width, options.height);

        // 4. Fonts, settled before the renderer runs.
        let fonts = match self.font_fetcher.as_deref() {
            Some(fetcher) => resolve_fonts(&options.fonts, fetcher).await?,
            None if !options.fonts.is_empty() => options.fonts.clone(),
            None => {
                return Err(Error::FontResolution(
                    "no font fetcher configured and no caller fonts supplied".to_string(),
                ))
            }
        };

        // 5. Glyph substitution capability, when requested.
        let assets = match (options.emoji, &self.asset_fetcher) {
            (Some(_), None) => {
                return Err(Error::AssetResolution(
                    "glyph substitution requested but no asset fetcher configured".to_string(),
                ))
            }
            (emoji, Some(fetcher)) => make_asset_loader(emoji, fetcher.clone()),
            (None, None) => None,
        };

        // 6. Hand off; the renderer's output is returned unchanged.
        log::debug!(
            "invoking renderer: {} font(s), glyph substitution: {}",
            fonts.len(),
            assets.is_some()
        );
        self.renderer
            .render(&tree, &dimensions, &fonts, assets)
            .await
    }

    /// Render `element` and package the markup into a transport response.
    pub async fn respond(
        &self,
        element: impl Into<Element>,
        options: &RenderOptions,
    ) -> Result<ImageResponse> {
        let markup = self.render(element, options).await?;
        Ok(ImageResponse::package(markup, options))
    }
}
