//! Minimal end-to-end demo with placeholder collaborators
//!
//! The loader and painter here stand in for a real layout module and
//! vectorizer; the painter just stacks text runs so the pipeline has
//! something visible to package. The font fetcher answers from memory, so
//! the demo runs offline.

use futures::future::BoxFuture;
use ogcard::{
    AssetLoader, DimensionDirective, ElementNode, EngineHandle, FontDescriptor, FontFetcher,
    LayoutModuleLoader, Node, NodeTree, Pipeline, RenderOptions, Result, VectorRenderer,
};
use std::sync::Arc;

struct DemoLoader;

impl LayoutModuleLoader for DemoLoader {
    fn load<'a>(&'a self, module: &'a [u8]) -> BoxFuture<'a, Result<EngineHandle>> {
        let len = module.len();
        Box::pin(async move { Ok(EngineHandle::new(len)) })
    }
}

struct DemoPainter;

fn collect_text(node: &ElementNode, runs: &mut Vec<String>) {
    for child in &node.children {
        match child {
            Node::Text(run) => runs.push(run.clone()),
            Node::Element(el) => collect_text(el, runs),
        }
    }
}

impl VectorRenderer for DemoPainter {
    fn register_engine(&self, _handle: EngineHandle) -> Result<()> {
        Ok(())
    }

    fn render<'a>(
        &'a self,
        tree: &'a NodeTree,
        dimensions: &'a DimensionDirective,
        fonts: &'a [FontDescriptor],
        _assets: Option<AssetLoader>,
    ) -> BoxFuture<'a, Result<String>> {
        let width = dimensions.width().unwrap_or(0);
        let height = dimensions.height().unwrap_or(0);
        let family = fonts.first().map(|f| f.family.clone()).unwrap_or_default();

        let mut runs = Vec::new();
        collect_text(&tree.root, &mut runs);

        Box::pin(async move {
            let mut svg = format!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}">"#,
                width, height
            );
            svg.push_str(r##"<rect width="100%" height="100%" fill="#0f172a"/>"##);
            for (i, run) in runs.iter().enumerate() {
                svg.push_str(&format!(
                    r##"<text x="48" y="{}" font-family="{}" font-size="48" fill="#f8fafc">{}</text>"##,
                    96 + i * 64,
                    family,
                    run
                ));
            }
            svg.push_str("</svg>");
            Ok(svg)
        })
    }
}

struct EmbeddedFontFetcher;

impl FontFetcher for EmbeddedFontFetcher {
    fn fetch<'a>(&'a self, _family: &'a str, _weight: u16) -> BoxFuture<'a, Result<Vec<u8>>> {
        // A real deployment fetches the hosted face; the demo answers inline.
        Box::pin(async { Ok(vec![0u8; 4]) })
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    println!("OGCard Render Pipeline - Minimal Demo\n");

    let pipeline = Pipeline::new(Arc::new(DemoLoader), Arc::new(DemoPainter), vec![0u8; 64])
        .with_font_fetcher(Arc::new(EmbeddedFontFetcher));

    let card = NodeTree::new(
        ElementNode::new("div")
            .style("display", "flex")
            .style("flex-direction", "column")
            .child(Node::Element(ElementNode::new("h1").text("Hello World")))
            .child(Node::Element(
                ElementNode::new("p").text("rendered without a graphics stack"),
            )),
    );

    let response = pipeline.respond(card, &RenderOptions::default()).await?;

    println!("Status: {} {}", response.status(), response.status_text());
    for (name, value) in response.headers() {
        println!("{}: {}", name, value);
    }
    println!("\n{}", response.body());

    Ok(())
}
