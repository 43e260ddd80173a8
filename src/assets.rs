//! Demand-driven glyph substitution during painting.
//!
//! The renderer handles most text itself; for inline emoji it asks the
//! pipeline, cluster by cluster, for a substitute image. That capability is a
//! plain function value injected into the render call, never a global
//! registry, and it only exists when the caller asked for it.

#[cfg(feature = "remote")]
use crate::Error;
use crate::Result;
use base64::Engine as _;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Image payload returned for one glyph cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReply {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl AssetReply {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }

    /// Inline form for renderers that embed images directly in the markup.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            base64::engine::general_purpose::STANDARD.encode(&self.data)
        )
    }
}

/// Callback handed to the renderer, invoked for each glyph cluster it
/// encounters while painting.
///
/// Reentrant: the renderer may invoke it for several distinct clusters
/// concurrently while processing sibling nodes, and no invocation order is
/// assumed. Each invocation performs exactly one fetch; nothing is
/// pre-fetched or batched.
pub type AssetLoader =
    Arc<dyn Fn(&str) -> BoxFuture<'static, Result<AssetReply>> + Send + Sync>;

/// Glyph image set used for substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmojiSource {
    Twemoji,
    OpenMoji,
    Blobmoji,
    Noto,
    Fluent,
    #[serde(rename = "fluentFlat")]
    FluentFlat,
}

impl EmojiSource {
    /// CDN location of the image for a hyphen-joined codepoint sequence.
    pub fn asset_url(&self, code: &str) -> String {
        match self {
            EmojiSource::Twemoji => format!(
                "https://cdn.jsdelivr.net/gh/twitter/twemoji@14.0.2/assets/svg/{}.svg",
                code
            ),
            EmojiSource::OpenMoji => format!(
                "https://cdn.jsdelivr.net/npm/@svgmoji/openmoji@2.0.0/svg/{}.svg",
                code.to_uppercase()
            ),
            EmojiSource::Blobmoji => format!(
                "https://cdn.jsdelivr.net/npm/@svgmoji/blob@2.0.0/svg/{}.svg",
                code.to_uppercase()
            ),
            EmojiSource::Noto => format!(
                "https://cdn.jsdelivr.net/gh/svgmoji/svgmoji/packages/svgmoji__noto/svg/{}.svg",
                code.to_uppercase()
            ),
            EmojiSource::Fluent => format!(
                "https://cdn.jsdelivr.net/gh/shuding/fluentui-emoji-unicode/assets/{}_color.svg",
                code.to_lowercase()
            ),
            EmojiSource::FluentFlat => format!(
                "https://cdn.jsdelivr.net/gh/shuding/fluentui-emoji-unicode/assets/{}_flat.svg",
                code.to_lowercase()
            ),
        }
    }
}

/// Hyphen-joined hex codepoints for a glyph cluster.
///
/// Variation selector-16 is dropped unless the cluster contains a zero-width
/// joiner, matching how the image sets address their files.
pub fn codepoint_sequence(cluster: &str) -> String {
    let has_zwj = cluster.chars().any(|c| c == '\u{200d}');
    cluster
        .chars()
        .filter(|&c| has_zwj || c != '\u{fe0f}')
        .map(|c| format!("{:x}", c as u32))
        .collect::<Vec<_>>()
        .join("-")
}

/// Remote glyph-image host boundary.
pub trait AssetFetcher: Send + Sync {
    fn fetch<'a>(
        &'a self,
        source: EmojiSource,
        cluster: &'a str,
    ) -> BoxFuture<'a, Result<AssetReply>>;
}

/// Build the loader the renderer will call, or `None` when glyph
/// substitution was not requested (the renderer then falls back to its own
/// built-in glyph handling).
pub fn make_asset_loader(
    emoji: Option<EmojiSource>,
    fetcher: Arc<dyn AssetFetcher>,
) -> Option<AssetLoader> {
    let source = emoji?;
    Some(Arc::new(move |cluster: &str| {
        let fetcher = fetcher.clone();
        let cluster = cluster.to_string();
        Box::pin(async move { fetcher.fetch(source, &cluster).await })
    }))
}

/// Fetches glyph images from the CDN of the selected [`EmojiSource`].
#[cfg(feature = "remote")]
pub struct CdnEmojiFetcher {
    client: reqwest::Client,
    base_override: Option<String>,
}

#[cfg(feature = "remote")]
impl CdnEmojiFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_override: None,
        }
    }

    /// Serve every request from `base` instead of the per-source CDN
    /// (tests point this at a local server).
    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_override: Some(base.into()),
        }
    }

    fn url_for(&self, source: EmojiSource, code: &str) -> String {
        match &self.base_override {
            Some(base) => format!("{}/{}.svg", base.trim_end_matches('/'), code),
            None => source.asset_url(code),
        }
    }

    async fn fetch_image(&self, source: EmojiSource, cluster: &str) -> Result<AssetReply> {
        let code = codepoint_sequence(cluster);
        let url = self.url_for(source, &code);

        let response = self.client.get(&url).send().await.map_err(|e| {
            Error::AssetResolution(format!("fetch failed for {}: {}", code, e))
        })?;
        if !response.status().is_success() {
            return Err(Error::AssetResolution(format!(
                "fetch for {} returned {}",
                code,
                response.status()
            )));
        }

        let mime_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .unwrap_or_else(|| "image/svg+xml".to_string());
        let data = response
            .bytes()
            .await
            .map_err(|e| Error::AssetResolution(format!("failed to read image for {}: {}", code, e)))?
            .to_vec();

        Ok(AssetReply { data, mime_type })
    }
}

#[cfg(feature = "remote")]
impl Default for CdnEmojiFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "remote")]
impl AssetFetcher for CdnEmojiFetcher {
    fn fetch<'a>(
        &'a self,
        source: EmojiSource,
        cluster: &'a str,
    ) -> BoxFuture<'a, Result<AssetReply>> {
        Box::pin(self.fetch_image(source, cluster))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticFetcher;

    impl AssetFetcher for StaticFetcher {
        fn fetch<'a>(
            &'a self,
            _source: EmojiSource,
            cluster: &'a str,
        ) -> BoxFuture<'a, Result<AssetReply>> {
            let code = codepoint_sequence(cluster);
            Box::pin(async move {
                Ok(AssetReply::new(code.into_bytes(), "image/svg+xml"))
            })
        }
    }

    #[test]
    fn no_emoji_option_means_no_loader() {
        assert!(make_asset_loader(None, Arc::new(StaticFetcher)).is_none());
    }

    #[tokio::test]
    async fn loader_resolves_on_demand() {
        let loader = make_asset_loader(Some(EmojiSource::Twemoji), Arc::new(StaticFetcher))
            .expect("loader requested");
        let reply = loader("\u{2764}\u{fe0f}").await.unwrap();
        assert_eq!(reply.data, b"2764");
        assert_eq!(reply.mime_type, "image/svg+xml");
    }

    #[test]
    fn variation_selector_dropped_without_zwj() {
        // Red heart: U+2764 U+FE0F
        assert_eq!(codepoint_sequence("\u{2764}\u{fe0f}"), "2764");
    }

    #[test]
    fn variation_selector_kept_in_zwj_sequences() {
        // Heart on fire: U+2764 U+FE0F U+200D U+1F525
        assert_eq!(
            codepoint_sequence("\u{2764}\u{fe0f}\u{200d}\u{1f525}"),
            "2764-fe0f-200d-1f525"
        );
    }

    #[test]
    fn source_urls_differ_in_casing_rules() {
        assert_eq!(
            EmojiSource::Twemoji.asset_url("1f600"),
            "https://cdn.jsdelivr.net/gh/twitter/twemoji@14.0.2/assets/svg/1f600.svg"
        );
        assert!(EmojiSource::OpenMoji.asset_url("1f600").contains("1F600.svg"));
        assert!(EmojiSource::Fluent.asset_url("1F600").ends_with("1f600_color.svg"));
        assert!(EmojiSource::FluentFlat.asset_url("1F600").ends_with("1f600_flat.svg"));
    }

    #[test]
    fn data_url_inlines_mime_and_payload() {
        let reply = AssetReply::new(b"<svg/>".to_vec(), "image/svg+xml");
        assert_eq!(
            reply.to_data_url(),
            "data:image/svg+xml;base64,PHN2Zy8+"
        );
    }
}
