//! Font resolution: caller fonts verbatim, otherwise one remote default.

#[cfg(any(feature = "remote", test))]
use crate::Error;
use crate::Result;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Family of the built-in default face.
pub const DEFAULT_FONT_FAMILY: &str = "Bitter";
/// Weight requested from the font host for the default face.
pub const DEFAULT_FONT_FETCH_WEIGHT: u16 = 600;
/// Weight advertised on the resolved default descriptor.
pub const DEFAULT_FONT_WEIGHT: u16 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    Normal,
    Italic,
}

/// A usable font: identity plus raw payload bytes.
///
/// `family` + `weight` + `style` identify the face within one render call;
/// `data` must be a payload the renderer can consume. Resolved once per call
/// and never cached across calls.
#[derive(Clone, PartialEq, Eq)]
pub struct FontDescriptor {
    pub family: String,
    pub data: Vec<u8>,
    pub weight: u16,
    pub style: FontStyle,
}

impl FontDescriptor {
    pub fn new(family: impl Into<String>, data: Vec<u8>, weight: u16, style: FontStyle) -> Self {
        Self {
            family: family.into(),
            data,
            weight,
            style,
        }
    }
}

impl fmt::Debug for FontDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontDescriptor")
            .field("family", &self.family)
            .field("weight", &self.weight)
            .field("style", &self.style)
            .field("data", &format_args!("{} bytes", self.data.len()))
            .finish()
    }
}

/// Remote font host boundary.
pub trait FontFetcher: Send + Sync {
    fn fetch<'a>(&'a self, family: &'a str, weight: u16) -> BoxFuture<'a, Result<Vec<u8>>>;
}

/// Resolve the font sequence for one render call.
///
/// A non-empty caller sequence is returned verbatim and disables the default
/// entirely. Otherwise the built-in default face is fetched, exactly once.
/// There is no local fallback: a failed fetch fails the render visibly.
pub async fn resolve_fonts(
    fonts: &[FontDescriptor],
    fetcher: &dyn FontFetcher,
) -> Result<Vec<FontDescriptor>> {
    if !fonts.is_empty() {
        return Ok(fonts.to_vec());
    }

    let data = fetcher
        .fetch(DEFAULT_FONT_FAMILY, DEFAULT_FONT_FETCH_WEIGHT)
        .await?;
    Ok(vec![FontDescriptor::new(
        DEFAULT_FONT_FAMILY,
        data,
        DEFAULT_FONT_WEIGHT,
        FontStyle::Normal,
    )])
}

/// Fetches font binaries from a hosted-stylesheet service.
///
/// Two hops: request the stylesheet for `family:wght@weight`, pull the first
/// `src: url(...)` out of it, then download that binary. Relative src URLs
/// resolve against the stylesheet location.
#[cfg(feature = "remote")]
pub struct GoogleFontFetcher {
    client: reqwest::Client,
    css_endpoint: String,
}

#[cfg(feature = "remote")]
impl GoogleFontFetcher {
    pub fn new() -> Self {
        Self::with_endpoint("https://fonts.googleapis.com/css2")
    }

    /// Point at a different stylesheet host (tests use a local server).
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            css_endpoint: endpoint.into(),
        }
    }

    async fn fetch_binary(&self, family: &str, weight: u16) -> Result<Vec<u8>> {
        let css_url = format!(
            "{}?family={}:wght@{}",
            self.css_endpoint,
            family.replace(' ', "+"),
            weight
        );

        let response = self
            .client
            .get(&css_url)
            .send()
            .await
            .map_err(|e| Error::FontResolution(format!("stylesheet request failed: {}", e)))?;
        if !response.status().is_success() {
            return Err(Error::FontResolution(format!(
                "stylesheet request for {} returned {}",
                family,
                response.status()
            )));
        }
        let css = response
            .text()
            .await
            .map_err(|e| Error::FontResolution(format!("failed to read stylesheet: {}", e)))?;

        let src = extract_src_url(&css).ok_or_else(|| {
            Error::FontResolution(format!("stylesheet for {} has no src url", family))
        })?;
        let font_url = match url::Url::parse(src) {
            Ok(absolute) => absolute,
            Err(_) => url::Url::parse(&css_url)
                .and_then(|base| base.join(src))
                .map_err(|e| Error::FontResolution(format!("bad font url {}: {}", src, e)))?,
        };

        let response = self
            .client
            .get(font_url)
            .send()
            .await
            .map_err(|e| Error::FontResolution(format!("font download failed: {}", e)))?;
        if !response.status().is_success() {
            return Err(Error::FontResolution(format!(
                "font download returned {}",
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::FontResolution(format!("failed to read font payload: {}", e)))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(feature = "remote")]
impl Default for GoogleFontFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "remote")]
impl FontFetcher for GoogleFontFetcher {
    fn fetch<'a>(&'a self, family: &'a str, weight: u16) -> BoxFuture<'a, Result<Vec<u8>>> {
        Box::pin(self.fetch_binary(family, weight))
    }
}

/// First `url(...)` operand of a `src:` descriptor in a stylesheet.
#[cfg(feature = "remote")]
fn extract_src_url(css: &str) -> Option<&str> {
    let src = css.find("src:")?;
    let rest = &css[src..];
    let open = rest.find("url(")?;
    let rest = &rest[open + 4..];
    let close = rest.find(')')?;
    Some(rest[..close].trim_matches(|c| c == '\'' || c == '"'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingFetcher {
        calls: Arc<AtomicUsize>,
    }

    impl FontFetcher for CountingFetcher {
        fn fetch<'a>(&'a self, _family: &'a str, _weight: u16) -> BoxFuture<'a, Result<Vec<u8>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Ok(vec![0u8, 1, 0, 0]) })
        }
    }

    #[tokio::test]
    async fn caller_fonts_disable_the_default_fetch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = CountingFetcher {
            calls: calls.clone(),
        };
        let supplied = vec![FontDescriptor::new(
            "Inter",
            vec![1, 2, 3],
            400,
            FontStyle::Normal,
        )];

        let resolved = resolve_fonts(&supplied, &fetcher).await.unwrap();
        assert_eq!(resolved, supplied);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_fonts_fetch_the_default_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = CountingFetcher {
            calls: calls.clone(),
        };

        let resolved = resolve_fonts(&[], &fetcher).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].family, DEFAULT_FONT_FAMILY);
        assert_eq!(resolved[0].weight, DEFAULT_FONT_WEIGHT);
        assert_eq!(resolved[0].style, FontStyle::Normal);
        assert!(!resolved[0].data.is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_propagates_without_fallback() {
        struct FailingFetcher;
        impl FontFetcher for FailingFetcher {
            fn fetch<'a>(
                &'a self,
                family: &'a str,
                _weight: u16,
            ) -> BoxFuture<'a, Result<Vec<u8>>> {
                Box::pin(async move {
                    Err(Error::FontResolution(format!("{} unreachable", family)))
                })
            }
        }

        let err = resolve_fonts(&[], &FailingFetcher).await.unwrap_err();
        assert!(matches!(err, Error::FontResolution(_)));
    }

    #[cfg(feature = "remote")]
    #[test]
    fn src_url_extraction_handles_quotes_and_noise() {
        let css = "/* latin */\n@font-face {\n  font-family: 'Bitter';\n  src: url(https://fonts.example/bitter.ttf) format('truetype');\n}";
        assert_eq!(
            extract_src_url(css),
            Some("https://fonts.example/bitter.ttf")
        );

        let quoted = "@font-face { src: url(\"/fonts/a.woff2\") }";
        assert_eq!(extract_src_url(quoted), Some("/fonts/a.woff2"));

        assert_eq!(extract_src_url("body { color: red }"), None);
    }
}
