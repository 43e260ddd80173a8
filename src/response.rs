//! HTTP-style packaging of rendered markup.

use crate::markup::Element;
use crate::{Pipeline, RenderOptions, Result};
use std::collections::HashMap;

/// Content type of every packaged response.
pub const SVG_CONTENT_TYPE: &str = "image/svg+xml";

// Two directives, one switch; deliberately not a configurable TTL.
const CACHE_LONG_LIVED: &str = "public, immutable, no-transform, max-age=31536000";
const CACHE_DEBUG: &str = "no-cache, no-store";

/// A fully-formed transport response: status, headers, rendered body.
///
/// Only the async factories produce one, after the render future settles;
/// there is no half-constructed state to observe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResponse {
    status: u16,
    status_text: String,
    headers: HashMap<String, String>,
    body: String,
}

impl ImageResponse {
    /// Render `element` through `pipeline` and package the result.
    pub async fn new(
        pipeline: &Pipeline,
        element: impl Into<Element>,
        options: &RenderOptions,
    ) -> Result<Self> {
        pipeline.respond(element, options).await
    }

    /// Wrap already-rendered markup with the transport envelope.
    pub fn package(markup: String, options: &RenderOptions) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), SVG_CONTENT_TYPE.to_string());
        let cache = if options.debug {
            CACHE_DEBUG
        } else {
            CACHE_LONG_LIVED
        };
        headers.insert("Cache-Control".to_string(), cache.to_string());

        // Caller headers land last: on collision the caller wins.
        for (name, value) in &options.headers {
            insert_header(&mut headers, name, value);
        }

        let status = options.status.unwrap_or(200);
        let status_text = options
            .status_text
            .clone()
            .unwrap_or_else(|| reason_phrase(status).to_string());

        Self {
            status,
            status_text,
            headers,
            body: markup,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_body(self) -> String {
        self.body
    }
}

/// Insert, replacing any key that matches case-insensitively.
fn insert_header(headers: &mut HashMap<String, String>, name: &str, value: &str) {
    headers.retain(|key, _| !key.eq_ignore_ascii_case(name));
    headers.insert(name.to_string(), value.to_string());
}

/// Canonical reason phrase for common statuses; empty when unknown.
fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        410 => "Gone",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markup() -> String {
        "<svg xmlns=\"http://www.w3.org/2000/svg\"/>".to_string()
    }

    #[test]
    fn default_packaging_is_cacheable_svg() {
        let response = ImageResponse::package(markup(), &RenderOptions::default());
        assert_eq!(response.status(), 200);
        assert_eq!(response.status_text(), "OK");
        assert_eq!(response.header("content-type"), Some(SVG_CONTENT_TYPE));
        assert_eq!(response.header("cache-control"), Some(CACHE_LONG_LIVED));
        assert_eq!(response.body(), markup());
    }

    #[test]
    fn debug_flag_switches_to_no_store() {
        let options = RenderOptions {
            debug: true,
            ..Default::default()
        };
        let response = ImageResponse::package(markup(), &options);
        assert_eq!(response.header("cache-control"), Some(CACHE_DEBUG));
    }

    #[test]
    fn caller_headers_override_defaults_case_insensitively() {
        let mut options = RenderOptions::default();
        options
            .headers
            .insert("cache-control".to_string(), "max-age=60".to_string());
        options
            .headers
            .insert("X-Card".to_string(), "hero".to_string());

        let response = ImageResponse::package(markup(), &options);
        assert_eq!(response.header("Cache-Control"), Some("max-age=60"));
        assert_eq!(response.header("x-card"), Some("hero"));
        // The default entry must be gone, not shadowed.
        assert_eq!(
            response
                .headers()
                .keys()
                .filter(|k| k.eq_ignore_ascii_case("cache-control"))
                .count(),
            1
        );
    }

    #[test]
    fn status_overrides_apply() {
        let options = RenderOptions {
            status: Some(404),
            ..Default::default()
        };
        let response = ImageResponse::package(markup(), &options);
        assert_eq!(response.status(), 404);
        assert_eq!(response.status_text(), "Not Found");

        let options = RenderOptions {
            status: Some(404),
            status_text: Some("Card Missing".to_string()),
            ..Default::default()
        };
        let response = ImageResponse::package(markup(), &options);
        assert_eq!(response.status_text(), "Card Missing");
    }

    #[test]
    fn unknown_status_gets_empty_phrase() {
        let options = RenderOptions {
            status: Some(599),
            ..Default::default()
        };
        let response = ImageResponse::package(markup(), &options);
        assert_eq!(response.status_text(), "");
    }
}
