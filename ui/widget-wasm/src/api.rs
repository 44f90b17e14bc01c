//! Network helpers used by the browser build.
//!
//! Logos given as `http(s)` URLs are fetched and inlined as base64 data URLs
//! before they go into the widget query string.

use async_trait::async_trait;
use gloo_net::http::Request;
use tracing::debug;
use woop_widget_core::{LogoError, LogoResolver, data_url};

/// Fetches logos with the page's `fetch`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FetchLogoResolver;

#[async_trait(?Send)]
impl LogoResolver for FetchLogoResolver {
    async fn resolve(&self, url: &str) -> Result<String, LogoError> {
        let response = Request::get(url)
            .send()
            .await
            .map_err(|e| LogoError::Fetch(e.to_string()))?;

        if !response.ok() {
            return Err(LogoError::Fetch(format!(
                "{} returned {} {}",
                url,
                response.status(),
                response.status_text()
            )));
        }

        let mime = response
            .headers()
            .get("content-type")
            .unwrap_or_default();
        let bytes = response
            .binary()
            .await
            .map_err(|e| LogoError::Encode(e.to_string()))?;

        debug!("inlined logo {} ({} bytes, {})", url, bytes.len(), mime);
        Ok(data_url(&mime, &bytes))
    }
}
