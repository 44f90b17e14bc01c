//! Hosted widget endpoint and the origin trusted for cross-document messages.
//!
//! The origin is always derived from the endpoint URL, so the frame source and
//! the `postMessage` target cannot disagree. A wildcard target is not
//! representable.

use crate::error::EndpointError;
use std::fmt;
use url::Url;

/// Development deployment of the hosted widget application.
pub const DEFAULT_WIDGET_URL: &str = "http://localhost:3000/widgetext";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedOrigin(String);

impl TrustedOrigin {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exact comparison against a `MessageEvent.origin` value.
    pub fn matches(&self, origin: &str) -> bool {
        self.0 == origin
    }
}

impl fmt::Display for TrustedOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetEndpoint {
    url: Url,
    origin: TrustedOrigin,
}

impl WidgetEndpoint {
    pub fn parse(raw: &str) -> Result<Self, EndpointError> {
        let mut url = Url::parse(raw.trim()).map_err(|_| EndpointError::Invalid(raw.to_owned()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(EndpointError::UnsupportedScheme(url.scheme().to_owned()));
        }

        let origin = url.origin();
        if !origin.is_tuple() {
            return Err(EndpointError::OpaqueOrigin(raw.to_owned()));
        }

        // Query and fragment are rebuilt from the widget config on every render.
        url.set_query(None);
        url.set_fragment(None);

        Ok(Self {
            origin: TrustedOrigin(origin.ascii_serialization()),
            url,
        })
    }

    pub fn origin(&self) -> &TrustedOrigin {
        &self.origin
    }

    pub fn base_url(&self) -> &str {
        self.url.as_str()
    }

    pub fn with_query(&self, query: &str) -> String {
        format!("{}?{}", self.base_url(), query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_is_derived_from_url() {
        let endpoint = WidgetEndpoint::parse("https://widget.example.com:8443/embed?x=1#top").unwrap();
        assert_eq!(endpoint.origin().as_str(), "https://widget.example.com:8443");
        assert_eq!(endpoint.base_url(), "https://widget.example.com:8443/embed");
    }

    #[test]
    fn default_port_is_omitted_from_origin() {
        let endpoint = WidgetEndpoint::parse("https://widget.example.com:443/embed").unwrap();
        assert!(endpoint.origin().matches("https://widget.example.com"));
        assert!(!endpoint.origin().matches("https://widget.example.com:443"));
    }

    #[test]
    fn development_endpoint_origin() {
        let parsed = WidgetEndpoint::parse(DEFAULT_WIDGET_URL).unwrap();
        assert_eq!(parsed.origin().as_str(), "http://localhost:3000");
        assert_eq!(parsed.with_query("a=1"), "http://localhost:3000/widgetext?a=1");
    }

    #[test]
    fn non_web_schemes_are_rejected() {
        assert_eq!(
            WidgetEndpoint::parse("file:///tmp/widget.html"),
            Err(EndpointError::UnsupportedScheme("file".to_owned()))
        );
        assert!(matches!(
            WidgetEndpoint::parse("not a url"),
            Err(EndpointError::Invalid(_))
        ));
    }

    #[test]
    fn wildcard_is_never_trusted() {
        let endpoint = WidgetEndpoint::parse(DEFAULT_WIDGET_URL).unwrap();
        assert!(!endpoint.origin().matches("*"));
        assert!(!endpoint.origin().matches("http://localhost:3001"));
    }
}
