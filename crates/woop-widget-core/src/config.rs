//! Widget configuration and its canonical query-string form.

use crate::logo::{LogoResolver, is_network_url};
use crate::origin::WidgetEndpoint;
use serde::{Deserialize, Serialize};
use tracing::warn;
use url::form_urlencoded;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    System,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Modules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_receive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_invest: Option<bool>,
    #[serde(default, rename = "enableNFTs", skip_serializing_if = "Option::is_none")]
    pub enable_nfts: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Networks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mainnet: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sepolia: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimism: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arbitrum: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    #[serde(default)]
    pub app_code: String,
    #[serde(default)]
    pub assets: Vec<String>,
    #[serde(default)]
    pub modules: Modules,
    #[serde(default)]
    pub networks: Networks,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub button_color: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

/// Partial configuration accepted by `updateConfig`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    pub app_code: Option<String>,
    pub assets: Option<Vec<String>>,
    pub modules: Option<Modules>,
    pub networks: Option<Networks>,
    pub theme: Option<Theme>,
    pub button_color: Option<String>,
    pub logo: Option<String>,
}

impl WidgetConfig {
    pub fn merge(&mut self, patch: ConfigPatch) {
        let ConfigPatch {
            app_code,
            assets,
            modules,
            networks,
            theme,
            button_color,
            logo,
        } = patch;

        if let Some(app_code) = app_code {
            self.app_code = app_code;
        }
        if let Some(assets) = assets {
            self.assets = assets;
        }
        if let Some(modules) = modules {
            self.modules = modules;
        }
        if let Some(networks) = networks {
            self.networks = networks;
        }
        if let Some(theme) = theme {
            self.theme = theme;
        }
        if button_color.is_some() {
            self.button_color = button_color;
        }
        if logo.is_some() {
            self.logo = logo;
        }
    }
}

/// Query parameters in the order the hosted widget reads them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetQuery {
    pub app_code: String,
    pub assets: String,
    pub modules: String,
    pub networks: String,
    pub theme: &'static str,
    pub button_color: String,
    pub logo: String,
}

impl WidgetQuery {
    /// `logo` is the already-resolved logo value.
    pub fn from_config(config: &WidgetConfig, logo: String) -> Self {
        Self {
            app_code: config.app_code.clone(),
            assets: config.assets.join(","),
            modules: compact_json(&config.modules),
            networks: compact_json(&config.networks),
            theme: config.theme.as_str(),
            button_color: config.button_color.clone().unwrap_or_default(),
            logo,
        }
    }

    pub fn pairs(&self) -> [(&'static str, &str); 7] {
        [
            ("appCode", self.app_code.as_str()),
            ("assets", self.assets.as_str()),
            ("modules", self.modules.as_str()),
            ("networks", self.networks.as_str()),
            ("theme", self.theme),
            ("buttonColor", self.button_color.as_str()),
            ("logo", self.logo.as_str()),
        ]
    }

    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs())
            .finish()
    }

    pub fn widget_url(&self, endpoint: &WidgetEndpoint) -> String {
        endpoint.with_query(&self.to_query_string())
    }
}

fn compact_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_owned())
}

/// Resolve the logo and build the canonical query.
///
/// Logo conversion never fails the whole operation; it degrades to `""`.
pub async fn normalize(config: &WidgetConfig, resolver: Option<&dyn LogoResolver>) -> WidgetQuery {
    let logo = resolve_logo(config.logo.as_deref(), resolver).await;
    WidgetQuery::from_config(config, logo)
}

async fn resolve_logo(logo: Option<&str>, resolver: Option<&dyn LogoResolver>) -> String {
    let Some(logo) = logo.map(str::trim).filter(|logo| !logo.is_empty()) else {
        return String::new();
    };

    if !is_network_url(logo) {
        return logo.to_owned();
    }

    let Some(resolver) = resolver else {
        warn!("no logo resolver configured; dropping network logo {}", logo);
        return String::new();
    };

    match resolver.resolve(logo).await {
        Ok(data_url) => data_url,
        Err(err) => {
            warn!("logo conversion failed for {}: {}", logo, err);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LogoError;
    use crate::origin::DEFAULT_WIDGET_URL;
    use async_trait::async_trait;
    use std::cell::Cell;

    struct FixedResolver {
        result: Result<String, LogoError>,
        calls: Cell<usize>,
    }

    impl FixedResolver {
        fn new(result: Result<String, LogoError>) -> Self {
            Self {
                result,
                calls: Cell::new(0),
            }
        }
    }

    #[async_trait(?Send)]
    impl LogoResolver for FixedResolver {
        async fn resolve(&self, _url: &str) -> Result<String, LogoError> {
            self.calls.set(self.calls.get() + 1);
            self.result.clone()
        }
    }

    fn query_value(query: &str, key: &str) -> Option<String> {
        form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[tokio::test]
    async fn missing_optionals_default_to_stable_shape() {
        let config = WidgetConfig {
            app_code: "app-1".to_owned(),
            ..Default::default()
        };
        let query = normalize(&config, None).await.to_query_string();

        assert_eq!(
            query,
            "appCode=app-1&assets=&modules=%7B%7D&networks=%7B%7D&theme=light&buttonColor=&logo="
        );
        assert!(!query.contains("undefined"));
    }

    #[tokio::test]
    async fn empty_assets_yield_empty_parameter() {
        let config = WidgetConfig {
            app_code: "app-1".to_owned(),
            assets: Vec::new(),
            ..Default::default()
        };
        let query = normalize(&config, None).await.to_query_string();
        assert_eq!(query_value(&query, "assets").as_deref(), Some(""));
    }

    #[tokio::test]
    async fn values_are_form_encoded() {
        let config = WidgetConfig {
            app_code: "my app".to_owned(),
            assets: vec!["ETH".to_owned(), "USDC".to_owned()],
            modules: Modules {
                enable_receive: Some(true),
                enable_nfts: Some(false),
                ..Default::default()
            },
            networks: Networks {
                base: Some(true),
                ..Default::default()
            },
            theme: Theme::Dark,
            button_color: Some("#4B6BFB".to_owned()),
            logo: Some("data:image/png;base64,AAAA".to_owned()),
        };
        let query = normalize(&config, None).await;
        let encoded = query.to_query_string();

        assert!(encoded.starts_with("appCode=my+app&assets=ETH%2CUSDC&"));
        assert_eq!(
            query_value(&encoded, "modules").as_deref(),
            Some(r#"{"enableReceive":true,"enableNFTs":false}"#)
        );
        assert_eq!(query_value(&encoded, "networks").as_deref(), Some(r#"{"base":true}"#));
        assert_eq!(query_value(&encoded, "theme").as_deref(), Some("dark"));
        assert_eq!(query_value(&encoded, "buttonColor").as_deref(), Some("#4B6BFB"));
        assert_eq!(
            query_value(&encoded, "logo").as_deref(),
            Some("data:image/png;base64,AAAA")
        );
    }

    #[tokio::test]
    async fn network_logo_is_converted() {
        let resolver = FixedResolver::new(Ok("data:image/png;base64,iVBO".to_owned()));
        let config = WidgetConfig {
            logo: Some("https://cdn.example.com/logo.png".to_owned()),
            ..Default::default()
        };
        let query = normalize(&config, Some(&resolver)).await;
        assert_eq!(query.logo, "data:image/png;base64,iVBO");
        assert_eq!(resolver.calls.get(), 1);
    }

    #[tokio::test]
    async fn logo_failure_degrades_to_empty() {
        let resolver = FixedResolver::new(Err(LogoError::Fetch("404".to_owned())));
        let config = WidgetConfig {
            logo: Some("https://cdn.example.com/missing.png".to_owned()),
            ..Default::default()
        };
        assert_eq!(normalize(&config, Some(&resolver)).await.logo, "");
        assert_eq!(normalize(&config, None).await.logo, "");
    }

    #[test]
    fn widget_url_joins_base_and_query() {
        let endpoint = WidgetEndpoint::parse(DEFAULT_WIDGET_URL).unwrap();
        let query = WidgetQuery::from_config(&WidgetConfig::default(), String::new());
        let url = query.widget_url(&endpoint);
        assert!(url.starts_with("http://localhost:3000/widgetext?appCode=&assets="));
    }

    #[test]
    fn merge_only_touches_present_fields() {
        let mut config = WidgetConfig {
            app_code: "app-1".to_owned(),
            assets: vec!["ETH".to_owned()],
            button_color: Some("#000".to_owned()),
            ..Default::default()
        };
        config.merge(ConfigPatch {
            theme: Some(Theme::System),
            assets: Some(Vec::new()),
            ..Default::default()
        });

        assert_eq!(config.app_code, "app-1");
        assert!(config.assets.is_empty());
        assert_eq!(config.theme, Theme::System);
        assert_eq!(config.button_color.as_deref(), Some("#000"));
    }

    #[test]
    fn config_deserializes_from_camel_case() {
        let config: WidgetConfig = serde_json::from_value(serde_json::json!({
            "appCode": "app-2",
            "assets": ["DAI"],
            "modules": { "enableInvest": true },
            "theme": "system",
            "buttonColor": "red"
        }))
        .unwrap();

        assert_eq!(config.app_code, "app-2");
        assert_eq!(config.modules.enable_invest, Some(true));
        assert_eq!(config.networks, Networks::default());
        assert_eq!(config.theme, Theme::System);
        assert_eq!(config.logo, None);
    }
}
