//! Embedding options read from the JS config object alongside the widget
//! fields themselves.

use crate::api::FetchLogoResolver;
use serde::Deserialize;
use std::rc::Rc;
use tracing::debug;
use woop_appcode::AppCodeRegistry;
use woop_appcode_http::HttpAppCodeValidator;
use woop_widget_core::{
    AccountsRequest, BridgeOptions, DEFAULT_WIDGET_URL, Dialect, WidgetEndpoint, WidgetError, WidgetSettings,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DialectName {
    #[default]
    WalletInfo,
    WoopConnect,
}

impl From<DialectName> for Dialect {
    fn from(name: DialectName) -> Self {
        match name {
            DialectName::WalletInfo => Dialect::WalletInfo,
            DialectName::WoopConnect => Dialect::WoopConnect,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedOptions {
    #[serde(default)]
    pub widget_url: Option<String>,
    /// App-code service base URL. Takes precedence over `allowed_app_codes`.
    #[serde(default)]
    pub validation_url: Option<String>,
    #[serde(default)]
    pub allowed_app_codes: Option<Vec<String>>,
    /// Use `eth_requestAccounts` instead of `eth_accounts`.
    #[serde(default)]
    pub request_accounts: bool,
    #[serde(default)]
    pub include_chain_id: Option<bool>,
    #[serde(default)]
    pub dialect: DialectName,
    #[serde(default)]
    pub follow_provider_events: bool,
}

impl EmbedOptions {
    pub fn bridge_options(&self) -> BridgeOptions {
        BridgeOptions {
            accounts: if self.request_accounts {
                AccountsRequest::Prompt
            } else {
                AccountsRequest::Passive
            },
            include_chain_id: self.include_chain_id.unwrap_or(true),
            dialect: self.dialect.into(),
        }
    }

    pub fn settings(&self) -> Result<WidgetSettings, WidgetError> {
        let endpoint = WidgetEndpoint::parse(self.widget_url.as_deref().unwrap_or(DEFAULT_WIDGET_URL))?;
        let mut settings = WidgetSettings::new(endpoint)
            .with_bridge(self.bridge_options())
            .with_logo_resolver(Rc::new(FetchLogoResolver));

        if let Some(url) = &self.validation_url {
            debug!("validating app codes against {}", url);
            settings = settings.with_validator(Rc::new(HttpAppCodeValidator::new(Some(url.clone()))));
        } else if let Some(codes) = &self.allowed_app_codes {
            settings = settings.with_validator(Rc::new(AppCodeRegistry::from_codes(codes)));
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> EmbedOptions {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn defaults_target_local_widget_with_passive_accounts() {
        let options = parse(json!({ "appCode": "app-1", "theme": "dark" }));
        assert_eq!(options, EmbedOptions::default());

        let settings = options.settings().unwrap();
        assert_eq!(settings.endpoint.origin().as_str(), "http://localhost:3000");
        assert_eq!(settings.bridge, BridgeOptions::default());
        assert!(settings.validator.is_none());
        assert!(settings.logo_resolver.is_some());
    }

    #[test]
    fn camel_case_fields_are_read() {
        let options = parse(json!({
            "widgetUrl": "https://widget.woopwidget.com/widgetext",
            "requestAccounts": true,
            "includeChainId": false,
            "dialect": "woopConnect",
            "followProviderEvents": true,
        }));

        let bridge = options.bridge_options();
        assert_eq!(bridge.accounts, AccountsRequest::Prompt);
        assert!(!bridge.include_chain_id);
        assert_eq!(bridge.dialect, Dialect::WoopConnect);
        assert!(options.follow_provider_events);
        assert_eq!(
            options.settings().unwrap().endpoint.origin().as_str(),
            "https://widget.woopwidget.com"
        );
    }

    #[test]
    fn allowlist_becomes_validator() {
        let options = parse(json!({ "allowedAppCodes": ["app-1"] }));
        assert!(options.settings().unwrap().validator.is_some());
    }

    #[test]
    fn bad_widget_url_is_a_configuration_error() {
        let options = parse(json!({ "widgetUrl": "javascript:alert(1)" }));
        assert!(matches!(options.settings(), Err(WidgetError::Configuration(_))));
    }

    #[test]
    fn unknown_dialect_is_rejected() {
        assert!(serde_json::from_value::<EmbedOptions>(json!({ "dialect": "legacy" })).is_err());
    }
}
