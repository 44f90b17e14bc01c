use anyhow::Context;
use std::net::SocketAddr;

const DEFAULT_ADDR: &str = "0.0.0.0:8080";

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub(crate) struct ServiceSettings {
    pub(crate) addr: SocketAddr,
    /// Comma-separated seed list from `WOOP_VALID_APP_CODES`.
    pub(crate) valid_app_codes: String,
    pub(crate) admin_token: Option<String>,
}

impl ServiceSettings {
    pub(crate) fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let raw_addr = lookup("APPCODE_SERVICE_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_owned());
        let addr = raw_addr
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid APPCODE_SERVICE_ADDR: {raw_addr}"))?;

        let admin_token = lookup("APPCODE_ADMIN_TOKEN")
            .map(|token| token.trim().to_owned())
            .filter(|token| !token.is_empty());

        Ok(Self {
            addr,
            valid_app_codes: lookup("WOOP_VALID_APP_CODES").unwrap_or_default(),
            admin_token,
        })
    }
}
