use crate::error::LogoError;
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};

/// Turns a network image URL into an embeddable data URL.
#[async_trait(?Send)]
pub trait LogoResolver {
    async fn resolve(&self, url: &str) -> Result<String, LogoError>;
}

pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    let mime = mime.split(';').next().unwrap_or_default().trim();
    let mime = if mime.is_empty() { "application/octet-stream" } else { mime };
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

pub(crate) fn is_network_url(logo: &str) -> bool {
    let lower = logo.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
