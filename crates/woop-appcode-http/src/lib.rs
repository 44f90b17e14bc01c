use anyhow::{Context, Result};
use async_trait::async_trait;
use woop_api_types::{ValidateAppCodeRequest, ValidateAppCodeResponse};
use woop_appcode::AppCodeValidator;
use tracing::warn;

pub const DEFAULT_APPCODE_URL: &str = "http://localhost:8080";

/// Remote app-code validation against the app-code service.
///
/// Reads `WOOP_APPCODE_URL` when no endpoint is given
/// (default: `http://localhost:8080`). The environment lookup is skipped on
/// wasm32, where there is no process environment.
pub struct HttpAppCodeValidator {
    endpoint: String,
    http: reqwest::Client,
}

impl Default for HttpAppCodeValidator {
    fn default() -> Self {
        Self::new(None)
    }
}

impl HttpAppCodeValidator {
    pub fn new(endpoint: Option<String>) -> Self {
        let endpoint = endpoint
            .or_else(env_endpoint)
            .unwrap_or_else(|| DEFAULT_APPCODE_URL.to_string());
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn validate_url(&self) -> String {
        format!("{}/app-codes/validate", self.endpoint)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn env_endpoint() -> Option<String> {
    std::env::var("WOOP_APPCODE_URL").ok()
}

#[cfg(target_arch = "wasm32")]
fn env_endpoint() -> Option<String> {
    None
}

#[async_trait(?Send)]
impl AppCodeValidator for HttpAppCodeValidator {
    async fn validate(&self, app_code: &str) -> Result<bool> {
        if app_code.trim().is_empty() {
            return Ok(false);
        }

        let body = ValidateAppCodeRequest {
            app_code: app_code.to_owned(),
        };

        let response = self
            .http
            .post(self.validate_url())
            .json(&body)
            .send()
            .await
            .context("app code validation transport")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("app code validation HTTP {status}: {text}");
        }

        let body: ValidateAppCodeResponse = response
            .json()
            .await
            .context("app code validation parse")?;

        if body.app_code != app_code {
            warn!(
                "app code service answered for '{}' while '{}' was asked",
                body.app_code, app_code
            );
            return Ok(false);
        }

        Ok(body.valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_trailing_slash_is_trimmed() {
        let validator = HttpAppCodeValidator::new(Some("https://codes.example.com/".to_owned()));
        assert_eq!(validator.endpoint(), "https://codes.example.com");
        assert_eq!(
            validator.validate_url(),
            "https://codes.example.com/app-codes/validate"
        );
    }

    #[test]
    fn request_body_is_camel_case() {
        let body = ValidateAppCodeRequest {
            app_code: "app-1".to_owned(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "appCode": "app-1" })
        );
    }
}
