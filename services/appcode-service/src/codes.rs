use axum::{Json, extract::State, http::HeaderMap};
use tracing::{info, warn};
use woop_api_types::{
    RegisterAppCodeRequest, RegisterAppCodeResponse, ValidateAppCodeRequest, ValidateAppCodeResponse,
};

use crate::{ApiResult, AppState, bad_request, forbidden, internal_error, unauthorized};

pub(crate) async fn validate_app_code(
    State(state): State<AppState>,
    Json(request): Json<ValidateAppCodeRequest>,
) -> ApiResult<ValidateAppCodeResponse> {
    let valid = state
        .registry
        .contains(&request.app_code)
        .map_err(internal_error)?;

    if !valid {
        warn!("Invalid appCode: {}", request.app_code);
    }

    Ok(Json(ValidateAppCodeResponse {
        app_code: request.app_code,
        valid,
    }))
}

pub(crate) async fn register_app_code(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RegisterAppCodeRequest>,
) -> ApiResult<RegisterAppCodeResponse> {
    let Some(expected) = state.admin_token.as_deref() else {
        return Err(forbidden("app code registration is disabled"));
    };

    let auth_header = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| unauthorized("missing Authorization header"))?;

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        return Err(unauthorized("invalid Authorization format"));
    };

    if token.trim() != expected {
        return Err(unauthorized("invalid admin token"));
    }

    if request.app_code.trim().is_empty() {
        return Err(bad_request("appCode is required"));
    }

    let registered = state
        .registry
        .register(&request.app_code)
        .map_err(internal_error)?;
    if registered {
        info!("registered appCode {}", request.app_code.trim());
    }

    Ok(Json(RegisterAppCodeResponse {
        app_code: request.app_code.trim().to_owned(),
        registered,
        total: state.registry.len(),
    }))
}

#[cfg(test)]
mod tests {
    use crate::{AppState, app};
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;
    use woop_appcode::AppCodeRegistry;

    fn state(codes: &str, admin_token: Option<&str>) -> AppState {
        AppState {
            registry: Arc::new(AppCodeRegistry::from_csv(codes)),
            admin_token: admin_token.map(Arc::from),
        }
    }

    fn post_json(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn call(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = app(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn known_code_is_valid() {
        let (status, body) = call(
            state("app-1,app-2", None),
            post_json("/app-codes/validate", json!({ "appCode": "app-2" }), None),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "appCode": "app-2", "valid": true }));
    }

    #[tokio::test]
    async fn unknown_and_empty_codes_are_invalid() {
        for code in ["nope", ""] {
            let (status, body) = call(
                state("app-1", None),
                post_json("/app-codes/validate", json!({ "appCode": code }), None),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["valid"], json!(false));
        }
    }

    #[tokio::test]
    async fn registration_disabled_without_admin_token() {
        let (status, _) = call(
            state("", None),
            post_json("/app-codes", json!({ "appCode": "app-3" }), Some("anything")),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn registration_requires_matching_token() {
        let (status, _) = call(
            state("", Some("s3cret")),
            post_json("/app-codes", json!({ "appCode": "app-3" }), None),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(
            state("", Some("s3cret")),
            post_json("/app-codes", json!({ "appCode": "app-3" }), Some("wrong")),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn registered_code_validates_afterwards() {
        let shared = state("app-1", Some("s3cret"));

        let (status, body) = call(
            shared.clone(),
            post_json("/app-codes", json!({ "appCode": " app-3 " }), Some("s3cret")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "appCode": "app-3", "registered": true, "total": 2 }));

        let (_, body) = call(
            shared,
            post_json("/app-codes/validate", json!({ "appCode": "app-3" }), None),
        )
        .await;
        assert_eq!(body["valid"], json!(true));
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = call(state("", None), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], json!("ok"));
    }
}
