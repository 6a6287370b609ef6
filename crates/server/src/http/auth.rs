use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use deployment::Deployment;
use services::services::config::{AccessControlConfig, AccessControlMode};
use url::form_urlencoded;
use utils::response::ApiResponse;

use crate::DeploymentImpl;

/// Token gate for the `/api/admin` router. Accepts `Authorization: Bearer`
/// or `X-API-Token` headers. Attachment previews load through `<img>` tags,
/// which cannot set headers, so those requests may carry a `token` query
/// parameter instead.
pub async fn require_api_auth(
    State(deployment): State<DeploymentImpl>,
    req: Request,
    next: Next,
) -> Response {
    let access_control = deployment.config().read().await.access_control.clone();

    if authorized(&access_control, &req) {
        next.run(req).await
    } else {
        log_rejection(&req);
        unauthorized_response()
    }
}

fn authorized(access_control: &AccessControlConfig, req: &Request) -> bool {
    if matches!(access_control.mode, AccessControlMode::Disabled) {
        return true;
    }
    let Some(expected) = access_control
        .token
        .as_deref()
        .filter(|token| !token.trim().is_empty())
    else {
        tracing::warn!(
            "accessControl.mode=TOKEN but accessControl.token is missing; treating as disabled"
        );
        return true;
    };
    if access_control.allow_localhost_bypass && peer_is_loopback(req) {
        return true;
    }
    presented_token(req).as_deref() == Some(expected)
}

fn peer_is_loopback(req: &Request) -> bool {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .is_some_and(|info| info.0.ip().is_loopback())
}

fn presented_token(req: &Request) -> Option<String> {
    let headers = req.headers();
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
    {
        return Some(token.to_string());
    }
    if let Some(token) = headers
        .get("x-api-token")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty())
    {
        return Some(token.to_string());
    }
    // Only draft attachment previews may authenticate via the query string.
    if req.uri().path().ends_with("/preview") {
        return query_token(req.uri().query()?);
    }
    None
}

fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, rest) = header_value.trim().split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| rest.trim())
        .filter(|token| !token.is_empty())
}

fn query_token(query: &str) -> Option<String> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.trim().to_string())
        .filter(|token| !token.is_empty())
}

fn log_rejection(req: &Request) {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    tracing::warn!(
        path = %req.uri().path(),
        method = %req.method(),
        peer = %peer,
        "Unauthorized API request"
    );
}

fn unauthorized_response() -> Response {
    let body = ApiResponse::<()>::error("Unauthorized");
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_parsing_ignores_case_and_padding() {
        assert_eq!(bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(bearer_token("  bearer   abc123  "), Some("abc123"));
        assert_eq!(bearer_token("BEARER abc123"), Some("abc123"));
        assert_eq!(bearer_token("Basic abc123"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("abc123"), None);
    }

    #[test]
    fn query_token_takes_the_first_non_blank_value() {
        assert_eq!(query_token("token=sekrit"), Some("sekrit".to_string()));
        assert_eq!(
            query_token("a=1&token=sekrit&b=2"),
            Some("sekrit".to_string())
        );
        assert_eq!(query_token("token=%20%20"), None);
        assert_eq!(query_token("other=1"), None);
    }
}
