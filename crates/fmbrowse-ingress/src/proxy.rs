//! Development proxy for the Data API
//!
//! Forwards any request under `/fmi/` to the configured server, keeping the
//! method, query string and body. When the client did not send credentials
//! the proxy adds them: Basic auth for session creation, the shared session
//! token for everything else.

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use fmbrowse_egress::{EgressError, SessionManager};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Path prefix handled by the proxy
pub const PROXY_PREFIX: &str = "/fmi";

/// Proxy error
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Body read error: {0}")]
    BodyReadError(String),

    #[error("Session error: {0}")]
    Session(#[from] EgressError),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match &self {
            ProxyError::BodyReadError(_) => StatusCode::BAD_REQUEST,
            ProxyError::Session(EgressError::AuthFailed { status_code, .. }) => {
                StatusCode::from_u16(*status_code).unwrap_or(StatusCode::UNAUTHORIZED)
            }
            _ => StatusCode::BAD_GATEWAY,
        };

        let body = serde_json::json!({
            "error": "Internal Proxy Error",
            "details": self.to_string(),
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Shared proxy state
pub struct ProxyState {
    session: Arc<SessionManager>,
    upstream: String,
}

impl ProxyState {
    pub fn new(session: Arc<SessionManager>) -> Self {
        let upstream = session.config().base_url.trim_end_matches('/').to_string();
        Self { session, upstream }
    }

    pub fn upstream(&self) -> &str {
        &self.upstream
    }

    /// Upstream URL for a proxied path (which still carries the `/fmi` prefix)
    fn build_url(&self, path: &str, query: Option<&str>) -> String {
        let mut url = format!("{}/{}", self.upstream, path.trim_start_matches('/'));
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    /// Credentials to attach when the client sent none
    async fn injected_authorization(&self, path: &str) -> Result<String, ProxyError> {
        if path.trim_end_matches('/').ends_with("/sessions") {
            let config = self.session.config();
            let credentials = STANDARD.encode(format!("{}:{}", config.username, config.password));
            return Ok(format!("Basic {}", credentials));
        }

        let token = self.session.token().await?;
        Ok(format!("Bearer {}", token))
    }
}

/// Build the proxy router
pub fn router(state: Arc<ProxyState>) -> Router {
    Router::new()
        .route(&format!("{}/{{*path}}", PROXY_PREFIX), any(proxy_handler))
        .with_state(state)
}

async fn proxy_handler(
    State(state): State<Arc<ProxyState>>,
    req: Request,
) -> Result<Response, ProxyError> {
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);
    let method = req.method().clone();

    let (parts, body) = req.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Failed to read request body: {}", e);
            return Err(ProxyError::BodyReadError(e.to_string()));
        }
    };

    let mut headers = parts.headers;
    if !headers.contains_key(header::AUTHORIZATION) {
        let value = state.injected_authorization(&path).await?;
        match HeaderValue::from_str(&value) {
            Ok(value) => {
                headers.insert(header::AUTHORIZATION, value);
            }
            Err(e) => warn!("Skipping unusable authorization value: {}", e),
        }
    }

    let url = state.build_url(&path, query.as_deref());
    proxy_request(&state, &url, method, headers, body_bytes).await
}

/// Send the request upstream and relay the reply unchanged
async fn proxy_request(
    state: &ProxyState,
    url: &str,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ProxyError> {
    debug!("Proxying {} to {}", method, url);

    let mut req_builder = state
        .session
        .client()
        .request(method, url)
        .body(body.to_vec());

    for (name, value) in headers.iter() {
        let name_str = name.as_str();
        if is_hop_by_hop_header(name_str)
            || name_str.eq_ignore_ascii_case("host")
            || name_str.eq_ignore_ascii_case("content-length")
        {
            continue;
        }
        req_builder = req_builder.header(name.clone(), value.clone());
    }

    let response = req_builder.send().await.map_err(|e| {
        error!("Proxy error: {}", e);
        ProxyError::from(e)
    })?;

    let status = response.status();
    let upstream_headers = response.headers().clone();
    let response_bytes = response.bytes().await?;

    debug!(
        "Proxy response: {} bytes, status: {}",
        response_bytes.len(),
        status
    );

    let mut response_header_map = HeaderMap::new();
    for (name, value) in upstream_headers.iter() {
        if is_hop_by_hop_header(name.as_str()) {
            continue;
        }
        response_header_map.append(name.clone(), value.clone());
    }

    let mut response = Response::new(Body::from(response_bytes));
    *response.status_mut() = status;
    *response.headers_mut() = response_header_map;

    Ok(response)
}

/// Check if a header is a hop-by-hop header that should not be forwarded
fn is_hop_by_hop_header(name: &str) -> bool {
    matches!(
        name.to_lowercase().as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailers"
            | "transfer-encoding"
            | "upgrade"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmbrowse_egress::FileMakerConfig;

    fn state(base_url: &str) -> ProxyState {
        let config =
            FileMakerConfig::new("unused", "Sales", "web", "secret").with_base_url(base_url);
        ProxyState::new(Arc::new(SessionManager::new(config).unwrap()))
    }

    #[test]
    fn test_is_hop_by_hop_header() {
        assert!(is_hop_by_hop_header("Connection"));
        assert!(is_hop_by_hop_header("keep-alive"));
        assert!(is_hop_by_hop_header("Transfer-Encoding"));

        assert!(!is_hop_by_hop_header("Content-Type"));
        assert!(!is_hop_by_hop_header("Authorization"));
    }

    #[test]
    fn test_build_url_keeps_prefix_and_query() {
        let state = state("https://fms.example.com/");
        assert_eq!(state.upstream(), "https://fms.example.com");
        assert_eq!(
            state.build_url("/fmi/data/vLatest/productInfo", None),
            "https://fms.example.com/fmi/data/vLatest/productInfo"
        );
        assert_eq!(
            state.build_url("/fmi/data/vLatest/databases/Sales/layouts/CMT_Web/records", Some("_limit=5")),
            "https://fms.example.com/fmi/data/vLatest/databases/Sales/layouts/CMT_Web/records?_limit=5"
        );
        assert_eq!(state.build_url("/fmi/x", Some("")), "https://fms.example.com/fmi/x");
    }

    #[tokio::test]
    async fn test_sessions_path_gets_basic_auth() {
        let state = state("https://fms.example.com");
        let auth = state
            .injected_authorization("/fmi/data/vLatest/databases/Sales/sessions")
            .await
            .unwrap();
        assert_eq!(auth, format!("Basic {}", STANDARD.encode("web:secret")));
    }

    #[test]
    fn test_auth_failure_maps_to_upstream_status() {
        let response = ProxyError::Session(EgressError::AuthFailed {
            status_code: 401,
            message: "denied".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = ProxyError::BodyReadError("truncated".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
