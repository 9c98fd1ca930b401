use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::StratzError;

/// A GraphQL operation: the query text plus its variables.
#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest {
    #[serde(skip)]
    pub operation: &'static str,
    pub query: &'static str,
    pub variables: Option<serde_json::Value>,
}

/// Transport seam between the pipeline and the STRATZ API.
#[async_trait]
pub trait GraphQlFetcher: Send + Sync {
    /// Posts `request` to the configured endpoint and returns the whole
    /// response body, `errors` included. Non-2xx, transport and parse
    /// failures are errors; see [`check_graphql_errors`] for the payload.
    async fn execute(
        &self,
        config: &ApiConfig,
        request: &GraphQlRequest,
    ) -> Result<serde_json::Value, StratzError>;
}

#[derive(Clone)]
pub struct StratzClient {
    pub(crate) http: Client,
}

impl StratzClient {
    pub fn new(timeout: Duration) -> Result<Self, StratzError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    pub(crate) fn auth_headers(&self, config: &ApiConfig) -> Result<HeaderMap, StratzError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| StratzError::InvalidConfig("token is not a valid header value".into()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        // STRATZ rejects requests without this agent
        headers.insert(USER_AGENT, HeaderValue::from_static("STRATZ_API"));
        Ok(headers)
    }
}

#[async_trait]
impl GraphQlFetcher for StratzClient {
    async fn execute(
        &self,
        config: &ApiConfig,
        request: &GraphQlRequest,
    ) -> Result<serde_json::Value, StratzError> {
        debug!(operation = request.operation, endpoint = %config.endpoint, "sending GraphQL request");
        let resp = self
            .http
            .post(&config.endpoint)
            .headers(self.auth_headers(config)?)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .text()
                .await
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("").to_string());
            warn!(operation = request.operation, status = status.as_u16(), "GraphQL request rejected");
            return Err(StratzError::ApiError { status: status.as_u16(), message });
        }

        Ok(serde_json::from_slice(&resp.bytes().await?)?)
    }
}

/// A response carrying `errors` but no `data` is a failed call. Partial
/// data with errors is kept.
pub fn check_graphql_errors(body: &serde_json::Value) -> Result<(), StratzError> {
    let has_data = body.get("data").map_or(false, |d| !d.is_null());
    if has_data {
        return Ok(());
    }
    let message = body["errors"]
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e["message"].as_str())
                .collect::<Vec<_>>()
                .join("; ")
        })
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "response has no data".to_string());
    Err(StratzError::GraphQl(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_request_body_shape() {
        let request = GraphQlRequest {
            operation: "op",
            query: "query { x }",
            variables: None,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body, json!({ "query": "query { x }", "variables": null }));
    }

    #[test]
    fn test_errors_without_data_fail() {
        let body = json!({ "data": null, "errors": [{ "message": "bad id" }, { "message": "again" }] });
        match check_graphql_errors(&body) {
            Err(StratzError::GraphQl(message)) => assert_eq!(message, "bad id; again"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(check_graphql_errors(&json!({})), Err(StratzError::GraphQl(_))));
    }

    #[test]
    fn test_partial_data_kept() {
        let body = json!({ "data": { "player": null }, "errors": [{ "message": "partial" }] });
        assert!(check_graphql_errors(&body).is_ok());
    }

    #[test]
    fn test_auth_headers() {
        let client = StratzClient::new(Duration::from_secs(1)).unwrap();
        let config = ApiConfig { token: "abc".into(), endpoint: "https://e".into() };
        let headers = client.auth_headers(&config).unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer abc");
        assert!(headers[AUTHORIZATION].is_sensitive());

        let bad = ApiConfig { token: "a\nb".into(), endpoint: "https://e".into() };
        assert!(matches!(client.auth_headers(&bad), Err(StratzError::InvalidConfig(_))));
    }

    type Seen = Arc<Mutex<Option<(String, serde_json::Value)>>>;

    fn record_request(seen: &Seen, headers: &HeaderMap, body: serde_json::Value) {
        let auth = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        *seen.lock().unwrap() = Some((auth, body));
    }

    async fn unauthorized(
        State(seen): State<Seen>,
        headers: HeaderMap,
        Json(body): Json<serde_json::Value>,
    ) -> (StatusCode, &'static str) {
        record_request(&seen, &headers, body);
        (StatusCode::UNAUTHORIZED, "nope")
    }

    async fn errors_only(
        State(seen): State<Seen>,
        headers: HeaderMap,
        Json(body): Json<serde_json::Value>,
    ) -> Json<serde_json::Value> {
        record_request(&seen, &headers, body);
        Json(json!({ "data": null, "errors": [{ "message": "player not found" }] }))
    }

    async fn local_endpoint(seen: Seen) -> String {
        let app = Router::new()
            .route("/unauthorized", post(unauthorized))
            .route("/errors", post(errors_only))
            .with_state(seen);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{}", addr)
    }

    fn sample_request() -> GraphQlRequest {
        GraphQlRequest {
            operation: "playerInfo",
            query: "query playerInfo($steamid: Long!) { player(steamAccountId: $steamid) { matchCount } }",
            variables: Some(json!({ "steamid": 123456789 })),
        }
    }

    #[tokio::test]
    async fn test_execute_sends_bearer_json_and_rejects_non_success() {
        let seen = Seen::default();
        let base = local_endpoint(seen.clone()).await;
        let client = StratzClient::new(Duration::from_secs(5)).unwrap();
        let config = ApiConfig { token: "abc".into(), endpoint: format!("{}/unauthorized", base) };

        match client.execute(&config, &sample_request()).await {
            Err(StratzError::ApiError { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "nope");
            }
            other => panic!("unexpected {:?}", other),
        }

        let (auth, body) = seen.lock().unwrap().take().unwrap();
        assert_eq!(auth, "Bearer abc");
        assert_eq!(body["query"], sample_request().query);
        assert_eq!(body["variables"], json!({ "steamid": 123456789 }));
    }

    #[tokio::test]
    async fn test_execute_returns_error_payloads() {
        let seen = Seen::default();
        let base = local_endpoint(seen.clone()).await;
        let client = StratzClient::new(Duration::from_secs(5)).unwrap();
        let config = ApiConfig { token: "abc".into(), endpoint: format!("{}/errors", base) };

        let body = client.execute(&config, &sample_request()).await.unwrap();
        assert_eq!(body["errors"][0]["message"], "player not found");
        assert!(matches!(check_graphql_errors(&body), Err(StratzError::GraphQl(_))));
    }
}
