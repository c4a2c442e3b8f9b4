//! `RequestClient`: base URL, default headers, bearer auth and timeouts for
//! outgoing JSON requests.
//!
//! # Design
//! Every call is split in three: `build_request` produces an `HttpRequest`
//! from the client's current configuration, a `Transport` executes it under
//! the configured timeout, and `parse_response` turns the `HttpResponse` into
//! either a `Response` or an `Error`. Building and parsing never do I/O.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, Error, Result};
use crate::http::{Headers, HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{RequestOptions, Response};

/// Base URL used by `RequestClient::default()`.
pub const DEFAULT_BASE_URL: &str = "/api";

const AUTHORIZATION: &str = "Authorization";

/// Client for a JSON API rooted at `base_url`.
///
/// Configuration is read when a call starts; changing it with `set_token`
/// requires `&mut self`, so it cannot happen while a call borrowed from the
/// same client is in flight.
#[derive(Debug, Clone)]
pub struct RequestClient<T = ReqwestTransport> {
    base_url: String,
    timeout: Duration,
    headers: Headers,
    token: Option<String>,
    transport: T,
}

impl RequestClient<ReqwestTransport> {
    pub fn new(base_url: &str, config: ClientConfig) -> Self {
        Self::with_transport(base_url, config, ReqwestTransport::new())
    }
}

impl Default for RequestClient<ReqwestTransport> {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, ClientConfig::default())
    }
}

impl<T> RequestClient<T> {
    pub fn with_transport(base_url: &str, config: ClientConfig, transport: T) -> Self {
        let mut headers = Headers::new();
        headers.set("Content-Type", "application/json");
        headers.merge(&config.headers);

        let mut client = Self {
            base_url: base_url.to_string(),
            timeout: config.effective_timeout(),
            headers,
            token: None,
            transport,
        };
        if config.token.is_some() {
            client.set_token(config.token.as_deref());
        }
        client
    }

    /// Set or clear the bearer token.
    ///
    /// A non-empty token sets `Authorization: Bearer <token>`. `None` or an
    /// empty string removes the header entirely.
    pub fn set_token(&mut self, token: Option<&str>) {
        match token.filter(|token| !token.is_empty()) {
            Some(token) => {
                self.headers.set(AUTHORIZATION, format!("Bearer {token}"));
                self.token = Some(token.to_string());
            }
            None => {
                self.headers.remove(AUTHORIZATION);
                self.token = None;
            }
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Headers sent with every request, including `Authorization` when a
    /// token is set.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build the request for `method` on `base_url + endpoint`.
    ///
    /// The endpoint is appended as-is. `body`, when present, is encoded as
    /// JSON; per-call headers are merged over the client's headers.
    pub fn build_request<B>(
        &self,
        method: impl Into<HttpMethod>,
        endpoint: &str,
        body: Option<&B>,
        options: &RequestOptions,
    ) -> Result<HttpRequest>
    where
        B: Serialize + ?Sized,
    {
        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(Error::Serialization)?;

        Ok(HttpRequest {
            method: method.into(),
            url: format!("{}{endpoint}", self.base_url),
            headers: self.headers.merged(&options.headers),
            body,
        })
    }

    /// Map a response to the call outcome.
    ///
    /// 2xx with a JSON content type is parsed, other 2xx responses are
    /// returned raw, and anything else becomes `Error::Api`.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Response> {
        if !response.is_success() {
            return Err(api_error(&response).into());
        }
        if response.is_json() {
            let value = serde_json::from_slice(&response.body).map_err(Error::Decode)?;
            return Ok(Response::Json(value));
        }
        Ok(Response::Raw(response))
    }
}

impl<T: Transport> RequestClient<T> {
    /// Issue one request and wait for its outcome, at most `timeout()`.
    ///
    /// When the timeout fires the transport future is dropped, aborting the
    /// request, and the call fails with `Error::Timeout`.
    pub async fn request<B>(
        &self,
        method: impl Into<HttpMethod>,
        endpoint: &str,
        body: Option<&B>,
        options: &RequestOptions,
    ) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        let request = self.build_request(method, endpoint, body, options)?;
        let method = request.method.clone();
        let url = request.url.clone();
        debug!(%method, %url, "sending request");

        let response = match tokio::time::timeout(self.timeout, self.transport.execute(request)).await {
            Ok(response) => response?,
            Err(_) => {
                warn!(%method, %url, timeout_ms = self.timeout.as_millis() as u64, "request timed out");
                return Err(Error::Timeout {
                    timeout: self.timeout,
                });
            }
        };
        debug!(%method, %url, status = response.status, "received response");

        self.parse_response(response).inspect_err(|err| {
            if let Error::Api(err) = err {
                debug!(%method, %url, status = ?err.status_code, message = %err.message, "request failed");
            }
        })
    }

    pub async fn get(&self, endpoint: &str, options: &RequestOptions) -> Result<Response> {
        self.request(HttpMethod::Get, endpoint, None::<&()>, options).await
    }

    pub async fn post<B>(&self, endpoint: &str, body: &B, options: &RequestOptions) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        self.request(HttpMethod::Post, endpoint, Some(body), options).await
    }

    pub async fn put<B>(&self, endpoint: &str, body: &B, options: &RequestOptions) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        self.request(HttpMethod::Put, endpoint, Some(body), options).await
    }

    pub async fn patch<B>(&self, endpoint: &str, body: &B, options: &RequestOptions) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        self.request(HttpMethod::Patch, endpoint, Some(body), options).await
    }

    pub async fn delete(&self, endpoint: &str, options: &RequestOptions) -> Result<Response> {
        self.request(HttpMethod::Delete, endpoint, None::<&()>, options).await
    }
}

/// Build the error for a failure response. A `message` field in a JSON body
/// wins when it is a non-empty string, a number or a boolean; otherwise the
/// status line is used.
fn api_error(response: &HttpResponse) -> ApiError {
    let message = serde_json::from_slice::<serde_json::Value>(&response.body)
        .ok()
        .and_then(|body| match body.get("message") {
            Some(serde_json::Value::String(message)) if !message.is_empty() => Some(message.clone()),
            Some(message @ (serde_json::Value::Number(_) | serde_json::Value::Bool(_))) => {
                Some(message.to_string())
            }
            _ => None,
        })
        .unwrap_or_else(|| {
            format!("HTTP {} {}", response.status, response.status_text)
                .trim_end()
                .to_string()
        });
    ApiError::new(message, response.status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> RequestClient<()> {
        RequestClient::with_transport("http://localhost:3000/api", ClientConfig::default(), ())
    }

    fn no_options() -> RequestOptions {
        RequestOptions::default()
    }

    #[test]
    fn default_headers_declare_json() {
        let client = client();
        assert_eq!(client.headers().get("content-type"), Some("application/json"));
        assert!(!client.headers().contains("authorization"));
        assert_eq!(client.timeout(), Duration::from_millis(30_000));
    }

    #[test]
    fn config_headers_override_defaults() {
        let config = ClientConfig::new().header("content-type", "application/vnd.api+json").header("X-App", "web");
        let client = RequestClient::with_transport("/api", config, ());
        assert_eq!(client.headers().get("Content-Type"), Some("application/vnd.api+json"));
        assert_eq!(client.headers().get("x-app"), Some("web"));
        assert_eq!(client.headers().len(), 2);
    }

    #[test]
    fn config_token_sets_authorization() {
        let client = RequestClient::with_transport("/api", ClientConfig::new().token("abc"), ());
        assert_eq!(client.token(), Some("abc"));
        assert_eq!(client.headers().get("authorization"), Some("Bearer abc"));
    }

    #[test]
    fn config_without_token_keeps_caller_authorization() {
        let config = ClientConfig::new().header("Authorization", "Basic dTpw");
        let client = RequestClient::with_transport("/api", config, ());
        assert_eq!(client.headers().get("authorization"), Some("Basic dTpw"));
    }

    #[test]
    fn set_token_then_clear_removes_header() {
        let mut client = client();
        client.set_token(Some("abc"));
        assert_eq!(client.headers().get("Authorization"), Some("Bearer abc"));
        client.set_token(Some("def"));
        assert_eq!(client.headers().get("Authorization"), Some("Bearer def"));
        client.set_token(None);
        assert!(!client.headers().contains("Authorization"));
        assert!(client.token().is_none());
        client.set_token(None);
        assert!(!client.headers().contains("Authorization"));
    }

    #[test]
    fn empty_token_clears() {
        let mut client = client();
        client.set_token(Some("abc"));
        client.set_token(Some(""));
        assert!(client.token().is_none());
        assert!(!client.headers().contains("Authorization"));
    }

    #[test]
    fn build_get_has_no_body() {
        let req = client()
            .build_request(HttpMethod::Get, "/things/1", None::<&()>, &no_options())
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/api/things/1");
        assert!(req.body.is_none());
        assert_eq!(req.headers.get("content-type"), Some("application/json"));
    }

    #[test]
    fn build_post_encodes_body() {
        let req = client()
            .build_request(HttpMethod::Post, "/things", Some(&json!({"name": "x"})), &no_options())
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"name": "x"}));
    }

    #[test]
    fn endpoint_is_appended_verbatim() {
        let client = RequestClient::with_transport("http://h/api/", ClientConfig::default(), ());
        let req = client.build_request("GET", "/things", None::<&()>, &no_options()).unwrap();
        assert_eq!(req.url, "http://h/api//things");
        let req = client.build_request("GET", "things", None::<&()>, &no_options()).unwrap();
        assert_eq!(req.url, "http://h/api/things");
    }

    #[test]
    fn unknown_method_is_forwarded() {
        let req = client().build_request("purge", "/cache", None::<&()>, &no_options()).unwrap();
        assert_eq!(req.method.as_str(), "purge");
    }

    #[test]
    fn per_call_headers_win() {
        let mut client = client();
        client.set_token(Some("abc"));
        let options = RequestOptions::new()
            .header("CONTENT-TYPE", "text/csv")
            .header("X-Request-Id", "42");
        let req = client.build_request("POST", "/upload", Some("a,b"), &options).unwrap();
        assert_eq!(req.headers.get("content-type"), Some("text/csv"));
        assert_eq!(req.headers.get("x-request-id"), Some("42"));
        assert_eq!(req.headers.get("authorization"), Some("Bearer abc"));
        assert_eq!(client.headers().get("content-type"), Some("application/json"));
    }

    #[test]
    fn parse_json_success() {
        let response = HttpResponse::new(200, r#"{"id":1}"#).with_header("Content-Type", "application/json");
        let outcome = client().parse_response(response).unwrap();
        assert_eq!(outcome, Response::Json(json!({"id": 1})));
    }

    #[test]
    fn parse_non_json_success_is_raw() {
        let response = HttpResponse::new(200, "hello").with_header("content-type", "text/plain");
        let outcome = client().parse_response(response.clone()).unwrap();
        assert_eq!(outcome, Response::Raw(response));
    }

    #[test]
    fn parse_success_without_content_type_is_raw() {
        let outcome = client().parse_response(HttpResponse::new(204, "")).unwrap();
        assert!(matches!(outcome, Response::Raw(ref r) if r.status == 204));
    }

    #[test]
    fn parse_invalid_json_success_is_decode_error() {
        let response = HttpResponse::new(200, "{oops").with_header("content-type", "application/json");
        let err = client().parse_response(response).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn parse_error_uses_message_field() {
        let response = HttpResponse::new(404, r#"{"message":"not found"}"#)
            .with_header("content-type", "application/json");
        let err = client().parse_response(response).unwrap_err();
        assert!(matches!(err, Error::Api(ref e) if e.message == "not found"));
        assert_eq!(err.status_code(), Some(404));
    }

    #[test]
    fn parse_error_with_text_body_uses_status_line() {
        let err = client()
            .parse_response(HttpResponse::new(500, "<html>boom</html>"))
            .unwrap_err();
        assert_eq!(err.to_string(), "HTTP 500 Internal Server Error");
        assert_eq!(err.status_code(), Some(500));
    }

    #[test]
    fn parse_error_without_message_field_uses_status_line() {
        let response = HttpResponse::new(422, r#"{"error":"bad"}"#);
        let err = client().parse_response(response).unwrap_err();
        assert_eq!(err.to_string(), "HTTP 422 Unprocessable Entity");
    }

    #[test]
    fn parse_error_uses_scalar_message_text() {
        let err = client()
            .parse_response(HttpResponse::new(400, r#"{"message":42}"#))
            .unwrap_err();
        assert_eq!(err.to_string(), "42");
        assert_eq!(err.status_code(), Some(400));

        let err = client()
            .parse_response(HttpResponse::new(409, r#"{"message":true}"#))
            .unwrap_err();
        assert_eq!(err.to_string(), "true");
    }

    #[test]
    fn parse_error_ignores_structured_or_empty_message() {
        for body in [r#"{"message":{"code":7}}"#, r#"{"message":[1]}"#, r#"{"message":null}"#, r#"{"message":""}"#] {
            let err = client().parse_response(HttpResponse::new(400, body)).unwrap_err();
            assert_eq!(err.to_string(), "HTTP 400 Bad Request", "body {body}");
        }
    }

    #[test]
    fn parse_error_keeps_custom_status_text() {
        let mut response = HttpResponse::new(503, "");
        response.status_text = "Down For Maintenance".to_string();
        let err = client().parse_response(response).unwrap_err();
        assert_eq!(err.to_string(), "HTTP 503 Down For Maintenance");
    }
}
