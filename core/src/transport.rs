//! The I/O half of a request.
//!
//! `RequestClient` never touches the network itself; it hands a built
//! `HttpRequest` to a `Transport` and parses whatever comes back. Dropping
//! the future returned by `execute` must abort the in-flight request, which
//! is how the client enforces its timeout.

use async_trait::async_trait;
use bytes::Bytes;
use hyper::ext::ReasonPhrase;

use crate::error::TransportError;
use crate::http::{Headers, HttpRequest, HttpResponse};

/// Executes plain-data requests.
///
/// Non-2xx statuses are returned as ordinary responses. Only failures that
/// leave no response to return (DNS, connect, broken stream) are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `Transport` backed by a `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client, e.g. one with custom TLS roots or proxy.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| TransportError(format!("invalid method {:?}: {e}", request.method.as_str())))?;

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        // hyper only records the reason phrase when it differs from the
        // canonical one for the status code.
        let status_text = response
            .extensions()
            .get::<ReasonPhrase>()
            .map(|reason| String::from_utf8_lossy(reason.as_bytes()).into_owned())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string());
        let mut headers = Headers::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.append(name.as_str(), value);
            }
        }
        let body: Bytes = response.bytes().await?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text,
            headers,
            body,
        })
    }
}
