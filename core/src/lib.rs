//! Convenience client for JSON HTTP APIs.
//!
//! # Overview
//! `RequestClient` centralizes the base URL, default headers, bearer-token
//! authentication and a per-call timeout, and normalizes failures into
//! [`Error`]. It offers a generic `request` plus `get`/`post`/`put`/`patch`/
//! `delete` shorthands.
//!
//! # Design
//! - Requests and responses are plain data (`HttpRequest`, `HttpResponse`);
//!   building and parsing are deterministic and testable without I/O.
//! - The I/O sits behind the `Transport` trait. `ReqwestTransport` is the
//!   default; tests plug in scripted transports.
//! - No retries, caching or pooling beyond what the transport does itself.
//!
//! ```no_run
//! # async fn run() -> Result<(), request_client::Error> {
//! use request_client::{ClientConfig, RequestClient, RequestOptions};
//!
//! let mut client = RequestClient::new("https://example.com/api", ClientConfig::default());
//! client.set_token(Some("secret"));
//! let _thing = client.get("/things/1", &RequestOptions::default()).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::{RequestClient, DEFAULT_BASE_URL};
pub use config::{ClientConfig, DEFAULT_TIMEOUT};
pub use error::{ApiError, Error, Result, TransportError};
pub use http::{Headers, HttpMethod, HttpRequest, HttpResponse};
pub use transport::{ReqwestTransport, Transport};
pub use types::{RequestOptions, Response};
