//! Per-call options and call outcomes.

use serde::de::DeserializeOwned;

use crate::error::Error;
use crate::http::{Headers, HttpResponse};

/// Per-call overrides. Headers here win over the client's defaults.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: Headers,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }
}

/// Outcome of a successful call.
///
/// Responses that declare a JSON content type are parsed; anything else is
/// handed back untouched and the caller decides what to do with it.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Json(serde_json::Value),
    Raw(HttpResponse),
}

impl Response {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Response::Json(value) => Some(value),
            Response::Raw(_) => None,
        }
    }

    pub fn as_raw(&self) -> Option<&HttpResponse> {
        match self {
            Response::Json(_) => None,
            Response::Raw(response) => Some(response),
        }
    }

    /// Deserialize a JSON outcome into `T`.
    ///
    /// A raw outcome is decoded from its body, so a JSON payload served
    /// without a JSON content type can still be read.
    pub fn json<T: DeserializeOwned>(self) -> Result<T, Error> {
        match self {
            Response::Json(value) => serde_json::from_value(value).map_err(Error::Decode),
            Response::Raw(response) => serde_json::from_slice(&response.body).map_err(Error::Decode),
        }
    }
}
