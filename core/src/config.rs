//! Client configuration.
//!
//! `ClientConfig` can be assembled in code with the builder methods or
//! deserialized from an application's own config file:
//!
//! ```json
//! { "timeout_ms": 5000, "headers": { "X-Api-Key": "k" }, "token": "abc" }
//! ```

use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::http::Headers;

/// Timeout applied when the config does not set one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Options applied when constructing a `RequestClient`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Per-call timeout. `None` or zero falls back to `DEFAULT_TIMEOUT`.
    #[serde(rename = "timeout_ms", deserialize_with = "deserialize_millis")]
    pub timeout: Option<Duration>,
    /// Merged over the built-in `Content-Type: application/json`.
    pub headers: Headers,
    pub token: Option<String>,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub(crate) fn effective_timeout(&self) -> Duration {
        self.timeout
            .filter(|timeout| !timeout.is_zero())
            .unwrap_or(DEFAULT_TIMEOUT)
    }
}

fn deserialize_millis<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
}
