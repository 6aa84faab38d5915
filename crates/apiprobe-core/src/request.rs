//! Request and outcome types.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ProbeError, ProbeResult};

/// HTTP method used by the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub(crate) fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// One request to issue. Built once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestSpec {
    method: HttpMethod,
    url: String,
    body: Option<Value>,
    query: BTreeMap<String, String>,
}

impl RequestSpec {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            query: BTreeMap::new(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    /// JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn query(&self) -> &BTreeMap<String, String> {
        &self.query
    }
}

impl fmt::Display for RequestSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Result of one completed request attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub elapsed_ms: f64,
    pub status_code: Option<u16>,
    pub payload: Option<Value>,
    pub error: Option<String>,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && matches!(self.status_code, Some(200..=299))
    }

    /// Payload, or an error naming what was expected.
    pub fn payload(&self) -> ProbeResult<&Value> {
        self.payload.as_ref().ok_or_else(|| ProbeError::InvalidPayload {
            message: "response has no JSON body".to_string(),
        })
    }

    /// Decode the payload into a typed view.
    pub fn payload_as<T: DeserializeOwned>(&self) -> ProbeResult<T> {
        let value = self.payload()?.clone();
        serde_json::from_value(value).map_err(|e| ProbeError::InvalidPayload {
            message: e.to_string(),
        })
    }
}

/// Path template such as `/search/score/{field}/{min}/{max}`.
///
/// Substituted values are percent-encoded as single path segments, so a
/// company name containing `/` or spaces cannot change the route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointTemplate(&'static str);

impl EndpointTemplate {
    pub const fn new(template: &'static str) -> Self {
        Self(template)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Append the rendered template to `base`.
    pub fn render(&self, base: &str, params: &[(&str, &str)]) -> ProbeResult<String> {
        let mut url = url::Url::parse(base).map_err(|e| ProbeError::Config {
            message: format!("invalid base URL {base}: {e}"),
        })?;

        {
            let mut segments = url.path_segments_mut().map_err(|_| ProbeError::Config {
                message: format!("base URL cannot take a path: {base}"),
            })?;
            segments.pop_if_empty();

            for segment in self.0.split('/').filter(|s| !s.is_empty()) {
                match segment
                    .strip_prefix('{')
                    .and_then(|s| s.strip_suffix('}'))
                {
                    Some(name) => {
                        let value = params
                            .iter()
                            .find(|(k, _)| *k == name)
                            .map(|(_, v)| *v)
                            .ok_or_else(|| ProbeError::Config {
                                message: format!(
                                    "missing value for {{{name}}} in {}",
                                    self.0
                                ),
                            })?;
                        segments.push(value);
                    }
                    None => {
                        segments.push(segment);
                    }
                }
            }
        }

        Ok(url.to_string())
    }
}
