//! ESG data API: endpoints and payload views.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProbeResult;
use crate::request::{EndpointTemplate, RequestSpec};

pub const ALL: EndpointTemplate = EndpointTemplate::new("/all");
pub const ESG_DETAIL: EndpointTemplate = EndpointTemplate::new("/esg/{ticker}");
pub const SEARCH_SCORE: EndpointTemplate =
    EndpointTemplate::new("/search/score/{field}/{min}/{max}");
pub const SEARCH_LEVEL: EndpointTemplate = EndpointTemplate::new("/search/level/{field}/{rating}");
pub const SEARCH_COMPANY: EndpointTemplate = EndpointTemplate::new("/search/company/{name}");

/// Fields of an ESG record that hold dates.
pub const DATE_FIELDS: &[&str] = &["timestamp", "date", "last_processing_date"];

/// Builds request specs against one ESG API deployment.
#[derive(Debug, Clone)]
pub struct EsgApi {
    base_url: String,
}

impl EsgApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn all(&self) -> ProbeResult<RequestSpec> {
        Ok(RequestSpec::get(ALL.render(&self.base_url, &[])?))
    }

    pub fn esg(&self, ticker: &str) -> ProbeResult<RequestSpec> {
        Ok(RequestSpec::get(
            ESG_DETAIL.render(&self.base_url, &[("ticker", ticker)])?,
        ))
    }

    pub fn search_score(&self, field: &str, min: u32, max: u32) -> ProbeResult<RequestSpec> {
        let (min, max) = (min.to_string(), max.to_string());
        Ok(RequestSpec::get(SEARCH_SCORE.render(
            &self.base_url,
            &[("field", field), ("min", &min), ("max", &max)],
        )?))
    }

    pub fn search_level(&self, field: &str, rating: &str) -> ProbeResult<RequestSpec> {
        Ok(RequestSpec::get(SEARCH_LEVEL.render(
            &self.base_url,
            &[("field", field), ("rating", rating)],
        )?))
    }

    pub fn search_company(&self, name: &str) -> ProbeResult<RequestSpec> {
        Ok(RequestSpec::get(
            SEARCH_COMPANY.render(&self.base_url, &[("name", name)])?,
        ))
    }
}

/// One company row of a search response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyHit {
    pub ticker: String,
    pub company_name: String,
    #[serde(default)]
    pub total_score: Option<f64>,
    #[serde(default)]
    pub total_level: Option<String>,
    #[serde(default)]
    pub timestamp: Option<Value>,
}

/// Response of `/search/company/{name}` and `/search/level/...`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanySearch {
    pub companies: Vec<CompanyHit>,
}

/// Response of `/search/score/...`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreSearch {
    #[serde(rename = "validCompanies")]
    pub valid_companies: Vec<Value>,
}

/// `/esg/{ticker}` detail; only the fields the harness relies on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EsgRecord {
    pub ticker: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, Value>,
}

/// Body of a 404 from the search endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotFoundBody {
    pub message: String,
}
