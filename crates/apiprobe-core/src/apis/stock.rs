//! Stock data API: endpoints and payload views.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProbeResult;
use crate::request::{EndpointTemplate, RequestSpec};

pub const OVERVIEW: EndpointTemplate = EndpointTemplate::new("/overview/{symbol}");
pub const PRICE: EndpointTemplate = EndpointTemplate::new("/price/{symbol}");
pub const OPTIONS: EndpointTemplate = EndpointTemplate::new("/options/{symbol}");
pub const FUNDAMENTALS: EndpointTemplate = EndpointTemplate::new("/fundamentals/{symbol}");
pub const HISTORICAL: EndpointTemplate = EndpointTemplate::new("/historical/{symbol}");
pub const EARNINGS: EndpointTemplate = EndpointTemplate::new("/earnings/{symbol}");

/// Builds request specs against one stock API deployment.
#[derive(Debug, Clone)]
pub struct StockApi {
    base_url: String,
}

impl StockApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, template: EndpointTemplate, symbol: &str) -> ProbeResult<RequestSpec> {
        Ok(RequestSpec::get(
            template.render(&self.base_url, &[("symbol", symbol)])?,
        ))
    }

    pub fn overview(&self, symbol: &str) -> ProbeResult<RequestSpec> {
        self.get(OVERVIEW, symbol)
    }

    pub fn price(&self, symbol: &str) -> ProbeResult<RequestSpec> {
        self.get(PRICE, symbol)
    }

    pub fn options(&self, symbol: &str) -> ProbeResult<RequestSpec> {
        self.get(OPTIONS, symbol)
    }

    pub fn fundamentals(&self, symbol: &str) -> ProbeResult<RequestSpec> {
        self.get(FUNDAMENTALS, symbol)
    }

    pub fn historical(&self, symbol: &str) -> ProbeResult<RequestSpec> {
        self.get(HISTORICAL, symbol)
    }

    /// `POST /earnings/{symbol}?quarters=N`.
    pub fn earnings(&self, symbol: &str, quarters: u32) -> ProbeResult<RequestSpec> {
        Ok(
            RequestSpec::post(EARNINGS.render(&self.base_url, &[("symbol", symbol)])?)
                .with_query("quarters", quarters.to_string()),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockOverview {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub current_price: Option<f64>,
}

/// One row of `/historical/{symbol}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalBar {
    pub date: String,
    #[serde(default)]
    pub close: Option<Value>,
}
