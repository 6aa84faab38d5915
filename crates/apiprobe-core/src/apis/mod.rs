//! The two upstream APIs, described as path templates plus the payload
//! fields the harness reads.

pub mod esg;
pub mod stock;

pub use esg::{CompanyHit, CompanySearch, EsgApi, EsgRecord, NotFoundBody, ScoreSearch};
pub use stock::{HistoricalBar, StockApi, StockOverview};
