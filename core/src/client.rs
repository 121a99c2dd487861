//! Stateless HTTP request builder and response parser for the aiindex API.
//!
//! # Design
//! `IndexClient` holds only a `base_url` and carries no mutable state between
//! calls. Each endpoint is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the actual HTTP round-trip, keeping the core
//! deterministic and free of I/O dependencies. In-flight calls are fully
//! independent: no ordering guarantees, no shared mutable state.
//!
//! `symbol` and `limit` are inserted into the URL verbatim, matching the
//! server's routing contract (tickers are plain uppercase ASCII).

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{ConfigInfo, IndexSnapshot, IndexValue, SectorSummary, StockDetail};

/// History length requested when the caller does not supply one.
pub const DEFAULT_HISTORY_LIMIT: u32 = 100;

/// Synchronous, stateless client for the aiindex API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network. The caller is responsible for executing the HTTP
/// round-trip between `build_*` and `parse_*`.
#[derive(Debug, Clone)]
pub struct IndexClient {
    base_url: String,
}

impl IndexClient {
    /// Create a client against `base_url`. An empty base produces
    /// same-origin relative URLs.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_index(&self) -> HttpRequest {
        self.get(format!("{}/api/index", self.base_url))
    }

    /// `limit` defaults to [`DEFAULT_HISTORY_LIMIT`] when `None`.
    pub fn build_index_history(&self, limit: Option<u32>) -> HttpRequest {
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        self.get(format!("{}/api/index/history?limit={limit}", self.base_url))
    }

    pub fn build_stocks(&self) -> HttpRequest {
        self.get(format!("{}/api/stocks", self.base_url))
    }

    pub fn build_stock(&self, symbol: &str) -> HttpRequest {
        self.get(format!("{}/api/stocks/{symbol}", self.base_url))
    }

    pub fn build_sectors(&self) -> HttpRequest {
        self.get(format!("{}/api/sectors", self.base_url))
    }

    pub fn build_config(&self) -> HttpRequest {
        self.get(format!("{}/api/config", self.base_url))
    }

    pub fn parse_index(&self, response: HttpResponse) -> Result<IndexValue, ApiError> {
        decode(response)
    }

    pub fn parse_index_history(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<IndexSnapshot>, ApiError> {
        decode(response)
    }

    pub fn parse_stocks(&self, response: HttpResponse) -> Result<Vec<StockDetail>, ApiError> {
        decode(response)
    }

    pub fn parse_stock(&self, response: HttpResponse) -> Result<StockDetail, ApiError> {
        decode(response)
    }

    pub fn parse_sectors(&self, response: HttpResponse) -> Result<Vec<SectorSummary>, ApiError> {
        decode(response)
    }

    pub fn parse_config(&self, response: HttpResponse) -> Result<ConfigInfo, ApiError> {
        decode(response)
    }

    fn get(&self, url: String) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url,
        }
    }
}

/// Reject non-2xx responses, then decode the body into the endpoint schema.
fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::DecodeFailed(e.to_string()))
}

/// Any status in 200–299 counts as success.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }
    Err(ApiError::RequestFailed {
        status: response.status,
        status_text: response.status_text.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> IndexClient {
        IndexClient::new("http://localhost:8080")
    }

    fn ok(body: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            status_text: "OK".to_string(),
            body: body.to_string(),
        }
    }

    fn not_found() -> HttpResponse {
        HttpResponse {
            status: 404,
            status_text: "Not Found".to_string(),
            body: String::new(),
        }
    }

    #[test]
    fn build_index_produces_correct_request() {
        let req = client().build_index();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:8080/api/index");
    }

    #[test]
    fn build_index_history_defaults_limit_to_100() {
        let req = client().build_index_history(None);
        assert_eq!(req.url, "http://localhost:8080/api/index/history?limit=100");
    }

    #[test]
    fn build_index_history_with_explicit_limit() {
        let req = client().build_index_history(Some(5));
        assert_eq!(req.url, "http://localhost:8080/api/index/history?limit=5");
    }

    #[test]
    fn build_stocks_produces_correct_request() {
        let req = client().build_stocks();
        assert_eq!(req.url, "http://localhost:8080/api/stocks");
    }

    #[test]
    fn build_stock_inserts_symbol_verbatim() {
        let req = client().build_stock("AAPL");
        assert_eq!(req.url, "http://localhost:8080/api/stocks/AAPL");
    }

    #[test]
    fn build_sectors_produces_correct_request() {
        let req = client().build_sectors();
        assert_eq!(req.url, "http://localhost:8080/api/sectors");
    }

    #[test]
    fn build_config_produces_correct_request() {
        let req = client().build_config();
        assert_eq!(req.url, "http://localhost:8080/api/config");
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = IndexClient::new("http://localhost:8080/");
        let req = client.build_index();
        assert_eq!(req.url, "http://localhost:8080/api/index");
    }

    #[test]
    fn empty_base_url_builds_relative_paths() {
        let client = IndexClient::new("");
        let req = client.build_index_history(None);
        assert_eq!(req.url, "/api/index/history?limit=100");
    }

    #[test]
    fn parse_index_success() {
        let body = r#"{"value":1042.5,"daily_change":12.5,"daily_change_pct":1.21,"timestamp":"2026-02-01T16:00:00Z"}"#;
        let index = client().parse_index(ok(body)).unwrap();
        assert_eq!(index.value, Some(1042.5));
        assert_eq!(index.timestamp.as_deref(), Some("2026-02-01T16:00:00Z"));
        assert!(index.message.is_none());
    }

    #[test]
    fn parse_index_no_data_yet() {
        let body = r#"{"value":null,"message":"No data available yet"}"#;
        let index = client().parse_index(ok(body)).unwrap();
        assert!(index.value.is_none());
        assert_eq!(index.message.as_deref(), Some("No data available yet"));
    }

    #[test]
    fn parse_index_history_success() {
        let body = r#"[{"value":1042.5,"daily_change":null,"daily_change_pct":null,"timestamp":"2026-02-01T16:00:00Z"}]"#;
        let history = client().parse_index_history(ok(body)).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].value, 1042.5);
        assert!(history[0].daily_change.is_none());
    }

    #[test]
    fn parse_stock_success() {
        let body = r#"{"symbol":"NVDA","sector":"semis","sector_label":"Semiconductors","price":890.1,"change":4.2,"change_pct":0.47,"market_cap":2200000.0,"weight":0.31,"timestamp":"2026-02-01T16:00:00Z"}"#;
        let stock = client().parse_stock(ok(body)).unwrap();
        assert_eq!(stock.symbol, "NVDA");
        assert_eq!(stock.weight, Some(0.31));
        // Profile fields absent from the payload decode as None.
        assert!(stock.name.is_none());
    }

    #[test]
    fn parse_sectors_success() {
        let body = r#"[{"key":"semis","label":"Semiconductors","symbols":["NVDA","AMD"],"total_weight":0.52,"avg_change_pct":0.3}]"#;
        let sectors = client().parse_sectors(ok(body)).unwrap();
        assert_eq!(sectors.len(), 1);
        assert_eq!(sectors[0].symbols, vec!["NVDA", "AMD"]);
    }

    #[test]
    fn parse_config_success() {
        let body = r#"{"base_value":1000.0,"market_cap_weight_pct":50,"index_stock_count":3,"benchmark_symbols":["SPY"]}"#;
        let config = client().parse_config(ok(body)).unwrap();
        assert_eq!(config.base_value, 1000.0);
        assert_eq!(config.index_stock_count, 3);
    }

    #[test]
    fn parse_stock_not_found() {
        let err = client().parse_stock(not_found()).unwrap_err();
        match &err {
            ApiError::RequestFailed {
                status,
                status_text,
            } => {
                assert_eq!(*status, 404);
                assert_eq!(status_text, "Not Found");
            }
            other => panic!("expected RequestFailed, got {other:?}"),
        }
        let msg = err.to_string();
        assert!(msg.contains("404"), "message should contain the code: {msg}");
        assert!(msg.contains("Not Found"), "message should contain the reason: {msg}");
    }

    #[test]
    fn every_parser_rejects_non_2xx() {
        let c = client();
        let r = || HttpResponse {
            status: 500,
            status_text: "Internal Server Error".to_string(),
            body: "boom".to_string(),
        };
        assert!(matches!(c.parse_index(r()), Err(ApiError::RequestFailed { status: 500, .. })));
        assert!(matches!(c.parse_index_history(r()), Err(ApiError::RequestFailed { status: 500, .. })));
        assert!(matches!(c.parse_stocks(r()), Err(ApiError::RequestFailed { status: 500, .. })));
        assert!(matches!(c.parse_stock(r()), Err(ApiError::RequestFailed { status: 500, .. })));
        assert!(matches!(c.parse_sectors(r()), Err(ApiError::RequestFailed { status: 500, .. })));
        assert!(matches!(c.parse_config(r()), Err(ApiError::RequestFailed { status: 500, .. })));
    }

    #[test]
    fn status_299_counts_as_success() {
        let response = HttpResponse {
            status: 299,
            status_text: String::new(),
            body: r#"{"value":null,"message":"edge"}"#.to_string(),
        };
        assert!(client().parse_index(response).is_ok());
    }

    #[test]
    fn parse_index_bad_json() {
        let err = client().parse_index(ok("not json")).unwrap_err();
        assert!(matches!(err, ApiError::DecodeFailed(_)));
    }

    #[test]
    fn parse_stocks_schema_mismatch_is_decode_failure() {
        // Valid JSON, wrong shape for the endpoint.
        let err = client().parse_stocks(ok(r#"{"a":1}"#)).unwrap_err();
        assert!(matches!(err, ApiError::DecodeFailed(_)));
    }
}
