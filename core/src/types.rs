//! Endpoint DTOs for the aiindex API.
//!
//! # Design
//! One result schema per endpoint, mirroring the server's JSON but defined
//! independently from the mock-server crate; integration tests catch schema
//! drift. Fields the server may omit or null out are `Option` so a sparse
//! payload decodes instead of failing.

use serde::{Deserialize, Serialize};

/// Current index reading from `/api/index`.
///
/// Before any price data exists the server answers
/// `{"value": null, "message": "..."}`, so every field is optional;
/// `value.is_some()` distinguishes a real reading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexValue {
    pub value: Option<f64>,
    pub daily_change: Option<f64>,
    pub daily_change_pct: Option<f64>,
    pub timestamp: Option<String>,
    pub message: Option<String>,
}

/// One historical index reading from `/api/index/history`.
/// Rows arrive newest-first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexSnapshot {
    pub value: f64,
    pub daily_change: Option<f64>,
    pub daily_change_pct: Option<f64>,
    pub timestamp: String,
}

/// A single stock as returned by `/api/stocks` and `/api/stocks/{symbol}`.
///
/// Benchmark symbols carry `sector = "benchmarks"` and no `weight`. The
/// profile fields (`name` through `country`) are filled only once the server
/// has fetched a company profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockDetail {
    pub symbol: String,
    pub sector: String,
    pub sector_label: String,
    pub price: f64,
    pub change: Option<f64>,
    pub change_pct: Option<f64>,
    pub market_cap: Option<f64>,
    pub weight: Option<f64>,
    pub timestamp: String,
    pub name: Option<String>,
    pub exchange: Option<String>,
    pub industry: Option<String>,
    pub weburl: Option<String>,
    pub logo: Option<String>,
    pub country: Option<String>,
}

/// Per-sector rollup from `/api/sectors`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectorSummary {
    pub key: String,
    pub label: String,
    pub symbols: Vec<String>,
    pub total_weight: f64,
    pub avg_change_pct: f64,
}

/// Index configuration echo from `/api/config`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigInfo {
    pub base_value: f64,
    pub market_cap_weight_pct: u32,
    pub index_stock_count: usize,
    pub benchmark_symbols: Vec<String>,
}
