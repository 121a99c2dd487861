//! In-memory aiindex backend for integration tests and local development.
//!
//! # Design
//! Serves the six read-only API endpoints from an immutable `MarketData`
//! snapshot: index configuration, per-symbol quotes, and a precomputed index
//! history. There is no database and no background fetcher — `seeded()`
//! stands in for both. Because every endpoint is a GET over fixed data, the
//! router state is a plain `Arc` with no locking.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// Index-level settings, echoed by `/api/config`.
#[derive(Clone, Debug)]
pub struct Settings {
    pub base_value: f64,
    pub market_cap_weight_pct: u32,
}

/// A sector grouping of index symbols.
#[derive(Clone, Debug)]
pub struct Sector {
    pub label: String,
    pub symbols: Vec<String>,
}

/// Latest quote for one symbol.
#[derive(Clone, Debug)]
pub struct Quote {
    pub price: f64,
    pub change: Option<f64>,
    pub change_pct: Option<f64>,
    pub market_cap: Option<f64>,
    pub timestamp: String,
}

/// One index reading. History is stored oldest-first and served newest-first.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub value: f64,
    pub daily_change: Option<f64>,
    pub daily_change_pct: Option<f64>,
    pub timestamp: String,
}

/// Stock payload for `/api/stocks` and `/api/stocks/{symbol}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
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
}

/// Sector rollup for `/api/sectors`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SectorSummary {
    pub key: String,
    pub label: String,
    pub symbols: Vec<String>,
    pub total_weight: f64,
    pub avg_change_pct: f64,
}

/// Configuration echo for `/api/config`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConfigInfo {
    pub base_value: f64,
    pub market_cap_weight_pct: u32,
    pub index_stock_count: usize,
    pub benchmark_symbols: Vec<String>,
}

/// The whole market snapshot the server answers from.
///
/// `sectors` is a `BTreeMap` so `/api/stocks` and `/api/sectors` list
/// sectors in a stable order.
#[derive(Clone, Debug)]
pub struct MarketData {
    pub settings: Settings,
    pub sectors: BTreeMap<String, Sector>,
    pub benchmarks: Vec<String>,
    pub quotes: HashMap<String, Quote>,
    pub history: Vec<IndexSnapshot>,
}

impl MarketData {
    /// A small but fully populated market: two sectors, one benchmark,
    /// three days of index history.
    pub fn seeded() -> Self {
        let ts = "2026-02-03T16:00:00Z".to_string();
        let mut sectors = BTreeMap::new();
        sectors.insert(
            "semis".to_string(),
            Sector {
                label: "Semiconductors".to_string(),
                symbols: vec!["NVDA".to_string(), "AMD".to_string()],
            },
        );
        sectors.insert(
            "software".to_string(),
            Sector {
                label: "Software".to_string(),
                symbols: vec!["MSFT".to_string()],
            },
        );

        let mut quotes = HashMap::new();
        quotes.insert(
            "NVDA".to_string(),
            Quote {
                price: 890.10,
                change: Some(4.20),
                change_pct: Some(0.47),
                market_cap: Some(2_200_000.0),
                timestamp: ts.clone(),
            },
        );
        quotes.insert(
            "AMD".to_string(),
            Quote {
                price: 172.35,
                change: Some(-1.15),
                change_pct: Some(-0.66),
                market_cap: Some(280_000.0),
                timestamp: ts.clone(),
            },
        );
        quotes.insert(
            "MSFT".to_string(),
            Quote {
                price: 415.80,
                change: Some(2.05),
                change_pct: Some(0.50),
                market_cap: Some(3_100_000.0),
                timestamp: ts.clone(),
            },
        );
        quotes.insert(
            "SPY".to_string(),
            Quote {
                price: 502.40,
                change: Some(1.10),
                change_pct: Some(0.22),
                market_cap: None,
                timestamp: ts.clone(),
            },
        );

        let history = vec![
            IndexSnapshot {
                value: 1000.0,
                daily_change: None,
                daily_change_pct: None,
                timestamp: "2026-02-01T16:00:00Z".to_string(),
            },
            IndexSnapshot {
                value: 1024.8,
                daily_change: Some(24.8),
                daily_change_pct: Some(2.48),
                timestamp: "2026-02-02T16:00:00Z".to_string(),
            },
            IndexSnapshot {
                value: 1042.5,
                daily_change: Some(17.7),
                daily_change_pct: Some(1.73),
                timestamp: ts,
            },
        ];

        Self {
            settings: Settings {
                base_value: 1000.0,
                market_cap_weight_pct: 50,
            },
            sectors,
            benchmarks: vec!["SPY".to_string()],
            quotes,
            history,
        }
    }

    /// Same configuration as `seeded()` but no quotes and no history,
    /// matching a freshly started backend.
    pub fn empty() -> Self {
        let seeded = Self::seeded();
        Self {
            quotes: HashMap::new(),
            history: Vec::new(),
            ..seeded
        }
    }

    /// Index symbols, excluding benchmarks.
    pub fn index_symbols(&self) -> Vec<String> {
        self.sectors
            .values()
            .flat_map(|s| s.symbols.iter().cloned())
            .collect()
    }
}

type AppState = Arc<MarketData>;

/// Router over the default seeded market.
pub fn app() -> Router {
    app_with(MarketData::seeded())
}

/// Router over caller-supplied market data. Tests use this to pin fixtures.
pub fn app_with(data: MarketData) -> Router {
    Router::new()
        .route("/api/index", get(get_index))
        .route("/api/index/history", get(get_index_history))
        .route("/api/stocks", get(get_stocks))
        .route("/api/stocks/{symbol}", get(get_stock))
        .route("/api/sectors", get(get_sectors))
        .route("/api/config", get(get_config))
        .with_state(Arc::new(data))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn get_index(State(data): State<AppState>) -> Json<serde_json::Value> {
    match data.history.last() {
        Some(s) => Json(serde_json::json!(s)),
        None => Json(serde_json::json!({
            "value": null,
            "message": "No data available yet"
        })),
    }
}

#[derive(Deserialize)]
struct HistoryQuery {
    limit: Option<i64>,
}

async fn get_index_history(
    State(data): State<AppState>,
    Query(q): Query<HistoryQuery>,
) -> Json<Vec<IndexSnapshot>> {
    let limit = q.limit.unwrap_or(100).max(0) as usize;
    let rows: Vec<IndexSnapshot> = data.history.iter().rev().take(limit).cloned().collect();
    Json(rows)
}

async fn get_stocks(State(data): State<AppState>) -> Json<Vec<StockDetail>> {
    let weights = compute_weights(&data);
    let mut stocks = Vec::new();

    for (sector_key, sector) in &data.sectors {
        for sym in &sector.symbols {
            if let Some(q) = data.quotes.get(sym) {
                stocks.push(stock_detail(sym, sector_key, &sector.label, q, weights.get(sym).copied()));
            }
        }
    }

    for sym in &data.benchmarks {
        if let Some(q) = data.quotes.get(sym) {
            stocks.push(stock_detail(sym, "benchmarks", "Benchmarks", q, None));
        }
    }

    Json(stocks)
}

async fn get_stock(
    State(data): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<StockDetail>, StatusCode> {
    let sym = symbol.to_uppercase();

    let (sector_key, sector_label) = data
        .sectors
        .iter()
        .find(|(_, s)| s.symbols.contains(&sym))
        .map(|(k, s)| (k.clone(), s.label.clone()))
        .unwrap_or_else(|| {
            if data.benchmarks.contains(&sym) {
                ("benchmarks".to_string(), "Benchmarks".to_string())
            } else {
                ("unknown".to_string(), "Unknown".to_string())
            }
        });

    let quote = data.quotes.get(&sym).ok_or(StatusCode::NOT_FOUND)?;
    let weights = compute_weights(&data);
    Ok(Json(stock_detail(
        &sym,
        &sector_key,
        &sector_label,
        quote,
        weights.get(&sym).copied(),
    )))
}

async fn get_sectors(State(data): State<AppState>) -> Json<Vec<SectorSummary>> {
    let weights = compute_weights(&data);
    let mut sectors = Vec::new();

    for (key, sector) in &data.sectors {
        let total_weight: f64 = sector.symbols.iter().filter_map(|s| weights.get(s)).sum();

        let changes: Vec<f64> = sector
            .symbols
            .iter()
            .filter_map(|s| data.quotes.get(s).and_then(|q| q.change_pct))
            .collect();
        let avg_change_pct = if changes.is_empty() {
            0.0
        } else {
            changes.iter().sum::<f64>() / changes.len() as f64
        };

        sectors.push(SectorSummary {
            key: key.clone(),
            label: sector.label.clone(),
            symbols: sector.symbols.clone(),
            total_weight,
            avg_change_pct,
        });
    }

    Json(sectors)
}

async fn get_config(State(data): State<AppState>) -> Json<ConfigInfo> {
    Json(ConfigInfo {
        base_value: data.settings.base_value,
        market_cap_weight_pct: data.settings.market_cap_weight_pct,
        index_stock_count: data.index_symbols().len(),
        benchmark_symbols: data.benchmarks.clone(),
    })
}

fn stock_detail(
    symbol: &str,
    sector: &str,
    sector_label: &str,
    quote: &Quote,
    weight: Option<f64>,
) -> StockDetail {
    StockDetail {
        symbol: symbol.to_string(),
        sector: sector.to_string(),
        sector_label: sector_label.to_string(),
        price: quote.price,
        change: quote.change,
        change_pct: quote.change_pct,
        market_cap: quote.market_cap,
        weight,
        timestamp: quote.timestamp.clone(),
    }
}

/// Blended weights for all index symbols: a market-cap share and an equal
/// share mixed by `market_cap_weight_pct`. Symbols without a market cap
/// count as 1.0 in the cap total.
fn compute_weights(data: &MarketData) -> HashMap<String, f64> {
    let index_symbols = data.index_symbols();
    let mcap_pct = data.settings.market_cap_weight_pct as f64 / 100.0;
    let n = index_symbols.len() as f64;
    let equal_weight = if n > 0.0 { 1.0 / n } else { 0.0 };

    let mcaps: Vec<(String, f64)> = index_symbols
        .iter()
        .map(|sym| {
            let mcap = data
                .quotes
                .get(sym)
                .and_then(|q| q.market_cap)
                .unwrap_or(1.0);
            (sym.clone(), mcap)
        })
        .collect();

    let total_mcap: f64 = mcaps.iter().map(|(_, m)| m).sum();

    let mut weights = HashMap::new();
    for (sym, mcap) in &mcaps {
        let mcap_weight = if total_mcap > 0.0 {
            mcap / total_mcap
        } else {
            equal_weight
        };
        let blended = (mcap_pct * mcap_weight) + ((1.0 - mcap_pct) * equal_weight);
        weights.insert(sym.clone(), blended);
    }

    weights
}
