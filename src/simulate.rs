//! Synthetic batch generation for testing: builds an
//! [`AnalyzeBatch`] whose trades/orders/market data land at named evidence
//! strengths, grounded on the evidence mappers' own thresholds
//! (`evidence::thresholds`) so a generated batch reliably exercises a chosen
//! scenario rather than hoping random noise lands in the right bucket.

use crate::evidence::thresholds;
use crate::types::{AnalyzeBatch, MarketData, MaterialEvent, Order, OrderStatus, Side, Trade, TraderInfo};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// The coarse evidence strength a simulated batch should exhibit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioType {
    /// Evidence lands in the top bucket for every mapped field.
    Strong,
    /// Only a couple of fields clear the lowest bucket, the rest are absent.
    Sparse,
    /// No orders, no trades beyond the minimum required shape; every mapper
    /// returns `None`.
    Empty,
    /// Strong evidence plus a contemporaneous, highly material news event.
    NewsContext,
}

/// Parameters controlling synthetic batch generation. Mirrors the teacher's
/// `MonteCarloConfig` builder shape (`iterations`/`seed`) scaled down to a
/// single-batch generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Reproducible RNG seed; `None` draws from OS entropy (teacher's
    /// `Sampler::new` fallback).
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_instrument")]
    pub instrument: String,
    #[serde(default = "default_trader_id")]
    pub trader_id: String,
    /// How many trades/orders to emit when the scenario calls for activity
    /// (ignored for `Empty`).
    #[serde(default = "default_activity_count")]
    pub activity_count: usize,
}

fn default_instrument() -> String {
    "SIM.INSTRUMENT".to_string()
}

fn default_trader_id() -> String {
    "SIM-TRADER-1".to_string()
}

const fn default_activity_count() -> usize {
    10
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            seed: None,
            instrument: default_instrument(),
            trader_id: default_trader_id(),
            activity_count: default_activity_count(),
        }
    }
}

fn rng_for(parameters: &SimulationParameters) -> StdRng {
    match parameters.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

/// Draw a jittered value around `base` with standard deviation `spread`,
/// via the same `rand_distr::Normal` construction the teacher's
/// `monte_carlo::distributions` module uses for its `MC.Normal` sampling.
fn jitter(rng: &mut StdRng, base: f64, spread: f64) -> f64 {
    if spread <= 0.0 {
        return base;
    }
    Normal::new(base, spread)
        .map_or(base, |dist| dist.sample(rng))
}

/// Generate a synthetic [`AnalyzeBatch`] for the given scenario.
#[must_use]
pub fn simulate(scenario: ScenarioType, parameters: &SimulationParameters) -> AnalyzeBatch {
    let mut rng = rng_for(parameters);
    let now = reference_time();
    let trader_info = synthetic_trader(&parameters.trader_id);

    match scenario {
        ScenarioType::Empty => empty_batch(trader_info, now),
        ScenarioType::Sparse => sparse_batch(&mut rng, parameters, trader_info, now),
        ScenarioType::Strong => strong_batch(&mut rng, parameters, trader_info, now, None),
        ScenarioType::NewsContext => {
            let event = MaterialEvent {
                id: "SIM-EVENT-1".to_string(),
                timestamp_iso: now,
                event_type: "earnings_announcement".to_string(),
                instruments_affected: vec![parameters.instrument.clone()],
                materiality_score: 0.9,
            };
            strong_batch(&mut rng, parameters, trader_info, now, Some(event))
        }
    }
}

fn reference_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_735_689_600, 0).unwrap_or_else(Utc::now)
}

fn synthetic_trader(trader_id: &str) -> TraderInfo {
    TraderInfo {
        id: trader_id.to_string(),
        name: "Simulated Trader".to_string(),
        role: "trader".to_string(),
        department: "equities".to_string(),
        access_level: "standard".to_string(),
        start_date: reference_time() - Duration::days(365),
        supervisors: vec!["SIM-SUPERVISOR-1".to_string()],
    }
}

fn empty_batch(trader_info: TraderInfo, now: DateTime<Utc>) -> AnalyzeBatch {
    AnalyzeBatch {
        trades: Vec::new(),
        orders: Vec::new(),
        trader_info,
        material_events: Vec::new(),
        market_data: MarketData {
            volatility: 0.2,
            volume: 1_000_000.0,
            price_movement: 0.0,
            liquidity: 0.8,
            market_hours: true,
        },
        options: crate::types::AnalysisOptions::default(),
    }
}

fn sparse_batch(
    rng: &mut StdRng,
    parameters: &SimulationParameters,
    trader_info: TraderInfo,
    now: DateTime<Utc>,
) -> AnalyzeBatch {
    let order_count = thresholds::CLUSTERING_MIN_ORDERS;
    let orders = clustered_orders(rng, parameters, now, order_count, thresholds::CANCELLATION_RATIO_MEDIUM);
    AnalyzeBatch {
        trades: Vec::new(),
        orders,
        trader_info,
        material_events: Vec::new(),
        market_data: MarketData {
            volatility: 0.25,
            volume: 1_000_000.0,
            price_movement: 0.0,
            liquidity: 0.7,
            market_hours: true,
        },
        options: crate::types::AnalysisOptions::default(),
    }
}

fn strong_batch(
    rng: &mut StdRng,
    parameters: &SimulationParameters,
    trader_info: TraderInfo,
    now: DateTime<Utc>,
    material_event: Option<MaterialEvent>,
) -> AnalyzeBatch {
    let order_count = thresholds::CLUSTERING_HIGH_ORDERS.max(parameters.activity_count);
    let orders = clustered_orders(rng, parameters, now, order_count, thresholds::CANCELLATION_RATIO_HIGH + 0.05);
    let trades = high_volume_trades(rng, parameters, now, parameters.activity_count);
    let trade_timestamp = material_event
        .as_ref()
        .map_or(now, |e| e.timestamp_iso + Duration::minutes(2));

    AnalyzeBatch {
        trades: trades
            .into_iter()
            .map(|mut t| {
                t.timestamp_iso = trade_timestamp;
                t
            })
            .collect(),
        orders,
        trader_info,
        material_events: material_event.into_iter().collect(),
        market_data: MarketData {
            volatility: jitter(rng, 0.6, 0.2),
            volume: 1_000_000.0,
            price_movement: thresholds::PRICE_IMPACT_HIGH + 0.01,
            liquidity: thresholds::LIQUIDITY_THIN_HIGH - 0.05,
            market_hours: true,
        },
        options: crate::types::AnalysisOptions::default(),
    }
}

fn clustered_orders(
    rng: &mut StdRng,
    parameters: &SimulationParameters,
    now: DateTime<Utc>,
    count: usize,
    cancellation_ratio: f64,
) -> Vec<Order> {
    let cancel_count = ((count as f64) * cancellation_ratio).round() as usize;
    (0..count)
        .map(|i| {
            let cancelled = i < cancel_count;
            Order {
                id: format!("SIM-ORDER-{i}"),
                timestamp_iso: now - Duration::seconds((count - i) as i64),
                instrument: parameters.instrument.clone(),
                size: jitter(rng, 100.0, 50.0),
                price: jitter(rng, 100.0, 1.0),
                side: Side::Buy,
                status: if cancelled { OrderStatus::Cancelled } else { OrderStatus::Filled },
                trader_id: parameters.trader_id.clone(),
                cancellation_timestamp: cancelled.then(|| now - Duration::seconds((count - i) as i64) + Duration::seconds(1)),
            }
        })
        .collect()
}

fn high_volume_trades(
    rng: &mut StdRng,
    parameters: &SimulationParameters,
    now: DateTime<Utc>,
    count: usize,
) -> Vec<Trade> {
    (0..count)
        .map(|i| Trade {
            id: format!("SIM-TRADE-{i}"),
            timestamp_iso: now - Duration::seconds((count - i) as i64),
            instrument: parameters.instrument.clone(),
            volume: jitter(rng, 150_000.0, 10_000.0),
            price: jitter(rng, 100.0, 1.0),
            side: Side::Sell,
            trader_id: parameters.trader_id.clone(),
        })
        .collect()
}
