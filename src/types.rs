//! Raw input and output types for the `analyze`/`simulate` entry points
//!.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::typology::Typology;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Active,
    Filled,
    Cancelled,
    Rejected,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Trade {
    pub id: String,
    pub timestamp_iso: DateTime<Utc>,
    pub instrument: String,
    pub volume: f64,
    pub price: f64,
    pub side: Side,
    pub trader_id: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Order {
    pub id: String,
    pub timestamp_iso: DateTime<Utc>,
    pub instrument: String,
    pub size: f64,
    pub price: f64,
    pub side: Side,
    pub status: OrderStatus,
    pub trader_id: String,
    #[serde(default)]
    pub cancellation_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TraderInfo {
    pub id: String,
    pub name: String,
    pub role: String,
    pub department: String,
    pub access_level: String,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub supervisors: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MaterialEvent {
    pub id: String,
    pub timestamp_iso: DateTime<Utc>,
    #[serde(rename = "type")]
    pub event_type: String,
    pub instruments_affected: Vec<String>,
    pub materiality_score: f64,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct MarketData {
    pub volatility: f64,
    pub volume: f64,
    pub price_movement: f64,
    pub liquidity: f64,
    pub market_hours: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AnalysisOptions {
    #[serde(default)]
    pub typologies: Option<Vec<Typology>>,
    #[serde(default)]
    pub use_latent_intent: Option<bool>,
    #[serde(default)]
    pub grouped: Option<bool>,
    #[serde(default)]
    pub include_rationale: bool,
}

impl AnalysisOptions {
    #[must_use]
    pub fn requested_typologies(&self) -> Vec<Typology> {
        self.typologies.clone().unwrap_or_else(|| Typology::all().to_vec())
    }
}

/// The `analyze(batch)` request payload.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyzeBatch {
    #[serde(default)]
    pub trades: Vec<Trade>,
    #[serde(default)]
    pub orders: Vec<Order>,
    pub trader_info: TraderInfo,
    #[serde(default)]
    pub material_events: Vec<MaterialEvent>,
    pub market_data: MarketData,
    #[serde(default)]
    pub options: AnalysisOptions,
}

/// Per-typology risk score.
#[derive(Debug, Clone, Serialize)]
pub struct RiskScore {
    pub overall: f64,
    pub distribution: Vec<f64>,
    pub esi: crate::esi::EsiResult,
}
