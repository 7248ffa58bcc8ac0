//! Evidence mapper for insider dealing.

use crate::evidence::common::{
    map_mnpi_access, map_news_timing, map_pnl_drift, map_price_impact_ratio, map_trade_pattern,
    map_trading_frequency,
};
use crate::types::AnalyzeBatch;
use std::collections::HashMap;

/// `comms_intent` and `comms_frequency` have no raw-data source in this
/// batch shape (no communications feed's input) and are always
/// left for the fallback engine to supply.
#[must_use]
pub fn map_insider_dealing_evidence(batch: &AnalyzeBatch) -> HashMap<String, usize> {
    let mut evidence = HashMap::new();

    if let Some(v) = map_trade_pattern(&batch.trades, &batch.market_data) {
        evidence.insert("trade_pattern".to_string(), v);
    }
    if let Some(v) = map_pnl_drift(&batch.trades, &batch.market_data) {
        evidence.insert("pnl_drift".to_string(), v);
    }
    evidence.insert("mnpi_access".to_string(), map_mnpi_access(&batch.trader_info));
    if let Some(v) = map_news_timing(&batch.trades, &batch.material_events) {
        evidence.insert("news_timing".to_string(), v);
    }
    if let Some(v) = map_trading_frequency(&batch.trades) {
        evidence.insert("trading_frequency".to_string(), v);
    }
    evidence.insert(
        "price_impact_ratio".to_string(),
        map_price_impact_ratio(&batch.market_data),
    );

    evidence
}
