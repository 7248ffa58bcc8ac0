//! Evidence mapper for wash trading.

use crate::evidence::common::{map_price_impact_ratio, map_trade_pattern, map_volume_anomaly};
use crate::types::AnalyzeBatch;
use std::collections::HashMap;

/// `counterparty_relationship` has no raw-data source in this batch shape
/// (no counterparty field on `Trade`) and is always left to fallback.
#[must_use]
pub fn map_wash_trading_evidence(batch: &AnalyzeBatch) -> HashMap<String, usize> {
    let mut evidence = HashMap::new();

    if let Some(v) = map_trade_pattern(&batch.trades, &batch.market_data) {
        evidence.insert("trade_pattern".to_string(), v);
    }
    if let Some(v) = map_volume_anomaly(&batch.trades, &batch.market_data) {
        evidence.insert("volume_anomaly".to_string(), v);
    }
    evidence.insert(
        "price_impact_ratio".to_string(),
        map_price_impact_ratio(&batch.market_data),
    );

    evidence
}
