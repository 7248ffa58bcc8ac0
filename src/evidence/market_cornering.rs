//! Evidence mapper for market cornering.

use crate::evidence::common::{map_liquidity_impact, map_price_impact_ratio, map_volume_anomaly};
use crate::types::AnalyzeBatch;
use std::collections::HashMap;

/// `coordination_signal` has no raw-data source in this batch shape and is
/// always left to fallback.
#[must_use]
pub fn map_market_cornering_evidence(batch: &AnalyzeBatch) -> HashMap<String, usize> {
    let mut evidence = HashMap::new();

    if let Some(v) = map_volume_anomaly(&batch.trades, &batch.market_data) {
        evidence.insert("volume_anomaly".to_string(), v);
    }
    evidence.insert(
        "price_impact_ratio".to_string(),
        map_price_impact_ratio(&batch.market_data),
    );
    evidence.insert(
        "liquidity_impact".to_string(),
        map_liquidity_impact(&batch.market_data),
    );

    evidence
}
