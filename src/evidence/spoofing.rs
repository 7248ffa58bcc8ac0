//! Evidence mapper for spoofing.

use crate::evidence::common::{
    map_layering_pattern, map_order_cancellation, map_order_clustering, map_price_impact_ratio,
    map_trading_frequency, map_volume_anomaly,
};
use crate::types::AnalyzeBatch;
use std::collections::HashMap;

#[must_use]
pub fn map_spoofing_evidence(batch: &AnalyzeBatch) -> HashMap<String, usize> {
    let mut evidence = HashMap::new();

    if let Some(v) = map_order_clustering(&batch.orders) {
        evidence.insert("order_clustering".to_string(), v);
    }
    if let Some(v) = map_order_cancellation(&batch.orders) {
        evidence.insert("order_cancellation".to_string(), v);
    }
    if let Some(v) = map_layering_pattern(&batch.orders) {
        evidence.insert("layering_pattern".to_string(), v);
    }
    evidence.insert(
        "price_impact_ratio".to_string(),
        map_price_impact_ratio(&batch.market_data),
    );
    if let Some(v) = map_trading_frequency(&batch.trades) {
        evidence.insert("trading_frequency".to_string(), v);
    }
    if let Some(v) = map_volume_anomaly(&batch.trades, &batch.market_data) {
        evidence.insert("volume_anomaly".to_string(), v);
    }

    evidence
}
