//! Evidence mapper for circular trading.

use crate::evidence::common::{map_trade_pattern, map_volume_anomaly};
use crate::types::AnalyzeBatch;
use std::collections::HashMap;

/// `counterparty_relationship` and `coordination_signal` have no raw-data
/// source in this batch shape and are always left to fallback.
#[must_use]
pub fn map_circular_trading_evidence(batch: &AnalyzeBatch) -> HashMap<String, usize> {
    let mut evidence = HashMap::new();

    if let Some(v) = map_trade_pattern(&batch.trades, &batch.market_data) {
        evidence.insert("trade_pattern".to_string(), v);
    }
    if let Some(v) = map_volume_anomaly(&batch.trades, &batch.market_data) {
        evidence.insert("volume_anomaly".to_string(), v);
    }

    evidence
}
