//! Evidence mapper for cross-desk collusion.

use crate::evidence::common::{map_mnpi_access, map_trading_frequency};
use crate::types::AnalyzeBatch;
use std::collections::HashMap;

/// `comms_intent` and `coordination_signal` have no raw-data source in this
/// batch shape and are always left to fallback.
#[must_use]
pub fn map_cross_desk_collusion_evidence(batch: &AnalyzeBatch) -> HashMap<String, usize> {
    let mut evidence = HashMap::new();

    evidence.insert("mnpi_access".to_string(), map_mnpi_access(&batch.trader_info));
    if let Some(v) = map_trading_frequency(&batch.trades) {
        evidence.insert("trading_frequency".to_string(), v);
    }

    evidence
}
