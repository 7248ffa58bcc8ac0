//! Evidence mapper for economic withholding.

use crate::evidence::common::{map_liquidity_impact, map_price_impact_ratio, map_withholding_signal};
use crate::types::AnalyzeBatch;
use std::collections::HashMap;

#[must_use]
pub fn map_economic_withholding_evidence(batch: &AnalyzeBatch) -> HashMap<String, usize> {
    let mut evidence = HashMap::new();

    if let Some(v) = map_withholding_signal(&batch.market_data) {
        evidence.insert("withholding_signal".to_string(), v);
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
