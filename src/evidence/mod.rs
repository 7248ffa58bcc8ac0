//! Evidence Pipeline: deterministic raw→state
//! mapping, one pure function per typology.

pub mod circular_trading;
pub mod commodity_manipulation;
pub mod common;
pub mod cross_desk_collusion;
pub mod economic_withholding;
pub mod insider_dealing;
pub mod market_cornering;
pub mod spoofing;
pub mod thresholds;
pub mod wash_trading;

use crate::types::AnalyzeBatch;
use crate::typology::Typology;
use std::collections::HashMap;

/// Dispatch to the mapper for `typology`.
#[must_use]
pub fn map_evidence(typology: Typology, batch: &AnalyzeBatch) -> HashMap<String, usize> {
    match typology {
        Typology::InsiderDealing => insider_dealing::map_insider_dealing_evidence(batch),
        Typology::Spoofing => spoofing::map_spoofing_evidence(batch),
        Typology::WashTrading => wash_trading::map_wash_trading_evidence(batch),
        Typology::CircularTrading => circular_trading::map_circular_trading_evidence(batch),
        Typology::CrossDeskCollusion => {
            cross_desk_collusion::map_cross_desk_collusion_evidence(batch)
        }
        Typology::MarketCornering => market_cornering::map_market_cornering_evidence(batch),
        Typology::CommodityManipulation => {
            commodity_manipulation::map_commodity_manipulation_evidence(batch)
        }
        Typology::EconomicWithholding => {
            economic_withholding::map_economic_withholding_evidence(batch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MarketData, TraderInfo};
    use chrono::{TimeZone, Utc};

    fn empty_batch() -> AnalyzeBatch {
        AnalyzeBatch {
            trades: vec![],
            orders: vec![],
            trader_info: TraderInfo {
                id: "t1".into(),
                name: "Test".into(),
                role: "analyst".into(),
                department: "trading".into(),
                access_level: "standard".into(),
                start_date: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
                supervisors: vec![],
            },
            material_events: vec![],
            market_data: MarketData {
                volatility: 0.1,
                volume: 1000.0,
                price_movement: 0.0,
                liquidity: 0.8,
                market_hours: true,
            },
            options: Default::default(),
        }
    }

    #[test]
    fn mappers_never_panic_on_empty_batch() {
        let batch = empty_batch();
        for typology in Typology::all() {
            let evidence = map_evidence(typology, &batch);
            for &state in evidence.values() {
                assert!(state < 3);
            }
        }
    }
}
