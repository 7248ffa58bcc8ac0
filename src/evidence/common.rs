//! Fine-grained evidence helpers shared across typology mappers. Each is total over its inputs and
//! returns `None` when the raw data cannot support a judgement, so the
//! caller omits the node rather than guessing.

use crate::evidence::thresholds::{
    bucket, bucket_inverse, CANCELLATION_RATIO_HIGH, CANCELLATION_RATIO_MEDIUM,
    CLUSTERING_HIGH_ORDERS, CLUSTERING_MIN_ORDERS, HIGHLY_SUSPICIOUS_MINUTES,
    LAYERING_HIGH_LEVELS, LAYERING_MIN_LEVELS, LIQUIDITY_THIN_HIGH, LIQUIDITY_THIN_MEDIUM,
    MNPI_CLEAR_INDICATOR_THRESHOLD, MNPI_POTENTIAL_INDICATOR_THRESHOLD, PRICE_IMPACT_HIGH,
    PRICE_IMPACT_MEDIUM, SUSPICIOUS_MINUTES, VOLUME_RATIO_HIGH, VOLUME_RATIO_MEDIUM,
};
use crate::types::{MaterialEvent, MarketData, Order, OrderStatus, Side, Trade, TraderInfo};
use std::collections::HashSet;

/// Minutes between a trade and the nearest material event affecting its
/// instrument, mapped to a 3-state `news_timing` evidence index.
#[must_use]
pub fn map_news_timing(trades: &[Trade], events: &[MaterialEvent]) -> Option<usize> {
    let mut best_minutes: Option<i64> = None;

    for trade in trades {
        for event in events {
            if !event.instruments_affected.iter().any(|i| i == &trade.instrument) {
                continue;
            }
            let delta = (trade.timestamp_iso - event.timestamp_iso).num_minutes().abs();
            best_minutes = Some(best_minutes.map_or(delta, |b: i64| b.min(delta)));
        }
    }

    let minutes = best_minutes?;
    if minutes <= HIGHLY_SUSPICIOUS_MINUTES {
        Some(2)
    } else if minutes <= SUSPICIOUS_MINUTES {
        Some(1)
    } else {
        Some(0)
    }
}

/// `mnpi_access`: executive role or >2 indicators -> clear (2); senior role
/// or >=1 indicator -> potential (1); else 0.
#[must_use]
pub fn map_mnpi_access(trader: &TraderInfo) -> usize {
    let role = trader.role.to_lowercase();
    let is_executive = role.contains("chief") || role.contains("executive") || role.contains("md");
    let is_senior = role.contains("senior") || role.contains("head") || role.contains("director");

    let mut indicators = 0usize;
    if trader.access_level.eq_ignore_ascii_case("high") {
        indicators += 1;
    }
    if trader.access_level.eq_ignore_ascii_case("privileged") {
        indicators += 1;
    }
    if !trader.supervisors.is_empty() {
        indicators += 1;
    }

    if is_executive || indicators > MNPI_CLEAR_INDICATOR_THRESHOLD {
        2
    } else if is_senior || indicators >= MNPI_POTENTIAL_INDICATOR_THRESHOLD {
        1
    } else {
        0
    }
}

/// Trade volume as a share of total market volume.
#[must_use]
pub fn map_volume_anomaly(trades: &[Trade], market: &MarketData) -> Option<usize> {
    if trades.is_empty() || market.volume <= 0.0 {
        return None;
    }
    let total_volume: f64 = trades.iter().map(|t| t.volume).sum();
    let ratio = total_volume / market.volume;
    Some(bucket(ratio, VOLUME_RATIO_MEDIUM, VOLUME_RATIO_HIGH))
}

/// Directional alignment between trade side and subsequent market move,
/// scaled by volume share — a proxy for `trade_pattern`.
#[must_use]
pub fn map_trade_pattern(trades: &[Trade], market: &MarketData) -> Option<usize> {
    if trades.is_empty() {
        return None;
    }
    let buys: f64 = trades.iter().filter(|t| t.side == Side::Buy).map(|t| t.volume).sum();
    let sells: f64 = trades.iter().filter(|t| t.side == Side::Sell).map(|t| t.volume).sum();
    let net = buys - sells;
    let directional_alignment = if market.price_movement.abs() > f64::EPSILON {
        (net.signum() * market.price_movement.signum()).max(0.0)
    } else {
        0.0
    };
    if directional_alignment <= 0.0 {
        return Some(0);
    }
    let total = buys + sells;
    let skew = if total > 0.0 { net.abs() / total } else { 0.0 };
    Some(bucket(skew, 0.3, 0.6))
}

/// PnL drift: whether a trader's net position moved favorably just ahead of
/// the realized market move.
#[must_use]
pub fn map_pnl_drift(trades: &[Trade], market: &MarketData) -> Option<usize> {
    map_trade_pattern(trades, market).map(|pattern_state| {
        let magnitude = bucket(market.price_movement.abs(), PRICE_IMPACT_MEDIUM, PRICE_IMPACT_HIGH);
        pattern_state.min(magnitude)
    })
}

/// Trade count within a short rolling window, as a frequency anomaly
/// signal.
#[must_use]
pub fn map_trading_frequency(trades: &[Trade]) -> Option<usize> {
    if trades.len() < 2 {
        return None;
    }
    let mut timestamps: Vec<_> = trades.iter().map(|t| t.timestamp_iso).collect();
    timestamps.sort();
    let span_minutes = (timestamps[timestamps.len() - 1] - timestamps[0]).num_minutes().max(1);
    let rate = trades.len() as f64 / span_minutes as f64;
    Some(bucket(rate, 0.5, 2.0))
}

/// Absolute realized price movement, bucketed (shared by every typology
/// that reasons about market impact).
#[must_use]
pub fn map_price_impact_ratio(market: &MarketData) -> usize {
    bucket(market.price_movement.abs(), PRICE_IMPACT_MEDIUM, PRICE_IMPACT_HIGH)
}

/// Thin liquidity amplifies the effect of a given volume; derived purely
/// from `market_data`, so always present.
#[must_use]
pub fn map_liquidity_impact(market: &MarketData) -> usize {
    bucket_inverse(market.liquidity, LIQUIDITY_THIN_MEDIUM, LIQUIDITY_THIN_HIGH)
}

/// Apparent supply withheld from a thin, moving market: low volume despite
/// high price movement and low liquidity.
#[must_use]
pub fn map_withholding_signal(market: &MarketData) -> Option<usize> {
    if market.volume <= 0.0 {
        return None;
    }
    let impact = map_price_impact_ratio(market);
    let thin = map_liquidity_impact(market);
    Some(impact.min(thin))
}

/// Same-instrument, same-side order clustering within the order list.
#[must_use]
pub fn map_order_clustering(orders: &[Order]) -> Option<usize> {
    if orders.is_empty() {
        return None;
    }
    let mut by_instrument_side: std::collections::HashMap<(String, Side), usize> =
        std::collections::HashMap::new();
    for order in orders {
        *by_instrument_side
            .entry((order.instrument.clone(), order.side))
            .or_insert(0) += 1;
    }
    let max_cluster = by_instrument_side.values().copied().max().unwrap_or(0);
    if max_cluster < CLUSTERING_MIN_ORDERS {
        return Some(0);
    }
    if max_cluster >= CLUSTERING_HIGH_ORDERS {
        Some(2)
    } else {
        Some(1)
    }
}

/// Ratio of cancelled to total orders.
#[must_use]
pub fn map_order_cancellation(orders: &[Order]) -> Option<usize> {
    if orders.is_empty() {
        return None;
    }
    let cancelled = orders.iter().filter(|o| o.status == OrderStatus::Cancelled).count();
    let ratio = cancelled as f64 / orders.len() as f64;
    Some(bucket(ratio, CANCELLATION_RATIO_MEDIUM, CANCELLATION_RATIO_HIGH))
}

/// Distinct price levels, same side, that were cancelled — the classic
/// layering shape (many resting orders at different prices, pulled before
/// execution).
#[must_use]
pub fn map_layering_pattern(orders: &[Order]) -> Option<usize> {
    if orders.is_empty() {
        return None;
    }
    let mut levels_by_side: std::collections::HashMap<Side, HashSet<u64>> =
        std::collections::HashMap::new();
    for order in orders.iter().filter(|o| o.status == OrderStatus::Cancelled) {
        levels_by_side
            .entry(order.side)
            .or_default()
            .insert(order.price.to_bits());
    }
    let max_levels = levels_by_side.values().map(HashSet::len).max().unwrap_or(0);
    if max_levels < LAYERING_MIN_LEVELS {
        return Some(0);
    }
    if max_levels >= LAYERING_HIGH_LEVELS {
        Some(2)
    } else {
        Some(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn trader(role: &str, access: &str, supervisors: Vec<String>) -> TraderInfo {
        TraderInfo {
            id: "t1".into(),
            name: "Test Trader".into(),
            role: role.into(),
            department: "trading".into(),
            access_level: access.into(),
            start_date: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            supervisors,
        }
    }

    #[test]
    fn mnpi_access_executive_is_clear() {
        assert_eq!(map_mnpi_access(&trader("Chief Investment Officer", "standard", vec![])), 2);
    }

    #[test]
    fn mnpi_access_no_signal_is_zero() {
        assert_eq!(map_mnpi_access(&trader("Analyst", "standard", vec![])), 0);
    }

    #[test]
    fn news_timing_absent_without_matching_instrument() {
        let trade = Trade {
            id: "tr1".into(),
            timestamp_iso: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            instrument: "ABC".into(),
            volume: 100.0,
            price: 10.0,
            side: Side::Buy,
            trader_id: "t1".into(),
        };
        let event = MaterialEvent {
            id: "e1".into(),
            timestamp_iso: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            event_type: "earnings".into(),
            instruments_affected: vec!["XYZ".into()],
            materiality_score: 0.9,
        };
        assert_eq!(map_news_timing(&[trade], &[event]), None);
    }

    #[test]
    fn news_timing_within_five_minutes_is_highly_suspicious() {
        let trade = Trade {
            id: "tr1".into(),
            timestamp_iso: Utc.with_ymd_and_hms(2024, 1, 1, 12, 3, 0).unwrap(),
            instrument: "ABC".into(),
            volume: 100.0,
            price: 10.0,
            side: Side::Buy,
            trader_id: "t1".into(),
        };
        let event = MaterialEvent {
            id: "e1".into(),
            timestamp_iso: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            event_type: "earnings".into(),
            instruments_affected: vec!["ABC".into()],
            materiality_score: 0.9,
        };
        assert_eq!(map_news_timing(&[trade], &[event]), Some(2));
    }
}
