//! DQSI: Data Quality Sufficiency Index.

pub mod calculator;
pub mod config;
pub mod kde;

pub use calculator::{compute, strategy_for_role, DqsiResult, KdeScore, Strategy, TrustBucket};
pub use config::DqsiConfig;
pub use kde::{ComparisonType, Dimension, Kde, KdeObservation, Tier};

use crate::types::{AnalyzeBatch, TraderInfo};
use std::collections::HashMap;

/// Derive KDE observations from a raw batch.
#[must_use]
pub fn observe_batch(batch: &AnalyzeBatch, as_of: chrono::DateTime<chrono::Utc>) -> HashMap<String, KdeObservation> {
    let mut observations = HashMap::new();

    let trader_id_present = !batch.trader_info.id.is_empty();
    observations.insert(
        "trader_id".to_string(),
        KdeObservation {
            present: trader_id_present,
            conforms_to_format: trader_id_present,
            age_seconds: None,
            matches_reference: Some(trader_id_present),
            volume_ratio: None,
        },
    );

    if let Some(latest) = batch.trades.iter().map(|t| t.timestamp_iso).max() {
        let age = (as_of - latest).num_seconds();
        observations.insert(
            "trade_time".to_string(),
            KdeObservation {
                present: true,
                conforms_to_format: true,
                age_seconds: Some(age),
                matches_reference: None,
                volume_ratio: None,
            },
        );
    } else {
        observations.insert("trade_time".to_string(), KdeObservation::default());
    }

    let notional_present = batch.trades.iter().any(|t| t.price > 0.0 && t.volume > 0.0);
    observations.insert(
        "notional".to_string(),
        KdeObservation {
            present: notional_present,
            conforms_to_format: notional_present,
            age_seconds: None,
            matches_reference: Some(notional_present),
            volume_ratio: None,
        },
    );

    let instrument_present = batch.trades.iter().any(|t| !t.instrument.is_empty());
    observations.insert(
        "instrument".to_string(),
        KdeObservation {
            present: instrument_present,
            conforms_to_format: instrument_present,
            ..Default::default()
        },
    );

    let price_present = batch.trades.iter().any(|t| t.price > 0.0);
    observations.insert(
        "price".to_string(),
        KdeObservation {
            present: price_present,
            matches_reference: Some(price_present),
            ..Default::default()
        },
    );

    let volume_ratio = if batch.market_data.volume > 0.0 {
        let total: f64 = batch.trades.iter().map(|t| t.volume).sum();
        Some((total / batch.market_data.volume).clamp(0.0, 1.0))
    } else {
        None
    };
    observations.insert(
        "volume".to_string(),
        KdeObservation {
            present: !batch.trades.is_empty(),
            volume_ratio,
            ..Default::default()
        },
    );

    let order_status_present = !batch.orders.is_empty();
    observations.insert(
        "order_status".to_string(),
        KdeObservation {
            present: order_status_present,
            conforms_to_format: order_status_present,
            ..Default::default()
        },
    );

    let material_event_present = !batch.material_events.is_empty();
    observations.insert(
        "material_event_id".to_string(),
        KdeObservation {
            present: material_event_present,
            matches_reference: Some(material_event_present),
            ..Default::default()
        },
    );

    observations
}

#[must_use]
pub fn trader_role(trader_info: &TraderInfo) -> Option<&str> {
    if trader_info.role.trim().is_empty() {
        None
    } else {
        Some(trader_info.role.as_str())
    }
}
