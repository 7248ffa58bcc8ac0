//! Named thresholds for the evidence mappers. Every mapper reads
//! from here instead of embedding a magic number.

/// Trade within this many minutes of a price-sensitive news event maps
/// `news_timing` to its highest state.
pub const HIGHLY_SUSPICIOUS_MINUTES: i64 = 5;

/// Trade within this many minutes (but outside the highly-suspicious
/// window) maps `news_timing` to its middle state.
pub const SUSPICIOUS_MINUTES: i64 = 60;

/// `mnpi_access` is "clear" (state 2) once an indicator count exceeds this.
pub const MNPI_CLEAR_INDICATOR_THRESHOLD: usize = 2;

/// `mnpi_access` is "potential" (state 1) once an indicator count reaches
/// this.
pub const MNPI_POTENTIAL_INDICATOR_THRESHOLD: usize = 1;

/// Order cancellation ratios at or above this are "highly suspicious".
pub const CANCELLATION_RATIO_HIGH: f64 = 0.8;
/// Order cancellation ratios at or above this are "suspicious".
pub const CANCELLATION_RATIO_MEDIUM: f64 = 0.4;

/// Minimum same-side orders within the clustering window to flag
/// `order_clustering` as suspicious at all.
pub const CLUSTERING_MIN_ORDERS: usize = 3;
/// Same-side order count at or above this is "highly suspicious" clustering.
pub const CLUSTERING_HIGH_ORDERS: usize = 8;

/// Minimum distinct price levels, same side, cancelled, to flag layering.
pub const LAYERING_MIN_LEVELS: usize = 3;
pub const LAYERING_HIGH_LEVELS: usize = 6;

/// Trade volume as a ratio of total market volume above which
/// `volume_anomaly`/`trade_pattern` escalate.
pub const VOLUME_RATIO_MEDIUM: f64 = 0.05;
pub const VOLUME_RATIO_HIGH: f64 = 0.15;

/// Absolute price movement (fractional) above which `price_impact_ratio`
/// escalates.
pub const PRICE_IMPACT_MEDIUM: f64 = 0.01;
pub const PRICE_IMPACT_HIGH: f64 = 0.03;

/// Liquidity score below which
/// `liquidity_impact` escalates (thin markets amplify manipulation impact).
pub const LIQUIDITY_THIN_MEDIUM: f64 = 0.4;
pub const LIQUIDITY_THIN_HIGH: f64 = 0.2;

/// Bucket a non-negative ratio into a 3-state index using two ascending
/// thresholds. Shared by every ratio-based mapper so the bucketing logic
/// itself isn't duplicated per typology.
#[must_use]
pub fn bucket(value: f64, medium: f64, high: f64) -> usize {
    if value >= high {
        2
    } else if value >= medium {
        1
    } else {
        0
    }
}

/// Same as [`bucket`] but for "lower is worse" measures (e.g. thin
/// liquidity).
#[must_use]
pub fn bucket_inverse(value: f64, medium: f64, high: f64) -> usize {
    if value <= high {
        2
    } else if value <= medium {
        1
    } else {
        0
    }
}
