//! The eight market-abuse typologies, each backed by one Bayesian model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named class of market-abuse behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Typology {
    InsiderDealing,
    Spoofing,
    WashTrading,
    CircularTrading,
    CrossDeskCollusion,
    MarketCornering,
    CommodityManipulation,
    EconomicWithholding,
}

impl Typology {
    /// All registered typologies, in a stable order.
    #[must_use]
    pub const fn all() -> [Typology; 8] {
        [
            Typology::InsiderDealing,
            Typology::Spoofing,
            Typology::WashTrading,
            Typology::CircularTrading,
            Typology::CrossDeskCollusion,
            Typology::MarketCornering,
            Typology::CommodityManipulation,
            Typology::EconomicWithholding,
        ]
    }

    /// Stable lowercase-snake-case name, used as the config key and as the
    /// outcome node's name in its own network.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Typology::InsiderDealing => "insider_dealing",
            Typology::Spoofing => "spoofing",
            Typology::WashTrading => "wash_trading",
            Typology::CircularTrading => "circular_trading",
            Typology::CrossDeskCollusion => "cross_desk_collusion",
            Typology::MarketCornering => "market_cornering",
            Typology::CommodityManipulation => "commodity_manipulation",
            Typology::EconomicWithholding => "economic_withholding",
        }
    }

    /// Regulatory framework tags attached to alerts of this typology
    /// (surfaced by the explainability builder).
    #[must_use]
    pub const fn regulatory_frameworks(self) -> &'static [&'static str] {
        match self {
            Typology::InsiderDealing => &["MAR Art.8", "MAR Art.14"],
            Typology::Spoofing => &["MAR Art.12", "Dodd-Frank 747"],
            Typology::WashTrading => &["MAR Art.12"],
            Typology::CircularTrading => &["MAR Art.12"],
            Typology::CrossDeskCollusion => &["MAR Art.12", "MAR Art.8"],
            Typology::MarketCornering => &["MAR Art.12", "REMIT Art.3"],
            Typology::CommodityManipulation => &["REMIT Art.3", "REMIT Art.5"],
            Typology::EconomicWithholding => &["REMIT Art.5"],
        }
    }
}

impl fmt::Display for Typology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Typology {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Typology::all()
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown typology '{s}'"))
    }
}
