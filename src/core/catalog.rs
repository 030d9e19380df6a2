//! Fixed catalogs of supported assets and display currencies

use std::fmt::Display;
use std::str::FromStr;

use super::error::HistoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Asset {
    Reit,
    Gold,
    Btc,
}

impl Asset {
    pub const ALL: [Asset; 3] = [Asset::Reit, Asset::Gold, Asset::Btc];

    /// Short key used in request paths.
    pub fn key(&self) -> &'static str {
        match self {
            Asset::Reit => "reit",
            Asset::Gold => "gold",
            Asset::Btc => "btc",
        }
    }

    /// Upstream ticker symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Asset::Reit => "REET",
            Asset::Gold => "GLD",
            Asset::Btc => "BTC-USD",
        }
    }
}

impl Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for Asset {
    type Err = HistoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reit" => Ok(Asset::Reit),
            "gold" => Ok(Asset::Gold),
            "btc" => Ok(Asset::Btc),
            _ => Err(HistoryError::UnsupportedAsset(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Currency {
    Usd,
    Jpy,
}

impl Currency {
    /// Prices come from the upstream in this currency.
    pub const BASE: Currency = Currency::Usd;

    pub fn key(&self) -> &'static str {
        match self {
            Currency::Usd => "usd",
            Currency::Jpy => "jpy",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Jpy => "JPY",
        }
    }

    /// FX ticker quoting units of this currency per base unit, or `None` for
    /// the base currency itself.
    pub fn fx_symbol(&self) -> Option<&'static str> {
        match self {
            Currency::Usd => None,
            Currency::Jpy => Some("JPY=X"),
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for Currency {
    type Err = HistoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "usd" => Ok(Currency::Usd),
            "jpy" => Ok(Currency::Jpy),
            _ => Err(HistoryError::UnsupportedCurrency(s.to_string())),
        }
    }
}
