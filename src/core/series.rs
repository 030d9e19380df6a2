//! Series types and the upstream fetch abstraction

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::error::HistoryError;

pub const MIN_YEARS: u32 = 1;
pub const MAX_YEARS: u32 = 10;

/// Date-ordered closing values as returned by the upstream. `None` marks a
/// day the provider listed without a usable close.
pub type RawSeries = Vec<(NaiveDate, Option<f64>)>;

/// A single day's closing price. Serialises with the date as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Lookback window in whole years, always within `MIN_YEARS..=MAX_YEARS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackYears(u32);

impl LookbackYears {
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for LookbackYears {
    type Error = HistoryError;

    fn try_from(years: u32) -> Result<Self, Self::Error> {
        if (MIN_YEARS..=MAX_YEARS).contains(&years) {
            Ok(LookbackYears(years))
        } else {
            Err(HistoryError::InvalidYears(years))
        }
    }
}

#[async_trait]
pub trait SeriesFetcher: Send + Sync {
    /// Daily unadjusted closes for `symbol` from `start` until now, ascending
    /// by date with no duplicate dates. An empty upstream answer is
    /// `HistoryError::UpstreamUnavailable`.
    async fn fetch(&self, symbol: &str, start: DateTime<Utc>) -> Result<RawSeries, HistoryError>;
}
