use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

use crate::core::{HistoryError, RawSeries, SeriesFetcher};

#[derive(Deserialize, Debug)]
struct YahooChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    result: Option<Vec<ChartItem>>,
    error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
struct ChartError {
    description: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug)]
struct ChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Deserialize, Debug)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

/// Turns one chart item into an ascending, date-unique series. Bars are dated
/// in exchange-local time using the item's `gmtoffset`.
fn extract_close_series(item: &ChartItem) -> RawSeries {
    let (Some(timestamps), Some(closes)) = (
        item.timestamp.as_ref(),
        item.indicators
            .as_ref()
            .and_then(|inds| inds.quote.first())
            .and_then(|q| q.close.as_ref()),
    ) else {
        return Vec::new();
    };
    let offset = item.meta.as_ref().and_then(|m| m.gmtoffset).unwrap_or(0);

    let mut by_date: BTreeMap<NaiveDate, Option<f64>> = BTreeMap::new();
    for (ts, close) in timestamps.iter().zip(closes.iter()) {
        let Some(date) = DateTime::from_timestamp(ts + offset, 0).map(|dt| dt.date_naive()) else {
            continue;
        };
        let entry = by_date.entry(date).or_insert(None);
        if close.is_some() {
            *entry = *close;
        }
    }
    by_date.into_iter().collect()
}

pub struct YahooSeriesFetcher {
    base_url: String,
    client: reqwest::Client,
}

impl YahooSeriesFetcher {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("dipdca/1.0")
            .build()?;
        Ok(YahooSeriesFetcher {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl SeriesFetcher for YahooSeriesFetcher {
    #[instrument(
        name = "YahooSeriesFetch",
        skip(self),
        fields(symbol = %symbol)
    )]
    async fn fetch(&self, symbol: &str, start: DateTime<Utc>) -> Result<RawSeries, HistoryError> {
        let url = format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=history",
            self.base_url,
            symbol,
            start.timestamp(),
            Utc::now().timestamp()
        );
        debug!("Requesting close series from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| HistoryError::upstream(symbol, format!("Request error: {e}")))?;

        if !response.status().is_success() {
            return Err(HistoryError::upstream(
                symbol,
                format!("HTTP error: {}", response.status()),
            ));
        }

        let data = response
            .json::<YahooChartResponse>()
            .await
            .map_err(|e| HistoryError::upstream(symbol, format!("Failed to parse response: {e}")))?;

        if let Some(description) = data.chart.error.and_then(|e| e.description) {
            return Err(HistoryError::upstream(symbol, description));
        }

        let series = data
            .chart
            .result
            .as_ref()
            .and_then(|items| items.first())
            .map(extract_close_series)
            .unwrap_or_default();

        if series.is_empty() {
            return Err(HistoryError::upstream(symbol, "No price data returned"));
        }
        debug!(points = series.len(), "Received close series");
        Ok(series)
    }
}
