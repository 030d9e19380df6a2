//! Assembles a display-ready price history for one asset, optionally
//! converted into another currency through an FX series.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::sync::Arc;
use tracing::debug;

use crate::core::{Currency, HistoryError, LookbackYears, PricePoint, RawSeries, SeriesFetcher};

/// Extra days fetched in front of the window so that a holiday on its first
/// day does not cut the first trading session.
const HOLIDAY_BUFFER_DAYS: i64 = 7;

pub fn start_date(now: DateTime<Utc>, years: LookbackYears) -> DateTime<Utc> {
    now - Duration::days(i64::from(years.get()) * 365 + HOLIDAY_BUFFER_DAYS)
}

/// Aligns `rates` onto `dates` by carrying the last known rate forward.
///
/// Both inputs must be ascending by date. Entry `i` of the result is the most
/// recent non-missing rate dated at or before `dates[i]`, or `None` when no
/// such rate exists yet.
pub fn forward_fill(dates: &[NaiveDate], rates: &RawSeries) -> Vec<Option<f64>> {
    let mut aligned = Vec::with_capacity(dates.len());
    let mut cursor = rates.iter().peekable();
    let mut last_known = None;

    for date in dates {
        while let Some((_, rate)) = cursor.next_if(|(d, _)| d <= date) {
            if rate.is_some() {
                last_known = *rate;
            }
        }
        aligned.push(last_known);
    }
    aligned
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Drops missing and non-finite values, rounds the rest to four decimals.
pub fn to_price_points<I>(series: I) -> Vec<PricePoint>
where
    I: IntoIterator<Item = (NaiveDate, Option<f64>)>,
{
    series
        .into_iter()
        .filter_map(|(date, value)| {
            value
                .map(round4)
                .filter(|price| price.is_finite())
                .map(|price| PricePoint { date, price })
        })
        .collect()
}

#[derive(Clone)]
pub struct HistoryAssembler {
    fetcher: Arc<dyn SeriesFetcher>,
}

impl HistoryAssembler {
    pub fn new(fetcher: Arc<dyn SeriesFetcher>) -> Self {
        HistoryAssembler { fetcher }
    }

    pub async fn assemble(
        &self,
        symbol: &str,
        years: LookbackYears,
        currency: Currency,
    ) -> Result<Vec<PricePoint>, HistoryError> {
        self.assemble_at(Utc::now(), symbol, years, currency).await
    }

    /// Same as [`assemble`](Self::assemble) with the window anchored at `now`.
    pub async fn assemble_at(
        &self,
        now: DateTime<Utc>,
        symbol: &str,
        years: LookbackYears,
        currency: Currency,
    ) -> Result<Vec<PricePoint>, HistoryError> {
        let start = start_date(now, years);

        let Some(fx_symbol) = currency.fx_symbol() else {
            let series = self.fetcher.fetch(symbol, start).await?;
            return Ok(to_price_points(series));
        };

        debug!(%symbol, %fx_symbol, "Fetching asset and FX series");
        let (series, rates) = futures::try_join!(
            self.fetcher.fetch(symbol, start),
            self.fetcher.fetch(fx_symbol, start)
        )?;

        let dates: Vec<NaiveDate> = series.iter().map(|(date, _)| *date).collect();
        let aligned = forward_fill(&dates, &rates);

        let converted = series
            .into_iter()
            .zip(aligned)
            .map(|((date, value), rate)| (date, value.zip(rate).map(|(v, r)| v * r)));
        Ok(to_price_points(converted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeFetcher {
        series: HashMap<String, RawSeries>,
        calls: Mutex<Vec<(String, DateTime<Utc>)>>,
    }

    impl FakeFetcher {
        fn new(series: &[(&str, RawSeries)]) -> Arc<Self> {
            Arc::new(FakeFetcher {
                series: series
                    .iter()
                    .map(|(symbol, s)| (symbol.to_string(), s.clone()))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl SeriesFetcher for FakeFetcher {
        async fn fetch(
            &self,
            symbol: &str,
            start: DateTime<Utc>,
        ) -> Result<RawSeries, HistoryError> {
            self.calls.lock().unwrap().push((symbol.to_string(), start));
            match self.series.get(symbol) {
                Some(series) if !series.is_empty() => Ok(series.clone()),
                _ => Err(HistoryError::upstream(symbol, "No price data returned")),
            }
        }
    }

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, n).unwrap()
    }

    fn years(n: u32) -> LookbackYears {
        LookbackYears::try_from(n).unwrap()
    }

    fn prices(points: &[PricePoint]) -> Vec<f64> {
        points.iter().map(|p| p.price).collect()
    }

    #[tokio::test]
    async fn test_base_currency_returns_raw_series() {
        let fetcher = FakeFetcher::new(&[(
            "REET",
            vec![(day(1), Some(100.0)), (day(2), Some(101.0)), (day(3), Some(102.5))],
        )]);
        let assembler = HistoryAssembler::new(fetcher.clone());

        let points = assembler
            .assemble("REET", years(1), Currency::Usd)
            .await
            .unwrap();

        assert_eq!(prices(&points), vec![100.0, 101.0, 102.5]);
        assert_eq!(points[0].date, day(1));
        // No FX lookup for the base currency
        assert_eq!(fetcher.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_converted_series_multiplies_matching_dates() {
        let fetcher = FakeFetcher::new(&[
            ("GLD", vec![(day(1), Some(1.0)), (day(2), Some(2.0))]),
            ("JPY=X", vec![(day(1), Some(100.0)), (day(2), Some(110.0))]),
        ]);
        let assembler = HistoryAssembler::new(fetcher);

        let points = assembler
            .assemble("GLD", years(2), Currency::Jpy)
            .await
            .unwrap();

        assert_eq!(
            points,
            vec![
                PricePoint { date: day(1), price: 100.0 },
                PricePoint { date: day(2), price: 220.0 },
            ]
        );
    }

    #[tokio::test]
    async fn test_conversion_forward_fills_missing_rates() {
        // Weekend bitcoin closes with weekday-only FX quotes
        let fetcher = FakeFetcher::new(&[
            (
                "BTC-USD",
                vec![
                    (day(1), Some(10.0)),
                    (day(2), Some(11.0)),
                    (day(5), Some(12.0)),
                    (day(6), Some(13.0)),
                    (day(7), Some(14.0)),
                    (day(8), Some(15.0)),
                ],
            ),
            (
                "JPY=X",
                vec![(day(2), Some(141.0)), (day(5), Some(144.5)), (day(8), Some(145.0))],
            ),
        ]);
        let assembler = HistoryAssembler::new(fetcher);

        let points = assembler
            .assemble("BTC-USD", years(1), Currency::Jpy)
            .await
            .unwrap();

        let dates: Vec<_> = points.iter().map(|p| p.date).collect();
        // day 1 precedes the first rate and is dropped rather than zero-filled
        assert_eq!(dates, vec![day(2), day(5), day(6), day(7), day(8)]);
        assert_eq!(prices(&points), vec![1551.0, 1734.0, 1878.5, 2023.0, 2175.0]);
    }

    #[tokio::test]
    async fn test_failed_fx_fetch_aborts_assembly() {
        let fetcher = FakeFetcher::new(&[("GLD", vec![(day(1), Some(1.0))])]);
        let assembler = HistoryAssembler::new(fetcher);

        let err = assembler
            .assemble("GLD", years(1), Currency::Jpy)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            HistoryError::UpstreamUnavailable { ref symbol, .. } if symbol == "JPY=X"
        ));
    }

    #[tokio::test]
    async fn test_failed_asset_fetch_propagates() {
        let fetcher = FakeFetcher::new(&[("JPY=X", vec![(day(1), Some(150.0))])]);
        let assembler = HistoryAssembler::new(fetcher);

        for currency in [Currency::Usd, Currency::Jpy] {
            let err = assembler
                .assemble("REET", years(1), currency)
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                HistoryError::UpstreamUnavailable { ref symbol, .. } if symbol == "REET"
            ));
        }
    }

    #[tokio::test]
    async fn test_window_start_includes_holiday_buffer() {
        let fetcher = FakeFetcher::new(&[
            ("GLD", vec![(day(1), Some(1.0))]),
            ("JPY=X", vec![(day(1), Some(150.0))]),
        ]);
        let assembler = HistoryAssembler::new(fetcher.clone());
        let now = DateTime::parse_from_rfc3339("2025-06-30T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        assembler
            .assemble_at(now, "GLD", years(3), Currency::Jpy)
            .await
            .unwrap();

        let calls = fetcher.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        for (_, start) in calls.iter() {
            assert_eq!(*start, now - Duration::days(3 * 365 + 7));
        }
    }

    #[test]
    fn test_forward_fill_skips_missing_rates() {
        let dates = vec![day(1), day(2), day(3), day(4)];
        let rates = vec![(day(2), Some(150.0)), (day(3), None)];

        assert_eq!(
            forward_fill(&dates, &rates),
            vec![None, Some(150.0), Some(150.0), Some(150.0)]
        );
    }

    #[test]
    fn test_forward_fill_uses_latest_rate_between_dates() {
        let dates = vec![day(1), day(8)];
        let rates = vec![
            (day(1), Some(140.0)),
            (day(3), Some(141.0)),
            (day(5), Some(142.0)),
            (day(9), Some(143.0)),
        ];

        assert_eq!(forward_fill(&dates, &rates), vec![Some(140.0), Some(142.0)]);
        assert_eq!(forward_fill(&dates, &Vec::new()), vec![None, None]);
    }

    #[test]
    fn test_price_points_drop_invalid_values_and_round() {
        let series = vec![
            (day(1), Some(1.234_567)),
            (day(2), None),
            (day(3), Some(f64::NAN)),
            (day(4), Some(f64::INFINITY)),
            (day(5), Some(2.000_04)),
            // finite, but overflows once scaled for rounding
            (day(6), Some(1e305)),
            (day(7), Some(-f64::MAX)),
        ];

        let points = to_price_points(series);

        assert_eq!(prices(&points), vec![1.2346, 2.0]);
        assert_eq!(points[0].date, day(1));
        assert_eq!(points[1].date, day(5));
        for point in &points {
            assert!(point.price.is_finite());
            let scaled = point.price * 10_000.0;
            assert!((scaled - scaled.round()).abs() < 1e-6);
        }
    }
}
